pub mod fixtures;
pub mod pdf_assertions;

use facture::pipeline::builder::UniformFontMeasurer;
use facture::{DocumentRequest, ErrorRecord, GenerationOutput, GeneratorBuilder};
use lopdf::Document as LopdfDocument;
use std::sync::Arc;

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

/// Wrapper around a generated PDF with helper methods
pub struct GeneratedPdf {
    pub bytes: Vec<u8>,
    pub doc: LopdfDocument,
}

impl GeneratedPdf {
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, Box<dyn std::error::Error>> {
        let doc = LopdfDocument::load_mem(&bytes)?;
        Ok(Self { bytes, doc })
    }

    pub fn page_count(&self) -> usize {
        self.doc.get_pages().len()
    }

    /// Save PDF to a file for manual debugging
    #[allow(dead_code)]
    pub fn save_for_debug(&self, name: &str) -> std::io::Result<()> {
        std::fs::write(format!("test_output_{}.pdf", name), &self.bytes)
    }
}

/// Routes log output through the test harness capture. Safe to call from
/// every test; only the first call wins.
pub fn init_test_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A generator with deterministic font resolution, so runs behave the same
/// regardless of which fonts the host has installed.
pub fn test_generator() -> facture::DocumentGenerator {
    init_test_logging();
    GeneratorBuilder::new()
        .with_font_measurer(Arc::new(UniformFontMeasurer))
        .build()
}

pub fn generate(request: &DocumentRequest) -> Result<GenerationOutput, ErrorRecord> {
    test_generator().generate(request)
}

pub fn generate_pdf(request: &DocumentRequest) -> Result<GeneratedPdf, Box<dyn std::error::Error>> {
    let output = generate(request).map_err(|record| record.detail.clone())?;
    GeneratedPdf::from_bytes(output.bytes.as_ref().clone())
}
