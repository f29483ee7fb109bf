//! Deterministic generation of estimate and invoice PDFs.
//!
//! The engine validates a structured [`DocumentRequest`], lays it out into
//! paginated pages, and emits PDF bytes, with content-addressed caching of
//! rendered output and in-line memory/time monitoring between stages.
//!
//! ```no_run
//! use facture::{DocumentRequest, GeneratorBuilder};
//!
//! # fn run(request: DocumentRequest) {
//! let mut generator = GeneratorBuilder::new().build();
//! match generator.generate(&request) {
//!     Ok(output) => println!("{} ({} bytes)", output.filename, output.bytes.len()),
//!     Err(record) => eprintln!("{}", record.message),
//! }
//! # }
//! ```

pub mod error;
pub mod pipeline;

pub use error::{PipelineError, ValidationIssue, ValidationRule};
pub use pipeline::{
    DocumentGenerator, ErrorKind, ErrorRecord, GenerationOutput, GeneratorBuilder, PrintTarget,
    RunReport, RunState, Severity,
};

pub use facture_cache::{CacheStats, Fingerprint, RenderCache};
pub use facture_layout::{FontResolver, FontSource, LayoutEngine, LayoutPlan, PageGeometry};
pub use facture_render_core::{DocumentEmitter, DocumentMeta, DrawOp, PageOps};
pub use facture_render_lopdf::LopdfEmitter;
pub use facture_types::{
    DocumentKind, DocumentModel, DocumentRequest, EmbeddedImage, FinancialSummary, IssuerProfile,
    LineItem, Party,
};
