//! Fluent construction of a [`DocumentGenerator`].
//!
//! Every collaborator can be swapped for tests: the memory probe, the text
//! and font measurers, and the output emitter are all injection points.

use crate::pipeline::batch::BatchProcessor;
use crate::pipeline::images::ImageLimits;
use crate::pipeline::monitor::{MemoryProbe, MonitorConfig, PerformanceMonitor};
use crate::pipeline::orchestrator::DocumentGenerator;
use facture_cache::{RenderCache, DEFAULT_BYTE_BUDGET};
use facture_layout::measure::HeuristicMeasurer;
use facture_layout::{FontMeasurer, FontResolver, LayoutEngine, PageGeometry, TextMeasurer};
use facture_render_core::DocumentEmitter;
use facture_render_lopdf::LopdfEmitter;
use std::sync::Arc;

const DEFAULT_FONT_FAMILY: &str = "Helvetica";
const DEFAULT_PRODUCER: &str = concat!("facture ", env!("CARGO_PKG_VERSION"));
const DEFAULT_CHUNK_SIZE: usize = 16;

/// Measures every concrete family with the platform-independent width
/// heuristic, so the preferred family always resolves as present. Generic
/// family keywords name a class rather than a measurable face and report
/// no width, which keeps the resolver's baseline comparison out of play.
/// Used when system font lookup is unavailable or undesired.
#[derive(Debug, Default, Clone, Copy)]
pub struct UniformFontMeasurer;

impl FontMeasurer for UniformFontMeasurer {
    fn measure(&self, family: &str, sample: &str, font_size: f32) -> Option<f32> {
        if matches!(family, "serif" | "sans-serif" | "monospace") {
            return None;
        }
        Some(HeuristicMeasurer.text_width(sample, font_size))
    }
}

pub struct GeneratorBuilder {
    geometry: PageGeometry,
    cache_budget: usize,
    monitor_config: MonitorConfig,
    probe: Option<Box<dyn MemoryProbe>>,
    text_measurer: Option<Arc<dyn TextMeasurer>>,
    font_measurer: Option<Arc<dyn FontMeasurer>>,
    fallback_chain: Option<Vec<String>>,
    emitter: Option<Box<dyn DocumentEmitter>>,
    image_limits: ImageLimits,
    chunk_size: usize,
    preferred_family: String,
    producer: String,
    debug: bool,
}

impl Default for GeneratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GeneratorBuilder {
    pub fn new() -> Self {
        Self {
            geometry: PageGeometry::default(),
            cache_budget: DEFAULT_BYTE_BUDGET,
            monitor_config: MonitorConfig::default(),
            probe: None,
            text_measurer: None,
            font_measurer: None,
            fallback_chain: None,
            emitter: None,
            image_limits: ImageLimits::default(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            preferred_family: DEFAULT_FONT_FAMILY.to_string(),
            producer: DEFAULT_PRODUCER.to_string(),
            debug: false,
        }
    }

    pub fn with_geometry(mut self, geometry: PageGeometry) -> Self {
        self.geometry = geometry;
        self
    }

    /// Byte budget for the rendered-document cache.
    pub fn with_cache_budget(mut self, bytes: usize) -> Self {
        self.cache_budget = bytes;
        self
    }

    pub fn with_monitor_config(mut self, config: MonitorConfig) -> Self {
        self.monitor_config = config;
        self
    }

    pub fn with_memory_probe(mut self, probe: Box<dyn MemoryProbe>) -> Self {
        self.probe = Some(probe);
        self
    }

    pub fn with_text_measurer(mut self, measurer: Arc<dyn TextMeasurer>) -> Self {
        self.text_measurer = Some(measurer);
        self
    }

    pub fn with_font_measurer(mut self, measurer: Arc<dyn FontMeasurer>) -> Self {
        self.font_measurer = Some(measurer);
        self
    }

    pub fn with_fallback_chain(mut self, chain: Vec<String>) -> Self {
        self.fallback_chain = Some(chain);
        self
    }

    pub fn with_emitter(mut self, emitter: Box<dyn DocumentEmitter>) -> Self {
        self.emitter = Some(emitter);
        self
    }

    pub fn with_image_limits(mut self, limits: ImageLimits) -> Self {
        self.image_limits = limits;
        self
    }

    /// Items processed per batch chunk before yielding. Governs both
    /// letterhead image optimization and per-item row layout.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Preferred body font family, typically a bundled webfont.
    pub fn with_font_family(mut self, family: impl Into<String>) -> Self {
        self.preferred_family = family.into();
        self
    }

    pub fn with_producer(mut self, producer: impl Into<String>) -> Self {
        self.producer = producer.into();
        self
    }

    /// Exposes diagnostic error detail in logs.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn build(self) -> DocumentGenerator {
        let cache = RenderCache::new(self.cache_budget);
        let monitor = match self.probe {
            Some(probe) => PerformanceMonitor::new(probe, self.monitor_config),
            None => PerformanceMonitor::with_system_probe(self.monitor_config),
        };
        let mut layout = LayoutEngine::new(self.geometry);
        if let Some(measurer) = self.text_measurer {
            layout = layout.with_measurer(measurer);
        }
        let font_measurer = match self.font_measurer {
            Some(measurer) => measurer,
            None => default_font_measurer(),
        };
        let mut fonts = FontResolver::new(font_measurer);
        if let Some(chain) = self.fallback_chain {
            fonts = fonts.with_fallback_chain(chain);
        }
        let emitter = self
            .emitter
            .unwrap_or_else(|| Box::new(LopdfEmitter::new()));

        DocumentGenerator::assemble(
            cache,
            monitor,
            layout,
            fonts,
            emitter,
            BatchProcessor::new(self.chunk_size),
            self.image_limits,
            self.preferred_family,
            self.producer,
            self.debug,
        )
    }
}

#[cfg(feature = "system-fonts")]
fn default_font_measurer() -> Arc<dyn FontMeasurer> {
    Arc::new(facture_layout::fonts::SystemFontMeasurer::new())
}

#[cfg(not(feature = "system-fonts"))]
fn default_font_measurer() -> Arc<dyn FontMeasurer> {
    Arc::new(UniformFontMeasurer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::orchestrator::RunState;

    #[test]
    fn builder_defaults_produce_an_idle_generator() {
        let generator = GeneratorBuilder::new().build();
        assert_eq!(generator.state(), RunState::Idle);
        assert_eq!(generator.cache_stats().byte_budget, DEFAULT_BYTE_BUDGET);
    }

    #[test]
    fn uniform_measurer_accepts_any_concrete_family() {
        let width = UniformFontMeasurer.measure("No Such Family", "sample", 16.0);
        assert!(width.is_some());
        assert!(UniformFontMeasurer.measure("serif", "sample", 16.0).is_none());
    }

    #[test]
    fn uniform_measurer_resolves_the_preferred_family_cleanly() {
        use facture_layout::FontSource;

        let resolver = FontResolver::new(Arc::new(UniformFontMeasurer));
        let resolved = resolver.resolve("Helvetica", "Invoice INV-2026-001");
        assert!(resolved.ok);
        assert_eq!(resolved.source, FontSource::Webfont);
        assert_eq!(resolved.family, "Helvetica");
    }
}
