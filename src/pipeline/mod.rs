//! The document generation pipeline, stage by stage.

pub mod batch;
pub mod builder;
pub mod classify;
pub mod compose;
pub mod filename;
pub mod images;
pub mod metrics;
pub mod monitor;
pub mod orchestrator;
pub mod validate;

pub use batch::{BatchOutcome, BatchProcessor, BatchProgress, BatchRun};
pub use builder::GeneratorBuilder;
pub use classify::{classify, ErrorKind, ErrorRecord, Severity, StageContext};
pub use compose::{compose, LetterheadAssets};
pub use filename::{sanitize_component, suggested_filename};
pub use images::{optimize, ImageLimits, OptimizedImage};
pub use metrics::RunReport;
pub use monitor::{
    MemoryLevel, MemoryProbe, MemoryReading, MonitorConfig, PerformanceMonitor,
    SystemMemoryProbe,
};
pub use orchestrator::{DocumentGenerator, GenerationOutput, PrintTarget, RunState};
pub use validate::validate;
