//! Unified error types for all pipeline operations.
//!
//! Stages fail with a typed [`PipelineError`] carrying an explicit kind at
//! the failure site; the classifier in `pipeline::classify` maps these into
//! the user-facing taxonomy, falling back to message-pattern matching only
//! for opaque backend strings.

use facture_layout::LayoutError;
use facture_render_core::RenderError;
use thiserror::Error;

/// One validation violation, tagged with the rule that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub rule: ValidationRule,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationRule {
    EmptyDocumentNumber,
    EmptyCustomerName,
    EmptyItems,
    MissingCategory,
    MissingUnit,
    AmountMismatch,
    SummaryMismatch,
}

/// The main error enum for all high-level operations within the engine.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("validation failed with {} violation(s)", .0.len())]
    Validation(Vec<ValidationIssue>),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("layout error: {0}")]
    Layout(#[from] LayoutError),
    #[error("rendering error: {0}")]
    Render(#[from] RenderError),
    #[error("image processing error: {0}")]
    Image(String),
    #[error("font resolution error: {0}")]
    Font(String),
    #[error("memory budget exhausted: {0}")]
    Memory(String),
    #[error("fingerprinting error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("generation cancelled")]
    Cancelled,
    #[error("{0}")]
    Other(String),
}
