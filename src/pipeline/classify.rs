//! Failure classification into the closed, user-facing taxonomy.
//!
//! Classification is total: every raw failure maps to some kind, falling
//! through to `Rendering` when nothing more specific matches. Typed
//! [`PipelineError`] variants classify structurally; message-pattern
//! matching is kept only for opaque strings coming out of the rendering
//! backend.

use crate::error::{PipelineError, ValidationIssue};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// Closed error taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    DataValidation,
    Memory,
    Font,
    Image,
    Rendering,
    Permission,
    Network,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Warning,
    Error,
    Critical,
}

impl ErrorKind {
    pub fn severity(&self) -> Severity {
        match self {
            ErrorKind::Memory => Severity::Critical,
            ErrorKind::DataValidation | ErrorKind::Rendering | ErrorKind::Image => Severity::Error,
            ErrorKind::Font | ErrorKind::Permission | ErrorKind::Network => Severity::Warning,
        }
    }

    /// Fixed, reusable remediation suggestions per kind.
    pub fn suggestions(&self) -> &'static [&'static str] {
        match self {
            ErrorKind::DataValidation => &[
                "Review the highlighted fields and correct the listed problems",
                "Make sure the document has at least one line item",
            ],
            ErrorKind::Memory => &[
                "Close other documents and try again",
                "Split very large documents into smaller ones",
            ],
            ErrorKind::Font => &[
                "Install a font that covers the document's script",
                "The document was generated with a substitute font",
            ],
            ErrorKind::Image => &[
                "Re-upload the logo or seal image in PNG or JPEG format",
                "Reduce the image resolution and try again",
            ],
            ErrorKind::Rendering => &[
                "Try generating the document again",
                "If the problem persists, simplify the document content",
            ],
            ErrorKind::Permission => &[
                "Allow file downloads for this application",
                "Check that the output location is writable",
            ],
            ErrorKind::Network => &[
                "Check the network connection and retry",
                "Remote resources may be temporarily unavailable",
            ],
        }
    }

    /// Short, non-technical message shown to the end user.
    pub fn user_message(&self) -> &'static str {
        match self {
            ErrorKind::DataValidation => "The document contains invalid or missing data.",
            ErrorKind::Memory => "The document is too large to generate right now.",
            ErrorKind::Font => "A substitute font was used for part of the document.",
            ErrorKind::Image => "An embedded image could not be processed.",
            ErrorKind::Rendering => "The document could not be generated.",
            ErrorKind::Permission => "The document could not be saved due to permissions.",
            ErrorKind::Network => "A network problem interrupted document generation.",
        }
    }
}

/// Normalized record of one failure. Created once, never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorRecord {
    pub kind: ErrorKind,
    pub severity: Severity,
    /// Non-technical message for the end user.
    pub message: String,
    /// Diagnostic message, exposed only in debug mode.
    pub detail: String,
    pub context: BTreeMap<String, String>,
    pub suggestions: &'static [&'static str],
    pub timestamp: DateTime<Utc>,
}

impl ErrorRecord {
    pub fn new(kind: ErrorKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            severity: kind.severity(),
            message: kind.user_message().to_string(),
            detail: detail.into(),
            context: BTreeMap::new(),
            suggestions: kind.suggestions(),
            timestamp: Utc::now(),
        }
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn with_context(mut self, key: &str, value: impl Into<String>) -> Self {
        self.context.insert(key.to_string(), value.into());
        self
    }

    /// Whether the pipeline should abort on this record.
    pub fn is_fatal(&self) -> bool {
        self.severity >= Severity::Error
    }
}

/// Stage information attached to classified failures.
#[derive(Debug, Clone, Copy)]
pub struct StageContext<'a> {
    pub stage: &'a str,
    pub document_number: &'a str,
}

/// Maps a raw pipeline failure into the taxonomy. Never fails.
pub fn classify(error: &PipelineError, ctx: StageContext<'_>) -> ErrorRecord {
    let record = match error {
        PipelineError::Validation(issues) => validation_record(issues),
        PipelineError::Memory(detail) => ErrorRecord::new(ErrorKind::Memory, detail.clone()),
        PipelineError::Font(detail) => ErrorRecord::new(ErrorKind::Font, detail.clone()),
        PipelineError::Image(detail) => ErrorRecord::new(ErrorKind::Image, detail.clone()),
        PipelineError::Layout(err) => ErrorRecord::new(ErrorKind::Rendering, err.to_string()),
        PipelineError::Io(err) => classify_message(&err.to_string()),
        PipelineError::Render(err) => classify_message(&err.to_string()),
        PipelineError::Json(err) => ErrorRecord::new(ErrorKind::Rendering, err.to_string()),
        PipelineError::Cancelled => {
            ErrorRecord::new(ErrorKind::Rendering, "generation cancelled by caller")
                .with_severity(Severity::Warning)
        }
        PipelineError::Other(detail) => classify_message(detail),
    };
    record
        .with_context("stage", ctx.stage)
        .with_context("document_number", ctx.document_number)
}

fn validation_record(issues: &[ValidationIssue]) -> ErrorRecord {
    let detail = issues
        .iter()
        .map(|issue| issue.message.as_str())
        .collect::<Vec<_>>()
        .join("; ");
    ErrorRecord::new(ErrorKind::DataValidation, detail)
        .with_context("violation_count", issues.len().to_string())
}

/// Priority-ordered pattern fallback for opaque failure messages.
fn classify_message(detail: &str) -> ErrorRecord {
    let lowered = detail.to_lowercase();
    let kind = if contains_any(&lowered, &["out of memory", "allocation", "memory"]) {
        ErrorKind::Memory
    } else if contains_any(&lowered, &["font", "glyph", "typeface"]) {
        ErrorKind::Font
    } else if contains_any(&lowered, &["image", "canvas", "decode", "jpeg", "png"]) {
        ErrorKind::Image
    } else if contains_any(&lowered, &["permission", "denied", "blocked", "not allowed"]) {
        ErrorKind::Permission
    } else if contains_any(&lowered, &["network", "fetch", "connection", "timed out", "timeout"]) {
        ErrorKind::Network
    } else {
        ErrorKind::Rendering
    };
    ErrorRecord::new(kind, detail)
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationRule;

    fn ctx() -> StageContext<'static> {
        StageContext {
            stage: "rendering",
            document_number: "INV-001",
        }
    }

    #[test]
    fn classification_is_total() {
        let errors = vec![
            PipelineError::Other("something inexplicable".to_string()),
            PipelineError::Memory("budget exceeded".to_string()),
            PipelineError::Cancelled,
        ];
        for err in &errors {
            let record = classify(err, ctx());
            assert!(!record.message.is_empty());
            assert!(!record.suggestions.is_empty());
        }
    }

    #[test]
    fn memory_patterns_are_critical() {
        let err = PipelineError::Other("allocation failed while buffering pages".to_string());
        let record = classify(&err, ctx());
        assert_eq!(record.kind, ErrorKind::Memory);
        assert_eq!(record.severity, Severity::Critical);
    }

    #[test]
    fn font_patterns_are_warnings() {
        let err = PipelineError::Other("missing glyph for U+8ACB".to_string());
        let record = classify(&err, ctx());
        assert_eq!(record.kind, ErrorKind::Font);
        assert_eq!(record.severity, Severity::Warning);
        assert!(!record.is_fatal());
    }

    #[test]
    fn unknown_messages_fall_through_to_rendering() {
        let record = classify(&PipelineError::Other("xyzzy".to_string()), ctx());
        assert_eq!(record.kind, ErrorKind::Rendering);
        assert_eq!(record.severity, Severity::Error);
    }

    #[test]
    fn pattern_priority_prefers_memory_over_image() {
        let err = PipelineError::Other("image buffer allocation failed".to_string());
        assert_eq!(classify(&err, ctx()).kind, ErrorKind::Memory);
    }

    #[test]
    fn validation_lists_every_violation() {
        let issues = vec![
            ValidationIssue {
                rule: ValidationRule::EmptyItems,
                message: "at least one line item is required".to_string(),
            },
            ValidationIssue {
                rule: ValidationRule::EmptyCustomerName,
                message: "customer name must not be empty".to_string(),
            },
        ];
        let record = classify(&PipelineError::Validation(issues), ctx());
        assert_eq!(record.kind, ErrorKind::DataValidation);
        assert!(record.detail.contains("line item"));
        assert!(record.detail.contains("customer name"));
        assert_eq!(record.context.get("violation_count").unwrap(), "2");
    }

    #[test]
    fn user_message_differs_from_diagnostic_detail() {
        let err = PipelineError::Other("content stream op overflow at page 3".to_string());
        let record = classify(&err, ctx());
        assert_ne!(record.message, record.detail);
        assert!(record.context.contains_key("stage"));
    }
}
