//! Output filename construction.

use facture_types::DocumentKind;

const MAX_COMPONENT_LEN: usize = 50;

/// Strips a user-supplied string down to a filesystem-safe component.
///
/// Only alphanumerics, `_`, `.` and `-` survive; runs of whitespace become a
/// single `_`, everything else is dropped, and the result is truncated to 50
/// characters. An empty result becomes `"untitled"`.
pub fn sanitize_component(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len().min(MAX_COMPONENT_LEN));
    let mut pending_space = false;
    for ch in raw.chars() {
        if out.len() >= MAX_COMPONENT_LEN {
            break;
        }
        if ch.is_whitespace() {
            pending_space = !out.is_empty();
            continue;
        }
        if ch.is_ascii_alphanumeric() || matches!(ch, '_' | '.' | '-') {
            if pending_space {
                out.push('_');
                pending_space = false;
                if out.len() >= MAX_COMPONENT_LEN {
                    break;
                }
            }
            out.push(ch);
        }
    }
    // Leading dots would produce hidden files or traversal-looking names.
    let trimmed = out.trim_start_matches('.').to_string();
    if trimmed.is_empty() {
        "untitled".to_string()
    } else {
        trimmed
    }
}

/// Builds the suggested download name for a generated document.
pub fn suggested_filename(kind: DocumentKind, number: &str, customer: &str) -> String {
    format!(
        "{}_{}_{}.pdf",
        kind.label(),
        sanitize_component(number),
        sanitize_component(customer),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_safe_characters() {
        assert_eq!(sanitize_component("INV-2026.001_a"), "INV-2026.001_a");
    }

    #[test]
    fn whitespace_runs_collapse_to_single_underscore() {
        assert_eq!(sanitize_component("Acme   Widget Co"), "Acme_Widget_Co");
    }

    #[test]
    fn hostile_input_is_neutralized() {
        let name = sanitize_component("../../etc/passwd<script>");
        assert!(!name.contains(".."));
        assert!(!name.contains('<'));
        assert!(!name.contains('/'));
    }

    #[test]
    fn long_components_are_truncated() {
        let name = sanitize_component(&"a".repeat(200));
        assert_eq!(name.len(), 50);
    }

    #[test]
    fn empty_input_gets_a_placeholder() {
        assert_eq!(sanitize_component("   "), "untitled");
        assert_eq!(sanitize_component("<<<>>>"), "untitled");
    }

    #[test]
    fn filename_composes_all_parts() {
        let name = suggested_filename(DocumentKind::Invoice, "INV-7", "Acme Co");
        assert_eq!(name, "Invoice_INV-7_Acme_Co.pdf");
    }
}
