//! Text width measurement for wrapping decisions.
//!
//! The layout pass must stay pure and deterministic, so it measures text
//! through this trait instead of touching font files directly. The default
//! [`HeuristicMeasurer`] uses per-class advance estimates that are stable
//! across platforms.

/// Measures the rendered width of a text run at a given font size.
pub trait TextMeasurer: Send + Sync {
    fn text_width(&self, text: &str, font_size: f32) -> f32;
}

/// Platform-independent width estimate: half an em per narrow character,
/// a full em per wide (CJK and fullwidth) character.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeuristicMeasurer;

fn is_wide(c: char) -> bool {
    matches!(c as u32,
        0x1100..=0x115F          // Hangul Jamo
        | 0x2E80..=0x303E        // CJK radicals, punctuation
        | 0x3041..=0x33FF        // Kana, CJK symbols
        | 0x3400..=0x4DBF        // CJK ext A
        | 0x4E00..=0x9FFF        // CJK unified
        | 0xA000..=0xA4CF        // Yi
        | 0xAC00..=0xD7A3        // Hangul syllables
        | 0xF900..=0xFAFF        // CJK compatibility
        | 0xFE30..=0xFE4F        // CJK compatibility forms
        | 0xFF00..=0xFF60        // Fullwidth forms
        | 0xFFE0..=0xFFE6
        | 0x20000..=0x2FFFD
        | 0x30000..=0x3FFFD)
}

impl TextMeasurer for HeuristicMeasurer {
    fn text_width(&self, text: &str, font_size: f32) -> f32 {
        text.chars()
            .map(|c| if is_wide(c) { font_size } else { font_size * 0.52 })
            .sum()
    }
}

/// Wraps `text` to at most `max_lines` lines that each fit within `width`.
/// Content past the last line is truncated with an ellipsis.
pub fn wrap_text(
    measurer: &dyn TextMeasurer,
    text: &str,
    width: f32,
    font_size: f32,
    max_lines: usize,
) -> Vec<String> {
    let text = text.trim();
    if text.is_empty() || max_lines == 0 {
        return Vec::new();
    }

    let mut lines: Vec<String> = Vec::with_capacity(max_lines);
    let mut current = String::new();

    for c in text.chars() {
        current.push(c);
        if measurer.text_width(&current, font_size) > width && current.chars().count() > 1 {
            let last = current.pop().unwrap_or_default();
            if lines.len() + 1 == max_lines {
                truncate_with_ellipsis(measurer, &mut current, width, font_size);
                lines.push(current);
                return lines;
            }
            lines.push(std::mem::take(&mut current));
            current.push(last);
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

fn truncate_with_ellipsis(
    measurer: &dyn TextMeasurer,
    line: &mut String,
    width: f32,
    font_size: f32,
) {
    loop {
        let candidate = format!("{line}\u{2026}");
        if measurer.text_width(&candidate, font_size) <= width || line.is_empty() {
            *line = candidate;
            return;
        }
        line.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_stays_on_one_line() {
        let lines = wrap_text(&HeuristicMeasurer, "Design work", 200.0, 9.0, 2);
        assert_eq!(lines, vec!["Design work".to_string()]);
    }

    #[test]
    fn long_text_wraps_to_two_lines_then_truncates() {
        let text = "An extremely long line item description that cannot possibly fit";
        let lines = wrap_text(&HeuristicMeasurer, text, 60.0, 9.0, 2);
        assert_eq!(lines.len(), 2);
        assert!(lines[1].ends_with('\u{2026}'));
        for line in &lines {
            assert!(HeuristicMeasurer.text_width(line, 9.0) <= 60.0 + 9.0);
        }
    }

    #[test]
    fn wide_characters_count_as_a_full_em() {
        let narrow = HeuristicMeasurer.text_width("abc", 10.0);
        let wide = HeuristicMeasurer.text_width("\u{8acb}\u{6c42}\u{66f8}", 10.0);
        assert!(wide > narrow);
        assert!((wide - 30.0).abs() < 0.01);
    }
}
