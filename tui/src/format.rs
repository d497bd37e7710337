use chrono::{DateTime, Utc};
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Fit `text` into `max_width` terminal cells, ending with `ellipsis` when cut.
pub(crate) fn truncate_to_width(text: &str, max_width: usize, ellipsis: &str) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    let ellipsis_width = ellipsis.width();
    if max_width <= ellipsis_width {
        return ellipsis.chars().take(max_width).collect();
    }

    let budget = max_width - ellipsis_width;
    let mut out = String::new();
    let mut used = 0;
    for grapheme in text.graphemes(true) {
        let w = grapheme.width();
        if used + w > budget {
            break;
        }
        out.push_str(grapheme);
        used += w;
    }
    out.push_str(ellipsis);
    out
}

/// Pad with spaces to exactly `width` cells (truncating first if needed).
pub(crate) fn pad_to_width(text: &str, width: usize, ellipsis: &str) -> String {
    let mut out = truncate_to_width(text, width, ellipsis);
    let used = out.width();
    if used < width {
        out.push_str(&" ".repeat(width - used));
    }
    out
}

pub(crate) fn format_date(at: &DateTime<Utc>) -> String {
    at.format("%Y-%m-%d").to_string()
}

pub(crate) fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M UTC").to_string()
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn short_text_is_unchanged() {
        assert_eq!(truncate_to_width("Alpha", 10, "…"), "Alpha");
    }

    #[test]
    fn long_text_gets_ellipsis() {
        assert_eq!(truncate_to_width("Alphabet soup", 6, "…"), "Alpha…");
        assert_eq!(truncate_to_width("Alphabet soup", 6, "..."), "Alp...");
    }

    #[test]
    fn wide_graphemes_respect_cell_width() {
        // Each CJK character is two cells wide.
        assert_eq!(truncate_to_width("日本語テキスト", 5, "…"), "日本…");
    }

    #[test]
    fn tiny_width_keeps_only_ellipsis() {
        assert_eq!(truncate_to_width("Alphabet", 2, "..."), "..");
    }

    #[test]
    fn pad_fills_to_width() {
        assert_eq!(pad_to_width("ab", 4, "…"), "ab  ");
        assert_eq!(pad_to_width("abcdef", 4, "…"), "abc…");
    }

    #[test]
    fn dates() {
        let at = Utc.with_ymd_and_hms(2025, 3, 1, 9, 5, 0).unwrap();
        assert_eq!(format_date(&at), "2025-03-01");
        assert_eq!(format_timestamp(&at), "2025-03-01 09:05 UTC");
    }
}
