//! Unicode-aware padding and truncation.
//!
//! All pane content goes through [`fit_line`] so the bordered grid never
//! drifts out of alignment: widths are measured in display cells, not chars,
//! and a wide glyph that would straddle the cut point is dropped in favour
//! of padding.

use ratatui::text::{Line, Span};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

pub(crate) const ELLIPSIS: &str = "…";

/// Display width of a string in terminal cells.
#[must_use]
pub(crate) fn display_width(text: &str) -> usize {
    UnicodeWidthStr::width(text)
}

/// Truncate from the end, appending `…` when anything was cut.
#[must_use]
pub(crate) fn truncate_end(text: &str, max_width: usize) -> String {
    if display_width(text) <= max_width {
        return text.to_string();
    }
    if max_width == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + w > max_width - 1 {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push_str(ELLIPSIS);
    out
}

/// Truncate from the front, prepending `…`. Used for paths, where the
/// meaningful suffix matters more than the prefix.
///
/// Scans forward for the cut point and never cuts in front of a zero-width
/// character, so a combining mark is dropped together with its base glyph
/// rather than stranded at the start of the suffix.
#[must_use]
pub(crate) fn truncate_start(text: &str, max_width: usize) -> String {
    if display_width(text) <= max_width {
        return text.to_string();
    }
    if max_width == 0 {
        return String::new();
    }
    let budget = max_width - 1;
    let mut remaining = display_width(text);
    let mut cut = text.len();
    for (index, ch) in text.char_indices() {
        let w = UnicodeWidthChar::width(ch).unwrap_or(0);
        if remaining <= budget && w > 0 {
            cut = index;
            break;
        }
        remaining -= w;
    }
    format!("{ELLIPSIS}{}", &text[cut..])
}

/// Fit a styled line to exactly `width` cells: truncate overlong content
/// (trailing `…`) and pad the remainder with spaces.
#[must_use]
pub(crate) fn fit_line(line: Line<'static>, width: usize) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::with_capacity(line.spans.len() + 1);
    let mut used = 0;

    for span in line.spans {
        if used >= width {
            break;
        }
        let remaining = width - used;
        let content = span.content.as_ref();
        let content_width = display_width(content);
        if content_width <= remaining {
            used += content_width;
            spans.push(span);
            continue;
        }
        let cut = truncate_end(content, remaining);
        used += display_width(&cut);
        spans.push(Span::styled(cut, span.style));
        break;
    }

    if used < width {
        spans.push(Span::raw(" ".repeat(width - used)));
    }
    Line::from(spans)
}

/// Total display width of a styled line.
#[must_use]
pub(crate) fn line_width(line: &Line<'_>) -> usize {
    line.spans
        .iter()
        .map(|span| display_width(span.content.as_ref()))
        .sum()
}
