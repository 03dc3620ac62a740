//! Deterministic grid assembly: list-pane rows and preview-pane rows merged
//! into a bordered rectangle of display lines.

use ratatui::text::{Line, Span};

use super::layout::Layout;
use super::text::fit_line;

const TOP_LEFT: &str = "┌";
const TOP_RIGHT: &str = "┐";
const BOTTOM_LEFT: &str = "└";
const BOTTOM_RIGHT: &str = "┘";
const HORIZONTAL: &str = "─";
const VERTICAL: &str = "│";
const TOP_JUNCTION: &str = "┬";
const BOTTOM_JUNCTION: &str = "┴";
const LEFT_JUNCTION: &str = "├";
const RIGHT_JUNCTION: &str = "┤";
const CROSS_JUNCTION: &str = "┼";

/// One logical row emitted by the list pane.
pub(crate) enum PaneRow {
    Text(Line<'static>),
    /// The single separator between the query row and the results. The merge
    /// step turns it into a full-width rule across both panes.
    Divider,
}

/// Merge both panes into `geometry.total_rows` lines, each exactly
/// `geometry.total_width` cells wide. Stateless: callers pass everything in.
pub(crate) fn merge(
    list: Vec<PaneRow>,
    preview: Vec<Line<'static>>,
    geometry: &Layout,
) -> Vec<Line<'static>> {
    let interior = geometry.total_rows - 2;
    let left = usize::from(geometry.left_width);
    let right = usize::from(geometry.right_width);

    let mut rows = Vec::with_capacity(geometry.total_rows);
    rows.push(horizontal_rule(
        TOP_LEFT,
        TOP_JUNCTION,
        TOP_RIGHT,
        left,
        right,
    ));

    let mut list = list.into_iter();
    let mut preview = preview.into_iter();
    for _ in 0..interior {
        let list_row = list.next().unwrap_or(PaneRow::Text(Line::default()));
        let preview_row = preview.next().unwrap_or_default();
        match list_row {
            PaneRow::Divider => rows.push(horizontal_rule(
                LEFT_JUNCTION,
                CROSS_JUNCTION,
                RIGHT_JUNCTION,
                left,
                right,
            )),
            PaneRow::Text(line) => {
                let mut spans = vec![Span::raw(VERTICAL)];
                spans.extend(fit_line(line, left).spans);
                spans.push(Span::raw(VERTICAL));
                spans.extend(fit_line(preview_row, right).spans);
                spans.push(Span::raw(VERTICAL));
                rows.push(Line::from(spans));
            }
        }
    }

    rows.push(horizontal_rule(
        BOTTOM_LEFT,
        BOTTOM_JUNCTION,
        BOTTOM_RIGHT,
        left,
        right,
    ));
    rows
}

/// A full-width horizontal rule with the given end and pane-boundary glyphs.
fn horizontal_rule(
    left_glyph: &'static str,
    boundary_glyph: &'static str,
    right_glyph: &'static str,
    left: usize,
    right: usize,
) -> Line<'static> {
    Line::from(vec![
        Span::raw(left_glyph),
        Span::raw(HORIZONTAL.repeat(left)),
        Span::raw(boundary_glyph),
        Span::raw(HORIZONTAL.repeat(right)),
        Span::raw(right_glyph),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::layout::layout;
    use crate::ui::text::line_width;

    fn row_text(line: &Line<'_>) -> String {
        line.spans
            .iter()
            .map(|span| span.content.as_ref())
            .collect()
    }

    fn sample_list(rows: usize) -> Vec<PaneRow> {
        let mut list = vec![PaneRow::Text(Line::from("> query")), PaneRow::Divider];
        for i in 0..rows {
            list.push(PaneRow::Text(Line::from(format!("entry {i}"))));
        }
        list
    }

    #[test]
    fn every_row_is_exactly_total_width() {
        for width in [20u16, 37, 80, 121] {
            let geometry = layout(width, 15);
            let preview = vec![Line::from("contents"), Line::from("日本語のテキスト")];
            let rows = merge(sample_list(15), preview, &geometry);
            assert_eq!(rows.len(), geometry.total_rows);
            for (index, row) in rows.iter().enumerate() {
                assert_eq!(
                    line_width(row),
                    usize::from(geometry.total_width),
                    "row {index} drifted at width {width}",
                );
            }
        }
    }

    #[test]
    fn divider_row_uses_junction_glyphs() {
        let geometry = layout(20, 3);
        let rows = merge(sample_list(3), Vec::new(), &geometry);
        let divider = row_text(&rows[2]);
        assert!(divider.starts_with('├'), "divider row: {divider}");
        assert!(divider.ends_with('┤'), "divider row: {divider}");
        assert!(divider.contains('┼'), "divider row: {divider}");
        assert!(!divider.contains('│'), "divider must span both panes");
    }

    #[test]
    fn outer_borders_carve_the_pane_boundary() {
        let geometry = layout(20, 3);
        let rows = merge(sample_list(3), Vec::new(), &geometry);
        let top = row_text(&rows[0]);
        let bottom = row_text(rows.last().unwrap_or(&Line::default()));
        assert!(top.starts_with('┌') && top.ends_with('┐'));
        assert!(top.contains('┬'));
        assert!(bottom.starts_with('└') && bottom.ends_with('┘'));
        assert!(bottom.contains('┴'));
    }

    #[test]
    fn panes_are_separated_on_content_rows() {
        let geometry = layout(20, 3);
        let rows = merge(sample_list(3), vec![Line::from("p")], &geometry);
        let content = row_text(&rows[1]);
        let boundary = 1 + usize::from(geometry.left_width);
        let glyphs: Vec<char> = content.chars().collect();
        assert_eq!(glyphs[0], '│');
        assert_eq!(glyphs[boundary], '│');
        assert_eq!(*glyphs.last().expect("non-empty row"), '│');
    }

    #[test]
    fn missing_pane_rows_render_as_padding() {
        let geometry = layout(20, 5);
        let rows = merge(sample_list(1), Vec::new(), &geometry);
        for row in &rows {
            assert_eq!(line_width(row), usize::from(geometry.total_width));
        }
    }
}
