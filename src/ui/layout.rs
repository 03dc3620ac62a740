//! Two-pane geometry, recomputed from the overlay width on every render.

/// Narrowest overlay the geometry supports: borders, divider, and at least a
/// few columns per pane.
pub const MIN_WIDTH: u16 = 20;

/// Rows the preview column spends on its header: the file-name row and the
/// shared divider row.
const PREVIEW_HEADER_ROWS: usize = 2;

/// Derived pane geometry. Never cached across renders because the hosting
/// terminal may resize between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub total_width: u16,
    /// Width between the outer borders.
    pub inner_width: u16,
    pub left_width: u16,
    pub right_width: u16,
    /// Result rows in the list pane.
    pub list_rows: usize,
    /// Content rows in the preview pane.
    pub preview_rows: usize,
    /// Grid height including both horizontal borders.
    pub total_rows: usize,
}

/// Compute the geometry for `total_width`, clamped up to [`MIN_WIDTH`].
///
/// Invariant: `left_width + 1 + right_width == inner_width == total_width - 2`.
#[must_use]
pub fn layout(total_width: u16, list_rows: usize) -> Layout {
    let total_width = total_width.max(MIN_WIDTH);
    let inner_width = total_width - 2;
    let left_width = inner_width / 2;
    let right_width = inner_width - left_width - 1;

    // Interior rows: query row + divider row + result rows. The preview
    // column spans the same interior but spends its first two rows on the
    // header, leaving exactly `list_rows` for content.
    let interior_rows = list_rows + PREVIEW_HEADER_ROWS;
    Layout {
        total_width,
        inner_width,
        left_width,
        right_width,
        list_rows,
        preview_rows: interior_rows - PREVIEW_HEADER_ROWS,
        total_rows: interior_rows + 2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widths_always_sum_to_the_interior() {
        for width in MIN_WIDTH..=240 {
            let geometry = layout(width, 15);
            assert_eq!(
                geometry.left_width + 1 + geometry.right_width,
                geometry.inner_width,
                "pane widths must tile the interior at width {width}",
            );
            assert_eq!(geometry.inner_width, width - 2);
        }
    }

    #[test]
    fn narrow_widths_clamp_to_minimum() {
        let geometry = layout(3, 15);
        assert_eq!(geometry.total_width, MIN_WIDTH);
    }

    #[test]
    fn row_accounting() {
        let geometry = layout(80, 15);
        assert_eq!(geometry.list_rows, 15);
        assert_eq!(geometry.preview_rows, 15);
        // query + divider + 15 rows + 2 borders
        assert_eq!(geometry.total_rows, 19);
    }
}
