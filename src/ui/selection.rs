//! Pure selection and scroll arithmetic for the two panes.

/// Move the selection by `delta`, wrapping modulo the result count.
/// An empty result set pins the selection at 0.
#[must_use]
pub(crate) fn move_wrapping(selected: usize, len: usize, delta: isize) -> usize {
    if len == 0 {
        return 0;
    }
    let len = len as isize;
    let moved = (selected as isize + delta).rem_euclid(len);
    moved as usize
}

/// First visible index of the result window.
///
/// The window is centered on the selection when possible so the highlighted
/// row stays visually stable during fast navigation instead of jumping to an
/// edge.
#[must_use]
pub(crate) fn window_start(selected: usize, len: usize, rows: usize) -> usize {
    let window = rows.min(len);
    if window == 0 {
        return 0;
    }
    let preferred = selected.saturating_sub(window / 2);
    preferred.min(len - window)
}

/// Clamp a preview scroll offset to the loaded content.
#[must_use]
pub(crate) fn clamp_scroll(offset: usize, line_count: usize, visible_rows: usize) -> usize {
    offset.min(line_count.saturating_sub(visible_rows))
}

/// Apply a signed scroll step and re-clamp.
#[must_use]
pub(crate) fn step_scroll(
    offset: usize,
    delta: isize,
    line_count: usize,
    visible_rows: usize,
) -> usize {
    let stepped = offset.saturating_add_signed(delta);
    clamp_scroll(stepped, line_count, visible_rows)
}

/// Half of the visible content height, never less than one line.
#[must_use]
pub(crate) fn half_page(visible_rows: usize) -> usize {
    (visible_rows / 2).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrapping_moves_stay_in_bounds() {
        let len = 7;
        let mut selected = 0;
        let moves = [1, 1, -3, 5, -1, 20, -20, 1];
        for delta in moves {
            selected = move_wrapping(selected, len, delta);
            assert!(selected < len, "selection {selected} escaped 0..{len}");
        }
    }

    #[test]
    fn wraps_at_both_ends() {
        assert_eq!(move_wrapping(0, 5, -1), 4);
        assert_eq!(move_wrapping(4, 5, 1), 0);
    }

    #[test]
    fn empty_results_pin_selection() {
        assert_eq!(move_wrapping(0, 0, 1), 0);
        assert_eq!(move_wrapping(0, 0, -1), 0);
    }

    #[test]
    fn window_centers_the_selection() {
        // 10 rows over 100 entries, selected 50: window starts at 45.
        assert_eq!(window_start(50, 100, 10), 45);
    }

    #[test]
    fn window_clamps_at_the_edges() {
        assert_eq!(window_start(0, 100, 10), 0);
        assert_eq!(window_start(2, 100, 10), 0);
        assert_eq!(window_start(99, 100, 10), 90);
        assert_eq!(window_start(96, 100, 10), 90);
    }

    #[test]
    fn window_shrinks_to_fit_small_result_sets() {
        assert_eq!(window_start(2, 3, 10), 0);
        assert_eq!(window_start(0, 0, 10), 0);
    }

    #[test]
    fn scroll_clamps_to_content() {
        assert_eq!(clamp_scroll(100, 20, 5), 15);
        assert_eq!(clamp_scroll(3, 20, 5), 3);
        assert_eq!(clamp_scroll(5, 3, 5), 0);
    }

    #[test]
    fn half_page_is_at_least_one() {
        assert_eq!(half_page(0), 1);
        assert_eq!(half_page(1), 1);
        assert_eq!(half_page(15), 7);
    }
}
