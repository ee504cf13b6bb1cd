/// Scroll offset plus highlighted row over a list of `total_rows` rows, of
/// which `visible_rows` fit on screen.
///
/// Scroll and highlight move together on each key press but are clamped
/// independently. While scrolling down the window leads the highlight; at the
/// ends of the list one of the two stops while the other keeps moving. Both
/// pickers depend on this: the window follows the highlight without any
/// explicit "scroll into view" step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Viewport {
    scroll_offset: usize,
    highlight: usize,
    total_rows: usize,
    visible_rows: usize,
}

impl Viewport {
    pub fn new(total_rows: usize, visible_rows: usize) -> Self {
        Self {
            scroll_offset: 0,
            highlight: 0,
            total_rows,
            visible_rows,
        }
    }

    /// Start with the highlight on `row` (clamped to the list).
    pub fn with_highlight(mut self, row: usize) -> Self {
        self.highlight = row.min(self.total_rows.saturating_sub(1));
        self
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    pub fn highlight(&self) -> usize {
        self.highlight
    }

    pub fn total_rows(&self) -> usize {
        self.total_rows
    }

    pub fn visible_rows(&self) -> usize {
        self.visible_rows
    }

    /// Largest scroll offset that still fills the window.
    fn last_offset(&self) -> usize {
        self.total_rows.saturating_sub(self.visible_rows)
    }

    pub fn move_down(&mut self) {
        if self.highlight + 1 < self.total_rows {
            self.highlight += 1;
        }
        if self.scroll_offset < self.last_offset() {
            self.scroll_offset += 1;
        }
    }

    pub fn move_up(&mut self) {
        if self.scroll_offset > 0 {
            self.scroll_offset -= 1;
        }
        if self.highlight > 0 {
            self.highlight -= 1;
        }
    }

    /// Terminal was resized.
    pub fn resize(&mut self, visible_rows: usize) {
        self.visible_rows = visible_rows;
        self.scroll_offset = self.scroll_offset.min(self.last_offset());
    }

    /// Half-open `(start, end)` range of rows to draw.
    pub fn visible_window(&self) -> (usize, usize) {
        let end = (self.scroll_offset + self.visible_rows).min(self.total_rows);
        (self.scroll_offset, end)
    }

    #[cfg(test)]
    pub fn is_visible(&self, row: usize) -> bool {
        let (start, end) = self.visible_window();
        (start..end).contains(&row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_list_never_scrolls() {
        let mut vp = Viewport::new(3, 10);
        for _ in 0..5 {
            vp.move_down();
        }
        assert_eq!(vp.highlight(), 2);
        assert_eq!(vp.scroll_offset(), 0);
        assert_eq!(vp.visible_window(), (0, 3));
    }

    #[test]
    fn scroll_leads_then_stops_at_last_offset() {
        let mut vp = Viewport::new(10, 4);
        vp.move_down();
        assert_eq!((vp.scroll_offset(), vp.highlight()), (1, 1));

        for _ in 0..20 {
            vp.move_down();
        }
        assert_eq!(vp.scroll_offset(), 6);
        assert_eq!(vp.highlight(), 9);
        assert_eq!(vp.visible_window(), (6, 10));
    }

    #[test]
    fn move_up_floors_each_field_independently() {
        let mut vp = Viewport::new(10, 4);
        for _ in 0..20 {
            vp.move_down();
        }
        for _ in 0..6 {
            vp.move_up();
        }
        // Offset hit zero while the highlight kept its distance.
        assert_eq!(vp.scroll_offset(), 0);
        assert_eq!(vp.highlight(), 3);
        assert!(vp.is_visible(vp.highlight()));

        for _ in 0..10 {
            vp.move_up();
        }
        assert_eq!((vp.scroll_offset(), vp.highlight()), (0, 0));
    }

    #[test]
    fn highlight_stays_visible_while_navigating() {
        let mut vp = Viewport::new(25, 7).with_highlight(1);
        for _ in 0..30 {
            vp.move_down();
            assert!(vp.is_visible(vp.highlight()));
        }
        for _ in 0..30 {
            vp.move_up();
            assert!(vp.is_visible(vp.highlight()));
        }
    }

    #[test]
    fn offset_never_exceeds_last_offset() {
        let mut vp = Viewport::new(12, 5);
        for _ in 0..40 {
            vp.move_down();
            assert!(vp.scroll_offset() <= 12 - 5);
        }
    }

    #[test]
    fn resize_reclamps_offset() {
        let mut vp = Viewport::new(10, 3);
        for _ in 0..9 {
            vp.move_down();
        }
        assert_eq!(vp.scroll_offset(), 7);
        vp.resize(8);
        assert_eq!(vp.scroll_offset(), 2);
        assert_eq!(vp.visible_window(), (2, 10));
    }

    #[test]
    fn empty_list_is_inert() {
        let mut vp = Viewport::new(0, 5);
        vp.move_down();
        vp.move_up();
        assert_eq!((vp.scroll_offset(), vp.highlight()), (0, 0));
        assert_eq!(vp.visible_window(), (0, 0));
    }
}
