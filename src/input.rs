//! Input plumbing: click targets, pixel-to-cell conversion, and event types.
//!
//! Render code registers a target for every clickable row or tab; the mouse
//! handler in `main.rs` converts a DOM pixel position to a terminal cell and
//! hit-tests it here.

use ratzilla::ratatui::layout::Rect;

/// Input normalized from keyboard, mouse, and touch sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// A key press from keyboard.
    Key(char),
    /// A click/tap on a registered target, identified by its action ID
    /// (see `game::actions`).
    Click(u16),
}

/// A region on screen that can be tapped/clicked to trigger an action.
#[derive(Debug, Clone)]
pub struct ClickTarget {
    /// Hit region in terminal cell coordinates.
    pub rect: Rect,
    pub action_id: u16,
}

/// Shared between the render loop (which fills it) and the mouse handler.
#[derive(Debug, Default)]
pub struct ClickState {
    pub targets: Vec<ClickTarget>,
    pub terminal_cols: u16,
    pub terminal_rows: u16,
}

impl ClickState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new frame: remember the terminal size and drop last frame's targets.
    pub fn begin_frame(&mut self, area: Rect) {
        self.terminal_cols = area.width;
        self.terminal_rows = area.height;
        self.targets.clear();
    }

    pub fn add_click_target(&mut self, rect: Rect, action_id: u16) {
        self.targets.push(ClickTarget { rect, action_id });
    }

    /// Register a full-width target on `row`, if the row lies inside `area`.
    pub fn add_row_target(&mut self, area: Rect, row: u16, action_id: u16) {
        if row >= area.y && row < area.y + area.height {
            self.add_click_target(Rect::new(area.x, row, area.width, 1), action_id);
        }
    }

    /// Register targets for a horizontal tab bar from the rendered label widths.
    ///
    /// `tab_widths` holds `(display_width, action_id)` per padded label. Each
    /// target covers its label plus half of the neighbouring separators; the
    /// first and last tabs extend to the edges of the bar.
    pub fn register_tab_targets(
        &mut self,
        tab_widths: &[(u16, u16)],
        separator_width: u16,
        x: u16,
        y: u16,
        total_width: u16,
        height: u16,
    ) {
        let n = tab_widths.len();
        if n == 0 || total_width == 0 {
            return;
        }

        let mut starts: Vec<u16> = Vec::with_capacity(n);
        let mut cursor: u16 = 0;
        for (i, &(w, _)) in tab_widths.iter().enumerate() {
            if i > 0 {
                cursor += separator_width;
            }
            starts.push(cursor);
            cursor += w;
        }

        for (i, &(width, action_id)) in tab_widths.iter().enumerate() {
            let left = if i == 0 {
                0
            } else {
                let prev_end = starts[i - 1] + tab_widths[i - 1].0;
                prev_end + (starts[i] - prev_end) / 2
            };
            let right = if i == n - 1 {
                total_width
            } else {
                let end = starts[i] + width;
                end + (starts[i + 1] - end) / 2
            };

            let w = right.saturating_sub(left);
            if w > 0 {
                self.add_click_target(Rect::new(x + left, y, w, height), action_id);
            }
        }
    }

    /// Action under a cell. Later targets sit on top of earlier ones.
    pub fn hit_test(&self, col: u16, row: u16) -> Option<u16> {
        self.targets.iter().rev().find_map(|t| {
            let r = &t.rect;
            if col >= r.x && col < r.x + r.width && row >= r.y && row < r.y + r.height {
                Some(t.action_id)
            } else {
                None
            }
        })
    }

    /// Hit-test a pixel position relative to the grid container's top-left.
    pub fn hit_test_pixels(
        &self,
        click_x: f64,
        click_y: f64,
        grid_width: f64,
        grid_height: f64,
    ) -> Option<u16> {
        let col = pixel_x_to_col(click_x, grid_width, self.terminal_cols)?;
        let row = pixel_y_to_row(click_y, grid_height, self.terminal_rows)?;
        self.hit_test(col, row)
    }
}

/// Whether a screen width (in columns) should use the compact layout.
pub fn is_narrow_layout(width: u16) -> bool {
    width < 60
}

/// Pixel Y (relative to the grid top) to terminal row. `None` when outside.
pub fn pixel_y_to_row(click_y: f64, grid_height: f64, terminal_rows: u16) -> Option<u16> {
    if grid_height <= 0.0 || terminal_rows == 0 || click_y < 0.0 {
        return None;
    }
    let cell_height = grid_height / terminal_rows as f64;
    let row = (click_y / cell_height) as u16;
    (row < terminal_rows).then_some(row)
}

/// Pixel X (relative to the grid left) to terminal column. `None` when outside.
pub fn pixel_x_to_col(click_x: f64, grid_width: f64, terminal_cols: u16) -> Option<u16> {
    if grid_width <= 0.0 || terminal_cols == 0 || click_x < 0.0 {
        return None;
    }
    let cell_width = grid_width / terminal_cols as f64;
    let col = (click_x / cell_width) as u16;
    (col < terminal_cols).then_some(col)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::actions::*;

    // ── hit_test ────────────────────────────────────────────────

    #[test]
    fn hit_test_rows() {
        let mut cs = ClickState::new();
        cs.add_click_target(Rect::new(0, 10, 80, 1), BUY_UPGRADE1);
        cs.add_click_target(Rect::new(0, 11, 80, 1), BUY_UPGRADE2);

        assert_eq!(cs.hit_test(5, 10), Some(BUY_UPGRADE1));
        assert_eq!(cs.hit_test(5, 11), Some(BUY_UPGRADE2));
        assert_eq!(cs.hit_test(5, 9), None);
        assert_eq!(cs.hit_test(5, 12), None);
    }

    #[test]
    fn hit_test_multi_row_rect() {
        let mut cs = ClickState::new();
        cs.add_click_target(Rect::new(0, 5, 40, 3), CLICK_MAIN);

        assert_eq!(cs.hit_test(10, 4), None);
        assert_eq!(cs.hit_test(10, 5), Some(CLICK_MAIN));
        assert_eq!(cs.hit_test(10, 7), Some(CLICK_MAIN));
        assert_eq!(cs.hit_test(10, 8), None);
    }

    #[test]
    fn hit_test_overlap_last_wins() {
        let mut cs = ClickState::new();
        cs.add_click_target(Rect::new(0, 5, 80, 1), CLICK_MAIN);
        cs.add_click_target(Rect::new(5, 5, 10, 1), ACTIVATE_BURST);

        assert_eq!(cs.hit_test(7, 5), Some(ACTIVATE_BURST));
        assert_eq!(cs.hit_test(0, 5), Some(CLICK_MAIN));
        assert_eq!(cs.hit_test(20, 5), Some(CLICK_MAIN));
    }

    #[test]
    fn begin_frame_resets_targets() {
        let mut cs = ClickState::new();
        cs.add_click_target(Rect::new(0, 1, 80, 1), CLICK_MAIN);
        cs.begin_frame(Rect::new(0, 0, 100, 40));
        assert!(cs.targets.is_empty());
        assert_eq!((cs.terminal_cols, cs.terminal_rows), (100, 40));
        assert_eq!(cs.hit_test(0, 1), None);
    }

    #[test]
    fn add_row_target_clipped_to_area() {
        let mut cs = ClickState::new();
        let area = Rect::new(5, 10, 30, 5);
        cs.add_row_target(area, 9, BUY_ESTATE_BASE);
        cs.add_row_target(area, 15, BUY_ESTATE_BASE + 1);
        assert!(cs.targets.is_empty());

        cs.add_row_target(area, 12, SELL_ESTATE_BASE + 2);
        assert_eq!(cs.hit_test(15, 12), Some(SELL_ESTATE_BASE + 2));
        assert_eq!(cs.hit_test(4, 12), None);
    }

    // ── tab bar targets ─────────────────────────────────────────

    #[test]
    fn tab_targets_split_separators() {
        // [6][3][6][3][6] in an 80-wide bar
        let mut cs = ClickState::new();
        let tabs = [(6, TAB_UPGRADES), (6, TAB_ESTATES), (6, TAB_SETTINGS)];
        cs.register_tab_targets(&tabs, 3, 0, 5, 80, 1);

        assert_eq!(cs.targets.len(), 3);
        assert_eq!(cs.hit_test(0, 5), Some(TAB_UPGRADES));
        assert_eq!(cs.hit_test(6, 5), Some(TAB_UPGRADES));
        assert_eq!(cs.hit_test(7, 5), Some(TAB_ESTATES));
        assert_eq!(cs.hit_test(15, 5), Some(TAB_ESTATES));
        assert_eq!(cs.hit_test(16, 5), Some(TAB_SETTINGS));
        assert_eq!(cs.hit_test(79, 5), Some(TAB_SETTINGS));
    }

    #[test]
    fn tab_targets_respect_offset() {
        let mut cs = ClickState::new();
        let tabs = [(6, TAB_UPGRADES), (6, TAB_ESTATES)];
        cs.register_tab_targets(&tabs, 1, 5, 3, 30, 2);

        assert_eq!(cs.hit_test(5, 3), Some(TAB_UPGRADES));
        assert_eq!(cs.hit_test(5, 4), Some(TAB_UPGRADES));
        assert_eq!(cs.hit_test(4, 3), None);
    }

    #[test]
    fn tab_targets_empty() {
        let mut cs = ClickState::new();
        cs.register_tab_targets(&[], 3, 0, 0, 80, 1);
        assert!(cs.targets.is_empty());
    }

    // ── pixel conversion ────────────────────────────────────────

    #[test]
    fn narrow_layout_threshold() {
        assert!(is_narrow_layout(59));
        assert!(!is_narrow_layout(60));
    }

    #[test]
    fn pixel_to_row() {
        assert_eq!(pixel_y_to_row(0.0, 450.0, 30), Some(0));
        assert_eq!(pixel_y_to_row(14.0, 450.0, 30), Some(0));
        assert_eq!(pixel_y_to_row(15.0, 450.0, 30), Some(1));
        assert_eq!(pixel_y_to_row(449.0, 450.0, 30), Some(29));
        assert_eq!(pixel_y_to_row(450.0, 450.0, 30), None);
        assert_eq!(pixel_y_to_row(-1.0, 450.0, 30), None);
        assert_eq!(pixel_y_to_row(10.0, 0.0, 30), None);
        assert_eq!(pixel_y_to_row(10.0, 450.0, 0), None);
    }

    #[test]
    fn pixel_to_col() {
        assert_eq!(pixel_x_to_col(0.0, 800.0, 80), Some(0));
        assert_eq!(pixel_x_to_col(10.0, 800.0, 80), Some(1));
        assert_eq!(pixel_x_to_col(799.0, 800.0, 80), Some(79));
        assert_eq!(pixel_x_to_col(800.0, 800.0, 80), None);
        assert_eq!(pixel_x_to_col(-1.0, 800.0, 80), None);
    }

    #[test]
    fn tap_pipeline() {
        let mut cs = ClickState::new();
        cs.begin_frame(Rect::new(0, 0, 40, 30));
        cs.add_row_target(Rect::new(0, 0, 40, 30), 11, BUY_UPGRADE1);
        cs.add_click_target(Rect::new(20, 12, 20, 1), ACTIVATE_BURST);

        // 10px x 15px cells
        let (w, h) = (400.0, 450.0);
        assert_eq!(cs.hit_test_pixels(35.0, 11.0 * 15.0 + 7.0, w, h), Some(BUY_UPGRADE1));
        assert_eq!(cs.hit_test_pixels(205.0, 12.0 * 15.0 + 1.0, w, h), Some(ACTIVATE_BURST));
        assert_eq!(cs.hit_test_pixels(195.0, 12.0 * 15.0 + 1.0, w, h), None);
        assert_eq!(cs.hit_test_pixels(-3.0, 100.0, w, h), None);
    }
}
