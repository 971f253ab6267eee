//! Clickable UI components.
//!
//! Each component renders and registers its click targets in one place, so a
//! button can never be drawn on a row that does not react to taps.
//!
//! - [`TabBar`]: horizontal tab navigation.
//! - [`ClickableList`]: vertical list with per-row click targets.

use ratzilla::ratatui::layout::Rect;
use ratzilla::ratatui::style::{Color, Style};
use ratzilla::ratatui::text::{Line, Span};
use ratzilla::ratatui::widgets::{Block, Paragraph};
use ratzilla::ratatui::Frame;

use crate::input::ClickState;

// ── TabBar ─────────────────────────────────────────────────────

/// A single-row tab bar. Click targets follow the rendered label widths.
///
/// ```ignore
/// TabBar::new(" | ")
///     .tab("Upgrades", tab_style(0), TAB_UPGRADES)
///     .tab("Estates", tab_style(1), TAB_ESTATES)
///     .render(f, area, &mut cs);
/// ```
pub struct TabBar<'a> {
    tabs: Vec<(String, Style, u16)>,
    separator: &'a str,
}

impl<'a> TabBar<'a> {
    pub fn new(separator: &'a str) -> Self {
        Self {
            tabs: Vec::new(),
            separator,
        }
    }

    pub fn tab(mut self, label: impl Into<String>, style: Style, action_id: u16) -> Self {
        self.tabs.push((label.into(), style, action_id));
        self
    }

    /// `(display_width, action_id)` of each padded label.
    fn tab_widths(&self) -> Vec<(u16, u16)> {
        self.tabs
            .iter()
            .map(|(label, _, id)| (Line::from(format!(" {label} ")).width() as u16, *id))
            .collect()
    }

    pub fn render(self, f: &mut Frame, area: Rect, cs: &mut ClickState) {
        let sep_width = Line::from(self.separator).width() as u16;
        let tab_widths = self.tab_widths();

        let mut spans: Vec<Span> = Vec::new();
        for (i, (label, style, _)) in self.tabs.iter().enumerate() {
            if i > 0 {
                spans.push(Span::styled(self.separator, Style::default().fg(Color::DarkGray)));
            }
            spans.push(Span::styled(format!(" {label} "), *style));
        }

        f.render_widget(Paragraph::new(Line::from(spans)), area);
        cs.register_tab_targets(
            &tab_widths,
            sep_width,
            area.x,
            area.y,
            area.width,
            area.height.max(1),
        );
    }
}

// ── ClickableList ──────────────────────────────────────────────

/// Lines paired with click actions.
///
/// Annotate a line as clickable when adding it; after layout, one call to
/// [`register_targets`](ClickableList::register_targets) binds every action
/// to the row its line landed on. Lines are assumed not to wrap.
///
/// ```ignore
/// let mut cl = ClickableList::new();
/// cl.push(Line::from("Score: 1.2K"));
/// cl.push_clickable(Line::from(" [1] Power"), BUY_UPGRADE1);
/// cl.register_targets_with_block(area, &block, &mut cs);
/// f.render_widget(Paragraph::new(cl.into_lines()).block(block), area);
/// ```
#[derive(Default)]
pub struct ClickableList<'a> {
    lines: Vec<Line<'a>>,
    /// `(line_index, action_id)`
    actions: Vec<(u16, u16)>,
}

impl<'a> ClickableList<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a non-clickable line.
    pub fn push(&mut self, line: Line<'a>) {
        self.lines.push(line);
    }

    /// Add a line that triggers `action_id` when tapped.
    pub fn push_clickable(&mut self, line: Line<'a>, action_id: u16) {
        self.actions.push((self.lines.len() as u16, action_id));
        self.lines.push(line);
    }

    pub fn into_lines(self) -> Vec<Line<'a>> {
        self.lines
    }

    /// Register a row target for every clickable line.
    ///
    /// * `top_offset` / `bottom_offset`: rows taken by borders above and below.
    /// * `scroll`: lines scrolled out of view at the top.
    pub fn register_targets(
        &self,
        area: Rect,
        cs: &mut ClickState,
        top_offset: u16,
        bottom_offset: u16,
        scroll: u16,
    ) {
        let content_y = area.y + top_offset;
        let content_end = area.y + area.height.saturating_sub(bottom_offset);

        for &(line_idx, action_id) in &self.actions {
            if line_idx < scroll {
                continue;
            }
            let row = content_y + (line_idx - scroll);
            if row >= content_end {
                continue;
            }
            cs.add_row_target(area, row, action_id);
        }
    }

    /// Like [`register_targets`](ClickableList::register_targets), with the
    /// offsets taken from the block the list is rendered in.
    pub fn register_targets_with_block(&self, area: Rect, block: &Block, cs: &mut ClickState) {
        let inner = block.inner(area);
        let top = inner.y.saturating_sub(area.y);
        let bottom = (area.y + area.height).saturating_sub(inner.y + inner.height);
        self.register_targets(area, cs, top, bottom, 0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::actions::*;
    use ratzilla::ratatui::widgets::Borders;

    #[test]
    fn tab_bar_widths_include_padding() {
        let bar = TabBar::new(" | ")
            .tab("Upgrades", Style::default(), TAB_UPGRADES)
            .tab("Estates", Style::default(), TAB_ESTATES);
        assert_eq!(bar.tab_widths(), vec![(10, TAB_UPGRADES), (9, TAB_ESTATES)]);
    }

    #[test]
    fn clickable_list_rows() {
        let mut cl = ClickableList::new();
        cl.push(Line::from("Score"));
        cl.push_clickable(Line::from(" [1] Power"), BUY_UPGRADE1);
        cl.push_clickable(Line::from(" [2] Settlement"), BUY_UPGRADE2);
        cl.push(Line::from("footer"));
        assert_eq!(cl.lines.len(), 4);

        // Borders::ALL: one row above and below the content.
        let area = Rect::new(0, 5, 80, 10);
        let mut cs = ClickState::new();
        cl.register_targets(area, &mut cs, 1, 1, 0);

        assert_eq!(cs.targets.len(), 2);
        assert_eq!(cs.hit_test(10, 6), None);
        assert_eq!(cs.hit_test(10, 7), Some(BUY_UPGRADE1));
        assert_eq!(cs.hit_test(10, 8), Some(BUY_UPGRADE2));
        assert_eq!(cs.hit_test(10, 9), None);
    }

    #[test]
    fn clickable_list_with_scroll() {
        let mut cl = ClickableList::new();
        for id in 0..4u16 {
            cl.push_clickable(Line::from(format!("estate {id}")), BUY_ESTATE_BASE + id);
        }

        let area = Rect::new(0, 10, 80, 5);
        let mut cs = ClickState::new();
        cl.register_targets(area, &mut cs, 0, 1, 2);

        assert_eq!(cs.targets.len(), 2);
        assert_eq!(cs.hit_test(10, 10), Some(BUY_ESTATE_BASE + 2));
        assert_eq!(cs.hit_test(10, 11), Some(BUY_ESTATE_BASE + 3));
    }

    #[test]
    fn clickable_list_clipped_by_area() {
        let mut cl = ClickableList::new();
        for i in 0..20u16 {
            cl.push_clickable(Line::from(format!("item {i}")), 50 + i);
        }

        let area = Rect::new(0, 0, 80, 5);
        let mut cs = ClickState::new();
        cl.register_targets(area, &mut cs, 1, 1, 0);

        assert_eq!(cs.targets.len(), 3);
        assert_eq!(cs.hit_test(10, 1), Some(50));
        assert_eq!(cs.hit_test(10, 3), Some(52));
        assert_eq!(cs.hit_test(10, 4), None);
    }

    #[test]
    fn offsets_from_block() {
        let mut cl = ClickableList::new();
        cl.push(Line::from("header"));
        cl.push_clickable(Line::from(" [y] Yes"), RESET_CONFIRM);

        let area = Rect::new(0, 2, 40, 6);
        let mut cs = ClickState::new();
        cl.register_targets_with_block(area, &Block::default().borders(Borders::ALL), &mut cs);
        assert_eq!(cs.hit_test(3, 4), Some(RESET_CONFIRM));

        let mut cs = ClickState::new();
        cl.register_targets_with_block(area, &Block::default().borders(Borders::BOTTOM), &mut cs);
        assert_eq!(cs.hit_test(3, 3), Some(RESET_CONFIRM));
    }

    #[test]
    fn empty_list_registers_nothing() {
        let cl: ClickableList = ClickableList::new();
        assert!(cl.lines.is_empty());
        let mut cs = ClickState::new();
        cl.register_targets(Rect::new(0, 0, 80, 10), &mut cs, 1, 1, 0);
        assert!(cs.targets.is_empty());
    }
}
