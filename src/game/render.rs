//! Rendering: header with the economy, tab bar, one content panel, footer.
//!
//! Every `[X]` hint is drawn through `push_clickable`, so each key shown on
//! screen is also a tap target.

use std::cell::RefCell;
use std::rc::Rc;

use ratzilla::ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratzilla::ratatui::style::{Color, Modifier, Style};
use ratzilla::ratatui::text::{Line, Span};
use ratzilla::ratatui::widgets::{Block, Borders, Paragraph};
use ratzilla::ratatui::Frame;

use crate::input::{is_narrow_layout, ClickState};
use crate::storage::KeyValueStore;
use crate::widgets::{ClickableList, TabBar};

use super::actions::*;
use super::balance::{BURST_FOCUS_COST, BURST_UNLOCK_LEVEL, FOCUS_CAP, FOCUS_UNLOCK_LEVEL};
use super::logic::{
    self, burst_phase, can_activate_burst, can_buy_estate, format_number, get_next_rank_target,
    BurstPhase,
};
use super::state::{Estate, GameState};
use super::{estate_key, MakashaGame, Panel};

const GAUGE_WIDTH: usize = 20;

pub fn render<S: KeyValueStore>(
    game: &MakashaGame<S>,
    f: &mut Frame,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(8), // header
            Constraint::Length(1), // tabs
            Constraint::Min(5),    // panel
            Constraint::Length(3), // toast / help
        ])
        .split(area);

    let narrow = is_narrow_layout(area.width);
    let now = game.session.display_now();
    let state = game.session.state();

    render_header(state, now, narrow, f, chunks[0], click_state);
    render_tabs(game.panel, f, chunks[1], click_state);

    if game.confirm_reset {
        render_reset_confirm(f, chunks[2], click_state);
    } else {
        match game.panel {
            Panel::Upgrades => render_upgrades(state, narrow, f, chunks[2], click_state),
            Panel::Estates => render_estates(state, narrow, f, chunks[2], click_state),
            Panel::Settings => render_settings(game, f, chunks[2], click_state),
        }
    }

    render_footer(game, f, chunks[3]);
}

fn render_header(
    state: &GameState,
    now: u64,
    narrow: bool,
    f: &mut Frame,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let mut cl = ClickableList::new();
    let label = Style::default().fg(Color::DarkGray);
    let value = Style::default().fg(Color::White).add_modifier(Modifier::BOLD);

    cl.push(Line::from(vec![
        Span::styled(" Score ", label),
        Span::styled(
            format_number(state.score),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ),
    ]));

    let mult = logic::calculate_dynamic_multiplier(state, now);
    let mut income = vec![
        Span::styled(" Click ", label),
        Span::styled(format!("+{}", format_number(logic::effective_click_power(state, now))), value),
        Span::styled("  Auto ", label),
        Span::styled(format!("+{}/s", format_number(logic::effective_auto_power(state, now))), value),
    ];
    if !narrow {
        income.push(Span::styled("  Mult ", label));
        income.push(Span::styled(format!("x{mult:.2}"), value));
    }
    cl.push(Line::from(income));

    cl.push(rank_line(state));
    cl.push(focus_line(state));

    cl.push_clickable(
        Line::from(vec![
            Span::styled(
                " [C] ",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
            Span::styled("Click!", Style::default().fg(Color::White)),
        ]),
        CLICK_MAIN,
    );
    push_burst(&mut cl, state, now);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Makasha Sim ");
    let mut cs = click_state.borrow_mut();
    cl.register_targets_with_block(area, &block, &mut cs);
    drop(cs);
    f.render_widget(Paragraph::new(cl.into_lines()).block(block), area);
}

fn rank_line(state: &GameState) -> Line<'static> {
    let rank = state.up3_level;
    let mult = format_number(logic::get_rank_multiplier(rank));
    let next = match get_next_rank_target(rank) {
        Some(target) => format!(
            "  next at Lv {target} ({} to go)",
            target.saturating_sub(state.up1_level)
        ),
        None => "  max rank".to_string(),
    };
    Line::from(vec![
        Span::styled(" Rank ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            format!("{rank} (x{mult})"),
            Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD),
        ),
        Span::styled(next, Style::default().fg(Color::DarkGray)),
    ])
}

fn focus_line(state: &GameState) -> Line<'static> {
    if !logic::focus_unlocked(state) {
        return Line::from(Span::styled(
            format!(" Focus unlocks at settlement Lv {FOCUS_UNLOCK_LEVEL}"),
            Style::default().fg(Color::DarkGray),
        ));
    }
    let filled = ((state.focus / FOCUS_CAP) * GAUGE_WIDTH as f64).round() as usize;
    let filled = filled.min(GAUGE_WIDTH);
    Line::from(vec![
        Span::styled(" Focus ", Style::default().fg(Color::DarkGray)),
        Span::styled("█".repeat(filled), Style::default().fg(Color::Cyan)),
        Span::styled(
            "░".repeat(GAUGE_WIDTH - filled),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(
            format!(" {:.0}/{FOCUS_CAP:.0}", state.focus),
            Style::default().fg(Color::White),
        ),
    ])
}

fn push_burst(cl: &mut ClickableList, state: &GameState, now: u64) {
    let dim = Style::default().fg(Color::DarkGray);
    let key = |color: Color| {
        Span::styled(
            " [B] ",
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )
    };

    match burst_phase(state, now) {
        BurstPhase::Locked => cl.push(Line::from(Span::styled(
            format!(" Burst unlocks at settlement Lv {BURST_UNLOCK_LEVEL}"),
            dim,
        ))),
        BurstPhase::Active { remaining_ms } => cl.push(Line::from(Span::styled(
            format!(" BURST x3  {}s left", remaining_ms.div_ceil(1000)),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ))),
        BurstPhase::Cooldown { remaining_ms } => cl.push(Line::from(Span::styled(
            format!(" Burst cooling down  {}s", remaining_ms.div_ceil(1000)),
            dim,
        ))),
        BurstPhase::Charging | BurstPhase::Ready => {
            let line = if can_activate_burst(state, now) {
                Line::from(vec![
                    key(Color::Red),
                    Span::styled(
                        "Burst ready!",
                        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                    ),
                ])
            } else {
                Line::from(vec![
                    key(Color::DarkGray),
                    Span::styled(format!("Burst  needs {BURST_FOCUS_COST:.0} focus"), dim),
                ])
            };
            cl.push_clickable(line, ACTIVATE_BURST);
        }
    }
}

fn render_tabs(panel: Panel, f: &mut Frame, area: Rect, click_state: &Rc<RefCell<ClickState>>) {
    let style = |p: Panel, color: Color| {
        if p == panel {
            Style::default()
                .fg(Color::Black)
                .bg(color)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(color)
        }
    };

    let mut cs = click_state.borrow_mut();
    TabBar::new(" | ")
        .tab("Upgrades", style(Panel::Upgrades, Color::Green), TAB_UPGRADES)
        .tab("Estates", style(Panel::Estates, Color::Yellow), TAB_ESTATES)
        .tab("Settings", style(Panel::Settings, Color::Blue), TAB_SETTINGS)
        .render(f, area, &mut cs);
}

fn button_style(enabled: bool, color: Color) -> (Style, Style) {
    if enabled {
        (
            Style::default().fg(color).add_modifier(Modifier::BOLD),
            Style::default().fg(Color::White),
        )
    } else {
        (
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::BOLD),
            Style::default().fg(Color::DarkGray),
        )
    }
}

fn render_upgrades(
    state: &GameState,
    narrow: bool,
    f: &mut Frame,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let mut cl = ClickableList::new();

    let (key, text) = button_style(state.score >= state.up1_cost, Color::Green);
    cl.push_clickable(
        Line::from(vec![
            Span::styled(" [1] ", key),
            Span::styled(
                format!("Power Lv {}  cost {}", state.up1_level, format_number(state.up1_cost)),
                text,
            ),
        ]),
        BUY_UPGRADE1,
    );
    if !narrow {
        let now_power = logic::get_click_power(state.up1_level, state.up3_level);
        let next_level = state.up1_level.saturating_add(1);
        let next_power = logic::get_click_power(next_level, logic::compute_rank(next_level));
        cl.push(Line::from(Span::styled(
            format!(
                "     base click {} -> {}",
                format_number(now_power),
                format_number(next_power)
            ),
            Style::default().fg(Color::DarkGray),
        )));
    }

    let (key, text) = button_style(state.score >= state.up2_cost, Color::Green);
    cl.push_clickable(
        Line::from(vec![
            Span::styled(" [2] ", key),
            Span::styled(
                format!(
                    "Settlement Lv {}  cost {}",
                    state.up2_level,
                    format_number(state.up2_cost)
                ),
                text,
            ),
        ]),
        BUY_UPGRADE2,
    );
    if !narrow {
        cl.push(Line::from(Span::styled(
            format!(
                "     auto {}/s, next level +{}",
                format_number(logic::get_auto_power(state.up2_level)),
                format_number(logic::get_next_auto_increment(state.up2_level))
            ),
            Style::default().fg(Color::DarkGray),
        )));
        let boost = logic::get_endgame_boost(state.up2_level);
        if boost > 1.0 {
            cl.push(Line::from(Span::styled(
                format!("     endgame boost x{boost:.2}"),
                Style::default().fg(Color::Magenta),
            )));
        }
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green))
        .title(" Upgrades ");
    let mut cs = click_state.borrow_mut();
    cl.register_targets_with_block(area, &block, &mut cs);
    drop(cs);
    f.render_widget(Paragraph::new(cl.into_lines()).block(block), area);
}

/// Why an unowned estate cannot be bought yet, if it can't.
fn estate_blocker(state: &GameState, estate: &Estate) -> Option<String> {
    if can_buy_estate(state, estate.id()) {
        None
    } else if state.up2_level < estate.req_level() {
        Some(format!("needs settlement Lv {}", estate.req_level()))
    } else if estate.is_special() && !state.all_regular_estates_owned() {
        Some("needs every other estate".to_string())
    } else {
        Some(format!("needs {}", format_number(estate.base_price())))
    }
}

fn render_estates(
    state: &GameState,
    narrow: bool,
    f: &mut Frame,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let mut cl = ClickableList::new();

    for estate in &state.estates {
        let Some(key) = estate_key(estate.id()) else {
            continue;
        };
        let name_style = if estate.is_special() {
            Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
        };

        if estate.owned {
            cl.push_clickable(
                Line::from(vec![
                    Span::styled(
                        format!(" [{}] ", key.to_ascii_uppercase()),
                        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(format!("Sell {}", estate.name()), name_style),
                    Span::styled(
                        format!("  for {}", format_number(estate.current_val)),
                        Style::default().fg(Color::Yellow),
                    ),
                ]),
                SELL_ESTATE_BASE + estate.id() as u16,
            );
            let mut detail = format!("     +{}/tick", format_number(estate.growth));
            if estate.is_special() {
                detail.push_str(&format!(", boost in {} ticks", state.ticks_until_tree_boost()));
            }
            cl.push(Line::from(Span::styled(detail, Style::default().fg(Color::DarkGray))));
        } else {
            let blocker = estate_blocker(state, estate);
            let (key_style, text_style) = button_style(blocker.is_none(), Color::Green);
            cl.push_clickable(
                Line::from(vec![
                    Span::styled(format!(" [{key}] "), key_style),
                    Span::styled(format!("Buy {}", estate.name()), text_style),
                    Span::styled(
                        format!("  {}", format_number(estate.base_price())),
                        text_style,
                    ),
                ]),
                BUY_ESTATE_BASE + estate.id() as u16,
            );
            let detail = match blocker {
                Some(reason) => format!("     {reason}"),
                None if narrow => format!("     +{}/tick", format_number(estate.growth)),
                None => format!("     +{}/tick  {}", format_number(estate.growth), estate.desc()),
            };
            cl.push(Line::from(Span::styled(detail, Style::default().fg(Color::DarkGray))));
        }
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Estates ");
    let mut cs = click_state.borrow_mut();
    cl.register_targets_with_block(area, &block, &mut cs);
    drop(cs);
    f.render_widget(Paragraph::new(cl.into_lines()).block(block), area);
}

fn render_settings<S: KeyValueStore>(
    game: &MakashaGame<S>,
    f: &mut Frame,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let settings = game.session.settings();
    let key = Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD);
    let text = Style::default().fg(Color::White);
    let mut cl = ClickableList::new();

    let sound = if settings.sfx_muted { "off" } else { "on" };
    cl.push_clickable(
        Line::from(vec![
            Span::styled(" [m] ", key),
            Span::styled(format!("Sound: {sound}"), text),
        ]),
        TOGGLE_MUTE,
    );
    cl.push_clickable(
        Line::from(vec![
            Span::styled(" [+] ", key),
            Span::styled(
                format!("Volume up    {:.0}%", settings.sfx_volume * 100.0),
                text,
            ),
        ]),
        VOLUME_UP,
    );
    cl.push_clickable(
        Line::from(vec![
            Span::styled(" [-] ", key),
            Span::styled("Volume down", text),
        ]),
        VOLUME_DOWN,
    );
    cl.push_clickable(
        Line::from(vec![
            Span::styled(" [f] ", key),
            Span::styled(format!("Effects: {}", settings.effect_mode.as_str()), text),
        ]),
        TOGGLE_EFFECTS,
    );
    cl.push(Line::from(""));
    cl.push_clickable(
        Line::from(vec![
            Span::styled(
                " [r] ",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ),
            Span::styled("Reset progress", Style::default().fg(Color::Red)),
        ]),
        RESET_REQUEST,
    );

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Blue))
        .title(" Settings ");
    let mut cs = click_state.borrow_mut();
    cl.register_targets_with_block(area, &block, &mut cs);
    drop(cs);
    f.render_widget(Paragraph::new(cl.into_lines()).block(block), area);
}

fn render_reset_confirm(f: &mut Frame, area: Rect, click_state: &Rc<RefCell<ClickState>>) {
    let mut cl = ClickableList::new();
    cl.push(Line::from(Span::styled(
        " Reset all progress? Settings are kept.",
        Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
    )));
    cl.push(Line::from(""));
    cl.push_clickable(
        Line::from(vec![
            Span::styled(
                " [y] ",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ),
            Span::styled("Yes, reset", Style::default().fg(Color::Red)),
        ]),
        RESET_CONFIRM,
    );
    cl.push_clickable(
        Line::from(vec![
            Span::styled(
                " [n] ",
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            ),
            Span::styled("Cancel", Style::default().fg(Color::White)),
        ]),
        RESET_CANCEL,
    );

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red))
        .title(" Reset ");
    let mut cs = click_state.borrow_mut();
    cl.register_targets_with_block(area, &block, &mut cs);
    drop(cs);
    f.render_widget(Paragraph::new(cl.into_lines()).block(block), area);
}

fn render_footer<S: KeyValueStore>(game: &MakashaGame<S>, f: &mut Frame, area: Rect) {
    let line = match game.session.toast() {
        Some(toast) => Line::from(Span::styled(
            format!(" {}", toast.notice.message()),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )),
        None => Line::from(Span::styled(
            " c click  1/2 upgrades  b burst  e estates  s settings",
            Style::default().fg(Color::DarkGray),
        )),
    };
    let footer = Paragraph::new(line).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    f.render_widget(footer, area);
}
