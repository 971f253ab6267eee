//! Makasha Sim: an incremental clicker about building a realm.
//!
//! Engine (`balance`, `state`, `logic`, `command`) is pure. `session` owns the
//! live state, its timers and persistence. This module adds the screen-level
//! UI state and maps keys and taps onto session calls.

pub mod actions;
pub mod balance;
pub mod command;
pub mod logic;
pub mod render;
pub mod save;
pub mod session;
pub mod state;

use std::cell::RefCell;
use std::rc::Rc;

use ratzilla::ratatui::layout::Rect;
use ratzilla::ratatui::Frame;

use crate::input::{ClickState, InputEvent};
use crate::storage::KeyValueStore;

use actions::*;
use command::Command;
use session::Session;

/// Content panel below the header.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Panel {
    #[default]
    Upgrades,
    Estates,
    Settings,
}

/// Keys that buy (lowercase) or sell (uppercase) estates, by id.
const ESTATE_KEYS: [char; 4] = ['a', 'd', 'g', 'w'];

pub struct MakashaGame<S: KeyValueStore> {
    pub session: Session<S>,
    pub panel: Panel,
    /// Reset was requested and awaits a yes / no.
    pub confirm_reset: bool,
}

impl<S: KeyValueStore> MakashaGame<S> {
    pub fn new(store: S) -> Self {
        Self {
            session: Session::new(store),
            panel: Panel::default(),
            confirm_reset: false,
        }
    }

    pub fn start(&mut self, now_ms: u64) {
        self.session.start(now_ms);
    }

    /// Restart a session stopped by [`shutdown`](Self::shutdown).
    pub fn resume(&mut self, now_ms: u64) {
        if !self.session.is_running() {
            self.session.start(now_ms);
        }
    }

    pub fn shutdown(&mut self, now_ms: u64) {
        self.session.shutdown(now_ms);
    }

    pub fn pump(&mut self, now_ms: u64) {
        self.session.pump(now_ms);
    }

    /// Handle an input event. Returns true if the event was consumed.
    pub fn handle_input(&mut self, event: &InputEvent, now_ms: u64) -> bool {
        if self.confirm_reset {
            return self.handle_confirm(event, now_ms);
        }
        match *event {
            InputEvent::Key(ch) => self.handle_key(ch, now_ms),
            InputEvent::Click(id) => self.handle_click(id, now_ms),
        }
    }

    fn handle_confirm(&mut self, event: &InputEvent, now_ms: u64) -> bool {
        match *event {
            InputEvent::Key('y') | InputEvent::Click(RESET_CONFIRM) => {
                self.confirm_reset = false;
                self.panel = Panel::default();
                self.session.submit(Command::Reset, now_ms);
            }
            InputEvent::Key('n') | InputEvent::Click(RESET_CANCEL) => {
                self.confirm_reset = false;
            }
            // Everything else is swallowed while the question is open.
            _ => {}
        }
        true
    }

    fn toggle_panel(&mut self, panel: Panel) {
        self.panel = if self.panel == panel {
            Panel::Upgrades
        } else {
            panel
        };
    }

    fn handle_key(&mut self, ch: char, now_ms: u64) -> bool {
        match ch {
            'c' | ' ' => self.session.enqueue_click(now_ms),
            '1' => {
                self.session.submit(Command::BuyUpgrade1, now_ms);
            }
            '2' => {
                self.session.submit(Command::BuyUpgrade2, now_ms);
            }
            'b' => {
                self.session.submit(Command::ActivateBurst { now_ms }, now_ms);
            }
            'u' => self.panel = Panel::Upgrades,
            'e' => self.toggle_panel(Panel::Estates),
            's' => self.toggle_panel(Panel::Settings),
            'm' => self.session.toggle_mute(),
            '+' | '=' => self.session.nudge_volume(1),
            '-' => self.session.nudge_volume(-1),
            'f' => self.session.toggle_effect_mode(),
            'r' => self.confirm_reset = true,
            _ if self.panel == Panel::Estates => return self.handle_estate_key(ch, now_ms),
            _ => return false,
        }
        true
    }

    fn handle_estate_key(&mut self, ch: char, now_ms: u64) -> bool {
        let lower = ch.to_ascii_lowercase();
        let Some(id) = ESTATE_KEYS.iter().position(|&k| k == lower) else {
            return false;
        };
        let command = if ch.is_ascii_uppercase() {
            Command::SellEstate(id)
        } else {
            Command::BuyEstate(id)
        };
        self.session.submit(command, now_ms);
        true
    }

    fn handle_click(&mut self, id: u16, now_ms: u64) -> bool {
        match id {
            CLICK_MAIN => self.session.enqueue_click(now_ms),
            ACTIVATE_BURST => {
                self.session.submit(Command::ActivateBurst { now_ms }, now_ms);
            }
            BUY_UPGRADE1 => {
                self.session.submit(Command::BuyUpgrade1, now_ms);
            }
            BUY_UPGRADE2 => {
                self.session.submit(Command::BuyUpgrade2, now_ms);
            }
            TAB_UPGRADES => self.panel = Panel::Upgrades,
            TAB_ESTATES => self.panel = Panel::Estates,
            TAB_SETTINGS => self.panel = Panel::Settings,
            TOGGLE_MUTE => self.session.toggle_mute(),
            VOLUME_UP => self.session.nudge_volume(1),
            VOLUME_DOWN => self.session.nudge_volume(-1),
            TOGGLE_EFFECTS => self.session.toggle_effect_mode(),
            RESET_REQUEST => self.confirm_reset = true,
            _ if (BUY_ESTATE_BASE..BUY_ESTATE_BASE + ESTATE_KEYS.len() as u16).contains(&id) => {
                let estate = (id - BUY_ESTATE_BASE) as usize;
                self.session.submit(Command::BuyEstate(estate), now_ms);
            }
            _ if (SELL_ESTATE_BASE..SELL_ESTATE_BASE + ESTATE_KEYS.len() as u16).contains(&id) => {
                let estate = (id - SELL_ESTATE_BASE) as usize;
                self.session.submit(Command::SellEstate(estate), now_ms);
            }
            _ => return false,
        }
        true
    }

    pub fn render(&self, f: &mut Frame, area: Rect, click_state: &Rc<RefCell<ClickState>>) {
        render::render(self, f, area, click_state);
    }
}

/// Key that buys estate `id` (sell is the uppercase form).
pub fn estate_key(id: usize) -> Option<char> {
    ESTATE_KEYS.get(id).copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::save;
    use crate::game::state::GameState;
    use crate::settings::EffectMode;
    use crate::storage::MemoryStore;

    fn game_with(state: GameState) -> MakashaGame<MemoryStore> {
        let mut store = MemoryStore::new();
        save::save_game_state(&mut store, &state, 0);
        let mut game = MakashaGame::new(store);
        game.start(0);
        game
    }

    #[test]
    fn click_key_buffers_until_flush() {
        let mut game = game_with(GameState::new());
        assert!(game.handle_input(&InputEvent::Key('c'), 0));
        assert!(game.handle_input(&InputEvent::Key(' '), 1));
        assert_eq!(game.session.state().score, 0.0);
        game.pump(40);
        assert_eq!(game.session.state().score, 2.0);
    }

    #[test]
    fn click_target_buffers_too() {
        let mut game = game_with(GameState::new());
        game.handle_input(&InputEvent::Click(CLICK_MAIN), 0);
        game.pump(34);
        assert_eq!(game.session.state().score, 1.0);
    }

    #[test]
    fn upgrade_keys_and_targets() {
        let mut game = game_with(GameState {
            score: 1_000.0,
            ..GameState::new()
        });
        game.handle_input(&InputEvent::Key('1'), 0);
        game.handle_input(&InputEvent::Click(BUY_UPGRADE2), 0);
        assert_eq!(game.session.state().up1_level, 1);
        assert_eq!(game.session.state().up2_level, 1);
    }

    #[test]
    fn estate_keys_only_in_estate_panel() {
        let mut game = game_with(GameState {
            score: 1e6,
            up2_level: 30,
            ..GameState::new()
        });
        assert!(!game.handle_input(&InputEvent::Key('a'), 0));
        assert!(!game.session.state().estates[0].owned);

        game.handle_input(&InputEvent::Key('e'), 0);
        assert_eq!(game.panel, Panel::Estates);
        assert!(game.handle_input(&InputEvent::Key('a'), 0));
        assert!(game.session.state().estates[0].owned);

        game.handle_input(&InputEvent::Key('A'), 0);
        assert!(!game.session.state().estates[0].owned);
        assert_eq!(game.session.state().score, 1e6);
    }

    #[test]
    fn estate_targets() {
        let mut game = game_with(GameState {
            score: 1e6,
            up2_level: 30,
            ..GameState::new()
        });
        game.handle_input(&InputEvent::Click(BUY_ESTATE_BASE), 0);
        assert!(game.session.state().estates[0].owned);
        game.handle_input(&InputEvent::Click(SELL_ESTATE_BASE), 0);
        assert!(!game.session.state().estates[0].owned);
        assert!(!game.handle_input(&InputEvent::Click(BUY_ESTATE_BASE + 9), 0));
    }

    #[test]
    fn panel_toggles() {
        let mut game = game_with(GameState::new());
        game.handle_input(&InputEvent::Key('s'), 0);
        assert_eq!(game.panel, Panel::Settings);
        game.handle_input(&InputEvent::Key('s'), 0);
        assert_eq!(game.panel, Panel::Upgrades);
        game.handle_input(&InputEvent::Click(TAB_ESTATES), 0);
        assert_eq!(game.panel, Panel::Estates);
        game.handle_input(&InputEvent::Key('u'), 0);
        assert_eq!(game.panel, Panel::Upgrades);
    }

    #[test]
    fn settings_inputs() {
        let mut game = game_with(GameState::new());
        game.handle_input(&InputEvent::Key('m'), 0);
        game.handle_input(&InputEvent::Key('-'), 0);
        game.handle_input(&InputEvent::Click(TOGGLE_EFFECTS), 0);
        let settings = game.session.settings();
        assert!(settings.sfx_muted);
        assert_eq!(settings.sfx_volume, 0.6);
        assert_eq!(settings.effect_mode, EffectMode::Off);
    }

    #[test]
    fn reset_needs_confirmation() {
        let mut game = game_with(GameState {
            score: 500.0,
            ..GameState::new()
        });
        game.handle_input(&InputEvent::Key('r'), 0);
        assert!(game.confirm_reset);

        // Other input is swallowed while the question is open.
        assert!(game.handle_input(&InputEvent::Key('1'), 0));
        assert_eq!(game.session.state().up1_level, 0);

        game.handle_input(&InputEvent::Key('n'), 0);
        assert!(!game.confirm_reset);
        assert_eq!(game.session.state().score, 500.0);

        game.handle_input(&InputEvent::Click(RESET_REQUEST), 0);
        game.handle_input(&InputEvent::Click(RESET_CONFIRM), 0);
        assert!(!game.confirm_reset);
        assert_eq!(game.session.state(), &GameState::new());
    }

    #[test]
    fn shutdown_then_resume() {
        let mut game = game_with(GameState {
            up2_level: 10,
            ..GameState::new()
        });
        game.handle_input(&InputEvent::Key('c'), 0);
        game.shutdown(5);
        assert!(!game.session.is_running());
        assert_eq!(game.session.state().score, 1.0);

        // Hidden time is not replayed.
        game.pump(60_000);
        game.resume(60_000);
        assert!(game.session.is_running());
        game.pump(60_999);
        assert_eq!(game.session.state().score, 1.0);
        game.pump(61_000);
        assert!(game.session.state().score > 1.0);

        // Resuming a running session keeps its schedule.
        game.resume(61_500);
        game.pump(62_000);
        assert_eq!(
            game.session.state().score,
            1.0 + 2.0 * crate::game::logic::get_auto_power(10)
        );
    }

    #[test]
    fn unknown_input_not_consumed() {
        let mut game = game_with(GameState::new());
        assert!(!game.handle_input(&InputEvent::Key('z'), 0));
        assert!(!game.handle_input(&InputEvent::Click(9_999), 0));
    }

    #[test]
    fn estate_key_lookup() {
        assert_eq!(estate_key(0), Some('a'));
        assert_eq!(estate_key(3), Some('w'));
        assert_eq!(estate_key(4), None);
    }
}
