//! Command dispatch: one entry point from a discrete command to a tagged event.
//!
//! The event says what the engine did; it never plays a sound or shows a
//! message. Callers decide what side effects an event deserves.

use super::logic::{self, Step};
use super::state::GameState;

/// A discrete input to the engine. Time-dependent commands carry wall-clock ms.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Tick { now_ms: u64 },
    /// A single unbuffered click. The UI always goes through the click buffer.
    #[allow(dead_code)]
    Click { now_ms: u64 },
    ClickBatch { now_ms: u64, count: u32 },
    BuyUpgrade1,
    BuyUpgrade2,
    BuyEstate(usize),
    SellEstate(usize),
    ActivateBurst { now_ms: u64 },
    Reset,
}

/// What a command did.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Event {
    Ticked {
        auto_gain: f64,
        special_boosted: bool,
    },
    Clicked {
        clicks: u32,
        gain: f64,
    },
    Upgrade1 {
        purchased: bool,
        rank_increased: bool,
        /// Rank after the attempt.
        rank: u32,
    },
    Upgrade2 {
        purchased: bool,
        previous_level: u32,
        level: u32,
    },
    EstateBought {
        id: usize,
        purchased: bool,
    },
    EstateSold {
        id: usize,
        sold: bool,
        credited: f64,
    },
    Burst {
        activated: bool,
    },
    Reset,
}

impl Event {
    /// Whether the command changed the state.
    pub fn changed_state(&self) -> bool {
        match *self {
            Event::Ticked { .. } | Event::Reset => true,
            Event::Clicked { clicks, .. } => clicks > 0,
            Event::Upgrade1 { purchased, .. }
            | Event::Upgrade2 { purchased, .. }
            | Event::EstateBought { purchased, .. } => purchased,
            Event::EstateSold { sold, .. } => sold,
            Event::Burst { activated } => activated,
        }
    }
}

/// Apply one command to `state`.
pub fn apply(state: &GameState, command: Command) -> Step<Event> {
    match command {
        Command::Tick { now_ms } => {
            let Step { next_state, result } = logic::run_tick(state, now_ms);
            Step {
                next_state,
                result: Event::Ticked {
                    auto_gain: result.auto_gain,
                    special_boosted: result.special_boosted,
                },
            }
        }
        Command::Click { now_ms } => clicked(logic::apply_main_click(state, now_ms)),
        Command::ClickBatch { now_ms, count } => {
            clicked(logic::apply_buffered_main_clicks(state, now_ms, count))
        }
        Command::BuyUpgrade1 => {
            let Step { next_state, result } = logic::purchase_upgrade1(state);
            let rank = next_state.up3_level;
            Step {
                next_state,
                result: Event::Upgrade1 {
                    purchased: result.purchased,
                    rank_increased: result.rank_increased,
                    rank,
                },
            }
        }
        Command::BuyUpgrade2 => {
            let Step { next_state, result } = logic::purchase_upgrade2(state);
            Step {
                next_state,
                result: Event::Upgrade2 {
                    purchased: result.purchased,
                    previous_level: state.up2_level,
                    level: result.level,
                },
            }
        }
        Command::BuyEstate(id) => {
            let Step { next_state, result } = logic::buy_estate(state, id);
            Step {
                next_state,
                result: Event::EstateBought {
                    id,
                    purchased: result.purchased,
                },
            }
        }
        Command::SellEstate(id) => {
            let Step { next_state, result } = logic::sell_estate(state, id);
            Step {
                next_state,
                result: Event::EstateSold {
                    id,
                    sold: result.sold,
                    credited: result.credited,
                },
            }
        }
        Command::ActivateBurst { now_ms } => {
            let Step { next_state, result } = logic::activate_burst(state, now_ms);
            Step {
                next_state,
                result: Event::Burst {
                    activated: result.activated,
                },
            }
        }
        Command::Reset => Step {
            next_state: GameState::new(),
            result: Event::Reset,
        },
    }
}

fn clicked(step: Step<logic::ClickResult>) -> Step<Event> {
    Step {
        next_state: step.next_state,
        result: Event::Clicked {
            clicks: step.result.clicks,
            gain: step.result.gain,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_commands_leave_state_untouched() {
        let state = GameState::new();
        for command in [
            Command::BuyUpgrade1,
            Command::BuyUpgrade2,
            Command::BuyEstate(0),
            Command::SellEstate(0),
            Command::BuyEstate(17),
            Command::ActivateBurst { now_ms: 0 },
            Command::ClickBatch { now_ms: 0, count: 0 },
        ] {
            let step = apply(&state, command);
            assert!(!step.result.changed_state(), "{command:?}");
            assert_eq!(step.next_state, state, "{command:?}");
        }
    }

    #[test]
    fn upgrade2_event_carries_both_levels() {
        let state = GameState {
            score: 1_000.0,
            up2_level: 39,
            ..GameState::new()
        };
        let step = apply(&state, Command::BuyUpgrade2);
        assert_eq!(
            step.result,
            Event::Upgrade2 {
                purchased: true,
                previous_level: 39,
                level: 40,
            }
        );
    }

    #[test]
    fn upgrade1_event_reports_rank() {
        let state = GameState {
            score: 1e6,
            up1_level: 24,
            ..GameState::new()
        };
        let step = apply(&state, Command::BuyUpgrade1);
        assert_eq!(
            step.result,
            Event::Upgrade1 {
                purchased: true,
                rank_increased: true,
                rank: 1,
            }
        );
    }

    #[test]
    fn reset_returns_initial_state() {
        let state = GameState {
            score: 5e9,
            up1_level: 77,
            ..GameState::new()
        };
        let step = apply(&state, Command::Reset);
        assert_eq!(step.next_state, GameState::new());
        assert!(step.result.changed_state());
    }

    #[test]
    fn single_click_and_batch_of_one_agree() {
        let state = GameState {
            up2_level: 45,
            focus: 33.0,
            ..GameState::new()
        };
        let single = apply(&state, Command::Click { now_ms: 5 });
        let batch = apply(&state, Command::ClickBatch { now_ms: 5, count: 1 });
        assert_eq!(single.next_state.focus, batch.next_state.focus);
        assert!((single.next_state.score - batch.next_state.score).abs() < 1e-12);
    }
}
