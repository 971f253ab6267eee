//! Game session: the single owner of the live state and every timer.
//!
//! ## Timers
//!
//! | timer       | kind     | period / delay          | effect                      |
//! |-------------|----------|-------------------------|-----------------------------|
//! | tick        | interval | `TICK_MS`               | one `run_tick` per firing   |
//! | click flush | one-shot | `CLICK_FLUSH_MS`        | one batched click transition|
//! | clock       | interval | `CLOCK_REFRESH_MS`      | refresh `display_now`       |
//! | save        | debounce | `SAVE_DEBOUNCE_MS` (max `SAVE_MAX_WAIT_MS`) | write the save |
//!
//! The draw loop calls [`Session::pump`] every frame with the wall clock;
//! due timers fire in chronological order, each transition derived from the
//! state the previous one produced.

use super::balance::{BURST_UNLOCK_LEVEL, FOCUS_UNLOCK_LEVEL, TICK_MS};
use super::command::{self, Command, Event};
use super::logic;
use super::save;
use super::state::GameState;
use crate::settings::{EffectMode, Settings, VOLUME_STEP};
use crate::storage::KeyValueStore;
use crate::time::{Debounce, Interval, Timeout};

/// Delay between the first buffered click and its flush.
pub const CLICK_FLUSH_MS: u64 = 34;
/// Refresh period of the display clock.
pub const CLOCK_REFRESH_MS: u64 = 240;
pub const SAVE_DEBOUNCE_MS: u64 = 220;
pub const SAVE_MAX_WAIT_MS: u64 = 450;
/// Ticks replayed at most after the page was in the background.
pub const MAX_TICK_CATCH_UP: u32 = 5;
/// How long a notice stays on screen.
pub const TOAST_MS: u64 = 2800;

/// Something worth telling the player about.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Notice {
    RankUp { rank: u32, multiplier: f64 },
    FocusUnlocked,
    BurstUnlocked,
    BurstActivated,
    EstateAcquired { id: usize },
    ProgressReset,
}

impl Notice {
    /// Notice an engine event deserves, if any.
    pub fn from_event(event: &Event) -> Option<Notice> {
        match *event {
            Event::Upgrade1 {
                purchased: true,
                rank_increased: true,
                rank,
            } => Some(Notice::RankUp {
                rank,
                multiplier: logic::get_rank_multiplier(rank),
            }),
            Event::Upgrade2 {
                purchased: true,
                previous_level,
                level,
            } => {
                if previous_level < BURST_UNLOCK_LEVEL && level >= BURST_UNLOCK_LEVEL {
                    Some(Notice::BurstUnlocked)
                } else if previous_level < FOCUS_UNLOCK_LEVEL && level >= FOCUS_UNLOCK_LEVEL {
                    Some(Notice::FocusUnlocked)
                } else {
                    None
                }
            }
            Event::EstateBought {
                id,
                purchased: true,
            } => Some(Notice::EstateAcquired { id }),
            Event::Burst { activated: true } => Some(Notice::BurstActivated),
            Event::Reset => Some(Notice::ProgressReset),
            _ => None,
        }
    }

    pub fn message(&self) -> String {
        match self {
            Notice::RankUp { rank, multiplier } => {
                format!("Rank up! Rank {rank}, clicks x{}", logic::format_number(*multiplier))
            }
            Notice::FocusUnlocked => "Focus unlocked: clicking builds focus".to_string(),
            Notice::BurstUnlocked => "Burst unlocked: spend 60 focus for a burst".to_string(),
            Notice::BurstActivated => "Burst! Income x3 for 12s".to_string(),
            Notice::EstateAcquired { id } => {
                let name = super::balance::blueprint(*id).map_or("Estate", |b| b.name);
                format!("Acquired {name}")
            }
            Notice::ProgressReset => "Progress reset".to_string(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Toast {
    pub notice: Notice,
    pub expires_at: u64,
}

/// Which timer a pump step fires. Declaration order breaks ties.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Due {
    Tick,
    ClickFlush,
    Clock,
    Save,
}

pub struct Session<S: KeyValueStore> {
    state: GameState,
    settings: Settings,
    store: S,
    display_now: u64,
    tick: Interval,
    clock: Interval,
    pending_clicks: u32,
    click_flush: Timeout,
    save: Debounce,
    toast: Option<Toast>,
}

impl<S: KeyValueStore> Session<S> {
    /// Load the saved game and settings from `store`. Timers stay idle until
    /// [`start`](Session::start).
    pub fn new(mut store: S) -> Self {
        let state = save::load_game_state(&mut store);
        let settings = save::load_settings(&mut store);
        Self {
            state,
            settings,
            store,
            display_now: 0,
            tick: Interval::new(TICK_MS, MAX_TICK_CATCH_UP),
            clock: Interval::new(CLOCK_REFRESH_MS, 1),
            pending_clicks: 0,
            click_flush: Timeout::new(),
            save: Debounce::new(SAVE_DEBOUNCE_MS, SAVE_MAX_WAIT_MS),
            toast: None,
        }
    }

    pub fn start(&mut self, now_ms: u64) {
        self.display_now = now_ms;
        self.tick.start(now_ms);
        self.clock.start(now_ms);
        log::info!("session started");
    }

    pub fn is_running(&self) -> bool {
        self.tick.is_active()
    }

    /// Cancel every timer. Buffered clicks are applied and a pending save is
    /// written first. No-op when already stopped.
    pub fn shutdown(&mut self, now_ms: u64) {
        if !self.is_running() {
            return;
        }
        self.flush_clicks(now_ms);
        if self.save.is_pending() {
            self.write_save(now_ms);
        }
        self.tick.cancel();
        self.clock.cancel();
        self.click_flush.cancel();
        self.save.cancel();
        log::info!("session stopped");
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Wall clock as of the last display refresh.
    pub fn display_now(&self) -> u64 {
        self.display_now
    }

    #[cfg(test)]
    pub fn pending_clicks(&self) -> u32 {
        self.pending_clicks
    }

    #[cfg(test)]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The toast to show, if one is live at the display clock.
    pub fn toast(&self) -> Option<&Toast> {
        self.toast
            .as_ref()
            .filter(|t| t.expires_at > self.display_now)
    }

    // ── Input ───────────────────────────────────────────────────

    /// Buffer one click. The first click of a batch arms the flush timer.
    pub fn enqueue_click(&mut self, now_ms: u64) {
        if !self.is_running() {
            return;
        }
        self.pump(now_ms);
        self.pending_clicks = self.pending_clicks.saturating_add(1);
        self.click_flush.arm_if_idle(now_ms, CLICK_FLUSH_MS);
    }

    /// Apply a discrete command now. Timers already due fire first, then
    /// buffered clicks are resolved so the command sees the points they earned.
    pub fn submit(&mut self, command: Command, now_ms: u64) -> Event {
        self.pump(now_ms);
        if command == Command::Reset {
            return self.reset(now_ms);
        }
        if !matches!(command, Command::Tick { .. }) {
            self.flush_clicks(now_ms);
        }
        self.apply(command, now_ms)
    }

    fn reset(&mut self, now_ms: u64) -> Event {
        self.pending_clicks = 0;
        self.click_flush.cancel();
        self.save.cancel();
        save::delete_game_state(&mut self.store);
        log::info!("progress reset");
        self.apply(Command::Reset, now_ms)
    }

    fn apply(&mut self, command: Command, now_ms: u64) -> Event {
        let step = command::apply(&self.state, command);
        let event = step.result;
        if event.changed_state() {
            self.state = step.next_state;
            if command != Command::Reset {
                self.save.request(now_ms);
            }
        }
        if let Some(notice) = Notice::from_event(&event) {
            log::info!("{}", notice.message());
            self.toast = Some(Toast {
                notice,
                expires_at: now_ms + TOAST_MS,
            });
            self.display_now = self.display_now.max(now_ms);
        }
        event
    }

    fn flush_clicks(&mut self, now_ms: u64) {
        self.click_flush.cancel();
        let count = std::mem::take(&mut self.pending_clicks);
        if count == 0 {
            return;
        }
        log::debug!("flushing {count} buffered clicks");
        self.apply(Command::ClickBatch { now_ms, count }, now_ms);
    }

    // ── Settings ────────────────────────────────────────────────

    fn update_settings(&mut self, settings: Settings) {
        if settings == self.settings {
            return;
        }
        self.settings = settings;
        save::save_settings(&mut self.store, &self.settings);
    }

    pub fn set_volume(&mut self, volume: f64) {
        self.update_settings(self.settings.with_volume(volume));
    }

    /// Step the volume by `steps` increments of [`VOLUME_STEP`].
    pub fn nudge_volume(&mut self, steps: i32) {
        let volume = self.settings.sfx_volume + steps as f64 * VOLUME_STEP;
        // Snap to the step grid so repeated nudges don't accumulate float noise.
        self.set_volume((volume * 10.0).round() / 10.0);
    }

    pub fn toggle_mute(&mut self) {
        self.update_settings(self.settings.with_muted(!self.settings.sfx_muted));
    }

    pub fn set_effect_mode(&mut self, mode: EffectMode) {
        self.update_settings(self.settings.with_effect_mode(mode));
    }

    pub fn toggle_effect_mode(&mut self) {
        self.set_effect_mode(self.settings.effect_mode.toggled());
    }

    // ── Scheduling ──────────────────────────────────────────────

    fn next_due(&self) -> Option<(u64, Due)> {
        [
            self.tick.next_due().map(|t| (t, Due::Tick)),
            self.click_flush.due().map(|t| (t, Due::ClickFlush)),
            self.clock.next_due().map(|t| (t, Due::Clock)),
            self.save.due().map(|t| (t, Due::Save)),
        ]
        .into_iter()
        .flatten()
        .min()
    }

    /// Fire every timer due at `now`, earliest first.
    pub fn pump(&mut self, now_ms: u64) {
        while let Some((at, due)) = self.next_due() {
            if at > now_ms {
                break;
            }
            match due {
                Due::Tick => {
                    if let Some(fired) = self.tick.pop_due(now_ms) {
                        self.apply(Command::Tick { now_ms: fired }, fired);
                    }
                }
                Due::ClickFlush => {
                    if let Some(fired) = self.click_flush.pop_due(now_ms) {
                        self.flush_clicks(fired);
                    }
                }
                Due::Clock => {
                    if self.clock.pop_due(now_ms).is_some() {
                        self.display_now = self.display_now.max(now_ms);
                    }
                }
                Due::Save => {
                    if let Some(fired) = self.save.pop_due(now_ms) {
                        self.write_save(fired);
                    }
                }
            }
        }
    }

    fn write_save(&mut self, now_ms: u64) {
        self.save.cancel();
        if save::save_game_state(&mut self.store, &self.state, now_ms) {
            log::debug!("game saved");
        }
    }
}
