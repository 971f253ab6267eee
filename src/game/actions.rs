//! Semantic action IDs for click targets.
//!
//! Each constant is one clickable action in the UI. IDs are registered during
//! render and dispatched via `InputEvent::Click`.

// ── Core actions ────────────────────────────────────────────────
pub const CLICK_MAIN: u16 = 0;
pub const ACTIVATE_BURST: u16 = 1;

// ── Upgrades ────────────────────────────────────────────────────
pub const BUY_UPGRADE1: u16 = 10;
pub const BUY_UPGRADE2: u16 = 11;

// ── Tab navigation ──────────────────────────────────────────────
pub const TAB_UPGRADES: u16 = 20;
pub const TAB_ESTATES: u16 = 21;
pub const TAB_SETTINGS: u16 = 22;

// ── Estates (base + estate id) ──────────────────────────────────
pub const BUY_ESTATE_BASE: u16 = 100;
pub const SELL_ESTATE_BASE: u16 = 200;

// ── Settings ────────────────────────────────────────────────────
pub const TOGGLE_MUTE: u16 = 300;
pub const VOLUME_UP: u16 = 301;
pub const VOLUME_DOWN: u16 = 302;
pub const TOGGLE_EFFECTS: u16 = 303;

// ── Reset ───────────────────────────────────────────────────────
pub const RESET_REQUEST: u16 = 400;
pub const RESET_CONFIRM: u16 = 401;
pub const RESET_CANCEL: u16 = 402;
