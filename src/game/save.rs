//! Save / load for the game state and settings.
//!
//! ## Payloads
//!
//! - game:     `{ "version": 1, "savedAt": <ms>, "state": { ... } }`
//! - settings: `{ "version": 1, "settings": { ... } }`
//!
//! A payload whose `version` differs from [`SAVE_VERSION`] is ignored and the
//! game starts fresh. A payload with the right version is never trusted as-is:
//! every field goes through [`normalize_game_state`], which clamps numbers into
//! range, drops unknown estates and fills in missing ones.
//!
//! Storage failures are logged and swallowed here. The simulation never sees
//! them.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::balance::{
    ESTATE_BLUEPRINTS, FOCUS_CAP, MAX_STORED_LEVEL, MAX_STORED_NUMBER, SPECIAL_GROWTH_CYCLE,
    UPGRADE_BASE_COST,
};
use super::logic::compute_rank;
use super::state::{Estate, GameState};
use crate::settings::{normalize_settings, Settings};
use crate::storage::{KeyValueStore, StorageError};

/// Payload format version. Anything else falls back to a fresh game.
pub const SAVE_VERSION: u32 = 1;

pub const GAME_KEY: &str = "makasha-sim.game-state";
pub const SETTINGS_KEY: &str = "makasha-sim.settings";

// ── Field coercion ──────────────────────────────────────────────

/// A finite number from a JSON number or numeric string; `None` otherwise.
pub fn number_from(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// `deserialize_with` helper: never fails, yields `None` for non-numbers.
pub fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(number_from(&value))
}

/// Clamp into `[min, max]`, or `fallback` when there is no usable number.
pub fn clamp_number(value: Option<f64>, min: f64, max: f64, fallback: f64) -> f64 {
    match value {
        Some(n) => n.clamp(min, max),
        None => fallback,
    }
}

fn clamp_level(value: Option<f64>) -> u32 {
    clamp_number(value, 0.0, MAX_STORED_LEVEL as f64, 0.0).floor() as u32
}

fn clamp_timestamp(value: Option<f64>) -> u64 {
    clamp_number(value, 0.0, MAX_STORED_NUMBER, 0.0).floor() as u64
}

// ── Serialized shapes ───────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EstateSave {
    id: usize,
    owned: bool,
    current_val: f64,
    growth: f64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GameSave {
    score: f64,
    up1_level: u32,
    up1_cost: f64,
    up2_level: u32,
    up2_cost: f64,
    up3_level: u32,
    world_tree_timer: u32,
    estates: Vec<EstateSave>,
    focus: f64,
    burst_active_until: u64,
    burst_cooldown_until: u64,
}

impl From<&GameState> for GameSave {
    fn from(state: &GameState) -> Self {
        Self {
            score: state.score,
            up1_level: state.up1_level,
            up1_cost: state.up1_cost,
            up2_level: state.up2_level,
            up2_cost: state.up2_cost,
            up3_level: state.up3_level,
            world_tree_timer: state.world_tree_timer,
            estates: state
                .estates
                .iter()
                .map(|e| EstateSave {
                    id: e.id(),
                    owned: e.owned,
                    current_val: e.current_val,
                    growth: e.growth,
                })
                .collect(),
            focus: state.focus,
            burst_active_until: state.burst_active_until,
            burst_cooldown_until: state.burst_cooldown_until,
        }
    }
}

#[derive(Serialize)]
struct GameEnvelope {
    version: u32,
    #[serde(rename = "savedAt", skip_serializing_if = "Option::is_none")]
    saved_at: Option<u64>,
    state: Value,
}

#[derive(Serialize)]
struct SettingsEnvelope<'a> {
    version: u32,
    settings: &'a Settings,
}

/// Lenient view of a stored state: every field optional, wrong types become `None`.
#[derive(Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
struct RawGameState {
    #[serde(deserialize_with = "lenient_number")]
    score: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    up1_level: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    up1_cost: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    up2_level: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    up2_cost: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    world_tree_timer: Option<f64>,
    estates: Value,
    #[serde(deserialize_with = "lenient_number")]
    focus: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    burst_active_until: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    burst_cooldown_until: Option<f64>,
}

// ── Normalization ───────────────────────────────────────────────

/// Rebuild the estate list from stored entries, matched by id.
fn normalize_estates(raw: &Value) -> Vec<Estate> {
    let source: &[Value] = raw.as_array().map(Vec::as_slice).unwrap_or(&[]);

    ESTATE_BLUEPRINTS
        .iter()
        .map(|blueprint| {
            let mut estate = Estate::new(blueprint);
            let found = source.iter().find(|e| {
                e.get("id").and_then(Value::as_f64) == Some(blueprint.id as f64)
            });
            let found = match found {
                Some(f) => f,
                None => return estate,
            };

            estate.owned = found.get("owned").and_then(Value::as_bool).unwrap_or(false);
            if estate.owned {
                estate.current_val = clamp_number(
                    found.get("currentVal").and_then(number_from),
                    blueprint.base_price,
                    MAX_STORED_NUMBER,
                    blueprint.base_price,
                );
                estate.growth = clamp_number(
                    found.get("growth").and_then(number_from),
                    blueprint.growth,
                    MAX_STORED_NUMBER,
                    blueprint.growth,
                );
            }
            estate
        })
        .collect()
}

/// Build a valid [`GameState`] from an untrusted stored state object.
///
/// The stored rank is ignored and recomputed from the power level.
pub fn normalize_game_state(raw: &Value) -> GameState {
    let base = GameState::new();
    let raw: RawGameState = match raw {
        Value::Object(_) => match RawGameState::deserialize(raw) {
            Ok(r) => r,
            Err(_) => return base,
        },
        _ => return base,
    };

    let up1_level = clamp_level(raw.up1_level);
    GameState {
        score: clamp_number(raw.score, 0.0, MAX_STORED_NUMBER, base.score),
        up1_level,
        up1_cost: clamp_number(raw.up1_cost, UPGRADE_BASE_COST, MAX_STORED_NUMBER, base.up1_cost),
        up2_level: clamp_level(raw.up2_level),
        up2_cost: clamp_number(raw.up2_cost, UPGRADE_BASE_COST, MAX_STORED_NUMBER, base.up2_cost),
        up3_level: compute_rank(up1_level),
        world_tree_timer: clamp_number(
            raw.world_tree_timer,
            0.0,
            (SPECIAL_GROWTH_CYCLE - 1) as f64,
            0.0,
        )
        .floor() as u32,
        estates: normalize_estates(&raw.estates),
        focus: clamp_number(raw.focus, 0.0, FOCUS_CAP, base.focus),
        burst_active_until: clamp_timestamp(raw.burst_active_until),
        burst_cooldown_until: clamp_timestamp(raw.burst_cooldown_until),
    }
}

/// The stored form of a state (the `state` field of a game payload).
pub fn serialize_game_state(state: &GameState) -> Result<Value, StorageError> {
    Ok(serde_json::to_value(GameSave::from(state))?)
}

fn version_matches(payload: &Value) -> bool {
    payload.get("version").and_then(Value::as_f64) == Some(SAVE_VERSION as f64)
}

/// Decode a whole game payload. Missing payload, non-object payload or
/// version mismatch all yield the initial state.
pub fn game_state_from_payload(payload: &Value) -> GameState {
    if !version_matches(payload) {
        return GameState::new();
    }
    payload
        .get("state")
        .map(normalize_game_state)
        .unwrap_or_default()
}

pub fn settings_from_payload(payload: &Value) -> Settings {
    if !version_matches(payload) {
        return Settings::default();
    }
    payload
        .get("settings")
        .map(normalize_settings)
        .unwrap_or_default()
}

// ── Store I/O ───────────────────────────────────────────────────

/// Read and parse the JSON under `key`. Unparsable data is removed so it
/// cannot fail every later load too.
fn read_json(store: &mut impl KeyValueStore, key: &str) -> Option<Value> {
    let json = match store.load(key) {
        Ok(Some(j)) => j,
        Ok(None) => return None,
        Err(e) => {
            log::warn!("{key}: failed to read from storage: {e}");
            return None;
        }
    };

    match serde_json::from_str(&json) {
        Ok(v) => Some(v),
        Err(e) => {
            log::warn!("{key}: discarding unparsable payload: {e}");
            if let Err(e) = store.remove(key) {
                log::warn!("{key}: failed to remove unparsable payload: {e}");
            }
            None
        }
    }
}

fn write_json(store: &mut impl KeyValueStore, key: &str, payload: &impl Serialize) -> bool {
    let result = serde_json::to_string(payload)
        .map_err(StorageError::from)
        .and_then(|json| store.save(key, &json));
    match result {
        Ok(()) => true,
        Err(e) => {
            log::warn!("{key}: save failed: {e}");
            false
        }
    }
}

/// Load the saved game, or a fresh one when there is nothing usable.
pub fn load_game_state(store: &mut impl KeyValueStore) -> GameState {
    let payload = match read_json(store, GAME_KEY) {
        Some(p) => p,
        None => {
            log::info!("no saved game, starting fresh");
            return GameState::new();
        }
    };
    if !version_matches(&payload) {
        log::warn!(
            "saved game has version {} (expected {SAVE_VERSION}), starting fresh",
            payload.get("version").unwrap_or(&Value::Null)
        );
        return GameState::new();
    }
    log::info!("loaded saved game");
    game_state_from_payload(&payload)
}

/// Persist `state` stamped with `saved_at_ms`. Returns false on failure.
pub fn save_game_state(store: &mut impl KeyValueStore, state: &GameState, saved_at_ms: u64) -> bool {
    let state = match serialize_game_state(state) {
        Ok(v) => v,
        Err(e) => {
            log::warn!("{GAME_KEY}: {e}");
            return false;
        }
    };
    let envelope = GameEnvelope {
        version: SAVE_VERSION,
        saved_at: Some(saved_at_ms),
        state,
    };
    write_json(store, GAME_KEY, &envelope)
}

/// Forget the saved game.
pub fn delete_game_state(store: &mut impl KeyValueStore) -> bool {
    match store.remove(GAME_KEY) {
        Ok(()) => true,
        Err(e) => {
            log::warn!("{GAME_KEY}: failed to remove save: {e}");
            false
        }
    }
}

pub fn load_settings(store: &mut impl KeyValueStore) -> Settings {
    match read_json(store, SETTINGS_KEY) {
        Some(payload) => settings_from_payload(&payload),
        None => Settings::default(),
    }
}

pub fn save_settings(store: &mut impl KeyValueStore, settings: &Settings) -> bool {
    let envelope = SettingsEnvelope {
        version: SAVE_VERSION,
        settings,
    };
    write_json(store, SETTINGS_KEY, &envelope)
}
