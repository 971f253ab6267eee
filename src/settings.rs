//! Player preferences.
//!
//! Persisted separately from the game save, so a reset keeps them.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::game::save::{clamp_number, lenient_number};

/// How click effects are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EffectMode {
    #[default]
    Webgl,
    Off,
}

impl EffectMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            EffectMode::Webgl => "webgl",
            EffectMode::Off => "off",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "webgl" => Some(EffectMode::Webgl),
            "off" => Some(EffectMode::Off),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            EffectMode::Webgl => EffectMode::Off,
            EffectMode::Off => EffectMode::Webgl,
        }
    }
}

/// Volume change per keypress.
pub const VOLUME_STEP: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Sound effect volume, 0.0 - 1.0.
    pub sfx_volume: f64,
    pub sfx_muted: bool,
    pub effect_mode: EffectMode,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sfx_volume: 0.7,
            sfx_muted: false,
            effect_mode: EffectMode::Webgl,
        }
    }
}

impl Settings {
    pub fn with_volume(self, volume: f64) -> Self {
        let sfx_volume = if volume.is_finite() {
            volume.clamp(0.0, 1.0)
        } else {
            self.sfx_volume
        };
        Self { sfx_volume, ..self }
    }

    pub fn with_muted(self, sfx_muted: bool) -> Self {
        Self { sfx_muted, ..self }
    }

    pub fn with_effect_mode(self, effect_mode: EffectMode) -> Self {
        Self {
            effect_mode,
            ..self
        }
    }
}

#[derive(Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
struct RawSettings {
    #[serde(deserialize_with = "lenient_number")]
    sfx_volume: Option<f64>,
    sfx_muted: Value,
    effect_mode: Value,
}

/// Build valid settings from whatever was stored. Anything missing or out of
/// range falls back to the default for that field.
pub fn normalize_settings(raw: &Value) -> Settings {
    let defaults = Settings::default();
    let raw: RawSettings = match raw {
        Value::Object(_) => RawSettings::deserialize(raw).unwrap_or_default(),
        _ => return defaults,
    };

    Settings {
        sfx_volume: clamp_number(raw.sfx_volume, 0.0, 1.0, defaults.sfx_volume),
        sfx_muted: raw.sfx_muted.as_bool().unwrap_or(false),
        effect_mode: raw
            .effect_mode
            .as_str()
            .and_then(EffectMode::parse)
            .unwrap_or(defaults.effect_mode),
    }
}
