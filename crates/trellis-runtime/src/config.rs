#![forbid(unsafe_code)]

//! Router configuration.
//!
//! [`RouterConfig`] gathers every tunable of the interaction core in one
//! place: platform family, gesture thresholds, keyboard tables, and the undo
//! history bound. Each section converts into the config type of the component
//! it drives.
//!
//! # Sources
//!
//! - [`RouterConfig::default`]: built-in values.
//! - [`RouterConfig::from_env`]: defaults overridden by `TRELLIS_*`
//!   environment variables.
//! - With the `config` feature: TOML or JSON strings and files.
//!
//! ```rust,ignore
//! let config = RouterConfig::from_toml_file("trellis.toml")?.into_validated()?;
//! let router = EventRouter::new(config);
//! ```
//!
//! # Environment Variables
//!
//! - `TRELLIS_CLICK_DISTANCE`: click/drag threshold in surface units
//! - `TRELLIS_DOUBLE_CLICK_MS`: double-click window in milliseconds
//! - `TRELLIS_UNDO_LIMIT`: base undo history bound
//! - `TRELLIS_PLATFORM`: platform family (`mac`, `windows`, `linux`, ...)

#[cfg(feature = "config")]
use std::path::Path;

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};
use trellis_core::event::{KeyCode, Platform};
use trellis_core::gesture::GestureConfig;
use trellis_core::keybinding::KeyConfig;
use web_time::Duration;

use crate::error::ConfigError;

/// Upper bound applied to the double-click window from the environment.
const MAX_DOUBLE_CLICK_MS: u64 = 5_000;

// ---------------------------------------------------------------------------
// RouterConfig
// ---------------------------------------------------------------------------

/// Top-level configuration for an [`EventRouter`](crate::router::EventRouter).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct RouterConfig {
    /// Host platform family; drives the Meta-as-Ctrl remap.
    #[cfg_attr(
        feature = "config",
        serde(
            serialize_with = "serialize_platform",
            deserialize_with = "deserialize_platform"
        )
    )]
    pub platform: Platform,

    /// Pointer gesture thresholds.
    pub gesture: GesturePolicy,

    /// Keyboard filtering tables.
    pub keys: KeyPolicy,

    /// Undo history limits.
    pub history: HistoryConfig,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            platform: Platform::default(),
            gesture: GesturePolicy::default(),
            keys: KeyPolicy::default(),
            history: HistoryConfig::default(),
        }
    }
}

impl RouterConfig {
    /// Defaults overridden by `TRELLIS_*` environment variables.
    ///
    /// Unparseable values are ignored; parsed values are clamped into range.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_env_with(|key| std::env::var(key).ok())
    }

    /// [`from_env`](Self::from_env) with an injectable variable lookup.
    #[must_use]
    pub fn from_env_with<F>(get_env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(val) = get_env("TRELLIS_CLICK_DISTANCE")
            && let Ok(distance) = val.trim().parse::<f64>()
        {
            config.gesture.click_distance = distance;
        }

        if let Some(val) = get_env("TRELLIS_DOUBLE_CLICK_MS")
            && let Ok(ms) = val.trim().parse::<u64>()
        {
            config.gesture.double_click_ms = ms;
        }

        if let Some(val) = get_env("TRELLIS_UNDO_LIMIT")
            && let Ok(limit) = val.trim().parse::<usize>()
        {
            config.history.undo_limit = limit;
        }

        if let Some(val) = get_env("TRELLIS_PLATFORM")
            && let Some(platform) = Platform::parse(&val)
        {
            config.platform = platform;
        }

        config.clamped()
    }

    /// Pull out-of-range values back to the nearest usable value.
    #[must_use]
    pub fn clamped(mut self) -> Self {
        let default = GesturePolicy::default();
        if !self.gesture.click_distance.is_finite() || self.gesture.click_distance < 0.0 {
            self.gesture.click_distance = default.click_distance;
        }
        self.gesture.double_click_ms = self.gesture.double_click_ms.clamp(1, MAX_DOUBLE_CLICK_MS);
        self.history.undo_limit = self.history.undo_limit.max(1);
        self
    }

    /// Load from a TOML string.
    #[cfg(feature = "config")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(ConfigError::Toml)
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "config")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    #[cfg(feature = "config")]
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(s).map_err(ConfigError::Json)
    }

    /// Load from a JSON file on disk.
    #[cfg(feature = "config")]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    /// Validate all parameters are within acceptable ranges.
    ///
    /// Returns a list of validation errors. An empty list means the config
    /// is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if !self.gesture.click_distance.is_finite() || self.gesture.click_distance < 0.0 {
            errors.push(format!(
                "gesture.click_distance must be finite and >= 0, got {}",
                self.gesture.click_distance
            ));
        }
        if self.gesture.double_click_ms == 0 {
            errors.push("gesture.double_click_ms must be > 0".into());
        }
        if self.history.undo_limit == 0 {
            errors.push("history.undo_limit must be > 0".into());
        }

        let tables = [
            ("keys.text_input_passthrough", &self.keys.text_input_passthrough),
            ("keys.text_input_primary_combos", &self.keys.text_input_primary_combos),
            ("keys.special_hotkeys", &self.keys.special_hotkeys),
        ];
        for (name, entries) in tables {
            if entries.iter().any(|e| e.trim().is_empty()) {
                errors.push(format!("{name} must not contain empty entries"));
            }
        }

        errors
    }

    /// `self` if [`validate`](Self::validate) finds nothing, otherwise the
    /// validation errors.
    pub fn into_validated(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    #[must_use]
    pub fn to_gesture_config(&self) -> GestureConfig {
        self.gesture.to_gesture_config()
    }

    #[must_use]
    pub fn to_key_config(&self) -> KeyConfig {
        self.keys.to_key_config()
    }
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// Gesture thresholds in serializable units.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct GesturePolicy {
    /// Click/drag threshold in surface units.
    pub click_distance: f64,
    /// Double-click window in milliseconds.
    pub double_click_ms: u64,
}

impl Default for GesturePolicy {
    fn default() -> Self {
        let config = GestureConfig::default();
        Self {
            click_distance: config.click_distance,
            double_click_ms: u64::try_from(config.double_click_window.as_millis())
                .unwrap_or(u64::MAX),
        }
    }
}

impl GesturePolicy {
    #[must_use]
    pub fn to_gesture_config(&self) -> GestureConfig {
        GestureConfig {
            click_distance: self.click_distance,
            double_click_window: Duration::from_millis(self.double_click_ms),
        }
    }
}

/// Keyboard tables as plain key-code and hotkey strings.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct KeyPolicy {
    pub text_input_passthrough: Vec<String>,
    pub text_input_primary_combos: Vec<String>,
    pub special_hotkeys: Vec<String>,
}

impl Default for KeyPolicy {
    fn default() -> Self {
        let config = KeyConfig::default();
        let names = |codes: &[KeyCode]| -> Vec<String> {
            codes.iter().map(|c| c.as_str().to_string()).collect()
        };
        Self {
            text_input_passthrough: names(config.text_input_passthrough.as_slice()),
            text_input_primary_combos: names(config.text_input_primary_combos.as_slice()),
            special_hotkeys: config.special_hotkeys,
        }
    }
}

impl KeyPolicy {
    #[must_use]
    pub fn to_key_config(&self) -> KeyConfig {
        let codes = |names: &[String]| -> Vec<KeyCode> {
            names.iter().cloned().map(KeyCode::from).collect()
        };
        KeyConfig {
            text_input_passthrough: codes(self.text_input_passthrough.as_slice()),
            text_input_primary_combos: codes(self.text_input_primary_combos.as_slice()),
            special_hotkeys: self.special_hotkeys.clone(),
        }
    }
}

/// Undo history limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct HistoryConfig {
    /// Maximum undo entries kept by the base sequence (default: 20).
    pub undo_limit: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { undo_limit: 20 }
    }
}

// ---------------------------------------------------------------------------
// Serde helpers for Platform
// ---------------------------------------------------------------------------

#[cfg(feature = "config")]
fn serialize_platform<S>(platform: &Platform, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(platform.as_str())
}

#[cfg(feature = "config")]
fn deserialize_platform<'de, D>(deserializer: D) -> Result<Platform, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    Platform::parse(&s)
        .ok_or_else(|| serde::de::Error::custom(format!("unknown platform: {s}")))
}
