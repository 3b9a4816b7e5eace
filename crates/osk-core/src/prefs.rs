//! Typed read-only preferences, parsed from TOML.
//!
//! Defaults are embedded via `include_str!`; a parse or validation failure
//! is fatal to initialization, never silently defaulted. The value is
//! explicitly constructed and handed to the engine — no ambient global.

use std::time::Duration;

use serde::Deserialize;

pub const DEFAULT_PREFS_TOML: &str = include_str!("default_prefs.toml");

#[derive(Debug, thiserror::Error)]
pub enum PrefsError {
    #[error("TOML parse error: {0}")]
    Parse(String),
    #[error("invalid value for {field}: {reason}")]
    InvalidValue {
        field: &'static str,
        reason: &'static str,
    },
}

/// What the utility key does. Emoji UI is a presentation concern; `Disabled`
/// drops the key entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UtilityKeyAction {
    ToggleEmojis,
    SwitchLanguage,
    Disabled,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct KeyboardPrefs {
    pub number_row: bool,
    pub long_press_delay_ms: u64,
    pub key_repeat_interval_ms: u64,
    pub space_switches_to_characters: bool,
    pub utility_key_action: UtilityKeyAction,
}

impl Default for KeyboardPrefs {
    fn default() -> Self {
        Self {
            number_row: false,
            long_press_delay_ms: 300,
            key_repeat_interval_ms: 50,
            space_switches_to_characters: true,
            utility_key_action: UtilityKeyAction::SwitchLanguage,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CorrectionPrefs {
    pub double_space_period: bool,
    pub auto_capitalization: bool,
    pub remember_caps_lock_state: bool,
}

impl Default for CorrectionPrefs {
    fn default() -> Self {
        Self {
            double_space_period: true,
            auto_capitalization: true,
            remember_caps_lock_state: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SuggestionPrefs {
    pub enabled: bool,
    pub block_possibly_offensive: bool,
    pub max_count: usize,
}

impl Default for SuggestionPrefs {
    fn default() -> Self {
        Self {
            enabled: true,
            block_possibly_offensive: true,
            max_count: 16,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AdvancedPrefs {
    pub force_private_mode: bool,
    /// Below this much available memory, composing and suggestions are
    /// disabled proactively instead of attempted and failed.
    pub min_free_memory_mb: u64,
}

impl Default for AdvancedPrefs {
    fn default() -> Self {
        Self {
            force_private_mode: false,
            min_free_memory_mb: 64,
        }
    }
}

// `Default` must be a plain composition of the section defaults: the
// container-level `#[serde(default)]` calls it during deserialization, so it
// cannot itself parse the embedded TOML. Tests hold the two in sync.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub keyboard: KeyboardPrefs,
    pub correction: CorrectionPrefs,
    pub suggestion: SuggestionPrefs,
    pub advanced: AdvancedPrefs,
}

impl Preferences {
    pub fn from_toml(toml_str: &str) -> Result<Self, PrefsError> {
        let prefs: Preferences =
            toml::from_str(toml_str).map_err(|e| PrefsError::Parse(e.to_string()))?;
        prefs.validate()?;
        Ok(prefs)
    }

    fn validate(&self) -> Result<(), PrefsError> {
        if self.keyboard.long_press_delay_ms == 0 {
            return Err(PrefsError::InvalidValue {
                field: "keyboard.long_press_delay_ms",
                reason: "must be positive",
            });
        }
        if self.keyboard.key_repeat_interval_ms == 0 {
            return Err(PrefsError::InvalidValue {
                field: "keyboard.key_repeat_interval_ms",
                reason: "must be positive",
            });
        }
        if self.suggestion.max_count == 0 {
            return Err(PrefsError::InvalidValue {
                field: "suggestion.max_count",
                reason: "must be positive",
            });
        }
        Ok(())
    }

    pub fn long_press_delay(&self) -> Duration {
        Duration::from_millis(self.keyboard.long_press_delay_ms)
    }

    pub fn key_repeat_interval(&self) -> Duration {
        Duration::from_millis(self.keyboard.key_repeat_interval_ms)
    }
}
