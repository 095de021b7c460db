//! Per-manager tuning values.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;

/// Tuning for one threat manager. Different actor types may carry different values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThreatConfig {
    /// How often observers receive a full threat list, in milliseconds.
    pub update_interval_ms: u32,

    /// References farther than this are dropped by the distance sweep.
    pub max_combat_distance: f32,

    /// Ratio a candidate in melee reach must exceed to take over (110% rule).
    pub melee_switch_ratio: f32,

    /// Ratio a candidate at range must exceed to take over (130% rule).
    pub ranged_switch_ratio: f32,
}

impl Default for ThreatConfig {
    fn default() -> Self {
        Self {
            update_interval_ms: 2_000,
            max_combat_distance: 60.0,
            melee_switch_ratio: 1.1,
            ranged_switch_ratio: 1.3,
        }
    }
}

impl ThreatConfig {
    /// Parse and validate a config from TOML text. Missing keys keep their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: ThreatConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Reject values that would break victim selection or the sync timer.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.update_interval_ms == 0 {
            return Err(invalid("update_interval_ms", "must be greater than zero"));
        }
        if !(self.max_combat_distance > 0.0) {
            return Err(invalid("max_combat_distance", "must be positive"));
        }
        if !(self.melee_switch_ratio >= 1.0) {
            return Err(invalid("melee_switch_ratio", "must be at least 1.0"));
        }
        if !(self.ranged_switch_ratio >= self.melee_switch_ratio) {
            return Err(invalid(
                "ranged_switch_ratio",
                "must not be below melee_switch_ratio",
            ));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    tracing::warn!(field, reason, "rejected threat config");
    ConfigError::Invalid {
        field,
        reason: reason.to_string(),
    }
}
