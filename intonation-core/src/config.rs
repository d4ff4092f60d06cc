//! # Scorer Configuration
//!
//! Tuning knobs for stability and credit spacing. Every field has a default so
//! a config file may set only what it needs.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// What happens to targets that were never credited when their beat ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MissedNotePolicy {
    /// Silently discard them.
    #[default]
    Drop,
    /// Count them in `ScoreState::missed`.
    Record,
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("window_size must be at least 1")]
    EmptyWindow,

    #[error("required_ok_count must be between 1 and window_size ({window_size}), got {required}")]
    QuorumOutOfRange { required: usize, window_size: usize },

    #[error("tolerance_cents must be a non-negative number, got {0}")]
    InvalidTolerance(f64),

    #[error("cooldown_ms must be a non-negative number, got {0}")]
    InvalidCooldown(f64),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScorerConfig {
    /// Half-width of the in-tune window in cents.
    #[serde(default = "ScorerConfig::default_tolerance_cents")]
    pub tolerance_cents: f64,
    /// Number of trailing frames considered for stability.
    #[serde(default = "ScorerConfig::default_window_size")]
    pub window_size: usize,
    /// In-tune frames needed within the window to confirm a match.
    #[serde(default = "ScorerConfig::default_required_ok_count")]
    pub required_ok_count: usize,
    /// Minimum spacing between two awarded credits.
    #[serde(default = "ScorerConfig::default_cooldown_ms")]
    pub cooldown_ms: f64,
    #[serde(default)]
    pub missed_notes: MissedNotePolicy,
}

impl ScorerConfig {
    fn default_tolerance_cents() -> f64 {
        25.0
    }
    fn default_window_size() -> usize {
        10
    }
    fn default_required_ok_count() -> usize {
        6
    }
    fn default_cooldown_ms() -> f64 {
        200.0
    }

    /// Checks the constraints the scorer relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window_size == 0 {
            return Err(ConfigError::EmptyWindow);
        }
        if self.required_ok_count == 0 || self.required_ok_count > self.window_size {
            return Err(ConfigError::QuorumOutOfRange {
                required: self.required_ok_count,
                window_size: self.window_size,
            });
        }
        if !self.tolerance_cents.is_finite() || self.tolerance_cents < 0.0 {
            return Err(ConfigError::InvalidTolerance(self.tolerance_cents));
        }
        if !self.cooldown_ms.is_finite() || self.cooldown_ms < 0.0 {
            return Err(ConfigError::InvalidCooldown(self.cooldown_ms));
        }
        Ok(())
    }

    /// Cooldown expressed in seconds, the unit of event timestamps.
    pub fn cooldown_sec(&self) -> f64 {
        self.cooldown_ms / 1000.0
    }

    /// Loads a config from a TOML file.
    ///
    /// Returns the defaults when the file is missing or cannot be parsed,
    /// logging a warning in the latter case. The result is not validated.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            log::debug!("No scorer config at {}, using defaults", path.display());
            return Self::default();
        }
        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<ScorerConfig>(&contents) {
                Ok(config) => {
                    log::info!("Loaded scorer config from {}", path.display());
                    config
                }
                Err(e) => {
                    log::warn!("Failed to parse {}: {}. Using defaults.", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("Failed to read {}: {}. Using defaults.", path.display(), e);
                Self::default()
            }
        }
    }
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            tolerance_cents: Self::default_tolerance_cents(),
            window_size: Self::default_window_size(),
            required_ok_count: Self::default_required_ok_count(),
            cooldown_ms: Self::default_cooldown_ms(),
            missed_notes: MissedNotePolicy::default(),
        }
    }
}
