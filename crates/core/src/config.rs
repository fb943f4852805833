// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Coordinator configuration
//!
//! Loadable from TOML with humantime durations:
//!
//! ```toml
//! debounce_window = "2s"
//! usage_limit = 30
//! input_settle = "300ms"
//! equip_delay = "500ms"
//! action_jitter = "150ms"
//! ```

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Errors from loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid value: {0}")]
    Invalid(String),
}

/// Tunables for the operation coordinator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinatorConfig {
    /// Grouping window after the first queued operation
    #[serde(with = "humantime_serde")]
    pub debounce_window: Duration,
    /// Uses before a rod is considered spent; same for every round
    pub usage_limit: u32,
    /// Wait after halting continuous input, before touching the chest
    #[serde(with = "humantime_serde")]
    pub input_settle: Duration,
    /// Wait after an equip keypress for the hand animation
    #[serde(with = "humantime_serde")]
    pub equip_delay: Duration,
    /// Random variance bound passed through to the input collaborator
    #[serde(with = "humantime_serde")]
    pub action_jitter: Duration,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            debounce_window: Duration::from_secs(2),
            usage_limit: 30,
            input_settle: Duration::from_millis(300),
            equip_delay: Duration::from_millis(500),
            action_jitter: Duration::from_millis(150),
        }
    }
}

impl CoordinatorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_debounce_window(mut self, window: Duration) -> Self {
        self.debounce_window = window;
        self
    }

    pub fn with_usage_limit(mut self, limit: u32) -> Self {
        self.usage_limit = limit;
        self
    }

    pub fn with_input_settle(mut self, settle: Duration) -> Self {
        self.input_settle = settle;
        self
    }

    pub fn with_equip_delay(mut self, delay: Duration) -> Self {
        self.equip_delay = delay;
        self
    }

    pub fn with_action_jitter(mut self, jitter: Duration) -> Self {
        self.action_jitter = jitter;
        self
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.usage_limit == 0 {
            return Err(ConfigError::Invalid("usage_limit must be positive".into()));
        }
        if self.debounce_window.is_zero() {
            return Err(ConfigError::Invalid(
                "debounce_window must be positive".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
