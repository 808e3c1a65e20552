//! Notifier runtime configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::constants;
use crate::error::{ConfigError, Result};

/// What a reload cycle does between `started` and `completed`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReloadMode {
    /// Only broadcast; listeners reload themselves.
    #[default]
    NotifyOnly,
    /// Run the configured shell command.
    Command,
}

impl std::fmt::Display for ReloadMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(match self {
            ReloadMode::NotifyOnly => "notify-only",
            ReloadMode::Command => "command",
        })
    }
}

/// Running configuration, sent to every listener on connect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotifierConfig {
    pub port: u16,
    pub debounce_ms: u64,
    pub mode: ReloadMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            port: constants::DEFAULT_NOTIFIER_PORT,
            debounce_ms: constants::DEFAULT_DEBOUNCE_MS,
            mode: ReloadMode::NotifyOnly,
            command: None,
        }
    }
}

/// Partial update for [`NotifierConfig`]. `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotifierConfigUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debounce_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<ReloadMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
}

impl NotifierConfig {
    /// Debounce window.
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Copy with `update` merged in, validated.
    pub fn merged(&self, update: NotifierConfigUpdate) -> Result<Self> {
        let merged = Self {
            port: update.port.unwrap_or(self.port),
            debounce_ms: update.debounce_ms.unwrap_or(self.debounce_ms),
            mode: update.mode.unwrap_or(self.mode),
            command: update.command.or_else(|| self.command.clone()),
        };
        merged.validate()?;
        Ok(merged)
    }

    /// Command mode needs a non-blank command.
    pub fn validate(&self) -> Result<()> {
        if self.mode == ReloadMode::Command
            && self.command.as_deref().map_or(true, |c| c.trim().is_empty())
        {
            return Err(ConfigError::InvalidValue {
                field: "notifier.command",
                reason: "required when mode is \"command\"".to_string(),
            }
            .into());
        }
        Ok(())
    }
}
