//! Configuration file management.
//!
//! Resolves the envdeck data root and reads `config.toml`.

use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::core::constants;
use crate::core::notifier::{NotifierConfig, ReloadMode};
use crate::error::{ConfigError, Result};

/// Locations of everything envdeck keeps on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paths {
    root: PathBuf,
}

impl Paths {
    /// Use an explicit data root.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve the data root from `ENVDECK_HOME`, else `~/.envdeck`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NoHomeDir` if neither is available.
    pub fn resolve() -> Result<Self> {
        if let Some(dir) = std::env::var_os(constants::HOME_ENV) {
            return Ok(Self::new(dir));
        }
        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
        Ok(Self::new(home.join(constants::DATA_DIR)))
    }

    /// Data root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the operator settings file.
    pub fn config_file(&self) -> PathBuf {
        self.root.join(constants::CONFIG_FILE)
    }

    /// Path of the credentials record.
    pub fn credentials_file(&self) -> PathBuf {
        self.root.join(constants::CREDENTIALS_FILE)
    }

    /// Directory holding the files of one project.
    ///
    /// Projects are keyed by a short digest of their resolved path so two
    /// checkouts never share a store.
    pub fn project_dir(&self, project: &Path) -> PathBuf {
        self.root
            .join(constants::PROJECTS_DIR)
            .join(project_key(project))
    }
}

/// Stable directory name for a project path.
pub fn project_key(project: &Path) -> String {
    let resolved = project
        .canonicalize()
        .unwrap_or_else(|_| project.to_path_buf());
    let digest = Sha256::digest(resolved.to_string_lossy().as_bytes());
    hex::encode(&digest[..8])
}

/// Operator settings stored in `config.toml`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct Settings {
    #[serde(default)]
    pub store: StoreSettings,
    #[serde(default)]
    pub notifier: NotifierSettings,
}

/// `[store]` section.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct StoreSettings {
    /// Branch used when git cannot report one.
    #[serde(default = "default_branch")]
    pub default_branch: String,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            default_branch: default_branch(),
        }
    }
}

/// `[notifier]` section.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct NotifierSettings {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    #[serde(default)]
    pub mode: ReloadMode,
    #[serde(default)]
    pub command: Option<String>,
}

impl Default for NotifierSettings {
    fn default() -> Self {
        Self {
            port: default_port(),
            debounce_ms: default_debounce_ms(),
            mode: ReloadMode::default(),
            command: None,
        }
    }
}

impl NotifierSettings {
    /// Notifier runtime config built from these settings.
    pub fn to_config(&self) -> NotifierConfig {
        NotifierConfig {
            port: self.port,
            debounce_ms: self.debounce_ms,
            mode: self.mode,
            command: self.command.clone(),
        }
    }
}

fn default_branch() -> String {
    constants::DEFAULT_BRANCH.to_string()
}

fn default_port() -> u16 {
    constants::DEFAULT_NOTIFIER_PORT
}

fn default_debounce_ms() -> u64 {
    constants::DEFAULT_DEBOUNCE_MS
}

impl Settings {
    /// Load settings, falling back to defaults when the file is absent.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` if the TOML is malformed or
    /// `ConfigError::InvalidValue` if a value is out of range.
    pub fn load(paths: &Paths) -> Result<Self> {
        let path = paths.config_file();
        debug!(path = %path.display(), "loading settings");

        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(&path).map_err(ConfigError::ReadFile)?;
        let settings: Self = toml::from_str(&contents).map_err(ConfigError::Parse)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Check value ranges and mode/command consistency.
    pub fn validate(&self) -> Result<()> {
        if self.store.default_branch.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "store.default_branch",
                reason: "cannot be empty".to_string(),
            }
            .into());
        }
        self.notifier.to_config().validate()
    }
}
