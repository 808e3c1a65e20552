//! Error types.
//!
//! One crate-wide [`Error`] wraps a focused error enum per subsystem so
//! callers can match on the layer that failed.

use std::path::PathBuf;

use thiserror::Error;

/// Crate-wide error.
#[derive(Error, Debug)]
pub enum Error {
    #[error("not authenticated: log in with the store password first")]
    Unauthenticated,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Draft(#[from] DraftError),

    #[error(transparent)]
    Cipher(#[from] CipherError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Notifier(#[from] NotifierError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Variable store failures.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("variable not found: {0}")]
    VariableNotFound(String),

    #[error("snapshot not found: {0}")]
    SnapshotNotFound(String),

    #[error("store already open for {0}")]
    AlreadyOpen(PathBuf),

    #[error("failed to persist {path}: {source}")]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("corrupt store file {path}: {reason}")]
    Corrupt { path: PathBuf, reason: String },
}

/// Draft state-machine failures.
#[derive(Error, Debug)]
pub enum DraftError {
    #[error("no active draft")]
    NoActiveDraft,

    #[error("variable not in draft: {0}")]
    NotInDraft(String),

    #[error("nothing to publish")]
    NothingToPublish,

    #[error("version not found: {0}")]
    VersionNotFound(String),

    #[error("publish stopped at {failed} after applying {} change(s): {source}", .applied.len())]
    PartialPublish {
        /// Names whose change reached the live store, in apply order.
        applied: Vec<String>,
        /// Name of the change that failed.
        failed: String,
        #[source]
        source: Box<Error>,
    },
}

/// Value encryption and key derivation failures.
#[derive(Error, Debug)]
pub enum CipherError {
    #[error("encryption failed: {0}")]
    Encrypt(String),

    #[error("decryption failed: {0}")]
    Decrypt(String),

    #[error("key derivation failed: {0}")]
    KeyDerivation(String),

    #[error("invalid ciphertext format: {0}")]
    InvalidFormat(String),
}

/// Settings and path resolution failures.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("unable to determine home directory")]
    NoHomeDir,

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// Change notifier failures.
#[derive(Error, Debug)]
pub enum NotifierError {
    #[error("no tokio runtime available to drive the notifier")]
    NoRuntime,

    #[error("failed to bind notifier on port {port}: {source}")]
    Bind {
        port: u16,
        #[source]
        source: std::io::Error,
    },

    #[error("port {port} is not an envdeck notifier")]
    UnexpectedGreeting { port: u16 },
}

/// Input validation failures.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("variable name cannot be empty")]
    EmptyName,

    #[error("invalid variable name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    #[error("password cannot be empty")]
    EmptyPassword,

    #[error("passwords do not match")]
    PasswordMismatch,

    #[error("invalid assignment '{0}': expected KEY=VALUE")]
    InvalidAssignment(String),
}

impl Error {
    /// Whether the failure means the caller must authenticate again.
    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, Error::Unauthenticated)
    }

    /// Whether a publish stopped after applying some of its entries.
    pub fn is_partial_publish(&self) -> bool {
        matches!(self, Error::Draft(DraftError::PartialPublish { .. }))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
