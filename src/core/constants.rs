//! Constants used throughout envdeck.
//!
//! Centralizes file names, defaults and crypto parameters.

/// Data root directory relative to HOME (~/.envdeck).
pub const DATA_DIR: &str = ".envdeck";

/// Environment variable overriding the data root.
pub const HOME_ENV: &str = "ENVDECK_HOME";

/// Environment variable supplying the store password non-interactively.
pub const PASSWORD_ENV: &str = "ENVDECK_PASSWORD";

/// Environment variable supplying the new password to `passwd`.
pub const NEW_PASSWORD_ENV: &str = "ENVDECK_NEW_PASSWORD";

/// Operator settings file inside the data root.
pub const CONFIG_FILE: &str = "config.toml";

/// Credentials file inside the data root.
pub const CREDENTIALS_FILE: &str = "credentials.json";

/// Per-project directory inside the data root.
pub const PROJECTS_DIR: &str = "projects";

/// Variable/history/snapshot file inside a project directory.
pub const STORE_FILE: &str = "variables.json";

/// Version history file inside a project directory.
pub const VERSIONS_FILE: &str = "versions.json";

/// Branch used when no resolver can tell us better.
pub const DEFAULT_BRANCH: &str = "main";

/// Category assigned to variables written without one.
pub const DEFAULT_CATEGORY: &str = "general";

/// Value returned in place of a record that could not be decrypted.
pub const DECRYPTION_FAILED_MARKER: &str = "[DECRYPTION FAILED]";

/// Replacement for sensitive values in persisted change records.
pub const MASKED_VALUE: &str = "********";

/// PBKDF2-HMAC-SHA512 rounds for both the password hash and the data key.
pub const PBKDF2_ITERATIONS: u32 = 100_000;

/// Stored password hash length in bytes.
pub const PASSWORD_HASH_LEN: usize = 64;

/// Random salt length in bytes.
pub const SALT_LEN: usize = 32;

/// AES-256 data key length in bytes.
pub const DATA_KEY_LEN: usize = 32;

/// AES-GCM nonce length in bytes.
pub const NONCE_LEN: usize = 12;

/// Domain separator mixed into the salt when deriving the data key.
pub const DATA_KEY_CONTEXT: &[u8] = b"envdeck-data-key-v1";

/// Domain separator for the notifier trigger signing key.
pub const SIGNAL_KEY_CONTEXT: &[u8] = b"envdeck-notifier-signal-v1";

/// Random bytes in a notifier connection nonce.
pub const SIGNAL_NONCE_LEN: usize = 16;

/// Default loopback port of the change notifier.
pub const DEFAULT_NOTIFIER_PORT: u16 = 3456;

/// Default debounce window in milliseconds.
pub const DEFAULT_DEBOUNCE_MS: u64 = 1000;

/// Per-listener outbound queue depth.
pub const LISTENER_QUEUE: usize = 64;
