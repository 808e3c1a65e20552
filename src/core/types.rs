//! Type aliases for domain concepts.
//!
//! Provides semantic type aliases to make function signatures more descriptive.

/// A variable name (e.g., DATABASE_URL, API_KEY).
///
/// Must be a valid environment variable name.
pub type VariableName = String;

/// A stored value: plaintext, or `base64(nonce || ciphertext)` when encrypted.
pub type StoredValue = String;

/// A git branch name scoping variable reads and writes.
pub type BranchName = String;

/// UUID v4 string identifying a history entry, snapshot, draft or version.
pub type RecordId = String;
