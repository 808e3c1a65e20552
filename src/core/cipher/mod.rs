//! Value encryption.
//!
//! Sensitive variable values are sealed one at a time with a key derived
//! from the operator's password. Every call draws a fresh nonce, so the
//! same plaintext never produces the same stored string twice.
//!
//! ## Format
//!
//! ```text
//! base64( nonce (12 bytes) || ciphertext + tag )
//! ```

use crate::error::Result;

mod aes;
pub mod kdf;
pub mod signal;

pub use aes::AesGcm;
pub use kdf::DataKey;
pub use signal::SignalKey;

/// Per-value symmetric cipher.
///
/// Implementations must embed whatever they need to decrypt (nonce, IV)
/// in the returned string.
pub trait Cipher {
    /// Encrypt a plaintext value.
    ///
    /// # Errors
    ///
    /// Returns `CipherError::Encrypt` if the backend rejects the key or input.
    fn encrypt(&self, plaintext: &str, key: &DataKey) -> Result<String>;

    /// Decrypt a value produced by [`Cipher::encrypt`].
    ///
    /// # Errors
    ///
    /// Returns `CipherError::InvalidFormat` for malformed input and
    /// `CipherError::Decrypt` when the key does not match or the value was
    /// tampered with.
    fn decrypt(&self, encrypted: &str, key: &DataKey) -> Result<String>;
}

/// Encrypt with the default AES-256-GCM backend.
pub fn encrypt(plaintext: &str, key: &DataKey) -> Result<String> {
    AesGcm.encrypt(plaintext, key)
}

/// Decrypt with the default AES-256-GCM backend.
pub fn decrypt(encrypted: &str, key: &DataKey) -> Result<String> {
    AesGcm.decrypt(encrypted, key)
}
