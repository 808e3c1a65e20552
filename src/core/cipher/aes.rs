//! AES-256-GCM backend.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rand::RngCore;
use tracing::trace;

use super::{Cipher, DataKey};
use crate::core::constants::NONCE_LEN;
use crate::error::{CipherError, Result};

/// AES-256-GCM with a random 96-bit nonce per value.
pub struct AesGcm;

impl Cipher for AesGcm {
    fn encrypt(&self, plaintext: &str, key: &DataKey) -> Result<String> {
        trace!(plaintext_len = plaintext.len(), "encrypting");

        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes()));

        let mut nonce_bytes = [0u8; NONCE_LEN];
        rand::rngs::OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = cipher
            .encrypt(nonce, plaintext.as_bytes())
            .map_err(|e| CipherError::Encrypt(e.to_string()))?;

        let mut sealed = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        sealed.extend_from_slice(&nonce_bytes);
        sealed.extend_from_slice(&ciphertext);

        Ok(STANDARD.encode(sealed))
    }

    fn decrypt(&self, encrypted: &str, key: &DataKey) -> Result<String> {
        trace!(ciphertext_len = encrypted.len(), "decrypting");

        let sealed = STANDARD
            .decode(encrypted)
            .map_err(|e| CipherError::InvalidFormat(e.to_string()))?;

        // Nonce plus the 16-byte tag is the shortest valid value.
        if sealed.len() < NONCE_LEN + 16 {
            return Err(CipherError::InvalidFormat(format!(
                "value too short ({} bytes)",
                sealed.len()
            ))
            .into());
        }

        let (nonce_bytes, ciphertext) = sealed.split_at(NONCE_LEN);
        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes()));
        let plaintext = cipher
            .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
            .map_err(|e| CipherError::Decrypt(e.to_string()))?;

        String::from_utf8(plaintext)
            .map_err(|e| CipherError::Decrypt(format!("UTF-8 error: {}", e)).into())
    }
}
