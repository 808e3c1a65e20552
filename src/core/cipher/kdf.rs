//! Password hashing and data key derivation.
//!
//! Both the stored password hash and the in-memory data key come from
//! PBKDF2-HMAC-SHA512 over the same password and salt. The data key run
//! appends a fixed context to the salt, so the stored hash reveals nothing
//! about the key.

use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::Sha512;
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use crate::core::constants::{
    DATA_KEY_CONTEXT, DATA_KEY_LEN, PASSWORD_HASH_LEN, PBKDF2_ITERATIONS, SALT_LEN,
};
use crate::error::{CipherError, Result};

/// 32-byte AES key held only in memory. Zeroized on drop.
#[derive(Clone)]
pub struct DataKey(Zeroizing<[u8; DATA_KEY_LEN]>);

impl DataKey {
    /// Raw key bytes.
    pub fn as_bytes(&self) -> &[u8; DATA_KEY_LEN] {
        &self.0
    }
}

impl std::fmt::Debug for DataKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("DataKey(..)")
    }
}

/// Fresh random salt.
pub fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    rand::rngs::OsRng.fill_bytes(&mut salt);
    salt
}

/// Password hash stored in the credentials record.
pub fn hash_password(password: &str, salt: &[u8]) -> Zeroizing<Vec<u8>> {
    hash_password_with(password, salt, PBKDF2_ITERATIONS)
}

/// Password hash with an explicit round count (records created with an
/// older count keep verifying).
pub fn hash_password_with(password: &str, salt: &[u8], iterations: u32) -> Zeroizing<Vec<u8>> {
    let mut out = Zeroizing::new(vec![0u8; PASSWORD_HASH_LEN]);
    pbkdf2_hmac::<Sha512>(password.as_bytes(), salt, iterations, &mut out);
    out
}

/// Constant-time check of a password against a stored hash.
pub fn verify_password(password: &str, salt: &[u8], expected: &[u8], iterations: u32) -> bool {
    let candidate = hash_password_with(password, salt, iterations);
    candidate.len() == expected.len() && bool::from(candidate.as_slice().ct_eq(expected))
}

/// Derive the data encryption key for a password and salt.
///
/// # Errors
///
/// Returns `CipherError::KeyDerivation` if the salt is empty.
pub fn derive_data_key(password: &str, salt: &[u8]) -> Result<DataKey> {
    if salt.is_empty() {
        return Err(CipherError::KeyDerivation("empty salt".to_string()).into());
    }
    let mut key_salt = Vec::with_capacity(salt.len() + DATA_KEY_CONTEXT.len());
    key_salt.extend_from_slice(salt);
    key_salt.extend_from_slice(DATA_KEY_CONTEXT);

    let mut key = Zeroizing::new([0u8; DATA_KEY_LEN]);
    pbkdf2_hmac::<Sha512>(password.as_bytes(), &key_salt, PBKDF2_ITERATIONS, &mut key[..]);
    Ok(DataKey(key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_length_and_determinism() {
        let salt = [1u8; SALT_LEN];
        let a = hash_password("pw", &salt);
        let b = hash_password("pw", &salt);

        assert_eq!(a.len(), PASSWORD_HASH_LEN);
        assert_eq!(a.as_slice(), b.as_slice());
    }

    #[test]
    fn test_verify_password() {
        let salt = generate_salt();
        let hash = hash_password("correct-horse", &salt);

        assert!(verify_password("correct-horse", &salt, &hash, PBKDF2_ITERATIONS));
        assert!(!verify_password("wrong", &salt, &hash, PBKDF2_ITERATIONS));
        assert!(!verify_password("correct-horse", &salt, &hash[..10], PBKDF2_ITERATIONS));
    }

    #[test]
    fn test_data_key_differs_from_hash() {
        let salt = [9u8; SALT_LEN];
        let hash = hash_password("pw", &salt);
        let key = derive_data_key("pw", &salt).unwrap();

        assert_ne!(&hash[..DATA_KEY_LEN], key.as_bytes());
    }

    #[test]
    fn test_salts_are_random() {
        assert_ne!(generate_salt(), generate_salt());
    }

    #[test]
    fn test_empty_salt_rejected() {
        assert!(derive_data_key("pw", &[]).is_err());
    }
}
