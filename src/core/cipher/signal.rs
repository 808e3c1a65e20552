//! Notifier trigger signing.
//!
//! A process that knows the store password proves it to a running
//! notifier with an HMAC-SHA256 over the connection nonce and the event.
//! The signing key is itself an HMAC of the data key, so the notifier
//! never holds the key that decrypts values.

use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha256;
use zeroize::Zeroizing;

use super::DataKey;
use crate::core::constants::{SIGNAL_KEY_CONTEXT, SIGNAL_NONCE_LEN};
use crate::error::{CipherError, Result};

type HmacSha256 = Hmac<Sha256>;

/// Key for signing and checking trigger frames. Zeroized on drop.
#[derive(Clone)]
pub struct SignalKey(Zeroizing<[u8; 32]>);

impl std::fmt::Debug for SignalKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SignalKey(..)")
    }
}

impl SignalKey {
    /// Signing key bound to a data key.
    pub fn derive(data_key: &DataKey) -> Result<Self> {
        let mut mac = keyed(data_key.as_bytes())?;
        mac.update(SIGNAL_KEY_CONTEXT);
        let mut key = Zeroizing::new([0u8; 32]);
        key.copy_from_slice(&mac.finalize().into_bytes());
        Ok(Self(key))
    }

    /// Hex proof over `nonce` and `payload`.
    pub fn sign(&self, nonce: &str, payload: &[u8]) -> Result<String> {
        let mac = self.mac(nonce, payload)?;
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    /// Constant-time check of a hex proof.
    pub fn verify(&self, nonce: &str, payload: &[u8], proof: &str) -> bool {
        let Ok(expected) = hex::decode(proof) else {
            return false;
        };
        match self.mac(nonce, payload) {
            Ok(mac) => mac.verify_slice(&expected).is_ok(),
            Err(_) => false,
        }
    }

    fn mac(&self, nonce: &str, payload: &[u8]) -> Result<HmacSha256> {
        let mut mac = keyed(&self.0[..])?;
        mac.update(nonce.as_bytes());
        mac.update(b"\n");
        mac.update(payload);
        Ok(mac)
    }
}

/// Fresh hex nonce for one notifier connection.
pub fn generate_nonce() -> String {
    let mut nonce = [0u8; SIGNAL_NONCE_LEN];
    rand::rngs::OsRng.fill_bytes(&mut nonce);
    hex::encode(nonce)
}

fn keyed(key: &[u8]) -> Result<HmacSha256> {
    HmacSha256::new_from_slice(key).map_err(|e| CipherError::KeyDerivation(e.to_string()).into())
}
