//! Credential store.
//!
//! Holds the password hash and salt on disk and the derived data key in
//! memory. Every gated operation asks [`CredentialStore::key`] on each call,
//! so a logout takes effect immediately.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::core::cipher::kdf::{self, DataKey};
use crate::core::config::Paths;
use crate::core::constants::PBKDF2_ITERATIONS;
use crate::core::persist;
use crate::error::{CipherError, Error, Result, ValidationError};

/// Persisted credentials record. Never contains the data key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Hex-encoded PBKDF2-HMAC-SHA512 output.
    pub password_hash: String,
    /// Hex-encoded random salt.
    pub salt: String,
    #[serde(default = "default_iterations")]
    pub iterations: u32,
    pub created_at: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,
}

fn default_iterations() -> u32 {
    PBKDF2_ITERATIONS
}

impl Credentials {
    /// Fresh record for `password` with a new random salt.
    fn create(password: &str, created_at: DateTime<Utc>) -> Self {
        let salt = kdf::generate_salt();
        let hash = kdf::hash_password(password, &salt);
        Self {
            password_hash: hex::encode(hash.as_slice()),
            salt: hex::encode(salt),
            iterations: PBKDF2_ITERATIONS,
            created_at,
            last_modified: Utc::now(),
        }
    }

    fn salt_bytes(&self) -> Result<Vec<u8>> {
        hex::decode(&self.salt)
            .map_err(|e| CipherError::InvalidFormat(format!("credential salt: {}", e)).into())
    }

    fn verify(&self, password: &str) -> Result<bool> {
        let salt = self.salt_bytes()?;
        let expected = hex::decode(&self.password_hash)
            .map_err(|e| CipherError::InvalidFormat(format!("credential hash: {}", e)))?;
        Ok(kdf::verify_password(
            password,
            &salt,
            &expected,
            self.iterations,
        ))
    }

    fn data_key(&self, password: &str) -> Result<DataKey> {
        kdf::derive_data_key(password, &self.salt_bytes()?)
    }
}

#[derive(Default)]
struct Session {
    authenticated: bool,
    key: Option<DataKey>,
}

/// A verified password change not yet written to disk.
///
/// Produced by [`CredentialStore::prepare_password_change`] so the caller
/// can re-encrypt its data under `new_key` before committing.
pub struct PendingPassword {
    credentials: Credentials,
    pub(crate) old_key: DataKey,
    pub(crate) new_key: DataKey,
}

/// Password gate and in-memory key holder for one installation.
pub struct CredentialStore {
    path: PathBuf,
    session: RwLock<Session>,
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore")
            .field("path", &self.path)
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}

impl CredentialStore {
    /// Credential store for the installation at `paths`. No I/O happens
    /// until the first [`authenticate`](Self::authenticate).
    pub fn open(paths: &Paths) -> Self {
        Self::at(paths.credentials_file())
    }

    /// Credential store backed by an explicit file.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            session: RwLock::new(Session::default()),
        }
    }

    /// Credentials file location.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether credentials have been bootstrapped.
    pub fn has_credentials(&self) -> bool {
        self.path.exists()
    }

    /// Authenticate, bootstrapping credentials on first use.
    ///
    /// Returns `Ok(false)` for a wrong password without saying whether
    /// credentials existed.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::EmptyPassword` for an empty password and
    /// `StoreError` variants when the credentials file cannot be read or
    /// written.
    pub fn authenticate(&self, password: &str) -> Result<bool> {
        if password.is_empty() {
            return Err(ValidationError::EmptyPassword.into());
        }

        let key = match self.load()? {
            None => {
                let credentials = Credentials::create(password, Utc::now());
                let key = credentials.data_key(password)?;
                persist::save_json(&self.path, &credentials)?;
                info!(path = %self.path.display(), "credentials created");
                key
            }
            Some(credentials) => {
                if !credentials.verify(password)? {
                    debug!("authentication rejected");
                    self.logout();
                    return Ok(false);
                }
                credentials.data_key(password)?
            }
        };

        let mut session = self.session.write();
        session.authenticated = true;
        session.key = Some(key);
        info!("authenticated");
        Ok(true)
    }

    /// True only with both the flag set and a key in memory.
    pub fn is_authenticated(&self) -> bool {
        let session = self.session.read();
        session.authenticated && session.key.is_some()
    }

    /// Drop the in-memory key. Persisted credentials are untouched.
    pub fn logout(&self) {
        let mut session = self.session.write();
        if session.authenticated {
            info!("logged out");
        }
        session.authenticated = false;
        session.key = None;
    }

    /// Current data key.
    ///
    /// # Errors
    ///
    /// Returns `Error::Unauthenticated` when no session is active.
    pub fn key(&self) -> Result<DataKey> {
        let session = self.session.read();
        match (&session.key, session.authenticated) {
            (Some(key), true) => Ok(key.clone()),
            _ => Err(Error::Unauthenticated),
        }
    }

    /// Fail with `Unauthenticated` unless a session is active.
    pub fn require(&self) -> Result<()> {
        self.key().map(|_| ())
    }

    /// Verify `current` and derive the record and key for `new`.
    ///
    /// Returns `Ok(None)` if `current` is wrong. Nothing is written.
    pub fn prepare_password_change(
        &self,
        current: &str,
        new: &str,
    ) -> Result<Option<PendingPassword>> {
        let old_key = self.key()?;
        if new.is_empty() {
            return Err(ValidationError::EmptyPassword.into());
        }
        let Some(existing) = self.load()? else {
            return Err(Error::Unauthenticated);
        };
        if !existing.verify(current)? {
            return Ok(None);
        }

        let credentials = Credentials::create(new, existing.created_at);
        let new_key = credentials.data_key(new)?;
        Ok(Some(PendingPassword {
            credentials,
            old_key,
            new_key,
        }))
    }

    /// Persist a prepared change and switch the session to the new key.
    pub fn commit_password_change(&self, pending: PendingPassword) -> Result<()> {
        persist::save_json(&self.path, &pending.credentials)?;
        let mut session = self.session.write();
        session.authenticated = true;
        session.key = Some(pending.new_key);
        info!("password changed");
        Ok(())
    }

    fn load(&self) -> Result<Option<Credentials>> {
        persist::load_json(&self.path)
    }
}
