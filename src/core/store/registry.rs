//! Single-owner registry of open store files.
//!
//! Only one `VariableStore` per physical store file may be live in a
//! process. The lease is released when the owning store drops. The
//! registry also hands out the live data of an open store so a password
//! change can re-encrypt it in place.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Weak};

use parking_lot::{Mutex, MutexGuard};
use tracing::debug;

use super::StoreData;
use crate::core::persist;
use crate::error::{Result, StoreError};

pub(crate) type SharedData = Arc<Mutex<StoreData>>;

type OpenMap = BTreeMap<PathBuf, Weak<Mutex<StoreData>>>;

static OPEN_STORES: Mutex<OpenMap> = parking_lot::const_mutex(BTreeMap::new());

/// Exclusive claim on a store file for the lifetime of the value.
#[derive(Debug)]
pub(crate) struct PathLease(PathBuf);

impl PathLease {
    /// Claim `path` and load its contents.
    ///
    /// Loading happens under the registry lock, so it cannot interleave
    /// with a password change rewriting the file.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::AlreadyOpen` if another live store holds it,
    /// or `StoreError::Corrupt` if the file does not parse.
    pub(crate) fn acquire(path: &Path) -> Result<(Self, SharedData)> {
        let mut open = OPEN_STORES.lock();
        if open.contains_key(path) {
            return Err(StoreError::AlreadyOpen(path.to_path_buf()).into());
        }
        let data: StoreData = persist::load_json(path)?.unwrap_or_default();
        let shared = Arc::new(Mutex::new(data));
        open.insert(path.to_path_buf(), Arc::downgrade(&shared));
        debug!(path = %path.display(), "store lease acquired");
        Ok((Self(path.to_path_buf()), shared))
    }
}

impl Drop for PathLease {
    fn drop(&mut self) {
        OPEN_STORES.lock().remove(&self.0);
        debug!(path = %self.0.display(), "store lease released");
    }
}

/// The registry held locked. No store can open or close meanwhile.
pub(crate) struct OpenStores(MutexGuard<'static, OpenMap>);

/// Lock the registry.
pub(crate) fn lock() -> OpenStores {
    OpenStores(OPEN_STORES.lock())
}

impl OpenStores {
    /// Live data of the store open on `path`, if any.
    pub(crate) fn live(&self, path: &Path) -> Option<SharedData> {
        self.0.get(path).and_then(Weak::upgrade)
    }
}
