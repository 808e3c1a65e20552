//! Private file persistence.
//!
//! All envdeck files hold secrets or secret-derived material, so every write
//! goes to a sibling temp file created with owner-only permissions and is
//! then renamed over the target.

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::error::{Result, StoreError};

/// Atomically replace `path` with `contents` (0600 on Unix).
pub fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let tmp = temp_path(path);

    {
        let mut options = std::fs::OpenOptions::new();
        options.create(true).truncate(true).write(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options.open(&tmp)?;
        file.write_all(contents)?;
        file.sync_all()?;
    }

    std::fs::rename(&tmp, path)
}

/// Serialize `value` as pretty JSON and write it privately.
///
/// # Errors
///
/// Returns `StoreError::Persistence` carrying the target path on any I/O
/// failure.
pub fn save_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let contents = serde_json::to_vec_pretty(value)?;
    write_private(path, &contents).map_err(|source| StoreError::Persistence {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), bytes = contents.len(), "saved");
    Ok(())
}

/// Read a JSON file, returning `None` when it does not exist.
///
/// # Errors
///
/// Returns `StoreError::Corrupt` if the file exists but does not parse.
pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }
    let contents = std::fs::read(path)?;
    let value = serde_json::from_slice(&contents).map_err(|e| StoreError::Corrupt {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    debug!(path = %path.display(), "loaded");
    Ok(Some(value))
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
