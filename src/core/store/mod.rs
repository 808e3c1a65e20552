//! Variable store.
//!
//! The store file of a project is the single source of truth. One mutex
//! guards the in-memory copy of it; every mutation runs its whole
//! read-modify-persist cycle inside that lock, on a working copy that only
//! replaces the live data once the file write succeeded.
//!
//! ```text
//! <data root>/projects/<project key>/
//! ├── variables.json    # { variables, history, snapshots }
//! └── versions.json     # published draft versions
//! ```

mod branch;
mod registry;
mod snapshots;
mod variables;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::auth::CredentialStore;
use crate::core::cipher::{self, DataKey};
use crate::core::config::Paths;
use crate::core::constants;
use crate::core::domain::{HistoryEntry, Snapshot, Variable};
use crate::core::notifier::{ChangeSink, ReloadEvent};
use crate::core::persist;
use crate::core::types::BranchName;
use crate::error::Result;

pub use branch::{BranchResolver, FixedBranch, GitBranch};
use registry::{PathLease, SharedData};

/// Everything persisted in `variables.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct StoreData {
    #[serde(default)]
    variables: Vec<Variable>,
    #[serde(default)]
    history: Vec<HistoryEntry>,
    #[serde(default)]
    snapshots: Vec<Snapshot>,
}

impl StoreData {
    fn position(&self, name: &str, branch: &str) -> Option<usize> {
        self.variables
            .iter()
            .position(|v| v.name == name && v.in_branch(branch))
    }
}

/// Authenticated, encryption-capable variable store for one project.
pub struct VariableStore {
    project: PathBuf,
    dir: PathBuf,
    file: PathBuf,
    branch: BranchName,
    credentials: Arc<CredentialStore>,
    data: SharedData,
    sink: RwLock<Option<Arc<dyn ChangeSink>>>,
    _lease: PathLease,
}

impl std::fmt::Debug for VariableStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VariableStore")
            .field("project", &self.project)
            .field("file", &self.file)
            .field("branch", &self.branch)
            .finish()
    }
}

impl VariableStore {
    /// Open the store of `project`, scoped to `branch`.
    ///
    /// Opening needs no authentication; every read and write does.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::AlreadyOpen` if another live store in this
    /// process owns the same project, or `StoreError::Corrupt` if the store
    /// file cannot be parsed.
    pub fn open(
        paths: &Paths,
        project: &Path,
        credentials: Arc<CredentialStore>,
        branch: impl Into<BranchName>,
    ) -> Result<Self> {
        let dir = paths.project_dir(project);
        let file = dir.join(constants::STORE_FILE);
        let (lease, data) = PathLease::acquire(&file)?;
        let branch = branch.into();

        debug!(
            file = %file.display(),
            branch = %branch,
            variables = data.lock().variables.len(),
            "store opened"
        );

        Ok(Self {
            project: project.to_path_buf(),
            dir,
            file,
            branch,
            credentials,
            data,
            sink: RwLock::new(None),
            _lease: lease,
        })
    }

    /// Open using a resolver for the branch name.
    pub fn open_with(
        paths: &Paths,
        project: &Path,
        credentials: Arc<CredentialStore>,
        resolver: &dyn BranchResolver,
    ) -> Result<Self> {
        Self::open(paths, project, credentials, resolver.current_branch())
    }

    /// Project directory this store belongs to.
    pub fn project(&self) -> &Path {
        &self.project
    }

    /// Directory holding this project's files.
    pub fn data_dir(&self) -> &Path {
        &self.dir
    }

    /// Branch every read and write is scoped to.
    pub fn branch(&self) -> &str {
        &self.branch
    }

    /// The credential gate.
    pub fn credentials(&self) -> &Arc<CredentialStore> {
        &self.credentials
    }

    /// Whether reads and writes are currently allowed.
    pub fn is_authenticated(&self) -> bool {
        self.credentials.is_authenticated()
    }

    /// Route committed-change signals to `sink`.
    pub fn set_change_sink(&self, sink: Arc<dyn ChangeSink>) {
        *self.sink.write() = Some(sink);
    }

    /// Signal a committed change to the sink, if any.
    pub(crate) fn emit(&self, event: ReloadEvent) {
        let sink = self.sink.read().clone();
        if let Some(sink) = sink {
            sink.notify(event.with_branch(self.branch.clone()));
        }
    }

    /// Run a mutation as one critical section.
    ///
    /// The closure edits a working copy; it replaces the live data only
    /// after the file write succeeded, so a persistence failure leaves
    /// memory as it was. The key is taken inside the lock so it always
    /// matches the ciphertext in memory.
    fn mutate<T>(&self, f: impl FnOnce(&mut StoreData, &DataKey) -> Result<T>) -> Result<T> {
        let mut data = self.data.lock();
        let key = self.credentials.key()?;
        let mut working = data.clone();
        let out = f(&mut working, &key)?;
        persist::save_json(&self.file, &working)?;
        *data = working;
        Ok(out)
    }

    /// Run a read under the lock.
    fn read<T>(&self, f: impl FnOnce(&StoreData, &DataKey) -> T) -> Result<T> {
        let data = self.data.lock();
        let key = self.credentials.key()?;
        Ok(f(&data, &key))
    }
}

/// Plaintext view of a record.
///
/// A record that fails to decrypt gets the failure marker as its value;
/// the caller keeps going with the other records.
fn reveal(record: &Variable, key: &DataKey) -> Variable {
    let mut view = record.clone();
    if record.encrypted && record.sensitive {
        match cipher::decrypt(&record.value, key) {
            Ok(plaintext) => view.value = plaintext,
            Err(e) => {
                warn!(name = %record.name, error = %e, "decryption failed");
                view.value = constants::DECRYPTION_FAILED_MARKER.to_string();
            }
        }
    }
    view
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use tempfile::TempDir;

    pub const PASSWORD: &str = "correct-horse";

    /// A store in a fresh temp data root, authenticated.
    pub struct Fixture {
        pub tmp: TempDir,
        pub paths: Paths,
        pub project: PathBuf,
        pub store: Arc<VariableStore>,
    }

    impl Fixture {
        pub fn new() -> Self {
            let tmp = TempDir::new().unwrap();
            let paths = Paths::new(tmp.path().join("data"));
            let project = tmp.path().join("project");
            std::fs::create_dir_all(&project).unwrap();
            let credentials = Arc::new(CredentialStore::open(&paths));
            assert!(credentials.authenticate(PASSWORD).unwrap());
            let store =
                Arc::new(VariableStore::open(&paths, &project, credentials, "main").unwrap());
            Self {
                tmp,
                paths,
                project,
                store,
            }
        }

        /// Drop the current store and open the project again, unauthenticated.
        ///
        /// Every other clone of the store must already be gone.
        pub fn reopen(self) -> Self {
            let Fixture {
                tmp,
                paths,
                project,
                store,
            } = self;
            drop(store);
            let credentials = Arc::new(CredentialStore::open(&paths));
            let store =
                Arc::new(VariableStore::open(&paths, &project, credentials, "main").unwrap());
            Self {
                tmp,
                paths,
                project,
                store,
            }
        }
    }
}
