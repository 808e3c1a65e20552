//! Opening an authenticated store for a command.

use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::sync::{mpsc, Arc};
use std::thread::JoinHandle;

use dialoguer::Password;
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::core::auth::CredentialStore;
use crate::core::cipher::SignalKey;
use crate::core::config::{Paths, Settings};
use crate::core::constants;
use crate::core::notifier::{signal_running, ChangeSink, ReloadEvent};
use crate::core::store::{FixedBranch, GitBranch, VariableStore};
use crate::error::{Error, Result, ValidationError};

/// Project and branch selection from the global flags.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    pub project: Option<PathBuf>,
    pub branch: Option<String>,
}

/// Everything a command needs.
pub struct Session {
    pub paths: Paths,
    pub settings: Settings,
    pub store: Arc<VariableStore>,
    password: zeroize::Zeroizing<String>,
}

impl Session {
    /// Resolve paths and settings, authenticate and open the project store.
    ///
    /// Committed changes are forwarded to a notifier running on the
    /// configured port, if there is one.
    pub fn open(scope: &Scope) -> Result<Self> {
        let paths = Paths::resolve()?;
        let settings = Settings::load(&paths)?;
        let project = match &scope.project {
            Some(dir) => dir.clone(),
            None => std::env::current_dir()?,
        };

        let (credentials, password) = authenticate(&paths)?;

        let store = match &scope.branch {
            Some(branch) => VariableStore::open_with(
                &paths,
                &project,
                credentials.clone(),
                &FixedBranch(branch.clone()),
            )?,
            None => VariableStore::open_with(
                &paths,
                &project,
                credentials.clone(),
                &GitBranch::new(&project, settings.store.default_branch.clone()),
            )?,
        };
        store.set_change_sink(Arc::new(RemoteSignal::spawn(
            settings.notifier.port,
            credentials,
        )?));
        debug!(
            project = %store.project().display(),
            branch = %store.branch(),
            "session opened"
        );

        Ok(Self {
            paths,
            settings,
            store: Arc::new(store),
            password,
        })
    }

    /// The password this session authenticated with.
    pub fn password(&self) -> &str {
        &self.password
    }
}

/// Prompt for the store password (or read it from the environment) and
/// authenticate, bootstrapping credentials on first use.
pub fn authenticate(paths: &Paths) -> Result<(Arc<CredentialStore>, zeroize::Zeroizing<String>)> {
    let credentials = Arc::new(CredentialStore::open(paths));
    let prompt = if credentials.has_credentials() {
        "Store password"
    } else {
        "New store password"
    };
    let password = read_password(prompt, constants::PASSWORD_ENV)?;
    if !credentials.authenticate(&password)? {
        return Err(Error::Unauthenticated);
    }
    Ok((credentials, password))
}

/// Read a password from `env_var`, else prompt on a terminal.
pub fn read_password(prompt: &str, env_var: &str) -> Result<zeroize::Zeroizing<String>> {
    if let Ok(password) = std::env::var(env_var) {
        return Ok(zeroize::Zeroizing::new(password));
    }
    if !io::stdin().is_terminal() {
        return Err(ValidationError::EmptyPassword.into());
    }
    let password = Password::new()
        .with_prompt(prompt)
        .interact()
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;
    Ok(zeroize::Zeroizing::new(password))
}

/// Forwards store changes to a notifier in another process.
///
/// Signals go out on a worker thread so a mutation never waits on the
/// socket. Dropping the sink flushes whatever is still queued.
struct RemoteSignal {
    credentials: Arc<CredentialStore>,
    queue: Mutex<Option<mpsc::Sender<(ReloadEvent, SignalKey)>>>,
    worker: Option<JoinHandle<()>>,
}

impl RemoteSignal {
    fn spawn(port: u16, credentials: Arc<CredentialStore>) -> Result<Self> {
        let (tx, rx) = mpsc::channel::<(ReloadEvent, SignalKey)>();
        let worker = std::thread::Builder::new()
            .name("envdeck-signal".to_string())
            .spawn(move || {
                for (event, key) in rx {
                    match signal_running(port, &event, &key) {
                        Ok(true) => debug!(port, "notifier signalled"),
                        Ok(false) => {}
                        Err(e) => debug!(port, error = %e, "could not signal notifier"),
                    }
                }
            })?;
        Ok(Self {
            credentials,
            queue: Mutex::new(Some(tx)),
            worker: Some(worker),
        })
    }
}

impl ChangeSink for RemoteSignal {
    fn notify(&self, event: ReloadEvent) {
        let key = match self.credentials.key().and_then(|key| SignalKey::derive(&key)) {
            Ok(key) => key,
            Err(e) => {
                debug!(error = %e, "notifier signal not signed, skipped");
                return;
            }
        };
        if let Some(queue) = self.queue.lock().as_ref() {
            if queue.send((event, key)).is_err() {
                debug!("notifier signal worker gone");
            }
        }
    }
}

impl Drop for RemoteSignal {
    fn drop(&mut self) {
        self.queue.get_mut().take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("notifier signal worker panicked");
            }
        }
    }
}
