//! Change notifier.
//!
//! Coalesces change events and tells connected listeners when a reload
//! is pending, started and completed.
//!
//! ```text
//! trigger_reload(e) ──▶ pending(e) ──debounce──▶ started(e) ──action──▶ completed(e)
//!        │                                ▲
//!        └── a newer trigger replaces the pending event and restarts the timer
//! ```
//!
//! Reload cycles never overlap: a cycle whose timer fired while another
//! is running waits for it to finish. Broadcasting never waits on a
//! listener; a full queue drops the frame for that listener only.

mod client;
mod config;
mod event;
mod message;
mod reload;
mod transport;

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::core::cipher::signal::{self, SignalKey};
use crate::core::constants;
use crate::error::{NotifierError, Result};

pub use client::signal_running;
pub use config::{NotifierConfig, NotifierConfigUpdate, ReloadMode};
pub use event::{ChangeKind, ChangeSink, ReloadEvent};
pub use message::{InboundMessage, NotifierMessage};

use transport::Server;

/// Receiving end of an in-process listener.
pub type ListenerReceiver = mpsc::Receiver<NotifierMessage>;

struct Listener {
    id: u64,
    tx: mpsc::Sender<NotifierMessage>,
}

#[derive(Default)]
struct Debounce {
    generation: u64,
    timer: Option<JoinHandle<()>>,
    pending: Option<ReloadEvent>,
}

struct Inner {
    runtime: Handle,
    config: RwLock<NotifierConfig>,
    listeners: Mutex<Vec<Listener>>,
    next_listener: AtomicU64,
    debounce: Mutex<Debounce>,
    cycle: tokio::sync::Mutex<()>,
    server: Mutex<Option<Server>>,
    signal_key: RwLock<Option<SignalKey>>,
}

/// Debouncing broadcaster of reload lifecycle messages.
pub struct ChangeNotifier {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for ChangeNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeNotifier")
            .field("config", &*self.inner.config.read())
            .field("listeners", &self.inner.listeners.lock().len())
            .field("running", &self.is_running())
            .finish()
    }
}

impl ChangeNotifier {
    /// Build a notifier bound to the current tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns `NotifierError::NoRuntime` outside a runtime, or a config
    /// error if `config` is inconsistent.
    pub fn new(config: NotifierConfig) -> Result<Self> {
        config.validate()?;
        let runtime = Handle::try_current().map_err(|_| NotifierError::NoRuntime)?;
        Ok(Self {
            inner: Arc::new(Inner {
                runtime,
                config: RwLock::new(config),
                listeners: Mutex::new(Vec::new()),
                next_listener: AtomicU64::new(1),
                debounce: Mutex::new(Debounce::default()),
                cycle: tokio::sync::Mutex::new(()),
                server: Mutex::new(None),
                signal_key: RwLock::new(None),
            }),
        })
    }

    /// Current configuration.
    pub fn config(&self) -> NotifierConfig {
        self.inner.config.read().clone()
    }

    /// Schedule a reload for `event`, replacing any pending one.
    pub fn trigger_reload(&self, event: ReloadEvent) {
        Inner::trigger_reload(&self.inner, event);
    }

    /// Merge `update` into the running config and broadcast it.
    ///
    /// A pending timer keeps its original delay; a changed port applies on
    /// the next `start`.
    pub fn update_config(&self, update: NotifierConfigUpdate) -> Result<NotifierConfig> {
        let config = {
            let mut current = self.inner.config.write();
            *current = current.merged(update)?;
            current.clone()
        };
        info!(debounce_ms = config.debounce_ms, mode = ?config.mode, "notifier config updated");
        self.inner.broadcast(NotifierMessage::Config {
            config: config.clone(),
        });
        Ok(config)
    }

    /// Accept remote triggers signed with `key`. Until a key is set,
    /// every remote trigger is rejected.
    pub fn set_signal_key(&self, key: SignalKey) {
        *self.inner.signal_key.write() = Some(key);
        debug!("remote triggers enabled");
    }

    /// Attach an in-process listener. Its first message is `connected`.
    pub fn subscribe(&self) -> ListenerReceiver {
        let (tx, rx) = mpsc::channel(constants::LISTENER_QUEUE);
        self.inner.register(tx);
        rx
    }

    /// Number of live listeners; closed ones are pruned first.
    pub fn listener_count(&self) -> usize {
        let mut listeners = self.inner.listeners.lock();
        listeners.retain(|l| !l.tx.is_closed());
        listeners.len()
    }

    /// Start accepting listeners on `127.0.0.1:<port>`.
    ///
    /// Starting a running notifier returns the address it already has.
    ///
    /// # Errors
    ///
    /// Returns `NotifierError::Bind` if the port is taken.
    pub fn start(&self) -> Result<SocketAddr> {
        let mut server = self.inner.server.lock();
        if let Some(running) = server.as_ref() {
            return Ok(running.addr());
        }
        let port = self.inner.config.read().port;
        let started = Server::start(&self.inner, port)?;
        let addr = started.addr();
        *server = Some(started);
        info!(addr = %addr, "notifier listening");
        Ok(addr)
    }

    /// Close every listener, then release the socket. No-op when stopped.
    pub fn stop(&self) {
        let server = self.inner.server.lock().take();
        let closed = {
            let mut listeners = self.inner.listeners.lock();
            let n = listeners.len();
            listeners.clear();
            n
        };
        if let Some(server) = server {
            server.shutdown();
            info!(listeners = closed, "notifier stopped");
        }
    }

    /// Whether the socket is open.
    pub fn is_running(&self) -> bool {
        self.inner.server.lock().is_some()
    }

    /// Bound address while running.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.inner.server.lock().as_ref().map(Server::addr)
    }
}

impl Drop for ChangeNotifier {
    fn drop(&mut self) {
        self.stop();
        if let Some(timer) = self.inner.debounce.lock().timer.take() {
            timer.abort();
        }
    }
}

impl ChangeSink for ChangeNotifier {
    fn notify(&self, event: ReloadEvent) {
        self.trigger_reload(event);
    }
}

impl Inner {
    fn trigger_reload(this: &Arc<Self>, event: ReloadEvent) {
        let delay = this.config.read().delay();
        {
            let mut debounce = this.debounce.lock();
            debounce.generation += 1;
            let generation = debounce.generation;
            if let Some(timer) = debounce.timer.take() {
                timer.abort();
                debug!("pending reload superseded");
            }
            debounce.pending = Some(event.clone());

            let inner = Arc::clone(this);
            debounce.timer = Some(this.runtime.spawn(async move {
                tokio::time::sleep(delay).await;
                inner.fire(generation).await;
            }));
        }

        this.broadcast(NotifierMessage::Pending {
            event,
            delay_ms: delay.as_millis() as u64,
        });
    }

    async fn fire(&self, generation: u64) {
        let event = {
            let mut debounce = self.debounce.lock();
            if debounce.generation != generation {
                return;
            }
            // Detach: a later trigger must not abort a cycle already under way.
            debounce.timer = None;
            match debounce.pending.take() {
                Some(event) => event,
                None => return,
            }
        };

        let _cycle = self.cycle.lock().await;
        let config = self.config.read().clone();

        info!(kind = %event.kind, "reload started");
        self.broadcast(NotifierMessage::Started {
            event: event.clone(),
        });
        let outcome = reload::run(&config, &event).await;
        match &outcome {
            Ok(()) => info!(kind = %event.kind, "reload completed"),
            Err(e) => warn!(kind = %event.kind, error = %e, "reload failed"),
        }
        self.broadcast(NotifierMessage::Completed {
            event,
            success: outcome.is_ok(),
            error: outcome.err(),
        });
    }

    /// Add a listener and greet it with the current config and a fresh
    /// nonce for signing triggers.
    fn register(&self, tx: mpsc::Sender<NotifierMessage>) -> (u64, String) {
        let id = self.next_listener.fetch_add(1, Ordering::Relaxed);
        let config = self.config.read().clone();
        let nonce = signal::generate_nonce();
        let greeting = NotifierMessage::Connected {
            config,
            nonce: nonce.clone(),
        };
        if tx.try_send(greeting).is_err() {
            debug!(id, "listener gone before greeting");
        }
        self.listeners.lock().push(Listener { id, tx });
        debug!(id, "listener registered");
        (id, nonce)
    }

    /// Whether `proof` signs `event` for the connection holding `nonce`.
    fn verify_trigger(&self, nonce: &str, event: &ReloadEvent, proof: Option<&str>) -> bool {
        let key = self.signal_key.read();
        let (Some(key), Some(proof)) = (key.as_ref(), proof) else {
            return false;
        };
        match message::trigger_payload(event) {
            Ok(payload) => key.verify(nonce, &payload, proof),
            Err(_) => false,
        }
    }

    fn unregister(&self, id: u64) {
        self.listeners.lock().retain(|l| l.id != id);
        debug!(id, "listener removed");
    }

    /// Send to every listener without waiting on any of them.
    fn broadcast(&self, message: NotifierMessage) {
        let mut listeners = self.listeners.lock();
        listeners.retain(|listener| match listener.tx.try_send(message.clone()) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!(id = listener.id, "listener queue full, frame dropped");
                true
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                warn!(id = listener.id, "listener disconnected");
                false
            }
        });
    }
}
