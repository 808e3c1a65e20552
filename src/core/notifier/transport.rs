//! Loopback listener transport.
//!
//! Accepts TCP connections on 127.0.0.1 and speaks newline-delimited JSON.
//! Each connection is one listener in the registry for as long as it
//! stays open. Triggers must carry a proof over the nonce the connection
//! was greeted with.

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::message::{encode, InboundMessage, NotifierMessage};
use super::Inner;
use crate::core::constants;
use crate::error::{NotifierError, Result};

/// A running accept loop.
pub(super) struct Server {
    addr: SocketAddr,
    accept: JoinHandle<()>,
    shutdown: watch::Sender<bool>,
}

impl Server {
    pub(super) fn start(inner: &Arc<Inner>, port: u16) -> Result<Self> {
        let _runtime = inner.runtime.enter();
        let bind = |source| NotifierError::Bind { port, source };

        let std_listener =
            std::net::TcpListener::bind((Ipv4Addr::LOCALHOST, port)).map_err(bind)?;
        std_listener.set_nonblocking(true).map_err(bind)?;
        let listener = TcpListener::from_std(std_listener).map_err(bind)?;
        let addr = listener.local_addr()?;

        let (shutdown, signal) = watch::channel(false);
        let accept = inner
            .runtime
            .spawn(accept_loop(Arc::clone(inner), listener, signal));

        Ok(Self {
            addr,
            accept,
            shutdown,
        })
    }

    pub(super) fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Tell every connection to close and drop the socket.
    pub(super) fn shutdown(self) {
        let _ = self.shutdown.send(true);
        self.accept.abort();
    }
}

async fn accept_loop(inner: Arc<Inner>, listener: TcpListener, mut signal: watch::Receiver<bool>) {
    loop {
        tokio::select! {
            _ = signal.changed() => break,
            accepted = listener.accept() => match accepted {
                Ok((stream, peer)) => {
                    debug!(peer = %peer, "listener connected");
                    let inner = Arc::clone(&inner);
                    let signal = signal.clone();
                    tokio::spawn(async move {
                        if let Err(e) = serve_connection(inner, stream, signal).await {
                            debug!(peer = %peer, error = %e, "listener connection ended with error");
                        }
                    });
                }
                Err(e) => warn!(error = %e, "accept failed"),
            },
        }
    }
    debug!("accept loop finished");
}

async fn serve_connection(
    inner: Arc<Inner>,
    stream: TcpStream,
    mut signal: watch::Receiver<bool>,
) -> Result<()> {
    let (tx, mut rx) = mpsc::channel(constants::LISTENER_QUEUE);
    let (id, nonce) = inner.register(tx);

    let (reader, mut writer) = stream.into_split();
    let mut lines = BufReader::new(reader).lines();

    let result: Result<()> = async {
        loop {
            tokio::select! {
                outbound = rx.recv() => match outbound {
                    Some(message) => writer.write_all(encode(&message)?.as_bytes()).await?,
                    None => break,
                },
                line = lines.next_line() => match line? {
                    Some(line) => {
                        if let Some(reply) = handle_inbound(&inner, &nonce, &line) {
                            writer.write_all(encode(&reply)?.as_bytes()).await?;
                        }
                    }
                    None => break,
                },
                _ = signal.changed() => break,
            }
        }
        Ok(())
    }
    .await;

    inner.unregister(id);
    let _ = writer.shutdown().await;
    result
}

/// Act on one inbound frame; returns a direct reply, if any.
fn handle_inbound(inner: &Arc<Inner>, nonce: &str, line: &str) -> Option<NotifierMessage> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    match serde_json::from_str::<InboundMessage>(line) {
        Ok(InboundMessage::Ping) => Some(NotifierMessage::Pong),
        Ok(InboundMessage::Trigger { event, proof }) => {
            if !inner.verify_trigger(nonce, &event, proof.as_deref()) {
                warn!(kind = %event.kind, "rejected trigger without a valid proof");
                return Some(NotifierMessage::Rejected {
                    reason: "trigger proof missing or invalid".to_string(),
                });
            }
            info!(kind = %event.kind, "trigger received from listener");
            Inner::trigger_reload(inner, event);
            None
        }
        Err(e) => {
            warn!(error = %e, "ignoring malformed frame");
            None
        }
    }
}
