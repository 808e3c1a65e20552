//! Blocking client for signalling a running notifier from another process.

use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::net::{Ipv4Addr, Shutdown, SocketAddr, TcpStream};
use std::time::Duration;

use tracing::debug;

use super::message::{encode, trigger_payload, InboundMessage, NotifierMessage};
use super::ReloadEvent;
use crate::core::cipher::SignalKey;
use crate::error::{NotifierError, Result};

const CONNECT_TIMEOUT: Duration = Duration::from_millis(250);
const READ_TIMEOUT: Duration = Duration::from_secs(1);

/// Send `event` as a signed trigger to a notifier on `127.0.0.1:<port>`.
///
/// Returns once the frame is written; the notifier's verdict is not
/// awaited. Returns `Ok(false)` when nothing is listening there.
///
/// # Errors
///
/// Returns `NotifierError::UnexpectedGreeting` if the peer does not open
/// with a `connected` frame.
pub fn signal_running(port: u16, event: &ReloadEvent, key: &SignalKey) -> Result<bool> {
    let addr = SocketAddr::from((Ipv4Addr::LOCALHOST, port));
    let stream = match TcpStream::connect_timeout(&addr, CONNECT_TIMEOUT) {
        Ok(stream) => stream,
        Err(e)
            if matches!(
                e.kind(),
                ErrorKind::ConnectionRefused | ErrorKind::TimedOut | ErrorKind::WouldBlock
            ) =>
        {
            debug!(port, "no notifier running");
            return Ok(false);
        }
        Err(e) => return Err(e.into()),
    };
    stream.set_read_timeout(Some(READ_TIMEOUT))?;

    let mut greeting = String::new();
    BufReader::new(stream.try_clone()?).read_line(&mut greeting)?;
    let nonce = match serde_json::from_str(&greeting) {
        Ok(NotifierMessage::Connected { nonce, .. }) => nonce,
        _ => return Err(NotifierError::UnexpectedGreeting { port }.into()),
    };

    let proof = key.sign(&nonce, &trigger_payload(event)?)?;
    let frame = encode(&InboundMessage::Trigger {
        event: event.clone(),
        proof: Some(proof),
    })?;

    let mut writer = stream;
    writer.write_all(frame.as_bytes())?;
    writer.flush()?;
    writer.shutdown(Shutdown::Write)?;

    debug!(port, kind = %event.kind, "notifier signalled");
    Ok(true)
}
