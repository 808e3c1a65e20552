//! Wire messages.
//!
//! Every frame is one JSON object on its own line, tagged by `type`.

use serde::{Deserialize, Serialize};

use super::{NotifierConfig, ReloadEvent};

/// Server to listener.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NotifierMessage {
    /// First frame on every connection. Remote triggers on this
    /// connection must be signed over `nonce`.
    Connected { config: NotifierConfig, nonce: String },
    /// The running configuration changed.
    Config { config: NotifierConfig },
    /// A reload is scheduled after `delay_ms`; an earlier pending one is
    /// superseded.
    Pending { event: ReloadEvent, delay_ms: u64 },
    Started { event: ReloadEvent },
    Completed {
        event: ReloadEvent,
        success: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
    Pong,
    /// A trigger was refused.
    Rejected { reason: String },
}

/// Listener to server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundMessage {
    Ping,
    /// Same as calling `trigger_reload` in process, once `proof` checks
    /// out against the connection nonce.
    Trigger {
        event: ReloadEvent,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        proof: Option<String>,
    },
}

/// Bytes a trigger proof covers.
pub(crate) fn trigger_payload(event: &ReloadEvent) -> serde_json::Result<Vec<u8>> {
    serde_json::to_vec(event)
}

/// Encode a frame, newline included.
pub(crate) fn encode<T: Serialize>(message: &T) -> serde_json::Result<String> {
    let mut line = serde_json::to_string(message)?;
    line.push('\n');
    Ok(line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::notifier::ChangeKind;

    #[test]
    fn test_frames_are_tagged() {
        let line = encode(&NotifierMessage::Pong).unwrap();
        assert_eq!(line, "{\"type\":\"pong\"}\n");

        let pending = NotifierMessage::Pending {
            event: ReloadEvent::new(ChangeKind::Manual),
            delay_ms: 1000,
        };
        let value: serde_json::Value = serde_json::from_str(&encode(&pending).unwrap()).unwrap();
        assert_eq!(value["type"], "pending");
        assert_eq!(value["delay_ms"], 1000);
        assert_eq!(value["event"]["kind"], "manual");
    }

    #[test]
    fn test_inbound_parse() {
        let ping: InboundMessage = serde_json::from_str("{\"type\":\"ping\"}").unwrap();
        assert_eq!(ping, InboundMessage::Ping);

        let trigger: InboundMessage = serde_json::from_str(
            "{\"type\":\"trigger\",\"event\":{\"kind\":\"variable_set\",\"variables\":[\"A\"],\"timestamp\":\"2026-01-01T00:00:00Z\"}}",
        )
        .unwrap();
        match trigger {
            InboundMessage::Trigger { event, proof } => {
                assert_eq!(event.kind, ChangeKind::VariableSet);
                assert_eq!(event.variables, vec!["A".to_string()]);
                assert!(proof.is_none());
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn test_trigger_payload_survives_the_wire() {
        let event = ReloadEvent::new(ChangeKind::VariableSet)
            .with_variables(["A", "B"])
            .with_branch("main");
        let frame = encode(&InboundMessage::Trigger {
            event: event.clone(),
            proof: Some("ab".to_string()),
        })
        .unwrap();

        match serde_json::from_str(&frame).unwrap() {
            InboundMessage::Trigger { event: parsed, proof } => {
                assert_eq!(trigger_payload(&parsed).unwrap(), trigger_payload(&event).unwrap());
                assert_eq!(proof.as_deref(), Some("ab"));
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn test_completed_omits_missing_error() {
        let done = NotifierMessage::Completed {
            event: ReloadEvent::new(ChangeKind::Manual),
            success: true,
            error: None,
        };
        assert!(!encode(&done).unwrap().contains("error"));
    }
}
