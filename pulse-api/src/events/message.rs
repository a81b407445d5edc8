//! Wire payloads for the shutdown event stream.

use serde::{Deserialize, Serialize};

/// A command delivered over an aggregator's event stream.
///
/// Serialized as a tagged object, e.g. `{"action":"shutdown"}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum EventMessage {
    /// Tells the aggregator to shut itself down.
    Shutdown,
}

/// First payload on a newly opened event stream, signaling readiness.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StreamHandshake {
    /// Always `true`; the stream is connected and will carry events.
    pub connected: bool,
}

impl StreamHandshake {
    /// Creates the connection acknowledgement payload.
    #[must_use]
    pub const fn ready() -> Self {
        Self { connected: true }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shutdown_wire_format() {
        let json = serde_json::to_string(&EventMessage::Shutdown).unwrap();
        assert_eq!(json, r#"{"action":"shutdown"}"#);
    }

    #[test]
    fn test_handshake_wire_format() {
        let json = serde_json::to_string(&StreamHandshake::ready()).unwrap();
        assert_eq!(json, r#"{"connected":true}"#);
    }

    #[test]
    fn test_shutdown_round_trip() {
        let parsed: EventMessage = serde_json::from_str(r#"{"action":"shutdown"}"#).unwrap();
        assert_eq!(parsed, EventMessage::Shutdown);
    }
}
