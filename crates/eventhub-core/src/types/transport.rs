//! Transport-level metadata exposed by the wrapped server.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// The transport currently carrying a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// Long-polling fallback transport.
    Polling,
    /// Upgraded persistent-socket transport.
    Websocket,
}

/// Handshake metadata captured by the server when a transport connects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandshakeData {
    /// Remote peer address.
    pub address: String,
    /// Request headers, lower-cased names.
    pub headers: HashMap<String, String>,
    /// Parsed query-string parameters.
    pub query: HashMap<String, String>,
    /// Whether the connection arrived over a secure scheme.
    pub secure: bool,
    /// Request path.
    pub url: String,
}

/// Point-in-time state of a transport-level connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportInfo {
    /// Whether the connection has been upgraded off the fallback transport.
    pub upgraded: bool,
    /// Handshake metadata recorded at connect time.
    pub handshake: HandshakeData,
}

impl TransportInfo {
    /// The transport kind implied by the upgrade state.
    pub fn kind(&self) -> TransportKind {
        if self.upgraded {
            TransportKind::Websocket
        } else {
            TransportKind::Polling
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_follows_upgrade_flag() {
        let info = TransportInfo {
            upgraded: false,
            handshake: HandshakeData::default(),
        };
        assert_eq!(info.kind(), TransportKind::Polling);

        let info = TransportInfo {
            upgraded: true,
            ..info
        };
        assert_eq!(info.kind(), TransportKind::Websocket);
    }

    #[test]
    fn test_transport_kind_wire_names() {
        assert_eq!(
            serde_json::to_string(&TransportKind::Polling).unwrap(),
            "\"polling\""
        );
        assert_eq!(
            serde_json::to_string(&TransportKind::Websocket).unwrap(),
            "\"websocket\""
        );
    }
}
