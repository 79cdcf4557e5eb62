//! Socket snapshot builder.
//!
//! Maps a connection identity plus its transport state into the
//! serializable descriptor embedded in `socket_connected` and
//! `all_sockets` messages. Pure projection; the snapshot owns nothing and
//! is never kept beyond the message it travels in.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use eventhub_core::types::{SocketId, TransportId, TransportInfo, TransportKind};

/// Handshake portion of a socket snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandshakeSnapshot {
    /// Remote peer address.
    pub address: String,
    /// Request headers, lower-cased names.
    pub headers: std::collections::HashMap<String, String>,
    /// Parsed query parameters.
    pub query: std::collections::HashMap<String, String>,
    /// Whether the connection used a secure scheme.
    pub secure: bool,
    /// Request path.
    pub url: String,
    /// Connect time in milliseconds since the epoch, 0 when unknown.
    pub issued: i64,
    /// Connect time as an ISO-8601 UTC timestamp, empty when unknown.
    pub time: String,
}

/// Point-in-time descriptor of a connected socket.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocketSnapshot {
    /// Socket identifier within its namespace.
    pub id: SocketId,
    /// Transport-level client identifier.
    pub client_id: TransportId,
    /// Current transport.
    pub transport: TransportKind,
    /// Owning namespace.
    pub nsp: String,
    /// Application data attached to the socket (always empty here).
    pub data: Value,
    /// Handshake metadata.
    pub handshake: HandshakeSnapshot,
    /// Rooms the socket belongs to.
    pub rooms: Vec<String>,
}

/// Build a snapshot from a socket identity and its observed environment.
///
/// `issued` is the connect timestamp recorded by the lifecycle
/// interceptor; `None` means the socket is unknown to the side table (a
/// stale lookup) and is reported as an unknown issue time rather than an
/// error.
pub fn build_snapshot(
    sid: SocketId,
    namespace: &str,
    transport: TransportId,
    info: &TransportInfo,
    rooms: Vec<String>,
    issued: Option<DateTime<Utc>>,
) -> SocketSnapshot {
    let handshake = &info.handshake;
    SocketSnapshot {
        id: sid,
        client_id: transport,
        transport: info.kind(),
        nsp: namespace.to_string(),
        data: Value::Object(serde_json::Map::new()),
        handshake: HandshakeSnapshot {
            address: handshake.address.clone(),
            headers: handshake.headers.clone(),
            query: handshake.query.clone(),
            secure: handshake.secure,
            url: handshake.url.clone(),
            issued: issued.map(|t| t.timestamp_millis()).unwrap_or(0),
            time: issued.map(|t| t.to_rfc3339()).unwrap_or_default(),
        },
        rooms,
    }
}
