//! Admin wire protocol: message names, command names, feature flags, and
//! the typed payloads of structured messages.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::buffer::Counter;

/// Names of the messages published on the admin namespace.
pub mod message {
    /// Supported-feature advertisement sent shortly after an admin connects.
    pub const CONFIG: &str = "config";
    /// Full snapshot of every connected socket (full mode only).
    pub const ALL_SOCKETS: &str = "all_sockets";
    /// A socket connected (or was re-announced by a keep-alive probe).
    pub const SOCKET_CONNECTED: &str = "socket_connected";
    /// A socket disconnected.
    pub const SOCKET_DISCONNECTED: &str = "socket_disconnected";
    /// A socket's transport changed (upgrade off the fallback transport).
    pub const SOCKET_UPDATED: &str = "socket_updated";
    /// An event arrived from a client.
    pub const EVENT_RECEIVED: &str = "event_received";
    /// An event was delivered to a client.
    pub const EVENT_SENT: &str = "event_sent";
    /// A socket joined a room.
    pub const ROOM_JOINED: &str = "room_joined";
    /// A socket left a room.
    pub const ROOM_LEFT: &str = "room_left";
    /// Periodic aggregated stats snapshot.
    pub const SERVER_STATS: &str = "server_stats";
}

/// Names of the commands accepted from admin clients.
pub mod command {
    /// Re-broadcast an event to a namespace, optionally room-filtered.
    pub const EMIT: &str = "emit";
    /// Add every matching socket to a room.
    pub const JOIN: &str = "join";
    /// Remove every matching socket from a room.
    pub const LEAVE: &str = "leave";
    /// Disconnect every matching socket.
    pub const DISCONNECT: &str = "_disconnect";
}

/// Reserved lifecycle event names on the dispatch path.
pub mod system_event {
    /// Socket connect.
    pub const CONNECT: &str = "connect";
    /// Socket disconnect.
    pub const DISCONNECT: &str = "disconnect";
}

/// Capabilities advertised to the dashboard in the `config` message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Feature {
    /// Aggregated counters are published (always on).
    AggregatedEvents,
    /// The `emit` command is available.
    Emit,
    /// The `join` command is available.
    Join,
    /// The `leave` command is available.
    Leave,
    /// The `disconnect` command is available.
    Disconnect,
    /// Multi-target join.
    Mjoin,
    /// Multi-target leave.
    Mleave,
    /// Multi-target disconnect.
    Mdisconnect,
    /// Per-event notifications are published (full mode).
    AllEvents,
}

/// Payload of the `config` message.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigMessage {
    /// Features the dashboard may rely on for this session.
    pub supported_features: Vec<Feature>,
}

/// Per-namespace entry in `server_stats`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamespaceCount {
    /// Namespace name.
    pub name: String,
    /// Sockets currently connected to the namespace.
    pub sockets_count: usize,
}

/// Payload of the periodic `server_stats` message.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerStats {
    /// Configured server identifier.
    pub server_id: String,
    /// Host name of the instrumented process.
    pub hostname: String,
    /// Process id.
    pub pid: u32,
    /// Seconds since the stats publisher started.
    pub uptime: f64,
    /// Transport-level client connections.
    pub clients_count: usize,
    /// Clients still on the fallback transport.
    pub polling_clients_count: usize,
    /// Counters flushed from the aggregation buffer.
    pub aggregated_events: HashMap<Counter, u64>,
    /// Per-namespace connection counts, sorted by name.
    pub namespaces: Vec<NamespaceCount>,
}
