//! Extension seams of the wrapped event server.
//!
//! The server is an external collaborator: it owns namespaces, rooms,
//! dispatch, and the byte transports. Each seam it exposes intentionally is
//! a trait here, so the instrumentation layer can be composed in as
//! decorating implementations of the same contract instead of patching
//! server internals at runtime.

use std::fmt;

use async_trait::async_trait;
use serde_json::Value;

use crate::result::AppResult;
use crate::types::dispatch::{DispatchEvent, Skip};
use crate::types::id::{SocketId, TransportId};
use crate::types::transport::{HandshakeData, TransportInfo};

/// Control surface of the wrapped event server.
///
/// Broadcast, room membership, registries, and identity mapping. Lookups
/// return `None`/empty for identities that have already disconnected; the
/// caller treats that as a non-fatal miss.
#[async_trait]
pub trait ServerControl: Send + Sync + fmt::Debug + 'static {
    /// Broadcast an event on a namespace, optionally restricted to a room,
    /// excluding the sockets in `skip`.
    async fn emit(
        &self,
        namespace: &str,
        event: &str,
        data: Value,
        room: Option<&str>,
        skip: &Skip,
    ) -> AppResult<()>;

    /// Add a socket to a room.
    async fn enter_room(&self, namespace: &str, sid: &SocketId, room: &str) -> AppResult<()>;

    /// Remove a socket from a room.
    async fn leave_room(&self, namespace: &str, sid: &SocketId, room: &str) -> AppResult<()>;

    /// Disconnect a socket from a namespace.
    async fn disconnect(&self, namespace: &str, sid: &SocketId) -> AppResult<()>;

    /// All namespaces currently known to the server.
    fn namespaces(&self) -> Vec<String>;

    /// Sockets participating in a namespace, optionally restricted to a
    /// room, paired with their transport identity.
    fn participants(&self, namespace: &str, room: Option<&str>) -> Vec<(SocketId, TransportId)>;

    /// Rooms a socket currently belongs to within a namespace.
    fn rooms_of(&self, namespace: &str, sid: &SocketId) -> Vec<String>;

    /// Transport identity carrying a socket, if still connected.
    fn transport_of(&self, namespace: &str, sid: &SocketId) -> Option<TransportId>;

    /// Socket a transport connection has opened in a namespace, if any.
    fn socket_of(&self, namespace: &str, transport: &TransportId) -> Option<SocketId>;

    /// Point-in-time transport state, if the transport is still connected.
    fn transport_info(&self, transport: &TransportId) -> Option<TransportInfo>;

    /// Total number of transport-level client connections.
    fn client_count(&self) -> usize;

    /// Number of clients still on the fallback (polling) transport.
    fn polling_client_count(&self) -> usize;
}

/// The server's generic event-dispatch entry point.
///
/// Every connect, disconnect, and application event flows through here.
/// Decorators must forward to the inner dispatcher and propagate its
/// result unchanged.
#[async_trait]
pub trait EventDispatcher: Send + Sync + fmt::Debug + 'static {
    /// Dispatch one event to its registered handler, returning the
    /// handler's result.
    async fn dispatch(&self, event: DispatchEvent) -> AppResult<Value>;
}

/// Transport-level connection lifecycle callbacks.
#[async_trait]
pub trait TransportHandler: Send + Sync + fmt::Debug + 'static {
    /// A transport-level connection was established.
    async fn transport_connected(
        &self,
        transport: &TransportId,
        handshake: &HandshakeData,
    ) -> AppResult<()>;

    /// A transport-level connection went away.
    async fn transport_disconnected(&self, transport: &TransportId, reason: &str)
        -> AppResult<()>;
}

/// An inbound long-polling request.
#[derive(Debug, Clone, Default)]
pub struct PollingRequest {
    /// Declared `Content-Length`, if any.
    pub content_length: Option<u64>,
    /// Raw request body.
    pub body: Vec<u8>,
}

/// The long-polling side of the byte transport.
#[async_trait]
pub trait PollingTransport: Send + Sync + fmt::Debug + 'static {
    /// Encode queued outbound packets into an HTTP response body.
    async fn render_response(&self, packets: Vec<Value>) -> AppResult<Vec<u8>>;

    /// Ingest an inbound HTTP request carrying encoded packets.
    async fn ingest_request(&self, request: PollingRequest) -> AppResult<()>;
}

/// The persistent-socket side of the byte transport, bound to one
/// transport-level connection.
#[async_trait]
pub trait SocketTransport: Send + Sync + fmt::Debug + 'static {
    /// Send one encoded frame to the peer.
    async fn send(&self, frame: Vec<u8>) -> AppResult<()>;

    /// Receive one encoded frame from the peer; `None` on an empty read.
    async fn receive(&self) -> AppResult<Option<Vec<u8>>>;

    /// Send a keep-alive probe to the peer.
    async fn send_ping(&self) -> AppResult<()>;
}
