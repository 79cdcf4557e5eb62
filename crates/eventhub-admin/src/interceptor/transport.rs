//! Transport traffic interceptor: decorators over the byte-transport seams.
//!
//! Counter increments never touch the transmitted bytes; every decorator
//! delegates first and records afterwards. Traffic on the admin namespace
//! is counted like any other traffic.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use eventhub_core::traits::server::PollingRequest;
use eventhub_core::traits::{PollingTransport, SocketTransport, TransportHandler};
use eventhub_core::types::{HandshakeData, TransportId};
use eventhub_core::AppResult;

use crate::buffer::{Counter, EventBuffer};
use crate::instrument::Instrumentation;

/// Wraps the server's transport lifecycle callbacks to count raw
/// connections and to start the stats publisher on the first connect.
#[derive(Debug)]
pub struct InstrumentedTransportHandler {
    inner: Arc<dyn TransportHandler>,
    admin: Arc<Instrumentation>,
}

impl InstrumentedTransportHandler {
    /// Wrap the server's transport handler.
    pub fn new(inner: Arc<dyn TransportHandler>, admin: Arc<Instrumentation>) -> Self {
        Self { inner, admin }
    }
}

#[async_trait]
impl TransportHandler for InstrumentedTransportHandler {
    async fn transport_connected(
        &self,
        transport: &TransportId,
        handshake: &HandshakeData,
    ) -> AppResult<()> {
        self.admin.on_transport_connect();
        self.inner.transport_connected(transport, handshake).await
    }

    async fn transport_disconnected(
        &self,
        transport: &TransportId,
        reason: &str,
    ) -> AppResult<()> {
        self.admin.on_transport_disconnect();
        self.inner.transport_disconnected(transport, reason).await
    }
}

/// Wraps the long-polling request/response path to count packets and bytes.
#[derive(Debug)]
pub struct InstrumentedPolling {
    inner: Arc<dyn PollingTransport>,
    buffer: Arc<EventBuffer>,
}

impl InstrumentedPolling {
    /// Wrap a polling transport.
    pub fn new(inner: Arc<dyn PollingTransport>, buffer: Arc<EventBuffer>) -> Self {
        Self { inner, buffer }
    }
}

#[async_trait]
impl PollingTransport for InstrumentedPolling {
    async fn render_response(&self, packets: Vec<Value>) -> AppResult<Vec<u8>> {
        let body = self.inner.render_response(packets).await?;
        self.buffer.push(Counter::PacketsOut);
        self.buffer.add(Counter::BytesOut, body.len() as u64);
        Ok(body)
    }

    async fn ingest_request(&self, request: PollingRequest) -> AppResult<()> {
        let declared = request.content_length.unwrap_or(0);
        self.inner.ingest_request(request).await?;
        self.buffer.push(Counter::PacketsIn);
        self.buffer.add(Counter::BytesIn, declared);
        Ok(())
    }
}

/// Wraps one persistent-socket connection to count frames and bytes, and
/// to re-announce its sockets on keep-alive probes.
#[derive(Debug)]
pub struct InstrumentedSocket {
    transport: TransportId,
    inner: Arc<dyn SocketTransport>,
    admin: Arc<Instrumentation>,
}

impl InstrumentedSocket {
    /// Wrap the persistent socket carrying `transport`.
    pub fn new(
        transport: TransportId,
        inner: Arc<dyn SocketTransport>,
        admin: Arc<Instrumentation>,
    ) -> Self {
        Self {
            transport,
            inner,
            admin,
        }
    }
}

#[async_trait]
impl SocketTransport for InstrumentedSocket {
    async fn send(&self, frame: Vec<u8>) -> AppResult<()> {
        let len = frame.len() as u64;
        self.inner.send(frame).await?;
        let buffer = self.admin.buffer();
        buffer.push(Counter::PacketsOut);
        buffer.add(Counter::BytesOut, len);
        Ok(())
    }

    async fn receive(&self) -> AppResult<Option<Vec<u8>>> {
        let frame = self.inner.receive().await?;
        let buffer = self.admin.buffer();
        buffer.push(Counter::PacketsIn);
        // An empty receive counts as zero bytes.
        buffer.add(
            Counter::BytesIn,
            frame.as_ref().map(|f| f.len() as u64).unwrap_or(0),
        );
        Ok(frame)
    }

    async fn send_ping(&self) -> AppResult<()> {
        self.admin.on_keepalive(&self.transport).await;
        self.inner.send_ping().await
    }
}
