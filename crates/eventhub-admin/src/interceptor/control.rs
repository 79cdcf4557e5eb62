//! Control-action interceptor: decorator over the server control surface.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use eventhub_core::traits::ServerControl;
use eventhub_core::types::{Skip, SocketId, TransportId, TransportInfo};
use eventhub_core::AppResult;

use crate::instrument::Instrumentation;

/// Wraps room membership changes and broadcasts to report them to the
/// admin channel.
///
/// Join and leave delegate first and queue their notification only when
/// the mutation succeeded; broadcasts publish one `event_sent` per
/// non-excluded recipient. Queries delegate untouched.
#[derive(Debug)]
pub struct InstrumentedControl {
    inner: Arc<dyn ServerControl>,
    admin: Arc<Instrumentation>,
}

impl InstrumentedControl {
    /// Wrap the raw server control surface.
    pub fn new(inner: Arc<dyn ServerControl>, admin: Arc<Instrumentation>) -> Self {
        Self { inner, admin }
    }
}

#[async_trait]
impl ServerControl for InstrumentedControl {
    async fn emit(
        &self,
        namespace: &str,
        event: &str,
        data: Value,
        room: Option<&str>,
        skip: &Skip,
    ) -> AppResult<()> {
        self.inner
            .emit(namespace, event, data.clone(), room, skip)
            .await?;
        self.admin
            .report_event_sent(namespace, event, &data, room, skip)
            .await;
        Ok(())
    }

    async fn enter_room(&self, namespace: &str, sid: &SocketId, room: &str) -> AppResult<()> {
        self.inner.enter_room(namespace, sid, room).await?;
        self.admin.record_room_joined(namespace, room, sid);
        Ok(())
    }

    async fn leave_room(&self, namespace: &str, sid: &SocketId, room: &str) -> AppResult<()> {
        self.inner.leave_room(namespace, sid, room).await?;
        self.admin.record_room_left(namespace, room, sid);
        Ok(())
    }

    async fn disconnect(&self, namespace: &str, sid: &SocketId) -> AppResult<()> {
        self.inner.disconnect(namespace, sid).await
    }

    fn namespaces(&self) -> Vec<String> {
        self.inner.namespaces()
    }

    fn participants(&self, namespace: &str, room: Option<&str>) -> Vec<(SocketId, TransportId)> {
        self.inner.participants(namespace, room)
    }

    fn rooms_of(&self, namespace: &str, sid: &SocketId) -> Vec<String> {
        self.inner.rooms_of(namespace, sid)
    }

    fn transport_of(&self, namespace: &str, sid: &SocketId) -> Option<TransportId> {
        self.inner.transport_of(namespace, sid)
    }

    fn socket_of(&self, namespace: &str, transport: &TransportId) -> Option<SocketId> {
        self.inner.socket_of(namespace, transport)
    }

    fn transport_info(&self, transport: &TransportId) -> Option<TransportInfo> {
        self.inner.transport_info(transport)
    }

    fn client_count(&self) -> usize {
        self.inner.client_count()
    }

    fn polling_client_count(&self) -> usize {
        self.inner.polling_client_count()
    }
}
