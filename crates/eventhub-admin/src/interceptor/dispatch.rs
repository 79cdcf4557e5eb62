//! Lifecycle interceptor: decorator over the server's dispatch entry point.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use eventhub_core::traits::EventDispatcher;
use eventhub_core::types::DispatchEvent;
use eventhub_core::AppResult;

use crate::instrument::Instrumentation;
use crate::payload::system_event;

/// Wraps the application dispatcher to observe socket lifecycle and
/// inbound events.
///
/// Admin-namespace events terminate in the gatekeeper and command
/// handlers; they are never forwarded to the application dispatcher. For
/// every other namespace the admin notification is published before the
/// event is forwarded, so admin visibility reflects intent-to-dispatch
/// even when the handler later fails, and the inner result or error is
/// returned unchanged.
#[derive(Debug)]
pub struct InstrumentedDispatcher {
    inner: Arc<dyn EventDispatcher>,
    admin: Arc<Instrumentation>,
}

impl InstrumentedDispatcher {
    /// Wrap an application dispatcher.
    pub fn new(inner: Arc<dyn EventDispatcher>, admin: Arc<Instrumentation>) -> Self {
        Self { inner, admin }
    }
}

#[async_trait]
impl EventDispatcher for InstrumentedDispatcher {
    async fn dispatch(&self, event: DispatchEvent) -> AppResult<Value> {
        if event.namespace == self.admin.namespace() {
            return Arc::clone(&self.admin).handle_admin_event(event).await;
        }

        if self.admin.observe_all() {
            match event.event.as_str() {
                system_event::CONNECT => {
                    self.admin
                        .observe_connect(&event.namespace, &event.sid)
                        .await;
                }
                system_event::DISCONNECT => {
                    let reason = event
                        .args
                        .first()
                        .and_then(Value::as_str)
                        .unwrap_or("unknown");
                    self.admin
                        .observe_disconnect(&event.namespace, &event.sid, reason)
                        .await;
                }
                name => {
                    self.admin
                        .observe_event(&event.namespace, &event.sid, name, &event.args)
                        .await;
                }
            }
        }

        self.inner.dispatch(event).await
    }
}
