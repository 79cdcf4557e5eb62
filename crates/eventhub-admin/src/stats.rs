//! Periodic `server_stats` publisher.
//!
//! One long-lived background task per instrumentation instance. Each tick
//! flushes the aggregation buffer into a `server_stats` message, then
//! replays the discrete event queue in FIFO order. The interval sleep is
//! interruptible by the stop token, and once `shutdown` has joined the
//! task no further publication can occur.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use eventhub_core::config::ServerIdentity;
use eventhub_core::traits::ServerControl;
use eventhub_core::types::Skip;

use crate::buffer::EventBuffer;
use crate::payload::{message, NamespaceCount, ServerStats};
use crate::queue::DiscreteQueue;

/// Periodic stats publication task.
#[derive(Debug)]
pub struct StatsPublisher {
    server: Arc<dyn ServerControl>,
    buffer: Arc<EventBuffer>,
    queue: Arc<DiscreteQueue>,
    identity: ServerIdentity,
    admin_namespace: String,
    interval: Duration,
}

impl StatsPublisher {
    /// Assemble a publisher; it does nothing until spawned.
    pub fn new(
        server: Arc<dyn ServerControl>,
        buffer: Arc<EventBuffer>,
        queue: Arc<DiscreteQueue>,
        identity: ServerIdentity,
        admin_namespace: String,
        interval: Duration,
    ) -> Self {
        Self {
            server,
            buffer,
            queue,
            identity,
            admin_namespace,
            interval,
        }
    }

    /// Spawn the periodic loop; it runs until `cancel` is triggered.
    pub fn spawn(self, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(self.run(cancel))
    }

    async fn run(self, cancel: CancellationToken) {
        let started = Instant::now();
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.interval) => {
                    self.tick(started).await;
                }
            }
        }
        debug!("stats publisher loop ended");
    }

    /// Publish one `server_stats` snapshot, then drain the discrete queue.
    async fn tick(&self, started: Instant) {
        let mut namespaces = self.server.namespaces();
        namespaces.sort();

        let stats = ServerStats {
            server_id: self.identity.effective_server_id().to_string(),
            hostname: self.identity.hostname.clone(),
            pid: self.identity.pid,
            uptime: started.elapsed().as_secs_f64(),
            clients_count: self.server.client_count(),
            polling_clients_count: self.server.polling_client_count(),
            aggregated_events: self.buffer.get_and_clear(),
            namespaces: namespaces
                .iter()
                .map(|namespace| NamespaceCount {
                    name: namespace.clone(),
                    sockets_count: self.server.participants(namespace, None).len(),
                })
                .collect(),
        };

        self.publish(
            message::SERVER_STATS,
            serde_json::to_value(&stats).unwrap_or_default(),
        )
        .await;

        for queued in self.queue.drain() {
            self.publish(queued.event, queued.payload).await;
        }
    }

    async fn publish(&self, event: &str, data: Value) {
        if let Err(e) = self
            .server
            .emit(&self.admin_namespace, event, data, None, &Skip::None)
            .await
        {
            warn!(event, error = %e, "stats publication failed");
        }
    }
}
