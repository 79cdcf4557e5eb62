//! Central instrumentation facade and admin channel gatekeeper.
//!
//! Ties the buffer, queue, snapshot builder, and stats publisher together,
//! authenticates admin connections, executes admin-issued commands, and
//! owns the single stats-publisher task per instance.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde_json::{json, Value};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use eventhub_core::config::{AdminConfig, OperatingMode};
use eventhub_core::traits::ServerControl;
use eventhub_core::types::{DispatchEvent, Skip, SocketId, TransportId};
use eventhub_core::{AppError, AppResult};

use crate::auth::AdminAuth;
use crate::buffer::{Counter, EventBuffer};
use crate::payload::{command, message, system_event, ConfigMessage, Feature};
use crate::queue::DiscreteQueue;
use crate::snapshot::{build_snapshot, SocketSnapshot};
use crate::stats::StatsPublisher;

/// Delay between a successful admin handshake and the `config` message.
const CONFIG_DELAY: Duration = Duration::from_millis(100);

/// Cancellation handle of the running stats publisher.
#[derive(Debug)]
struct StatsHandle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

/// The instrumentation layer wrapped around one event server instance.
///
/// Constructed once and shared (`Arc`) with the interceptor decorators
/// that the server composes into its extension seams.
pub struct Instrumentation {
    /// Raw (undecorated) control surface of the wrapped server.
    server: Arc<dyn ServerControl>,
    /// Admin authentication rule.
    auth: AdminAuth,
    /// Instrumentation settings.
    config: AdminConfig,
    /// Aggregated traffic counters.
    buffer: Arc<EventBuffer>,
    /// Discrete events awaiting the next stats flush.
    queue: Arc<DiscreteQueue>,
    /// Connect-timestamp side table, created on connect dispatch and
    /// removed on disconnect dispatch.
    timestamps: DashMap<SocketId, DateTime<Utc>>,
    /// At most one stats publisher runs per instance.
    stats: Mutex<Option<StatsHandle>>,
}

impl std::fmt::Debug for Instrumentation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Instrumentation")
            .field("namespace", &self.config.namespace)
            .field("mode", &self.config.mode)
            .field("read_only", &self.config.read_only)
            .finish()
    }
}

impl Instrumentation {
    /// Create the instrumentation layer around a server.
    ///
    /// Fails with a configuration error when no authentication rule is
    /// supplied; the admin channel is never left open.
    pub fn new(
        server: Arc<dyn ServerControl>,
        auth: Option<AdminAuth>,
        config: AdminConfig,
    ) -> AppResult<Arc<Self>> {
        let auth = auth
            .ok_or_else(|| AppError::configuration("admin authentication must be configured"))?;

        info!(
            namespace = %config.namespace,
            mode = ?config.mode,
            read_only = config.read_only,
            "admin instrumentation initialized"
        );

        Ok(Arc::new(Self {
            server,
            auth,
            config,
            buffer: Arc::new(EventBuffer::new()),
            queue: Arc::new(DiscreteQueue::new()),
            timestamps: DashMap::new(),
            stats: Mutex::new(None),
        }))
    }

    /// The admin namespace name.
    pub fn namespace(&self) -> &str {
        &self.config.namespace
    }

    /// The aggregation buffer shared with the transport decorators.
    pub fn buffer(&self) -> &Arc<EventBuffer> {
        &self.buffer
    }

    /// Whether per-event observation is active (full-observation mode).
    pub fn observe_all(&self) -> bool {
        self.config.mode == OperatingMode::Development
    }

    /// Whether admin-issued control commands are accepted.
    pub fn commands_enabled(&self) -> bool {
        self.observe_all() && !self.config.read_only
    }

    // ----- admin channel gatekeeper -------------------------------------

    /// Handle an event dispatched on the admin namespace.
    ///
    /// `connect` runs the authentication handshake; command events are
    /// executed when enabled; everything else is ignored.
    pub async fn handle_admin_event(self: Arc<Self>, event: DispatchEvent) -> AppResult<Value> {
        match event.event.as_str() {
            system_event::CONNECT => {
                let credentials = event.args.into_iter().next().unwrap_or(Value::Null);
                self.on_admin_connect(&event.sid, credentials).await
            }
            name if self.commands_enabled() => match name {
                command::EMIT => self.admin_emit(&event.args).await,
                command::JOIN => self.admin_join(&event.args).await,
                command::LEAVE => self.admin_leave(&event.args).await,
                command::DISCONNECT => self.admin_disconnect(&event.args).await,
                _ => Ok(Value::Null),
            },
            _ => Ok(Value::Null),
        }
    }

    /// Authenticate an admin connection attempt and, on success, schedule
    /// the `config` follow-up and ensure the stats publisher is running.
    async fn on_admin_connect(self: Arc<Self>, sid: &SocketId, credentials: Value) -> AppResult<Value> {
        if !self.auth.authenticate(&credentials).await {
            warn!(sid = %sid, "admin authentication failed");
            return Err(AppError::authentication("authentication failed"));
        }

        info!(sid = %sid, "admin client connected");
        self.ensure_stats_task();
        Self::schedule_config(self, sid.clone());
        Ok(Value::Null)
    }

    /// Publish the `config` message (and, in full mode, `all_sockets`)
    /// after a short delay, off the handshake path.
    fn schedule_config(this: Arc<Self>, sid: SocketId) {
        tokio::spawn(async move {
            tokio::time::sleep(CONFIG_DELAY).await;

            let config_message = ConfigMessage {
                supported_features: this.supported_features(),
            };
            this.publish_to(
                &sid,
                message::CONFIG,
                serde_json::to_value(config_message).unwrap_or_default(),
            )
            .await;

            if this.observe_all() {
                let sockets = this.all_sockets();
                this.publish_to(
                    &sid,
                    message::ALL_SOCKETS,
                    serde_json::to_value(sockets).unwrap_or_default(),
                )
                .await;
            }
        });
    }

    fn supported_features(&self) -> Vec<Feature> {
        features_for(self.config.mode, self.config.read_only)
    }

    /// Snapshot every connected socket across all namespaces.
    fn all_sockets(&self) -> Vec<SocketSnapshot> {
        let mut sockets = Vec::new();
        for namespace in self.server.namespaces() {
            for (sid, transport) in self.server.participants(&namespace, None) {
                if let Some(snapshot) = self.snapshot_for(&namespace, &sid, Some(transport)) {
                    sockets.push(snapshot);
                }
            }
        }
        sockets
    }

    // ----- stats publisher lifecycle ------------------------------------

    /// Start the stats publisher if it is not already running.
    pub fn ensure_stats_task(&self) {
        let mut stats = self.stats.lock().expect("stats lock poisoned");
        if stats.is_some() {
            return;
        }

        let cancel = CancellationToken::new();
        let publisher = StatsPublisher::new(
            self.server.clone(),
            self.buffer.clone(),
            self.queue.clone(),
            self.config.identity.clone(),
            self.config.namespace.clone(),
            Duration::from_secs(self.config.server_stats_interval_seconds),
        );
        let task = publisher.spawn(cancel.clone());

        info!(
            interval_seconds = self.config.server_stats_interval_seconds,
            "stats publisher started"
        );
        *stats = Some(StatsHandle { cancel, task });
    }

    /// Stop the stats publisher and wait for it to terminate.
    ///
    /// After this returns, no further `server_stats` message can be
    /// published. Idempotent when no task is running.
    pub async fn shutdown(&self) -> AppResult<()> {
        let handle = self.stats.lock().expect("stats lock poisoned").take();
        if let Some(StatsHandle { cancel, task }) = handle {
            cancel.cancel();
            task.await
                .map_err(|e| AppError::internal(format!("stats task join failed: {e}")))?;
            info!("stats publisher stopped");
        }
        Ok(())
    }

    // ----- lifecycle observation ----------------------------------------

    /// A socket connected on a regular namespace.
    pub(crate) async fn observe_connect(&self, namespace: &str, sid: &SocketId) {
        let now = Utc::now();
        self.timestamps.insert(sid.clone(), now);

        match self.snapshot_for(namespace, sid, None) {
            Some(snapshot) => {
                self.publish(
                    message::SOCKET_CONNECTED,
                    json!([snapshot, now.to_rfc3339()]),
                )
                .await;
            }
            None => {
                // Transport already gone: stale lookup, not an error.
                debug!(sid = %sid, namespace, "no transport state for connecting socket");
            }
        }
    }

    /// A socket disconnected from a regular namespace.
    pub(crate) async fn observe_disconnect(&self, namespace: &str, sid: &SocketId, reason: &str) {
        let now = Utc::now();
        self.timestamps.remove(sid);
        self.publish(
            message::SOCKET_DISCONNECTED,
            json!([namespace, sid, reason, now.to_rfc3339()]),
        )
        .await;
    }

    /// An application event arrived on a regular namespace.
    pub(crate) async fn observe_event(
        &self,
        namespace: &str,
        sid: &SocketId,
        event: &str,
        args: &[Value],
    ) {
        let mut event_data = vec![json!(event)];
        event_data.extend(args.iter().cloned());
        self.publish(
            message::EVENT_RECEIVED,
            json!([namespace, sid, event_data, Utc::now().to_rfc3339()]),
        )
        .await;
    }

    // ----- control-action reporting -------------------------------------

    /// Queue a `room_joined` notification for the next stats flush.
    pub(crate) fn record_room_joined(&self, namespace: &str, room: &str, sid: &SocketId) {
        if !self.observe_all() || room.is_empty() {
            return;
        }
        self.queue.push(
            message::ROOM_JOINED,
            json!([namespace, room, sid, Utc::now().to_rfc3339()]),
        );
    }

    /// Queue a `room_left` notification for the next stats flush.
    pub(crate) fn record_room_left(&self, namespace: &str, room: &str, sid: &SocketId) {
        if !self.observe_all() || room.is_empty() {
            return;
        }
        self.queue.push(
            message::ROOM_LEFT,
            json!([namespace, room, sid, Utc::now().to_rfc3339()]),
        );
    }

    /// Publish one `event_sent` notification per non-excluded recipient of
    /// a broadcast. Never reports broadcasts on the admin namespace.
    pub(crate) async fn report_event_sent(
        &self,
        namespace: &str,
        event: &str,
        data: &Value,
        room: Option<&str>,
        skip: &Skip,
    ) {
        if !self.observe_all() || namespace == self.config.namespace {
            return;
        }

        let mut event_data = vec![json!(event)];
        match data {
            Value::Array(items) => event_data.extend(items.iter().cloned()),
            other => event_data.push(other.clone()),
        }

        let timestamp = Utc::now().to_rfc3339();
        for (sid, _) in self.server.participants(namespace, room) {
            if skip.contains(&sid) {
                continue;
            }
            self.publish(
                message::EVENT_SENT,
                json!([namespace, sid, event_data, timestamp]),
            )
            .await;
        }
    }

    // ----- transport observation ----------------------------------------

    /// A transport-level connection was established.
    pub(crate) fn on_transport_connect(&self) {
        self.ensure_stats_task();
        self.buffer.push(Counter::RawConnection);
    }

    /// A transport-level connection went away.
    pub(crate) fn on_transport_disconnect(&self) {
        self.buffer.push(Counter::RawDisconnection);
    }

    /// Re-announce a transport's sockets on each keep-alive probe so the
    /// dashboard can pick up transport changes without a reconnect.
    pub async fn on_keepalive(&self, transport: &TransportId) {
        if !self.observe_all() {
            return;
        }

        let now = Utc::now();
        for namespace in self.server.namespaces() {
            let Some(sid) = self.server.socket_of(&namespace, transport) else {
                continue;
            };
            if let Some(snapshot) = self.snapshot_for(&namespace, &sid, Some(transport.clone())) {
                self.publish(
                    message::SOCKET_CONNECTED,
                    json!([snapshot, now.to_rfc3339()]),
                )
                .await;
            }
        }
    }

    /// A transport finished upgrading off the fallback transport.
    pub async fn notify_upgrade(&self, transport: &TransportId) {
        if !self.observe_all() {
            return;
        }

        for namespace in self.server.namespaces() {
            let Some(sid) = self.server.socket_of(&namespace, transport) else {
                continue;
            };
            self.publish(
                message::SOCKET_UPDATED,
                json!({
                    "id": sid,
                    "nsp": namespace,
                    "transport": "websocket",
                }),
            )
            .await;
        }
    }

    // ----- admin-issued commands ----------------------------------------

    async fn admin_emit(&self, args: &[Value]) -> AppResult<Value> {
        let namespace = arg_str(args, 0, "namespace")?;
        let room_filter = arg_opt_str(args, 1);
        let event = arg_str(args, 2, "event")?;
        let data = Value::Array(args.get(3..).unwrap_or_default().to_vec());

        self.server
            .emit(namespace, event, data.clone(), room_filter, &Skip::None)
            .await?;
        self.report_event_sent(namespace, event, &data, room_filter, &Skip::None)
            .await;
        Ok(Value::Null)
    }

    async fn admin_join(&self, args: &[Value]) -> AppResult<Value> {
        let namespace = arg_str(args, 0, "namespace")?;
        let room = arg_str(args, 1, "room")?;
        let room_filter = arg_opt_str(args, 2);

        for (sid, _) in self.server.participants(namespace, room_filter) {
            self.server.enter_room(namespace, &sid, room).await?;
            self.record_room_joined(namespace, room, &sid);
        }
        Ok(Value::Null)
    }

    async fn admin_leave(&self, args: &[Value]) -> AppResult<Value> {
        let namespace = arg_str(args, 0, "namespace")?;
        let room = arg_str(args, 1, "room")?;
        let room_filter = arg_opt_str(args, 2);

        for (sid, _) in self.server.participants(namespace, room_filter) {
            self.server.leave_room(namespace, &sid, room).await?;
            self.record_room_left(namespace, room, &sid);
        }
        Ok(Value::Null)
    }

    async fn admin_disconnect(&self, args: &[Value]) -> AppResult<Value> {
        let namespace = arg_str(args, 0, "namespace")?;
        let room_filter = arg_opt_str(args, 2);

        for (sid, _) in self.server.participants(namespace, room_filter) {
            self.server.disconnect(namespace, &sid).await?;
        }
        Ok(Value::Null)
    }

    // ----- publication helpers ------------------------------------------

    /// Snapshot one socket; `None` when its transport state is already
    /// gone (treated as a non-fatal miss everywhere).
    fn snapshot_for(
        &self,
        namespace: &str,
        sid: &SocketId,
        transport: Option<TransportId>,
    ) -> Option<SocketSnapshot> {
        let transport = transport.or_else(|| self.server.transport_of(namespace, sid))?;
        let info = self.server.transport_info(&transport)?;
        let rooms = self.server.rooms_of(namespace, sid);
        let issued = self.timestamps.get(sid).map(|entry| *entry.value());
        Some(build_snapshot(
            sid.clone(),
            namespace,
            transport,
            &info,
            rooms,
            issued,
        ))
    }

    /// Publish a message to every admin subscriber.
    ///
    /// Monitoring must stay transparent to regular traffic, so a failed
    /// admin publication is logged and dropped rather than propagated into
    /// the intercepted call.
    async fn publish(&self, event: &str, data: Value) {
        if let Err(e) = self
            .server
            .emit(&self.config.namespace, event, data, None, &Skip::None)
            .await
        {
            warn!(event, error = %e, "admin publication failed");
        }
    }

    /// Publish a message to a single admin socket.
    async fn publish_to(&self, sid: &SocketId, event: &str, data: Value) {
        if let Err(e) = self
            .server
            .emit(
                &self.config.namespace,
                event,
                data,
                Some(sid.as_str()),
                &Skip::None,
            )
            .await
        {
            warn!(event, sid = %sid, error = %e, "admin publication failed");
        }
    }
}

/// Feature flags advertised for a mode / read-only combination.
fn features_for(mode: OperatingMode, read_only: bool) -> Vec<Feature> {
    let mut features = vec![Feature::AggregatedEvents];
    if !read_only {
        features.extend([
            Feature::Emit,
            Feature::Join,
            Feature::Leave,
            Feature::Disconnect,
            Feature::Mjoin,
            Feature::Mleave,
            Feature::Mdisconnect,
        ]);
    }
    if mode == OperatingMode::Development {
        features.push(Feature::AllEvents);
    }
    features
}

fn arg_str<'a>(args: &'a [Value], index: usize, name: &str) -> AppResult<&'a str> {
    args.get(index)
        .and_then(Value::as_str)
        .ok_or_else(|| AppError::validation(format!("missing or invalid `{name}` argument")))
}

fn arg_opt_str(args: &[Value], index: usize) -> Option<&str> {
    args.get(index).and_then(Value::as_str)
}
