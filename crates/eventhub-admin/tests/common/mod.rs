//! Shared test doubles: an in-memory event server and transport mocks.
#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use eventhub_core::traits::server::PollingRequest;
use eventhub_core::traits::{
    EventDispatcher, PollingTransport, ServerControl, SocketTransport, TransportHandler,
};
use eventhub_core::types::{
    DispatchEvent, HandshakeData, Skip, SocketId, TransportId, TransportInfo,
};
use eventhub_core::{AppError, AppResult};

/// One recorded broadcast.
#[derive(Debug, Clone)]
pub struct Published {
    pub namespace: String,
    pub event: String,
    pub data: Value,
    pub room: Option<String>,
}

#[derive(Debug, Default)]
struct NamespaceState {
    sockets: Vec<(SocketId, TransportId)>,
    rooms: BTreeMap<String, Vec<SocketId>>,
}

#[derive(Debug, Default)]
struct MockState {
    namespaces: BTreeMap<String, NamespaceState>,
    transports: HashMap<TransportId, TransportInfo>,
}

/// In-memory stand-in for the wrapped event server. Records every emit
/// instead of delivering it.
#[derive(Debug, Default)]
pub struct MockServer {
    state: Mutex<MockState>,
    published: Mutex<Vec<Published>>,
}

impl MockServer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn add_transport(&self, transport: &str, upgraded: bool) {
        let mut state = self.state.lock().unwrap();
        state.transports.insert(
            TransportId::from(transport),
            TransportInfo {
                upgraded,
                handshake: HandshakeData {
                    address: "127.0.0.1".to_string(),
                    headers: HashMap::new(),
                    query: HashMap::new(),
                    secure: false,
                    url: "/hub/".to_string(),
                },
            },
        );
    }

    pub fn add_socket(&self, namespace: &str, sid: &str, transport: &str) {
        let mut state = self.state.lock().unwrap();
        state
            .namespaces
            .entry(namespace.to_string())
            .or_default()
            .sockets
            .push((SocketId::from(sid), TransportId::from(transport)));
    }

    pub fn remove_transport(&self, transport: &str) {
        let mut state = self.state.lock().unwrap();
        state.transports.remove(&TransportId::from(transport));
    }

    pub fn published(&self) -> Vec<Published> {
        self.published.lock().unwrap().clone()
    }

    pub fn published_named(&self, event: &str) -> Vec<Published> {
        self.published()
            .into_iter()
            .filter(|p| p.event == event)
            .collect()
    }

    pub fn room_members(&self, namespace: &str, room: &str) -> Vec<SocketId> {
        let state = self.state.lock().unwrap();
        state
            .namespaces
            .get(namespace)
            .and_then(|ns| ns.rooms.get(room))
            .cloned()
            .unwrap_or_default()
    }

    pub fn socket_count(&self, namespace: &str) -> usize {
        let state = self.state.lock().unwrap();
        state
            .namespaces
            .get(namespace)
            .map(|ns| ns.sockets.len())
            .unwrap_or(0)
    }
}

#[async_trait]
impl ServerControl for MockServer {
    async fn emit(
        &self,
        namespace: &str,
        event: &str,
        data: Value,
        room: Option<&str>,
        _skip: &Skip,
    ) -> AppResult<()> {
        self.published.lock().unwrap().push(Published {
            namespace: namespace.to_string(),
            event: event.to_string(),
            data,
            room: room.map(str::to_string),
        });
        Ok(())
    }

    async fn enter_room(&self, namespace: &str, sid: &SocketId, room: &str) -> AppResult<()> {
        let mut state = self.state.lock().unwrap();
        let members = state
            .namespaces
            .entry(namespace.to_string())
            .or_default()
            .rooms
            .entry(room.to_string())
            .or_default();
        if !members.contains(sid) {
            members.push(sid.clone());
        }
        Ok(())
    }

    async fn leave_room(&self, namespace: &str, sid: &SocketId, room: &str) -> AppResult<()> {
        let mut state = self.state.lock().unwrap();
        if let Some(ns) = state.namespaces.get_mut(namespace) {
            if let Some(members) = ns.rooms.get_mut(room) {
                members.retain(|member| member != sid);
            }
        }
        Ok(())
    }

    async fn disconnect(&self, namespace: &str, sid: &SocketId) -> AppResult<()> {
        let mut state = self.state.lock().unwrap();
        let Some(ns) = state.namespaces.get_mut(namespace) else {
            return Err(AppError::not_found(format!("namespace {namespace}")));
        };
        ns.sockets.retain(|(socket, _)| socket != sid);
        for members in ns.rooms.values_mut() {
            members.retain(|member| member != sid);
        }
        Ok(())
    }

    fn namespaces(&self) -> Vec<String> {
        self.state.lock().unwrap().namespaces.keys().cloned().collect()
    }

    fn participants(&self, namespace: &str, room: Option<&str>) -> Vec<(SocketId, TransportId)> {
        let state = self.state.lock().unwrap();
        let Some(ns) = state.namespaces.get(namespace) else {
            return Vec::new();
        };
        match room {
            None => ns.sockets.clone(),
            Some(room) => {
                let members = ns.rooms.get(room).cloned().unwrap_or_default();
                ns.sockets
                    .iter()
                    .filter(|(sid, _)| members.contains(sid))
                    .cloned()
                    .collect()
            }
        }
    }

    fn rooms_of(&self, namespace: &str, sid: &SocketId) -> Vec<String> {
        let state = self.state.lock().unwrap();
        state
            .namespaces
            .get(namespace)
            .map(|ns| {
                ns.rooms
                    .iter()
                    .filter(|(_, members)| members.contains(sid))
                    .map(|(room, _)| room.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn transport_of(&self, namespace: &str, sid: &SocketId) -> Option<TransportId> {
        let state = self.state.lock().unwrap();
        state.namespaces.get(namespace).and_then(|ns| {
            ns.sockets
                .iter()
                .find(|(socket, _)| socket == sid)
                .map(|(_, transport)| transport.clone())
        })
    }

    fn socket_of(&self, namespace: &str, transport: &TransportId) -> Option<SocketId> {
        let state = self.state.lock().unwrap();
        state.namespaces.get(namespace).and_then(|ns| {
            ns.sockets
                .iter()
                .find(|(_, t)| t == transport)
                .map(|(sid, _)| sid.clone())
        })
    }

    fn transport_info(&self, transport: &TransportId) -> Option<TransportInfo> {
        self.state.lock().unwrap().transports.get(transport).cloned()
    }

    fn client_count(&self) -> usize {
        self.state.lock().unwrap().transports.len()
    }

    fn polling_client_count(&self) -> usize {
        self.state
            .lock()
            .unwrap()
            .transports
            .values()
            .filter(|info| !info.upgraded)
            .count()
    }
}

/// Application dispatcher double: records forwarded events, optionally
/// failing every dispatch.
#[derive(Debug, Default)]
pub struct MockDispatcher {
    seen: Mutex<Vec<DispatchEvent>>,
    pub fail: bool,
}

impl MockDispatcher {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            seen: Mutex::new(Vec::new()),
            fail: true,
        })
    }

    pub fn seen(&self) -> Vec<DispatchEvent> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl EventDispatcher for MockDispatcher {
    async fn dispatch(&self, event: DispatchEvent) -> AppResult<Value> {
        self.seen.lock().unwrap().push(event);
        if self.fail {
            Err(AppError::internal("handler exploded"))
        } else {
            Ok(Value::String("handled".to_string()))
        }
    }
}

/// Polling transport double returning a fixed response body.
#[derive(Debug)]
pub struct FixedPolling {
    pub body: Vec<u8>,
    pub ingested: AtomicUsize,
}

impl FixedPolling {
    pub fn with_body_len(len: usize) -> Arc<Self> {
        Arc::new(Self {
            body: vec![b'x'; len],
            ingested: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl PollingTransport for FixedPolling {
    async fn render_response(&self, _packets: Vec<Value>) -> AppResult<Vec<u8>> {
        Ok(self.body.clone())
    }

    async fn ingest_request(&self, _request: PollingRequest) -> AppResult<()> {
        self.ingested.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Persistent-socket double with scripted inbound frames.
#[derive(Debug, Default)]
pub struct MockSocket {
    pub sent: Mutex<Vec<Vec<u8>>>,
    pub inbound: Mutex<VecDeque<Option<Vec<u8>>>>,
    pub pings: AtomicUsize,
}

impl MockSocket {
    pub fn new(inbound: Vec<Option<Vec<u8>>>) -> Arc<Self> {
        Arc::new(Self {
            sent: Mutex::new(Vec::new()),
            inbound: Mutex::new(inbound.into()),
            pings: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl SocketTransport for MockSocket {
    async fn send(&self, frame: Vec<u8>) -> AppResult<()> {
        self.sent.lock().unwrap().push(frame);
        Ok(())
    }

    async fn receive(&self) -> AppResult<Option<Vec<u8>>> {
        Ok(self.inbound.lock().unwrap().pop_front().flatten())
    }

    async fn send_ping(&self) -> AppResult<()> {
        self.pings.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Transport handler double counting lifecycle callbacks.
#[derive(Debug, Default)]
pub struct MockTransportHandler {
    pub connects: AtomicUsize,
    pub disconnects: AtomicUsize,
}

impl MockTransportHandler {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

#[async_trait]
impl TransportHandler for MockTransportHandler {
    async fn transport_connected(
        &self,
        _transport: &TransportId,
        _handshake: &HandshakeData,
    ) -> AppResult<()> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn transport_disconnected(
        &self,
        _transport: &TransportId,
        _reason: &str,
    ) -> AppResult<()> {
        self.disconnects.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Let spawned tasks (config follow-up, stats publisher) run.
pub async fn settle() {
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
}
