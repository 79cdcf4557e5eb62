//! Lifecycle interceptor: connect/disconnect/event observation on regular
//! namespaces, publish-before-forward ordering, and error passthrough.

mod common;

use serde_json::json;

use eventhub_admin::{AdminAuth, Instrumentation, InstrumentedDispatcher};
use eventhub_core::config::{AdminConfig, OperatingMode};
use eventhub_core::error::ErrorKind;
use eventhub_core::traits::EventDispatcher;
use eventhub_core::types::DispatchEvent;

use common::{MockDispatcher, MockServer};

fn instrumented(
    server: &std::sync::Arc<MockServer>,
    config: AdminConfig,
) -> std::sync::Arc<Instrumentation> {
    Instrumentation::new(
        server.clone(),
        Some(AdminAuth::AllowList(vec![json!("token")])),
        config,
    )
    .unwrap()
}

#[tokio::test]
async fn test_connect_publishes_snapshot_then_forwards() {
    let server = MockServer::new();
    server.add_transport("t1", false);
    server.add_socket("/chat", "s1", "t1");

    let admin = instrumented(&server, AdminConfig::default());
    let inner = MockDispatcher::new();
    let dispatcher = InstrumentedDispatcher::new(inner.clone(), admin);

    dispatcher
        .dispatch(DispatchEvent::new("/chat", "connect", "s1", vec![]))
        .await
        .unwrap();

    let connected = server.published_named("socket_connected");
    assert_eq!(connected.len(), 1);
    let payload = connected[0].data.as_array().unwrap();
    assert_eq!(payload[0]["id"], "s1");
    assert_eq!(payload[0]["clientId"], "t1");
    assert_eq!(payload[0]["transport"], "polling");
    // Timestamp side table was populated before the snapshot was built.
    assert_ne!(payload[0]["handshake"]["issued"], 0);
    assert!(payload[1].as_str().unwrap().contains('T'));

    // The original dispatch still happened.
    let seen = inner.seen();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].event, "connect");
    assert_eq!(seen[0].namespace, "/chat");
}

#[tokio::test]
async fn test_disconnect_publishes_reason_and_clears_timestamp() {
    let server = MockServer::new();
    server.add_transport("t1", false);
    server.add_socket("/chat", "s1", "t1");

    let admin = instrumented(&server, AdminConfig::default());
    let dispatcher = InstrumentedDispatcher::new(MockDispatcher::new(), admin.clone());

    dispatcher
        .dispatch(DispatchEvent::new("/chat", "connect", "s1", vec![]))
        .await
        .unwrap();
    dispatcher
        .dispatch(DispatchEvent::new(
            "/chat",
            "disconnect",
            "s1",
            vec![json!("client namespace disconnect")],
        ))
        .await
        .unwrap();

    let disconnected = server.published_named("socket_disconnected");
    assert_eq!(disconnected.len(), 1);
    assert_eq!(
        disconnected[0].data,
        json!([
            "/chat",
            "s1",
            "client namespace disconnect",
            disconnected[0].data[3]
        ])
    );

    // A later keep-alive snapshot sees an unknown issue time, not an error.
    admin.on_keepalive(&"t1".into()).await;
    let republished = server.published_named("socket_connected");
    assert_eq!(republished.len(), 2);
    assert_eq!(republished[1].data[0]["handshake"]["issued"], 0);
    assert_eq!(republished[1].data[0]["handshake"]["time"], "");
}

#[tokio::test]
async fn test_other_events_publish_event_received() {
    let server = MockServer::new();
    let admin = instrumented(&server, AdminConfig::default());
    let dispatcher = InstrumentedDispatcher::new(MockDispatcher::new(), admin);

    dispatcher
        .dispatch(DispatchEvent::new(
            "/chat",
            "message",
            "s1",
            vec![json!("hello"), json!(42)],
        ))
        .await
        .unwrap();

    let received = server.published_named("event_received");
    assert_eq!(received.len(), 1);
    let payload = received[0].data.as_array().unwrap();
    assert_eq!(payload[0], "/chat");
    assert_eq!(payload[1], "s1");
    assert_eq!(payload[2], json!(["message", "hello", 42]));
}

#[tokio::test]
async fn test_handler_error_propagates_after_publication() {
    let server = MockServer::new();
    let admin = instrumented(&server, AdminConfig::default());
    let dispatcher = InstrumentedDispatcher::new(MockDispatcher::failing(), admin);

    let err = dispatcher
        .dispatch(DispatchEvent::new("/chat", "message", "s1", vec![json!(1)]))
        .await
        .unwrap_err();

    // Delegation failure passes through verbatim.
    assert_eq!(err.kind, ErrorKind::Internal);
    assert_eq!(err.message, "handler exploded");
    // The notification published before forwarding stands.
    assert_eq!(server.published_named("event_received").len(), 1);
}

#[tokio::test]
async fn test_production_mode_observes_nothing() {
    let server = MockServer::new();
    server.add_transport("t1", false);
    server.add_socket("/chat", "s1", "t1");

    let config = AdminConfig {
        mode: OperatingMode::Production,
        ..AdminConfig::default()
    };
    let admin = instrumented(&server, config);
    let inner = MockDispatcher::new();
    let dispatcher = InstrumentedDispatcher::new(inner.clone(), admin);

    dispatcher
        .dispatch(DispatchEvent::new("/chat", "connect", "s1", vec![]))
        .await
        .unwrap();
    dispatcher
        .dispatch(DispatchEvent::new("/chat", "message", "s1", vec![]))
        .await
        .unwrap();

    assert!(server.published().is_empty());
    // Forwarding is unaffected.
    assert_eq!(inner.seen().len(), 2);
}

#[tokio::test]
async fn test_admin_namespace_events_not_forwarded_to_app() {
    let server = MockServer::new();
    let admin = instrumented(&server, AdminConfig::default());
    let inner = MockDispatcher::new();
    let dispatcher = InstrumentedDispatcher::new(inner.clone(), admin.clone());

    dispatcher
        .dispatch(DispatchEvent::new("/admin", "connect", "a1", vec![json!("token")]))
        .await
        .unwrap();

    assert!(inner.seen().is_empty());
    admin.shutdown().await.unwrap();
}
