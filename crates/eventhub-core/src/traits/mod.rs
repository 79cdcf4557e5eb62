//! Extension-point traits defined in `eventhub-core`, implemented by the
//! wrapped event server and decorated by `eventhub-admin`.

pub mod server;

pub use server::{
    EventDispatcher, PollingTransport, ServerControl, SocketTransport, TransportHandler,
};
