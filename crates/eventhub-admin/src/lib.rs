//! # eventhub-admin
//!
//! Admin dashboard instrumentation for EventHub. Provides:
//!
//! - Decorator interceptors for the server's dispatch, room membership,
//!   broadcast, and byte-transport seams
//! - Aggregated traffic counters flushed on a fixed interval
//! - Discrete lifecycle and room notifications on a dedicated admin
//!   namespace
//! - A gated authentication handshake for admin clients
//! - Observe-only and full-control operating modes
//!
//! Interception is transparent: regular traffic keeps its semantics,
//! errors, and payloads; the layer only observes.

pub mod auth;
pub mod buffer;
pub mod instrument;
pub mod interceptor;
pub mod payload;
pub mod queue;
pub mod snapshot;
pub mod stats;

pub use auth::{AdminAuth, AuthCheck};
pub use buffer::{Counter, EventBuffer};
pub use instrument::Instrumentation;
pub use interceptor::{
    InstrumentedControl, InstrumentedDispatcher, InstrumentedPolling, InstrumentedSocket,
    InstrumentedTransportHandler,
};
pub use snapshot::SocketSnapshot;
