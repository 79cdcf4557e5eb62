//! Decorating implementations of the server's extension seams.
//!
//! Each interceptor implements the same trait as the component it wraps
//! and is composed in at server construction time. Interception is purely
//! observational: delegation results and errors pass through unchanged.

pub mod control;
pub mod dispatch;
pub mod transport;

pub use control::InstrumentedControl;
pub use dispatch::InstrumentedDispatcher;
pub use transport::{InstrumentedPolling, InstrumentedSocket, InstrumentedTransportHandler};
