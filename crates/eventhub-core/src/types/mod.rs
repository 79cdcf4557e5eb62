//! Shared type definitions: identifiers, dispatch events, transport metadata.

pub mod dispatch;
pub mod id;
pub mod transport;

pub use dispatch::{DispatchEvent, Skip};
pub use id::{SocketId, TransportId};
pub use transport::{HandshakeData, TransportInfo, TransportKind};
