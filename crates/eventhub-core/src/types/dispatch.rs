//! Event-dispatch payloads shared between the server and its interceptors.

use serde_json::Value;

use super::id::SocketId;

/// A single event handed to the server's dispatch entry point.
///
/// For `connect` events, `args` holds the client-supplied auth payload (if
/// any). For `disconnect` events, `args[0]` is the disconnect reason.
#[derive(Debug, Clone)]
pub struct DispatchEvent {
    /// Namespace the event belongs to.
    pub namespace: String,
    /// Event name (`connect`, `disconnect`, or application-defined).
    pub event: String,
    /// Socket the event originates from.
    pub sid: SocketId,
    /// Positional event arguments.
    pub args: Vec<Value>,
}

impl DispatchEvent {
    /// Build a dispatch event.
    pub fn new(
        namespace: impl Into<String>,
        event: impl Into<String>,
        sid: impl Into<SocketId>,
        args: Vec<Value>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            event: event.into(),
            sid: sid.into(),
            args,
        }
    }
}

/// Sockets excluded from a broadcast.
///
/// Callers may exclude nothing, a single socket, or a list; all three are
/// normalized behind one membership test.
#[derive(Debug, Clone, Default)]
pub enum Skip {
    /// No socket is excluded.
    #[default]
    None,
    /// A single socket is excluded.
    One(SocketId),
    /// Several sockets are excluded.
    Many(Vec<SocketId>),
}

impl Skip {
    /// Whether the given socket is excluded from the broadcast.
    pub fn contains(&self, sid: &SocketId) -> bool {
        match self {
            Self::None => false,
            Self::One(excluded) => excluded == sid,
            Self::Many(excluded) => excluded.contains(sid),
        }
    }

    /// Normalize to a list of excluded sockets.
    pub fn to_vec(&self) -> Vec<SocketId> {
        match self {
            Self::None => Vec::new(),
            Self::One(excluded) => vec![excluded.clone()],
            Self::Many(excluded) => excluded.clone(),
        }
    }
}

impl From<Option<SocketId>> for Skip {
    fn from(sid: Option<SocketId>) -> Self {
        match sid {
            Some(sid) => Self::One(sid),
            None => Self::None,
        }
    }
}

impl From<Vec<SocketId>> for Skip {
    fn from(sids: Vec<SocketId>) -> Self {
        Self::Many(sids)
    }
}
