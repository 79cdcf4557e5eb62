//! Newtype wrappers around `String` for the identifiers handed out by the
//! wrapped event server.
//!
//! Socket and transport identifiers are opaque tokens minted by the server;
//! this layer never inspects them. Distinct types prevent accidentally
//! passing a `TransportId` where a `SocketId` is expected.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Macro to define a newtype ID wrapper around an opaque `String` token.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Create an identifier from any string-like token.
            pub fn new(token: impl Into<String>) -> Self {
                Self(token.into())
            }

            /// Return the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the identifier, returning the inner token.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(token: String) -> Self {
                Self(token)
            }
        }

        impl From<&str> for $name {
            fn from(token: &str) -> Self {
                Self(token.to_string())
            }
        }
    };
}

define_id! {
    /// Identifier of a logical connection within a namespace.
    SocketId
}

define_id! {
    /// Identifier of the underlying transport-level connection.
    ///
    /// One transport connection can carry sockets in several namespaces.
    TransportId
}
