//! Configuration schemas for the instrumentation layer.
//!
//! All configuration structs are plain serde targets; the embedding server
//! decides where they are loaded from.

pub mod admin;

pub use admin::{AdminConfig, OperatingMode, ServerIdentity};
