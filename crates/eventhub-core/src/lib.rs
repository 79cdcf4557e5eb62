//! # eventhub-core
//!
//! Core crate for the EventHub admin instrumentation layer. Contains the
//! collaborator traits that describe the underlying event server's
//! extension seams, configuration schemas, typed identifiers, and the
//! unified error system.
//!
//! This crate has **no** internal dependencies on other EventHub crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
