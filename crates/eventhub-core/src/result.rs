//! Convenience result type alias for EventHub.

use crate::error::AppError;

/// A specialized `Result` type for EventHub operations.
///
/// Defined as a convenience so that every crate does not need to write
/// `Result<T, AppError>` explicitly.
pub type AppResult<T> = Result<T, AppError>;
