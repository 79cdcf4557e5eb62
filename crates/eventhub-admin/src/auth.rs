//! Admin channel authentication.
//!
//! The dashboard connection is gated by a mandatory authentication rule:
//! an exact-match credentials value, an allow-list, or a caller-supplied
//! predicate (sync or async). Failure is surfaced as an authentication
//! error before any admin session state exists.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

/// Asynchronous authentication predicate.
#[async_trait]
pub trait AuthCheck: Send + Sync + 'static {
    /// Whether the supplied credentials grant admin access.
    async fn check(&self, credentials: &Value) -> bool;
}

/// The authentication rule applied to admin connection attempts.
#[derive(Clone)]
pub enum AdminAuth {
    /// Exact match against a fixed credentials value.
    Credentials(Value),
    /// Membership test against a fixed allow-list.
    AllowList(Vec<Value>),
    /// Synchronous predicate over the supplied credentials.
    Check(Arc<dyn Fn(&Value) -> bool + Send + Sync>),
    /// Asynchronous predicate over the supplied credentials.
    CheckAsync(Arc<dyn AuthCheck>),
}

impl AdminAuth {
    /// Convenience constructor for a synchronous predicate.
    pub fn check(predicate: impl Fn(&Value) -> bool + Send + Sync + 'static) -> Self {
        Self::Check(Arc::new(predicate))
    }

    /// Evaluate the rule against the credentials supplied at connect time.
    pub async fn authenticate(&self, credentials: &Value) -> bool {
        match self {
            Self::Credentials(expected) => credentials == expected,
            Self::AllowList(allowed) => allowed.contains(credentials),
            Self::Check(predicate) => predicate(credentials),
            Self::CheckAsync(predicate) => predicate.check(credentials).await,
        }
    }
}

impl fmt::Debug for AdminAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Credentials(_) => f.write_str("AdminAuth::Credentials(..)"),
            Self::AllowList(allowed) => write!(f, "AdminAuth::AllowList({} entries)", allowed.len()),
            Self::Check(_) => f.write_str("AdminAuth::Check(..)"),
            Self::CheckAsync(_) => f.write_str("AdminAuth::CheckAsync(..)"),
        }
    }
}
