//! Aggregation buffer for transport traffic counters.
//!
//! Counters accumulate between stats flushes and are read-and-reset
//! atomically by the stats publisher. The whole table is swapped out under
//! one lock rather than locking per counter, so no increment racing a flush
//! can be lost or read twice.

use std::collections::HashMap;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

/// The fixed vocabulary of aggregated counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Counter {
    /// Transport-level connections established.
    RawConnection,
    /// Transport-level connections closed.
    RawDisconnection,
    /// Packets received from clients.
    PacketsIn,
    /// Packets sent to clients.
    PacketsOut,
    /// Bytes received from clients.
    BytesIn,
    /// Bytes sent to clients.
    BytesOut,
}

impl Counter {
    /// Wire name of the counter, as reported in `server_stats`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RawConnection => "rawConnection",
            Self::RawDisconnection => "rawDisconnection",
            Self::PacketsIn => "packetsIn",
            Self::PacketsOut => "packetsOut",
            Self::BytesIn => "bytesIn",
            Self::BytesOut => "bytesOut",
        }
    }
}

/// Accumulates counter increments between stats flushes.
#[derive(Debug, Default)]
pub struct EventBuffer {
    counters: Mutex<HashMap<Counter, u64>>,
}

impl EventBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment a counter by one.
    pub fn push(&self, counter: Counter) {
        self.add(counter, 1);
    }

    /// Increment a counter by an arbitrary amount, creating it at zero if
    /// absent.
    pub fn add(&self, counter: Counter, amount: u64) {
        let mut counters = self.counters.lock().expect("counter lock poisoned");
        *counters.entry(counter).or_insert(0) += amount;
    }

    /// Return all accumulated counters and reset them to zero in one
    /// atomic step. Counters never pushed since the last clear are omitted.
    pub fn get_and_clear(&self) -> HashMap<Counter, u64> {
        let mut counters = self.counters.lock().expect("counter lock poisoned");
        std::mem::take(&mut *counters)
    }
}
