//! Discrete event queue.
//!
//! Room membership changes are never published immediately; they are
//! queued here in occurrence order and replayed by the stats publisher
//! right after each `server_stats` flush. The control interceptor is the
//! only producer and the stats publisher the only consumer; a whole-queue
//! swap keeps the drain atomic with respect to concurrent pushes.

use std::collections::VecDeque;
use std::sync::Mutex;

use serde_json::Value;

/// One queued admin notification.
#[derive(Debug, Clone, PartialEq)]
pub struct QueuedEvent {
    /// Admin message name (`room_joined` or `room_left`).
    pub event: &'static str,
    /// Message payload.
    pub payload: Value,
}

/// FIFO of discrete admin notifications awaiting the next stats flush.
#[derive(Debug, Default)]
pub struct DiscreteQueue {
    inner: Mutex<VecDeque<QueuedEvent>>,
}

impl DiscreteQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event at the tail.
    pub fn push(&self, event: &'static str, payload: Value) {
        let mut queue = self.inner.lock().expect("queue lock poisoned");
        queue.push_back(QueuedEvent { event, payload });
    }

    /// Remove and return every queued event in FIFO order.
    pub fn drain(&self) -> Vec<QueuedEvent> {
        let mut queue = self.inner.lock().expect("queue lock poisoned");
        std::mem::take(&mut *queue).into()
    }

    /// Number of queued events.
    pub fn len(&self) -> usize {
        self.inner.lock().expect("queue lock poisoned").len()
    }

    /// Whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
