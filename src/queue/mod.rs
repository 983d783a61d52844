// src/queue/mod.rs

//! The task-queue port.
//!
//! Units of work ([`TaskPayload`]s) travel between the master and the workers
//! through an external queue with at-least-once delivery. The protocol only
//! needs three operations: submit a group of tasks (no ordering among them),
//! take the next delivery, and acknowledge it once processed.
//!
//! - [`redis`] is the production implementation (a Redis list with a
//!   processing side-list for reliable dequeue).
//! - [`memory`] is a single-process implementation used by tests.

use crate::coord::BoxFuture;
use crate::dag::TaskPayload;
use crate::errors::Result;

pub mod memory;
pub mod redis;

pub use self::memory::MemoryQueue;
pub use self::redis::RedisQueue;

/// One delivery taken from the queue. `raw` is the serialized form the
/// implementation needs back for acknowledgement.
#[derive(Debug, Clone)]
pub struct Delivery {
    pub task: TaskPayload,
    pub(crate) raw: String,
}

impl Delivery {
    pub fn new(task: TaskPayload, raw: String) -> Self {
        Self { task, raw }
    }
}

/// Abstraction over the distributed task queue.
pub trait TaskQueue: Send + Sync {
    /// Submit a group of tasks for parallel execution. No ordering is implied
    /// among the members of one group.
    fn submit(&self, tasks: Vec<TaskPayload>) -> BoxFuture<'_, Result<()>>;

    /// Block until a task is available and take it.
    fn next(&self) -> BoxFuture<'_, Result<Delivery>>;

    /// Acknowledge a processed delivery. Unacknowledged deliveries may be
    /// redelivered by the infrastructure.
    fn ack<'a>(&'a self, delivery: &'a Delivery) -> BoxFuture<'a, Result<()>>;
}
