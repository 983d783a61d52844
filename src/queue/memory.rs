// src/queue/memory.rs

//! Single-process task queue used by tests. Deliveries poll a shared
//! `VecDeque`; acknowledgement is a no-op since nothing is redelivered.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use crate::coord::BoxFuture;
use crate::dag::TaskPayload;
use crate::errors::Result;
use crate::queue::{Delivery, TaskQueue};

const POLL: Duration = Duration::from_millis(2);

#[derive(Debug, Default)]
pub struct MemoryQueue {
    pending: Mutex<VecDeque<TaskPayload>>,
}

impl MemoryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of not-yet-delivered tasks (for test assertions).
    pub fn pending_len(&self) -> usize {
        self.pending.lock().unwrap().len()
    }
}

impl TaskQueue for MemoryQueue {
    fn submit(&self, tasks: Vec<TaskPayload>) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            let mut pending = self.pending.lock().unwrap();
            pending.extend(tasks);
            Ok(())
        })
    }

    fn next(&self) -> BoxFuture<'_, Result<Delivery>> {
        Box::pin(async move {
            loop {
                {
                    let mut pending = self.pending.lock().unwrap();
                    if let Some(task) = pending.pop_front() {
                        let raw = serde_json::to_string(&task)?;
                        return Ok(Delivery::new(task, raw));
                    }
                }
                tokio::time::sleep(POLL).await;
            }
        })
    }

    fn ack<'a>(&'a self, _delivery: &'a Delivery) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move { Ok(()) })
    }
}
