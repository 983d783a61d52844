// src/queue/redis.rs

//! Redis-list task queue.
//!
//! Submissions LPUSH serialized payloads onto the main list; workers dequeue
//! with BRPOPLPUSH into a processing list so a crash between dequeue and
//! acknowledgement leaves the payload recoverable, and acknowledge with LREM
//! on the processing list.

use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use tracing::debug;

use crate::coord::BoxFuture;
use crate::dag::TaskPayload;
use crate::errors::Result;
use crate::queue::{Delivery, TaskQueue};

#[derive(Clone)]
pub struct RedisQueue {
    conn: ConnectionManager,
    queue_key: String,
    processing_key: String,
}

impl RedisQueue {
    pub async fn connect(url: &str, queue: &str) -> Result<Self> {
        let client = redis::Client::open(url)?;
        let conn = client.get_connection_manager().await?;
        debug!(url = %url, queue = %queue, "connected to task queue");
        Ok(Self {
            conn,
            queue_key: queue.to_string(),
            processing_key: format!("{queue}:processing"),
        })
    }
}

impl TaskQueue for RedisQueue {
    fn submit(&self, tasks: Vec<TaskPayload>) -> BoxFuture<'_, Result<()>> {
        let mut conn = self.conn.clone();
        Box::pin(async move {
            for task in &tasks {
                let raw = serde_json::to_string(task)?;
                let _: () = conn.lpush(&self.queue_key, raw).await?;
            }
            debug!(count = tasks.len(), "submitted task group");
            Ok(())
        })
    }

    fn next(&self) -> BoxFuture<'_, Result<Delivery>> {
        let mut conn = self.conn.clone();
        Box::pin(async move {
            let raw: String = redis::cmd("BRPOPLPUSH")
                .arg(&self.queue_key)
                .arg(&self.processing_key)
                .arg(0)
                .query_async(&mut conn)
                .await?;
            let task: TaskPayload = serde_json::from_str(&raw)?;
            Ok(Delivery::new(task, raw))
        })
    }

    fn ack<'a>(&'a self, delivery: &'a Delivery) -> BoxFuture<'a, Result<()>> {
        let mut conn = self.conn.clone();
        Box::pin(async move {
            let _: i64 = conn.lrem(&self.processing_key, 1, &delivery.raw).await?;
            Ok(())
        })
    }
}
