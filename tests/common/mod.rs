use std::sync::Arc;

use dmake::coord::{CoordinationStore, MemoryStore};
use dmake::errors::Result;
use dmake::exec::{self, CommandRunner};
use dmake::master::{self, DispatchMode};
use dmake::queue::{MemoryQueue, TaskQueue};
use dmake::rules;

/// In-process build harness: an in-memory store and queue plus a pool of
/// worker loops, so the full master/worker protocol runs without a broker.
pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub queue: Arc<MemoryQueue>,
    workers: Vec<tokio::task::JoinHandle<()>>,
}

impl Harness {
    pub fn new(runner: Arc<dyn CommandRunner>, workers: usize) -> Self {
        let store = Arc::new(MemoryStore::new());
        let queue = Arc::new(MemoryQueue::new());

        let handles = (0..workers)
            .map(|_| {
                let store: Arc<dyn CoordinationStore> = store.clone();
                let queue: Arc<dyn TaskQueue> = queue.clone();
                let runner = runner.clone();
                tokio::spawn(async move {
                    let _ = exec::run_worker(store, queue, runner, 4).await;
                })
            })
            .collect();

        Self {
            store,
            queue,
            workers: handles,
        }
    }

    /// Parse, validate and synchronously build `target` from `text`.
    pub async fn build(&self, text: &str, target: &str) -> Result<()> {
        let mut graph = rules::parse(text)?;
        rules::validate(&graph)?;
        master::run(
            self.store.as_ref(),
            self.queue.as_ref(),
            &mut graph,
            target,
            DispatchMode::Sync,
        )
        .await
    }
}

impl Drop for Harness {
    fn drop(&mut self) {
        for worker in &self.workers {
            worker.abort();
        }
    }
}
