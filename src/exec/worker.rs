// src/exec/worker.rs

//! Per-delivery rendezvous protocol and the worker loop.
//!
//! A task is delivered once per completing dependency, so deliveries are not
//! idempotent no-ops: each one must coordinate through the store to decide
//! whether it is the final arrival. The per-target lock serializes the
//! init-if-absent/decrement sequence for one target across all workers; it is
//! released before any command runs, which is safe because only one delivery
//! ever observes the counter reach zero.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};

use crate::coord::{CoordinationStore, keys, with_lock};
use crate::dag::TaskPayload;
use crate::errors::Result;
use crate::exec::rendezvous::{self, Arrival};
use crate::exec::{BuildSignal, CommandRunner};
use crate::queue::{Delivery, TaskQueue};
use crate::report;

/// What one queue delivery amounted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// An early dependency arrival; the task is still waiting.
    Waiting,
    /// This delivery was the final arrival and executed the task.
    Executed,
}

/// Handle one delivery of `task`.
///
/// Steps, per the rendezvous protocol: lock the target, initialize the
/// arrival counter on first contact (a task with zero dependencies needs
/// exactly one arrival, its own), decrement, unlock. If the counter did not
/// reach zero this was an early arrival. Otherwise run the sub-commands in
/// order, re-submit the children as a new group, stamp the end time, and
/// decrement the global remaining counter, publishing the completion signal
/// if it reached zero.
pub async fn process_delivery(
    store: &dyn CoordinationStore,
    queue: &dyn TaskQueue,
    runner: &dyn CommandRunner,
    task: &TaskPayload,
) -> Result<DeliveryOutcome> {
    let lock_key = keys::target_lock(&task.target);
    let counter_key = keys::arrival_counter(&task.target);

    let remaining = with_lock(store, &lock_key, || async {
        store
            .init_counter(&counter_key, task.dep_count.max(1) as i64)
            .await?;
        store.decrement(&counter_key).await
    })
    .await?;

    match rendezvous::classify(remaining) {
        Arrival::Waiting => {
            debug!(task = %task.target, remaining, "early arrival");
            return Ok(DeliveryOutcome::Waiting);
        }
        Arrival::Armed => {}
    }

    if let Some(command) = &task.command {
        for sub in rendezvous::sub_commands(command) {
            runner.run(&task.target, sub).await?;
        }
    }
    info!(task = %task.target, "done");

    if !task.children.is_empty() {
        queue.submit(task.children.clone()).await?;
    }

    store
        .set_value(keys::END_TIME, &report::now_timestamp())
        .await?;
    let left = store.decrement(keys::REMAINING_TASKS).await?;
    if left == 0 {
        store
            .push(keys::BUILD_DONE, &BuildSignal::Success.to_json()?)
            .await?;
    }

    Ok(DeliveryOutcome::Executed)
}

/// Worker loop: pull deliveries and process each in its own task, at most
/// `concurrency` at a time. Runs until the process is stopped.
pub async fn run_worker(
    store: Arc<dyn CoordinationStore>,
    queue: Arc<dyn TaskQueue>,
    runner: Arc<dyn CommandRunner>,
    concurrency: usize,
) -> Result<()> {
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    info!(concurrency, "worker started");

    loop {
        let permit = semaphore
            .clone()
            .acquire_owned()
            .await
            .expect("worker semaphore is never closed");
        let delivery = queue.next().await?;

        let store = store.clone();
        let queue = queue.clone();
        let runner = runner.clone();
        tokio::spawn(async move {
            handle_delivery(store, queue, runner, delivery).await;
            drop(permit);
        });
    }
}

/// Process one delivery, reporting failures through the completion list
/// before acknowledging. A failed command never decrements the global
/// remaining counter; independent subtrees keep running.
async fn handle_delivery(
    store: Arc<dyn CoordinationStore>,
    queue: Arc<dyn TaskQueue>,
    runner: Arc<dyn CommandRunner>,
    delivery: Delivery,
) {
    match process_delivery(store.as_ref(), queue.as_ref(), runner.as_ref(), &delivery.task).await {
        Ok(outcome) => {
            debug!(task = %delivery.task.target, ?outcome, "delivery processed");
        }
        Err(err) => {
            error!(task = %delivery.task.target, error = %err, "task execution failed");
            let signal = BuildSignal::Failed {
                target: delivery.task.target.clone(),
                detail: err.to_string(),
            };
            match signal.to_json() {
                Ok(json) => {
                    if let Err(push_err) = store.push(keys::BUILD_DONE, &json).await {
                        error!(error = %push_err, "failed to publish failure signal");
                    }
                }
                Err(json_err) => error!(error = %json_err, "failed to encode failure signal"),
            }
        }
    }

    if let Err(err) = queue.ack(&delivery).await {
        warn!(task = %delivery.task.target, error = %err, "failed to ack delivery");
    }
}
