// src/master.rs

//! The master role: turn a resolved target into dispatched work.
//!
//! The master never schedules anything beyond the initial leaf set; from
//! there the DAG advances worker-to-worker through the queue. Its only other
//! job is seeding the shared state a build needs (timestamps, the global
//! remaining-task counter) and, in sync mode, waiting on the completion
//! signal.

use anyhow::anyhow;
use tracing::info;

use crate::coord::{CoordinationStore, keys};
use crate::dag::{self, TaskPayload};
use crate::errors::{DmakeError, Result};
use crate::exec::BuildSignal;
use crate::queue::TaskQueue;
use crate::report;
use crate::rules::task::TaskGraph;

/// Whether `run` blocks until the build completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchMode {
    Sync,
    Async,
}

/// Dispatch the build for `target` (empty string: the default target).
///
/// Fails with [`DmakeError::TaskNotFound`] when the target is unknown and
/// with [`DmakeError::NothingToBuild`] when it is a pure file dependency.
/// In sync mode, a failure signal from any worker surfaces as an error here.
pub async fn run(
    store: &dyn CoordinationStore,
    queue: &dyn TaskQueue,
    graph: &mut TaskGraph,
    target: &str,
    mode: DispatchMode,
) -> Result<()> {
    let root = graph.lookup(target)?.target.clone();
    let tree = dag::tree::build(graph, &root)?;

    // Shared state from any previous run is garbage now.
    store.reset().await?;

    let now = report::now_timestamp();
    store.set_value(keys::START_TIME, &now).await?;
    store.set_value(keys::END_TIME, &now).await?;
    store
        .set_value(keys::REMAINING_TASKS, &tree.node_count.to_string())
        .await?;

    let mut leaves = Vec::with_capacity(tree.leaves.len());
    for leaf in &tree.leaves {
        leaves.push(TaskPayload::from_graph(graph, leaf)?);
    }

    info!(
        root = %root,
        leaves = leaves.len(),
        node_count = tree.node_count,
        "dispatching build"
    );
    queue.submit(leaves).await?;

    match mode {
        DispatchMode::Async => Ok(()),
        DispatchMode::Sync => {
            let raw = store.blocking_pop(keys::BUILD_DONE).await?;
            match BuildSignal::from_json(&raw)? {
                BuildSignal::Success => {
                    info!(root = %root, "build finished");
                    Ok(())
                }
                BuildSignal::Failed { target, detail } => Err(DmakeError::Other(anyhow!(
                    "build failed at target '{target}': {detail}"
                ))),
            }
        }
    }
}
