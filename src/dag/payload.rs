// src/dag/payload.rs

//! Wire form of a task.
//!
//! Workers never share the in-process graph; each queue delivery carries a
//! self-contained [`TaskPayload`] holding the task itself plus the payloads
//! of its children, which in turn embed theirs, up to the root. That upward
//! closure is what lets any worker re-submit the next layer of the DAG
//! without access to the original rule file.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::errors::{DmakeError, Result};
use crate::rules::task::TaskGraph;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskPayload {
    pub target: String,
    pub command: Option<String>,
    /// Number of executable dependencies (duplicates counted), i.e. the
    /// number of arrivals required before this task runs.
    pub dep_count: usize,
    /// Payloads of the tasks that depend on this one.
    pub children: Vec<TaskPayload>,
}

impl TaskPayload {
    /// Build the payload for `target` from a graph that has already been
    /// through the dependency tree builder (pruned dependency lists,
    /// populated `children`).
    pub fn from_graph(graph: &TaskGraph, target: &str) -> Result<Self> {
        let mut cache = HashMap::new();
        Self::build(graph, target, &mut cache)
    }

    fn build(
        graph: &TaskGraph,
        target: &str,
        cache: &mut HashMap<String, TaskPayload>,
    ) -> Result<Self> {
        if let Some(done) = cache.get(target) {
            return Ok(done.clone());
        }

        let task = graph
            .get(target)
            .ok_or_else(|| DmakeError::TaskNotFound(target.to_string()))?;

        let mut children = Vec::with_capacity(task.children.len());
        for child in &task.children {
            children.push(Self::build(graph, child, cache)?);
        }

        let payload = TaskPayload {
            target: task.target.clone(),
            command: task.command.clone(),
            dep_count: task.dependencies.len(),
            children,
        };
        cache.insert(target.to_string(), payload.clone());
        Ok(payload)
    }
}
