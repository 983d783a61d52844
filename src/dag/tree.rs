// src/dag/tree.rs

//! Dependency tree construction.
//!
//! Given a root task, walk the graph with an explicit stack (no recursion, so
//! deep graphs cannot overflow), prune pure file dependencies out of every
//! dependency list, record the tasks whose pruned list is empty as leaves,
//! and wire `children` back-links so completion can fan outward from the
//! leaves toward the root.

use std::collections::HashSet;

use tracing::debug;

use crate::errors::{DmakeError, Result};
use crate::rules::task::TaskGraph;

/// Result of building the dependency tree for one root target.
#[derive(Debug)]
pub struct DepTree {
    /// Tasks with no remaining executable dependencies: the initial dispatch
    /// set.
    pub leaves: HashSet<String>,
    /// Number of distinct executable tasks in the tree, used to seed the
    /// global remaining-task counter.
    pub node_count: usize,
}

/// Build the dependency tree rooted at `root`, mutating the graph in place
/// (dependency lists lose their file-dependency entries; `children` lists are
/// populated).
///
/// Diamond dependencies revisit shared tasks; the visited set makes each task
/// process its dependency list once, so every child back-link appears exactly
/// once per distinct parent (and once per duplicated dependency token, which
/// keeps the arrival arithmetic balanced).
pub fn build(graph: &mut TaskGraph, root: &str) -> Result<DepTree> {
    let root_task = graph
        .get(root)
        .ok_or_else(|| DmakeError::TaskNotFound(root.to_string()))?;
    if root_task.is_file_dependency() {
        return Err(DmakeError::NothingToBuild(root.to_string()));
    }

    let mut leaves = HashSet::new();
    let mut visited: HashSet<String> = HashSet::new();
    let mut stack = vec![root.to_string()];

    while let Some(name) = stack.pop() {
        if !visited.insert(name.clone()) {
            continue;
        }

        let pruned: Vec<String> = {
            let task = graph.get(&name).expect("stack holds known targets");
            task.dependencies
                .iter()
                .filter(|dep| {
                    graph
                        .get(dep)
                        .is_some_and(|task| !task.is_file_dependency())
                })
                .cloned()
                .collect()
        };

        if pruned.is_empty() {
            leaves.insert(name.clone());
        } else {
            for dep in &pruned {
                graph
                    .get_mut(dep)
                    .expect("stack holds known targets")
                    .children
                    .push(name.clone());
                stack.push(dep.clone());
            }
        }

        graph
            .get_mut(&name)
            .expect("stack holds known targets")
            .dependencies = pruned;
    }

    debug!(
        root = %root,
        leaves = leaves.len(),
        node_count = visited.len(),
        "dependency tree built"
    );

    Ok(DepTree {
        leaves,
        node_count: visited.len(),
    })
}
