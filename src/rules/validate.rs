// src/rules/validate.rs

//! Pre-execution graph validation.
//!
//! The cycle check is bounded: for each task it inspects the task's own
//! dependency list and the lists of its direct dependencies, so it catches
//! direct self-dependencies and 2-cycles (A -> B -> A) but NOT deeper cycles
//! such as A -> B -> C -> A. This is a documented limitation of the design,
//! kept as-is rather than silently upgraded to a full DFS.

use crate::errors::{DmakeError, Result};
use crate::rules::task::{ROOT_TARGET, TaskGraph};

/// Check every task for a direct or 2-hop circular dependency.
///
/// On detection, fails with [`DmakeError::Cycle`] naming the offending
/// target. Duplicate declarations are already rejected by the parser.
pub fn validate(graph: &TaskGraph) -> Result<()> {
    for task in graph.iter() {
        if task.target == ROOT_TARGET {
            continue;
        }

        if task.dependencies.iter().any(|dep| *dep == task.target) {
            return Err(DmakeError::Cycle(task.target.clone()));
        }

        for dep in &task.dependencies {
            if let Some(dep_task) = graph.get(dep) {
                if dep_task.dependencies.iter().any(|d| *d == task.target) {
                    return Err(DmakeError::Cycle(task.target.clone()));
                }
            }
        }
    }

    Ok(())
}
