// src/rules/task.rs

//! Task and task-graph model.
//!
//! A [`Task`] is one node per unique target name; the [`TaskGraph`] is a map
//! keyed by target name, so identity is the key and tasks refer to each other
//! by name rather than by shared references. A synthetic `[ROOT]` task is
//! always present: its dependency list holds the default (first-declared)
//! target, and it is excluded from lookups, DOT output and execution.

use std::collections::HashMap;

use crate::errors::{DmakeError, Result};

/// Name of the synthetic root task. Never a legal user target.
pub const ROOT_TARGET: &str = "[ROOT]";

/// One node in the task graph.
#[derive(Debug, Clone, Default)]
pub struct Task {
    pub target: String,
    /// Declared dependency targets, in declaration order. Duplicates within
    /// one list are preserved as declared.
    pub dependencies: Vec<String>,
    /// Shell command producing the target. `;`-separated sub-commands are
    /// kept verbatim as one string; splitting happens at execution time.
    pub command: Option<String>,
    /// Back-references to the tasks that depend on this one. Empty until the
    /// dependency tree builder runs.
    pub children: Vec<String>,
}

impl Task {
    fn new(target: &str) -> Self {
        Self {
            target: target.to_string(),
            ..Self::default()
        }
    }

    /// A task with no command and no dependencies represents a pre-existing
    /// input file and is never executed.
    pub fn is_file_dependency(&self) -> bool {
        self.dependencies.is_empty() && self.command.is_none()
    }
}

/// Task graph keyed by target name.
#[derive(Debug, Clone)]
pub struct TaskGraph {
    tasks: HashMap<String, Task>,
}

impl TaskGraph {
    /// Create an empty graph containing only the `[ROOT]` sentinel.
    pub fn new() -> Self {
        let mut tasks = HashMap::new();
        tasks.insert(ROOT_TARGET.to_string(), Task::new(ROOT_TARGET));
        Self { tasks }
    }

    /// Return the task for `target`, creating it on first reference. This is
    /// the single resolution path for both declared targets and dependency
    /// tokens, which is what makes forward references legal.
    pub fn get_or_create(&mut self, target: &str) -> &mut Task {
        self.tasks
            .entry(target.to_string())
            .or_insert_with(|| Task::new(target))
    }

    pub fn get(&self, target: &str) -> Option<&Task> {
        self.tasks.get(target)
    }

    pub fn get_mut(&mut self, target: &str) -> Option<&mut Task> {
        self.tasks.get_mut(target)
    }

    /// All tasks, including the root sentinel and file dependencies.
    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.tasks.values()
    }

    /// The default target: the first one declared in the rule file.
    pub fn default_target(&self) -> Option<&str> {
        self.tasks
            .get(ROOT_TARGET)
            .and_then(|root| root.dependencies.first())
            .map(|s| s.as_str())
    }

    /// Resolve a requested target name to a task.
    ///
    /// The empty string resolves to the default target. Unknown names (and
    /// the root sentinel itself) fail with [`DmakeError::TaskNotFound`].
    pub fn lookup(&self, target: &str) -> Result<&Task> {
        let name = if target.is_empty() {
            self.default_target()
                .ok_or_else(|| DmakeError::Parse("no rules found".to_string()))?
        } else {
            target
        };

        if name == ROOT_TARGET {
            return Err(DmakeError::TaskNotFound(name.to_string()));
        }

        self.tasks
            .get(name)
            .ok_or_else(|| DmakeError::TaskNotFound(name.to_string()))
    }
}

impl Default for TaskGraph {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_dependency_has_no_command_and_no_deps() {
        let mut graph = TaskGraph::new();
        graph.get_or_create("input.txt");
        assert!(graph.get("input.txt").unwrap().is_file_dependency());

        let task = graph.get_or_create("out");
        task.command = Some("touch out".to_string());
        assert!(!graph.get("out").unwrap().is_file_dependency());
    }

    #[test]
    fn get_or_create_returns_the_same_task() {
        let mut graph = TaskGraph::new();
        graph.get_or_create("a").command = Some("echo a".to_string());
        let again = graph.get_or_create("a");
        assert_eq!(again.command.as_deref(), Some("echo a"));
    }

    #[test]
    fn lookup_of_empty_name_fails_on_empty_graph() {
        let graph = TaskGraph::new();
        assert!(matches!(graph.lookup(""), Err(DmakeError::Parse(_))));
    }

    #[test]
    fn root_sentinel_is_not_addressable() {
        let graph = TaskGraph::new();
        assert!(matches!(
            graph.lookup(ROOT_TARGET),
            Err(DmakeError::TaskNotFound(_))
        ));
    }
}
