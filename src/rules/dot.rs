// src/rules/dot.rs

//! DOT rendering of the task graph, for external graph viewers.
//!
//! One node per non-root task, labeled with its target name; one edge per
//! dependency-to-dependent arc. Purely diagnostic output (`dmake graph`).

use petgraph::dot::{Config, Dot};
use petgraph::graphmap::DiGraphMap;

use crate::rules::task::{ROOT_TARGET, TaskGraph};

/// Render the graph as a DOT digraph. The `[ROOT]` sentinel is excluded.
pub fn to_dot(graph: &TaskGraph) -> String {
    let mut dot_graph: DiGraphMap<&str, ()> = DiGraphMap::new();

    // Sorted for stable output across runs.
    let mut targets: Vec<&str> = graph
        .iter()
        .filter(|task| task.target != ROOT_TARGET)
        .map(|task| task.target.as_str())
        .collect();
    targets.sort_unstable();

    for target in &targets {
        dot_graph.add_node(*target);
    }

    for target in &targets {
        let task = graph.get(target).expect("target listed from this graph");
        for dep in &task.dependencies {
            // Edge direction: dependency -> dependent.
            dot_graph.add_edge(dep.as_str(), task.target.as_str(), ());
        }
    }

    format!(
        "{:?}",
        Dot::with_attr_getters(
            &dot_graph,
            &[Config::NodeNoLabel, Config::EdgeNoLabel],
            &|_, _| String::new(),
            &|_, (name, _)| format!("label = \"{name}\""),
        )
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::parser::parse;

    #[test]
    fn labels_every_task_and_excludes_the_root() {
        let graph = parse("all: lib part.txt\n\techo all\nlib:\n\techo lib\n").unwrap();
        let dot = to_dot(&graph);

        assert!(dot.contains("label = \"all\""));
        assert!(dot.contains("label = \"lib\""));
        assert!(dot.contains("label = \"part.txt\""));
        assert!(!dot.contains(ROOT_TARGET));
    }

    #[test]
    fn has_one_edge_per_dependency_arc() {
        let graph = parse("all: lib\n\techo all\nlib:\n\techo lib\n").unwrap();
        let dot = to_dot(&graph);
        assert_eq!(dot.matches("->").count(), 1);
    }
}
