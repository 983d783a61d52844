// src/rules/parser.rs

//! Rule-file parser.
//!
//! The accepted syntax is the minimal make form: non-blank, non-comment lines
//! alternate between a target declaration and an optional command line,
//!
//! ```text
//! <target>: <dep1> <dep2> ... <depN>
//! \t<command>
//! ```
//!
//! Comment lines start with `#`; blank lines are ignored anywhere. A target
//! with no following tab-indented line has no command (it is either a pure
//! dependency aggregator or, with no dependencies either, a file dependency).

use std::collections::HashSet;

use crate::errors::{DmakeError, Result};
use crate::rules::task::{ROOT_TARGET, TaskGraph};

/// Parse rule text into a [`TaskGraph`].
///
/// The first declared target becomes the dependency of the `[ROOT]` sentinel
/// and thereby the default target. Dependency tokens that are never declared
/// with a rule of their own stay as file-dependency tasks.
pub fn parse(text: &str) -> Result<TaskGraph> {
    let mut graph = TaskGraph::new();
    let mut declared: HashSet<String> = HashSet::new();

    let lines: Vec<&str> = text
        .lines()
        .filter(|line| !line.trim().is_empty() && !line.starts_with('#'))
        .collect();

    let mut index = 0;
    while index < lines.len() {
        let line = lines[index];

        if line.starts_with('\t') {
            return Err(DmakeError::Parse(format!(
                "command with no target on line '{}'",
                line.trim_start()
            )));
        }

        let (target_part, deps_part) = line.split_once(':').ok_or_else(|| {
            DmakeError::Parse(format!("missing ':' separator on line '{line}'"))
        })?;

        let target = target_part.trim();
        if target.is_empty() {
            return Err(DmakeError::Parse(format!(
                "no target specified on line '{line}'"
            )));
        }
        if !declared.insert(target.to_string()) {
            return Err(DmakeError::Parse(format!(
                "target '{target}' declared more than once"
            )));
        }

        graph.get_or_create(target);
        if declared.len() == 1 {
            // First declared target hangs off the synthetic root.
            graph
                .get_mut(ROOT_TARGET)
                .expect("root sentinel always present")
                .dependencies
                .push(target.to_string());
        }

        let deps: Vec<String> = deps_part
            .split_whitespace()
            .map(|dep| dep.to_string())
            .collect();
        for dep in &deps {
            graph.get_or_create(dep);
        }
        graph
            .get_mut(target)
            .expect("target was just created")
            .dependencies
            .extend(deps);

        index += 1;

        // The immediately following line, when tab-indented, is this target's
        // command. The remainder after the marker is kept verbatim.
        if index < lines.len() {
            if let Some(command) = lines[index].strip_prefix('\t') {
                graph
                    .get_mut(target)
                    .expect("target was just created")
                    .command = Some(command.to_string());
                index += 1;
            }
        }
    }

    if declared.is_empty() {
        return Err(DmakeError::Parse("no rules found".to_string()));
    }

    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_declared_dependencies_in_order() {
        let graph = parse("all: b c a\n\techo all\n").unwrap();
        let all = graph.lookup("").unwrap();
        assert_eq!(all.target, "all");
        assert_eq!(all.dependencies, vec!["b", "c", "a"]);
        assert_eq!(all.command.as_deref(), Some("echo all"));
    }

    #[test]
    fn first_declared_target_is_the_default() {
        let graph = parse("one:\n\techo 1\ntwo:\n\techo 2\n").unwrap();
        assert_eq!(graph.default_target(), Some("one"));
    }

    #[test]
    fn forward_references_resolve_to_the_same_task() {
        let text = "all: lib\n\techo all\nlib:\n\techo lib\n";
        let graph = parse(text).unwrap();
        let lib = graph.get("lib").unwrap();
        assert_eq!(lib.command.as_deref(), Some("echo lib"));
        assert!(!lib.is_file_dependency());
    }

    #[test]
    fn undeclared_dependency_becomes_a_file_dependency() {
        let graph = parse("all: input.txt\n\tcat input.txt\n").unwrap();
        let input = graph.get("input.txt").unwrap();
        assert!(input.is_file_dependency());
    }

    #[test]
    fn duplicate_target_declaration_is_rejected() {
        let text = "a:\n\techo 1\na:\n\techo 2\n";
        let err = parse(text).unwrap_err();
        assert!(matches!(err, DmakeError::Parse(msg) if msg.contains("declared more than once")));
    }

    #[test]
    fn orphan_command_is_rejected() {
        let err = parse("\techo nothing\n").unwrap_err();
        assert!(matches!(err, DmakeError::Parse(msg) if msg.contains("command with no target")));
    }

    #[test]
    fn missing_separator_is_rejected() {
        let err = parse("all deps here\n").unwrap_err();
        assert!(matches!(err, DmakeError::Parse(msg) if msg.contains("missing ':'")));
    }

    #[test]
    fn empty_target_name_is_rejected() {
        let err = parse(": dep\n\techo x\n").unwrap_err();
        assert!(matches!(err, DmakeError::Parse(msg) if msg.contains("no target specified")));
    }

    #[test]
    fn empty_rule_file_is_an_error() {
        let err = parse("").unwrap_err();
        assert!(matches!(err, DmakeError::Parse(msg) if msg == "no rules found"));

        let err = parse("# only a comment\n\n").unwrap_err();
        assert!(matches!(err, DmakeError::Parse(msg) if msg == "no rules found"));
    }

    #[test]
    fn comments_and_blank_lines_are_ignored_anywhere() {
        let text = "# header\n\nall: dep\n# between\n\tcat dep\n\ndep:\n\ttouch dep\n";
        let graph = parse(text).unwrap();
        assert_eq!(graph.lookup("all").unwrap().command.as_deref(), Some("cat dep"));
        assert_eq!(graph.lookup("dep").unwrap().command.as_deref(), Some("touch dep"));
    }

    #[test]
    fn semicolon_command_is_kept_as_one_string() {
        let graph = parse("all:\n\techo a; echo b; echo c\n").unwrap();
        assert_eq!(
            graph.lookup("all").unwrap().command.as_deref(),
            Some("echo a; echo b; echo c")
        );
    }

    #[test]
    fn duplicate_dependency_tokens_are_preserved() {
        let graph = parse("all: b b\n\techo all\nb:\n\techo b\n").unwrap();
        assert_eq!(graph.lookup("all").unwrap().dependencies, vec!["b", "b"]);
    }

    #[test]
    fn target_without_command_is_an_aggregator() {
        let graph = parse("all: a b\na:\n\techo a\nb:\n\techo b\n").unwrap();
        let all = graph.lookup("all").unwrap();
        assert_eq!(all.command, None);
        assert!(!all.is_file_dependency());
    }
}
