// src/exec/rendezvous.rs

//! Pure pieces of the executor state machine.
//!
//! The distributed part of the protocol (locks, counters, queues) lives in
//! [`worker`](crate::exec::worker); what can be decided without IO is kept
//! here so it can be tested directly.

/// Classification of one arrival at a task's counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arrival {
    /// Not all dependencies have reported yet (or the task already ran and
    /// this is a redelivery driving the counter negative). Nothing to do.
    Waiting,
    /// This arrival took the counter to zero: exactly one delivery per target
    /// observes this, and it performs the work.
    Armed,
}

/// Classify the post-decrement counter value. Only the transition *to* zero
/// arms; a negative value means the task already ran.
pub fn classify(remaining: i64) -> Arrival {
    if remaining == 0 {
        Arrival::Armed
    } else {
        Arrival::Waiting
    }
}

/// Split a command string into its `;`-separated sub-commands, each run as an
/// independent shell step. Empty segments (trailing `;` and the like) are
/// skipped.
pub fn sub_commands(command: &str) -> Vec<&str> {
    command
        .split(';')
        .map(str::trim)
        .filter(|sub| !sub.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_zero_arms() {
        assert_eq!(classify(2), Arrival::Waiting);
        assert_eq!(classify(1), Arrival::Waiting);
        assert_eq!(classify(0), Arrival::Armed);
        assert_eq!(classify(-1), Arrival::Waiting);
    }

    #[test]
    fn splits_on_semicolons() {
        assert_eq!(
            sub_commands("echo a; echo b ;echo c"),
            vec!["echo a", "echo b", "echo c"]
        );
    }

    #[test]
    fn single_command_stays_whole() {
        assert_eq!(
            sub_commands("cat part1.txt part2.txt > out.txt"),
            vec!["cat part1.txt part2.txt > out.txt"]
        );
    }

    #[test]
    fn trailing_separator_adds_no_step() {
        assert_eq!(sub_commands("echo a;"), vec!["echo a"]);
    }
}
