use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use dmake::coord::BoxFuture;
use dmake::errors::{DmakeError, Result};
use dmake::exec::CommandRunner;

/// A fake command runner that:
/// - records every `(target, command)` pair it is asked to run
/// - succeeds, unless the target is in the configured failure set, in which
///   case it reports exit code 1.
pub struct RecordingRunner {
    executed: Arc<Mutex<Vec<(String, String)>>>,
    fail_targets: HashSet<String>,
}

impl RecordingRunner {
    pub fn new(executed: Arc<Mutex<Vec<(String, String)>>>) -> Self {
        Self {
            executed,
            fail_targets: HashSet::new(),
        }
    }

    /// Make every sub-command of `target` fail.
    pub fn fail_target(mut self, target: &str) -> Self {
        self.fail_targets.insert(target.to_string());
        self
    }
}

impl CommandRunner for RecordingRunner {
    fn run<'a>(&'a self, target: &'a str, command: &'a str) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            {
                let mut guard = self.executed.lock().unwrap();
                guard.push((target.to_string(), command.to_string()));
            }

            if self.fail_targets.contains(target) {
                Err(DmakeError::CommandFailed {
                    command: command.to_string(),
                    code: 1,
                })
            } else {
                Ok(())
            }
        })
    }
}
