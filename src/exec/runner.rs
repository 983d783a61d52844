// src/exec/runner.rs

//! Command execution behind a pluggable trait.
//!
//! The worker protocol talks to a [`CommandRunner`] instead of spawning
//! processes itself, so tests can substitute a recording fake and exercise
//! the rendezvous logic without touching a shell.

use tokio::process::Command;
use tracing::info;

use crate::coord::BoxFuture;
use crate::errors::{DmakeError, Result};

/// Trait abstracting how one sub-command is executed.
pub trait CommandRunner: Send + Sync {
    /// Run `command` for `target`; fails with
    /// [`DmakeError::CommandFailed`] when it exits non-zero.
    fn run<'a>(&'a self, target: &'a str, command: &'a str) -> BoxFuture<'a, Result<()>>;
}

/// Production runner: hands the sub-command to the platform shell.
pub struct ShellRunner;

impl CommandRunner for ShellRunner {
    fn run<'a>(&'a self, target: &'a str, command: &'a str) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            info!(task = %target, command = %command, "running sub-command");

            let mut cmd = if cfg!(windows) {
                let mut c = Command::new("cmd");
                c.arg("/C").arg(command);
                c
            } else {
                let mut c = Command::new("sh");
                c.arg("-c").arg(command);
                c
            };

            let status = cmd.status().await?;
            if status.success() {
                Ok(())
            } else {
                Err(DmakeError::CommandFailed {
                    command: command.to_string(),
                    code: status.code().unwrap_or(-1),
                })
            }
        })
    }
}
