// src/exec/mod.rs

//! The worker role: the distributed rendezvous that replaces an in-process
//! scheduler loop.
//!
//! - [`rendezvous`] holds the pure arrival/command-splitting logic.
//! - [`runner`] executes sub-commands behind the [`CommandRunner`] trait.
//! - [`worker`] implements the per-delivery protocol and the worker loop.

use serde::{Deserialize, Serialize};

use crate::errors::Result;

pub mod rendezvous;
pub mod runner;
pub mod worker;

pub use runner::{CommandRunner, ShellRunner};
pub use worker::{DeliveryOutcome, process_delivery, run_worker};

/// Signal published on the completion list when a build ends.
///
/// `Success` comes from the worker whose global-counter decrement reached
/// zero; `Failed` from any worker whose sub-command exited non-zero, so the
/// sync master unblocks instead of waiting forever.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum BuildSignal {
    Success,
    Failed { target: String, detail: String },
}

impl BuildSignal {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}
