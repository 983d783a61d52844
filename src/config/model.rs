// src/config/model.rs

use serde::Deserialize;

/// Broker/worker configuration as read from `Dmake.toml`.
///
/// ```toml
/// [broker]
/// url = "redis://10.0.0.5/0"
/// queue = "dmake_tasks"
///
/// [worker]
/// concurrency = 8
/// ```
///
/// Both sections are optional; a missing file yields the defaults below,
/// which target a broker on localhost.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub broker: BrokerSection,

    #[serde(default)]
    pub worker: WorkerSection,
}

/// `[broker]` section: where the coordination store and the task queue live.
/// Both ride the same Redis instance; the database named in the URL is
/// flushed at the start of every build, so dedicate one to dmake.
#[derive(Debug, Clone, Deserialize)]
pub struct BrokerSection {
    #[serde(default = "default_broker_url")]
    pub url: String,

    /// Name of the task-queue list.
    #[serde(default = "default_queue_name")]
    pub queue: String,
}

fn default_broker_url() -> String {
    "redis://127.0.0.1/0".to_string()
}

fn default_queue_name() -> String {
    "dmake_tasks".to_string()
}

impl Default for BrokerSection {
    fn default() -> Self {
        Self {
            url: default_broker_url(),
            queue: default_queue_name(),
        }
    }
}

/// `[worker]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkerSection {
    /// Maximum number of tasks one worker process runs concurrently.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

fn default_concurrency() -> usize {
    4
}

impl Default for WorkerSection {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
        }
    }
}
