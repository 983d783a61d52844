// src/errors.rs

//! Crate-wide error type and `Result` alias.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DmakeError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Cycle detected: target '{0}' depends on itself")]
    Cycle(String),

    #[error("No task found for target '{0}'")]
    TaskNotFound(String),

    #[error("Target '{0}' is a file dependency; nothing to build")]
    NothingToBuild(String),

    #[error("Command '{command}' failed with code {code}")]
    CommandFailed { command: String, code: i32 },

    #[error("Coordination store error: {0}")]
    Coordination(#[from] redis::RedisError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, DmakeError>;
