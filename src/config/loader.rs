// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::Config;
use crate::errors::{DmakeError, Result};

/// Load a configuration file from a given path.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<Config> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;
    let config: Config = toml::from_str(&contents)?;
    validate(&config)?;
    Ok(config)
}

/// Resolve and load the effective configuration.
///
/// Priority:
/// 1. an explicit `--config` path (must exist),
/// 2. the `DMAKE_CONFIG` environment variable,
/// 3. `Dmake.toml` in the working directory, if present,
/// 4. built-in defaults (broker on localhost).
pub fn load(explicit: Option<&str>) -> Result<Config> {
    if let Some(path) = explicit {
        return load_from_path(path);
    }

    if let Ok(path) = std::env::var("DMAKE_CONFIG") {
        return load_from_path(path);
    }

    let default = default_config_path();
    if default.exists() {
        return load_from_path(default);
    }

    debug!("no config file found; using defaults");
    let config = Config::default();
    validate(&config)?;
    Ok(config)
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("Dmake.toml")
}

fn validate(config: &Config) -> Result<()> {
    if config.broker.url.trim().is_empty() {
        return Err(DmakeError::Config(
            "[broker].url must not be empty".to_string(),
        ));
    }
    if config.broker.queue.trim().is_empty() {
        return Err(DmakeError::Config(
            "[broker].queue must not be empty".to_string(),
        ));
    }
    if config.worker.concurrency == 0 {
        return Err(DmakeError::Config(
            "[worker].concurrency must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_to_missing_sections() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.broker.url, "redis://127.0.0.1/0");
        assert_eq!(config.broker.queue, "dmake_tasks");
        assert_eq!(config.worker.concurrency, 4);
    }

    #[test]
    fn sections_override_defaults() {
        let text = "[broker]\nurl = \"redis://10.0.0.5/1\"\n\n[worker]\nconcurrency = 8\n";
        let config: Config = toml::from_str(text).unwrap();
        assert_eq!(config.broker.url, "redis://10.0.0.5/1");
        assert_eq!(config.broker.queue, "dmake_tasks");
        assert_eq!(config.worker.concurrency, 8);
    }

    #[test]
    fn zero_concurrency_is_rejected() {
        let config: Config = toml::from_str("[worker]\nconcurrency = 0\n").unwrap();
        assert!(matches!(validate(&config), Err(DmakeError::Config(_))));
    }
}
