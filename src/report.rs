// src/report.rs

//! Build timing.
//!
//! The master stamps `start_time` when it dispatches; every executed task
//! rewrites `end_time`, so once a build has drained, the difference is its
//! wall-clock duration. `dmake report` reads both and appends the duration to
//! a results log. Run it only after a build has actually finished.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::anyhow;
use tracing::info;

use crate::coord::{CoordinationStore, keys};
use crate::errors::Result;

/// Current unix time, in the fractional-seconds form the timestamps use.
pub fn now_timestamp() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
        .to_string()
}

/// Compute the last build's duration and append it as one line to
/// `result_file`. Returns the duration in seconds.
pub async fn append_duration(
    store: &dyn CoordinationStore,
    result_file: &Path,
) -> Result<f64> {
    let start = read_timestamp(store, keys::START_TIME).await?;
    let end = read_timestamp(store, keys::END_TIME).await?;
    let duration = end - start;

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(result_file)?;
    writeln!(file, "{duration}")?;

    info!(duration, path = %result_file.display(), "recorded build duration");
    Ok(duration)
}

async fn read_timestamp(store: &dyn CoordinationStore, key: &str) -> Result<f64> {
    let raw = store
        .get_value(key)
        .await?
        .ok_or_else(|| anyhow!("no '{key}' recorded; has a build run?"))?;
    raw.parse::<f64>()
        .map_err(|_| anyhow!("'{key}' holds a non-numeric timestamp: '{raw}'").into())
}
