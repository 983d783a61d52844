// src/coord/keys.rs

//! Well-known coordination-store keys shared by the master and the workers.

/// Unix timestamp written by the master when a build is dispatched.
pub const START_TIME: &str = "start_time";

/// Unix timestamp rewritten after every executed task; the last-completing
/// worker's write is the build's end time.
pub const END_TIME: &str = "end_time";

/// Global remaining-task counter, seeded with the dependency tree's node
/// count by the master and decremented once per executed task.
pub const REMAINING_TASKS: &str = "remaining_tasks";

/// Completion-signal list the sync master blocks on.
pub const BUILD_DONE: &str = "build_done";

/// Per-target mutual-exclusion lock key.
pub fn target_lock(target: &str) -> String {
    format!("{target}_lock")
}

/// Per-target arrival counter key.
pub fn arrival_counter(target: &str) -> String {
    format!("{target}_sem")
}
