// src/coord/mod.rs

//! The coordination port.
//!
//! All cross-worker state (arrival counters, per-target locks, timestamps,
//! the global remaining-task counter and the completion-signal list) lives in
//! an external store reached through the [`CoordinationStore`] trait. Any
//! key-value store with atomic numeric operations, distributed locks and
//! blocking list pops satisfies the contract; the core protocol never speaks
//! a particular store's vocabulary.
//!
//! - [`redis`] is the production implementation.
//! - [`memory`] is a single-process implementation used by tests.
//! - [`keys`] holds the well-known key names shared by master and workers.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::errors::Result;

pub mod keys;
pub mod memory;
pub mod redis;

pub use self::memory::MemoryStore;
pub use self::redis::RedisStore;

/// Boxed future type used by the object-safe port traits.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Abstraction over the shared coordination store.
///
/// Implementations must make `init_counter` and `decrement` atomic with
/// respect to concurrent callers; the executor protocol serializes the pair
/// per target with `acquire_lock`/`release_lock` anyway, but the global
/// remaining counter is decremented without any lock.
pub trait CoordinationStore: Send + Sync {
    /// Drop all state from previous runs.
    fn reset(&self) -> BoxFuture<'_, Result<()>>;

    fn set_value<'a>(&'a self, key: &'a str, value: &'a str) -> BoxFuture<'a, Result<()>>;

    fn get_value<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<Option<String>>>;

    /// Set `key` to `initial` only if it does not exist yet. Returns whether
    /// this call performed the initialization.
    fn init_counter<'a>(&'a self, key: &'a str, initial: i64) -> BoxFuture<'a, Result<bool>>;

    /// Atomically decrement `key` and return the post-decrement value.
    fn decrement<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<i64>>;

    /// Block until the mutual-exclusion lock named `key` is held; returns a
    /// fencing token that must be passed back to [`release_lock`].
    ///
    /// [`release_lock`]: CoordinationStore::release_lock
    fn acquire_lock<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<String>>;

    fn release_lock<'a>(&'a self, key: &'a str, token: &'a str) -> BoxFuture<'a, Result<()>>;

    /// Append `value` to the list named `key`.
    fn push<'a>(&'a self, key: &'a str, value: &'a str) -> BoxFuture<'a, Result<()>>;

    /// Block until the list named `key` has an element, then pop it.
    fn blocking_pop<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<String>>;
}

/// Run `body` while holding the lock named `key`, releasing it on every exit
/// path. The lock scope must stay short; nothing long-running belongs inside.
pub async fn with_lock<S, F, Fut, T>(store: &S, key: &str, body: F) -> Result<T>
where
    S: CoordinationStore + ?Sized,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let token = store.acquire_lock(key).await?;
    let outcome = body().await;
    store.release_lock(key, &token).await?;
    outcome
}

/// Process-unique fencing token for lock acquisitions.
pub(crate) fn next_lock_token() -> String {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    format!(
        "{}:{}",
        std::process::id(),
        COUNTER.fetch_add(1, Ordering::Relaxed)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::DmakeError;

    #[tokio::test]
    async fn with_lock_releases_on_the_error_path() {
        let store = MemoryStore::new();

        let result: Result<()> = with_lock(&store, "k_lock", || async {
            Err(DmakeError::Parse("boom".to_string()))
        })
        .await;
        assert!(result.is_err());

        // Lock must be free again: a second acquisition succeeds immediately.
        let token = store.acquire_lock("k_lock").await.unwrap();
        store.release_lock("k_lock", &token).await.unwrap();
    }
}
