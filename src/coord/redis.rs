// src/coord/redis.rs

//! Redis-backed coordination store.
//!
//! Locks are plain `SET key token NX PX <ttl>` with a script-fenced release,
//! so a crashed holder cannot wedge a target forever and a slow holder cannot
//! delete a lock it no longer owns. Counters map onto Redis's atomic
//! `DECRBY`, and the completion signal uses `BRPOP` on a list.

use std::time::Duration;

use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use tracing::{debug, trace};

use crate::coord::{BoxFuture, CoordinationStore, next_lock_token};
use crate::errors::Result;

/// How long a lock acquisition lives before Redis expires it. The critical
/// section it guards is a handful of store round-trips, so this is generous.
const LOCK_TTL: Duration = Duration::from_secs(30);

/// Delay between acquisition attempts on a contended lock.
const LOCK_RETRY: Duration = Duration::from_millis(50);

const RELEASE_LOCK_SCRIPT: &str = r#"
if redis.call("get", KEYS[1]) == ARGV[1] then
    return redis.call("del", KEYS[1])
else
    return 0
end
"#;

#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
}

impl RedisStore {
    /// Connect to the store at `url` (e.g. `redis://127.0.0.1/0`).
    pub async fn connect(url: &str) -> Result<Self> {
        let client = redis::Client::open(url)?;
        let conn = client.get_connection_manager().await?;
        debug!(url = %url, "connected to coordination store");
        Ok(Self { conn })
    }
}

impl CoordinationStore for RedisStore {
    fn reset(&self) -> BoxFuture<'_, Result<()>> {
        let mut conn = self.conn.clone();
        Box::pin(async move {
            let _: () = redis::cmd("FLUSHDB").query_async(&mut conn).await?;
            Ok(())
        })
    }

    fn set_value<'a>(&'a self, key: &'a str, value: &'a str) -> BoxFuture<'a, Result<()>> {
        let mut conn = self.conn.clone();
        Box::pin(async move {
            let _: () = conn.set(key, value).await?;
            Ok(())
        })
    }

    fn get_value<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<Option<String>>> {
        let mut conn = self.conn.clone();
        Box::pin(async move {
            let value: Option<String> = conn.get(key).await?;
            Ok(value)
        })
    }

    fn init_counter<'a>(&'a self, key: &'a str, initial: i64) -> BoxFuture<'a, Result<bool>> {
        let mut conn = self.conn.clone();
        Box::pin(async move {
            let set: Option<String> = redis::cmd("SET")
                .arg(key)
                .arg(initial)
                .arg("NX")
                .query_async(&mut conn)
                .await?;
            Ok(set.is_some())
        })
    }

    fn decrement<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<i64>> {
        let mut conn = self.conn.clone();
        Box::pin(async move {
            let value: i64 = conn.decr(key, 1).await?;
            Ok(value)
        })
    }

    fn acquire_lock<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<String>> {
        let mut conn = self.conn.clone();
        Box::pin(async move {
            let token = next_lock_token();
            loop {
                let acquired: Option<String> = redis::cmd("SET")
                    .arg(key)
                    .arg(&token)
                    .arg("NX")
                    .arg("PX")
                    .arg(LOCK_TTL.as_millis() as u64)
                    .query_async(&mut conn)
                    .await?;
                if acquired.is_some() {
                    trace!(lock = %key, "lock acquired");
                    return Ok(token);
                }
                tokio::time::sleep(LOCK_RETRY).await;
            }
        })
    }

    fn release_lock<'a>(&'a self, key: &'a str, token: &'a str) -> BoxFuture<'a, Result<()>> {
        let mut conn = self.conn.clone();
        Box::pin(async move {
            let _: i64 = redis::Script::new(RELEASE_LOCK_SCRIPT)
                .key(key)
                .arg(token)
                .invoke_async(&mut conn)
                .await?;
            trace!(lock = %key, "lock released");
            Ok(())
        })
    }

    fn push<'a>(&'a self, key: &'a str, value: &'a str) -> BoxFuture<'a, Result<()>> {
        let mut conn = self.conn.clone();
        Box::pin(async move {
            let _: () = conn.lpush(key, value).await?;
            Ok(())
        })
    }

    fn blocking_pop<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<String>> {
        let mut conn = self.conn.clone();
        Box::pin(async move {
            let (_, value): (String, String) = redis::cmd("BRPOP")
                .arg(key)
                .arg(0)
                .query_async(&mut conn)
                .await?;
            Ok(value)
        })
    }
}
