// src/coord/memory.rs

//! Single-process coordination store used by tests.
//!
//! Semantics mirror the Redis implementation: counters are plain integers
//! stored as strings, locks are held until released (contenders poll), and
//! `blocking_pop` polls its list. All state sits behind one std mutex; no
//! guard is ever held across an await point.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use crate::coord::{BoxFuture, CoordinationStore, next_lock_token};
use crate::errors::Result;

const POLL: Duration = Duration::from_millis(2);

#[derive(Debug, Default)]
struct Inner {
    values: HashMap<String, String>,
    locks: HashMap<String, String>,
    lists: HashMap<String, VecDeque<String>>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CoordinationStore for MemoryStore {
    fn reset(&self) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            let mut inner = self.inner.lock().unwrap();
            *inner = Inner::default();
            Ok(())
        })
    }

    fn set_value<'a>(&'a self, key: &'a str, value: &'a str) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let mut inner = self.inner.lock().unwrap();
            inner.values.insert(key.to_string(), value.to_string());
            Ok(())
        })
    }

    fn get_value<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<Option<String>>> {
        Box::pin(async move {
            let inner = self.inner.lock().unwrap();
            Ok(inner.values.get(key).cloned())
        })
    }

    fn init_counter<'a>(&'a self, key: &'a str, initial: i64) -> BoxFuture<'a, Result<bool>> {
        Box::pin(async move {
            let mut inner = self.inner.lock().unwrap();
            if inner.values.contains_key(key) {
                Ok(false)
            } else {
                inner.values.insert(key.to_string(), initial.to_string());
                Ok(true)
            }
        })
    }

    fn decrement<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<i64>> {
        Box::pin(async move {
            let mut inner = self.inner.lock().unwrap();
            let entry = inner
                .values
                .entry(key.to_string())
                .or_insert_with(|| "0".to_string());
            let value = entry.parse::<i64>().unwrap_or(0) - 1;
            *entry = value.to_string();
            Ok(value)
        })
    }

    fn acquire_lock<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<String>> {
        Box::pin(async move {
            let token = next_lock_token();
            loop {
                {
                    let mut inner = self.inner.lock().unwrap();
                    if !inner.locks.contains_key(key) {
                        inner.locks.insert(key.to_string(), token.clone());
                        return Ok(token);
                    }
                }
                tokio::time::sleep(POLL).await;
            }
        })
    }

    fn release_lock<'a>(&'a self, key: &'a str, token: &'a str) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let mut inner = self.inner.lock().unwrap();
            if inner.locks.get(key).is_some_and(|held| held == token) {
                inner.locks.remove(key);
            }
            Ok(())
        })
    }

    fn push<'a>(&'a self, key: &'a str, value: &'a str) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let mut inner = self.inner.lock().unwrap();
            inner
                .lists
                .entry(key.to_string())
                .or_default()
                .push_back(value.to_string());
            Ok(())
        })
    }

    fn blocking_pop<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<String>> {
        Box::pin(async move {
            loop {
                {
                    let mut inner = self.inner.lock().unwrap();
                    if let Some(value) =
                        inner.lists.get_mut(key).and_then(|list| list.pop_front())
                    {
                        return Ok(value);
                    }
                }
                tokio::time::sleep(POLL).await;
            }
        })
    }
}
