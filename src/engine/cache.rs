//! Keyed memoization of computed results.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Unbounded cache with one entry per key and no expiry.
///
/// Intended for a small closed key set (e.g. time ranges) over immutable
/// source data. Entries are never evicted, so a value computed before new
/// rows arrive stays stale until the process restarts.
#[derive(Debug)]
pub struct ResultCache<K, V> {
    entries: RwLock<HashMap<K, V>>,
}

impl<K, V> Default for ResultCache<K, V> {
    fn default() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl<K, V> ResultCache<K, V>
where
    K: Eq + Hash + Clone + std::fmt::Debug,
    V: Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, key: &K) -> Option<V> {
        self.entries.read().await.get(key).cloned()
    }

    /// Store `value` under `key`, replacing any previous entry.
    pub async fn put(&self, key: K, value: V) {
        self.entries.write().await.insert(key, value);
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Read-through lookup: return the cached value, or compute it with
    /// `compute`, store it and return it.
    ///
    /// Errors are returned to the caller and nothing is cached. The lock is
    /// not held while computing; if two callers race on the same key the
    /// first stored value wins and both observe it.
    pub async fn get_or_try_insert_with<F, Fut, E>(&self, key: K, compute: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(&key).await {
            debug!(?key, "Result cache hit");
            return Ok(value);
        }

        let value = compute().await?;

        let mut entries = self.entries.write().await;
        let stored = entries.entry(key.clone()).or_insert(value).clone();
        info!(?key, "Result cache populated");
        Ok(stored)
    }
}
