use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::{Arc, Mutex};
use tracing::debug;

use crate::errors::CoreError;

/// A server-side collection whose reads are cached together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Trades,
    Strategies,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Trades => "trades",
            Collection::Strategies => "strategies",
        }
    }

    /// Entity name for user-facing messages ("Trade", "Strategy").
    pub fn entity_name(&self) -> &'static str {
        match self {
            Collection::Trades => "Trade",
            Collection::Strategies => "Strategy",
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of one cached read: collection plus the parameters it was made with.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    collection: Collection,
    params: Vec<(String, String)>,
}

impl QueryKey {
    pub fn new(collection: Collection) -> Self {
        Self {
            collection,
            params: Vec::new(),
        }
    }

    pub fn with_param(mut self, name: &str, value: impl Into<String>) -> Self {
        self.params.push((name.to_string(), value.into()));
        self
    }

    pub fn collection(&self) -> Collection {
        self.collection
    }

    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }
}

impl std::fmt::Display for QueryKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.collection)?;
        if !self.params.is_empty() {
            let params: Vec<String> = self.params.iter().map(|(k, v)| format!("{k}={v}")).collect();
            write!(f, "[{}]", params.join(","))?;
        }
        Ok(())
    }
}

struct Entry {
    /// Last fetched response body, kept as JSON.
    data: Option<Value>,
    stale: bool,
    /// Bumped on every invalidation; a fetch that started under an older
    /// epoch stores its result as stale.
    epoch: u64,
    /// Held for the duration of a fetch so concurrent reads of one key share it.
    fetch_lock: Arc<tokio::sync::Mutex<()>>,
}

impl Entry {
    fn new() -> Self {
        Self {
            data: None,
            stale: true,
            epoch: 0,
            fetch_lock: Arc::new(tokio::sync::Mutex::new(())),
        }
    }

    fn fresh(&self) -> Option<&Value> {
        if self.stale {
            None
        } else {
            self.data.as_ref()
        }
    }
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<QueryKey, Entry>,
    /// Every key ever read, grouped by collection; drives coarse invalidation.
    keys_by_collection: HashMap<Collection, HashSet<QueryKey>>,
    /// Bumped by `clear`; fetches that straddle a clear store nothing fresh.
    generation: u64,
}

impl CacheState {
    fn entry(&mut self, key: &QueryKey) -> &mut Entry {
        if !self.entries.contains_key(key) {
            self.keys_by_collection
                .entry(key.collection())
                .or_default()
                .insert(key.clone());
        }
        self.entries.entry(key.clone()).or_insert_with(Entry::new)
    }
}

/// Cache of collection reads with coarse, per-collection invalidation.
///
/// - A fresh entry is served without calling the fetcher.
/// - Concurrent reads of one key wait on a single in-flight fetch.
/// - `invalidate(collection)` marks every key of that collection stale;
///   the next read re-fetches. Cached lists are never patched in place.
#[derive(Default)]
pub struct QueryCache {
    state: Mutex<CacheState>,
}

impl std::fmt::Debug for QueryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        f.debug_struct("QueryCache")
            .field("entries", &state.entries.len())
            .finish()
    }
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read `key`, calling `fetcher` only when there is no fresh cached value.
    ///
    /// Failed fetches are not cached; the next read tries again.
    pub async fn fetch<T, F, Fut>(&self, key: QueryKey, fetcher: F) -> Result<T, CoreError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, CoreError>>,
    {
        let fetch_lock = {
            let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            let entry = state.entry(&key);
            if let Some(value) = entry.fresh() {
                return decode(value);
            }
            entry.fetch_lock.clone()
        };

        let _in_flight = fetch_lock.lock().await;

        // Whoever held the lock before us may have filled the entry already.
        let (generation, epoch) = {
            let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            let generation = state.generation;
            let entry = state.entry(&key);
            if let Some(value) = entry.fresh() {
                debug!(%key, "served by concurrent fetch");
                return decode(value);
            }
            (generation, entry.epoch)
        };

        debug!(%key, "fetching");
        let value = fetcher().await?;
        let json = serde_json::to_value(&value).map_err(|e| CoreError::Serialization(e.to_string()))?;

        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let cleared = state.generation != generation;
        let entry = state.entry(&key);
        entry.stale = cleared || entry.epoch != epoch;
        entry.data = Some(json);
        Ok(value)
    }

    /// The cached value for `key`, fresh or stale, without fetching.
    pub fn peek<T: DeserializeOwned>(&self, key: &QueryKey) -> Option<T> {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let value = state.entries.get(key)?.data.as_ref()?;
        decode(value).ok()
    }

    /// `Some(true)` if `key` is cached but must be re-fetched, `None` if never cached.
    pub fn is_stale(&self, key: &QueryKey) -> Option<bool> {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state
            .entries
            .get(key)
            .filter(|e| e.data.is_some())
            .map(|e| e.stale)
    }

    /// Mark every key of `collection` stale. Returns how many keys were marked.
    pub fn invalidate(&self, collection: Collection) -> usize {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let CacheState {
            entries,
            keys_by_collection,
            ..
        } = &mut *state;
        let Some(keys) = keys_by_collection.get(&collection) else {
            return 0;
        };
        for key in keys {
            if let Some(entry) = entries.get_mut(key) {
                entry.stale = true;
                entry.epoch += 1;
            }
        }
        debug!(%collection, keys = keys.len(), "invalidated");
        keys.len()
    }

    /// Keys ever read for `collection`.
    pub fn keys(&self, collection: Collection) -> Vec<QueryKey> {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state
            .keys_by_collection
            .get(&collection)
            .map(|keys| keys.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Drop everything, e.g. when the user changes.
    pub fn clear(&self) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let generation = state.generation + 1;
        *state = CacheState {
            generation,
            ..CacheState::default()
        };
    }
}

fn decode<T: DeserializeOwned>(value: &Value) -> Result<T, CoreError> {
    <T as serde::Deserialize>::deserialize(value).map_err(|e| CoreError::Deserialization(format!("cached value: {e}")))
}
