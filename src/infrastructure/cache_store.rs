//! Keyed TTL cache for licensed upstream data
//!
//! Expiry is checked lazily on read. The lock is released before the fetch
//! runs, so two concurrent misses on one key may both reach upstream; the last
//! completed write wins. Failed fetches never touch the stored entry.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::domain::services::{Clock, SystemClock};

/// How a value was served
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheStatus {
    /// Fresh entry served without calling upstream
    Hit,
    /// No entry, or the entry had expired
    Miss,
    /// Caller forced a refetch
    Refresh,
}

impl std::fmt::Display for CacheStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Hit => write!(f, "HIT"),
            Self::Miss => write!(f, "MISS"),
            Self::Refresh => write!(f, "REFRESH"),
        }
    }
}

/// Stored value plus the time it was fetched
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    pub value: V,
    pub fetched_at: DateTime<Utc>,
    pub ttl: Duration,
}

fn ttl_delta(ttl: Duration) -> TimeDelta {
    TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX)
}

impl<V> CacheEntry<V> {
    pub fn valid_until(&self) -> DateTime<Utc> {
        self.fetched_at
            .checked_add_signed(ttl_delta(self.ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// Valid while `now - fetched_at < ttl`
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(self.fetched_at) < ttl_delta(self.ttl)
    }
}

/// Value returned to callers with its cache metadata
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cached<V> {
    pub value: V,
    pub fetched_at: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
    pub status: CacheStatus,
}

impl<V> Cached<V> {
    pub fn is_hit(&self) -> bool {
        self.status == CacheStatus::Hit
    }
}

/// Timestamps of one entry, for response metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryMetadata {
    pub fetched_at: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
}

pub struct CacheStore<K, V> {
    name: String,
    entries: RwLock<HashMap<K, CacheEntry<V>>>,
    clock: Arc<dyn Clock>,
}

impl<K, V> CacheStore<K, V>
where
    K: Eq + Hash + Clone + std::fmt::Debug + Send + Sync,
    V: Clone + Send + Sync,
{
    pub fn new(name: &str) -> Self {
        Self::with_clock(name, Arc::new(SystemClock))
    }

    pub fn with_clock(name: &str, clock: Arc<dyn Clock>) -> Self {
        Self {
            name: name.to_string(),
            entries: RwLock::new(HashMap::new()),
            clock,
        }
    }

    /// Serve `key` from cache or run `fetch` and store its result
    pub async fn get_or_fetch<F, Fut, E>(
        &self,
        key: K,
        ttl: Duration,
        force_refresh: bool,
        fetch: F,
    ) -> Result<Cached<V>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if !force_refresh {
            let now = self.clock.now();
            let entries = self.entries.read().await;
            if let Some(entry) = entries.get(&key).filter(|entry| entry.is_fresh(now)) {
                debug!("[cache:{}] HIT {:?}", self.name, key);
                return Ok(Cached {
                    value: entry.value.clone(),
                    fetched_at: entry.fetched_at,
                    valid_until: entry.valid_until(),
                    status: CacheStatus::Hit,
                });
            }
        }

        let status = if force_refresh {
            CacheStatus::Refresh
        } else {
            CacheStatus::Miss
        };
        info!("🔄 [cache:{}] {} {:?}, fetching upstream", self.name, status, key);

        let value = fetch().await?;

        let entry = CacheEntry {
            value: value.clone(),
            fetched_at: self.clock.now(),
            ttl,
        };
        let cached = Cached {
            value,
            fetched_at: entry.fetched_at,
            valid_until: entry.valid_until(),
            status,
        };
        self.entries.write().await.insert(key, entry);
        Ok(cached)
    }

    pub async fn metadata(&self, key: &K) -> Option<EntryMetadata> {
        self.entries.read().await.get(key).map(|entry| EntryMetadata {
            fetched_at: entry.fetched_at,
            valid_until: entry.valid_until(),
        })
    }

    pub async fn invalidate(&self, key: &K) -> bool {
        self.entries.write().await.remove(key).is_some()
    }

    /// Drop every entry, used for manual refresh
    pub async fn invalidate_all(&self) -> usize {
        let mut entries = self.entries.write().await;
        let dropped = entries.len();
        entries.clear();
        info!("🧹 [cache:{}] invalidated {} entries", self.name, dropped);
        dropped
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Hand-driven clock for expiry tests and deterministic embedding
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        *now += ttl_delta(by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}
