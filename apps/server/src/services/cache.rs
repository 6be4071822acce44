// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Disk-based response cache using cacache, with stale-while-revalidate.
//!
//! Entry age comes from the cacache index timestamp, so nothing besides the
//! serialized value is stored.

use crate::error::ApiError;
use parking_lot::Mutex;
use serde::{de::DeserializeOwned, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// How long an entry is served as-is, and for how long after that it is
/// still served while a refresh runs in the background.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    pub ttl: Duration,
    pub stale_window: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    Fresh,
    Stale,
    Expired,
}

impl CachePolicy {
    pub fn new(ttl: Duration, stale_window: Duration) -> Self {
        Self { ttl, stale_window }
    }

    pub fn freshness(&self, age: Duration) -> Freshness {
        if age < self.ttl {
            Freshness::Fresh
        } else if age < self.ttl + self.stale_window {
            Freshness::Stale
        } else {
            Freshness::Expired
        }
    }

    /// `Cache-Control` value matching this policy.
    pub fn cache_control(&self) -> String {
        format!(
            "public, max-age={}, stale-while-revalidate={}",
            self.ttl.as_secs(),
            self.stale_window.as_secs()
        )
    }
}

/// Cached value together with its age.
#[derive(Debug)]
pub struct CacheEntry<T> {
    pub value: T,
    pub age: Duration,
}

/// Content-addressable disk cache.
#[derive(Debug, Clone)]
pub struct DiskCache {
    cache_dir: PathBuf,
    refreshing: Arc<Mutex<HashSet<String>>>,
}

impl DiskCache {
    /// Create a new cache in the specified directory.
    pub async fn new(cache_dir: &str) -> Self {
        let path = PathBuf::from(cache_dir);

        // Create cache directory if it doesn't exist
        if let Err(e) = tokio::fs::create_dir_all(&path).await {
            tracing::warn!(
                error = %e,
                path = %path.display(),
                "Failed to create cache directory"
            );
        }

        Self {
            cache_dir: path,
            refreshing: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Generate a cache key from request parts (SHA256 hash).
    pub fn generate_key(parts: &[&str]) -> String {
        let mut hasher = Sha256::new();
        for part in parts {
            hasher.update(part.as_bytes());
            hasher.update([0u8]);
        }
        hex::encode(hasher.finalize())
    }

    /// Get a cached value and its age.
    ///
    /// An entry that no longer deserializes into `T` counts as a miss.
    pub async fn get_entry<T: DeserializeOwned>(&self, key: &str) -> Result<Option<CacheEntry<T>>, ApiError> {
        let Some(meta) = cacache::metadata(&self.cache_dir, key).await? else {
            return Ok(None);
        };
        let data = match cacache::read(&self.cache_dir, key).await {
            Ok(data) => data,
            Err(cacache::Error::EntryNotFound(_, _)) => return Ok(None),
            Err(e) => return Err(ApiError::Cache(e.to_string())),
        };
        let value = match serde_json::from_slice(&data) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Discarding unreadable cache entry");
                return Ok(None);
            }
        };

        let now = chrono::Utc::now().timestamp_millis().max(0) as u128;
        let age_ms = now.saturating_sub(meta.time);
        Ok(Some(CacheEntry {
            value,
            age: Duration::from_millis(u64::try_from(age_ms).unwrap_or(u64::MAX)),
        }))
    }

    /// Set a cached value.
    pub async fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<(), ApiError> {
        let data = serde_json::to_vec(value)?;
        cacache::write(&self.cache_dir, key, &data).await?;
        tracing::debug!(key = %key, size = data.len(), "Cached result");
        Ok(())
    }

    /// Serve `key` from the cache according to `policy`, calling `fetch` on
    /// a miss or an expired entry.
    ///
    /// A stale entry is returned immediately and `fetch` runs in a background
    /// task that rewrites the entry. At most one refresh per key is in flight.
    pub async fn fetch_with_revalidate<T, F, Fut>(&self, key: &str, policy: CachePolicy, fetch: F) -> Result<T, ApiError>
    where
        T: Serialize + DeserializeOwned + Send + Sync + 'static,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
    {
        match self.get_entry::<T>(key).await {
            Ok(Some(entry)) => match policy.freshness(entry.age) {
                Freshness::Fresh => {
                    tracing::info!(key = %key, "Cache HIT");
                    return Ok(entry.value);
                }
                Freshness::Stale => {
                    tracing::info!(key = %key, age_secs = entry.age.as_secs(), "Cache STALE, revalidating");
                    self.revalidate(key.to_string(), fetch);
                    return Ok(entry.value);
                }
                Freshness::Expired => tracing::debug!(key = %key, "Cache EXPIRED"),
            },
            Ok(None) => tracing::debug!(key = %key, "Cache MISS"),
            Err(e) => tracing::warn!(key = %key, error = %e, "Cache read failed"),
        }

        let value = fetch().await?;
        if let Err(e) = self.set(key, &value).await {
            tracing::warn!(key = %key, error = %e, "Failed to cache result");
        }
        Ok(value)
    }

    fn revalidate<T, F, Fut>(&self, key: String, fetch: F)
    where
        T: Serialize + Send + Sync + 'static,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
    {
        if !self.refreshing.lock().insert(key.clone()) {
            tracing::debug!(key = %key, "Revalidation already in flight");
            return;
        }
        let cache = self.clone();
        tokio::spawn(async move {
            match fetch().await {
                Ok(value) => {
                    if let Err(e) = cache.set(&key, &value).await {
                        tracing::warn!(key = %key, error = %e, "Failed to store revalidated entry");
                    }
                }
                Err(e) => tracing::warn!(key = %key, error = %e, "Background revalidation failed"),
            }
            cache.refreshing.lock().remove(&key);
        });
    }
}
