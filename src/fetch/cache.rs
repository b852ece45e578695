// src/fetch/cache.rs
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use tokio::time::Instant;

/// Key/value store for fetched pages. Keys are full URLs.
///
/// Implementations must accept concurrent calls for different keys.
pub trait PageCache: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn put(&self, key: &str, value: String, ttl_minutes: u64);
}

struct CacheEntry {
    html: String,
    expires_at: Instant,
}

/// In-process cache with per-entry expiry.
#[derive(Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries, expired ones included until they are purged.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every expired entry and returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.write();
        let before = entries.len();
        entries.retain(|_, entry| entry.expires_at > now);
        before - entries.len()
    }

    // A panic while holding the lock cannot leave an entry half-written.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, CacheEntry>> {
        self.entries.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, CacheEntry>> {
        self.entries.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl PageCache for MemoryCache {
    fn get(&self, key: &str) -> Option<String> {
        let now = Instant::now();
        {
            let entries = self.read();
            match entries.get(key) {
                Some(entry) if entry.expires_at > now => return Some(entry.html.clone()),
                Some(_) => {}
                None => return None,
            }
        }
        // Expired: evict unless another writer refreshed it meanwhile.
        let mut entries = self.write();
        if entries.get(key).is_some_and(|entry| entry.expires_at <= now) {
            entries.remove(key);
        }
        None
    }

    fn put(&self, key: &str, value: String, ttl_minutes: u64) {
        let ttl = Duration::from_secs(ttl_minutes.saturating_mul(60));
        let entry = CacheEntry { html: value, expires_at: Instant::now() + ttl };
        self.write().insert(key.to_string(), entry);
    }
}
