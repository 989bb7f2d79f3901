// Copyright (c) 2025 - Cowboy AI, Inc.
//! Cross-Reference Cache
//!
//! A bounded, TTL-expiring map from an opaque provider link (usually a
//! canonical resource URL) to a small summary of the resource behind it.
//! One collection task writes summaries; concurrently running tasks read
//! them to resolve foreign links into normalized ids.
//!
//! # Semantics
//!
//! - `put` never fails. When the cache is full, expired entries are purged
//!   first; if it is still full the least recently touched entry goes.
//! - `get` never blocks on other tasks' work and treats an expired entry as
//!   absent, whether or not it has been purged yet.
//! - All operations take `&self`; the cache is shared as `Arc<CrossRefCache<V>>`.
//!
//! Time is read from `tokio::time::Instant`, so paused-clock tests control
//! expiry exactly.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;

/// Capacity used by collectors unless configured otherwise
pub const DEFAULT_CAPACITY: usize = 8192;

/// A cached summary that can resolve to a normalized id
pub trait CacheSummary: Clone + Send + Sync {
    /// Provider-assigned id of the summarized resource
    fn id(&self) -> &str;
}

#[derive(Debug)]
struct Entry<V> {
    value: V,
    expires_at: Instant,
    touched: u64,
}

impl<V> Entry<V> {
    fn is_live(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

#[derive(Debug)]
struct Inner<V> {
    entries: HashMap<String, Entry<V>>,
    /// touch counter -> link, oldest first
    recency: BTreeMap<u64, String>,
    clock: u64,
}

impl<V> Inner<V> {
    fn next_tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    fn remove(&mut self, link: &str) -> Option<Entry<V>> {
        let entry = self.entries.remove(link)?;
        self.recency.remove(&entry.touched);
        Some(entry)
    }

    fn purge_expired(&mut self, now: Instant) -> usize {
        let expired: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, e)| !e.is_live(now))
            .map(|(k, _)| k.clone())
            .collect();
        for link in &expired {
            self.remove(link);
        }
        expired.len()
    }

    fn evict_oldest(&mut self) -> Option<String> {
        let (_, link) = self.recency.pop_first()?;
        self.entries.remove(&link);
        Some(link)
    }
}

impl<V: Clone> Inner<V> {
    /// Mark a live entry most recently used and return its value
    fn touch(&mut self, link: &str) -> Option<V> {
        let touched = self.next_tick();
        let entry = self.entries.get_mut(link)?;
        let previous = std::mem::replace(&mut entry.touched, touched);
        let value = entry.value.clone();
        self.recency.remove(&previous);
        self.recency.insert(touched, link.to_string());
        Some(value)
    }
}

/// Bounded TTL + LRU cache keyed by provider link
#[derive(Debug)]
pub struct CrossRefCache<V> {
    inner: Mutex<Inner<V>>,
    capacity: usize,
}

impl<V: Clone> CrossRefCache<V> {
    /// Create a cache holding at most `capacity` entries (minimum 1)
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                entries: HashMap::new(),
                recency: BTreeMap::new(),
                clock: 0,
            }),
            capacity: capacity.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    // Poisoning is ignored: no operation leaves the two maps out of step.
    fn lock(&self) -> MutexGuard<'_, Inner<V>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert or overwrite `link`, restarting its TTL
    pub fn put(&self, link: impl Into<String>, value: V, ttl: Duration) {
        let link = link.into();
        let now = Instant::now();
        let mut inner = self.lock();

        if inner.remove(&link).is_none() && inner.entries.len() >= self.capacity {
            if inner.purge_expired(now) == 0 {
                if let Some(evicted) = inner.evict_oldest() {
                    tracing::trace!(link = %evicted, "cross-reference cache evicted entry");
                }
            }
        }

        let touched = inner.next_tick();
        inner.recency.insert(touched, link.clone());
        inner.entries.insert(
            link,
            Entry {
                value,
                expires_at: now + ttl,
                touched,
            },
        );
    }

    /// Look up `link`; expired entries are absent
    pub fn get(&self, link: &str) -> Option<V> {
        let now = Instant::now();
        let mut inner = self.lock();

        let live = inner.entries.get(link)?.is_live(now);
        if !live {
            inner.remove(link);
            return None;
        }
        inner.touch(link)
    }

    /// Number of unexpired entries
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.lock().entries.values().filter(|e| e.is_live(now)).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every unexpired `(link, value)` pair ordered by link. Each one is
    /// touched as by [`get`](Self::get), in that order.
    pub fn get_all(&self) -> Vec<(String, V)> {
        let now = Instant::now();
        let mut inner = self.lock();
        inner.purge_expired(now);

        let mut links: Vec<String> = inner.entries.keys().cloned().collect();
        links.sort();
        links
            .into_iter()
            .filter_map(|link| inner.touch(&link).map(|value| (link, value)))
            .collect()
    }
}

impl<V: CacheSummary> CrossRefCache<V> {
    /// Resolve `link` to the id of the cached resource
    pub fn resolve_id(&self, link: &str) -> Option<String> {
        self.get(link).map(|summary| summary.id().to_string())
    }
}

impl<V: Clone> Default for CrossRefCache<V> {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[derive(Debug, Clone, PartialEq)]
    struct Summary(String);

    impl CacheSummary for Summary {
        fn id(&self) -> &str {
            &self.0
        }
    }

    const TTL: Duration = Duration::from_secs(1200);

    #[tokio::test(start_paused = true)]
    async fn test_ttl_boundary() {
        let cache = CrossRefCache::new(16);
        cache.put("link", Summary("1".into()), TTL);

        tokio::time::advance(TTL - Duration::from_millis(1)).await;
        assert_eq!(cache.get("link"), Some(Summary("1".into())));

        tokio::time::advance(Duration::from_millis(2)).await;
        assert_eq!(cache.get("link"), None);
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_put_resets_ttl() {
        let cache = CrossRefCache::new(16);
        cache.put("link", Summary("1".into()), TTL);
        tokio::time::advance(TTL / 2).await;
        cache.put("link", Summary("2".into()), TTL);
        tokio::time::advance(TTL * 3 / 4).await;
        assert_eq!(cache.get("link"), Some(Summary("2".into())));
    }

    #[tokio::test]
    async fn test_capacity_evicts_least_recently_touched() {
        let cache = CrossRefCache::new(2);
        cache.put("a", Summary("a".into()), TTL);
        cache.put("b", Summary("b".into()), TTL);
        // touch "a" so "b" is now oldest
        assert!(cache.get("a").is_some());
        cache.put("c", Summary("c".into()), TTL);

        assert_eq!(cache.len(), 2);
        assert!(cache.get("b").is_none());
        assert!(cache.get("a").is_some());
        assert!(cache.get("c").is_some());
    }

    #[tokio::test]
    async fn test_get_all_touches_every_entry() {
        let cache = CrossRefCache::new(2);
        cache.put("b", Summary("b".into()), TTL);
        cache.put("a", Summary("a".into()), TTL);

        let all = cache.get_all();
        assert_eq!(all[0], ("a".to_string(), Summary("a".into())));
        assert_eq!(all.len(), 2);

        // read in link order, so "a" is now older than "b"
        cache.put("c", Summary("c".into()), TTL);
        assert!(cache.get("a").is_none());
        assert!(cache.get("b").is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_get_all_skips_expired() {
        let cache = CrossRefCache::new(4);
        cache.put("short", Summary("s".into()), Duration::from_secs(1));
        cache.put("long", Summary("l".into()), TTL);
        tokio::time::advance(Duration::from_secs(2)).await;

        let all = cache.get_all();
        assert_eq!(all, vec![("long".to_string(), Summary("l".into()))]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_full_cache_prefers_purging_expired() {
        let cache = CrossRefCache::new(2);
        cache.put("short", Summary("s".into()), Duration::from_secs(1));
        cache.put("long", Summary("l".into()), TTL);
        tokio::time::advance(Duration::from_secs(2)).await;

        cache.put("new", Summary("n".into()), TTL);
        assert!(cache.get("long").is_some());
        assert!(cache.get("new").is_some());
    }

    #[tokio::test]
    async fn test_overwrite_does_not_evict() {
        let cache = CrossRefCache::new(2);
        cache.put("a", Summary("1".into()), TTL);
        cache.put("b", Summary("2".into()), TTL);
        cache.put("a", Summary("3".into()), TTL);
        assert_eq!(cache.get("a"), Some(Summary("3".into())));
        assert_eq!(cache.get("b"), Some(Summary("2".into())));
    }

    #[tokio::test]
    async fn test_resolve_id_miss_is_none() {
        let cache: CrossRefCache<Summary> = CrossRefCache::default();
        assert_eq!(cache.resolve_id("https://example/never-cached"), None);
        cache.put("x", Summary("42".into()), TTL);
        assert_eq!(cache.resolve_id("x").as_deref(), Some("42"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_writers_and_readers() {
        let cache = Arc::new(CrossRefCache::new(64));
        let mut handles = Vec::new();
        for task in 0..8 {
            let cache = Arc::clone(&cache);
            handles.push(tokio::spawn(async move {
                for i in 0..100 {
                    let link = format!("link-{}", (task * 100 + i) % 128);
                    cache.put(link.clone(), Summary(link.clone()), TTL);
                    let _ = cache.get(&link);
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        assert!(cache.len() <= 64);
    }
}
