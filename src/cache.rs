//! In-memory bitmap cache for decoded thumbnails.
//!
//! Decoding a thumbnail costs a bounds probe, a full decode, a rotation, and
//! a resize — far too much to repeat every time a grid cell scrolls back into
//! view. This module keeps decoded thumbnails in memory under a byte budget
//! so the grid can re-render from cache.
//!
//! # Design
//!
//! The cache is keyed by photo identifier and bounded by **bytes, not entry
//! count**: each entry costs its decoded pixel footprint (width × height × 4
//! for RGBA8). When an insert would exceed the budget, the least-recently
//! accessed entries are evicted until the new entry fits. There is no
//! explicit invalidation — entries leave only under capacity pressure.
//!
//! ## Idempotent insert
//!
//! `put` is an insert, not an update: if the key is already present the call
//! is a no-op and the existing value stays. Concurrent decodes for the same
//! key therefore race benignly — the first writer wins and the loser's work
//! is redundant, not harmful.
//!
//! ## Ownership
//!
//! The cache is an explicitly owned resource: one instance is constructed at
//! startup and handed (via `Arc`) to whatever needs it. There is no global
//! singleton, so tests substitute a fresh instance freely.

use image::RgbaImage;
use log::debug;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

/// Byte-budget LRU cache mapping photo identifiers to decoded thumbnails.
///
/// All mutation is serialized on an internal mutex; `get`/`put` are safe to
/// call from concurrent decode workers.
pub struct ThumbCache {
    inner: Mutex<CacheInner>,
    budget_bytes: usize,
}

struct CacheInner {
    entries: HashMap<String, Arc<RgbaImage>>,
    /// Access order, least recent at the front. Keys are unique.
    recency: VecDeque<String>,
    used_bytes: usize,
}

/// Decoded pixel footprint of a thumbnail (RGBA8).
fn cost(thumbnail: &RgbaImage) -> usize {
    thumbnail.as_raw().len()
}

impl ThumbCache {
    /// Create a cache with the given byte budget.
    pub fn new(budget_bytes: usize) -> Self {
        Self {
            inner: Mutex::new(CacheInner {
                entries: HashMap::new(),
                recency: VecDeque::new(),
                used_bytes: 0,
            }),
            budget_bytes,
        }
    }

    /// Look up a thumbnail. A hit counts as an access and promotes the
    /// entry to most-recently-used.
    pub fn get(&self, key: &str) -> Option<Arc<RgbaImage>> {
        let mut inner = self.inner.lock().unwrap();
        let hit = inner.entries.get(key).cloned()?;
        promote(&mut inner.recency, key);
        Some(hit)
    }

    /// Insert a thumbnail unless the key is already present.
    ///
    /// Evicts least-recently-accessed entries until the new entry fits the
    /// budget. An entry larger than the entire budget is not stored at all —
    /// the caller still holds its `Arc`, it just won't be reused.
    pub fn put(&self, key: &str, thumbnail: Arc<RgbaImage>) {
        let entry_cost = cost(&thumbnail);
        let mut inner = self.inner.lock().unwrap();

        if inner.entries.contains_key(key) {
            return;
        }
        if entry_cost > self.budget_bytes {
            debug!(
                "thumbnail {} ({} bytes) exceeds cache budget ({} bytes), not cached",
                key, entry_cost, self.budget_bytes
            );
            return;
        }

        while inner.used_bytes + entry_cost > self.budget_bytes {
            let Some(victim) = inner.recency.pop_front() else {
                break;
            };
            if let Some(evicted) = inner.entries.remove(&victim) {
                inner.used_bytes -= cost(&evicted);
                debug!("evicted thumbnail {} from cache", victim);
            }
        }

        inner.used_bytes += entry_cost;
        inner.recency.push_back(key.to_string());
        inner.entries.insert(key.to_string(), thumbnail);
    }

    /// Number of cached thumbnails.
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bytes currently held by cached thumbnails.
    pub fn used_bytes(&self) -> usize {
        self.inner.lock().unwrap().used_bytes
    }

    /// The configured byte budget.
    pub fn budget_bytes(&self) -> usize {
        self.budget_bytes
    }
}

/// Move `key` to the most-recently-used position.
fn promote(recency: &mut VecDeque<String>, key: &str) {
    if let Some(pos) = recency.iter().position(|k| k == key) {
        let key = recency.remove(pos).unwrap();
        recency.push_back(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A solid-color RGBA thumbnail; cost is w * h * 4 bytes.
    fn thumb(width: u32, height: u32, shade: u8) -> Arc<RgbaImage> {
        Arc::new(RgbaImage::from_pixel(
            width,
            height,
            image::Rgba([shade, shade, shade, 255]),
        ))
    }

    // =========================================================================
    // Basic get/put
    // =========================================================================

    #[test]
    fn get_missing_key_is_none() {
        let cache = ThumbCache::new(1024);
        assert!(cache.get("nope").is_none());
    }

    #[test]
    fn put_then_get_returns_value() {
        let cache = ThumbCache::new(1024);
        cache.put("a", thumb(4, 4, 10));
        let hit = cache.get("a").unwrap();
        assert_eq!(hit.dimensions(), (4, 4));
        assert_eq!(cache.used_bytes(), 4 * 4 * 4);
    }

    #[test]
    fn put_is_idempotent_first_writer_wins() {
        let cache = ThumbCache::new(1024);
        cache.put("k", thumb(2, 2, 1));
        cache.put("k", thumb(2, 2, 99));

        let hit = cache.get("k").unwrap();
        assert_eq!(hit.get_pixel(0, 0)[0], 1, "second put must not replace");
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.used_bytes(), 2 * 2 * 4);
    }

    // =========================================================================
    // Budget and eviction
    // =========================================================================

    #[test]
    fn never_exceeds_budget() {
        // Budget fits exactly two 4x4 entries (64 bytes each)
        let cache = ThumbCache::new(128);
        cache.put("a", thumb(4, 4, 1));
        cache.put("b", thumb(4, 4, 2));
        cache.put("c", thumb(4, 4, 3));

        assert!(cache.used_bytes() <= 128);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn evicts_least_recently_accessed_first() {
        let cache = ThumbCache::new(128);
        cache.put("a", thumb(4, 4, 1));
        cache.put("b", thumb(4, 4, 2));

        // Touch "a" so "b" becomes the LRU victim
        cache.get("a").unwrap();
        cache.put("c", thumb(4, 4, 3));

        assert!(cache.get("a").is_some());
        assert!(cache.get("b").is_none(), "LRU entry should be evicted");
        assert!(cache.get("c").is_some());
    }

    #[test]
    fn eviction_frees_enough_for_large_entry() {
        let cache = ThumbCache::new(256);
        cache.put("a", thumb(4, 4, 1)); // 64
        cache.put("b", thumb(4, 4, 2)); // 64
        cache.put("c", thumb(4, 4, 3)); // 64

        // 192 bytes needs two evictions on a 256 budget with 192 used
        cache.put("big", thumb(4, 12, 4));

        assert!(cache.used_bytes() <= 256);
        assert!(cache.get("big").is_some());
        assert!(cache.get("a").is_none());
        assert!(cache.get("b").is_none());
        assert!(cache.get("c").is_some());
    }

    #[test]
    fn entry_larger_than_budget_is_not_stored() {
        let cache = ThumbCache::new(64);
        cache.put("huge", thumb(10, 10, 1)); // 400 bytes

        assert!(cache.get("huge").is_none());
        assert_eq!(cache.used_bytes(), 0);
    }

    #[test]
    fn idempotent_put_does_not_evict() {
        let cache = ThumbCache::new(128);
        cache.put("a", thumb(4, 4, 1));
        cache.put("b", thumb(4, 4, 2));

        // Re-putting an existing key must be a no-op, not an insert that
        // pushes something out.
        cache.put("a", thumb(4, 4, 50));

        assert_eq!(cache.len(), 2);
        assert!(cache.get("b").is_some());
    }

    // =========================================================================
    // Concurrency
    // =========================================================================

    #[test]
    fn concurrent_racers_for_one_key_first_insert_wins() {
        let cache = Arc::new(ThumbCache::new(1024 * 1024));
        let mut handles = Vec::new();

        for shade in 0..8u8 {
            let cache = Arc::clone(&cache);
            handles.push(std::thread::spawn(move || {
                cache.put("contested", thumb(8, 8, shade));
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(cache.len(), 1);
        // Whichever racer won, the entry is internally consistent
        let hit = cache.get("contested").unwrap();
        assert_eq!(hit.dimensions(), (8, 8));
    }

    #[test]
    fn concurrent_mixed_access_stays_within_budget() {
        let cache = Arc::new(ThumbCache::new(512));
        let mut handles = Vec::new();

        for i in 0..4 {
            let cache = Arc::clone(&cache);
            handles.push(std::thread::spawn(move || {
                for j in 0..32u32 {
                    let key = format!("{}-{}", i, j % 8);
                    cache.put(&key, thumb(4, 4, j as u8));
                    cache.get(&key);
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        assert!(cache.used_bytes() <= 512);
    }
}
