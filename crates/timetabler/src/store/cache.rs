//! TTL cache for saved-timetable listings.

use super::types::SavedTimetable;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Clone)]
struct CachedListing {
    timetables: Arc<Vec<SavedTimetable>>,
    cached_at: Instant,
    ttl: Duration,
}

impl CachedListing {
    fn is_fresh(&self) -> bool {
        self.cached_at.elapsed() < self.ttl
    }
}

/// Thread-safe cache of listings keyed by user id.
///
/// Any write through the store invalidates the writer's entry.
pub struct ListCache {
    entries: DashMap<String, CachedListing>,
    default_ttl: Duration,
}

impl ListCache {
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            default_ttl,
        }
    }

    /// Gets a cached listing if it exists and hasn't expired.
    pub fn get(&self, user_id: &str) -> Option<Arc<Vec<SavedTimetable>>> {
        self.entries.get(user_id).and_then(|entry| {
            if entry.is_fresh() {
                Some(entry.timetables.clone())
            } else {
                drop(entry);
                self.entries.remove(user_id);
                None
            }
        })
    }

    pub fn insert(&self, user_id: &str, timetables: Arc<Vec<SavedTimetable>>) {
        self.entries.insert(
            user_id.to_string(),
            CachedListing {
                timetables,
                cached_at: Instant::now(),
                ttl: self.default_ttl,
            },
        );
    }

    pub fn invalidate(&self, user_id: &str) {
        self.entries.remove(user_id);
    }

    /// Number of entries, including expired ones not yet evicted.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn cleanup_expired(&self) {
        self.entries.retain(|_, entry| entry.is_fresh());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GenerationResult;

    fn listing(title: &str) -> Arc<Vec<SavedTimetable>> {
        Arc::new(vec![SavedTimetable {
            id: "1".into(),
            created_at: None,
            user_id: None,
            result: GenerationResult::empty(title, 5, 8),
        }])
    }

    #[test]
    fn test_hit_and_invalidate() {
        let cache = ListCache::new(Duration::from_secs(60));
        cache.insert("u1", listing("a"));
        cache.insert("u2", listing("b"));

        assert_eq!(cache.get("u1").unwrap()[0].result.title, "a");
        cache.invalidate("u1");
        assert!(cache.get("u1").is_none());
        assert!(cache.get("u2").is_some());
    }

    #[test]
    fn test_expired_entries_evicted() {
        let cache = ListCache::new(Duration::ZERO);
        cache.insert("u1", listing("a"));
        assert_eq!(cache.len(), 1);
        assert!(cache.get("u1").is_none());
        assert!(cache.is_empty());

        cache.insert("u1", listing("a"));
        cache.cleanup_expired();
        assert!(cache.is_empty());
    }
}
