//! Element cache keyed by logical locator name.
//!
//! A correctness cache, not a memory-bounded one: it avoids re-querying the
//! session for an element that was already found. An entry is assumed fresh
//! until using it raises a staleness fault, at which point the step-down
//! classifier removes it. There is no other eviction.

use crate::driver::ElementHandle;
use crate::locator::Platform;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// Concurrent name → handle map
#[derive(Debug, Default)]
pub struct ElementCache {
    entries: RwLock<HashMap<String, ElementHandle>>,
}

impl ElementCache {
    /// Create an empty cache
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache `handle` under `name`, replacing any previous entry
    pub fn put(&self, name: &str, handle: ElementHandle) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.to_string(), handle);
        tracing::debug!(locator = name, "cached element");
    }

    /// Get the cached handle for `name`
    #[must_use]
    pub fn get(&self, name: &str) -> Option<ElementHandle> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    /// Remove the entry for `name`, returning it
    pub fn remove(&self, name: &str) -> Option<ElementHandle> {
        let removed = self
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(name);
        if removed.is_some() {
            tracing::debug!(locator = name, "removed element from cache");
        }
        removed
    }

    /// Check whether `name` is cached
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }

    /// Drop every entry
    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        tracing::info!("cleared element cache");
    }

    /// Drop every entry that belongs to `platform`'s session
    pub fn remove_platform(&self, platform: Platform) -> usize {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let before = entries.len();
        entries.retain(|_, handle| handle.platform() != platform);
        let removed = before - entries.len();
        tracing::debug!(%platform, removed, "removed platform entries from cache");
        removed
    }

    /// Number of cached entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Check if empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::sync::Arc;
    use std::thread;

    fn handle(id: &str) -> ElementHandle {
        ElementHandle::new(id, Platform::Web)
    }

    #[test]
    fn test_put_get() {
        let cache = ElementCache::new();
        cache.put("login", handle("e1"));
        assert_eq!(cache.get("login"), Some(handle("e1")));
        assert!(cache.contains("login"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_put_replaces() {
        let cache = ElementCache::new();
        cache.put("login", handle("e1"));
        cache.put("login", handle("e2"));
        assert_eq!(cache.get("login"), Some(handle("e2")));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_remove() {
        let cache = ElementCache::new();
        cache.put("login", handle("e1"));
        assert_eq!(cache.remove("login"), Some(handle("e1")));
        assert!(!cache.contains("login"));
        assert_eq!(cache.remove("login"), None);
    }

    #[test]
    fn test_clear() {
        let cache = ElementCache::new();
        cache.put("a", handle("1"));
        cache.put("b", handle("2"));
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_remove_platform_keeps_others() {
        let cache = ElementCache::new();
        cache.put("web", handle("1"));
        cache.put("ios", ElementHandle::new("2", Platform::Ios));
        assert_eq!(cache.remove_platform(Platform::Web), 1);
        assert!(cache.contains("ios"));
        assert!(!cache.contains("web"));
    }

    #[test]
    fn test_concurrent_writers_and_readers() {
        let cache = Arc::new(ElementCache::new());
        let workers: Vec<_> = (0..8)
            .map(|t| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    for i in 0..200 {
                        let name = format!("loc-{}", i % 16);
                        cache.put(&name, ElementHandle::new(format!("{t}-{i}"), Platform::Web));
                        if let Some(h) = cache.get(&name) {
                            assert!(h.id().contains('-'));
                        }
                        if i % 7 == 0 {
                            cache.remove(&name);
                        }
                    }
                })
            })
            .collect();
        for w in workers {
            w.join().unwrap();
        }
        assert!(cache.len() <= 16);
    }

    proptest! {
        #[test]
        fn prop_cache_matches_hashmap(ops in proptest::collection::vec((0u8..3, 0u8..6), 0..64)) {
            let cache = ElementCache::new();
            let mut model: HashMap<String, ElementHandle> = HashMap::new();
            for (i, (op, key)) in ops.into_iter().enumerate() {
                let name = format!("k{key}");
                match op {
                    0 => {
                        let h = handle(&i.to_string());
                        cache.put(&name, h.clone());
                        model.insert(name.clone(), h);
                    }
                    1 => {
                        prop_assert_eq!(cache.remove(&name), model.remove(&name));
                    }
                    _ => {
                        prop_assert_eq!(cache.get(&name), model.get(&name).cloned());
                    }
                }
                prop_assert_eq!(cache.contains(&name), model.contains_key(&name));
            }
            prop_assert_eq!(cache.len(), model.len());
        }
    }
}
