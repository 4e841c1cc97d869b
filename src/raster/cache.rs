use std::sync::{Arc, Mutex, OnceLock};

use ahash::AHashMap;

use crate::proj::TileId;

/// A run-lifetime memoization cache keyed by tile.
///
/// Each key owns a `OnceLock` slot: the first caller runs the initializer and
/// every concurrent caller for the same key blocks on that slot instead of
/// duplicating the work. Failed initializations are memoized as `None`, so a
/// dead tile is fetched once and sampled as absent thereafter. No eviction;
/// entries live as long as the cache.
pub struct TileCache<T> {
    slots: Mutex<AHashMap<TileId, Arc<OnceLock<Option<Arc<T>>>>>>,
}

impl<T> TileCache<T> {
    pub fn new() -> Self {
        Self { slots: Mutex::new(AHashMap::new()) }
    }

    /// Get the cached value for `tile`, or compute it with `init`.
    pub fn get_or_init(
        &self,
        tile: TileId,
        init: impl FnOnce() -> Option<Arc<T>>,
    ) -> Option<Arc<T>> {
        let slot = {
            let mut slots = self.slots.lock().expect("tile cache poisoned");
            slots.entry(tile).or_default().clone()
        };
        slot.get_or_init(init).clone()
    }

    /// Number of resolved or in-flight keys.
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.slots.lock().expect("tile cache poisoned").len()
    }
}

impl<T> Default for TileCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const KEY: TileId = TileId { z: 12, x: 3, y: 4 };

    #[test]
    fn identical_keys_initialize_once() {
        let cache = TileCache::<u32>::new();
        let calls = AtomicUsize::new(0);

        for _ in 0..10 {
            let value = cache.get_or_init(KEY, || {
                calls.fetch_add(1, Ordering::Relaxed);
                Some(Arc::new(7))
            });
            assert_eq!(value.as_deref(), Some(&7));
        }
        assert_eq!(calls.load(Ordering::Relaxed), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn failures_are_memoized() {
        let cache = TileCache::<u32>::new();
        let calls = AtomicUsize::new(0);

        for _ in 0..5 {
            let value = cache.get_or_init(KEY, || {
                calls.fetch_add(1, Ordering::Relaxed);
                None
            });
            assert!(value.is_none());
        }
        assert_eq!(calls.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn distinct_keys_are_independent() {
        let cache = TileCache::<u32>::new();
        let other = TileId { z: 12, x: 3, y: 5 };

        cache.get_or_init(KEY, || Some(Arc::new(1)));
        cache.get_or_init(other, || Some(Arc::new(2)));

        assert_eq!(cache.get_or_init(KEY, || None).as_deref(), Some(&1));
        assert_eq!(cache.get_or_init(other, || None).as_deref(), Some(&2));
    }
}
