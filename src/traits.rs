//! Cache trait hierarchy.
//!
//! External collaborators (trace loaders, measurement harnesses) drive the
//! engine through these traits so they never depend on the concrete type:
//!
//! ```text
//!   ReadOnlyCache<K, V>      contains / len / is_empty / capacity
//!        │
//!   CoreCache<K, V>          insert / get / clear
//!        │
//!   MutableCache<K, V>       remove / remove_batch
//! ```
//!
//! The split keeps read-side instrumentation (`&self`) away from the
//! policy-updating operations (`&mut self`).

/// Read-side cache operations that never update policy state.
pub trait ReadOnlyCache<K, V> {
    /// Checks membership without updating access state.
    ///
    /// Implementations may report keys that are tracked but not currently
    /// readable (see the engine's ghost entries); this is membership, not
    /// availability.
    fn contains(&self, key: &K) -> bool;

    /// Returns the number of resident entries.
    fn len(&self) -> usize;

    /// Returns `true` if the cache holds no resident entries.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the maximum number of resident entries.
    fn capacity(&self) -> usize;
}

/// Core operations every cache supports.
///
/// # Example
///
/// ```
/// use fifokit::policy::s3_fifo::S3FifoCache;
/// use fifokit::traits::CoreCache;
///
/// fn warm_cache<C: CoreCache<u64, String>>(cache: &mut C, data: &[(u64, String)]) {
///     for (key, value) in data {
///         cache.insert(*key, value.clone());
///     }
/// }
///
/// let mut cache = S3FifoCache::new(100);
/// warm_cache(&mut cache, &[(1, "one".to_string()), (2, "two".to_string())]);
/// assert_eq!(cache.len(), 2);
/// ```
pub trait CoreCache<K, V>: ReadOnlyCache<K, V> {
    /// Inserts a key-value pair, returning the replaced value if the key
    /// was resident. May evict according to the cache's policy.
    fn insert(&mut self, key: K, value: V) -> Option<V>;

    /// Gets a reference to a value by key. May update internal policy
    /// state (e.g. a frequency counter).
    fn get(&mut self, key: &K) -> Option<&V>;

    /// Removes all entries.
    fn clear(&mut self);
}

/// Caches that support arbitrary key-based removal.
pub trait MutableCache<K, V>: CoreCache<K, V> {
    /// Removes a key, returning its value if one was resident.
    fn remove(&mut self, key: &K) -> Option<V>;

    /// Removes multiple keys, returning the removed values in input order.
    fn remove_batch(&mut self, keys: &[K]) -> Vec<Option<V>> {
        keys.iter().map(|k| self.remove(k)).collect()
    }
}
