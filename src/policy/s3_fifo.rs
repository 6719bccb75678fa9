//! S3-FIFO (Simple, Scalable, Scan-resistant FIFO) cache engine.
//!
//! Three FIFO queues share one arena of entry records. New keys enter the
//! probationary Small queue. When the cache overflows, the back of Small
//! is drained: entries that were read while probationary promote into the
//! protected Main queue, the first one that was never read demotes to the
//! Ghost queue with its value dropped. Ghost records keep their key in the
//! lookup table, so a reinsert of a recently evicted key is admitted
//! straight into Main. Main evicts by aging: a popped entry with remaining
//! frequency is requeued with the counter decremented, and only a
//! frequency-0 entry leaves the table for good.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      S3FifoCache<K, V> layout                       │
//! │                                                                     │
//! │   map: FxHashMap<K, SlotId>      arena: SlotArena<Entry<K, V>>      │
//! │   ┌──────────┬──────────┐        ┌─────┬─────────────────────────┐  │
//! │   │   Key    │  SlotId  │        │ Idx │ key, value, tier, freq, │  │
//! │   ├──────────┼──────────┤        │     │ prev/next links         │  │
//! │   │  "pg_1"  │   id(0)  │───────►│  0  │ pg_1, Some(..), Small   │  │
//! │   │  "pg_2"  │   id(1)  │───────►│  1  │ pg_2, Some(..), Main    │  │
//! │   │  "pg_3"  │   id(2)  │───────►│  2  │ pg_3, None,     Ghost   │  │
//! │   └──────────┴──────────┘        └─────┴─────────────────────────┘  │
//! │                                                                     │
//! │   SMALL: front ──► ... ──► back     (10% of capacity)               │
//! │   MAIN:  front ──► ... ──► back     (capacity - small limit)        │
//! │   GHOST: front ──► ... ──► back     (capacity, keys only)           │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `len()` counts Small + Main residents only. Ghost records are tracked
//! but not readable: `contains` reports them, `get` does not.
//!
//! ## Example Usage
//!
//! ```
//! use fifokit::policy::s3_fifo::S3FifoCache;
//!
//! let mut cache: S3FifoCache<String, String> = S3FifoCache::new(100);
//!
//! cache.insert("page1".to_string(), "content1".to_string());
//! cache.insert("page2".to_string(), "content2".to_string());
//!
//! assert_eq!(cache.get(&"page1".to_string()), Some(&"content1".to_string()));
//!
//! for i in 0..150 {
//!     cache.insert(format!("scan_{}", i), format!("data_{}", i));
//! }
//!
//! assert_eq!(cache.len(), 100);
//! ```

use std::fmt::Debug;
use std::hash::Hash;

use rustc_hash::FxHashMap;

use crate::ds::{Chained, FifoLinks, FifoQueue, SlotArena, SlotId};
use crate::error::ConfigError;
use crate::traits::{CoreCache, MutableCache, ReadOnlyCache};

/// Frequency counter ceiling (2 bits).
const MAX_FREQ: u8 = 3;

/// Which queue currently owns an entry.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum Tier {
    Small,
    Main,
    Ghost,
}

/// Internal entry record.
///
/// `value` is `Some` exactly while the entry is Small or Main; demotion to
/// Ghost drops the value and keeps only the key. The links belong to
/// whichever queue the tier tag names.
struct Entry<K, V> {
    key: K,
    value: Option<V>,
    tier: Tier,
    freq: u8,
    links: FifoLinks,
}

impl<K, V> Chained for Entry<K, V> {
    fn links(&self) -> FifoLinks {
        self.links
    }

    fn links_mut(&mut self) -> &mut FifoLinks {
        &mut self.links
    }
}

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

/// Operation counters for the engine.
#[cfg(feature = "metrics")]
#[derive(Debug, Clone, Default)]
#[non_exhaustive]
pub struct S3FifoMetrics {
    /// Number of `get` calls that returned a value.
    pub hits: u64,
    /// Number of `get` calls that missed (absent key or ghost).
    pub misses: u64,
    /// Number of insertions of previously unknown keys.
    pub inserts: u64,
    /// Number of in-place value updates (key already resident).
    pub updates: u64,
    /// Number of ghost keys readmitted into Main by `insert`.
    pub readmissions: u64,
    /// Number of Small entries promoted into Main at eviction time.
    pub promotions: u64,
    /// Number of Small entries demoted to Ghost.
    pub demotions: u64,
    /// Number of Main entries requeued with a decremented counter.
    pub agings: u64,
    /// Number of entries evicted out of Main.
    pub main_evictions: u64,
    /// Number of ghosts dropped because the Ghost queue overflowed.
    pub ghost_evictions: u64,
}

#[cfg(feature = "metrics")]
impl std::fmt::Display for S3FifoMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let total_accesses = self.hits + self.misses;
        let hit_rate = if total_accesses > 0 {
            (self.hits as f64 / total_accesses as f64) * 100.0
        } else {
            0.0
        };

        write!(
            f,
            "S3FifoMetrics {{ hits: {}, misses: {}, hit_rate: {:.2}%, inserts: {}, updates: {}, \
             readmissions: {}, promotions: {}, demotions: {}, agings: {}, main_evictions: {}, \
             ghost_evictions: {} }}",
            self.hits,
            self.misses,
            hit_rate,
            self.inserts,
            self.updates,
            self.readmissions,
            self.promotions,
            self.demotions,
            self.agings,
            self.main_evictions,
            self.ghost_evictions
        )
    }
}

// ---------------------------------------------------------------------------
// Iterators
// ---------------------------------------------------------------------------

/// Iterator over resident entries (Small front to back, then Main).
///
/// Ghost records never surface here.
pub struct Iter<'a, K, V> {
    arena: &'a SlotArena<Entry<K, V>>,
    current: Option<SlotId>,
    main_head: Option<SlotId>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        while self.remaining > 0 {
            match self.current {
                Some(id) => {
                    let entry = self.arena.get(id).expect("iterator: stale SlotId");
                    self.current = entry.links.next();
                    self.remaining -= 1;
                    let value = entry.value.as_ref().expect("resident entry without value");
                    return Some((&entry.key, value));
                },
                None => match self.main_head.take() {
                    Some(id) => self.current = Some(id),
                    None => return None,
                },
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {
    fn len(&self) -> usize {
        self.remaining
    }
}

impl<K, V> std::iter::FusedIterator for Iter<'_, K, V> {}

impl<K, V> Debug for Iter<'_, K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Iter")
            .field("remaining", &self.remaining)
            .finish()
    }
}

/// Iterator over resident keys.
pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V> std::iter::FusedIterator for Keys<'_, K, V> {}

impl<K, V> Debug for Keys<'_, K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Keys")
            .field("remaining", &self.inner.remaining)
            .finish()
    }
}

/// Iterator over resident values.
pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V> std::iter::FusedIterator for Values<'_, K, V> {}

impl<K, V> Debug for Values<'_, K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Values")
            .field("remaining", &self.inner.remaining)
            .finish()
    }
}

/// Consuming iterator over resident entries.
///
/// Ghost records are dropped with the arena; only Small and Main entries
/// are yielded.
pub struct IntoIter<K, V> {
    arena: SlotArena<Entry<K, V>>,
    current: Option<SlotId>,
    main_head: Option<SlotId>,
    remaining: usize,
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        while self.remaining > 0 {
            let id = match self.current {
                Some(id) => id,
                None => match self.main_head.take() {
                    Some(id) => {
                        self.current = Some(id);
                        id
                    },
                    None => return None,
                },
            };
            let entry = self.arena.remove(id).expect("into_iter: stale SlotId");
            self.current = entry.links.next();
            self.remaining -= 1;
            let value = entry.value.expect("resident entry without value");
            return Some((entry.key, value));
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {
    fn len(&self) -> usize {
        self.remaining
    }
}

impl<K, V> std::iter::FusedIterator for IntoIter<K, V> {}

impl<K, V> Debug for IntoIter<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntoIter")
            .field("remaining", &self.remaining)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// S3FifoCache
// ---------------------------------------------------------------------------

/// S3-FIFO cache with arena-backed storage and ghost-guided readmission.
///
/// One [`SlotArena`] holds every entry record; the Small, Main, and Ghost
/// queues thread disjoint subsets of it through intrusive links. A record
/// changes queue by relinking, never by reallocation. Ghost records keep
/// their key in the lookup table with the value dropped, which makes
/// [`contains`](Self::contains) report them while [`get`](Self::get)
/// misses: membership, not availability.
///
/// Limits derived from `capacity`: Small holds up to `capacity / 10`
/// (floored, possibly 0), Ghost up to `capacity`, Main the remainder.
///
/// # Type Parameters
///
/// - `K`: Key type, must be `Clone + Eq + Hash`
/// - `V`: Value type
///
/// # Example
///
/// ```
/// use fifokit::policy::s3_fifo::S3FifoCache;
///
/// let mut cache: S3FifoCache<u64, u64> = S3FifoCache::new(10);
/// for key in 0..=10 {
///     cache.insert(key, key * 100);
/// }
///
/// // The first cold entry is now a ghost: tracked, but not readable.
/// assert_eq!(cache.len(), 10);
/// assert!(cache.contains(&0));
/// assert_eq!(cache.get(&0), None);
/// ```
pub struct S3FifoCache<K, V> {
    /// Entry storage shared by all three queues.
    arena: SlotArena<Entry<K, V>>,

    /// Key -> SlotId mapping; covers ghosts too.
    map: FxHashMap<K, SlotId>,

    small: FifoQueue,
    main: FifoQueue,
    ghost: FifoQueue,

    /// Resident count (Small + Main; ghosts excluded).
    countable: usize,

    capacity: usize,
    limit_small: usize,
    limit_main: usize,
    limit_ghost: usize,

    #[cfg(feature = "metrics")]
    metrics: S3FifoMetrics,
}

impl<K, V> Default for S3FifoCache<K, V>
where
    K: Clone + Eq + Hash,
{
    /// Creates a cache with default capacity of 128.
    fn default() -> Self {
        Self::new(128)
    }
}

impl<K, V> S3FifoCache<K, V>
where
    K: Clone + Eq + Hash,
{
    /// Creates a new S3-FIFO cache with the specified capacity.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        match Self::try_new(capacity) {
            Ok(cache) => cache,
            Err(e) => panic!("{}", e),
        }
    }

    /// Creates a new cache, returning an error instead of panicking on an
    /// invalid capacity.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `capacity` is zero.
    pub fn try_new(capacity: usize) -> Result<Self, ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::new("cache capacity must be greater than zero"));
        }

        let limit_small = capacity / 10;

        Ok(Self {
            arena: SlotArena::with_capacity(capacity),
            map: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            small: FifoQueue::new(),
            main: FifoQueue::new(),
            ghost: FifoQueue::new(),
            countable: 0,
            capacity,
            limit_small,
            limit_main: capacity - limit_small,
            limit_ghost: capacity,
            #[cfg(feature = "metrics")]
            metrics: S3FifoMetrics::default(),
        })
    }

    /// Returns the number of resident entries (Small + Main).
    ///
    /// Ghost records are excluded even though [`contains`](Self::contains)
    /// reports them.
    #[inline]
    pub fn len(&self) -> usize {
        self.countable
    }

    /// Returns `true` if no entries are resident.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.countable == 0
    }

    /// Returns the cache capacity.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of entries in the Small queue.
    #[inline]
    pub fn small_len(&self) -> usize {
        self.small.len()
    }

    /// Returns the maximum length of the Small queue.
    #[inline]
    pub fn small_capacity(&self) -> usize {
        self.limit_small
    }

    /// Returns the number of entries in the Main queue.
    #[inline]
    pub fn main_len(&self) -> usize {
        self.main.len()
    }

    /// Returns the number of ghost records.
    #[inline]
    pub fn ghost_len(&self) -> usize {
        self.ghost.len()
    }

    /// Returns `true` if the key is tracked, ghosts included.
    ///
    /// This is membership, not availability: a ghost key answers `true`
    /// here while [`get`](Self::get) misses on it.
    ///
    /// # Example
    ///
    /// ```
    /// use fifokit::policy::s3_fifo::S3FifoCache;
    ///
    /// let mut cache = S3FifoCache::new(1);
    /// cache.insert("a", 1);
    /// cache.insert("b", 2);
    ///
    /// // "a" was demoted to Ghost, not forgotten.
    /// assert!(cache.contains(&"a"));
    /// assert_eq!(cache.get(&"a"), None);
    /// ```
    #[inline]
    pub fn contains(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    /// Retrieves a value by key without touching the frequency counter.
    ///
    /// Ghosts carry no value and return `None`.
    #[inline]
    pub fn peek(&self, key: &K) -> Option<&V> {
        let &id = self.map.get(key)?;
        let entry = self.arena.get(id).expect("map/arena out of sync");
        entry.value.as_ref()
    }

    /// Retrieves a value by key, bumping its frequency (saturating at 3).
    ///
    /// A ghost key is a miss. No structural movement happens on a hit.
    #[inline]
    pub fn get(&mut self, key: &K) -> Option<&V> {
        let id = match self.map.get(key) {
            Some(&id) => id,
            None => {
                #[cfg(feature = "metrics")]
                {
                    self.metrics.misses += 1;
                }
                return None;
            },
        };

        let entry = self.arena.get_mut(id).expect("map/arena out of sync");
        if entry.tier == Tier::Ghost {
            #[cfg(feature = "metrics")]
            {
                self.metrics.misses += 1;
            }
            return None;
        }

        #[cfg(feature = "metrics")]
        {
            self.metrics.hits += 1;
        }

        if entry.freq < MAX_FREQ {
            entry.freq += 1;
        }
        entry.value.as_ref()
    }

    /// Retrieves a mutable reference to a value, bumping its frequency.
    #[inline]
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let id = match self.map.get(key) {
            Some(&id) => id,
            None => {
                #[cfg(feature = "metrics")]
                {
                    self.metrics.misses += 1;
                }
                return None;
            },
        };

        let entry = self.arena.get_mut(id).expect("map/arena out of sync");
        if entry.tier == Tier::Ghost {
            #[cfg(feature = "metrics")]
            {
                self.metrics.misses += 1;
            }
            return None;
        }

        #[cfg(feature = "metrics")]
        {
            self.metrics.hits += 1;
        }

        if entry.freq < MAX_FREQ {
            entry.freq += 1;
        }
        entry.value.as_mut()
    }

    /// Inserts or updates a key-value pair, returning the replaced value
    /// if the key was resident.
    ///
    /// - Ghost key: readmitted straight into Main with the new value.
    /// - Resident key: value replaced in place, no movement, no frequency
    ///   change.
    /// - Unknown key: enters the front of Small with frequency 0.
    ///
    /// If the insert pushed the resident count past capacity, one entry is
    /// surrendered: the overflow drains the back of Small (promoting warm
    /// entries to Main on the way) or ages the back of Main.
    ///
    /// # Example
    ///
    /// ```
    /// use fifokit::policy::s3_fifo::S3FifoCache;
    ///
    /// let mut cache = S3FifoCache::new(10);
    /// assert_eq!(cache.insert("key", 1), None);
    /// assert_eq!(cache.insert("key", 2), Some(1));
    /// assert_eq!(cache.get(&"key"), Some(&2));
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        if let Some(&id) = self.map.get(&key) {
            let tier = self.arena.get(id).expect("map/arena out of sync").tier;
            let replaced = if tier == Tier::Ghost {
                #[cfg(feature = "metrics")]
                {
                    self.metrics.readmissions += 1;
                }
                // Recently evicted and wanted again: straight into Main.
                self.ghost.remove(&mut self.arena, id);
                let entry = self.arena.get_mut(id).expect("map/arena out of sync");
                entry.tier = Tier::Main;
                entry.value = Some(value);
                self.main.push_front(&mut self.arena, id);
                self.countable += 1;
                None
            } else {
                #[cfg(feature = "metrics")]
                {
                    self.metrics.updates += 1;
                }
                let entry = self.arena.get_mut(id).expect("map/arena out of sync");
                entry.value.replace(value)
            };
            self.evict_if_needed();
            return replaced;
        }

        #[cfg(feature = "metrics")]
        {
            self.metrics.inserts += 1;
        }

        let id = self.arena.insert(Entry {
            key: key.clone(),
            value: Some(value),
            tier: Tier::Small,
            freq: 0,
            links: FifoLinks::default(),
        });
        self.map.insert(key, id);
        self.small.push_front(&mut self.arena, id);
        self.countable += 1;

        self.evict_if_needed();
        None
    }

    /// Removes a key from whichever queue owns it.
    ///
    /// Returns the value if the key was resident; removing a ghost returns
    /// `None` but still forgets the key. No-op for unknown keys.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let id = self.map.remove(key)?;
        let tier = self.arena.get(id).expect("map/arena out of sync").tier;

        match tier {
            Tier::Small => {
                self.small.remove(&mut self.arena, id);
                self.countable -= 1;
            },
            Tier::Main => {
                self.main.remove(&mut self.arena, id);
                self.countable -= 1;
            },
            Tier::Ghost => {
                self.ghost.remove(&mut self.arena, id);
            },
        }

        let entry = self.arena.remove(id).expect("map/arena out of sync");
        entry.value
    }

    /// Clears all entries, ghosts included.
    pub fn clear(&mut self) {
        self.arena.clear();
        self.map.clear();
        self.small.clear();
        self.main.clear();
        self.ghost.clear();
        self.countable = 0;
    }

    /// Returns an iterator over resident entries (Small first, then Main).
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            arena: &self.arena,
            current: self.small.front(),
            main_head: self.main.front(),
            remaining: self.countable,
        }
    }

    /// Returns an iterator over resident keys.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    /// Returns an iterator over resident values.
    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    /// Returns operation counters.
    #[cfg(feature = "metrics")]
    #[inline]
    pub fn metrics(&self) -> &S3FifoMetrics {
        &self.metrics
    }

    /// Resets operation counters to zero.
    #[cfg(feature = "metrics")]
    #[inline]
    pub fn reset_metrics(&mut self) {
        self.metrics = S3FifoMetrics::default();
    }

    // -----------------------------------------------------------------------
    // Eviction
    // -----------------------------------------------------------------------

    /// Runs one eviction pass if the resident count exceeds capacity.
    ///
    /// The count is decremented up front: the pass below vacates exactly
    /// one resident slot, and promotions along the way must not be
    /// double-counted.
    fn evict_if_needed(&mut self) {
        if self.countable > self.capacity {
            self.countable -= 1;

            if self.small.len() > self.limit_small {
                self.evict_small();
            } else {
                self.evict_main();
            }
        }
    }

    /// Drains the back of Small until the first cold entry.
    ///
    /// Warm entries (read at least once while probationary) promote to the
    /// front of Main with their counter reset; a Main overflow cascades
    /// into [`evict_main`](Self::evict_main) and ends the pass. The first
    /// cold entry demotes to Ghost (value dropped, key retained) and ends
    /// the pass, trimming the oldest ghost out of the table if the Ghost
    /// queue overflowed.
    fn evict_small(&mut self) {
        while !self.small.is_empty() {
            let id = self
                .small
                .pop_back(&mut self.arena)
                .expect("small queue size out of sync");
            let entry = self.arena.get_mut(id).expect("map/arena out of sync");

            if entry.freq >= 1 {
                entry.freq = 0;
                entry.tier = Tier::Main;
                self.main.push_front(&mut self.arena, id);
                #[cfg(feature = "metrics")]
                {
                    self.metrics.promotions += 1;
                }

                if self.main.len() > self.limit_main {
                    self.evict_main();
                    return;
                }
            } else {
                entry.value = None;
                entry.tier = Tier::Ghost;
                entry.freq = 0;
                self.ghost.push_front(&mut self.arena, id);
                #[cfg(feature = "metrics")]
                {
                    self.metrics.demotions += 1;
                }

                if self.ghost.len() > self.limit_ghost {
                    let oldest = self
                        .ghost
                        .pop_back(&mut self.arena)
                        .expect("ghost queue size out of sync");
                    let evicted = self.arena.remove(oldest).expect("map/arena out of sync");
                    self.map.remove(&evicted.key);
                    #[cfg(feature = "metrics")]
                    {
                        self.metrics.ghost_evictions += 1;
                    }
                }
                return;
            }
        }
    }

    /// Pops the back of Main until the first frequency-0 entry, which is
    /// evicted for good. Entries with remaining frequency are requeued at
    /// the front with the counter decremented, surviving one more round.
    fn evict_main(&mut self) {
        while !self.main.is_empty() {
            let id = self
                .main
                .pop_back(&mut self.arena)
                .expect("main queue size out of sync");
            let entry = self.arena.get_mut(id).expect("map/arena out of sync");

            if entry.freq >= 1 {
                entry.freq -= 1;
                self.main.push_front(&mut self.arena, id);
                #[cfg(feature = "metrics")]
                {
                    self.metrics.agings += 1;
                }
            } else {
                let evicted = self.arena.remove(id).expect("map/arena out of sync");
                self.map.remove(&evicted.key);
                #[cfg(feature = "metrics")]
                {
                    self.metrics.main_evictions += 1;
                }
                return;
            }
        }
    }

    // -----------------------------------------------------------------------
    // Invariants
    // -----------------------------------------------------------------------

    /// Validates internal invariants (debug-only).
    #[cfg(debug_assertions)]
    pub fn check_invariants(&self) -> Result<(), crate::error::InvariantError>
    where
        K: Debug,
    {
        use crate::error::InvariantError;

        let resident = self.small.len() + self.main.len();
        if self.countable != resident {
            return Err(InvariantError::new(format!(
                "resident count {} != small {} + main {}",
                self.countable,
                self.small.len(),
                self.main.len()
            )));
        }
        if self.map.len() != resident + self.ghost.len() {
            return Err(InvariantError::new(format!(
                "map size {} != small {} + main {} + ghost {}",
                self.map.len(),
                self.small.len(),
                self.main.len(),
                self.ghost.len()
            )));
        }
        if self.countable > self.capacity {
            return Err(InvariantError::new(format!(
                "resident count {} > capacity {}",
                self.countable, self.capacity
            )));
        }

        self.check_queue("Small", &self.small, Tier::Small)?;
        self.check_queue("Main", &self.main, Tier::Main)?;
        self.check_queue("Ghost", &self.ghost, Tier::Ghost)?;
        Ok(())
    }

    #[cfg(debug_assertions)]
    fn check_queue(
        &self,
        name: &str,
        queue: &FifoQueue,
        tier: Tier,
    ) -> Result<(), crate::error::InvariantError>
    where
        K: Debug,
    {
        use crate::error::InvariantError;

        let mut count = 0usize;
        let mut current = queue.front();
        let mut prev: Option<SlotId> = None;
        while let Some(id) = current {
            count += 1;
            if count > self.map.len() {
                return Err(InvariantError::new(format!("{} queue: link cycle", name)));
            }
            let entry = self.arena.get(id).ok_or_else(|| {
                InvariantError::new(format!("{} queue: stale SlotId {:?}", name, id))
            })?;
            if entry.tier != tier {
                return Err(InvariantError::new(format!(
                    "{} queue: entry {:?} has tier {:?}",
                    name, entry.key, entry.tier
                )));
            }
            if entry.value.is_some() == (tier == Tier::Ghost) {
                return Err(InvariantError::new(format!(
                    "{} queue: entry {:?} value presence contradicts tier",
                    name, entry.key
                )));
            }
            if entry.links.prev() != prev {
                return Err(InvariantError::new(format!(
                    "{} queue: entry {:?} prev link inconsistent",
                    name, entry.key
                )));
            }
            if self.map.get(&entry.key) != Some(&id) {
                return Err(InvariantError::new(format!(
                    "{} queue: entry {:?} not mapped to its slot",
                    name, entry.key
                )));
            }
            prev = Some(id);
            current = entry.links.next();
        }
        if count != queue.len() {
            return Err(InvariantError::new(format!(
                "{} queue: counted {} but len = {}",
                name,
                count,
                queue.len()
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Std trait implementations
// ---------------------------------------------------------------------------

impl<K, V> FromIterator<(K, V)> for S3FifoCache<K, V>
where
    K: Clone + Eq + Hash,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let iter = iter.into_iter();
        let (lower, _) = iter.size_hint();
        let mut cache = Self::new(lower.max(16));
        for (k, v) in iter {
            cache.insert(k, v);
        }
        cache
    }
}

impl<K, V> Extend<(K, V)> for S3FifoCache<K, V>
where
    K: Clone + Eq + Hash,
{
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K, V> IntoIterator for S3FifoCache<K, V>
where
    K: Clone + Eq + Hash,
{
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(mut self) -> Self::IntoIter {
        let current = self.small.front();
        let main_head = self.main.front();
        let remaining = self.countable;

        // Take ownership of the arena; reset bookkeeping so Drop is a no-op.
        let arena = std::mem::take(&mut self.arena);
        self.map.clear();
        self.small.clear();
        self.main.clear();
        self.ghost.clear();
        self.countable = 0;

        IntoIter {
            arena,
            current,
            main_head,
            remaining,
        }
    }
}

impl<'a, K, V> IntoIterator for &'a S3FifoCache<K, V>
where
    K: Clone + Eq + Hash,
{
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, V> Debug for S3FifoCache<K, V>
where
    K: Clone + Eq + Hash,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3FifoCache")
            .field("capacity", &self.capacity)
            .field("len", &self.countable)
            .field("small_len", &self.small.len())
            .field("small_cap", &self.limit_small)
            .field("main_len", &self.main.len())
            .field("ghost_len", &self.ghost.len())
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Cache trait implementations
// ---------------------------------------------------------------------------

impl<K, V> ReadOnlyCache<K, V> for S3FifoCache<K, V>
where
    K: Clone + Eq + Hash,
{
    #[inline]
    fn contains(&self, key: &K) -> bool {
        S3FifoCache::contains(self, key)
    }

    #[inline]
    fn len(&self) -> usize {
        S3FifoCache::len(self)
    }

    #[inline]
    fn capacity(&self) -> usize {
        S3FifoCache::capacity(self)
    }
}

impl<K, V> CoreCache<K, V> for S3FifoCache<K, V>
where
    K: Clone + Eq + Hash,
{
    #[inline]
    fn insert(&mut self, key: K, value: V) -> Option<V> {
        S3FifoCache::insert(self, key, value)
    }

    #[inline]
    fn get(&mut self, key: &K) -> Option<&V> {
        S3FifoCache::get(self, key)
    }

    fn clear(&mut self) {
        S3FifoCache::clear(self);
    }
}

impl<K, V> MutableCache<K, V> for S3FifoCache<K, V>
where
    K: Clone + Eq + Hash,
{
    #[inline]
    fn remove(&mut self, key: &K) -> Option<V> {
        S3FifoCache::remove(self, key)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
