//! Bounded map with FIFO (First In, First Out) eviction.
//!
//! A fixed-capacity key-value map that evicts the oldest inserted entry when
//! a new key arrives at capacity. Overwriting an existing key updates the
//! value in place and does not change the key's age, so eviction order
//! depends only on when each key was first inserted (or last re-inserted
//! after removal).
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────────┐
//! │                          FifoMap<K, V> Layout                               │
//! │                                                                             │
//! │   ┌─────────────────────────────────────────────────────────────────────┐   │
//! │   │  store: FxHashMap<K, V>       order: OrderQueue<K>                  │   │
//! │   │         key → value                  insertion order queue          │   │
//! │   │                                                                     │   │
//! │   │  ┌──────────┬──────┐          ┌─────────────────────────┐           │   │
//! │   │  │   Key    │Value │          │ Front           Back    │           │   │
//! │   │  ├──────────┼──────┤          ├─────────────────────────┤           │   │
//! │   │  │  "p1"    │  v1  │          │ [p1] [p2] [p3] [p4]     │           │   │
//! │   │  │  "p2"    │  v2  │          │  ↑              ↑       │           │   │
//! │   │  │  "p3"    │  v3  │          │ oldest        newest    │           │   │
//! │   │  │  "p4"    │  v4  │          │ EVICT          keep     │           │   │
//! │   │  └──────────┴──────┘          └─────────────────────────┘           │   │
//! │   └─────────────────────────────────────────────────────────────────────┘   │
//! │                                                                             │
//! │   ┌─────────────────────────────────────────────────────────────────────┐   │
//! │   │                      FIFO Eviction (Queue)                          │   │
//! │   │                                                                     │   │
//! │   │   • New keys appended to the back of the queue                      │   │
//! │   │   • Eviction pops from the front (oldest)                           │   │
//! │   │   • Overwrites leave the queue untouched                            │   │
//! │   │                                                                     │   │
//! │   │   Example: Insert A, B, C, D into capacity 3                        │   │
//! │   │     Queue: [A, B, C]   ← full                                       │   │
//! │   │     Insert D → A evicted (oldest)                                   │   │
//! │   │     Queue: [B, C, D]                                                │   │
//! │   └─────────────────────────────────────────────────────────────────────┘   │
//! │                                                                             │
//! └─────────────────────────────────────────────────────────────────────────────┘
//!
//! Insert Flow (new key)
//! ─────────────────────
//!
//!   insert("new_key", value):
//!     1. Check store - not found
//!     2. Evict from queue front (oldest) if at capacity
//!     3. Append key to back of queue
//!     4. Insert (key, value) into store
//!
//! Insert Flow (existing key)
//! ──────────────────────────
//!
//!   insert("existing_key", value):
//!     1. Check store - found
//!     2. Replace value in place, return the old one
//!     3. Queue untouched (key keeps its age!)
//!
//! Removal Flow
//! ────────────
//!
//!   remove("key"):
//!     1. Remove (key, value) from store
//!     2. Drop key from the queue's live index (entry goes stale)
//!     3. Compact the queue if stale entries piled up
//! ```
//!
//! ## Key Components
//!
//! - [`FifoMap`]: Main bounded map implementation
//! - [`OrderQueue`](crate::order::OrderQueue): Insertion order tracking with
//!   lazy deletion
//!
//! ## Operations
//!
//! | Operation    | Time   | Notes                                       |
//! |--------------|--------|---------------------------------------------|
//! | `get`        | O(1)   | HashMap lookup, no reordering               |
//! | `insert`     | O(1)*  | *Amortized, may trigger eviction            |
//! | `remove`     | O(1)*  | *Amortized, lazy queue cleanup              |
//! | `contains`   | O(1)   | HashMap lookup only                         |
//! | `pop_oldest` | O(1)*  | *Amortized over stale entry skips           |
//! | `iter`       | O(n)   | Live entries in insertion order             |
//! | `clear`      | O(n)   | Clears all structures, resets order         |
//!
//! ## Algorithm Properties
//!
//! - **Queue Order**: Oldest insertion at the front, newest at the back
//! - **No Access Tracking**: Reads never affect eviction order
//! - **Overwrite Keeps Age**: Updating a value does not refresh the key
//! - **Re-insert After Removal**: A removed key inserted again counts as new
//!   and moves to the back
//!
//! ## Use Cases
//!
//! - Deduplication windows over event streams
//! - Bounded memoization where entry age matters more than access recency
//! - Recent-item registries with predictable turnover
//!
//! ## Example Usage
//!
//! ```
//! use fifomap::FifoMap;
//!
//! // Create a map that holds at most 3 entries
//! let mut map = FifoMap::new(3);
//!
//! map.insert("a", 1);
//! map.insert("b", 2);
//! map.insert("c", 3);
//!
//! // Reads don't affect eviction order (unlike LRU)
//! assert_eq!(map.get(&"a"), Some(&1));
//!
//! // A fourth key evicts "a", the oldest
//! map.insert("d", 4);
//! assert!(!map.contains(&"a"));
//!
//! // Entries iterate oldest first
//! let keys: Vec<_> = map.keys().copied().collect();
//! assert_eq!(keys, vec!["b", "c", "d"]);
//! ```
//!
//! ## Thread Safety
//!
//! - [`FifoMap`]: Not thread-safe, designed for single-threaded use
//! - For concurrent access, wrap in external synchronization
//!
//! ## Implementation Notes
//!
//! - Uses [`OrderQueue`](crate::order::OrderQueue) for insertion order with
//!   O(1) lazy removal
//! - Uses `FxHashMap<K, V>` for O(1) lookup
//! - Stale queue entries from removals are skipped during eviction and
//!   compacted once they outnumber live keys

use std::fmt;
use std::hash::Hash;
use std::iter::FusedIterator;

use rustc_hash::FxHashMap;

use crate::error::CapacityError;
use crate::order::{LiveKeys, OrderQueue};

#[cfg(feature = "metrics")]
use crate::metrics::{FifoMapMetrics, FifoMapMetricsSnapshot};

/// Compact the insertion order queue once it holds more than this many
/// entries per live key.
const STALE_COMPACT_FACTOR: usize = 2;

/// Bounded key-value map with FIFO eviction.
///
/// Holds at most `capacity` entries. Inserting a new key at capacity evicts
/// the oldest live key first. Overwriting an existing key replaces the value
/// without touching its position in the insertion order.
///
/// # Type Parameters
///
/// - `K`: Key type, must be `Eq + Hash + Clone`
/// - `V`: Value type
///
/// # Example
///
/// ```
/// use fifomap::FifoMap;
///
/// let mut map = FifoMap::new(100);
///
/// map.insert("key1", "value1");
/// assert!(map.contains(&"key1"));
///
/// // Reads never change eviction order
/// map.get(&"key1");
///
/// // Overwrite keeps the key's age
/// map.insert("key1", "new_value");
/// assert_eq!(map.get(&"key1"), Some(&"new_value"));
/// ```
///
/// # Eviction Behavior
///
/// When a new key arrives at capacity, the oldest inserted entry (queue
/// front) is evicted. Only new keys evict; overwrites never do.
pub struct FifoMap<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Maps key to value
    store: FxHashMap<K, V>,
    /// Live keys in insertion order (front = oldest)
    order: OrderQueue<K>,
    /// Maximum number of entries
    capacity: usize,
    #[cfg(feature = "metrics")]
    metrics: FifoMapMetrics,
}

impl<K, V> FifoMap<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates a map with the given capacity.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero. Use [`try_new`](Self::try_new) to handle
    /// the error instead.
    ///
    /// # Example
    ///
    /// ```
    /// use fifomap::FifoMap;
    ///
    /// let map: FifoMap<String, i32> = FifoMap::new(100);
    /// assert_eq!(map.capacity(), 100);
    /// assert!(map.is_empty());
    /// ```
    pub fn new(capacity: usize) -> Self {
        match Self::try_new(capacity) {
            Ok(map) => map,
            Err(e) => panic!("{}", e),
        }
    }

    /// Creates a map with the given capacity, returning an error if it is
    /// zero.
    ///
    /// # Errors
    ///
    /// Returns [`CapacityError`] if `capacity` is zero.
    ///
    /// # Example
    ///
    /// ```
    /// use fifomap::FifoMap;
    ///
    /// assert!(FifoMap::<u64, u64>::try_new(8).is_ok());
    /// assert!(FifoMap::<u64, u64>::try_new(0).is_err());
    /// ```
    pub fn try_new(capacity: usize) -> Result<Self, CapacityError> {
        if capacity == 0 {
            return Err(CapacityError::new("map capacity must be greater than zero"));
        }
        Ok(Self {
            store: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            order: OrderQueue::with_capacity(capacity),
            capacity,
            #[cfg(feature = "metrics")]
            metrics: FifoMapMetrics::default(),
        })
    }

    /// Creates a map seeded from `entries`, evicting FIFO-style if they
    /// exceed `capacity`.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero. See
    /// [`try_with_entries`](Self::try_with_entries).
    ///
    /// # Example
    ///
    /// ```
    /// use fifomap::FifoMap;
    ///
    /// let map = FifoMap::with_entries(2, [("a", 1), ("b", 2), ("c", 3)]);
    /// assert_eq!(map.len(), 2);
    /// assert!(!map.contains(&"a")); // evicted by "c"
    /// ```
    pub fn with_entries<I>(capacity: usize, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
    {
        match Self::try_with_entries(capacity, entries) {
            Ok(map) => map,
            Err(e) => panic!("{}", e),
        }
    }

    /// Creates a map seeded from `entries`, returning an error on zero
    /// capacity.
    ///
    /// # Errors
    ///
    /// Returns [`CapacityError`] if `capacity` is zero.
    ///
    /// # Example
    ///
    /// ```
    /// use fifomap::FifoMap;
    ///
    /// let map = FifoMap::try_with_entries(10, [(1, "one"), (2, "two")]).unwrap();
    /// assert_eq!(map.len(), 2);
    /// ```
    pub fn try_with_entries<I>(capacity: usize, entries: I) -> Result<Self, CapacityError>
    where
        I: IntoIterator<Item = (K, V)>,
    {
        let mut map = Self::try_new(capacity)?;
        map.extend(entries);
        Ok(map)
    }

    /// Retrieves a value by key without affecting eviction order.
    ///
    /// # Example
    ///
    /// ```
    /// use fifomap::FifoMap;
    ///
    /// let mut map = FifoMap::new(100);
    /// map.insert("key", 42);
    ///
    /// assert_eq!(map.get(&"key"), Some(&42));
    /// assert_eq!(map.get(&"missing"), None);
    /// ```
    #[inline]
    pub fn get(&self, key: &K) -> Option<&V> {
        match self.store.get(key) {
            Some(value) => {
                #[cfg(feature = "metrics")]
                self.metrics.record_get_hit();
                Some(value)
            },
            None => {
                #[cfg(feature = "metrics")]
                self.metrics.record_get_miss();
                None
            },
        }
    }

    /// Retrieves a mutable value reference without affecting eviction order.
    ///
    /// # Example
    ///
    /// ```
    /// use fifomap::FifoMap;
    ///
    /// let mut map = FifoMap::new(100);
    /// map.insert("counter", 0);
    ///
    /// if let Some(count) = map.get_mut(&"counter") {
    ///     *count += 1;
    /// }
    /// assert_eq!(map.get(&"counter"), Some(&1));
    /// ```
    #[inline]
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        match self.store.get_mut(key) {
            Some(value) => {
                #[cfg(feature = "metrics")]
                self.metrics.record_get_hit();
                Some(value)
            },
            None => {
                #[cfg(feature = "metrics")]
                self.metrics.record_get_miss();
                None
            },
        }
    }

    /// Returns `true` if the key is present.
    ///
    /// # Example
    ///
    /// ```
    /// use fifomap::FifoMap;
    ///
    /// let mut map = FifoMap::new(100);
    /// map.insert("key", 42);
    ///
    /// assert!(map.contains(&"key"));
    /// assert!(!map.contains(&"missing"));
    /// ```
    #[inline]
    pub fn contains(&self, key: &K) -> bool {
        self.store.contains_key(key)
    }

    /// Inserts or updates a key-value pair, returning the previous value if
    /// the key was present.
    ///
    /// - Existing key: the value is replaced in place and the key keeps its
    ///   position in the insertion order. No eviction happens.
    /// - New key: the oldest entry is evicted first if the map is at
    ///   capacity, then the key is appended as newest.
    ///
    /// # Example
    ///
    /// ```
    /// use fifomap::FifoMap;
    ///
    /// let mut map = FifoMap::new(2);
    /// map.insert("a", 1);
    /// map.insert("b", 2);
    ///
    /// // Overwrite updates in place, no eviction
    /// assert_eq!(map.insert("a", 10), Some(1));
    /// assert_eq!(map.len(), 2);
    ///
    /// // New key at capacity evicts "a" (it kept its original age)
    /// map.insert("c", 3);
    /// assert!(!map.contains(&"a"));
    /// assert_eq!(map.len(), 2);
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        #[cfg(feature = "metrics")]
        self.metrics.record_insert_call();

        if let Some(slot) = self.store.get_mut(&key) {
            #[cfg(feature = "metrics")]
            self.metrics.record_insert_update();
            return Some(std::mem::replace(slot, value));
        }

        if self.store.len() >= self.capacity {
            self.evict_oldest();
        }

        #[cfg(feature = "metrics")]
        self.metrics.record_insert_new();

        self.order.push_back(key.clone());
        self.store.insert(key, value);

        #[cfg(debug_assertions)]
        self.validate_invariants();

        None
    }

    /// Evicts the oldest live entry to make room for a new key.
    fn evict_oldest(&mut self) {
        #[cfg(feature = "metrics")]
        self.metrics.record_evict_call();
        #[cfg(feature = "metrics")]
        let order_before = self.order.order_len();

        match self.order.pop_front() {
            Some(oldest) => {
                self.store.remove(&oldest);

                #[cfg(feature = "metrics")]
                {
                    let consumed = (order_before - self.order.order_len()) as u64;
                    self.metrics.record_evict_scan_steps(consumed);
                    self.metrics.record_stale_skips(consumed.saturating_sub(1));
                    self.metrics.record_evicted_entry();
                }
            },
            None => {
                // An exhausted queue with live entries means order and store
                // lost sync. Rebuild and evict rather than exceed capacity.
                debug_assert!(
                    self.store.is_empty(),
                    "insertion order queue exhausted while map is non-empty"
                );
                if !self.store.is_empty() {
                    self.rebuild_order();
                    if let Some(oldest) = self.order.pop_front() {
                        self.store.remove(&oldest);
                        #[cfg(feature = "metrics")]
                        self.metrics.record_evicted_entry();
                    }
                }
            },
        }
    }

    /// Rebuilds the order queue from store keys. Recovered order follows map
    /// iteration order, not original insertion order.
    fn rebuild_order(&mut self) {
        self.order.clear();
        for key in self.store.keys() {
            self.order.push_back(key.clone());
        }
    }

    /// Removes a key, returning its value if it was present.
    ///
    /// Removal does not shift the remaining keys: each keeps its position in
    /// the insertion order. The freed slot means the next new insert does not
    /// evict.
    ///
    /// # Example
    ///
    /// ```
    /// use fifomap::FifoMap;
    ///
    /// let mut map = FifoMap::new(100);
    /// map.insert("key", 42);
    ///
    /// assert_eq!(map.remove(&"key"), Some(42));
    /// assert_eq!(map.remove(&"key"), None);
    /// ```
    pub fn remove(&mut self, key: &K) -> Option<V> {
        #[cfg(feature = "metrics")]
        self.metrics.record_remove_call();

        let value = self.store.remove(key)?;
        let removed = self.order.remove(key);
        debug_assert!(removed, "removed key missing from insertion order");
        self.order.maybe_compact(STALE_COMPACT_FACTOR);

        #[cfg(feature = "metrics")]
        self.metrics.record_remove_found();

        #[cfg(debug_assertions)]
        self.validate_invariants();

        Some(value)
    }

    /// Removes and returns the oldest live entry.
    ///
    /// # Example
    ///
    /// ```
    /// use fifomap::FifoMap;
    ///
    /// let mut map = FifoMap::new(10);
    /// map.insert("first", 1);
    /// map.insert("second", 2);
    ///
    /// assert_eq!(map.pop_oldest(), Some(("first", 1)));
    /// assert_eq!(map.pop_oldest(), Some(("second", 2)));
    /// assert_eq!(map.pop_oldest(), None);
    /// ```
    pub fn pop_oldest(&mut self) -> Option<(K, V)> {
        #[cfg(feature = "metrics")]
        self.metrics.record_pop_oldest_call();
        #[cfg(feature = "metrics")]
        let order_before = self.order.order_len();

        let key = match self.order.pop_front() {
            Some(key) => key,
            None => {
                #[cfg(feature = "metrics")]
                self.metrics.record_pop_oldest_empty_or_stale();
                return None;
            },
        };

        match self.store.remove(&key) {
            Some(value) => {
                #[cfg(feature = "metrics")]
                {
                    let consumed = (order_before - self.order.order_len()) as u64;
                    self.metrics.record_stale_skips(consumed.saturating_sub(1));
                    self.metrics.record_pop_oldest_found();
                }

                self.order.maybe_compact(STALE_COMPACT_FACTOR);

                #[cfg(debug_assertions)]
                self.validate_invariants();

                Some((key, value))
            },
            None => {
                debug_assert!(false, "oldest live key missing from store");
                #[cfg(feature = "metrics")]
                self.metrics.record_pop_oldest_empty_or_stale();
                None
            },
        }
    }

    /// Removes and returns up to `count` oldest entries, oldest first.
    ///
    /// # Example
    ///
    /// ```
    /// use fifomap::FifoMap;
    ///
    /// let mut map = FifoMap::new(10);
    /// for i in 0..5 {
    ///     map.insert(i, i * 10);
    /// }
    ///
    /// let drained = map.pop_oldest_batch(3);
    /// assert_eq!(drained, vec![(0, 0), (1, 10), (2, 20)]);
    /// assert_eq!(map.len(), 2);
    /// ```
    pub fn pop_oldest_batch(&mut self, count: usize) -> Vec<(K, V)> {
        let mut drained = Vec::with_capacity(count.min(self.len()));
        for _ in 0..count {
            match self.pop_oldest() {
                Some(entry) => drained.push(entry),
                None => break,
            }
        }
        drained
    }

    /// Returns the oldest live entry without removing it.
    ///
    /// # Example
    ///
    /// ```
    /// use fifomap::FifoMap;
    ///
    /// let mut map = FifoMap::new(10);
    /// map.insert("old", 1);
    /// map.insert("new", 2);
    ///
    /// assert_eq!(map.peek_oldest(), Some((&"old", &1)));
    /// assert_eq!(map.len(), 2); // Peek does not remove
    /// ```
    pub fn peek_oldest(&self) -> Option<(&K, &V)> {
        #[cfg(feature = "metrics")]
        self.metrics.record_peek_oldest_call();

        let key = self.order.front()?;
        let value = self.store.get(key)?;

        #[cfg(feature = "metrics")]
        self.metrics.record_peek_oldest_found();

        Some((key, value))
    }

    /// Returns `key`'s position in the eviction order, oldest first.
    ///
    /// Rank 0 is the next entry to be evicted. Returns `None` if the key is
    /// not present.
    ///
    /// # Example
    ///
    /// ```
    /// use fifomap::FifoMap;
    ///
    /// let mut map = FifoMap::new(10);
    /// map.insert("a", 1);
    /// map.insert("b", 2);
    ///
    /// assert_eq!(map.age_rank(&"a"), Some(0));
    /// assert_eq!(map.age_rank(&"b"), Some(1));
    /// assert_eq!(map.age_rank(&"missing"), None);
    /// ```
    pub fn age_rank(&self, key: &K) -> Option<usize> {
        #[cfg(feature = "metrics")]
        self.metrics.record_age_rank_call();

        if !self.store.contains_key(key) {
            return None;
        }

        let mut rank = 0usize;
        for live in self.order.iter() {
            #[cfg(feature = "metrics")]
            self.metrics.record_age_rank_scan_step();

            if live == key {
                #[cfg(feature = "metrics")]
                self.metrics.record_age_rank_found();
                return Some(rank);
            }
            rank += 1;
        }
        None
    }

    /// Returns the number of entries in the map.
    ///
    /// # Example
    ///
    /// ```
    /// use fifomap::FifoMap;
    ///
    /// let mut map = FifoMap::new(100);
    /// assert_eq!(map.len(), 0);
    ///
    /// map.insert("a", 1);
    /// map.insert("b", 2);
    /// assert_eq!(map.len(), 2);
    /// ```
    #[inline]
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Returns `true` if the map is empty.
    ///
    /// # Example
    ///
    /// ```
    /// use fifomap::FifoMap;
    ///
    /// let mut map: FifoMap<&str, i32> = FifoMap::new(100);
    /// assert!(map.is_empty());
    ///
    /// map.insert("key", 42);
    /// assert!(!map.is_empty());
    /// ```
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Returns the maximum number of entries the map can hold.
    ///
    /// # Example
    ///
    /// ```
    /// use fifomap::FifoMap;
    ///
    /// let map: FifoMap<String, i32> = FifoMap::new(500);
    /// assert_eq!(map.capacity(), 500);
    /// ```
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the underlying order queue length, including stale entries.
    ///
    /// # Example
    ///
    /// ```
    /// use fifomap::FifoMap;
    ///
    /// let mut map = FifoMap::new(10);
    /// map.insert("a", 1);
    /// map.insert("b", 2);
    ///
    /// assert_eq!(map.order_len(), 2);
    /// ```
    #[inline]
    pub fn order_len(&self) -> usize {
        self.order.order_len()
    }

    /// Returns the number of stale order entries awaiting cleanup.
    ///
    /// # Example
    ///
    /// ```
    /// use fifomap::FifoMap;
    ///
    /// let mut map = FifoMap::new(10);
    /// map.insert("a", 1);
    /// map.insert("b", 2);
    /// map.remove(&"a");
    ///
    /// assert_eq!(map.stale_len(), map.order_len() - map.len());
    /// ```
    #[inline]
    pub fn stale_len(&self) -> usize {
        self.order.order_len().saturating_sub(self.order.len())
    }

    /// Removes all entries and resets the insertion order.
    ///
    /// After clearing, the map behaves as freshly created: re-inserted keys
    /// start a new insertion order.
    ///
    /// # Example
    ///
    /// ```
    /// use fifomap::FifoMap;
    ///
    /// let mut map = FifoMap::new(100);
    /// map.insert("a", 1);
    /// map.insert("b", 2);
    ///
    /// map.clear();
    /// assert!(map.is_empty());
    /// assert!(!map.contains(&"a"));
    /// ```
    pub fn clear(&mut self) {
        self.store.clear();
        self.order.clear();

        #[cfg(debug_assertions)]
        self.validate_invariants();
    }

    /// Drops all stale order entries immediately.
    ///
    /// Stale entries are compacted automatically during removals; this forces
    /// the cleanup eagerly.
    ///
    /// # Example
    ///
    /// ```
    /// use fifomap::FifoMap;
    ///
    /// let mut map = FifoMap::new(10);
    /// map.insert("a", 1);
    /// map.insert("b", 2);
    /// map.remove(&"a");
    ///
    /// map.compact();
    /// assert_eq!(map.stale_len(), 0);
    /// ```
    pub fn compact(&mut self) {
        self.order.compact();
    }

    /// Returns an approximate memory footprint in bytes.
    ///
    /// # Example
    ///
    /// ```
    /// use fifomap::FifoMap;
    ///
    /// let map: FifoMap<u64, u64> = FifoMap::new(100);
    /// assert!(map.approx_bytes() > 0);
    /// ```
    pub fn approx_bytes(&self) -> usize {
        std::mem::size_of::<Self>()
            + self.store.capacity() * std::mem::size_of::<(K, V)>()
            + self.order.approx_bytes()
    }

    /// Returns an iterator over entries in insertion order, oldest first.
    ///
    /// # Example
    ///
    /// ```
    /// use fifomap::FifoMap;
    ///
    /// let mut map = FifoMap::new(10);
    /// map.insert("a", 1);
    /// map.insert("b", 2);
    ///
    /// let entries: Vec<_> = map.iter().collect();
    /// assert_eq!(entries, vec![(&"a", &1), (&"b", &2)]);
    /// ```
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            keys: self.order.iter(),
            store: &self.store,
        }
    }

    /// Returns an iterator over keys in insertion order, oldest first.
    ///
    /// # Example
    ///
    /// ```
    /// use fifomap::FifoMap;
    ///
    /// let mut map = FifoMap::new(10);
    /// map.insert("x", 1);
    /// map.insert("y", 2);
    ///
    /// let keys: Vec<_> = map.keys().copied().collect();
    /// assert_eq!(keys, vec!["x", "y"]);
    /// ```
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    /// Returns an iterator over values in insertion order, oldest first.
    ///
    /// # Example
    ///
    /// ```
    /// use fifomap::FifoMap;
    ///
    /// let mut map = FifoMap::new(10);
    /// map.insert("a", 10);
    /// map.insert("b", 20);
    ///
    /// let values: Vec<_> = map.values().copied().collect();
    /// assert_eq!(values, vec![10, 20]);
    /// ```
    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    /// Calls `f` for each entry in insertion order, oldest first.
    ///
    /// # Example
    ///
    /// ```
    /// use fifomap::FifoMap;
    ///
    /// let mut map = FifoMap::new(10);
    /// map.insert("a", 1);
    /// map.insert("b", 2);
    ///
    /// let mut sum = 0;
    /// map.for_each(|_key, value| sum += value);
    /// assert_eq!(sum, 3);
    /// ```
    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(&K, &V),
    {
        for (key, value) in self.iter() {
            f(key, value);
        }
    }

    /// Validates internal data structure invariants.
    ///
    /// This method checks that:
    /// - Entry count never exceeds capacity
    /// - Store and order queue track the same live keys
    /// - Every live order key resolves to a stored entry
    ///
    /// Only runs when debug assertions are enabled.
    #[cfg(debug_assertions)]
    fn validate_invariants(&self) {
        debug_assert!(
            self.store.len() <= self.capacity,
            "Entry count exceeds capacity"
        );
        debug_assert_eq!(
            self.store.len(),
            self.order.len(),
            "Store and insertion order track different key counts"
        );
        for key in self.order.iter() {
            debug_assert!(
                self.store.contains_key(key),
                "Key in insertion order not found in store"
            );
        }
        self.order.debug_validate_invariants();
    }

    /// Validates internal invariants (debug-only).
    #[cfg(debug_assertions)]
    pub fn check_invariants(&self) -> Result<(), crate::error::InvariantError> {
        use crate::error::InvariantError;

        if self.store.len() > self.capacity {
            return Err(InvariantError::new(format!(
                "map holds {} entries but capacity is {}",
                self.store.len(),
                self.capacity
            )));
        }
        if self.store.len() != self.order.len() {
            return Err(InvariantError::new(format!(
                "store len {} != live order len {}",
                self.store.len(),
                self.order.len()
            )));
        }
        if self.order.order_len() < self.order.len() {
            return Err(InvariantError::new(format!(
                "order queue holds {} entries but {} live keys",
                self.order.order_len(),
                self.order.len()
            )));
        }

        let mut seen = 0usize;
        for key in self.order.iter() {
            if !self.store.contains_key(key) {
                return Err(InvariantError::new("live order key missing from store"));
            }
            seen += 1;
        }
        if seen != self.store.len() {
            return Err(InvariantError::new(format!(
                "order iteration yielded {} keys, store holds {}",
                seen,
                self.store.len()
            )));
        }

        Ok(())
    }
}

#[cfg(feature = "metrics")]
impl<K, V> FifoMap<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Returns a point-in-time copy of operation counters and size gauges.
    pub fn metrics_snapshot(&self) -> FifoMapMetricsSnapshot {
        FifoMapMetricsSnapshot {
            get_calls: self.metrics.get_calls.get(),
            get_hits: self.metrics.get_hits.get(),
            get_misses: self.metrics.get_misses.get(),
            insert_calls: self.metrics.insert_calls,
            insert_updates: self.metrics.insert_updates,
            insert_new: self.metrics.insert_new,
            evict_calls: self.metrics.evict_calls,
            evicted_entries: self.metrics.evicted_entries,
            stale_skips: self.metrics.stale_skips,
            evict_scan_steps: self.metrics.evict_scan_steps,
            remove_calls: self.metrics.remove_calls,
            remove_found: self.metrics.remove_found,
            pop_oldest_calls: self.metrics.pop_oldest_calls,
            pop_oldest_found: self.metrics.pop_oldest_found,
            pop_oldest_empty_or_stale: self.metrics.pop_oldest_empty_or_stale,
            peek_oldest_calls: self.metrics.peek_oldest_calls.get(),
            peek_oldest_found: self.metrics.peek_oldest_found.get(),
            age_rank_calls: self.metrics.age_rank_calls.get(),
            age_rank_found: self.metrics.age_rank_found.get(),
            age_rank_scan_steps: self.metrics.age_rank_scan_steps.get(),
            map_len: self.store.len(),
            insertion_order_len: self.order.order_len(),
            capacity: self.capacity,
        }
    }
}

// ---------------------------------------------------------------------------
// Iterators
// ---------------------------------------------------------------------------

/// Iterator over map entries in insertion order.
pub struct Iter<'a, K, V> {
    keys: LiveKeys<'a, K>,
    store: &'a FxHashMap<K, V>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V>
where
    K: Eq + Hash,
{
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let key = self.keys.next()?;
            match self.store.get(key) {
                Some(value) => return Some((key, value)),
                None => continue,
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.keys.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V>
where
    K: Eq + Hash,
{
    fn len(&self) -> usize {
        self.keys.len()
    }
}

impl<K, V> FusedIterator for Iter<'_, K, V> where K: Eq + Hash {}

impl<K, V> fmt::Debug for Iter<'_, K, V>
where
    K: Eq + Hash,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Iter")
            .field("remaining", &self.keys.len())
            .finish()
    }
}

/// Iterator over map keys in insertion order.
pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Keys<'a, K, V>
where
    K: Eq + Hash,
{
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V>
where
    K: Eq + Hash,
{
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V> FusedIterator for Keys<'_, K, V> where K: Eq + Hash {}

impl<K, V> fmt::Debug for Keys<'_, K, V>
where
    K: Eq + Hash,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keys")
            .field("remaining", &self.inner.keys.len())
            .finish()
    }
}

/// Iterator over map values in insertion order.
pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Values<'a, K, V>
where
    K: Eq + Hash,
{
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V>
where
    K: Eq + Hash,
{
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V> FusedIterator for Values<'_, K, V> where K: Eq + Hash {}

impl<K, V> fmt::Debug for Values<'_, K, V>
where
    K: Eq + Hash,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Values")
            .field("remaining", &self.inner.keys.len())
            .finish()
    }
}

/// Consuming iterator over map entries in insertion order.
pub struct IntoIter<K, V> {
    store: FxHashMap<K, V>,
    order: OrderQueue<K>,
}

impl<K, V> Iterator for IntoIter<K, V>
where
    K: Eq + Hash + Clone,
{
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let key = self.order.pop_front()?;
            match self.store.remove(&key) {
                Some(value) => return Some((key, value)),
                None => continue,
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.store.len(), Some(self.store.len()))
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V>
where
    K: Eq + Hash + Clone,
{
    fn len(&self) -> usize {
        self.store.len()
    }
}

impl<K, V> FusedIterator for IntoIter<K, V> where K: Eq + Hash + Clone {}

impl<K, V> fmt::Debug for IntoIter<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntoIter")
            .field("remaining", &self.store.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Std trait implementations
// ---------------------------------------------------------------------------

impl<K, V> Extend<(K, V)> for FifoMap<K, V>
where
    K: Eq + Hash + Clone,
{
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K, V> IntoIterator for FifoMap<K, V>
where
    K: Eq + Hash + Clone,
{
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            store: self.store,
            order: self.order,
        }
    }
}

impl<'a, K, V> IntoIterator for &'a FifoMap<K, V>
where
    K: Eq + Hash + Clone,
{
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, V> fmt::Debug for FifoMap<K, V>
where
    K: Eq + Hash + Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FifoMap")
            .field("capacity", &self.capacity)
            .field("len", &self.store.len())
            .field("order_len", &self.order.order_len())
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // ==============================================
    // Constructor Validation
    // ==============================================

    mod constructor_validation {
        use super::*;

        #[test]
        fn try_new_rejects_zero_capacity() {
            let result = FifoMap::<&str, i32>::try_new(0);
            let err = result.unwrap_err();
            assert!(err.to_string().contains("capacity"));
        }

        #[test]
        #[should_panic(expected = "map capacity must be greater than zero")]
        fn new_zero_capacity_panics() {
            let _map: FifoMap<&str, &str> = FifoMap::new(0);
        }

        #[test]
        fn capacity_one_is_valid() {
            let map: FifoMap<&str, i32> = FifoMap::new(1);
            assert_eq!(map.capacity(), 1);
        }

        #[test]
        fn try_with_entries_seeds_in_order() {
            let map = FifoMap::try_with_entries(10, [("a", 1), ("b", 2), ("c", 3)]).unwrap();
            let keys: Vec<_> = map.keys().copied().collect();
            assert_eq!(keys, vec!["a", "b", "c"]);
        }

        #[test]
        fn try_with_entries_evicts_overflow() {
            let map = FifoMap::try_with_entries(2, [("a", 1), ("b", 2), ("c", 3)]).unwrap();
            assert_eq!(map.len(), 2);
            assert!(!map.contains(&"a"));
            assert!(map.contains(&"b"));
            assert!(map.contains(&"c"));
        }

        #[test]
        fn try_with_entries_zero_capacity_fails() {
            let result = FifoMap::try_with_entries(0, [("a", 1)]);
            assert!(result.is_err());
        }
    }

    // ==============================================
    // Basic Operations
    // ==============================================

    mod basic_operations {
        use super::*;

        #[test]
        fn new_map_is_empty() {
            let map: FifoMap<&str, i32> = FifoMap::new(100);
            assert!(map.is_empty());
            assert_eq!(map.len(), 0);
            assert_eq!(map.capacity(), 100);
        }

        #[test]
        fn insert_and_get() {
            let mut map = FifoMap::new(100);
            map.insert("key1", "value1");
            assert_eq!(map.len(), 1);
            assert_eq!(map.get(&"key1"), Some(&"value1"));
        }

        #[test]
        fn insert_returns_previous_value() {
            let mut map = FifoMap::new(100);
            assert_eq!(map.insert("key", "initial"), None);
            assert_eq!(map.insert("key", "updated"), Some("initial"));
            assert_eq!(map.len(), 1);
            assert_eq!(map.get(&"key"), Some(&"updated"));
        }

        #[test]
        fn get_missing_key_returns_none() {
            let mut map: FifoMap<&str, i32> = FifoMap::new(100);
            map.insert("exists", 42);
            assert_eq!(map.get(&"missing"), None);
        }

        #[test]
        fn get_mut_updates_value_in_place() {
            let mut map = FifoMap::new(100);
            map.insert("counter", 0);
            *map.get_mut(&"counter").unwrap() += 5;
            assert_eq!(map.get(&"counter"), Some(&5));
            assert_eq!(map.get_mut(&"missing"), None);
        }

        #[test]
        fn contains_returns_correct_result() {
            let mut map = FifoMap::new(100);
            map.insert("exists", 1);
            assert!(map.contains(&"exists"));
            assert!(!map.contains(&"missing"));
        }

        #[test]
        fn clear_removes_all_entries() {
            let mut map = FifoMap::new(100);
            map.insert("a", 1);
            map.insert("b", 2);
            map.clear();
            assert!(map.is_empty());
            assert_eq!(map.len(), 0);
            assert!(!map.contains(&"a"));
        }

        #[test]
        fn len_tracks_inserts_and_removes() {
            let mut map = FifoMap::new(100);
            map.insert(1, "one");
            map.insert(2, "two");
            assert_eq!(map.len(), 2);
            map.remove(&1);
            assert_eq!(map.len(), 1);
        }
    }

    // ==============================================
    // FIFO Eviction
    // ==============================================

    mod fifo_eviction {
        use super::*;

        #[test]
        fn evicts_oldest_at_capacity() {
            let mut map = FifoMap::new(3);
            map.insert("a", 1);
            map.insert("b", 2);
            map.insert("c", 3);
            map.insert("d", 4);

            assert_eq!(map.len(), 3);
            assert!(!map.contains(&"a"));
            assert!(map.contains(&"b"));
            assert!(map.contains(&"c"));
            assert!(map.contains(&"d"));
        }

        #[test]
        fn capacity_one_holds_only_newest() {
            let mut map = FifoMap::new(1);
            map.insert("a", 1);
            map.insert("b", 2);
            assert_eq!(map.len(), 1);
            assert_eq!(map.get(&"b"), Some(&2));

            map.remove(&"b");
            assert!(map.is_empty());

            map.insert("c", 3);
            map.insert("d", 4);
            assert_eq!(map.len(), 1);
            assert!(!map.contains(&"c"));
            assert_eq!(map.get(&"d"), Some(&4));
        }

        #[test]
        fn overwrite_keeps_original_position() {
            let mut map = FifoMap::new(3);
            map.insert("a", 1);
            map.insert("b", 2);
            map.insert("c", 3);

            // Overwriting "a" must not refresh its age
            map.insert("a", 10);

            // The next new key still evicts "a", the oldest
            map.insert("d", 4);
            assert!(!map.contains(&"a"));
            assert!(map.contains(&"b"));
            assert!(map.contains(&"c"));
            assert!(map.contains(&"d"));
        }

        #[test]
        fn overwrite_at_capacity_never_evicts() {
            let mut map = FifoMap::new(2);
            map.insert("a", 1);
            map.insert("b", 2);

            map.insert("a", 10);
            map.insert("b", 20);

            assert_eq!(map.len(), 2);
            assert_eq!(map.get(&"a"), Some(&10));
            assert_eq!(map.get(&"b"), Some(&20));
        }

        #[test]
        fn removed_then_reinserted_key_is_newest() {
            let mut map = FifoMap::new(3);
            map.insert("a", 1);
            map.insert("b", 2);
            map.insert("c", 3);

            map.remove(&"a");
            map.insert("a", 100); // "a" is now the newest key

            map.insert("d", 4); // Evicts "b", the current oldest
            assert!(!map.contains(&"b"));
            assert!(map.contains(&"a"));
            assert!(map.contains(&"c"));
            assert!(map.contains(&"d"));
        }

        #[test]
        fn eviction_follows_insertion_order_through_churn() {
            let mut map = FifoMap::new(10);
            for i in 0..100u32 {
                map.insert(i, i);
            }

            assert_eq!(map.len(), 10);
            let keys: Vec<u32> = map.keys().copied().collect();
            assert_eq!(keys, (90..100).collect::<Vec<u32>>());
        }

        #[test]
        fn len_never_exceeds_capacity_during_churn() {
            let mut map = FifoMap::new(7);
            for i in 0..500u32 {
                map.insert(i % 23, i);
                assert!(map.len() <= 7);
            }
        }
    }

    // ==============================================
    // Removal Behavior
    // ==============================================

    mod removal_behavior {
        use super::*;

        #[test]
        fn remove_returns_value() {
            let mut map = FifoMap::new(10);
            map.insert("key", 42);
            assert_eq!(map.remove(&"key"), Some(42));
            assert_eq!(map.remove(&"key"), None);
            assert!(!map.contains(&"key"));
        }

        #[test]
        fn remove_missing_returns_none() {
            let mut map: FifoMap<&str, i32> = FifoMap::new(10);
            assert_eq!(map.remove(&"missing"), None);
        }

        #[test]
        fn remove_frees_slot_without_eviction() {
            let mut map = FifoMap::new(2);
            map.insert("a", 1);
            map.insert("b", 2);

            map.remove(&"a");
            map.insert("c", 3); // Fills the freed slot, no eviction

            assert_eq!(map.len(), 2);
            assert!(map.contains(&"b"));
            assert!(map.contains(&"c"));
        }

        #[test]
        fn remove_keeps_relative_order_of_survivors() {
            let mut map = FifoMap::new(5);
            for key in ["a", "b", "c", "d"] {
                map.insert(key, 0);
            }
            map.remove(&"b");

            let keys: Vec<_> = map.keys().copied().collect();
            assert_eq!(keys, vec!["a", "c", "d"]);
        }

        #[test]
        fn insert_remove_cycles_keep_queue_bounded() {
            let mut map = FifoMap::new(8);
            for i in 0..1000u32 {
                map.insert(i, i);
                map.remove(&i);
            }
            assert!(map.is_empty());
            assert_eq!(map.order_len(), 0);
        }

        #[test]
        fn mixed_churn_keeps_queue_bounded() {
            let mut map = FifoMap::new(8);
            for i in 0..8u32 {
                map.insert(i, i);
            }
            for i in 0..500u32 {
                map.insert(1000 + i, i);
                map.remove(&(1000 + i));
            }
            assert!(map.order_len() <= 2 * map.len().max(1));
        }
    }

    // ==============================================
    // Pop and Peek
    // ==============================================

    mod pop_and_peek {
        use super::*;

        #[test]
        fn pop_oldest_returns_in_insertion_order() {
            let mut map = FifoMap::new(10);
            map.insert("a", 1);
            map.insert("b", 2);
            map.insert("c", 3);

            assert_eq!(map.pop_oldest(), Some(("a", 1)));
            assert_eq!(map.pop_oldest(), Some(("b", 2)));
            assert_eq!(map.pop_oldest(), Some(("c", 3)));
            assert_eq!(map.pop_oldest(), None);
        }

        #[test]
        fn pop_oldest_skips_removed_keys() {
            let mut map = FifoMap::new(10);
            map.insert("a", 1);
            map.insert("b", 2);
            map.insert("c", 3);
            map.remove(&"a");

            assert_eq!(map.pop_oldest(), Some(("b", 2)));
        }

        #[test]
        fn pop_oldest_on_empty_returns_none() {
            let mut map: FifoMap<u32, u32> = FifoMap::new(10);
            assert_eq!(map.pop_oldest(), None);
        }

        #[test]
        fn pop_oldest_batch_drains_up_to_count() {
            let mut map = FifoMap::new(10);
            for i in 0..5u32 {
                map.insert(i, i * 10);
            }

            let drained = map.pop_oldest_batch(3);
            assert_eq!(drained, vec![(0, 0), (1, 10), (2, 20)]);
            assert_eq!(map.len(), 2);
        }

        #[test]
        fn pop_oldest_batch_stops_when_empty() {
            let mut map = FifoMap::new(10);
            map.insert(1u32, 1u32);

            let drained = map.pop_oldest_batch(5);
            assert_eq!(drained.len(), 1);
            assert!(map.is_empty());
        }

        #[test]
        fn peek_oldest_does_not_remove() {
            let mut map = FifoMap::new(10);
            map.insert("old", 1);
            map.insert("new", 2);

            assert_eq!(map.peek_oldest(), Some((&"old", &1)));
            assert_eq!(map.peek_oldest(), Some((&"old", &1)));
            assert_eq!(map.len(), 2);
        }

        #[test]
        fn peek_oldest_skips_removed_keys() {
            let mut map = FifoMap::new(10);
            map.insert("a", 1);
            map.insert("b", 2);
            map.remove(&"a");

            assert_eq!(map.peek_oldest(), Some((&"b", &2)));
        }

        #[test]
        fn peek_oldest_on_empty_returns_none() {
            let map: FifoMap<u32, u32> = FifoMap::new(10);
            assert_eq!(map.peek_oldest(), None);
        }

        #[test]
        fn age_rank_orders_keys_oldest_first() {
            let mut map = FifoMap::new(10);
            map.insert("a", 1);
            map.insert("b", 2);
            map.insert("c", 3);

            assert_eq!(map.age_rank(&"a"), Some(0));
            assert_eq!(map.age_rank(&"b"), Some(1));
            assert_eq!(map.age_rank(&"c"), Some(2));
            assert_eq!(map.age_rank(&"missing"), None);
        }

        #[test]
        fn age_rank_shifts_after_removal() {
            let mut map = FifoMap::new(10);
            map.insert("a", 1);
            map.insert("b", 2);
            map.insert("c", 3);
            map.remove(&"a");

            assert_eq!(map.age_rank(&"b"), Some(0));
            assert_eq!(map.age_rank(&"c"), Some(1));
        }
    }

    // ==============================================
    // Iteration
    // ==============================================

    mod iteration {
        use super::*;

        #[test]
        fn iter_yields_insertion_order() {
            let mut map = FifoMap::new(10);
            map.insert("a", 1);
            map.insert("b", 2);
            map.insert("c", 3);

            let entries: Vec<_> = map.iter().collect();
            assert_eq!(entries, vec![(&"a", &1), (&"b", &2), (&"c", &3)]);
        }

        #[test]
        fn iter_is_restartable() {
            let mut map = FifoMap::new(10);
            map.insert(1, "one");
            map.insert(2, "two");

            let first: Vec<_> = map.iter().collect();
            let second: Vec<_> = map.iter().collect();
            assert_eq!(first, second);
        }

        #[test]
        fn iter_reports_exact_size() {
            let mut map = FifoMap::new(10);
            map.insert("a", 1);
            map.insert("b", 2);
            map.remove(&"a");

            let iter = map.iter();
            assert_eq!(iter.len(), 1);
            assert_eq!(iter.size_hint(), (1, Some(1)));
        }

        #[test]
        fn iteration_skips_removed_keys() {
            let mut map = FifoMap::new(10);
            map.insert("a", 1);
            map.insert("b", 2);
            map.insert("c", 3);
            map.remove(&"b");

            let keys: Vec<_> = map.keys().copied().collect();
            assert_eq!(keys, vec!["a", "c"]);
        }

        #[test]
        fn values_follow_insertion_order() {
            let mut map = FifoMap::new(10);
            map.insert("a", 10);
            map.insert("b", 20);

            let values: Vec<_> = map.values().copied().collect();
            assert_eq!(values, vec![10, 20]);
        }

        #[test]
        fn for_each_visits_in_order() {
            let mut map = FifoMap::new(10);
            map.insert("a", 1);
            map.insert("b", 2);
            map.insert("c", 3);

            let mut visited = Vec::new();
            map.for_each(|key, value| visited.push((*key, *value)));
            assert_eq!(visited, vec![("a", 1), ("b", 2), ("c", 3)]);
        }

        #[test]
        fn ref_for_loop() {
            let mut map = FifoMap::new(10);
            map.insert("a", 1);
            map.insert("b", 2);

            let mut count = 0;
            for _ in &map {
                count += 1;
            }
            assert_eq!(count, 2);
            assert_eq!(map.len(), 2);
        }

        #[test]
        fn into_iter_drains_in_insertion_order() {
            let mut map = FifoMap::new(10);
            map.insert("a", 1);
            map.insert("b", 2);
            map.insert("c", 3);
            map.remove(&"b");

            let items: Vec<_> = map.into_iter().collect();
            assert_eq!(items, vec![("a", 1), ("c", 3)]);
        }

        #[test]
        fn extend_adds_entries_with_eviction() {
            let mut map = FifoMap::new(3);
            map.insert("a", 1);
            map.extend(vec![("b", 2), ("c", 3), ("d", 4)]);

            assert_eq!(map.len(), 3);
            assert!(!map.contains(&"a"));
            let keys: Vec<_> = map.keys().copied().collect();
            assert_eq!(keys, vec!["b", "c", "d"]);
        }
    }

    // ==============================================
    // Edge Cases
    // ==============================================

    mod edge_cases {
        use super::*;

        #[test]
        fn clear_then_reinsert_starts_fresh_order() {
            let mut map = FifoMap::new(3);
            map.insert("a", 1);
            map.insert("b", 2);
            map.insert("c", 3);

            map.clear();
            map.insert("d", 4);
            map.insert("e", 5);
            map.insert("f", 6);
            map.insert("g", 7); // Evicts "d", the oldest of the new order

            assert!(!map.contains(&"d"));
            let keys: Vec<_> = map.keys().copied().collect();
            assert_eq!(keys, vec!["e", "f", "g"]);
        }

        #[test]
        fn compact_drops_stale_entries() {
            let mut map = FifoMap::new(10);
            map.insert("a", 1);
            map.insert("b", 2);
            map.insert("c", 3);
            map.remove(&"a");

            assert!(map.stale_len() > 0);
            map.compact();
            assert_eq!(map.stale_len(), 0);

            let keys: Vec<_> = map.keys().copied().collect();
            assert_eq!(keys, vec!["b", "c"]);
        }

        #[test]
        fn approx_bytes_is_positive() {
            let map: FifoMap<u64, u64> = FifoMap::new(64);
            assert!(map.approx_bytes() >= std::mem::size_of::<FifoMap<u64, u64>>());
        }

        #[test]
        fn debug_output_reports_sizes() {
            let mut map = FifoMap::new(4);
            map.insert("a", 1);

            let dbg = format!("{:?}", map);
            assert!(dbg.contains("FifoMap"));
            assert!(dbg.contains("capacity: 4"));
            assert!(dbg.contains("len: 1"));
        }
    }

    // ==============================================
    // Invariants
    // ==============================================

    #[cfg(debug_assertions)]
    mod invariants {
        use super::*;

        #[test]
        fn after_operations() {
            let mut map = FifoMap::new(20);

            for i in 0..10 {
                map.insert(i, i * 10);
                map.check_invariants().unwrap();
            }

            map.get(&3);
            map.get(&5);
            map.check_invariants().unwrap();

            // Trigger eviction
            for i in 10..30 {
                map.insert(i, i);
                map.check_invariants().unwrap();
            }

            map.remove(&15);
            map.check_invariants().unwrap();

            map.pop_oldest();
            map.check_invariants().unwrap();

            map.clear();
            map.check_invariants().unwrap();
        }

        #[test]
        fn single_capacity_invariants() {
            let mut map = FifoMap::new(1);
            map.insert("a", 1);
            map.check_invariants().unwrap();
            map.insert("b", 2);
            map.check_invariants().unwrap();
            map.remove(&"b");
            map.check_invariants().unwrap();
        }
    }

    // ==============================================
    // Metrics
    // ==============================================

    #[cfg(feature = "metrics")]
    mod metrics_behavior {
        use super::*;

        #[test]
        fn get_counters_split_hits_and_misses() {
            let mut map = FifoMap::new(10);
            map.insert("a", 1);

            map.get(&"a");
            map.get(&"a");
            map.get(&"missing");

            let snapshot = map.metrics_snapshot();
            assert_eq!(snapshot.get_calls, 3);
            assert_eq!(snapshot.get_hits, 2);
            assert_eq!(snapshot.get_misses, 1);
        }

        #[test]
        fn insert_counters_split_new_and_update() {
            let mut map = FifoMap::new(10);
            map.insert("a", 1);
            map.insert("b", 2);
            map.insert("a", 10);

            let snapshot = map.metrics_snapshot();
            assert_eq!(snapshot.insert_calls, 3);
            assert_eq!(snapshot.insert_new, 2);
            assert_eq!(snapshot.insert_updates, 1);
        }

        #[test]
        fn eviction_counters_track_evictions() {
            let mut map = FifoMap::new(2);
            map.insert("a", 1);
            map.insert("b", 2);
            map.insert("c", 3);

            let snapshot = map.metrics_snapshot();
            assert_eq!(snapshot.evict_calls, 1);
            assert_eq!(snapshot.evicted_entries, 1);
            assert_eq!(snapshot.evict_scan_steps, 1);
            assert_eq!(snapshot.stale_skips, 0);
        }

        #[test]
        fn eviction_accounts_for_stale_skips() {
            let mut map = FifoMap::new(2);
            map.insert("a", 1);
            map.insert("b", 2);
            map.remove(&"a"); // Leaves a stale entry at the queue front
            map.insert("c", 3);
            map.insert("d", 4); // Eviction pops stale "a", then live "b"

            let snapshot = map.metrics_snapshot();
            assert_eq!(snapshot.evicted_entries, 1);
            assert_eq!(snapshot.evict_scan_steps, 2);
            assert_eq!(snapshot.stale_skips, 1);
            assert!(!map.contains(&"b"));
        }

        #[test]
        fn remove_counters_track_found() {
            let mut map = FifoMap::new(10);
            map.insert("a", 1);
            map.remove(&"a");
            map.remove(&"a");

            let snapshot = map.metrics_snapshot();
            assert_eq!(snapshot.remove_calls, 2);
            assert_eq!(snapshot.remove_found, 1);
        }

        #[test]
        fn pop_oldest_counters() {
            let mut map = FifoMap::new(10);
            map.insert("a", 1);
            map.pop_oldest();
            map.pop_oldest();

            let snapshot = map.metrics_snapshot();
            assert_eq!(snapshot.pop_oldest_calls, 2);
            assert_eq!(snapshot.pop_oldest_found, 1);
            assert_eq!(snapshot.pop_oldest_empty_or_stale, 1);
        }

        #[test]
        fn read_path_cells_record_through_shared_ref() {
            let mut map = FifoMap::new(10);
            map.insert("a", 1);
            map.insert("b", 2);

            map.peek_oldest();
            map.age_rank(&"b");

            let snapshot = map.metrics_snapshot();
            assert_eq!(snapshot.peek_oldest_calls, 1);
            assert_eq!(snapshot.peek_oldest_found, 1);
            assert_eq!(snapshot.age_rank_calls, 1);
            assert_eq!(snapshot.age_rank_found, 1);
            assert_eq!(snapshot.age_rank_scan_steps, 2); // Scanned "a", then found "b"
        }

        #[test]
        fn gauges_reflect_sizes() {
            let mut map = FifoMap::new(5);
            map.insert("a", 1);
            map.insert("b", 2);
            map.remove(&"a");

            let snapshot = map.metrics_snapshot();
            assert_eq!(snapshot.map_len, 1);
            assert_eq!(snapshot.insertion_order_len, map.order_len());
            assert_eq!(snapshot.capacity, 5);
        }
    }

    // ==============================================
    // Property Tests
    // ==============================================

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        #[derive(Debug, Clone)]
        enum Op {
            Insert(u32, u32),
            Get(u32),
            Remove(u32),
            PopOldest,
            Contains(u32),
            Clear,
        }

        fn op_strategy() -> impl Strategy<Value = Op> {
            prop_oneof![
                4 => (0u32..30, any::<u32>()).prop_map(|(k, v)| Op::Insert(k, v)),
                2 => (0u32..30).prop_map(Op::Get),
                2 => (0u32..30).prop_map(Op::Remove),
                1 => Just(Op::PopOldest),
                1 => (0u32..30).prop_map(Op::Contains),
                1 => Just(Op::Clear),
            ]
        }

        fn apply(map: &mut FifoMap<u32, u32>, op: Op) {
            match op {
                Op::Insert(k, v) => {
                    map.insert(k, v);
                },
                Op::Get(k) => {
                    map.get(&k);
                },
                Op::Remove(k) => {
                    map.remove(&k);
                },
                Op::PopOldest => {
                    map.pop_oldest();
                },
                Op::Contains(k) => {
                    map.contains(&k);
                },
                Op::Clear => map.clear(),
            }
        }

        proptest! {
            #[cfg_attr(miri, ignore)]
            #[test]
            fn prop_invariants_always_hold(
                capacity in 1usize..16,
                ops in prop::collection::vec(op_strategy(), 0..200)
            ) {
                let mut map: FifoMap<u32, u32> = FifoMap::new(capacity);
                for op in ops {
                    apply(&mut map, op);
                    prop_assert!(map.len() <= capacity);
                    #[cfg(debug_assertions)]
                    map.check_invariants().unwrap();
                }
            }

            #[cfg_attr(miri, ignore)]
            #[test]
            fn prop_iter_matches_pop_order(
                capacity in 1usize..16,
                ops in prop::collection::vec(op_strategy(), 0..200)
            ) {
                let mut map: FifoMap<u32, u32> = FifoMap::new(capacity);
                for op in ops {
                    apply(&mut map, op);
                }

                let iterated: Vec<u32> = map.keys().copied().collect();
                let mut popped = Vec::new();
                while let Some((key, _)) = map.pop_oldest() {
                    popped.push(key);
                }
                prop_assert_eq!(iterated, popped);
            }

            #[cfg_attr(miri, ignore)]
            #[test]
            fn prop_order_queue_stays_bounded(
                capacity in 1usize..16,
                ops in prop::collection::vec(op_strategy(), 0..200)
            ) {
                let mut map: FifoMap<u32, u32> = FifoMap::new(capacity);
                for op in ops {
                    apply(&mut map, op);
                    prop_assert!(map.order_len() <= 2 * map.len());
                }
            }
        }
    }
}
