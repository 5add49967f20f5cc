//! Insertion-ordered key queue with lazy deletion.
//!
//! Tracks the order in which keys were inserted and hands back the oldest
//! live key on demand. Instead of searching the queue on removal, removals
//! only drop the key from an authoritative index. The superseded queue entry
//! stays behind and is skipped when [`pop_front`](OrderQueue::pop_front)
//! walks over it.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────────────┐
//! │                          OrderQueue Layout                            │
//! │                                                                       │
//! │   ┌───────────────────────────────────────────────────────────────┐  │
//! │   │  index: FxHashMap<K, u64>   (authoritative live set)          │  │
//! │   │                                                               │  │
//! │   │    ┌─────────┬─────────┐                                      │  │
//! │   │    │  key    │  stamp  │                                      │  │
//! │   │    ├─────────┼─────────┤                                      │  │
//! │   │    │  "A"    │    0    │                                      │  │
//! │   │    │  "C"    │    2    │                                      │  │
//! │   │    │  "B"    │    3    │                                      │  │
//! │   │    └─────────┴─────────┘                                      │  │
//! │   │                                                               │  │
//! │   │    len() = 3 (live keys)                                      │  │
//! │   └───────────────────────────────────────────────────────────────┘  │
//! │                                                                       │
//! │   ┌───────────────────────────────────────────────────────────────┐  │
//! │   │  queue: VecDeque<Stamped<K>>   (may hold stale entries)       │  │
//! │   │                                                               │  │
//! │   │    front → ("A", 0)  ← live, matches index["A"]               │  │
//! │   │            ("B", 1)  ← STALE: index["B"] = 3, not 1           │  │
//! │   │            ("C", 2)  ← live                                   │  │
//! │   │    back  → ("B", 3)  ← live, "B" was re-pushed                │  │
//! │   │                                                               │  │
//! │   │    order_len() = 4 (includes stale entries)                   │  │
//! │   └───────────────────────────────────────────────────────────────┘  │
//! │                                                                       │
//! │   stamp: 4  (monotonic counter, next stamp to hand out)              │
//! └───────────────────────────────────────────────────────────────────────┘
//!
//! Push Flow
//! ─────────
//!   push_back("B"):
//!     1. index["B"] = stamp         (any older queue entry becomes stale)
//!     2. queue.push_back(("B", stamp))
//!     3. stamp += 1
//!
//! Pop Flow
//! ────────
//!   pop_front():
//!     loop:
//!       entry = queue.pop_front()  → ("B", 1)
//!       index["B"] == 1?           → No! index["B"] = 3
//!         skip (stale)
//!       entry = queue.pop_front()  → ("A", 0)
//!       index["A"] == 0?           → Yes!
//!         index.remove("A")
//!         return "A"
//!
//! Compact
//! ───────
//!   When order_len() >> len(), call compact() to drop stale entries:
//!     queue.retain(|entry| index[entry.key] == entry.stamp)
//! ```
//!
//! ## Key Concepts
//!
//! - **Lazy deletion**: Removal drops the key from the index only; the queue
//!   entry is skipped later when its stamp no longer matches
//! - **Stamps**: A monotonic counter distinguishes the current queue entry
//!   for a key from superseded ones
//! - **Periodic compaction**: When stale entries accumulate, `compact()` or
//!   `maybe_compact()` rebuilds the queue from live entries
//!
//! ## Operations
//!
//! | Operation       | Description                              | Complexity      |
//! |-----------------|------------------------------------------|-----------------|
//! | `push_back`     | Append key as newest                     | O(1) amortized  |
//! | `remove`        | Drop from index, queue entry goes stale  | O(1)            |
//! | `pop_front`     | Pop oldest live key, skipping stale      | Amortized O(1)  |
//! | `front`         | Peek oldest live key                     | Amortized O(1)  |
//! | `rank`          | Position of a key among live keys        | O(n)            |
//! | `compact`       | Drop all stale queue entries             | O(n)            |
//! | `maybe_compact` | Compact if queue too stale               | O(1) or O(n)    |
//!
//! ## Example Usage
//!
//! ```
//! use fifomap::order::OrderQueue;
//!
//! let mut order: OrderQueue<&str> = OrderQueue::new();
//! order.push_back("a");
//! order.push_back("b");
//! order.push_back("c");
//!
//! // Lazy removal: the queue entry stays behind as a stale marker
//! order.remove(&"b");
//! assert_eq!(order.len(), 2);
//! assert_eq!(order.order_len(), 3);
//!
//! // Pop skips the stale "b" entry automatically
//! assert_eq!(order.pop_front(), Some("a"));
//! assert_eq!(order.pop_front(), Some("c"));
//! assert_eq!(order.pop_front(), None);
//! ```
//!
//! ## Thread Safety
//!
//! `OrderQueue` is not thread-safe. Wrap in a mutex for concurrent access.
//!
//! ## Implementation Notes
//!
//! - The `VecDeque` front is the oldest position
//! - Re-pushing a live key moves it to the back (the old entry goes stale)
//! - `debug_validate_invariants()` available in debug/test builds

use std::collections::VecDeque;
use std::collections::vec_deque;
use std::hash::Hash;
use std::iter::FusedIterator;

use rustc_hash::FxHashMap;

/// A queue entry pairing a key with the stamp it was pushed under.
///
/// The entry is live while `index[key] == stamp`; anything else means it was
/// superseded or removed and gets skipped.
#[derive(Debug, Clone)]
struct Stamped<K> {
    key: K,
    stamp: u64,
}

/// Insertion-ordered key queue with O(1) lazy removal.
///
/// Maintains an authoritative `index` of live keys and a queue that may
/// contain stale entries. Removal drops the key from the index; stale queue
/// entries are skipped during [`pop_front`](Self::pop_front) and iteration.
///
/// # Type Parameters
///
/// - `K`: Key type (must be `Eq + Hash + Clone`)
///
/// # Example
///
/// ```
/// use fifomap::order::OrderQueue;
///
/// let mut order: OrderQueue<u32> = OrderQueue::new();
/// order.push_back(1);
/// order.push_back(2);
/// order.push_back(3);
/// order.remove(&2);
///
/// // Live keys in insertion order
/// let keys: Vec<u32> = order.iter().copied().collect();
/// assert_eq!(keys, vec![1, 3]);
/// ```
#[derive(Debug)]
pub struct OrderQueue<K> {
    queue: VecDeque<Stamped<K>>,
    index: FxHashMap<K, u64>,
    stamp: u64,
}

impl<K> OrderQueue<K>
where
    K: Eq + Hash + Clone,
{
    /// Creates an empty queue.
    ///
    /// # Example
    ///
    /// ```
    /// use fifomap::order::OrderQueue;
    ///
    /// let order: OrderQueue<String> = OrderQueue::new();
    /// assert!(order.is_empty());
    /// ```
    pub fn new() -> Self {
        Self {
            queue: VecDeque::new(),
            index: FxHashMap::default(),
            stamp: 0,
        }
    }

    /// Creates an empty queue with pre-allocated capacity.
    ///
    /// # Example
    ///
    /// ```
    /// use fifomap::order::OrderQueue;
    ///
    /// let order: OrderQueue<u64> = OrderQueue::with_capacity(1000);
    /// assert!(order.is_empty());
    /// ```
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            queue: VecDeque::with_capacity(capacity),
            index: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            stamp: 0,
        }
    }

    /// Appends `key` as the newest entry.
    ///
    /// If `key` is already live, it moves to the back: the index is restamped
    /// and the older queue entry becomes stale.
    ///
    /// # Example
    ///
    /// ```
    /// use fifomap::order::OrderQueue;
    ///
    /// let mut order: OrderQueue<&str> = OrderQueue::new();
    /// order.push_back("a");
    /// order.push_back("b");
    /// order.push_back("a");  // "a" is now newest
    ///
    /// assert_eq!(order.pop_front(), Some("b"));
    /// assert_eq!(order.pop_front(), Some("a"));
    /// ```
    pub fn push_back(&mut self, key: K) {
        let stamp = self.stamp;
        self.stamp = self.stamp.wrapping_add(1);
        self.index.insert(key.clone(), stamp);
        self.queue.push_back(Stamped { key, stamp });
    }

    /// Removes `key` from the live set, returning `true` if it was present.
    ///
    /// This only touches the index; the queue entry stays behind and is
    /// skipped by [`pop_front`](Self::pop_front) later.
    ///
    /// # Example
    ///
    /// ```
    /// use fifomap::order::OrderQueue;
    ///
    /// let mut order: OrderQueue<&str> = OrderQueue::new();
    /// order.push_back("a");
    ///
    /// assert!(order.remove(&"a"));
    /// assert!(!order.remove(&"a"));  // Already removed
    /// assert_eq!(order.pop_front(), None);
    /// ```
    pub fn remove(&mut self, key: &K) -> bool {
        self.index.remove(key).is_some()
    }

    /// Pops and returns the oldest live key, skipping stale entries.
    ///
    /// # Example
    ///
    /// ```
    /// use fifomap::order::OrderQueue;
    ///
    /// let mut order: OrderQueue<&str> = OrderQueue::new();
    /// order.push_back("old");
    /// order.push_back("new");
    ///
    /// assert_eq!(order.pop_front(), Some("old"));
    /// assert_eq!(order.pop_front(), Some("new"));
    /// assert_eq!(order.pop_front(), None);
    /// ```
    pub fn pop_front(&mut self) -> Option<K> {
        loop {
            let entry = self.queue.pop_front()?;
            match self.index.get(&entry.key) {
                Some(stamp) if *stamp == entry.stamp => {
                    self.index.remove(&entry.key);
                    return Some(entry.key);
                },
                _ => continue,
            }
        }
    }

    /// Returns the oldest live key without removing it.
    ///
    /// Stale entries at the front are skipped but not discarded.
    ///
    /// # Example
    ///
    /// ```
    /// use fifomap::order::OrderQueue;
    ///
    /// let mut order: OrderQueue<&str> = OrderQueue::new();
    /// order.push_back("a");
    /// order.push_back("b");
    /// order.remove(&"a");
    ///
    /// assert_eq!(order.front(), Some(&"b"));
    /// assert_eq!(order.len(), 1);  // Peek does not remove
    /// ```
    pub fn front(&self) -> Option<&K> {
        self.queue
            .iter()
            .find(|entry| matches!(self.index.get(&entry.key), Some(stamp) if *stamp == entry.stamp))
            .map(|entry| &entry.key)
    }

    /// Returns `true` if `key` is live.
    ///
    /// # Example
    ///
    /// ```
    /// use fifomap::order::OrderQueue;
    ///
    /// let mut order: OrderQueue<u32> = OrderQueue::new();
    /// order.push_back(7);
    ///
    /// assert!(order.contains(&7));
    /// assert!(!order.contains(&8));
    /// ```
    #[inline]
    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Returns `key`'s position among live keys, oldest first.
    ///
    /// Rank 0 is the next key [`pop_front`](Self::pop_front) would return.
    /// Returns `None` if `key` is not live.
    ///
    /// # Example
    ///
    /// ```
    /// use fifomap::order::OrderQueue;
    ///
    /// let mut order: OrderQueue<&str> = OrderQueue::new();
    /// order.push_back("a");
    /// order.push_back("b");
    /// order.push_back("c");
    /// order.remove(&"a");
    ///
    /// assert_eq!(order.rank(&"b"), Some(0));
    /// assert_eq!(order.rank(&"c"), Some(1));
    /// assert_eq!(order.rank(&"a"), None);
    /// ```
    pub fn rank(&self, key: &K) -> Option<usize> {
        if !self.contains(key) {
            return None;
        }
        self.iter().position(|live| live == key)
    }

    /// Returns the number of live keys.
    ///
    /// # Example
    ///
    /// ```
    /// use fifomap::order::OrderQueue;
    ///
    /// let mut order: OrderQueue<u32> = OrderQueue::new();
    /// assert_eq!(order.len(), 0);
    ///
    /// order.push_back(1);
    /// order.push_back(2);
    /// assert_eq!(order.len(), 2);
    /// ```
    #[inline]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Returns the underlying queue length (may exceed `len()` due to stale
    /// entries).
    ///
    /// # Example
    ///
    /// ```
    /// use fifomap::order::OrderQueue;
    ///
    /// let mut order: OrderQueue<&str> = OrderQueue::new();
    /// order.push_back("a");
    /// order.push_back("b");
    /// order.remove(&"a");
    ///
    /// assert_eq!(order.len(), 1);        // 1 live key
    /// assert_eq!(order.order_len(), 2);  // 2 queue entries (1 stale)
    /// ```
    #[inline]
    pub fn order_len(&self) -> usize {
        self.queue.len()
    }

    /// Returns `true` if there are no live keys.
    ///
    /// # Example
    ///
    /// ```
    /// use fifomap::order::OrderQueue;
    ///
    /// let mut order: OrderQueue<u32> = OrderQueue::new();
    /// assert!(order.is_empty());
    ///
    /// order.push_back(1);
    /// assert!(!order.is_empty());
    /// ```
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Returns an iterator over live keys, oldest first.
    ///
    /// Stale queue entries are skipped.
    ///
    /// # Example
    ///
    /// ```
    /// use fifomap::order::OrderQueue;
    ///
    /// let mut order: OrderQueue<u32> = OrderQueue::new();
    /// order.push_back(1);
    /// order.push_back(2);
    /// order.push_back(3);
    /// order.remove(&2);
    ///
    /// let keys: Vec<u32> = order.iter().copied().collect();
    /// assert_eq!(keys, vec![1, 3]);
    /// ```
    pub fn iter(&self) -> LiveKeys<'_, K> {
        LiveKeys {
            entries: self.queue.iter(),
            index: &self.index,
            remaining: self.index.len(),
        }
    }

    /// Clears all entries and resets the stamp counter.
    ///
    /// # Example
    ///
    /// ```
    /// use fifomap::order::OrderQueue;
    ///
    /// let mut order: OrderQueue<&str> = OrderQueue::new();
    /// order.push_back("a");
    /// order.push_back("b");
    ///
    /// order.clear();
    /// assert!(order.is_empty());
    /// assert_eq!(order.order_len(), 0);
    /// ```
    pub fn clear(&mut self) {
        self.queue.clear();
        self.index.clear();
        self.stamp = 0;
    }

    /// Clears all entries and shrinks internal storage.
    ///
    /// # Example
    ///
    /// ```
    /// use fifomap::order::OrderQueue;
    ///
    /// let mut order: OrderQueue<u64> = OrderQueue::with_capacity(1000);
    /// order.push_back(1);
    ///
    /// order.clear_shrink();
    /// assert!(order.is_empty());
    /// ```
    pub fn clear_shrink(&mut self) {
        self.clear();
        self.queue.shrink_to_fit();
        self.index.shrink_to_fit();
    }

    /// Drops all stale queue entries, keeping live keys in order.
    ///
    /// Call this periodically or when `order_len()` greatly exceeds `len()`.
    ///
    /// # Example
    ///
    /// ```
    /// use fifomap::order::OrderQueue;
    ///
    /// let mut order: OrderQueue<u32> = OrderQueue::new();
    /// for i in 0..10 {
    ///     order.push_back(i);
    ///     order.remove(&i);
    /// }
    /// order.push_back(99);
    /// assert_eq!(order.order_len(), 11);  // 10 stale entries
    ///
    /// order.compact();
    /// assert_eq!(order.order_len(), 1);   // Stale entries removed
    /// assert_eq!(order.front(), Some(&99));
    /// ```
    pub fn compact(&mut self) {
        let index = &self.index;
        self.queue
            .retain(|entry| matches!(index.get(&entry.key), Some(stamp) if *stamp == entry.stamp));
    }

    /// Compacts if the queue has grown too stale relative to the live set.
    ///
    /// Triggers compaction when `order_len() > len() * factor`.
    ///
    /// # Example
    ///
    /// ```
    /// use fifomap::order::OrderQueue;
    ///
    /// let mut order: OrderQueue<&str> = OrderQueue::new();
    /// order.push_back("a");
    /// order.push_back("a");
    /// order.push_back("a");  // order_len=3, len=1
    ///
    /// // Compact if order_len > len * 2
    /// order.maybe_compact(2);
    /// assert_eq!(order.order_len(), 1);
    /// ```
    pub fn maybe_compact(&mut self, factor: usize) {
        let factor = factor.max(1);
        if self.queue.len() > self.index.len().saturating_mul(factor) {
            self.compact();
        }
    }

    /// Returns an approximate memory footprint in bytes.
    ///
    /// # Example
    ///
    /// ```
    /// use fifomap::order::OrderQueue;
    ///
    /// let order: OrderQueue<u64> = OrderQueue::with_capacity(100);
    /// let bytes = order.approx_bytes();
    /// assert!(bytes > 0);
    /// ```
    pub fn approx_bytes(&self) -> usize {
        std::mem::size_of::<Self>()
            + self.queue.capacity() * std::mem::size_of::<Stamped<K>>()
            + self.index.capacity() * std::mem::size_of::<(K, u64)>()
    }

    #[cfg(any(test, debug_assertions))]
    /// Returns a cloned view of live keys in order for debugging.
    pub fn debug_snapshot_keys(&self) -> Vec<K> {
        self.iter().cloned().collect()
    }

    #[cfg(any(test, debug_assertions))]
    /// Validates internal invariants (debug/test builds only).
    pub fn debug_validate_invariants(&self) {
        assert!(self.index.len() <= self.queue.len());
        let live = self
            .queue
            .iter()
            .filter(|entry| matches!(self.index.get(&entry.key), Some(stamp) if *stamp == entry.stamp))
            .count();
        assert_eq!(live, self.index.len());
    }
}

impl<K> Default for OrderQueue<K>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Iterator
// ---------------------------------------------------------------------------

/// Iterator over live keys in insertion order.
///
/// Returned by [`OrderQueue::iter`]. Stale queue entries are skipped.
pub struct LiveKeys<'a, K> {
    entries: vec_deque::Iter<'a, Stamped<K>>,
    index: &'a FxHashMap<K, u64>,
    remaining: usize,
}

impl<'a, K> Iterator for LiveKeys<'a, K>
where
    K: Eq + Hash,
{
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = self.entries.next()?;
            match self.index.get(&entry.key) {
                Some(stamp) if *stamp == entry.stamp => {
                    self.remaining -= 1;
                    return Some(&entry.key);
                },
                _ => continue,
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K> ExactSizeIterator for LiveKeys<'_, K>
where
    K: Eq + Hash,
{
    fn len(&self) -> usize {
        self.remaining
    }
}

impl<K> FusedIterator for LiveKeys<'_, K> where K: Eq + Hash {}

impl<K> std::fmt::Debug for LiveKeys<'_, K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiveKeys")
            .field("remaining", &self.remaining)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_queue_push_pop_fifo_order() {
        let mut order = OrderQueue::new();
        order.push_back("a");
        order.push_back("b");
        order.push_back("c");

        assert_eq!(order.pop_front(), Some("a"));
        assert_eq!(order.pop_front(), Some("b"));
        assert_eq!(order.pop_front(), Some("c"));
        assert_eq!(order.pop_front(), None);
    }

    #[test]
    fn order_queue_repush_moves_key_to_back() {
        let mut order = OrderQueue::new();
        order.push_back("a");
        order.push_back("b");
        order.push_back("a");

        assert_eq!(order.len(), 2);
        assert_eq!(order.order_len(), 3);
        assert_eq!(order.pop_front(), Some("b"));
        assert_eq!(order.pop_front(), Some("a"));
    }

    #[test]
    fn order_queue_remove_leaves_stale_until_pop() {
        let mut order = OrderQueue::new();
        order.push_back("a");
        order.push_back("b");

        assert!(order.remove(&"a"));
        assert!(!order.remove(&"a"));
        assert_eq!(order.len(), 1);
        assert_eq!(order.order_len(), 2);

        assert_eq!(order.pop_front(), Some("b"));
        assert_eq!(order.order_len(), 0);
    }

    #[test]
    fn order_queue_front_skips_stale() {
        let mut order = OrderQueue::new();
        order.push_back("a");
        order.push_back("b");
        order.push_back("c");
        order.remove(&"a");
        order.remove(&"b");

        assert_eq!(order.front(), Some(&"c"));
        assert_eq!(order.len(), 1);
    }

    #[test]
    fn order_queue_front_empty_returns_none() {
        let mut order: OrderQueue<u32> = OrderQueue::new();
        assert_eq!(order.front(), None);

        order.push_back(1);
        order.remove(&1);
        assert_eq!(order.front(), None);
    }

    #[test]
    fn order_queue_rank_reflects_live_positions() {
        let mut order = OrderQueue::new();
        order.push_back("a");
        order.push_back("b");
        order.push_back("c");
        order.remove(&"b");

        assert_eq!(order.rank(&"a"), Some(0));
        assert_eq!(order.rank(&"c"), Some(1));
        assert_eq!(order.rank(&"b"), None);
    }

    #[test]
    fn order_queue_iter_live_in_order() {
        let mut order = OrderQueue::new();
        order.push_back(1);
        order.push_back(2);
        order.push_back(3);
        order.push_back(4);
        order.remove(&2);
        order.remove(&4);

        let iter = order.iter();
        assert_eq!(iter.len(), 2);
        let keys: Vec<u32> = iter.copied().collect();
        assert_eq!(keys, vec![1, 3]);
    }

    #[test]
    fn order_queue_compact_preserves_order() {
        let mut order = OrderQueue::new();
        for i in 0..10u32 {
            order.push_back(i);
        }
        for i in (0..10).step_by(2) {
            order.remove(&i);
        }

        order.compact();
        assert_eq!(order.order_len(), order.len());
        let keys: Vec<u32> = order.iter().copied().collect();
        assert_eq!(keys, vec![1, 3, 5, 7, 9]);
        order.debug_validate_invariants();
    }

    #[test]
    fn order_queue_maybe_compact_triggers_on_factor() {
        let mut order = OrderQueue::new();
        order.push_back("a");
        order.push_back("a");
        order.push_back("a");
        order.push_back("b");
        assert!(order.order_len() > order.len());

        order.maybe_compact(1);
        assert_eq!(order.order_len(), order.len());
        assert_eq!(order.pop_front(), Some("a"));
        assert_eq!(order.pop_front(), Some("b"));
    }

    #[test]
    fn order_queue_maybe_compact_zero_factor_clamps_to_one() {
        let mut order = OrderQueue::new();
        order.push_back("a");
        order.push_back("a");

        order.maybe_compact(0);
        assert_eq!(order.order_len(), 1);
    }

    #[test]
    fn order_queue_clear_resets_state() {
        let mut order = OrderQueue::new();
        order.push_back("a");
        order.push_back("b");
        order.remove(&"a");

        order.clear();
        assert!(order.is_empty());
        assert_eq!(order.order_len(), 0);

        order.push_back("c");
        assert_eq!(order.pop_front(), Some("c"));
    }

    #[test]
    fn order_queue_pop_through_heavy_staleness() {
        let mut order = OrderQueue::new();
        for i in 0..100u32 {
            order.push_back(i);
        }
        for i in 0..99u32 {
            order.remove(&i);
        }

        assert_eq!(order.pop_front(), Some(99));
        assert_eq!(order.pop_front(), None);
        assert_eq!(order.order_len(), 0);
    }

    #[test]
    fn order_queue_debug_invariants_hold() {
        let mut order = OrderQueue::new();
        order.push_back("a");
        order.push_back("b");
        order.remove(&"a");
        order.push_back("b");
        order.debug_validate_invariants();

        let keys = order.debug_snapshot_keys();
        assert_eq!(keys, vec!["b"]);
    }
}
