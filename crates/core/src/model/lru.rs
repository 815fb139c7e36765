//! Recency-Ordered Stack.
//!
//! Keeps a set of keys ordered from most to least recently used and answers the two
//! questions reuse-distance modelling asks of it:
//! 1. **Position Lookup:** How many distinct keys were touched since `key` was last touched.
//! 2. **Rank Lookup:** Which key currently sits at a given recency position.
//!
//! Instead of shifting a vector on every access (the cost the cache LRU policy accepts
//! for small associativities), each access is stamped with a logical time. A Fenwick
//! tree over the time slots marks the slots holding the latest access of some key, so
//! both lookups are prefix-sum queries.
//!
//! # Performance
//!
//! - **Time Complexity:**
//!   - `position()`, `touch()`, `get()`: O(log T) where T is the slot capacity
//!   - compaction: O(T), amortized O(1) per access
//! - **Space Complexity:** O(K) where K is the number of distinct keys

use std::collections::HashMap;
use std::hash::Hash;

/// Slot capacity allocated on the first compaction.
const MIN_SLOTS: usize = 16;

/// LRU-ordered set of keys with logarithmic position and rank queries.
#[derive(Clone, Debug)]
pub struct LruStack<K> {
    /// Latest time slot of each key.
    stamps: HashMap<K, usize>,
    /// Key owning each time slot, `None` once superseded by a newer access.
    owners: Vec<Option<K>>,
    /// 1-indexed Fenwick tree over `owners`; a slot counts 1 while it is live.
    fenwick: Vec<usize>,
    /// Next free time slot.
    clock: usize,
}

impl<K: Copy + Eq + Hash> Default for LruStack<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Copy + Eq + Hash> LruStack<K> {
    /// Creates an empty stack.
    pub fn new() -> Self {
        Self {
            stamps: HashMap::new(),
            owners: Vec::new(),
            fenwick: vec![0],
            clock: 0,
        }
    }

    /// Number of distinct keys in the stack.
    #[inline]
    pub fn len(&self) -> usize {
        self.stamps.len()
    }

    /// Returns `true` if no key has been touched.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.stamps.is_empty()
    }

    /// Recency position of `key`: 0 for the most recently used key.
    pub fn position(&self, key: &K) -> Option<usize> {
        let slot = *self.stamps.get(key)?;
        Some(self.len() - self.prefix(slot))
    }

    /// Moves `key` to the front, inserting it if absent.
    ///
    /// # Returns
    ///
    /// The position `key` held before the move, or `None` if it was not present.
    pub fn touch(&mut self, key: K) -> Option<usize> {
        let previous = self.stamps.get(&key).copied();
        let position = previous.map(|slot| self.len() - self.prefix(slot));
        if let Some(slot) = previous {
            self.owners[slot] = None;
            self.decrement(slot);
        }
        if self.clock == self.owners.len() {
            self.compact();
        }
        let slot = self.clock;
        self.clock += 1;
        self.owners[slot] = Some(key);
        self.increment(slot);
        let _ = self.stamps.insert(key, slot);
        position
    }

    /// Key at recency `position` (0 = most recently used).
    pub fn get(&self, position: usize) -> Option<K> {
        let len = self.len();
        if position >= len {
            return None;
        }
        let slot = self.slot_with_rank(len - position);
        self.owners.get(slot).copied().flatten()
    }

    /// Keys from most to least recently used.
    pub fn iter(&self) -> impl Iterator<Item = K> + '_ {
        self.owners[..self.clock].iter().rev().filter_map(|k| *k)
    }

    /// Number of live slots in `0..=slot`.
    fn prefix(&self, slot: usize) -> usize {
        let mut i = slot + 1;
        let mut sum = 0;
        while i > 0 {
            sum += self.fenwick[i];
            i -= i & i.wrapping_neg();
        }
        sum
    }

    fn increment(&mut self, slot: usize) {
        let mut i = slot + 1;
        while i < self.fenwick.len() {
            self.fenwick[i] += 1;
            i += i & i.wrapping_neg();
        }
    }

    fn decrement(&mut self, slot: usize) {
        let mut i = slot + 1;
        while i < self.fenwick.len() {
            self.fenwick[i] -= 1;
            i += i & i.wrapping_neg();
        }
    }

    /// Smallest slot whose inclusive prefix count equals `rank` (1-based).
    fn slot_with_rank(&self, rank: usize) -> usize {
        let n = self.fenwick.len() - 1;
        let mut pos = 0;
        let mut remaining = rank;
        let mut step = if n == 0 { 0 } else { 1 << n.ilog2() };
        while step > 0 {
            let next = pos + step;
            if next <= n && self.fenwick[next] < remaining {
                pos = next;
                remaining -= self.fenwick[next];
            }
            step >>= 1;
        }
        pos
    }

    /// Packs live keys into the lowest slots, preserving order, and doubles headroom.
    fn compact(&mut self) {
        let live: Vec<K> = self.owners[..self.clock].iter().filter_map(|k| *k).collect();
        let capacity = MIN_SLOTS.max(2 * (live.len() + 1));

        self.owners = vec![None; capacity];
        for (slot, key) in live.iter().enumerate() {
            self.owners[slot] = Some(*key);
            let _ = self.stamps.insert(*key, slot);
        }
        self.clock = live.len();

        // Linear-time Fenwick build.
        self.fenwick = vec![0; capacity + 1];
        for i in 1..=capacity {
            if self.owners[i - 1].is_some() {
                self.fenwick[i] += 1;
            }
            let parent = i + (i & i.wrapping_neg());
            if parent <= capacity {
                self.fenwick[parent] += self.fenwick[i];
            }
        }
    }
}
