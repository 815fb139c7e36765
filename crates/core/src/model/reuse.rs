//! Reuse-Distance Tracker.
//!
//! Computes the reuse distance of every block reference and grows the working set.
//! A reference to a block never seen before is a compulsory miss (distance 0) and appends
//! the block to the working set; a reference to a known block at LRU position `p` has
//! distance `p + 1`.

use super::lru::LruStack;

/// Reuse distance of a compulsory miss.
pub const COMPULSORY: usize = 0;

/// LRU-ordered working-set tracker.
#[derive(Clone, Debug, Default)]
pub struct ReuseTracker {
    lru: LruStack<u64>,
    working_set: Vec<u64>,
}

impl ReuseTracker {
    /// Creates an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a reference to `block` and returns its reuse distance.
    ///
    /// # Arguments
    ///
    /// * `block` - Block base address (already masked to the block boundary).
    ///
    /// # Returns
    ///
    /// `0` if the block was never referenced, otherwise `1 +` its LRU position before
    /// this reference.
    pub fn record_access(&mut self, block: u64) -> usize {
        match self.lru.touch(block) {
            Some(position) => position + 1,
            None => {
                self.working_set.push(block);
                COMPULSORY
            }
        }
    }

    /// Distinct blocks in first-reference order.
    #[inline]
    pub fn working_set(&self) -> &[u64] {
        &self.working_set
    }

    /// Number of distinct blocks referenced so far.
    #[inline]
    pub fn working_set_size(&self) -> usize {
        self.working_set.len()
    }

    /// Blocks from most to least recently used.
    pub fn lru_order(&self) -> impl Iterator<Item = u64> + '_ {
        self.lru.iter()
    }

    /// Consumes the tracker, returning the working set in first-reference order.
    pub fn into_working_set(self) -> Vec<u64> {
        self.working_set
    }
}
