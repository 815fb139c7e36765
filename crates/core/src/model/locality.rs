//! Locality Tree.
//!
//! Recursive binary partition of one block's address range, used to model spatial
//! locality below block granularity. It provides:
//! 1. **Observation:** Walking a real reference from the root to its word, counting at
//!    each level whether the same half as last time was referenced (reuse) or not.
//! 2. **Normalization:** Turning the reuse/non-reuse counts into per-level "alpha" values
//!    (probability of reuse).
//! 3. **Sampling:** Walking the same tree with the alpha values to produce a word offset.
//!
//! # Layout
//!
//! Nodes live in a flat array with implicit heap indexing: the root (the whole block) is
//! node 0 and the children of node `n` are `2n + 1` (left, lower half) and `2n + 2`
//! (right, upper half). Each node carries a single "last used" mark; of two siblings at
//! most one is marked. Leaves are 4-byte words, so a tree over `B`-byte blocks has height
//! `H = log2(B / 4)` and `B / 2 - 1` nodes.
//!
//! Counters are kept per reuse-distance bin and per level, where the level of a subset of
//! `S` bytes is `log2(S / 4) - 1` (the root's level is `H - 1`, the level splitting 8-byte
//! subsets into words is 0). Every counter is a `[reuse, non_reuse]` pair.

use rand::Rng;

use super::pmf::bernoulli;
use crate::common::{BlockGeometry, Error, Result, WORD_BYTES};

/// Index of the reuse count within a counter pair.
pub const REUSE: usize = 0;
/// Index of the non-reuse count within a counter pair.
pub const NON_REUSE: usize = 1;

/// Counter table shaped `[bin][level][REUSE | NON_REUSE]`.
pub type AlphaTable = Vec<Vec<[f64; 2]>>;

/// Identifier of the child of `parent` on `side` (0 = left, 1 = right).
#[inline(always)]
pub const fn child(parent: usize, side: usize) -> usize {
    2 * parent + 1 + side
}

/// Identifier of the parent of `child`. The root has no parent.
#[inline(always)]
pub const fn parent(child: usize) -> usize {
    (child - 1) / 2
}

/// Identifier of the other child of `child`'s parent.
#[inline(always)]
pub const fn sibling(child: usize) -> usize {
    if child % 2 == 1 { child + 1 } else { child - 1 }
}

/// Tree level of a subset of `subset_size` bytes: `log2(subset_size / 4) - 1`.
#[inline(always)]
pub const fn tree_level(subset_size: u64) -> usize {
    (subset_size / WORD_BYTES).trailing_zeros() as usize - 1
}

/// Spatial locality tree over one block.
#[derive(Clone, Debug, PartialEq)]
pub struct LocalityTree {
    block_size: u64,
    height: usize,
    bins: usize,
    /// Last-used mark of every node.
    marks: Vec<bool>,
    /// Counter pairs indexed `bin * height + level`.
    counters: Vec<[f64; 2]>,
}

impl LocalityTree {
    /// Creates an untouched tree with zeroed counters.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidBlockSize`] for an illegal `block_size` and
    /// [`Error::InvalidBinCount`] if `bins` is zero or its counters cannot be allocated.
    pub fn new(block_size: u64, bins: usize) -> Result<Self> {
        let geometry = BlockGeometry::new(block_size)?;
        let counters = filled(geometry.counter_len(bins)?, [0.0; 2])
            .ok_or(Error::InvalidBinCount(bins))?;
        let marks = usize::try_from(block_size / 2 - 1)
            .ok()
            .and_then(|len| filled(len, false))
            .ok_or(Error::InvalidBlockSize(block_size))?;
        Ok(Self {
            block_size,
            height: geometry.tree_height(),
            bins,
            marks,
            counters,
        })
    }

    /// Creates an untouched tree whose counters are taken from `table`.
    ///
    /// The bin count is the table's outer length.
    ///
    /// # Errors
    ///
    /// Fails like [`LocalityTree::new`] and [`LocalityTree::load`].
    pub fn from_table(block_size: u64, table: &[Vec<[f64; 2]>]) -> Result<Self> {
        let mut tree = Self::new(block_size, table.len())?;
        tree.load(table)?;
        Ok(tree)
    }

    /// Block size this tree partitions.
    #[inline]
    pub const fn block_size(&self) -> u64 {
        self.block_size
    }

    /// Number of levels (`log2(block_size / 4)`).
    #[inline]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Number of reuse-distance bins.
    #[inline]
    pub const fn bins(&self) -> usize {
        self.bins
    }

    /// Returns whether `node` currently carries the last-used mark.
    #[inline]
    pub fn is_marked(&self, node: usize) -> bool {
        self.marks.get(node).copied().unwrap_or(false)
    }

    /// Bin used for reuse distance `reuse_distance`; distances at or past the last bin share it.
    #[inline]
    pub fn bin_of(&self, reuse_distance: usize) -> usize {
        reuse_distance.min(self.bins - 1)
    }

    /// Counter pair `[reuse, non_reuse]` at `bin` and `level`.
    #[inline]
    pub fn counter(&self, bin: usize, level: usize) -> [f64; 2] {
        self.counters[bin * self.height + level]
    }

    /// Probability of reuse at `bin` and `level`; 1.0 when there is no evidence.
    pub fn alpha(&self, bin: usize, level: usize) -> f64 {
        let [reuse, non_reuse] = self.counter(bin, level);
        let total = reuse + non_reuse;
        if total > 0.0 { reuse / total } else { 1.0 }
    }

    /// Records one real reference.
    ///
    /// # Arguments
    ///
    /// * `address` - Referenced byte address; only the in-block bits are used.
    /// * `reuse_distance` - Reuse distance of the reference's block (0 = compulsory).
    pub fn observe(&mut self, address: u64, reuse_distance: usize) {
        let base = self.bin_of(reuse_distance) * self.height;
        let mut node = 0;
        let mut size = self.block_size;

        while size > WORD_BYTES {
            let half = size >> 1;
            let used = child(node, usize::from(address & half != 0));
            let other = sibling(used);
            let idx = base + tree_level(size);

            if !(self.marks[used] || self.marks[other]) {
                // First touch below this node: nothing to compare against.
                self.marks[used] = true;
            } else if self.marks[used] {
                self.counters[idx][REUSE] += 1.0;
            } else {
                self.counters[idx][NON_REUSE] += 1.0;
                self.marks[used] = true;
                self.marks[other] = false;
            }

            node = used;
            size = half;
        }
    }

    /// Draws a word offset within the block, updating the last-used marks.
    ///
    /// # Returns
    ///
    /// A word-aligned offset in `0..block_size`.
    pub fn sample<R: Rng + ?Sized>(&mut self, reuse_distance: usize, rng: &mut R) -> u64 {
        let bin = self.bin_of(reuse_distance);
        let mut node = 0;
        let mut size = self.block_size;
        let mut offset = 0;

        while size > WORD_BYTES {
            let half = size >> 1;
            let left = child(node, 0);
            let right = child(node, 1);

            let side = if !(self.marks[left] || self.marks[right]) {
                let side = usize::from(rng.gen_bool(0.5));
                self.marks[child(node, side)] = true;
                side
            } else {
                let marked = usize::from(self.marks[right]);
                if bernoulli(rng, self.alpha(bin, tree_level(size))) {
                    marked
                } else {
                    self.marks[child(node, marked)] = false;
                    self.marks[child(node, 1 - marked)] = true;
                    1 - marked
                }
            };

            if side == 1 {
                offset |= half;
            }
            node = child(node, side);
            size = half;
        }
        offset
    }

    /// Normalizes every counter pair into `[alpha, 1 - alpha]`.
    ///
    /// Pairs without evidence become `[1.0, 0.0]`: continued use is assumed.
    pub fn finalize(&mut self) {
        for pair in &mut self.counters {
            let total = pair[REUSE] + pair[NON_REUSE];
            if total > 0.0 {
                pair[REUSE] /= total;
                pair[NON_REUSE] /= total;
            } else {
                *pair = [1.0, 0.0];
            }
        }
    }

    /// Replaces all counters with `table`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ShapeMismatch`] unless `table` is shaped `bins × height × 2`.
    pub fn load(&mut self, table: &[Vec<[f64; 2]>]) -> Result<()> {
        let expected = format!("{} x {} x 2", self.bins, self.height);
        if table.len() != self.bins {
            return Err(Error::shape(
                "locality table",
                expected,
                format!("{} x ? x 2", table.len()),
            ));
        }
        if let Some(row) = table.iter().find(|row| row.len() != self.height) {
            return Err(Error::shape(
                "locality table",
                expected,
                format!("{} x {} x 2", table.len(), row.len()),
            ));
        }
        for (dst, src) in self.counters.iter_mut().zip(table.iter().flatten()) {
            *dst = *src;
        }
        Ok(())
    }

    /// Copies the counters out as a `bins × height` table.
    pub fn table(&self) -> AlphaTable {
        self.counters
            .chunks(self.height)
            .map(<[[f64; 2]]>::to_vec)
            .collect()
    }
}

/// `len` copies of `value`, or `None` if the allocation fails.
fn filled<T: Clone>(len: usize, value: T) -> Option<Vec<T>> {
    let mut out = Vec::new();
    out.try_reserve_exact(len).ok()?;
    out.resize(len, value);
    Some(out)
}
