//! Block geometry.
//!
//! A block is the unit of reuse-distance accounting. This module provides:
//! 1. **Validation:** Block sizes must be powers of two no smaller than eight bytes.
//! 2. **Masking:** Splitting a byte address into its block base and in-block offset.
//! 3. **Tree Shape:** The locality tree height implied by the block size.

use super::constants::{MAX_BLOCK_SIZE, MIN_BLOCK_SIZE, WORD_BYTES};
use super::error::{Error, Result};

/// Validated block size together with its derived masks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockGeometry {
    size: u64,
    mask: u64,
}

impl BlockGeometry {
    /// Creates a geometry for `size`-byte blocks.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidBlockSize`] if `size` is not a power of two, is smaller
    /// than 8 bytes, or exceeds the 32-bit address space.
    pub fn new(size: u64) -> Result<Self> {
        if !size.is_power_of_two() || !(MIN_BLOCK_SIZE..=MAX_BLOCK_SIZE).contains(&size) {
            return Err(Error::InvalidBlockSize(size));
        }
        Ok(Self {
            size,
            mask: !(size - 1),
        })
    }

    /// Block size in bytes.
    #[inline]
    pub const fn size(&self) -> u64 {
        self.size
    }

    /// Base address of the block containing `addr`.
    #[inline(always)]
    pub const fn block_of(&self, addr: u64) -> u64 {
        addr & self.mask
    }

    /// Byte offset of `addr` inside its block.
    #[inline(always)]
    pub const fn offset_of(&self, addr: u64) -> u64 {
        addr & !self.mask
    }

    /// Height of the locality tree for this block size: `log2(size / 4)`.
    #[inline]
    pub const fn tree_height(&self) -> usize {
        (self.size / WORD_BYTES).trailing_zeros() as usize
    }

    /// Number of locality counter pairs for `bins` reuse-distance bins (`bins × height`).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidBinCount`] if `bins` is zero or the count overflows.
    pub fn counter_len(&self, bins: usize) -> Result<usize> {
        if bins == 0 {
            return Err(Error::InvalidBinCount(bins));
        }
        bins.checked_mul(self.tree_height())
            .ok_or(Error::InvalidBinCount(bins))
    }
}
