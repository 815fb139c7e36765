//! Global constants.
//!
//! This module defines the fixed parameters of the memory model. It includes:
//! 1. **Granularity:** Word size at which locality trees bottom out.
//! 2. **Defaults:** Block size and bin count used when a configuration omits them.
//! 3. **Output:** Placeholder data carried by synthesized stores.

/// Size of a memory word in bytes; locality trees stop splitting at this granularity.
pub const WORD_BYTES: u64 = 4;

/// Smallest legal block size in bytes (a tree needs at least one level).
pub const MIN_BLOCK_SIZE: u64 = 8;

/// Largest legal block size in bytes: the whole 32-bit address space traces are masked to.
pub const MAX_BLOCK_SIZE: u64 = 1 << 32;

/// Default block size in bytes.
pub const DEFAULT_BLOCK_SIZE: u64 = 512;

/// Default number of reuse-distance bins per locality tree.
pub const DEFAULT_BINS: usize = 1;

/// Data value written by every synthesized store in the STL output format.
pub const STORE_DATA_PLACEHOLDER: u64 = 0xABCD;
