//! Common utilities and types used throughout the characterization and synthesis pipeline.
//!
//! This module provides the building blocks shared by every other module. It includes:
//! 1. **Block Geometry:** Validated block sizes and address-to-block masking.
//! 2. **Constants:** Word size, default block size, and output placeholders.
//! 3. **Memory Access:** Load/store classification and per-cycle activity states.
//! 4. **Error Handling:** The crate-wide error type and result alias.

/// Block geometry and address masking.
pub mod addr;

/// Common constants used throughout the crate.
pub mod constants;

/// Memory access and cycle activity type definitions.
pub mod data;

/// Error types.
pub mod error;

pub use addr::BlockGeometry;
pub use constants::{DEFAULT_BLOCK_SIZE, WORD_BYTES};
pub use data::{AccessRecord, AccessType, ActivityState};
pub use error::{Error, Result};
