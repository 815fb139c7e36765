//! # Unit Components
//!
//! Tests grouped by the layer they exercise: common types, the statistical model,
//! simulation drivers, configuration, and statistics.

/// Block geometry and error formatting.
pub mod common;




/// Run statistics.
pub mod stats;
