//! Statistical memory-reference model.
//!
//! This module holds the learned model and the structures that build and sample it:
//! 1. **Temporal Locality:** LRU stack and reuse-distance tracking over blocks.
//! 2. **Activity:** Two-state Markov chain over active/inactive memory cycles.
//! 3. **Spatial Locality:** Per-block binary locality trees down to word granularity.
//! 4. **Profiles:** The persisted per-application model and the weighted mixer that
//!    combines several into one composite.

/// Cycle activity Markov chain.
pub mod activity;

/// Binary locality tree over block offsets.
pub mod locality;

/// Recency-ordered stack with logarithmic position queries.
pub mod lru;

/// Weighted profile combination.
pub mod mixer;

/// Probability vector helpers.
pub mod pmf;

/// Persisted application profile.
pub mod profile;

/// Reuse-distance tracking.
pub mod reuse;

pub use activity::{ActivityModel, TransitionMatrix};
pub use locality::{AlphaTable, LocalityTree};
pub use lru::LruStack;
pub use mixer::{CompositeModel, ProfileMixer};
pub use profile::{Alphas, Profile};
pub use reuse::ReuseTracker;
