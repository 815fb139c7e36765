//! Memory-reference characterization and synthetic trace generation.
//!
//! This crate learns a statistical model of an application's memory references from an
//! address trace and generates new traces that resemble it:
//! 1. **Common:** Block geometry, access types, constants, and errors.
//! 2. **Model:** Reuse-distance tracking, the cycle activity chain, per-block locality
//!    trees, persisted profiles, and the profile mixer.
//! 3. **Simulation:** Trace parsing, characterization, synthesis, and output formats.
//! 4. **Configuration and Statistics:** TOML run settings and run reports.
//!
//! A typical round trip characterizes a trace with [`sim::Profiler`], mixes one or more
//! profiles with [`model::ProfileMixer`], and feeds the composite to
//! [`sim::TraceSynthesizer`].

/// Common types and constants (blocks, access types, errors).
pub mod common;
/// Run configuration (defaults, `[profiler]` and `[generator]` sections).
pub mod config;
/// Statistical model (LRU, reuse distance, activity, locality trees, profiles, mixing).
pub mod model;
/// Parsing, characterization, synthesis, and output formats.
pub mod sim;
/// Run statistics collection and reporting.
pub mod stats;

/// Crate error type and result alias.
pub use crate::common::{Error, Result};
/// Root configuration type; read with `Config::from_file`.
pub use crate::config::Config;
/// Persisted application profile.
pub use crate::model::Profile;
