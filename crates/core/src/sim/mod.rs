//! Characterization and synthesis drivers.
//!
//! This module connects the statistical model to trace text:
//! 1. **Parsing:** Classifying trace lines as references or inactive cycles.
//! 2. **Characterization:** Building a profile from a trace.
//! 3. **Synthesis:** Generating references from one or more mixed profiles.
//! 4. **Formatting:** Writing synthesized references in a selectable convention.

/// Output trace conventions.
pub mod formats;

/// Trace line classification.
pub mod parser;

/// Trace characterization.
pub mod profiler;

/// Synthetic trace generation.
pub mod synthesizer;

pub use formats::{OvpFormat, StlFormat, TraceFormat};
pub use parser::{TraceEvent, TraceParser};
pub use profiler::Profiler;
pub use synthesizer::TraceSynthesizer;
