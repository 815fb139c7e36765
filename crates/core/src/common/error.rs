//! Error definitions.
//!
//! Every failure the pipeline can report is a variant of [`Error`]. It provides:
//! 1. **Validation Failures:** Bad block sizes, bin counts, weights, shapes, and configuration.
//! 2. **Run Termination:** Working-set exhaustion and activity models that never go active.
//! 3. **I/O:** File access, trace syntax, and (de)serialization of profiles and configuration.
//!
//! None of these are retried; any error aborts the run that produced it.

use std::io;
use std::path::PathBuf;

use thiserror::Error as ThisError;

/// Convenience alias for results carrying [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while characterizing traces, mixing profiles, or synthesizing traces.
#[derive(Debug, ThisError)]
pub enum Error {
    /// Block size is not a power of two, or is smaller than 8 bytes.
    #[error("block size must be a power of two >= 8 (got {0})")]
    InvalidBlockSize(u64),

    /// Locality trees need at least one reuse-distance bin.
    #[error("bin count must be at least 1 (got {0})")]
    InvalidBinCount(usize),

    /// A synthesized trace must contain at least one access.
    #[error("trace length must be at least 1 (got {0})")]
    InvalidTraceLength(u64),

    /// A mixing weight is negative (or not a number).
    #[error("weight {index} is negative or not a number ({value})")]
    NegativeWeight {
        /// Position of the offending weight.
        index: usize,
        /// The weight value.
        value: f64,
    },

    /// All mixing weights are zero, so no composite can be formed.
    #[error("mixing weights sum to zero")]
    ZeroWeightSum,

    /// Weight vector is non-empty but does not have one entry per profile.
    #[error("expected 0 or {profiles} weights, got {weights}")]
    WeightCountMismatch {
        /// Number of profiles being mixed.
        profiles: usize,
        /// Number of weights supplied.
        weights: usize,
    },

    /// Profiles being mixed were collected with different block sizes.
    #[error("all profiles must share one block size ({expected} != {found})")]
    BlockSizeMismatch {
        /// Block size of the first profile.
        expected: u64,
        /// Conflicting block size.
        found: u64,
    },

    /// Mixing was requested with no profiles.
    #[error("at least one profile is required")]
    NoProfiles,

    /// A probability or count table does not have the expected dimensions.
    #[error("{what}: expected shape {expected}, found {found}")]
    ShapeMismatch {
        /// Name of the table being checked.
        what: &'static str,
        /// Expected dimensions.
        expected: String,
        /// Actual dimensions.
        found: String,
    },

    /// Configuration is syntactically valid but semantically wrong.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Trace pattern failed to compile.
    #[error("invalid trace pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// A trace line matched the pattern but could not be interpreted.
    #[error("malformed trace line {line}: {reason}")]
    MalformedTrace {
        /// 1-based line number.
        line: usize,
        /// What was wrong with it.
        reason: String,
    },

    /// A probability vector cannot be sampled (empty, all zero, or non-finite).
    #[error("{0} is not a samplable distribution")]
    InvalidDistribution(&'static str),

    /// The activity model assigns zero probability to leaving the inactive state.
    #[error("activity model never transitions from inactive to active")]
    InactiveModel,

    /// A compulsory miss was sampled after every working-set block had been introduced.
    #[error(
        "working set exhausted: all {working_set} blocks introduced, {emitted} accesses emitted"
    )]
    WorkingSetExhausted {
        /// Size of the composite working set.
        working_set: usize,
        /// Accesses written before termination.
        emitted: u64,
    },

    /// File could not be opened, read, or written.
    #[error("{}: {source}", .path.display())]
    Io {
        /// File being accessed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Writing a synthesized record failed.
    #[error("failed to write trace output: {0}")]
    Output(#[from] io::Error),

    /// Profile could not be encoded or decoded.
    #[error("profile serialization: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration file could not be parsed.
    #[error("configuration parse: {0}")]
    Toml(#[from] toml::de::Error),
}

impl Error {
    /// Wraps an I/O error with the path it concerns.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Builds a [`Error::ShapeMismatch`] from two displayable shapes.
    pub fn shape(
        what: &'static str,
        expected: impl std::fmt::Display,
        found: impl std::fmt::Display,
    ) -> Self {
        Self::ShapeMismatch {
            what,
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }
}
