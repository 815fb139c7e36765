//! Configuration for characterization and synthesis runs.
//!
//! This module defines the structures read from a TOML configuration file. It provides:
//! 1. **Defaults:** Block size, bin count, trace pattern, and access markers.
//! 2. **Structures:** A `[profiler]` section for characterization and a `[generator]`
//!    section for synthesis; either may be omitted.
//! 3. **Validation:** Range and consistency checks performed before a run starts.
//!
//! # Examples
//!
//! ```
//! use memsynth_core::config::{Config, FormatKind};
//!
//! let toml = r#"
//!     [profiler]
//!     trace_file = "app.trace"
//!     output_file = "app.json"
//!     block_size = 256
//!     bins = 4
//!
//!     [generator]
//!     length = 1000
//!     profiles = ["app.json", "other.json"]
//!     weights = [3.0, 1.0]
//!     format = "ovp"
//! "#;
//!
//! let config = Config::from_toml_str(toml).unwrap();
//! let profiler = config.profiler.unwrap();
//! assert_eq!(profiler.block_size, 256);
//! assert_eq!(profiler.load_marker, "r");
//! let generator = config.generator.unwrap();
//! assert_eq!(generator.format, FormatKind::Ovp);
//! assert!(generator.validate().is_ok());
//! ```

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::common::{BlockGeometry, Error, Result};

/// Default configuration constants.
mod defaults {
    use crate::common::constants;

    /// Bytes per block.
    pub const BLOCK_SIZE: u64 = constants::DEFAULT_BLOCK_SIZE;

    /// Reuse-distance bins per locality tree.
    pub const BINS: usize = constants::DEFAULT_BINS;

    /// Matches `<marker>,0x<hex address>` lines, e.g. `r,0x0000fc4e`.
    pub const PATTERN: &str = r"(\D),0x([0-9a-fA-F]+)";

    /// Marker of a load in the access-type capture group.
    pub const LOAD_MARKER: &str = "r";

    /// Marker of a store in the access-type capture group.
    pub const STORE_MARKER: &str = "w";
}

/// Output trace conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatKind {
    /// `<cycle>: read 0x<addr>` / `<cycle>: write 0x<addr> 0xABCD`.
    #[default]
    #[serde(alias = "STL")]
    Stl,
    /// `r,0x<addr>` / `w,0x<addr>`.
    #[serde(alias = "OVP")]
    Ovp,
}

impl FromStr for FormatKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "stl" => Ok(Self::Stl),
            "ovp" => Ok(Self::Ovp),
            other => Err(Error::InvalidConfig(format!("unknown trace format '{other}'"))),
        }
    }
}

impl fmt::Display for FormatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stl => f.write_str("stl"),
            Self::Ovp => f.write_str("ovp"),
        }
    }
}

/// Root configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Characterization settings.
    #[serde(default)]
    pub profiler: Option<ProfilerConfig>,
    /// Synthesis settings.
    #[serde(default)]
    pub generator: Option<GeneratorConfig>,
}

impl Config {
    /// Parses a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Toml`] if the text is not a valid configuration.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Reads a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read, or [`Error::Toml`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::from_toml_str(&text)
    }
}

/// Characterization settings (`[profiler]`).
#[derive(Debug, Clone, Deserialize)]
pub struct ProfilerConfig {
    /// Plain-text trace to characterize.
    pub trace_file: PathBuf,

    /// Where the JSON profile is written.
    pub output_file: PathBuf,

    /// Bytes per block; a power of two of at least 8.
    #[serde(default = "ProfilerConfig::default_block_size")]
    pub block_size: u64,

    /// Reuse-distance bins per locality tree (distances past the last bin share it).
    #[serde(default = "ProfilerConfig::default_bins")]
    pub bins: usize,

    /// Regular expression selecting memory-reference lines. Named groups `kind` and
    /// `addr` are used when present, otherwise groups 1 and 2. Non-matching lines are
    /// inactive cycles.
    #[serde(default = "ProfilerConfig::default_pattern")]
    pub pattern: String,

    /// Access-type capture denoting a load.
    #[serde(default = "ProfilerConfig::default_load_marker")]
    pub load_marker: String,

    /// Access-type capture denoting a store.
    #[serde(default = "ProfilerConfig::default_store_marker")]
    pub store_marker: String,
}

impl ProfilerConfig {
    /// Settings for `trace_file` → `output_file` with every default applied.
    pub fn new(trace_file: impl Into<PathBuf>, output_file: impl Into<PathBuf>) -> Self {
        Self {
            trace_file: trace_file.into(),
            output_file: output_file.into(),
            block_size: defaults::BLOCK_SIZE,
            bins: defaults::BINS,
            pattern: Self::default_pattern(),
            load_marker: Self::default_load_marker(),
            store_marker: Self::default_store_marker(),
        }
    }

    fn default_block_size() -> u64 {
        defaults::BLOCK_SIZE
    }

    fn default_bins() -> usize {
        defaults::BINS
    }

    fn default_pattern() -> String {
        defaults::PATTERN.to_string()
    }

    fn default_load_marker() -> String {
        defaults::LOAD_MARKER.to_string()
    }

    fn default_store_marker() -> String {
        defaults::STORE_MARKER.to_string()
    }

    /// Checks block size, bin count, and markers.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidBlockSize`], [`Error::InvalidBinCount`] (zero, or too many
    /// counters for the block size), or [`Error::InvalidConfig`] for identical or empty
    /// markers.
    pub fn validate(&self) -> Result<()> {
        let _ = BlockGeometry::new(self.block_size)?.counter_len(self.bins)?;
        if self.load_marker.is_empty() || self.store_marker.is_empty() {
            return Err(Error::InvalidConfig("access markers must be non-empty".into()));
        }
        if self.load_marker == self.store_marker {
            return Err(Error::InvalidConfig(format!(
                "load and store markers are both '{}'",
                self.load_marker
            )));
        }
        Ok(())
    }
}

/// Synthesis settings (`[generator]`).
#[derive(Debug, Clone, Deserialize)]
pub struct GeneratorConfig {
    /// Destination of the synthesized trace; standard output when absent.
    #[serde(default)]
    pub output_file: Option<PathBuf>,

    /// Number of memory references to synthesize.
    pub length: u64,

    /// Profiles to model; mixed when more than one is given.
    pub profiles: Vec<PathBuf>,

    /// Mixing weights; empty means every profile is weighted 1.
    #[serde(default)]
    pub weights: Vec<f64>,

    /// Output convention.
    #[serde(default)]
    pub format: FormatKind,

    /// Random seed; drawn from entropy when absent.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl GeneratorConfig {
    /// Checks trace length, profile list, and weights.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTraceLength`], [`Error::NoProfiles`],
    /// [`Error::WeightCountMismatch`], or [`Error::NegativeWeight`].
    pub fn validate(&self) -> Result<()> {
        if self.length == 0 {
            return Err(Error::InvalidTraceLength(self.length));
        }
        if self.profiles.is_empty() {
            return Err(Error::NoProfiles);
        }
        if !self.weights.is_empty() && self.weights.len() != self.profiles.len() {
            return Err(Error::WeightCountMismatch {
                profiles: self.profiles.len(),
                weights: self.weights.len(),
            });
        }
        if let Some((index, &value)) = self
            .weights
            .iter()
            .enumerate()
            .find(|(_, w)| !(w.is_finite() && **w >= 0.0))
        {
            return Err(Error::NegativeWeight { index, value });
        }
        Ok(())
    }
}
