//! Trace Line Parser.
//!
//! Classifies each line of a plain-text trace as either a memory reference or an
//! inactive cycle using a configurable regular expression.
//!
//! The pattern must capture the access marker and the hexadecimal address (without its
//! `0x` prefix). Named groups `kind` and `addr` take precedence; otherwise capture groups
//! 1 and 2 are used in that order.

use regex::{Captures, Regex};

use crate::common::{AccessType, Error, Result};
use crate::config::ProfilerConfig;

/// Classification of one trace line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TraceEvent {
    /// The line is not a memory reference.
    Inactive,
    /// The line is a memory reference.
    Access {
        /// Load or store.
        kind: AccessType,
        /// Referenced byte address.
        address: u64,
    },
}

/// Compiled trace pattern with its access markers.
#[derive(Clone, Debug)]
pub struct TraceParser {
    pattern: Regex,
    load_marker: String,
    store_marker: String,
}

impl TraceParser {
    /// Compiles `pattern`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPattern`] if the expression does not compile, or
    /// [`Error::InvalidConfig`] if it captures fewer than two groups.
    pub fn new(pattern: &str, load_marker: &str, store_marker: &str) -> Result<Self> {
        let pattern = Regex::new(pattern)?;
        let named = pattern
            .capture_names()
            .flatten()
            .filter(|n| matches!(*n, "kind" | "addr"))
            .count();
        if named < 2 && pattern.captures_len() < 3 {
            return Err(Error::InvalidConfig(format!(
                "trace pattern '{pattern}' must capture an access marker and an address"
            )));
        }
        Ok(Self {
            pattern,
            load_marker: load_marker.to_string(),
            store_marker: store_marker.to_string(),
        })
    }

    /// Builds the parser described by a profiler configuration.
    ///
    /// # Errors
    ///
    /// Fails like [`TraceParser::new`].
    pub fn from_config(config: &ProfilerConfig) -> Result<Self> {
        Self::new(&config.pattern, &config.load_marker, &config.store_marker)
    }

    /// Classifies `text`, found on 1-based line `line`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedTrace`] if the line matches but its marker is neither
    /// the load nor the store marker, or its address is not hexadecimal.
    pub fn parse(&self, line: usize, text: &str) -> Result<TraceEvent> {
        let Some(caps) = self.pattern.captures(text) else {
            return Ok(TraceEvent::Inactive);
        };

        let marker = group(&caps, "kind", 1).unwrap_or_default();
        let kind = if marker == self.load_marker {
            AccessType::Load
        } else if marker == self.store_marker {
            AccessType::Store
        } else {
            return Err(Error::MalformedTrace {
                line,
                reason: format!("unknown access marker '{marker}'"),
            });
        };

        let digits = group(&caps, "addr", 2).unwrap_or_default();
        let digits = digits
            .strip_prefix("0x")
            .or_else(|| digits.strip_prefix("0X"))
            .unwrap_or(digits);
        let address = u64::from_str_radix(digits, 16).map_err(|e| Error::MalformedTrace {
            line,
            reason: format!("bad address '{digits}': {e}"),
        })?;

        Ok(TraceEvent::Access { kind, address })
    }
}

/// Text of the named group `name`, falling back to group `index`.
fn group<'t>(caps: &Captures<'t>, name: &str, index: usize) -> Option<&'t str> {
    caps.name(name)
        .or_else(|| caps.get(index))
        .map(|m| m.as_str())
}
