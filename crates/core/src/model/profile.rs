//! Application Profile.
//!
//! The persisted result of characterizing one trace. This module provides:
//! 1. **Data:** Block size, bin count, working set, reuse-distance PMF, load proportions,
//!    activity transition matrix, and locality counters for every working-set block.
//! 2. **Validation:** Shape and range checks run on every profile before it is used.
//! 3. **Persistence:** JSON encoding with the field names `blockSize`, `bins`,
//!    `workingSet`, `reusePMF`, `loadProp`, `activityMarkov`, and `alphas`.
//!
//! `alphas` is accepted in two shapes: the native per-block table
//! `(workingSetSize, bins, height, 2)` of raw counts, and the legacy `(treeCount, height)`
//! table of reuse probabilities shared by every block. Legacy row `r` covers reuse
//! distances `r * alphaRatio .. (r + 1) * alphaRatio`, the last row also covering every
//! larger distance; without `alphaRatio` each row covers one distance, and a ratio of 0
//! puts every distance in the first row.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::locality::{AlphaTable, LocalityTree, NON_REUSE, REUSE};
use crate::common::constants::DEFAULT_BINS;
use crate::common::{BlockGeometry, Error, Result};

/// Locality counters as stored in a profile.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Alphas {
    /// One `bins × height` table of `[reuse, non_reuse]` counts per working-set block.
    PerBlock(Vec<AlphaTable>),
    /// One row of reuse probabilities per bin, shared by all blocks.
    Legacy(Vec<Vec<f64>>),
}

impl Default for Alphas {
    fn default() -> Self {
        Self::PerBlock(Vec::new())
    }
}

/// Statistical characterization of one application's memory references.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    /// Bytes per block.
    #[serde(rename = "blockSize")]
    pub block_size: u64,
    /// Reuse-distance bins per locality tree.
    #[serde(default = "default_bins")]
    pub bins: usize,
    /// Block base addresses in first-reference order.
    #[serde(rename = "workingSet", default)]
    pub working_set: Vec<u64>,
    /// `reuse_pmf[d]` is the probability of reuse distance `d` (0 = compulsory miss).
    #[serde(rename = "reusePMF")]
    pub reuse_pmf: Vec<f64>,
    /// `load_prop[d]` is the probability that an access at reuse distance `d` is a load.
    #[serde(rename = "loadProp")]
    pub load_prop: Vec<f64>,
    /// Activity transition probabilities, indexed `[previous][next]`.
    #[serde(rename = "activityMarkov")]
    pub activity_markov: [[f64; 2]; 2],
    /// Locality counters.
    #[serde(default)]
    pub alphas: Alphas,
    /// Reuse distances per legacy `alphas` row.
    #[serde(rename = "alphaRatio", default, skip_serializing_if = "Option::is_none")]
    pub alpha_ratio: Option<u64>,
}

const fn default_bins() -> usize {
    DEFAULT_BINS
}

impl Profile {
    /// Height of this profile's locality trees.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidBlockSize`] if the block size is illegal.
    pub fn tree_height(&self) -> Result<usize> {
        Ok(BlockGeometry::new(self.block_size)?.tree_height())
    }

    /// Checks every field for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns the validation error describing the first inconsistency found.
    pub fn validate(&self) -> Result<()> {
        let geometry = BlockGeometry::new(self.block_size)?;
        let height = geometry.tree_height();
        let _ = geometry.counter_len(self.bins)?;
        if self.reuse_pmf.is_empty() {
            return Err(Error::shape("reusePMF", "at least 1 entry", 0));
        }
        if self.load_prop.len() != self.reuse_pmf.len() {
            return Err(Error::shape(
                "loadProp",
                self.reuse_pmf.len(),
                self.load_prop.len(),
            ));
        }
        if self.reuse_pmf.len() > self.working_set.len() + 1 {
            return Err(Error::shape(
                "reusePMF",
                format!("at most {} entries", self.working_set.len() + 1),
                self.reuse_pmf.len(),
            ));
        }
        match &self.alphas {
            Alphas::PerBlock(tables) => {
                if tables.len() != self.working_set.len() {
                    return Err(Error::shape(
                        "alphas",
                        format!("{} tables", self.working_set.len()),
                        tables.len(),
                    ));
                }
                for table in tables {
                    check_table(table, self.bins, height)?;
                }
            }
            Alphas::Legacy(rows) => {
                if rows.is_empty() {
                    return Err(Error::shape("alphas", "at least 1 row", 0));
                }
                if let Some(row) = rows.iter().find(|r| r.len() != height) {
                    return Err(Error::shape("alphas", height, row.len()));
                }
            }
        }
        Ok(())
    }

    /// Locality counter table for working-set slot `slot`.
    pub fn locality_table(&self, slot: usize) -> Option<AlphaTable> {
        match &self.alphas {
            Alphas::PerBlock(tables) => tables.get(slot).cloned(),
            Alphas::Legacy(rows) => (slot < self.working_set.len() && !rows.is_empty()).then(|| {
                (0..self.bins)
                    .map(|bin| {
                        rows[self.legacy_row(bin, rows.len())]
                            .iter()
                            .map(|&p| {
                                let mut pair = [0.0; 2];
                                pair[REUSE] = p;
                                pair[NON_REUSE] = 1.0 - p;
                                pair
                            })
                            .collect()
                    })
                    .collect()
            }),
        }
    }

    /// Builds one locality tree per working-set block from the stored counters.
    ///
    /// # Errors
    ///
    /// Returns a validation error if a stored table has the wrong shape.
    pub fn locality_trees(&self) -> Result<Vec<LocalityTree>> {
        (0..self.working_set.len())
            .map(|slot| {
                let table = self.locality_table(slot).unwrap_or_default();
                LocalityTree::from_table(self.block_size, &table)
            })
            .collect()
    }

    /// Reads and validates a profile from a JSON file.
    ///
    /// Legacy profiles carry no working set; one is synthesized from contiguous blocks
    /// starting at address 0, sized to the PMF's support.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read, [`Error::Json`] if it is not a
    /// profile, or a validation error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| Error::io(path, e))?;
        let mut profile: Self = serde_json::from_reader(BufReader::new(file))?;

        if let Alphas::Legacy(rows) = &profile.alphas {
            let bins = profile.legacy_bins(rows.len());
            if profile.bins != bins {
                warn!(
                    path = %path.display(),
                    bins,
                    rows = rows.len(),
                    ratio = ?profile.alpha_ratio,
                    "legacy profile: expanding alpha rows into reuse-distance bins"
                );
                profile.bins = bins;
            }
            if profile.working_set.is_empty() && profile.reuse_pmf.len() > 1 {
                let blocks = profile.reuse_pmf.len() as u64 - 1;
                warn!(path = %path.display(), blocks, "legacy profile: synthesizing working set");
                profile.working_set = (0..blocks).map(|i| i * profile.block_size).collect();
            }
        }

        profile.validate()?;
        info!(
            path = %path.display(),
            block_size = profile.block_size,
            working_set = profile.working_set.len(),
            "loaded profile"
        );
        Ok(profile)
    }

    /// Writes the profile as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] on file errors or [`Error::Json`] on encoding errors.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| Error::io(path, e))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, self)?;
        writer.flush().map_err(|e| Error::io(path, e))?;
        Ok(())
    }
}

impl Profile {
    /// Legacy `alphas` row covering reuse distance `distance`, given `rows` rows.
    fn legacy_row(&self, distance: usize, rows: usize) -> usize {
        let row = match self.alpha_ratio {
            None => distance,
            Some(0) => 0,
            Some(ratio) => usize::try_from(ratio).map_or(0, |ratio| distance / ratio),
        };
        row.min(rows.saturating_sub(1))
    }

    /// Per-distance bins needed to express `rows` legacy rows.
    ///
    /// Distances never exceed the PMF support, so bins past it are not materialized.
    fn legacy_bins(&self, rows: usize) -> usize {
        let per_row = match self.alpha_ratio {
            None => 1,
            Some(0) => 0,
            Some(ratio) => usize::try_from(ratio).unwrap_or(usize::MAX),
        };
        rows.saturating_sub(1)
            .saturating_mul(per_row)
            .saturating_add(1)
            .min(self.reuse_pmf.len().max(1))
    }
}

fn check_table(table: &[Vec<[f64; 2]>], bins: usize, height: usize) -> Result<()> {
    let expected = format!("{bins} x {height} x 2");
    if table.len() != bins {
        return Err(Error::shape("alphas", expected, format!("{} x ? x 2", table.len())));
    }
    if let Some(row) = table.iter().find(|row| row.len() != height) {
        return Err(Error::shape(
            "alphas",
            expected,
            format!("{bins} x {} x 2", row.len()),
        ));
    }
    Ok(())
}
