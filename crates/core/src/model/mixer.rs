//! Profile Mixer.
//!
//! Combines independently collected profiles into one weighted composite model for
//! synthesis. Every combination follows the same two steps: resize each input to the
//! largest shape among the inputs (zero-filling), then take the weighted sum.
//!
//! 1. **Activity:** Weighted sum of transition matrices, row-normalized.
//! 2. **Reuse PMF:** Weighted sum over the longest support, L1-normalized.
//! 3. **Load Proportion:** Weighted sum divided by the weight total; each entry stays an
//!    independent Bernoulli parameter.
//! 4. **Working Set:** Taken from the profile with the most blocks (first on ties).
//! 5. **Locality:** Per working-set slot, the weighted sum of every profile's counters for
//!    that slot (profiles without the slot contribute zeros), divided by the weight total
//!    and normalized.
//!
//! Input profiles are never modified.

use tracing::debug;

use super::activity::TransitionMatrix;
use super::locality::{AlphaTable, LocalityTree};
use super::pmf::{l1_normalize, zero_filled};
use super::profile::Profile;
use crate::common::{Error, Result};

/// Composite model consumed by the trace synthesizer.
#[derive(Clone, Debug)]
pub struct CompositeModel {
    /// Bytes per block, shared by all inputs.
    pub block_size: u64,
    /// Reuse-distance bins per locality tree.
    pub bins: usize,
    /// Block base addresses, one per slot.
    pub working_set: Vec<u64>,
    /// Reuse-distance probabilities (index 0 = compulsory miss).
    pub reuse_pmf: Vec<f64>,
    /// Load probability per reuse distance.
    pub load_prop: Vec<f64>,
    /// Activity transition probabilities.
    pub activity: TransitionMatrix,
    /// Normalized locality tree per working-set slot.
    pub trees: Vec<LocalityTree>,
}

/// Weighted combination of profiles.
#[derive(Debug)]
pub struct ProfileMixer<'a> {
    profiles: &'a [Profile],
    weights: Vec<f64>,
    weight_sum: f64,
}

impl<'a> ProfileMixer<'a> {
    /// Validates `profiles` and `weights` for mixing.
    ///
    /// # Arguments
    ///
    /// * `profiles` - Profiles to combine; at least one.
    /// * `weights` - Either empty (uniform weights of 1) or one non-negative weight per profile.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoProfiles`], [`Error::WeightCountMismatch`],
    /// [`Error::NegativeWeight`], [`Error::ZeroWeightSum`], [`Error::BlockSizeMismatch`],
    /// or the validation error of an inconsistent profile.
    pub fn new(profiles: &'a [Profile], weights: &[f64]) -> Result<Self> {
        let first = profiles.first().ok_or(Error::NoProfiles)?;

        let weights = if weights.is_empty() {
            vec![1.0; profiles.len()]
        } else if weights.len() == profiles.len() {
            weights.to_vec()
        } else {
            return Err(Error::WeightCountMismatch {
                profiles: profiles.len(),
                weights: weights.len(),
            });
        };

        if let Some((index, &value)) = weights
            .iter()
            .enumerate()
            .find(|(_, w)| !(w.is_finite() && **w >= 0.0))
        {
            return Err(Error::NegativeWeight { index, value });
        }
        let weight_sum: f64 = weights.iter().sum();
        if weight_sum <= 0.0 {
            return Err(Error::ZeroWeightSum);
        }

        for profile in profiles {
            if profile.block_size != first.block_size {
                return Err(Error::BlockSizeMismatch {
                    expected: first.block_size,
                    found: profile.block_size,
                });
            }
            profile.validate()?;
        }

        Ok(Self {
            profiles,
            weights,
            weight_sum,
        })
    }

    /// Effective weight of each profile.
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Builds the composite model.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDistribution`] if the combined reuse PMF has no mass.
    pub fn mix(&self) -> Result<CompositeModel> {
        let block_size = self.profiles[0].block_size;
        let height = self.profiles[0].tree_height()?;
        let bins = self.profiles.iter().map(|p| p.bins).max().unwrap_or(1);

        let mut rows = [[0.0; 2]; 2];
        for (profile, &w) in self.profiles.iter().zip(&self.weights) {
            for (acc, src) in rows.iter_mut().flatten().zip(profile.activity_markov.iter().flatten()) {
                *acc += w * src;
            }
        }
        let activity = TransitionMatrix::normalized(rows);

        let support = self.profiles.iter().map(|p| p.reuse_pmf.len()).max().unwrap_or(1);
        let mut reuse_pmf = self.weighted_sum(support, |p| p.reuse_pmf.as_slice());
        if !l1_normalize(&mut reuse_pmf) {
            return Err(Error::InvalidDistribution("composite reusePMF"));
        }

        let load_support = self.profiles.iter().map(|p| p.load_prop.len()).max().unwrap_or(1);
        let mut load_prop = self.weighted_sum(load_support, |p| p.load_prop.as_slice());
        for p in &mut load_prop {
            *p /= self.weight_sum;
        }

        let (source, _) = self.profiles.iter().enumerate().fold(
            (0, 0),
            |best, (i, p)| {
                if p.working_set.len() > best.1 { (i, p.working_set.len()) } else { best }
            },
        );
        let working_set = self.profiles[source].working_set.clone();
        debug!(
            source,
            blocks = working_set.len(),
            bins,
            support,
            "composite working set selected"
        );

        let trees = (0..working_set.len())
            .map(|slot| {
                let mut table = self.slot_table(slot, bins, height);
                for pair in table.iter_mut().flatten().flatten() {
                    *pair /= self.weight_sum;
                }
                let mut tree = LocalityTree::from_table(block_size, &table)?;
                tree.finalize();
                Ok(tree)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(CompositeModel {
            block_size,
            bins,
            working_set,
            reuse_pmf,
            load_prop,
            activity,
            trees,
        })
    }

    /// Weighted sum of one per-profile vector after zero-filling each to `len`.
    fn weighted_sum<F>(&self, len: usize, field: F) -> Vec<f64>
    where
        F: Fn(&Profile) -> &[f64],
    {
        let mut acc = vec![0.0; len];
        for (profile, &w) in self.profiles.iter().zip(&self.weights) {
            for (a, v) in acc.iter_mut().zip(zero_filled(field(profile), len)) {
                *a += w * v;
            }
        }
        acc
    }

    /// Weighted sum of every profile's counters for `slot`, shaped `bins × height`.
    fn slot_table(&self, slot: usize, bins: usize, height: usize) -> AlphaTable {
        let mut acc = zero_table(bins, height);
        for (profile, &w) in self.profiles.iter().zip(&self.weights) {
            let Some(table) = profile.locality_table(slot) else {
                continue;
            };
            let padded = resize_table(&table, bins, height);
            for (dst, src) in acc.iter_mut().flatten().zip(padded.iter().flatten()) {
                dst[0] += w * src[0];
                dst[1] += w * src[1];
            }
        }
        acc
    }
}

fn zero_table(bins: usize, height: usize) -> AlphaTable {
    vec![vec![[0.0; 2]; height]; bins]
}

/// Zero-fills `table` to `bins × height`.
fn resize_table(table: &[Vec<[f64; 2]>], bins: usize, height: usize) -> AlphaTable {
    zero_filled(table, bins)
        .iter()
        .map(|row| zero_filled(row, height))
        .collect()
}
