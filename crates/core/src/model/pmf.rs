//! Distribution helpers.
//!
//! Small numeric routines shared by characterization, mixing, and synthesis:
//! 1. **Resizing:** Zero-filling vectors to a common support before combining them.
//! 2. **Normalization:** L1 normalization of histograms into probability vectors.
//! 3. **Sampling:** Bernoulli draws and categorical samplers over probability vectors.

use rand::Rng;
use rand::distributions::{Distribution, WeightedIndex};

use crate::common::{Error, Result};

/// Returns a copy of `values` resized to `len`, zero-filling any new entries.
///
/// Never truncates: when `len` is smaller than `values.len()` the full input is kept.
pub fn zero_filled<T: Clone + Default>(values: &[T], len: usize) -> Vec<T> {
    let mut out = values.to_vec();
    if out.len() < len {
        out.resize(len, T::default());
    }
    out
}

/// Scales `values` so they sum to one.
///
/// Returns `false` and leaves the input untouched when the sum is zero.
pub fn l1_normalize(values: &mut [f64]) -> bool {
    let sum: f64 = values.iter().map(|v| v.abs()).sum();
    if sum == 0.0 {
        return false;
    }
    for v in values.iter_mut() {
        *v /= sum;
    }
    true
}

/// Draws `true` with probability `p`, clamping `p` into `[0, 1]` first.
#[inline]
pub fn bernoulli<R: Rng + ?Sized>(rng: &mut R, p: f64) -> bool {
    let p = if p.is_nan() { 0.0 } else { p.clamp(0.0, 1.0) };
    rng.gen_bool(p)
}

/// Sampler over the indices of a probability (or unnormalized weight) vector.
#[derive(Clone, Debug)]
pub struct Categorical {
    dist: WeightedIndex<f64>,
}

impl Categorical {
    /// Builds a sampler over `weights`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDistribution`] if `weights` is empty, all zero, or contains
    /// a negative or non-finite entry.
    pub fn new(what: &'static str, weights: &[f64]) -> Result<Self> {
        WeightedIndex::new(weights)
            .map(|dist| Self { dist })
            .map_err(|_| Error::InvalidDistribution(what))
    }

    /// Draws one index.
    #[inline]
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        self.dist.sample(rng)
    }
}
