//! Cycle Activity Model.
//!
//! Two-state Markov chain over memory cycles (inactive = 0, active = 1). It provides:
//! 1. **Recording:** Transition counts accumulated from an observed cycle stream.
//! 2. **Normalization:** Row-stochastic transition probabilities.
//! 3. **Sampling:** Drawing the next cycle's state given the previous one.
//!
//! Recording starts from an implicit inactive predecessor, so the first observed cycle
//! is counted as a transition out of the inactive state. [`ActivityModel::finalize`]
//! removes one inactive→inactive count to compensate before normalizing. The
//! compensation is kept for numeric compatibility with existing profiles; it is not a
//! model of how runs start.

use rand::Rng;
use tracing::warn;

use super::pmf::bernoulli;
use crate::common::ActivityState;

/// Probabilities assigned to a row with no observations.
const EMPTY_ROW: [f64; 2] = [0.5, 0.5];

/// Transition counter fed one cycle at a time.
#[derive(Clone, Debug, Default)]
pub struct ActivityModel {
    counts: [[f64; 2]; 2],
    previous: ActivityState,
}

impl ActivityModel {
    /// Creates a model with all counts zero and an inactive predecessor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one cycle.
    ///
    /// Increments `counts[previous][current]`, then makes `current` the predecessor of
    /// the next recorded cycle.
    pub fn record_cycle(&mut self, active: bool) {
        let current = ActivityState::from_active(active);
        self.counts[self.previous.index()][current.index()] += 1.0;
        self.previous = current;
    }

    /// State of the most recently recorded cycle.
    #[inline]
    pub const fn previous(&self) -> ActivityState {
        self.previous
    }

    /// Raw transition counts, indexed `[previous][next]`.
    #[inline]
    pub const fn counts(&self) -> &[[f64; 2]; 2] {
        &self.counts
    }

    /// Applies the first-cycle correction and row-normalizes the counts.
    pub fn finalize(&self) -> TransitionMatrix {
        let mut counts = self.counts;
        let idle = ActivityState::Inactive.index();
        counts[idle][idle] = (counts[idle][idle] - 1.0).max(0.0);
        TransitionMatrix::normalized(counts)
    }
}

/// Row-stochastic 2×2 activity transition matrix, indexed `[previous][next]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransitionMatrix {
    rows: [[f64; 2]; 2],
}

impl TransitionMatrix {
    /// Wraps rows that are already normalized.
    pub const fn from_rows(rows: [[f64; 2]; 2]) -> Self {
        Self { rows }
    }

    /// Row-normalizes arbitrary non-negative weights.
    ///
    /// A row summing to zero becomes `[0.5, 0.5]`.
    pub fn normalized(mut rows: [[f64; 2]; 2]) -> Self {
        for (i, row) in rows.iter_mut().enumerate() {
            let sum = row[0] + row[1];
            if sum > 0.0 {
                row[0] /= sum;
                row[1] /= sum;
            } else {
                warn!(row = i, "activity row has no observations, assuming uniform");
                *row = EMPTY_ROW;
            }
        }
        Self { rows }
    }

    /// Matrix rows.
    #[inline]
    pub const fn rows(&self) -> &[[f64; 2]; 2] {
        &self.rows
    }

    /// Probability of moving from `from` to `to`.
    #[inline]
    pub const fn probability(&self, from: ActivityState, to: ActivityState) -> f64 {
        self.rows[from.index()][to.index()]
    }

    /// Draws the state of the cycle following one in state `previous`.
    pub fn next_state<R: Rng + ?Sized>(&self, previous: ActivityState, rng: &mut R) -> ActivityState {
        let p_active = self.probability(previous, ActivityState::Active);
        ActivityState::from_active(bernoulli(rng, p_active))
    }
}
