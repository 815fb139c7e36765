//! Trace Synthesizer.
//!
//! Inverts a [`CompositeModel`] into a stream of memory references. Each synthetic cycle:
//! 1. **Activity:** Draw the cycle's state from the previous one; inactive cycles only
//!    advance the cycle counter.
//! 2. **Reuse Distance:** Draw a distance from the composite PMF.
//! 3. **Block Selection:** Distance 0 introduces the next unused working-set block (fatal
//!    once all are introduced); distance `d >= 1` re-references the block at LRU position
//!    `d - 1`. The selected block moves to the LRU front.
//! 4. **Access Type:** Bernoulli draw against the load proportion at that distance.
//! 5. **Offset:** The block's locality tree samples a word offset.
//!
//! The LRU stack starts with every working-set slot in collection order, slot 0 in front.
//! Untouched slots therefore always occupy positions `introduced..`, with the next unused
//! block at position `introduced`.

use std::io::Write;

use rand::Rng;
use tracing::{debug, info};

use crate::common::{AccessRecord, AccessType, ActivityState, Error, Result};
use crate::model::pmf::{Categorical, bernoulli};
use crate::model::reuse::COMPULSORY;
use crate::model::{CompositeModel, LruStack};
use crate::sim::formats::TraceFormat;
use crate::stats::RunStats;

/// Generation state over a composite model.
#[derive(Debug)]
pub struct TraceSynthesizer {
    model: CompositeModel,
    distances: Categorical,
    lru: LruStack<usize>,
    /// Working-set slots referenced so far.
    introduced: usize,
    previous: ActivityState,
    cycle: u64,
    stats: RunStats,
}

impl TraceSynthesizer {
    /// Prepares generation from `model`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDistribution`] if the reuse PMF cannot be sampled, or
    /// [`Error::InactiveModel`] if an inactive cycle can never be followed by an active one.
    pub fn new(model: CompositeModel) -> Result<Self> {
        let distances = Categorical::new("composite reusePMF", &model.reuse_pmf)?;
        if model.activity.probability(ActivityState::Inactive, ActivityState::Active) <= 0.0 {
            return Err(Error::InactiveModel);
        }

        let mut lru = LruStack::new();
        for slot in (0..model.working_set.len()).rev() {
            let _ = lru.touch(slot);
        }

        Ok(Self {
            model,
            distances,
            lru,
            introduced: 0,
            previous: ActivityState::Inactive,
            cycle: 0,
            stats: RunStats::default(),
        })
    }

    /// Statistics of the references produced so far.
    pub const fn stats(&self) -> &RunStats {
        &self.stats
    }

    /// Working-set blocks referenced so far.
    pub const fn introduced(&self) -> usize {
        self.introduced
    }

    /// Next cycle number to be generated.
    pub const fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Advances through cycles until one carries a reference and returns it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WorkingSetExhausted`] if a compulsory miss is drawn when every
    /// working-set block has already been introduced.
    pub fn next_access<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<AccessRecord> {
        loop {
            let state = self.model.activity.next_state(self.previous, rng);
            self.previous = state;
            if state == ActivityState::Active {
                break;
            }
            self.cycle += 1;
            self.stats.cycles += 1;
        }

        let working_set = self.model.working_set.len();
        let distance = self.distances.sample(rng).min(working_set);

        let slot = if distance == COMPULSORY {
            if self.introduced == working_set {
                return Err(Error::WorkingSetExhausted {
                    working_set,
                    emitted: self.stats.accesses,
                });
            }
            let slot = self.slot_at(self.introduced)?;
            self.introduced += 1;
            self.stats.compulsory_misses += 1;
            slot
        } else {
            let slot = self.slot_at(distance - 1)?;
            if distance > self.introduced {
                self.introduced += 1;
            }
            slot
        };
        let _ = self.lru.touch(slot);

        let p_load = self.model.load_prop.get(distance).copied().unwrap_or(0.0);
        let kind = if bernoulli(rng, p_load) {
            AccessType::Load
        } else {
            AccessType::Store
        };

        let offset = self.model.trees[slot].sample(distance, rng);
        let record = AccessRecord {
            cycle: self.cycle,
            kind,
            address: self.model.working_set[slot] | offset,
        };

        self.cycle += 1;
        self.stats.cycles += 1;
        self.stats.accesses += 1;
        match kind {
            AccessType::Load => self.stats.loads += 1,
            AccessType::Store => self.stats.stores += 1,
        }
        self.stats.blocks = self.introduced as u64;
        Ok(record)
    }

    /// Writes `length` references to `out` using `format`.
    ///
    /// Records are written as they are generated, so on error `out` holds everything
    /// produced before the failure.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTraceLength`] for a zero `length`,
    /// [`Error::WorkingSetExhausted`], or [`Error::Output`] on write failures.
    pub fn generate<R, W>(
        &mut self,
        length: u64,
        rng: &mut R,
        format: &dyn TraceFormat,
        out: &mut W,
    ) -> Result<&RunStats>
    where
        R: Rng + ?Sized,
        W: Write,
    {
        if length == 0 {
            return Err(Error::InvalidTraceLength(length));
        }
        info!(
            length,
            blocks = self.model.working_set.len(),
            "synthesizing trace"
        );
        while self.stats.accesses < length {
            let record = self.next_access(rng)?;
            format.write_record(&mut *out, &record)?;
        }
        debug!(
            cycles = self.stats.cycles,
            introduced = self.introduced,
            "synthesis complete"
        );
        Ok(&self.stats)
    }

    fn slot_at(&self, position: usize) -> Result<usize> {
        self.lru
            .get(position)
            .ok_or(Error::InvalidDistribution("reuse distance beyond working set"))
    }
}
