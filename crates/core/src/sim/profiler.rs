//! Application Profiler.
//!
//! Characterizes a memory trace into a [`Profile`]. For every cycle it:
//! 1. **Activity:** Records whether the cycle carried a reference.
//! 2. **Temporal Locality:** Masks the address to its block, computes the block's reuse
//!    distance, and counts it (split by loads) in the reuse histogram.
//! 3. **Spatial Locality:** Feeds the address to the block's locality tree, binned by
//!    the reuse distance. A tree is created when its block is first referenced, so trees
//!    are stored in working-set order.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::{debug, info, trace};

use super::parser::{TraceEvent, TraceParser};
use crate::common::{AccessType, BlockGeometry, Error, Result};
use crate::config::ProfilerConfig;
use crate::model::pmf::l1_normalize;
use crate::model::reuse::COMPULSORY;
use crate::model::{ActivityModel, Alphas, LocalityTree, Profile, ReuseTracker};
use crate::stats::RunStats;

/// Incremental trace characterizer.
#[derive(Debug)]
pub struct Profiler {
    geometry: BlockGeometry,
    bins: usize,
    tracker: ReuseTracker,
    activity: ActivityModel,
    /// References per reuse distance; one entry per block plus the compulsory entry.
    reuse_counts: Vec<f64>,
    /// Loads per reuse distance.
    load_counts: Vec<f64>,
    /// Untouched tree cloned for each new block.
    blank: LocalityTree,
    trees: Vec<LocalityTree>,
    slots: HashMap<u64, usize>,
    stats: RunStats,
}

impl Profiler {
    /// Creates a profiler for `block_size`-byte blocks and `bins` reuse-distance bins.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidBlockSize`] or
    /// [`Error::InvalidBinCount`].
    pub fn new(block_size: u64, bins: usize) -> Result<Self> {
        let geometry = BlockGeometry::new(block_size)?;
        let blank = LocalityTree::new(block_size, bins)?;
        Ok(Self {
            geometry,
            bins,
            tracker: ReuseTracker::new(),
            activity: ActivityModel::new(),
            reuse_counts: vec![0.0],
            load_counts: vec![0.0],
            blank,
            trees: Vec::new(),
            slots: HashMap::new(),
            stats: RunStats::default(),
        })
    }

    /// Statistics gathered so far.
    pub const fn stats(&self) -> &RunStats {
        &self.stats
    }

    /// Working set gathered so far, in first-reference order.
    pub fn working_set(&self) -> &[u64] {
        self.tracker.working_set()
    }

    /// Locality tree of `block`, if it has been referenced.
    pub fn tree(&self, block: u64) -> Option<&LocalityTree> {
        self.slots.get(&block).map(|&slot| &self.trees[slot])
    }

    /// Records one parsed trace event.
    pub fn record(&mut self, event: TraceEvent) {
        match event {
            TraceEvent::Inactive => self.record_inactive(),
            TraceEvent::Access { kind, address } => {
                let _ = self.record_access(kind, address);
            }
        }
    }

    /// Records a cycle without a memory reference.
    pub fn record_inactive(&mut self) {
        self.activity.record_cycle(false);
        self.stats.cycles += 1;
    }

    /// Records a memory reference and returns its reuse distance.
    pub fn record_access(&mut self, kind: AccessType, address: u64) -> usize {
        self.activity.record_cycle(true);
        self.stats.cycles += 1;
        self.stats.accesses += 1;

        let block = self.geometry.block_of(address);
        let distance = self.tracker.record_access(block);

        if distance == COMPULSORY {
            self.reuse_counts.push(0.0);
            self.load_counts.push(0.0);
            let _ = self.slots.insert(block, self.trees.len());
            self.trees.push(self.blank.clone());
            self.stats.compulsory_misses += 1;
            self.stats.blocks += 1;
        }

        self.reuse_counts[distance] += 1.0;
        match kind {
            AccessType::Load => {
                self.load_counts[distance] += 1.0;
                self.stats.loads += 1;
            }
            AccessType::Store => self.stats.stores += 1,
        }

        if let Some(&slot) = self.slots.get(&block) {
            self.trees[slot].observe(address, distance);
        }
        trace!(address, block, distance, ?kind, "access");
        distance
    }

    /// Feeds every line of `reader` through `parser`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] (attributed to `source`) if reading fails, or
    /// [`Error::MalformedTrace`] for a line that cannot be interpreted.
    pub fn consume<R: BufRead>(
        &mut self,
        parser: &TraceParser,
        reader: R,
        source: &Path,
    ) -> Result<()> {
        for (index, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| Error::io(source, e))?;
            let event = parser.parse(index + 1, &line)?;
            self.record(event);
        }
        debug!(
            source = %source.display(),
            cycles = self.stats.cycles,
            accesses = self.stats.accesses,
            "trace consumed"
        );
        Ok(())
    }

    /// Completes characterization.
    ///
    /// The reuse histogram is L1-normalized into the PMF, load counts become per-distance
    /// proportions, the activity matrix is finalized, and every tree's raw counters are
    /// stored.
    pub fn finish(self) -> Profile {
        let mut reuse_pmf = self.reuse_counts.clone();
        let _ = l1_normalize(&mut reuse_pmf);

        let load_prop = self
            .load_counts
            .iter()
            .zip(&self.reuse_counts)
            .map(|(&loads, &total)| if total > 0.0 { loads / total } else { 0.0 })
            .collect();

        Profile {
            block_size: self.geometry.size(),
            bins: self.bins,
            working_set: self.tracker.into_working_set(),
            reuse_pmf,
            load_prop,
            activity_markov: *self.activity.finalize().rows(),
            alphas: Alphas::PerBlock(self.trees.iter().map(LocalityTree::table).collect()),
            alpha_ratio: None,
        }
    }

    /// Characterizes the trace named by `config` and writes the profile.
    ///
    /// # Errors
    ///
    /// Returns validation, pattern, I/O, trace, or serialization errors.
    pub fn profile_file(config: &ProfilerConfig) -> Result<(Profile, RunStats)> {
        config.validate()?;
        let parser = TraceParser::from_config(config)?;
        let mut profiler = Self::new(config.block_size, config.bins)?;

        info!(
            trace = %config.trace_file.display(),
            block_size = config.block_size,
            bins = config.bins,
            "characterizing trace"
        );
        let file = File::open(&config.trace_file).map_err(|e| Error::io(&config.trace_file, e))?;
        profiler.consume(&parser, BufReader::new(file), &config.trace_file)?;

        let stats = profiler.stats.clone();
        let profile = profiler.finish();
        profile.save(&config.output_file)?;
        info!(
            output = %config.output_file.display(),
            blocks = profile.working_set.len(),
            accesses = stats.accesses,
            "profile written"
        );
        Ok((profile, stats))
    }
}
