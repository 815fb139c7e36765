//! Run statistics collection and reporting.
//!
//! This module tracks what a characterization or synthesis run observed or produced:
//! 1. **Cycles:** Total cycles and the fraction in which a memory reference occurred.
//! 2. **Access mix:** Load and store counts.
//! 3. **Working set:** Compulsory misses and distinct blocks touched.

use std::time::Instant;

/// Statistics of one characterization or synthesis run.
#[derive(Clone, Debug)]
pub struct RunStats {
    start_time: Instant,
    /// Cycles processed (active and inactive).
    pub cycles: u64,
    /// Cycles carrying a memory reference.
    pub accesses: u64,
    /// Loads among `accesses`.
    pub loads: u64,
    /// Stores among `accesses`.
    pub stores: u64,
    /// References to a block not referenced before.
    pub compulsory_misses: u64,
    /// Distinct blocks referenced.
    pub blocks: u64,
}

impl Default for RunStats {
    fn default() -> Self {
        Self {
            start_time: Instant::now(),
            cycles: 0,
            accesses: 0,
            loads: 0,
            stores: 0,
            compulsory_misses: 0,
            blocks: 0,
        }
    }
}

impl RunStats {
    /// Fraction of cycles that carried a reference.
    pub fn activity_ratio(&self) -> f64 {
        if self.cycles == 0 {
            0.0
        } else {
            self.accesses as f64 / self.cycles as f64
        }
    }

    /// Fraction of references that were loads.
    pub fn load_ratio(&self) -> f64 {
        if self.accesses == 0 {
            0.0
        } else {
            self.loads as f64 / self.accesses as f64
        }
    }

    /// Prints the report to stdout under `title`.
    pub fn print(&self, title: &str) {
        let seconds = self.start_time.elapsed().as_secs_f64();
        let acc = if self.accesses == 0 { 1 } else { self.accesses };
        println!("\n==========================================================");
        println!("{title}");
        println!("==========================================================");
        println!("host_seconds             {seconds:.4} s");
        println!("cycles                   {}", self.cycles);
        println!(
            "cycles.active            {} ({:.2}%)",
            self.accesses,
            self.activity_ratio() * 100.0
        );
        println!("----------------------------------------------------------");
        println!("ACCESS MIX");
        println!(
            "  op.load                {} ({:.2}%)",
            self.loads,
            (self.loads as f64 / acc as f64) * 100.0
        );
        println!(
            "  op.store               {} ({:.2}%)",
            self.stores,
            (self.stores as f64 / acc as f64) * 100.0
        );
        println!("----------------------------------------------------------");
        println!("WORKING SET");
        println!("  blocks                 {}", self.blocks);
        println!(
            "  compulsory_misses      {} ({:.2}%)",
            self.compulsory_misses,
            (self.compulsory_misses as f64 / acc as f64) * 100.0
        );
        println!("==========================================================");
    }
}
