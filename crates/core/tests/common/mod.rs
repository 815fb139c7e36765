//! Shared fixtures for the core tests.

use std::io::Write;

use memsynth_core::model::{Alphas, Profile};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tempfile::NamedTempFile;

/// Installs a tracing subscriber that writes through the test harness.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter("memsynth_core=debug")
        .try_init();
}

/// Deterministic generator for a test.
pub fn rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Writes `contents` to a fresh temporary file.
pub fn temp_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

/// Profile over 16-byte blocks (locality height 2) with one bin.
///
/// `working_set` blocks are placed contiguously from address 0 and every locality
/// table is zeroed.
pub fn profile(
    working_set: usize,
    reuse_pmf: Vec<f64>,
    load_prop: Vec<f64>,
    activity: [[f64; 2]; 2],
) -> Profile {
    Profile {
        block_size: 16,
        bins: 1,
        working_set: (0..working_set as u64).map(|i| i * 16).collect(),
        reuse_pmf,
        load_prop,
        activity_markov: activity,
        alphas: Alphas::PerBlock(vec![vec![vec![[0.0; 2]; 2]]; working_set]),
        alpha_ratio: None,
    }
}

/// Activity matrix in which every cycle is active.
pub const ALWAYS_ACTIVE: [[f64; 2]; 2] = [[0.0, 1.0], [0.0, 1.0]];

/// Asserts two floats agree to within `1e-9`.
#[track_caller]
pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

/// Asserts two float slices agree element-wise to within `1e-9`.
#[track_caller]
pub fn assert_all_close(actual: &[f64], expected: &[f64]) {
    assert_eq!(actual.len(), expected.len(), "length of {actual:?}");
    for (a, e) in actual.iter().zip(expected) {
        assert_close(*a, *e);
    }
}
