//! # Statistics Tests

use memsynth_core::stats::RunStats;

#[test]
fn test_empty_ratios_are_zero() {
    let stats = RunStats::default();
    assert_eq!(stats.activity_ratio(), 0.0);
    assert_eq!(stats.load_ratio(), 0.0);
}

#[test]
fn test_ratios() {
    let mut stats = RunStats::default();
    stats.cycles = 8;
    stats.accesses = 4;
    stats.loads = 3;
    stats.stores = 1;
    assert_eq!(stats.activity_ratio(), 0.5);
    assert_eq!(stats.load_ratio(), 0.75);
}
