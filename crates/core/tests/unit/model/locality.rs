//! # Locality Tree Tests
//!
//! Node identifiers, reuse/non-reuse counting along the referenced path, binning by
//! reuse distance, normalization, persistence, and sampling.
//!
//! Most cases use 16-byte blocks: height 2, level 1 splits the block into 8-byte halves
//! and level 0 splits those into words.

use memsynth_core::common::Error;
use memsynth_core::model::LocalityTree;
use memsynth_core::model::locality::{child, parent, sibling, tree_level};
use pretty_assertions::assert_eq;
use rstest::rstest;

use crate::common::rng;

#[test]
fn test_node_family() {
    assert_eq!(parent(1), 0);
    assert_eq!(sibling(1), 2);
    assert_eq!(child(1, 0), 3);
    assert_eq!(child(1, 1), 4);
    assert_eq!(parent(3), 1);
    assert_eq!(sibling(3), 4);
    assert_eq!(child(0, 0), 1);
    assert_eq!(child(0, 1), 2);
    assert_eq!(child(2, 1), 6);
    assert_eq!(parent(5), 2);
    assert_eq!(parent(6), 2);
    assert_eq!(sibling(5), 6);
    assert_eq!(sibling(6), 5);
}

#[rstest]
#[case(8, 0)]
#[case(16, 1)]
#[case(512, 6)]
fn test_tree_level(#[case] subset: u64, #[case] level: usize) {
    assert_eq!(tree_level(subset), level);
}

#[rstest]
#[case(256, 6)]
#[case(512, 7)]
#[case(1024, 8)]
fn test_height(#[case] block_size: u64, #[case] height: usize) {
    let tree = LocalityTree::new(block_size, 1).unwrap();
    assert_eq!(tree.height(), height);
    assert_eq!(tree.table(), vec![vec![[0.0; 2]; height]]);
}

#[test]
fn test_rejects_zero_bins() {
    assert!(matches!(
        LocalityTree::new(16, 0),
        Err(Error::InvalidBinCount(0))
    ));
}

#[test]
fn test_first_reference_only_marks() {
    let mut tree = LocalityTree::new(16, 1).unwrap();
    tree.observe(0x0, 0);
    assert!(tree.is_marked(1));
    assert!(tree.is_marked(3));
    assert!(!tree.is_marked(2));
    assert_eq!(tree.table(), vec![vec![[0.0, 0.0], [0.0, 0.0]]]);
}

#[test]
fn test_reuse_and_non_reuse_counts() {
    let mut tree = LocalityTree::new(16, 1).unwrap();
    for address in [0x0, 0x0, 0x4, 0x8] {
        tree.observe(address, 0);
    }
    // Level 0: reuse of word 0, then a move to word 1.
    assert_eq!(tree.counter(0, 0), [1.0, 1.0]);
    // Level 1: two references to the lower half, then a move to the upper half.
    assert_eq!(tree.counter(0, 1), [2.0, 1.0]);
    assert!(tree.is_marked(2) && !tree.is_marked(1));
    assert!(tree.is_marked(4) && !tree.is_marked(3));
    assert!(tree.is_marked(5));
}

#[test]
fn test_top_level_non_reuse() {
    let mut tree = LocalityTree::new(512, 1).unwrap();
    tree.observe(0x000, 0);
    tree.observe(0x100, 1);
    assert_eq!(tree.counter(0, 6), [0.0, 1.0]);
    for level in 0..6 {
        assert_eq!(tree.counter(0, level), [0.0, 0.0], "level {level}");
    }
}

#[test]
fn test_repeated_address_is_reuse_at_every_level() {
    let mut tree = LocalityTree::new(512, 1).unwrap();
    tree.observe(0x1f4, 0);
    tree.observe(0x1f4, 1);
    for level in 0..7 {
        assert_eq!(tree.counter(0, level), [1.0, 0.0], "level {level}");
    }
}

#[test]
fn test_oversized_trees_are_errors() {
    assert!(matches!(
        LocalityTree::new(1 << 40, 1),
        Err(Error::InvalidBlockSize(_))
    ));
    assert!(matches!(
        LocalityTree::new(16, usize::MAX),
        Err(Error::InvalidBinCount(usize::MAX))
    ));
}

#[test]
fn test_distances_past_last_bin_share_it() {
    let mut tree = LocalityTree::new(16, 3).unwrap();
    assert_eq!(tree.bin_of(0), 0);
    assert_eq!(tree.bin_of(2), 2);
    assert_eq!(tree.bin_of(40), 2);

    tree.observe(0x0, 0);
    tree.observe(0x0, 5);
    tree.observe(0x0, 1);
    assert_eq!(tree.counter(0, 1), [0.0, 0.0]);
    assert_eq!(tree.counter(1, 1), [1.0, 0.0]);
    assert_eq!(tree.counter(2, 1), [1.0, 0.0]);
    assert_eq!(tree.counter(2, 0), [1.0, 0.0]);
}

#[test]
fn test_finalize() {
    let mut tree = LocalityTree::from_table(16, &[vec![[3.0, 1.0], [0.0, 0.0]]]).unwrap();
    assert_eq!(tree.alpha(0, 0), 0.75);
    assert_eq!(tree.alpha(0, 1), 1.0);
    tree.finalize();
    assert_eq!(tree.table(), vec![vec![[0.75, 0.25], [1.0, 0.0]]]);
}

#[test]
fn test_load_checks_shape() {
    let mut tree = LocalityTree::new(16, 2).unwrap();
    let table = vec![vec![[1.0, 2.0], [3.0, 4.0]], vec![[5.0, 6.0], [7.0, 8.0]]];
    tree.load(&table).unwrap();
    assert_eq!(tree.table(), table);
    assert_eq!(tree.counter(1, 0), [5.0, 6.0]);

    let short = vec![vec![[1.0, 2.0]], vec![[3.0, 4.0]]];
    assert!(matches!(
        tree.load(&short),
        Err(Error::ShapeMismatch { what: "locality table", .. })
    ));
    assert!(matches!(
        tree.load(&table[..1]),
        Err(Error::ShapeMismatch { .. })
    ));
}

#[test]
fn test_full_reuse_repeats_the_first_offset() {
    let mut tree = LocalityTree::new(64, 1).unwrap();
    tree.finalize();
    let mut rng = rng(7);
    let first = tree.sample(0, &mut rng);
    assert_eq!(first % 4, 0);
    assert!(first < 64);
    for _ in 0..50 {
        assert_eq!(tree.sample(0, &mut rng), first);
    }
}

#[test]
fn test_no_reuse_always_switches_halves() {
    let mut tree = LocalityTree::from_table(16, &[vec![[0.0, 1.0], [0.0, 1.0]]]).unwrap();
    tree.finalize();
    let mut rng = rng(3);
    let mut previous = tree.sample(0, &mut rng);
    for _ in 0..20 {
        let next = tree.sample(0, &mut rng);
        assert_eq!((previous ^ next) & 0x8, 0x8);
        previous = next;
    }
}
