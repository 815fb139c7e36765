//! # Common Type Tests
//!
//! Block geometry validation, address masking, and error messages.

use memsynth_core::common::{AccessType, ActivityState, BlockGeometry, Error};
use rstest::rstest;

#[rstest]
#[case(8, 1)]
#[case(16, 2)]
#[case(256, 6)]
#[case(512, 7)]
#[case(1024, 8)]
fn tree_height_follows_block_size(#[case] size: u64, #[case] height: usize) {
    let geometry = BlockGeometry::new(size).unwrap();
    assert_eq!(geometry.size(), size);
    assert_eq!(geometry.tree_height(), height);
}

#[rstest]
#[case(0)]
#[case(4)]
#[case(12)]
#[case(500)]
#[case(1 << 33)]
#[case(1 << 40)]
fn illegal_block_sizes_are_rejected(#[case] size: u64) {
    assert!(matches!(
        BlockGeometry::new(size),
        Err(Error::InvalidBlockSize(s)) if s == size
    ));
}

#[test]
fn test_whole_address_space_is_the_largest_block() {
    assert_eq!(BlockGeometry::new(1 << 32).unwrap().tree_height(), 30);
}

#[test]
fn test_counter_len() {
    let geometry = BlockGeometry::new(512).unwrap();
    assert_eq!(geometry.counter_len(1).unwrap(), 7);
    assert_eq!(geometry.counter_len(4).unwrap(), 28);
    assert!(matches!(geometry.counter_len(0), Err(Error::InvalidBinCount(0))));
    assert!(matches!(
        geometry.counter_len(usize::MAX),
        Err(Error::InvalidBinCount(usize::MAX))
    ));
}

#[test]
fn test_block_masking() {
    let geometry = BlockGeometry::new(512).unwrap();
    assert_eq!(geometry.block_of(0xfc4e), 0xfc00);
    assert_eq!(geometry.offset_of(0xfc4e), 0x4e);
    assert_eq!(geometry.block_of(0x1ff), 0);
    assert_eq!(geometry.block_of(0x200), 0x200);
}

#[test]
fn test_activity_state_indices() {
    assert_eq!(ActivityState::Inactive.index(), 0);
    assert_eq!(ActivityState::Active.index(), 1);
    assert_eq!(ActivityState::from_active(true), ActivityState::Active);
    assert_eq!(ActivityState::default(), ActivityState::Inactive);
    assert!(AccessType::Load.is_load());
    assert!(!AccessType::Store.is_load());
}

#[test]
fn test_error_messages_name_the_problem() {
    let err = Error::WorkingSetExhausted {
        working_set: 3,
        emitted: 10,
    };
    assert_eq!(
        err.to_string(),
        "working set exhausted: all 3 blocks introduced, 10 accesses emitted"
    );

    let err = Error::io(
        "missing.json",
        std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
    );
    assert_eq!(err.to_string(), "missing.json: not found");

    let err = Error::shape("loadProp", 3, 2);
    assert_eq!(err.to_string(), "loadProp: expected shape 3, found 2");
}
