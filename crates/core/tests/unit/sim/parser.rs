//! # Trace Parser Tests

use memsynth_core::common::{AccessType, Error};
use memsynth_core::config::ProfilerConfig;
use memsynth_core::sim::{TraceEvent, TraceParser};
use rstest::rstest;

fn default_parser() -> TraceParser {
    TraceParser::from_config(&ProfilerConfig::new("a.trace", "a.json")).unwrap()
}

#[rstest]
#[case("r,0x0000fc4e", AccessType::Load, 0xfc4e)]
#[case("w,0x10", AccessType::Store, 0x10)]
#[case("  r,0xDEADBEEF trailing", AccessType::Load, 0xdead_beef)]
fn test_default_pattern_accesses(
    #[case] line: &str,
    #[case] kind: AccessType,
    #[case] address: u64,
) {
    assert_eq!(
        default_parser().parse(1, line).unwrap(),
        TraceEvent::Access { kind, address }
    );
}

#[rstest]
#[case("")]
#[case("idle")]
#[case("r,0x")]
#[case("12,0x40")]
fn test_non_matching_lines_are_inactive(#[case] line: &str) {
    assert_eq!(default_parser().parse(1, line).unwrap(), TraceEvent::Inactive);
}

#[test]
fn test_unknown_marker_is_malformed() {
    assert!(matches!(
        default_parser().parse(9, "x,0x40"),
        Err(Error::MalformedTrace { line: 9, .. })
    ));
}

#[test]
fn test_oversized_address_is_malformed() {
    assert!(matches!(
        default_parser().parse(3, "r,0x1ffffffffffffffff"),
        Err(Error::MalformedTrace { line: 3, .. })
    ));
}

#[test]
fn test_named_groups() {
    let parser =
        TraceParser::new(r"^(?P<addr>0x[0-9a-f]+)\s+(?P<kind>LD|ST)$", "LD", "ST").unwrap();
    assert_eq!(
        parser.parse(1, "0x8000 ST").unwrap(),
        TraceEvent::Access {
            kind: AccessType::Store,
            address: 0x8000
        }
    );
    assert_eq!(parser.parse(2, "nop").unwrap(), TraceEvent::Inactive);
}

#[test]
fn test_bad_patterns() {
    assert!(matches!(
        TraceParser::new("(", "r", "w"),
        Err(Error::InvalidPattern(_))
    ));
    assert!(matches!(
        TraceParser::new(r"0x([0-9a-f]+)", "r", "w"),
        Err(Error::InvalidConfig(_))
    ));
}
