//! # Output Format Tests

use memsynth_core::common::{AccessRecord, AccessType};
use memsynth_core::config::FormatKind;
use memsynth_core::sim::{OvpFormat, StlFormat, TraceFormat};

fn render(format: &dyn TraceFormat, records: &[AccessRecord]) -> String {
    let mut out = Vec::new();
    for record in records {
        format.write_record(&mut out, record).unwrap();
    }
    String::from_utf8(out).unwrap()
}

fn records() -> [AccessRecord; 2] {
    [
        AccessRecord {
            cycle: 5,
            kind: AccessType::Load,
            address: 0xfc4c,
        },
        AccessRecord {
            cycle: 7,
            kind: AccessType::Store,
            address: 0x10,
        },
    ]
}

#[test]
fn test_stl_lines() {
    assert_eq!(
        render(&StlFormat, &records()),
        "5: read 0xfc4c\n7: write 0x10 0xABCD\n"
    );
}

#[test]
fn test_ovp_lines() {
    assert_eq!(render(&OvpFormat, &records()), "r,0xfc4c\nw,0x10\n");
}

#[test]
fn test_format_kind_selects_writer() {
    let stl = FormatKind::Stl.formatter();
    let ovp = FormatKind::Ovp.formatter();
    assert_eq!(render(stl.as_ref(), &records()[..1]), "5: read 0xfc4c\n");
    assert_eq!(render(ovp.as_ref(), &records()[1..]), "w,0x10\n");
}
