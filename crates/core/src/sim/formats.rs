//! Output Trace Formats.
//!
//! Pluggable writers for synthesized references:
//! - `StlFormat`: socket transaction language, `<cycle>: read 0x<addr>` and
//!   `<cycle>: write 0x<addr> 0xABCD`.
//! - `OvpFormat`: simulator capture format, `r,0x<addr>` and `w,0x<addr>`.
//!
//! Addresses are written in lower-case hexadecimal without zero padding.

use std::io::{self, Write};

use crate::common::constants::STORE_DATA_PLACEHOLDER;
use crate::common::{AccessRecord, AccessType};
use crate::config::FormatKind;

/// Writer for one synthesized reference per line.
pub trait TraceFormat {
    /// Writes `record` followed by a newline.
    ///
    /// # Errors
    ///
    /// Propagates write errors from `out`.
    fn write_record(&self, out: &mut dyn Write, record: &AccessRecord) -> io::Result<()>;
}

/// `<cycle>: read 0x<addr>` / `<cycle>: write 0x<addr> 0xABCD`.
#[derive(Clone, Copy, Debug, Default)]
pub struct StlFormat;

impl TraceFormat for StlFormat {
    fn write_record(&self, out: &mut dyn Write, record: &AccessRecord) -> io::Result<()> {
        match record.kind {
            AccessType::Load => writeln!(out, "{}: read {:#x}", record.cycle, record.address),
            AccessType::Store => writeln!(
                out,
                "{}: write {:#x} {:#X}",
                record.cycle, record.address, STORE_DATA_PLACEHOLDER
            ),
        }
    }
}

/// `r,0x<addr>` / `w,0x<addr>`.
#[derive(Clone, Copy, Debug, Default)]
pub struct OvpFormat;

impl TraceFormat for OvpFormat {
    fn write_record(&self, out: &mut dyn Write, record: &AccessRecord) -> io::Result<()> {
        let marker = if record.kind.is_load() { 'r' } else { 'w' };
        writeln!(out, "{marker},{:#x}", record.address)
    }
}

impl FormatKind {
    /// Writer implementing this convention.
    pub fn formatter(self) -> Box<dyn TraceFormat> {
        match self {
            Self::Stl => Box::new(StlFormat),
            Self::Ovp => Box::new(OvpFormat),
        }
    }
}
