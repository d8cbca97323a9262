//! Single-trace utilities: validation and format conversion.

use std::io::{self, Write};

use tracediff_format::TraceParser;
use tracing::warn;

use crate::Result;

/// Statistics gathered while validating one trace.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraceCheck {
    pub records: usize,
    pub first_pc: Option<u16>,
    pub last_cycle: u64,
    /// First line whose cycle counter is lower than its predecessor's.
    pub cycle_regression: Option<usize>,
}

/// Parse every line of a trace, stopping at the first malformed one.
pub fn check_trace<P, I>(parser: &P, lines: I) -> Result<TraceCheck>
where
    P: TraceParser + ?Sized,
    I: IntoIterator<Item = io::Result<String>>,
{
    let mut check = TraceCheck::default();
    for (index, line) in lines.into_iter().enumerate() {
        let record = parser.parse(index, &line?)?;
        if check.records > 0
            && record.cycle_count < check.last_cycle
            && check.cycle_regression.is_none()
        {
            warn!(line = index, "cycle counter went backwards");
            check.cycle_regression = Some(index);
        }
        check.first_pc.get_or_insert(record.program_counter);
        check.last_cycle = record.cycle_count;
        check.records += 1;
    }
    Ok(check)
}

/// Re-emit a trace in the candidate line format. Returns the record count.
pub fn convert_trace<P, I, W>(parser: &P, lines: I, mut out: W) -> Result<usize>
where
    P: TraceParser + ?Sized,
    I: IntoIterator<Item = io::Result<String>>,
    W: Write,
{
    let mut count = 0;
    for (index, line) in lines.into_iter().enumerate() {
        let record = parser.parse(index, &line?)?;
        writeln!(out, "{record}")?;
        count += 1;
    }
    out.flush()?;
    Ok(count)
}
