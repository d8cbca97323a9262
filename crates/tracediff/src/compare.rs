//! Lockstep comparison of a reference trace against a candidate trace.
//!
//! Address and register mismatches mean the two CPUs have already diverged,
//! so they end the run. Cycle-count mismatches are recorded and the run
//! continues.

use std::io;

use tracing::{debug, info, trace};
use tracediff_format::{TraceParser, TraceRecord};

use crate::metrics;
use crate::report::{
    CompareReport, CompareSummary, CycleMismatch, Divergence, DivergenceKind, Stream,
    StreamLengths,
};
use crate::Result;
use crate::stream::lines_from_str;

/// How often a progress event is emitted, in line pairs.
const PROGRESS_INTERVAL: usize = 4096;

/// Comparison configuration.
#[derive(Debug, Clone)]
pub struct CompareConfig {
    /// Keep every cycle mismatch in the summary, not just the count.
    pub keep_cycle_mismatches: bool,
    /// Stop after this many line pairs.
    pub max_lines: Option<usize>,
    /// Skip this many leading lines of both streams.
    /// The first compared pair then only establishes the cycle baseline.
    pub skip_lines: usize,
    /// Disable the cycle-delta check.
    pub ignore_cycles: bool,
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            keep_cycle_mismatches: true,
            max_lines: None,
            skip_lines: 0,
            ignore_cycles: false,
        }
    }
}

/// Progress and non-fatal findings reported while a run is in flight.
#[derive(Debug)]
pub enum CompareEvent<'a> {
    Progress { lines_compared: usize },
    CycleMismatch(&'a CycleMismatch),
}

/// State carried between consecutive line pairs of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparatorState {
    pub last_reference_cycle: u64,
    pub last_candidate_cycle: u64,
    /// Mnemonic of the previous reference instruction.
    pub last_opcode_label: Option<String>,
    /// False until a cycle baseline exists for both streams.
    has_baseline: bool,
}

impl ComparatorState {
    /// State at the start of a trace: both counters at zero.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            last_reference_cycle: 0,
            last_candidate_cycle: 0,
            last_opcode_label: None,
            has_baseline: true,
        }
    }

    /// State for a run that starts mid-trace; the first pair sets the baseline.
    #[must_use]
    pub const fn unanchored() -> Self {
        Self {
            last_reference_cycle: 0,
            last_candidate_cycle: 0,
            last_opcode_label: None,
            has_baseline: false,
        }
    }

    /// Compare the cycles each stream spent since the previous pair.
    #[must_use]
    pub fn check_cycles(
        &self,
        line: usize,
        reference: &TraceRecord,
        candidate: &TraceRecord,
    ) -> Option<CycleMismatch> {
        if !self.has_baseline {
            return None;
        }
        let reference_delta = cycle_delta(reference.cycle_count, self.last_reference_cycle);
        let candidate_delta = cycle_delta(candidate.cycle_count, self.last_candidate_cycle);
        (reference_delta != candidate_delta).then(|| CycleMismatch {
            line,
            previous_opcode: self.last_opcode_label.clone(),
            reference_delta,
            candidate_delta,
        })
    }

    /// Record a fully compared pair.
    pub fn advance(&mut self, reference: &TraceRecord, candidate: &TraceRecord) {
        self.last_reference_cycle = reference.cycle_count;
        self.last_candidate_cycle = candidate.cycle_count;
        self.last_opcode_label = Some(reference.opcode_mnemonic.clone());
        self.has_baseline = true;
    }
}

impl Default for ComparatorState {
    fn default() -> Self {
        Self::new()
    }
}

/// Signed cycles elapsed; a counter that went backwards yields a negative delta.
fn cycle_delta(current: u64, last: u64) -> i64 {
    let delta = i128::from(current) - i128::from(last);
    i64::try_from(delta).unwrap_or(if delta < 0 { i64::MIN } else { i64::MAX })
}

/// Walks a reference and a candidate trace in lockstep.
pub struct Comparator<R, C> {
    reference: R,
    candidate: C,
    config: CompareConfig,
}

impl<R: TraceParser, C: TraceParser> Comparator<R, C> {
    pub const fn new(reference: R, candidate: C, config: CompareConfig) -> Self {
        Self {
            reference,
            candidate,
            config,
        }
    }

    pub const fn config(&self) -> &CompareConfig {
        &self.config
    }

    /// Compare two line streams, reporting in-flight events to `on_event`.
    ///
    /// Returns the first fatal divergence or a summary. Read errors on either
    /// stream abort the run with an error.
    pub fn run<A, B, F>(&self, reference: A, candidate: B, mut on_event: F) -> Result<CompareReport>
    where
        A: IntoIterator<Item = io::Result<String>>,
        B: IntoIterator<Item = io::Result<String>>,
        F: FnMut(CompareEvent<'_>),
    {
        let skip = self.config.skip_lines;
        let mut reference = reference.into_iter();
        let mut candidate = candidate.into_iter();
        let mut reference_total = skip_leading(&mut reference, skip)?;
        let mut candidate_total = skip_leading(&mut candidate, skip)?;

        let mut state = if skip > 0 {
            ComparatorState::unanchored()
        } else {
            ComparatorState::new()
        };
        let mut summary = CompareSummary {
            lines_compared: 0,
            cycle_mismatch_count: 0,
            cycle_mismatches: Vec::new(),
            lengths: StreamLengths::NotChecked,
            truncated: false,
        };
        let mut line = skip;

        info!(skip, "comparing traces");

        loop {
            let at_limit = self
                .config
                .max_lines
                .is_some_and(|max| summary.lines_compared >= max);

            let (reference_raw, candidate_raw) = match (reference.next(), candidate.next()) {
                (Some(_), Some(_)) if at_limit => {
                    summary.truncated = true;
                    break;
                }
                (Some(r), Some(c)) => (r?, c?),
                (None, None) => {
                    summary.lengths = stream_lengths(reference_total, candidate_total);
                    break;
                }
                (Some(r), None) => {
                    r?;
                    reference_total += 1 + count_remaining(&mut reference)?;
                    summary.lengths = stream_lengths(reference_total, candidate_total);
                    break;
                }
                (None, Some(c)) => {
                    c?;
                    candidate_total += 1 + count_remaining(&mut candidate)?;
                    summary.lengths = stream_lengths(reference_total, candidate_total);
                    break;
                }
            };
            reference_total += 1;
            candidate_total += 1;

            let records = self
                .reference
                .parse(line, &reference_raw)
                .map_err(|error| (Stream::Reference, error))
                .and_then(|r| {
                    self.candidate
                        .parse(line, &candidate_raw)
                        .map(|c| (r, c))
                        .map_err(|error| (Stream::Candidate, error))
                });
            let (reference_record, candidate_record) = match records {
                Ok(pair) => pair,
                Err((stream, error)) => {
                    let kind = DivergenceKind::Parse { stream, error };
                    return Ok(halt(summary, line, kind, reference_raw, candidate_raw));
                }
            };

            if reference_record.program_counter != candidate_record.program_counter {
                let kind = DivergenceKind::Address {
                    reference_pc: reference_record.normalized_pc(),
                    candidate_pc: candidate_record.normalized_pc(),
                };
                return Ok(halt(summary, line, kind, reference_raw, candidate_raw));
            }

            if reference_record.registers != candidate_record.registers {
                let kind = DivergenceKind::Registers {
                    expected: reference_record.registers,
                    actual: candidate_record.registers,
                };
                return Ok(halt(summary, line, kind, reference_raw, candidate_raw));
            }

            if !self.config.ignore_cycles
                && let Some(mismatch) = state.check_cycles(line, &reference_record, &candidate_record)
            {
                debug!("{mismatch}");
                metrics::record_cycle_mismatch(&mismatch);
                on_event(CompareEvent::CycleMismatch(&mismatch));
                summary.cycle_mismatch_count += 1;
                if self.config.keep_cycle_mismatches {
                    summary.cycle_mismatches.push(mismatch);
                }
            }

            trace!(
                line,
                pc = %reference_record.normalized_pc(),
                op = %reference_record.opcode_mnemonic,
                "matched"
            );
            state.advance(&reference_record, &candidate_record);
            summary.lines_compared += 1;
            line += 1;

            if summary.lines_compared % PROGRESS_INTERVAL == 0 {
                on_event(CompareEvent::Progress {
                    lines_compared: summary.lines_compared,
                });
            }
        }

        info!("{summary}");
        let report = CompareReport {
            summary,
            divergence: None,
        };
        metrics::record_report(&report);
        Ok(report)
    }

    /// Compare two in-memory traces.
    pub fn compare_str(&self, reference: &str, candidate: &str) -> CompareReport {
        let result = self.run(lines_from_str(reference), lines_from_str(candidate), |_| {});
        match result {
            Ok(report) => report,
            Err(_) => unreachable!("in-memory lines cannot fail to read"),
        }
    }
}

fn halt(
    summary: CompareSummary,
    line: usize,
    kind: DivergenceKind,
    reference_raw: String,
    candidate_raw: String,
) -> CompareReport {
    let divergence = Divergence {
        line,
        kind,
        reference_raw,
        candidate_raw,
    };
    info!("{divergence}");
    let report = CompareReport {
        summary,
        divergence: Some(divergence),
    };
    metrics::record_report(&report);
    report
}

/// Drop up to `n` leading lines, returning how many the stream actually had.
fn skip_leading<I>(lines: &mut I, n: usize) -> io::Result<usize>
where
    I: Iterator<Item = io::Result<String>>,
{
    lines.take(n).try_fold(0usize, |count, line| line.map(|_| count + 1))
}

const fn stream_lengths(reference: usize, candidate: usize) -> StreamLengths {
    if reference == candidate {
        StreamLengths::Equal
    } else {
        StreamLengths::Mismatch {
            reference,
            candidate,
        }
    }
}

fn count_remaining<I>(lines: &mut I) -> io::Result<usize>
where
    I: Iterator<Item = io::Result<String>>,
{
    lines.try_fold(0usize, |n, line| line.map(|_| n + 1))
}
