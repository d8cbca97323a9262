//! Comparison results and their diagnostic rendering.

use std::fmt;

use tracediff_format::{ParseError, Registers};

/// Which of the two traces a line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Reference,
    Candidate,
}

impl fmt::Display for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reference => f.write_str("reference"),
            Self::Candidate => f.write_str("candidate"),
        }
    }
}

/// Kind of fatal divergence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DivergenceKind {
    /// A line could not be decoded.
    Parse { stream: Stream, error: ParseError },
    /// Execution reached different addresses.
    Address {
        reference_pc: String,
        candidate_pc: String,
    },
    /// Same address, different register file.
    Registers {
        expected: Registers,
        actual: Registers,
    },
}

impl DivergenceKind {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Parse { .. } => "ParseDivergence",
            Self::Address { .. } => "AddressDivergence",
            Self::Registers { .. } => "RegisterDivergence",
        }
    }
}

/// First point where the two traces disagree; comparison halts here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Divergence {
    /// 0-based line index in both streams.
    pub line: usize,
    pub kind: DivergenceKind,
    pub reference_raw: String,
    pub candidate_raw: String,
}

impl fmt::Display for Divergence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at line {}: ", self.kind.name(), self.line)?;
        match &self.kind {
            DivergenceKind::Parse { stream, error } => {
                write!(f, "{stream} field `{}`: {}", error.field, error.kind)
            }
            DivergenceKind::Address {
                reference_pc,
                candidate_pc,
            } => write!(
                f,
                "reference pc={reference_pc}, candidate pc={candidate_pc}"
            ),
            DivergenceKind::Registers { expected, actual } => {
                write!(f, "expected {expected}, actual {actual}")
            }
        }
    }
}

/// Disagreement in the number of cycles one instruction took.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleMismatch {
    pub line: usize,
    /// Mnemonic of the preceding reference instruction, the one whose
    /// cycles are accounted by this delta.
    pub previous_opcode: Option<String>,
    pub reference_delta: i64,
    pub candidate_delta: i64,
}

impl CycleMismatch {
    /// `reference_delta - candidate_delta`.
    #[must_use]
    pub const fn difference(&self) -> i64 {
        self.reference_delta.saturating_sub(self.candidate_delta)
    }
}

impl fmt::Display for CycleMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CycleMismatch ({}) at line {}: diff {:+} (reference {}, candidate {})",
            self.previous_opcode.as_deref().unwrap_or("-"),
            self.line,
            self.difference(),
            self.reference_delta,
            self.candidate_delta
        )
    }
}

/// Relationship between the two stream lengths at the end of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamLengths {
    Equal,
    /// Total line counts of each stream.
    Mismatch { reference: usize, candidate: usize },
    /// The run stopped before either stream was exhausted.
    NotChecked,
}

/// Totals of one comparison run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompareSummary {
    /// Line pairs that passed the address and register checks.
    pub lines_compared: usize,
    pub cycle_mismatch_count: usize,
    /// Retained mismatches, empty unless the config keeps them.
    pub cycle_mismatches: Vec<CycleMismatch>,
    pub lengths: StreamLengths,
    /// The run stopped at the configured line limit.
    pub truncated: bool,
}

impl fmt::Display for CompareSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} lines compared, {} cycle mismatches",
            self.lines_compared, self.cycle_mismatch_count
        )?;
        if let StreamLengths::Mismatch {
            reference,
            candidate,
        } = self.lengths
        {
            write!(
                f,
                " (stream lengths differ: reference {reference} lines, candidate {candidate} lines)"
            )?;
        }
        if self.truncated {
            f.write_str(" (stopped at line limit)")?;
        }
        Ok(())
    }
}

/// Result of comparing two traces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompareReport {
    pub summary: CompareSummary,
    /// First fatal divergence, if any.
    pub divergence: Option<Divergence>,
}

impl CompareReport {
    /// Whether the run passes under the given strictness.
    ///
    /// Fatal divergences always fail. Cycle mismatches and stream-length
    /// differences fail only when the matching flag is set.
    #[must_use]
    pub const fn passed(&self, strict_cycles: bool, strict_length: bool) -> bool {
        if self.divergence.is_some() {
            return false;
        }
        if strict_cycles && self.summary.cycle_mismatch_count > 0 {
            return false;
        }
        !(strict_length && matches!(self.summary.lengths, StreamLengths::Mismatch { .. }))
    }
}
