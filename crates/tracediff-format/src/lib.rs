//! Parsers for 6502 CPU execution traces.
//!
//! Two line formats are understood:
//! - `reference`: the fixed-column nestest log (`C000  4C F5 C5  JMP $C5F5 ... CYC:7`)
//! - `candidate`: the pipe-separated emulator log (`c000|4c f5 c5|JMP $c5f5|00 00 00 fd|7|nvUbdIzc`)
//!
//! Both are exposed through [`TraceParser`] and selected with a [`TraceFormat`] tag.

mod candidate;
mod flags;
mod layout;
mod record;
mod reference;

#[cfg(test)]
mod tests;

pub use candidate::CandidateParser;
pub use flags::{format_flags, parse_flags};
pub use layout::{LayoutError, ReferenceLayout};
pub use record::{Registers, TraceRecord};
pub use reference::ReferenceParser;

use std::fmt;

use thiserror::Error;

/// Field of a trace line that failed to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Line,
    ProgramCounter,
    Opcode,
    Mnemonic,
    Registers,
    A,
    X,
    Y,
    P,
    Sp,
    Cycles,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Line => "line",
            Self::ProgramCounter => "pc",
            Self::Opcode => "opcode",
            Self::Mnemonic => "mnemonic",
            Self::Registers => "registers",
            Self::A => "A",
            Self::X => "X",
            Self::Y => "Y",
            Self::P => "P",
            Self::Sp => "SP",
            Self::Cycles => "cycles",
        };
        f.write_str(name)
    }
}

/// Why a field failed to decode.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    #[error("line too short: {len} bytes, need at least {needed}")]
    LineTooShort { len: usize, needed: usize },
    #[error("expected {expected} fields, found {found}")]
    MissingFields { found: usize, expected: usize },
    #[error("invalid hex value {0:?}")]
    InvalidHex(String),
    #[error("invalid decimal value {0:?}")]
    InvalidDecimal(String),
    #[error("invalid flag bitmask {0:?}")]
    InvalidFlags(String),
    #[error("empty field")]
    Empty,
}

/// A trace line that could not be decoded into a [`TraceRecord`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("line {line}: field `{field}`: {kind}")]
pub struct ParseError {
    /// 0-based line index in the source stream.
    pub line: usize,
    pub field: Field,
    pub kind: ParseErrorKind,
}

impl ParseError {
    #[must_use]
    pub const fn new(line: usize, field: Field, kind: ParseErrorKind) -> Self {
        Self { line, field, kind }
    }
}

pub type Result<T> = std::result::Result<T, ParseError>;

/// A strategy that decodes one trace line.
pub trait TraceParser {
    /// Decode `text`, the line at 0-based index `line` (without newline).
    fn parse(&self, line: usize, text: &str) -> Result<TraceRecord>;
}

impl<P: TraceParser + ?Sized> TraceParser for Box<P> {
    fn parse(&self, line: usize, text: &str) -> Result<TraceRecord> {
        (**self).parse(line, text)
    }
}

/// Trace line format tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceFormat {
    /// Fixed-column nestest log.
    Reference,
    /// Pipe-separated emulator log.
    Candidate,
}

impl TraceFormat {
    /// Parser for this format, using the default reference layout.
    #[must_use]
    pub fn parser(self) -> Box<dyn TraceParser> {
        match self {
            Self::Reference => Box::new(ReferenceParser::nestest()),
            Self::Candidate => Box::new(CandidateParser),
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Reference => "reference",
            Self::Candidate => "candidate",
        }
    }
}

impl fmt::Display for TraceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Parse a hex field into `T`, tagging failures with `field`.
pub(crate) fn parse_hex<T>(line: usize, field: Field, text: &str) -> Result<T>
where
    T: TryFrom<u32>,
{
    let text = text.trim();
    if text.is_empty() {
        return Err(ParseError::new(line, field, ParseErrorKind::Empty));
    }
    let invalid = || ParseError::new(line, field, ParseErrorKind::InvalidHex(text.to_string()));
    // from_str_radix accepts a leading '+', which is not a hex digit in a trace.
    if !text.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(invalid());
    }
    let value = u32::from_str_radix(text, 16).map_err(|_| invalid())?;
    T::try_from(value).map_err(|_| invalid())
}

/// Parse a decimal cycle counter.
pub(crate) fn parse_cycles(line: usize, text: &str) -> Result<u64> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ParseError::new(line, Field::Cycles, ParseErrorKind::Empty));
    }
    if !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseError::new(
            line,
            Field::Cycles,
            ParseErrorKind::InvalidDecimal(text.to_string()),
        ));
    }
    text.parse().map_err(|_| {
        ParseError::new(
            line,
            Field::Cycles,
            ParseErrorKind::InvalidDecimal(text.to_string()),
        )
    })
}
