//! tracediff - CPU trace divergence checker
//!
//! Walks a golden reference trace and a candidate emulator trace in lockstep
//! and reports the first point where execution diverges.
//!
//! # Example
//!
//! ```ignore
//! use tracediff::{Comparator, CompareConfig};
//! use tracediff_format::{CandidateParser, ReferenceParser};
//!
//! let comparator = Comparator::new(ReferenceParser::nestest(), CandidateParser, CompareConfig::default());
//! let report = comparator.run(open_trace(reference)?, open_trace(candidate)?, |_| {})?;
//! ```

pub mod compare;
mod error;
pub mod inspect;
pub mod metrics;
pub mod report;
pub mod stream;

pub use compare::{Comparator, ComparatorState, CompareConfig, CompareEvent};
pub use error::{Error, Result};
pub use inspect::{TraceCheck, check_trace, convert_trace};
pub use report::{
    CompareReport, CompareSummary, CycleMismatch, Divergence, DivergenceKind, Stream,
    StreamLengths,
};
pub use stream::{TraceLines, open_trace};

pub use tracediff_format::{
    CandidateParser, Field, LayoutError, ParseError, ParseErrorKind, ReferenceLayout,
    ReferenceParser, Registers, TraceFormat, TraceParser, TraceRecord,
};
