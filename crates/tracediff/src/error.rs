use std::path::PathBuf;

use thiserror::Error;
use tracediff_format::{LayoutError, ParseError};

/// Trace tooling errors.
///
/// Divergences between two traces are reported as values, not errors.
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("reference layout error: {0}")]
    Layout(#[from] LayoutError),
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
    #[error("only one trace can be read from standard input")]
    StdinTwice,
}

pub type Result<T> = std::result::Result<T, Error>;
