//! Line-by-line trace readers.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use crate::{Error, Result};

/// Streaming lines of one trace.
pub type TraceLines = io::Lines<Box<dyn BufRead>>;

/// Path that selects standard input.
pub const STDIN_PATH: &str = "-";

/// Whether `path` selects standard input.
pub fn is_stdin(path: &Path) -> bool {
    path.as_os_str() == STDIN_PATH
}

/// Open a trace for streaming.
///
/// `-` reads standard input; a `.zst` extension is decompressed on the fly.
pub fn open_trace(path: &Path) -> Result<TraceLines> {
    if is_stdin(path) {
        let reader: Box<dyn BufRead> = Box::new(io::stdin().lock());
        return Ok(reader.lines());
    }

    let file = File::open(path).map_err(|source| Error::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let reader: Box<dyn BufRead> = if path.extension().is_some_and(|ext| ext == "zst") {
        let decoder = zstd::stream::read::Decoder::new(file)?;
        Box::new(BufReader::new(decoder))
    } else {
        Box::new(BufReader::new(file))
    };
    Ok(reader.lines())
}

/// Lines of an in-memory trace, in the shape the comparator consumes.
pub fn lines_from_str(text: &str) -> impl Iterator<Item = io::Result<String>> + '_ {
    text.lines().map(|line| Ok(line.to_string()))
}
