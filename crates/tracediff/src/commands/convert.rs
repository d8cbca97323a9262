use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use tracediff::{TraceFormat, convert_trace, open_trace};

use crate::cli::{EXIT_ERROR, EXIT_SUCCESS};
use crate::terminal;

/// Re-emit a trace in the candidate line format.
pub fn cmd_convert(trace: &Path, from: TraceFormat, output: Option<&Path>) -> i32 {
    let lines = match open_trace(trace) {
        Ok(lines) => lines,
        Err(e) => {
            terminal::error(&e.to_string());
            return EXIT_ERROR;
        }
    };

    let out: Box<dyn Write> = match output {
        Some(path) => match File::create(path) {
            Ok(file) => Box::new(BufWriter::new(file)),
            Err(e) => {
                terminal::error(&format!("failed to create {}: {e}", path.display()));
                return EXIT_ERROR;
            }
        },
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    match convert_trace(&from.parser(), lines, out) {
        Ok(count) => {
            if let Some(path) = output {
                terminal::success(&format!("Converted {count} records from {from}"));
                terminal::path_output(path);
            }
            EXIT_SUCCESS
        }
        Err(e) => {
            terminal::error(&e.to_string());
            EXIT_ERROR
        }
    }
}
