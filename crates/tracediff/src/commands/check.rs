use std::path::Path;

use tracediff::{Error, TraceFormat, check_trace, open_trace};

use crate::cli::{EXIT_ERROR, EXIT_FAILURE, EXIT_SUCCESS};
use crate::terminal::{self, Spinner};

/// Parse every line of a trace and report what was found.
pub fn cmd_check(trace: &Path, format: TraceFormat, quiet: bool) -> i32 {
    let lines = match open_trace(trace) {
        Ok(lines) => lines,
        Err(e) => {
            terminal::error(&e.to_string());
            return EXIT_ERROR;
        }
    };

    let spinner = Spinner::new(format!("Checking {}", trace.display()), quiet);
    match check_trace(&format.parser(), lines) {
        Ok(check) => {
            spinner.finish_with_success(&format!("{} records parsed as {format}", check.records));
            if let Some(pc) = check.first_pc {
                terminal::indent(&format!("first pc: {pc:x}"));
            }
            terminal::indent(&format!("final cycle: {}", check.last_cycle));
            if let Some(line) = check.cycle_regression {
                terminal::warning(&format!("cycle counter decreases at line {line}"));
                return EXIT_FAILURE;
            }
            EXIT_SUCCESS
        }
        Err(Error::Parse(e)) => {
            spinner.finish_with_failure(&e.to_string());
            EXIT_FAILURE
        }
        Err(e) => {
            spinner.finish_with_failure(&e.to_string());
            EXIT_ERROR
        }
    }
}
