use std::path::Path;
use std::time::Instant;

use tracediff::stream::is_stdin;
use tracediff::{
    CompareConfig, CompareEvent, CompareReport, Comparator, Error, ReferenceParser, StreamLengths,
    TraceFormat, TraceParser, open_trace,
};

use super::print_report;
use crate::cli::{EXIT_ERROR, EXIT_FAILURE, EXIT_SUCCESS, OutputFormat};
use crate::terminal::{self, Spinner};

/// Arguments for the `compare` command.
pub struct CompareArgs<'a> {
    pub reference: &'a Path,
    pub candidate: &'a Path,
    pub reference_format: TraceFormat,
    pub candidate_format: TraceFormat,
    pub reference_sample: Option<&'a str>,
    pub config: CompareConfig,
    pub strict_cycles: bool,
    pub strict_length: bool,
    pub list_mismatches: usize,
    pub format: OutputFormat,
    pub quiet: bool,
}

/// Parser for one stream; a sample line re-derives the fixed columns.
fn build_parser(
    format: TraceFormat,
    sample: Option<&str>,
) -> tracediff::Result<Box<dyn TraceParser>> {
    match (format, sample) {
        (TraceFormat::Reference, Some(sample)) => {
            let parser = ReferenceParser::from_sample(sample)?;
            tracing::debug!(layout = ?parser.layout(), "using inferred reference layout");
            Ok(Box::new(parser))
        }
        _ => Ok(format.parser()),
    }
}

/// Compare a candidate trace against a reference trace.
pub fn cmd_compare(args: &CompareArgs<'_>) -> i32 {
    let text = matches!(args.format, OutputFormat::Text);

    if is_stdin(args.reference) && is_stdin(args.candidate) {
        terminal::error(&Error::StdinTwice.to_string());
        return EXIT_ERROR;
    }
    if args.reference_sample.is_some()
        && args.reference_format != TraceFormat::Reference
        && args.candidate_format != TraceFormat::Reference
    {
        terminal::warning("--reference-sample ignored: neither trace uses the reference format");
    }

    let parsers = build_parser(args.reference_format, args.reference_sample).and_then(|r| {
        build_parser(args.candidate_format, args.reference_sample).map(|c| (r, c))
    });
    let (reference_parser, candidate_parser) = match parsers {
        Ok(pair) => pair,
        Err(e) => {
            terminal::error(&e.to_string());
            return EXIT_ERROR;
        }
    };

    let streams = open_trace(args.reference).and_then(|r| open_trace(args.candidate).map(|c| (r, c)));
    let (reference_lines, candidate_lines) = match streams {
        Ok(pair) => pair,
        Err(e) => {
            terminal::error(&e.to_string());
            return EXIT_ERROR;
        }
    };

    if text && !args.quiet {
        terminal::header("Comparing traces");
        terminal::indent(&format!(
            "reference: {} ({})",
            args.reference.display(),
            args.reference_format
        ));
        terminal::indent(&format!(
            "candidate: {} ({})",
            args.candidate.display(),
            args.candidate_format
        ));
        if args.config.skip_lines > 0 {
            terminal::dim(&format!("skipping {} lines", args.config.skip_lines));
        }
    }

    let comparator = Comparator::new(reference_parser, candidate_parser, args.config.clone());
    let spinner = Spinner::new("Comparing...", args.quiet || !text);
    let start = Instant::now();

    let result = comparator.run(reference_lines, candidate_lines, |event| match event {
        CompareEvent::Progress { lines_compared } => {
            spinner.set_message(format!("Compared {lines_compared} lines"));
        }
        CompareEvent::CycleMismatch(mismatch) => {
            if !args.quiet {
                spinner.suspend(|| terminal::warning(&mismatch.to_string()));
            }
        }
    });
    tracediff::metrics::record_duration(start.elapsed().as_secs_f64());

    let report = match result {
        Ok(report) => report,
        Err(e) => {
            spinner.finish_with_failure(&e.to_string());
            return EXIT_ERROR;
        }
    };

    let passed = report.passed(args.strict_cycles, args.strict_length);
    if text {
        report_text(&spinner, &report, passed);
    } else {
        print_report(args.format, &report, passed, args.list_mismatches);
    }

    if passed { EXIT_SUCCESS } else { EXIT_FAILURE }
}

fn report_text(spinner: &Spinner, report: &CompareReport, passed: bool) {
    let summary = &report.summary;
    if let Some(divergence) = &report.divergence {
        spinner.finish_with_failure(&divergence.to_string());
        terminal::indent(&format!("reference: {}", divergence.reference_raw));
        terminal::indent(&format!("candidate: {}", divergence.candidate_raw));
        terminal::info(&summary.to_string());
    } else if !passed {
        spinner.finish_with_failure(&summary.to_string());
    } else if summary.cycle_mismatch_count > 0
        || matches!(summary.lengths, StreamLengths::Mismatch { .. })
    {
        spinner.finish_with_warning(&summary.to_string());
    } else {
        spinner.finish_with_success(&summary.to_string());
    }
}
