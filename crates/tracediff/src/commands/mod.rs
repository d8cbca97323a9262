//! Command implementations.
//!
//! Each submodule handles one CLI command.

mod check;
mod compare;
mod convert;

use std::fmt::Write as _;

use serde::Serialize;
use tracediff::{CompareReport, CycleMismatch, Divergence, StreamLengths};

use crate::cli::{Cli, Commands, OutputFormat};
use crate::terminal;

/// Dispatch CLI command to the appropriate handler.
pub fn run_command(cli: &Cli) -> i32 {
    match &cli.command {
        Commands::Compare { .. } => handle_compare(cli),
        Commands::Check { .. } => handle_check(cli),
        Commands::Convert { .. } => handle_convert(cli),
    }
}

fn handle_compare(cli: &Cli) -> i32 {
    let Commands::Compare {
        reference,
        candidate,
        reference_format,
        candidate_format,
        reference_sample,
        strict_cycles,
        strict_length,
        list_mismatches,
        format,
        ..
    } = &cli.command
    else {
        unreachable!("compare command variant mismatch");
    };
    let Some(config) = cli.command.compare_config() else {
        unreachable!("compare command variant mismatch");
    };

    compare::cmd_compare(&compare::CompareArgs {
        reference,
        candidate,
        reference_format: (*reference_format).into(),
        candidate_format: (*candidate_format).into(),
        reference_sample: reference_sample.as_deref(),
        config,
        strict_cycles: *strict_cycles,
        strict_length: *strict_length,
        list_mismatches: *list_mismatches,
        format: *format,
        quiet: cli.silent,
    })
}

fn handle_check(cli: &Cli) -> i32 {
    let Commands::Check { trace, format_tag } = &cli.command else {
        unreachable!("check command variant mismatch");
    };

    check::cmd_check(trace, (*format_tag).into(), cli.silent)
}

fn handle_convert(cli: &Cli) -> i32 {
    let Commands::Convert {
        trace,
        from,
        output,
    } = &cli.command
    else {
        unreachable!("convert command variant mismatch");
    };

    convert::cmd_convert(trace, (*from).into(), output.as_deref())
}

// ============================================================================
// Output formatting helpers
// ============================================================================

/// Print a comparison report to stdout in a machine-readable format.
///
/// Text output is written to stderr by the command itself.
pub fn print_report(format: OutputFormat, report: &CompareReport, passed: bool, limit: usize) {
    match format {
        OutputFormat::Text => {}
        OutputFormat::Raw => print!("{}", render_raw(report, passed, limit)),
        OutputFormat::Json => match render_json(report, passed, limit) {
            Ok(json) => println!("{json}"),
            Err(e) => terminal::error(&format!("failed to serialize report: {e}")),
        },
    }
}

fn render_raw(report: &CompareReport, passed: bool, limit: usize) -> String {
    let summary = &report.summary;
    let mut out = String::new();
    let _ = writeln!(out, "lines_compared: {}", summary.lines_compared);
    let _ = writeln!(out, "cycle_mismatches: {}", summary.cycle_mismatch_count);
    match summary.lengths {
        StreamLengths::Equal => {
            let _ = writeln!(out, "lengths: equal");
        }
        StreamLengths::Mismatch {
            reference,
            candidate,
        } => {
            let _ = writeln!(out, "lengths: {reference} {candidate}");
        }
        StreamLengths::NotChecked => {
            let _ = writeln!(out, "lengths: unchecked");
        }
    }
    let _ = writeln!(out, "truncated: {}", summary.truncated);
    match &report.divergence {
        Some(divergence) => {
            let _ = writeln!(out, "divergence: {}", divergence.kind.name());
            let _ = writeln!(out, "divergence_line: {}", divergence.line);
        }
        None => {
            let _ = writeln!(out, "divergence: none");
        }
    }
    for mismatch in summary.cycle_mismatches.iter().take(limit) {
        let _ = writeln!(
            out,
            "mismatch: {} {} {:+}",
            mismatch.line,
            mismatch.previous_opcode.as_deref().unwrap_or("-"),
            mismatch.difference()
        );
    }
    let _ = writeln!(out, "passed: {passed}");
    out
}

/// JSON view of a comparison report; fields serialize in declaration order.
#[derive(Serialize)]
struct ReportJson<'a> {
    lines_compared: usize,
    cycle_mismatch_count: usize,
    cycle_mismatches: Vec<MismatchJson<'a>>,
    lengths: Option<LengthsJson>,
    truncated: bool,
    divergence: Option<DivergenceJson<'a>>,
    passed: bool,
}

/// `"equal"`, or both totals when they differ.
#[derive(Serialize)]
#[serde(untagged)]
enum LengthsJson {
    Equal(&'static str),
    Mismatch { reference: usize, candidate: usize },
}

#[derive(Serialize)]
struct DivergenceJson<'a> {
    kind: &'static str,
    line: usize,
    message: String,
    reference: &'a str,
    candidate: &'a str,
}

#[derive(Serialize)]
struct MismatchJson<'a> {
    line: usize,
    op: Option<&'a str>,
    reference_delta: i64,
    candidate_delta: i64,
    difference: i64,
}

impl<'a> From<&'a Divergence> for DivergenceJson<'a> {
    fn from(divergence: &'a Divergence) -> Self {
        Self {
            kind: divergence.kind.name(),
            line: divergence.line,
            message: divergence.to_string(),
            reference: &divergence.reference_raw,
            candidate: &divergence.candidate_raw,
        }
    }
}

impl<'a> From<&'a CycleMismatch> for MismatchJson<'a> {
    fn from(mismatch: &'a CycleMismatch) -> Self {
        Self {
            line: mismatch.line,
            op: mismatch.previous_opcode.as_deref(),
            reference_delta: mismatch.reference_delta,
            candidate_delta: mismatch.candidate_delta,
            difference: mismatch.difference(),
        }
    }
}

fn render_json(report: &CompareReport, passed: bool, limit: usize) -> serde_json::Result<String> {
    let summary = &report.summary;
    let lengths = match summary.lengths {
        StreamLengths::Equal => Some(LengthsJson::Equal("equal")),
        StreamLengths::Mismatch {
            reference,
            candidate,
        } => Some(LengthsJson::Mismatch {
            reference,
            candidate,
        }),
        StreamLengths::NotChecked => None,
    };

    serde_json::to_string(&ReportJson {
        lines_compared: summary.lines_compared,
        cycle_mismatch_count: summary.cycle_mismatch_count,
        cycle_mismatches: summary
            .cycle_mismatches
            .iter()
            .take(limit)
            .map(MismatchJson::from)
            .collect(),
        lengths,
        truncated: summary.truncated,
        divergence: report.divergence.as_ref().map(DivergenceJson::from),
        passed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracediff::{CompareSummary, DivergenceKind};

    fn report(divergence: Option<Divergence>) -> CompareReport {
        CompareReport {
            summary: CompareSummary {
                lines_compared: 10,
                cycle_mismatch_count: 2,
                cycle_mismatches: vec![
                    CycleMismatch {
                        line: 3,
                        previous_opcode: Some("LDA".to_string()),
                        reference_delta: 2,
                        candidate_delta: 3,
                    },
                    CycleMismatch {
                        line: 4,
                        previous_opcode: None,
                        reference_delta: 4,
                        candidate_delta: 3,
                    },
                ],
                lengths: StreamLengths::Mismatch {
                    reference: 12,
                    candidate: 10,
                },
                truncated: false,
            },
            divergence,
        }
    }

    #[test]
    fn test_render_raw() {
        let raw = render_raw(&report(None), true, 1);
        assert_eq!(
            raw,
            "lines_compared: 10\n\
             cycle_mismatches: 2\n\
             lengths: 12 10\n\
             truncated: false\n\
             divergence: none\n\
             mismatch: 3 LDA -1\n\
             passed: true\n"
        );
    }

    #[test]
    fn test_render_json() {
        let divergence = Divergence {
            line: 10,
            kind: DivergenceKind::Address {
                reference_pc: "c000".to_string(),
                candidate_pc: "c001".to_string(),
            },
            reference_raw: "C000  ...".to_string(),
            candidate_raw: "c001|...".to_string(),
        };
        let json = render_json(&report(Some(divergence)), false, 20).unwrap();

        assert!(json.starts_with(r#"{"lines_compared":10,"cycle_mismatch_count":2,"#));
        assert!(json.contains(
            r#"{"line":3,"op":"LDA","reference_delta":2,"candidate_delta":3,"difference":-1}"#
        ));
        assert!(json.contains(r#""op":null"#));
        assert!(json.contains(r#""lengths":{"reference":12,"candidate":10}"#));
        assert!(json.contains(r#""kind":"AddressDivergence","line":10"#));
        assert!(json.ends_with(r#""passed":false}"#));
    }

    #[test]
    fn test_render_json_escapes_raw_lines() {
        let divergence = Divergence {
            line: 0,
            kind: DivergenceKind::Address {
                reference_pc: "c000".to_string(),
                candidate_pc: "c001".to_string(),
            },
            reference_raw: "C000 \"quoted\"\\".to_string(),
            candidate_raw: "c001\t\u{1}".to_string(),
        };
        let mut report = report(Some(divergence));
        report.summary.lengths = StreamLengths::NotChecked;
        let json = render_json(&report, false, 0).unwrap();

        assert!(json.contains(r#""cycle_mismatches":[]"#));
        assert!(json.contains(r#""lengths":null"#));
        assert!(json.contains(r#""reference":"C000 \"quoted\"\\""#));
        assert!(json.contains(r#""candidate":"c001\t\u0001""#));

        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["divergence"]["line"], 0);
        assert_eq!(parsed["cycle_mismatch_count"], 2);
    }

    #[test]
    fn test_render_json_equal_lengths() {
        let mut report = report(None);
        report.summary.lengths = StreamLengths::Equal;
        let json = render_json(&report, true, 20).unwrap();

        assert!(json.contains(r#""lengths":"equal""#));
        assert!(json.contains(r#""divergence":null"#));
    }
}
