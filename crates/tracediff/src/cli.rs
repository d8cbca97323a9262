//! CLI definitions and argument types.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tracediff::{CompareConfig, TraceFormat};

/// Exit code for success.
pub const EXIT_SUCCESS: i32 = 0;
/// Exit code for a divergence or failed check.
pub const EXIT_FAILURE: i32 = 1;
/// Exit code for unreadable input or bad arguments.
pub const EXIT_ERROR: i32 = 2;

#[derive(Parser)]
#[command(name = "tracediff")]
#[command(about = "Compare a CPU emulator trace against a golden reference log")]
#[command(version)]
pub struct Cli {
    /// Show metrics summary after execution
    #[arg(long, global = true)]
    pub metrics: bool,

    /// Enable verbose output (sets RUST_LOG=debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress output (only show errors)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub silent: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Walk two traces in lockstep and report the first divergence
    Compare {
        /// Reference trace (`-` for stdin, `.zst` is decompressed)
        #[arg(value_name = "REFERENCE")]
        reference: PathBuf,

        /// Candidate trace (`-` for stdin, `.zst` is decompressed)
        #[arg(value_name = "CANDIDATE")]
        candidate: PathBuf,

        /// Line format of the reference trace
        #[arg(long, value_enum, default_value = "reference")]
        reference_format: FormatArg,

        /// Line format of the candidate trace
        #[arg(long, value_enum, default_value = "candidate")]
        candidate_format: FormatArg,

        /// Sample reference line to derive column offsets from
        #[arg(long, value_name = "LINE")]
        reference_sample: Option<String>,

        /// Skip this many leading lines of both traces
        #[arg(long, default_value = "0")]
        skip: usize,

        /// Stop after comparing this many lines
        #[arg(long)]
        max_lines: Option<usize>,

        /// Do not compare cycle counts
        #[arg(long)]
        ignore_cycles: bool,

        /// Fail if any cycle mismatch is found
        #[arg(long)]
        strict_cycles: bool,

        /// Fail if the traces have different lengths
        #[arg(long)]
        strict_length: bool,

        /// Maximum number of cycle mismatches listed in the raw or json summary
        #[arg(long, default_value = "20")]
        list_mismatches: usize,

        /// Summary format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Parse a whole trace and report the first malformed line
    Check {
        /// Trace file (`-` for stdin, `.zst` is decompressed)
        #[arg(value_name = "TRACE")]
        trace: PathBuf,

        /// Line format of the trace
        #[arg(long, value_enum, default_value = "reference")]
        format_tag: FormatArg,
    },

    /// Re-emit a trace in the pipe-separated candidate format
    Convert {
        /// Trace file (`-` for stdin, `.zst` is decompressed)
        #[arg(value_name = "TRACE")]
        trace: PathBuf,

        /// Line format of the input trace
        #[arg(long, value_enum, default_value = "reference")]
        from: FormatArg,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

impl Commands {
    /// Comparator configuration for the `compare` command.
    pub fn compare_config(&self) -> Option<CompareConfig> {
        let Self::Compare {
            skip,
            max_lines,
            ignore_cycles,
            ..
        } = self
        else {
            return None;
        };
        Some(CompareConfig {
            max_lines: *max_lines,
            skip_lines: *skip,
            ignore_cycles: *ignore_cycles,
            ..CompareConfig::default()
        })
    }
}

/// Trace line format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    /// Fixed-column nestest-style log
    Reference,
    /// Pipe-separated emulator trace
    Candidate,
}

impl From<FormatArg> for TraceFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Reference => Self::Reference,
            FormatArg::Candidate => Self::Candidate,
        }
    }
}

/// Output format for the comparison summary.
#[derive(Clone, Copy, Debug, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable output (default)
    #[default]
    Text,
    /// Raw key-value output (for scripting)
    Raw,
    /// JSON output
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compare_defaults() {
        let cli = Cli::try_parse_from(["tracediff", "compare", "nestest.log", "emu.log"]).unwrap();
        let Commands::Compare {
            reference_format,
            candidate_format,
            list_mismatches,
            ..
        } = &cli.command
        else {
            panic!("expected compare");
        };
        assert_eq!(*reference_format, FormatArg::Reference);
        assert_eq!(*candidate_format, FormatArg::Candidate);
        assert_eq!(*list_mismatches, 20);

        let config = cli.command.compare_config().unwrap();
        assert_eq!(config.skip_lines, 0);
        assert!(config.keep_cycle_mismatches);
    }

    #[test]
    fn test_compare_config_from_flags() {
        let cli = Cli::try_parse_from([
            "tracediff",
            "compare",
            "a",
            "b",
            "--skip",
            "3",
            "--max-lines",
            "100",
            "--ignore-cycles",
        ])
        .unwrap();
        let config = cli.command.compare_config().unwrap();
        assert_eq!(config.skip_lines, 3);
        assert_eq!(config.max_lines, Some(100));
        assert!(config.ignore_cycles);
    }

    #[test]
    fn test_verbose_conflicts_with_silent() {
        assert!(Cli::try_parse_from(["tracediff", "-v", "-s", "check", "x"]).is_err());
    }

    #[test]
    fn test_check_has_no_compare_config() {
        let cli = Cli::try_parse_from(["tracediff", "check", "x", "--format-tag", "candidate"])
            .unwrap();
        assert!(cli.command.compare_config().is_none());
    }
}
