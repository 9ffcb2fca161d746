//! CLI argument definitions

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "gaslens",
    version,
    about = "Analyze a recorded EVM execution trace for gas optimization opportunities",
    after_help = "\
EXAMPLES:
    gaslens trace.jsonl                      Findings report
    gaslens trace.jsonl --verbose            Add per-opcode gas breakdown
    gaslens trace.jsonl --json > report.json Machine-readable report"
)]
pub struct Args {
    /// Recorded trace (JSON Lines, one event per line)
    #[arg(value_name = "TRACE")]
    pub trace: PathBuf,

    /// Print the report as JSON instead of formatted text
    #[arg(long)]
    pub json: bool,

    /// Include the per-opcode gas breakdown
    #[arg(short, long)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Analyzer thresholds (JSON file; omitted keys keep their defaults)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Rows shown in the gas breakdown
    #[arg(long, value_name = "N", default_value = "10")]
    pub top: usize,

    /// Suppress non-essential output
    #[arg(short, long)]
    pub quiet: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_args_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["gaslens", "trace.jsonl"]).unwrap();
        assert_eq!(args.trace, PathBuf::from("trace.jsonl"));
        assert_eq!(args.top, 10);
        assert!(!args.json && !args.verbose && !args.no_color && !args.quiet);
        assert!(args.config.is_none());
    }

    #[test]
    fn test_trace_is_required() {
        assert!(Args::try_parse_from(["gaslens"]).is_err());
    }
}
