//! # gaslens - Main Entry Point
//!
//! Replays a recorded trace through the [`GasTracer`] and prints either the
//! formatted findings report or, with `--json`, the machine-readable report.
//!
//! Progress lines go to stderr so `--json` output on stdout stays parseable.

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use std::io::{IsTerminal, Write};

use gaslens::cli::Args;
use gaslens::config::AnalyzerConfig;
use gaslens::domain::ConfigError;
use gaslens::presenter::{Presenter, PresenterConfig};
use gaslens::trace_data::{replay, TraceData};
use gaslens::tracer::GasTracer;

// Exit codes
const EXIT_SUCCESS: i32 = 0;
const EXIT_ERROR: i32 = 1;
const EXIT_USAGE: i32 = 2;

fn main() {
    env_logger::init();
    std::process::exit(match run() {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            let code = exit_code_for(&e);
            eprintln!("error: {e:#}");
            code
        }
    });
}

fn exit_code_for(err: &anyhow::Error) -> i32 {
    if err.downcast_ref::<ConfigError>().is_some() {
        EXIT_USAGE
    } else {
        EXIT_ERROR
    }
}

fn load_config(args: &Args) -> Result<AnalyzerConfig> {
    match args.config {
        Some(ref path) => Ok(AnalyzerConfig::from_file(path)?),
        None => Ok(AnalyzerConfig::default()),
    }
}

fn run() -> Result<()> {
    let args = Args::parse();
    let quiet = args.quiet;

    let config = load_config(&args)?;

    let trace = TraceData::from_file(&args.trace)
        .with_context(|| format!("Failed to load trace {}", args.trace.display()))?;

    if !quiet {
        eprintln!("gaslens v{}", env!("CARGO_PKG_VERSION"));
        eprintln!("trace: {}", args.trace.display());
        eprintln!("events: {}", trace.len());
    }

    let tracer = GasTracer::new(config);
    let summary = replay(&trace, &tracer);
    info!("Replayed {} events", summary.delivered);

    if !summary.saw_tx_end {
        anyhow::bail!(
            "Trace {} is incomplete: no tx_end event among {} events",
            args.trace.display(),
            summary.delivered
        );
    }

    let ignored = tracer.ignored_events();
    if ignored > 0 {
        warn!("{ignored} events after tx_end were ignored");
    }

    let report = tracer.try_report()?;
    info!(
        "{} findings, estimated savings {} gas",
        report.optimizations.len(),
        report.total_savings()
    );

    if args.json {
        let stdout = std::io::stdout();
        report.write_to(stdout.lock()).context("Failed to write report")?;
        return Ok(());
    }

    let color = !args.no_color && std::io::stdout().is_terminal();
    let presenter =
        Presenter::new(PresenterConfig { color, top_n: args.top, ..PresenterConfig::default() });
    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(presenter.render(&report, args.verbose).as_bytes())
        .context("Failed to write report")?;

    Ok(())
}
