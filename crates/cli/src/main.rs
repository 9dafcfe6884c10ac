//! False-sharing coherence simulator CLI.
//!
//! This binary provides a single entry point for both workflows. It performs:
//! 1. **Run:** Replay a trace through the shared cache and print the summary as JSON.
//! 2. **Compare:** Tabulate IPKI and IPC proxy of baseline vs. mitigated summaries.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use fsim_core::report::Comparison;
use fsim_core::sim::run_trace_file;
use fsim_core::{Config, Result, SimError, Summary};

#[derive(Parser, Debug)]
#[command(
    name = "fsim",
    author,
    version,
    about = "False-sharing aware coherence simulator (trace-driven)",
    long_about = "Replay a multi-core access trace through a shared MESI cache, detect false sharing, and optionally suppress invalidations on suspect lines.\n\nExamples:\n  fsim run traces/pingpong.txt --json results/base.json\n  fsim run traces/pingpong.txt --false-sharing-fix --log suspects.csv\n  fsim compare --baseline base.json --fix fix.json --labels pingpong"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Replay a trace file: lines of `core R/W addr`.
    Run {
        /// Trace file to replay.
        trace: PathBuf,

        /// Enable fix-up suppression for suspect lines.
        #[arg(long)]
        false_sharing_fix: bool,

        /// Confidence threshold to mark a line suspect.
        #[arg(long)]
        fs_threshold: Option<u8>,

        /// Word granularity in bytes.
        #[arg(long)]
        word_bytes: Option<u64>,

        /// JSON file with cache geometry and latency overrides.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Path to the suspect-event CSV log.
        #[arg(long)]
        log: Option<PathBuf>,

        /// Path to write the summary statistics JSON.
        #[arg(long)]
        json: Option<PathBuf>,

        /// Also print a human-readable statistics block to stderr.
        #[arg(long)]
        stats: bool,
    },

    /// Compare baseline and fix-up summaries of the same workloads.
    Compare {
        /// Baseline summary JSON files.
        #[arg(long, num_args = 1.., required = true)]
        baseline: Vec<PathBuf>,

        /// Fix-up summary JSON files (same order and length as baseline).
        #[arg(long, num_args = 1.., required = true)]
        fix: Vec<PathBuf>,

        /// Labels for each workload (same length).
        #[arg(long, num_args = 1..)]
        labels: Option<Vec<String>>,

        /// Write the table to this file instead of stdout.
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Run {
            trace,
            false_sharing_fix,
            fs_threshold,
            word_bytes,
            config,
            log,
            json,
            stats,
        } => build_config(config.as_deref(), false_sharing_fix, fs_threshold, word_bytes)
            .and_then(|cfg| cmd_run(&trace, &cfg, log.as_deref(), json.as_deref(), stats)),
        Commands::Compare {
            baseline,
            fix,
            labels,
            out,
        } => cmd_compare(&baseline, &fix, labels, out.as_deref()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("[!] FATAL: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Starts from the defaults (or a JSON file) and applies command-line overrides.
fn build_config(
    path: Option<&Path>,
    false_sharing_fix: bool,
    fs_threshold: Option<u8>,
    word_bytes: Option<u64>,
) -> Result<Config> {
    let mut config = path.map_or_else(|| Ok(Config::default()), Config::from_json_file)?;
    config.false_sharing_fix |= false_sharing_fix;
    if let Some(threshold) = fs_threshold {
        config.fs_threshold = threshold;
    }
    if let Some(bytes) = word_bytes {
        config.word_bytes = bytes;
    }
    config.validate()?;
    Ok(config)
}

/// Replays the trace, prints the summary JSON, and optionally persists it.
fn cmd_run(trace: &Path, config: &Config, log: Option<&Path>, json: Option<&Path>, stats: bool) -> Result<()> {
    let summary = run_trace_file(trace, config, log)?;
    let text = summary_json(&summary)?;
    println!("{text}");
    if let Some(path) = json {
        fs::write(path, format!("{text}\n"))
            .map_err(|e| SimError::io(format!("writing summary {}", path.display()), e))?;
    }
    if stats {
        summary.print();
    }
    Ok(())
}

fn summary_json(summary: &Summary) -> Result<String> {
    serde_json::to_string_pretty(summary).map_err(|e| SimError::json("encoding summary", e))
}

/// Loads the paired summaries and prints (or writes) the comparison table.
fn cmd_compare(baseline: &[PathBuf], fix: &[PathBuf], labels: Option<Vec<String>>, out: Option<&Path>) -> Result<()> {
    let comparison = Comparison::from_files(baseline, fix, labels)?;
    let table = comparison.render();
    let Some(path) = out else {
        print!("{table}");
        return Ok(());
    };
    fs::write(path, &table).map_err(|e| SimError::io(format!("writing comparison {}", path.display()), e))?;
    println!("Wrote {}", path.display());
    Ok(())
}
