//! bankmerge CLI - Fetch, reshape and combine FDIC bank datasets
//!
//! # Commands
//!
//! ```bash
//! bankmerge                        # Run the whole pipeline
//! bankmerge run --skip-fetch       # Reuse already downloaded raw files
//! bankmerge fetch                  # Only download raw files
//! bankmerge reshape                # Only reshape raw files
//! bankmerge merge                  # Only build the combined workbook
//! ```
//!
//! Diagnostics go to stderr; `--report` also writes them as JSON.

use bankmerge::{run, Diagnostics, PipelineConfig, PipelineError, RunOptions, RunSummary};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "bankmerge")]
#[command(about = "Combine FDIC bank datasets into one spreadsheet", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Directory holding the staging folders
    #[arg(short, long, global = true, default_value = ".")]
    base_dir: PathBuf,

    /// Skip TLS certificate verification when downloading
    #[arg(long, global = true)]
    insecure: bool,

    /// Write collected diagnostics as JSON to this file
    #[arg(long, global = true)]
    report: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch, reshape and merge
    Run {
        /// Reuse raw files already in the download folder
        #[arg(long)]
        skip_fetch: bool,
    },

    /// Download the raw datasets
    Fetch,

    /// Reshape downloaded datasets
    Reshape,

    /// Combine reshaped datasets into the workbook
    Merge,
}

impl Commands {
    fn options(&self) -> RunOptions {
        let only = |fetch: bool, reshape: bool, merge: bool| RunOptions {
            skip_fetch: !fetch,
            skip_reshape: !reshape,
            skip_merge: !merge,
        };
        match self {
            Commands::Run { skip_fetch } => only(!skip_fetch, true, true),
            Commands::Fetch => only(true, false, false),
            Commands::Reshape => only(false, true, false),
            Commands::Merge => only(false, false, true),
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let command = cli.command.unwrap_or(Commands::Run { skip_fetch: false });
    let config = PipelineConfig::from_base(&cli.base_dir).with_insecure_tls(cli.insecure);
    let mut log = Diagnostics::new();

    eprintln!("🏦 bankmerge: {}", cli.base_dir.display());
    let summary = run(&config, command.options(), &mut log).await;
    print_summary(&summary);

    if let Some(path) = cli.report.as_deref() {
        if let Err(e) = write_report(&log, path) {
            eprintln!("❌ Error: {}", e);
        }
    }
}

fn print_summary(summary: &RunSummary) {
    eprintln!("\n📊 Summary:");
    eprintln!("   Fetched: {} ({} failed)", summary.fetched, summary.fetch_failed);
    eprintln!("   Reshaped: {} ({} failed)", summary.reshaped, summary.reshape_failed);
    match &summary.merge {
        Some(m) => eprintln!("   Combined: {} rows → {}", m.rows, m.output.display()),
        None => eprintln!("   Combined: not written"),
    }
    if summary.errors > 0 || summary.warnings > 0 {
        eprintln!(
            "\n⚠️  Completed with {} error(s), {} warning(s)",
            summary.errors, summary.warnings
        );
    } else {
        eprintln!("\n✨ Done!");
    }
}

fn write_report(log: &Diagnostics, path: &Path) -> Result<(), PipelineError> {
    let json = log
        .to_json()
        .map_err(|e| PipelineError::Report(e.to_string()))?;
    fs::write(path, json).map_err(|e| PipelineError::Report(format!("{}: {}", path.display(), e)))?;
    eprintln!("💾 Report written to: {}", path.display());
    Ok(())
}
