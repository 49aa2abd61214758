//! Pipeline driver: fetch, reshape and merge in order.
//!
//! Stage failures never abort the run. They are logged to the
//! [`Diagnostics`] sink and the driver moves on to the next stage, so a run
//! always completes with a summary.
//!
//! # Example
//!
//! ```rust,ignore
//! use bankmerge::{run, Diagnostics, PipelineConfig, RunOptions};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = PipelineConfig::from_base(".");
//!     let mut log = Diagnostics::new();
//!     let summary = run(&config, RunOptions::default(), &mut log).await;
//!     println!("{} combined rows", summary.combined_rows());
//! }
//! ```

use serde::{Deserialize, Serialize};

use super::merge::{merge, MergeOutcome};
use super::reshape::reshape_all;
use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::fetch::fetch_all;
use crate::logs::{Diagnostics, LogLevel};

/// Which stages to run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunOptions {
    pub skip_fetch: bool,
    pub skip_reshape: bool,
    pub skip_merge: bool,
}

/// Counts per stage for one run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub fetched: usize,
    pub fetch_failed: usize,
    pub reshaped: usize,
    pub reshape_failed: usize,
    /// Present when the merge produced a workbook
    pub merge: Option<MergeOutcome>,
    pub warnings: usize,
    pub errors: usize,
}

impl RunSummary {
    pub fn combined_rows(&self) -> usize {
        self.merge.as_ref().map_or(0, |m| m.rows)
    }
}

/// Run the selected stages against `config`.
pub async fn run(
    config: &PipelineConfig,
    options: RunOptions,
    log: &mut Diagnostics,
) -> RunSummary {
    let mut summary = RunSummary::default();

    if let Err(e) = config.ensure_dirs() {
        log.error(e.to_string());
    }

    if !options.skip_fetch {
        log.info("🌐 Fetching raw datasets...");
        for (_, result) in fetch_all(config, log).await {
            match result {
                Ok(_) => summary.fetched += 1,
                Err(_) => summary.fetch_failed += 1,
            }
        }
    }

    if !options.skip_reshape {
        log.info("🔄 Reshaping raw datasets...");
        for (_, result) in reshape_all(config, log) {
            match result {
                Ok(_) => summary.reshaped += 1,
                Err(_) => summary.reshape_failed += 1,
            }
        }
    }

    if !options.skip_merge {
        log.info("📦 Merging reshaped datasets...");
        match merge(config, log) {
            Ok(outcome) => summary.merge = Some(outcome),
            Err(e) => {
                log.error(PipelineError::from(e).to_string());
                log.error("Combined workbook was not written");
            }
        }
    }

    summary.warnings = log.count(LogLevel::Warning);
    summary.errors = log.count(LogLevel::Error);
    summary
}
