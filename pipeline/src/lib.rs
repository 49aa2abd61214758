//! # bankmerge - FDIC bank datasets in one spreadsheet
//!
//! Downloads three public FDIC datasets, normalizes their columns into a
//! common layout and combines them into a single workbook.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  FDIC / S3  │────▶│   Fetch     │────▶│   Reshape   │────▶│    Merge    │──▶ .xlsx
//! │  (3 CSVs)   │     │ (raw files) │     │ (per source)│     │ (9 columns) │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! Stages communicate only through the staging directories described by
//! [`PipelineConfig`].
//!
//! ## Modules
//!
//! - [`error`] - Error types per stage
//! - [`models`] - Sources, tables and combined records
//! - [`config`] - Staging layout
//! - [`logs`] - Diagnostics sink
//! - [`parser`] - Delimited text with encoding detection
//! - [`fetch`] - Downloads
//! - [`transform`] - Reshape, merge and the stage driver
//! - [`export`] - Workbook output

// Core modules
pub mod config;
pub mod error;
pub mod logs;
pub mod models;

// I/O
pub mod export;
pub mod fetch;
pub mod parser;

// Stages
pub mod transform;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::PipelineConfig;

pub use error::{CsvError, ExportError, FetchError, MergeError, PipelineError, ReshapeError};

pub use logs::{Diagnostics, LogEntry, LogLevel};

pub use models::{
    ColumnReport, CombinedRecord, EncodingPolicy, Source, Table, COMBINED_COLUMNS, KEY_COLUMNS,
};

pub use parser::{
    decode_content, detect_delimiter, detect_encoding, parse_bytes, parse_file, ParseResult,
};

pub use fetch::{fetch_all, find_csv_link};

pub use export::export_workbook;

pub use transform::{
    combine, merge, prepare_source, reshape_all, reshape_source, reshape_table, run, MergeOutcome,
    ReshapeOutcome, RunOptions, RunSummary,
};
