//! Error types for the bankmerge pipeline.
//!
//! One enum per stage, plus a top-level wrapper:
//!
//! - [`CsvError`] - reading and decoding delimited files
//! - [`FetchError`] - downloading raw datasets
//! - [`ReshapeError`] - normalizing one raw dataset
//! - [`MergeError`] - combining the reshaped datasets
//! - [`ExportError`] - writing the combined workbook
//! - [`PipelineError`] - top-level orchestration errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use std::path::PathBuf;

use thiserror::Error;

use crate::models::Source;

// =============================================================================
// CSV Errors
// =============================================================================

/// Errors while reading or decoding a delimited file.
#[derive(Debug, Error)]
pub enum CsvError {
    /// Failed to read or write the file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Bytes are not valid in the expected encoding.
    #[error("Cannot decode content as {encoding}: {message}")]
    Decode { encoding: String, message: String },

    /// Malformed delimited text.
    #[error("Invalid CSV format: {0}")]
    Parse(#[from] csv::Error),

    /// Empty file.
    #[error("CSV file is empty")]
    EmptyFile,
}

// =============================================================================
// Fetch Errors
// =============================================================================

/// Errors while downloading a raw dataset.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport-level failure.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status.
    #[error("Unexpected status {status} from {url}")]
    Status { url: String, status: u16 },

    /// The landing page did not link to the expected file.
    #[error("No link containing '{needle}' found on {page}")]
    LinkNotFound { page: String, needle: String },

    /// Invalid URL.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Failed to write the downloaded file.
    #[error("Failed to write download: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Reshape Errors
// =============================================================================

/// Errors while reshaping one raw dataset.
#[derive(Debug, Error)]
pub enum ReshapeError {
    /// Raw input is absent from the staging directory.
    #[error("Raw file not found: {}", .0.display())]
    MissingInput(PathBuf),

    /// Input could not be read, decoded or parsed.
    #[error("Cannot read raw file: {0}")]
    Read(#[from] CsvError),

    /// Reshaped output could not be written.
    #[error("Cannot write {}: {message}", .path.display())]
    Write { path: PathBuf, message: String },
}

// =============================================================================
// Merge Errors
// =============================================================================

/// Errors while combining the reshaped datasets.
#[derive(Debug, Error)]
pub enum MergeError {
    /// A reshaped input is absent.
    #[error("Reshaped file not found: {}", .0.display())]
    MissingInput(PathBuf),

    /// A reshaped input could not be read.
    #[error("Cannot read reshaped file for {dataset}: {error}")]
    Read {
        dataset: Source,
        #[source]
        error: CsvError,
    },

    /// A source does not expose the combined schema after backfill.
    #[error("{dataset} is missing required columns: {}", .columns.join(", "))]
    MissingColumns { dataset: Source, columns: Vec<String> },

    /// The workbook could not be written.
    #[error("Export failed: {0}")]
    Export(#[from] ExportError),
}

// =============================================================================
// Export Errors
// =============================================================================

/// Errors while writing the combined workbook.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Spreadsheet writer failure.
    #[error("Spreadsheet error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    /// Too many rows for a single sheet.
    #[error("{0} rows do not fit in one worksheet")]
    TooManyRows(usize),

    /// Failed to prepare the output directory.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline errors.
///
/// Stage functions return their own error type; this wraps them for callers
/// that drive several stages.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Reshape error: {0}")]
    Reshape(#[from] ReshapeError),

    #[error("Merge error: {0}")]
    Merge(#[from] MergeError),

    /// Staging directories could not be created.
    #[error("Cannot prepare staging directory {}: {error}", .path.display())]
    Setup {
        path: PathBuf,
        #[source]
        error: std::io::Error,
    },

    /// Diagnostics report could not be written.
    #[error("Cannot write report: {0}")]
    Report(String),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for CSV operations.
pub type CsvResult<T> = Result<T, CsvError>;

/// Result type for fetch operations.
pub type FetchResult<T> = Result<T, FetchError>;

/// Result type for reshape operations.
pub type ReshapeResult<T> = Result<T, ReshapeError>;

/// Result type for merge operations.
pub type MergeResult<T> = Result<T, MergeError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
