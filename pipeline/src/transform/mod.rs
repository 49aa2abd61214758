//! Transformation module.
//!
//! - Operations: column and value helpers shared by the stages
//! - Reshape: raw dataset to common column layout
//! - Merge: reshaped datasets to combined records
//! - Pipeline: stage driver

pub mod merge;
pub mod operations;
pub mod pipeline;
pub mod reshape;

pub use merge::{backfill, combine, merge, prepare_source, MergeOutcome, ReshapedRow};
pub use operations::{coerce_integer, strip_leading_zeros, synthesize_summary, NULL_LITERAL};
pub use pipeline::{run, RunOptions, RunSummary};
pub use reshape::{reshape_all, reshape_source, reshape_table, ReshapeOutcome};
