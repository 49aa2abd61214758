//! Merge stage: union the reshaped datasets into one nine-column record set.
//!
//! # Per-row synthesis
//!
//! ```text
//! Indicator NAME CITY STATE DATE ──coerce──▶ "20200101"  ─┐
//!                                                          ├─▶ Data 1 = "20200101 1234"
//! label column (Cert)            ────────────▶ "1234"    ─┘
//! ```
//!
//! The merge is all-or-nothing: if any source lacks a column the combined
//! schema needs, no records are produced.

use serde::Serialize;
use std::fs;
use std::path::PathBuf;

use super::operations::synthesize_summary;
use crate::config::PipelineConfig;
use crate::error::{MergeError, MergeResult};
use crate::export::export_workbook;
use crate::logs::Diagnostics;
use crate::models::{CombinedRecord, Source, Table, KEY_COLUMNS};
use crate::parser::read_table_lenient;

/// One reshaped row viewed through the columns the merge reads.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReshapedRow<'a> {
    pub indicator: Option<&'a str>,
    pub name: Option<&'a str>,
    pub city: Option<&'a str>,
    pub state: Option<&'a str>,
    pub date: Option<&'a str>,
    /// Value of the `Information Type` column
    pub label_1: Option<&'a str>,
    /// Value of the `Information Type 2` column
    pub label_2: Option<&'a str>,
}

impl ReshapedRow<'_> {
    /// Key fields in summary order.
    pub fn keys(&self) -> [Option<&str>; 5] {
        [self.indicator, self.name, self.city, self.state, self.date]
    }
}

/// Result of a successful merge.
#[derive(Debug, Clone, Serialize)]
pub struct MergeOutcome {
    pub rows: usize,
    /// Rows contributed by each source, in sheet order
    pub per_source: Vec<(Source, usize)>,
    pub output: PathBuf,
}

/// Add every required column `table` lacks, filled with nulls.
/// Returns the names of the added columns.
pub fn backfill(source: Source, table: &mut Table) -> Vec<String> {
    let mut added = Vec::new();
    for column in source.required_columns() {
        if !table.has_column(column) {
            table.push_column(column, None);
            added.push(column.to_string());
        }
    }
    added
}

/// Backfill and synthesize the combined records of one source.
///
/// Fails with [`MergeError::MissingColumns`] when a label column is absent,
/// since it is not part of the backfilled set.
pub fn prepare_source(source: Source, mut table: Table) -> MergeResult<Vec<CombinedRecord>> {
    backfill(source, &mut table);

    let (info_1, info_2) = source.information_types();
    let needed = KEY_COLUMNS.iter().copied().chain([info_1, info_2]);
    let mut indices = Vec::with_capacity(7);
    let mut missing = Vec::new();
    for column in needed {
        match table.column_index(column) {
            Some(i) => indices.push(i),
            None => missing.push(column.to_string()),
        }
    }
    if !missing.is_empty() {
        return Err(MergeError::MissingColumns {
            dataset: source,
            columns: missing,
        });
    }

    let records = (0..table.len())
        .map(|r| {
            let row = ReshapedRow {
                indicator: table.cell(r, indices[0]),
                name: table.cell(r, indices[1]),
                city: table.cell(r, indices[2]),
                state: table.cell(r, indices[3]),
                date: table.cell(r, indices[4]),
                label_1: table.cell(r, indices[5]),
                label_2: table.cell(r, indices[6]),
            };
            combined_record(source, &row)
        })
        .collect();

    Ok(records)
}

fn combined_record(source: Source, row: &ReshapedRow<'_>) -> CombinedRecord {
    let (info_1, info_2) = source.information_types();
    CombinedRecord {
        indicator: row.indicator.unwrap_or(source.indicator()).to_string(),
        name: row.name.map(String::from),
        city: row.city.map(String::from),
        state: row.state.map(String::from),
        date: row.date.map(String::from),
        information_type: info_1.to_string(),
        data_1: synthesize_summary(row.keys(), row.label_1),
        information_type_2: info_2.to_string(),
        data_2: synthesize_summary(row.keys(), row.label_2),
    }
}

/// Combine reshaped tables into one record set.
///
/// Rows are ordered failed bank, office location, financial institution,
/// keeping the order within each source. Every source is checked before any
/// output is produced.
pub fn combine(inputs: Vec<(Source, Table)>) -> MergeResult<Vec<CombinedRecord>> {
    let mut inputs = inputs;
    inputs.sort_by_key(|(source, _)| Source::ALL.iter().position(|s| s == source));

    let prepared = inputs
        .into_iter()
        .map(|(source, table)| prepare_source(source, table))
        .collect::<MergeResult<Vec<_>>>()?;

    Ok(prepared.into_iter().flatten().collect())
}

/// Read the three reshaped files, combine them and export the workbook.
pub fn merge(config: &PipelineConfig, log: &mut Diagnostics) -> MergeResult<MergeOutcome> {
    let mut inputs = Vec::with_capacity(Source::ALL.len());
    let mut per_source = Vec::with_capacity(Source::ALL.len());

    for source in Source::ALL {
        let path = config.reshaped_path(source);
        if !path.is_file() {
            return Err(MergeError::MissingInput(path));
        }

        let parsed = read_table_lenient(&path).map_err(|error| MergeError::Read {
            dataset: source,
            error,
        })?;
        let mut table = parsed.table;

        log.info(format!("📋 {}: {} rows ({})", source, table.len(), parsed.encoding));
        log.info_indent(format!("Columns: {}", table.headers.join(", ")), 1);

        let added = backfill(source, &mut table);
        if !added.is_empty() {
            log.warning(format!("{}: backfilled with nulls: {}", source, added.join(", ")));
        }

        per_source.push((source, table.len()));
        inputs.push((source, table));
    }

    let records = combine(inputs)?;
    log.success(format!("Combined {} rows", records.len()));

    let output = config.combined_path();
    fs::create_dir_all(&config.combined_dir).map_err(|e| MergeError::Export(e.into()))?;
    export_workbook(&records, &output)?;
    log.success(format!("Combined data saved to {}", output.display()));

    Ok(MergeOutcome {
        rows: records.len(),
        per_source,
        output,
    })
}
