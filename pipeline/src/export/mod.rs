//! Combined workbook export.

use rust_xlsxwriter::{Format, Workbook};
use std::path::Path;

use crate::config::COMBINED_SHEET_NAME;
use crate::error::ExportError;
use crate::models::{CombinedRecord, COMBINED_COLUMNS};

/// Rows per worksheet, header included.
const MAX_SHEET_ROWS: usize = 1_048_576;

/// Write `records` to a single-sheet workbook at `path`: bold header row, one
/// row per record, no index column. Null cells are left blank.
pub fn export_workbook(records: &[CombinedRecord], path: &Path) -> Result<(), ExportError> {
    if records.len() >= MAX_SHEET_ROWS {
        return Err(ExportError::TooManyRows(records.len()));
    }

    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(COMBINED_SHEET_NAME)?;

    for (col, name) in COMBINED_COLUMNS.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *name, &header)?;
    }

    for (i, record) in records.iter().enumerate() {
        let row = (i + 1) as u32;
        for (col, cell) in record.cells().into_iter().enumerate() {
            if let Some(value) = cell {
                worksheet.write_string(row, col as u16, value)?;
            }
        }
    }

    workbook.save(path)?;
    Ok(())
}
