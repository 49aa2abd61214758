//! Reshape stage: normalize each raw dataset into the common column layout.
//!
//! ```text
//! raw CSV ─▶ trim headers ─▶ strip zeros ─▶ rename ─▶ select ─▶ tag ─▶ reorder ─▶ reshaped CSV
//! ```
//!
//! Every reshaped table starts with `Indicator, NAME, CITY, STATE, DATE` (the
//! ones that exist) followed by the remaining columns in original order.

use serde::Serialize;
use std::fs;
use std::path::PathBuf;

use super::operations::{key_first_order, normalize_headers, rename_columns, strip_text_columns};
use crate::config::PipelineConfig;
use crate::error::{ReshapeError, ReshapeResult};
use crate::logs::Diagnostics;
use crate::models::{ColumnReport, Source, Table, INDICATOR, KEY_COLUMNS};
use crate::parser::{parse_file, write_table};

/// Result of reshaping one source.
#[derive(Debug, Clone, Serialize)]
pub struct ReshapeOutcome {
    pub source: Source,
    /// Encoding the raw file was decoded with
    pub encoding: String,
    pub rows: usize,
    /// Header of the written file
    pub columns: Vec<String>,
    pub report: ColumnReport,
    pub output: PathBuf,
}

/// Reshape an in-memory raw table for `source`.
///
/// Expected columns that are absent after renaming are left out and listed in
/// the returned [`ColumnReport`].
pub fn reshape_table(source: Source, mut table: Table) -> (Table, ColumnReport) {
    normalize_headers(&mut table);

    if source.strips_leading_zeros() {
        strip_text_columns(&mut table);
    }

    rename_columns(&mut table, source.renames());

    let expected: Vec<&str> = match source.selected_columns() {
        Some(columns) => columns.to_vec(),
        None => KEY_COLUMNS[1..].to_vec(),
    };

    let mut report = ColumnReport::default();
    for column in &expected {
        if table.has_column(column) {
            report.present.push(column.to_string());
        } else {
            report.missing.push(column.to_string());
        }
    }

    if source.selected_columns().is_some() {
        let indices: Vec<usize> = report
            .present
            .iter()
            .filter_map(|c| table.column_index(c))
            .collect();
        table = table.select(&indices);
    }

    table.insert_column(0, INDICATOR, Some(source.indicator().to_string()));

    let order = key_first_order(&table.headers);
    (table.select(&order), report)
}

/// Read, reshape and write one source.
pub fn reshape_source(
    config: &PipelineConfig,
    source: Source,
    log: &mut Diagnostics,
) -> ReshapeResult<ReshapeOutcome> {
    let input = config.raw_path(source);
    if !input.is_file() {
        return Err(ReshapeError::MissingInput(input));
    }

    log.info(format!("📖 Reading {}: {}", source, input.display()));
    let parsed = parse_file(&input, source.encoding(), config.encoding_sample_bytes)?;
    log.info_indent(format!("Encoding: {}", parsed.encoding), 1);
    log.info_indent(format!("Columns: {}", parsed.table.headers.join(", ")), 1);
    log.info_indent(format!("Rows: {}", parsed.table.len()), 1);

    let (table, report) = reshape_table(source, parsed.table);
    if !report.is_complete() {
        log.warning(format!(
            "{}: expected columns not found: {}",
            source,
            report.missing.join(", ")
        ));
    }

    let output = config.reshaped_path(source);
    fs::create_dir_all(&config.reshaped_dir).map_err(|e| ReshapeError::Write {
        path: config.reshaped_dir.clone(),
        message: e.to_string(),
    })?;
    write_table(&output, &table).map_err(|e| ReshapeError::Write {
        path: output.clone(),
        message: e.to_string(),
    })?;
    log.success(format!("Reshaped {} saved to {}", source, output.display()));

    Ok(ReshapeOutcome {
        source,
        encoding: parsed.encoding,
        rows: table.len(),
        columns: table.headers,
        report,
        output,
    })
}

/// Reshape every source. A failure is logged and does not stop the others.
pub fn reshape_all(
    config: &PipelineConfig,
    log: &mut Diagnostics,
) -> Vec<(Source, ReshapeResult<ReshapeOutcome>)> {
    Source::ALL
        .into_iter()
        .map(|source| {
            let result = reshape_source(config, source, log);
            if let Err(ref e) = result {
                log.error(format!("Error reshaping {}: {}", source, e));
            }
            (source, result)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const BANKLIST: &str = "Bank Name\u{a0},City\u{a0},State\u{a0},Cert\u{a0},Acquiring Institution\u{a0},Closing Date\u{a0},Fund\n\
        Pulaski Savings Bank,Chicago,IL,28611,Millennium Bank,17-Jan-25,10548\n\
        The First National Bank of Lindsay,Lindsay,OK,4134,\"First Bank & Trust Co., Duncan, OK\",18-Oct-24,10547\n";

    const LOCATIONS: &str = "STALP,OFFNAME,CITY,NAME,FI_UNINUM,ESTYMD,CBSA_METRO,ZIP\n\
        MA,Main Office,Boston,Bank A,0012,01/05/1990,14460,02134\n\
        TX,Branch 007,Austin,Bank B,0034,03/07/2001,12420,78701\n";

    fn raw_table(content: &str) -> Table {
        crate::parser::parse_table(content, ',').unwrap()
    }

    #[test]
    fn test_failed_bank_layout() {
        let (table, report) = reshape_table(Source::FailedBank, raw_table(BANKLIST));

        assert_eq!(
            table.headers,
            vec![
                "Indicator",
                "NAME",
                "CITY",
                "STATE",
                "DATE",
                "Cert",
                "Acquiring Institution",
                "Fund"
            ]
        );
        assert!(report.is_complete());
        assert_eq!(table.len(), 2);
        assert_eq!(table.cell(0, 0), Some("Failed Bank"));
        assert_eq!(table.cell(1, 1), Some("The First National Bank of Lindsay"));
        assert_eq!(table.cell(1, 6), Some("First Bank & Trust Co., Duncan, OK"));
    }

    #[test]
    fn test_locations_select_and_strip() {
        let (table, report) = reshape_table(Source::OfficeLocation, raw_table(LOCATIONS));

        assert_eq!(
            table.headers,
            vec![
                "Indicator",
                "NAME",
                "CITY",
                "STATE",
                "DATE",
                "OFFNAME",
                "FI_UNINUM",
                "CBSA_METRO"
            ]
        );
        assert!(report.is_complete());
        // text column: leading zeros stripped
        assert_eq!(table.cell(0, 4), Some("1/05/1990"));
        assert_eq!(table.cell(1, 5), Some("Branch 007"));
        // numeric column: written as read
        assert_eq!(table.cell(0, 6), Some("0012"));
    }

    #[test]
    fn test_missing_columns_are_reported() {
        let raw = raw_table("STALP,CITY,NAME,UNINUM,ESTYMD\nNY,Albany,Bank C,77,20010101\n");
        let (table, report) = reshape_table(Source::FinancialInstitution, raw);

        assert_eq!(table.headers, vec!["Indicator", "NAME", "CITY", "STATE", "DATE", "UNINUM"]);
        assert_eq!(report.missing, vec!["NAMEHCR", "CERT"]);
        assert!(!report.is_complete());
    }

    #[test]
    fn test_first_five_columns_for_every_source() {
        let raw = "Bank Name,City,State,Closing Date,STALP,ESTYMD,NAME,CITY,\
            OFFNAME,FI_UNINUM,CBSA_METRO,NAMEHCR,UNINUM,CERT\n";
        for source in Source::ALL {
            let mut table = raw_table(raw);
            if source != Source::FailedBank {
                // failed bank aliases would rename into a second DATE column
                table.headers.retain(|h| {
                    !matches!(h.as_str(), "Bank Name" | "City" | "State" | "Closing Date")
                });
            }
            let (reshaped, _) = reshape_table(source, table);
            assert_eq!(reshaped.headers[..5], KEY_COLUMNS, "{source}");
        }
    }

    #[test]
    fn test_one_missing_source_does_not_stop_others() {
        let dir = tempdir().unwrap();
        let config = PipelineConfig::from_base(dir.path());
        config.ensure_dirs().unwrap();
        fs::write(config.raw_path(Source::FailedBank), BANKLIST).unwrap();
        fs::write(config.raw_path(Source::OfficeLocation), LOCATIONS).unwrap();

        let mut log = Diagnostics::quiet();
        let results = reshape_all(&config, &mut log);

        assert_eq!(results.len(), 3);
        assert!(results[0].1.is_ok());
        assert!(results[1].1.is_ok());
        assert!(matches!(results[2].1, Err(ReshapeError::MissingInput(_))));
        assert!(config.reshaped_path(Source::FailedBank).is_file());
        assert!(config.reshaped_path(Source::OfficeLocation).is_file());
        assert!(!config.reshaped_path(Source::FinancialInstitution).exists());
        assert_eq!(log.count(crate::logs::LogLevel::Error), 1);
    }

    #[test]
    fn test_unwritable_output_does_not_stop_others() {
        let dir = tempdir().unwrap();
        let config = PipelineConfig::from_base(dir.path());
        config.ensure_dirs().unwrap();
        fs::write(config.raw_path(Source::FailedBank), BANKLIST).unwrap();
        fs::write(config.raw_path(Source::OfficeLocation), LOCATIONS).unwrap();
        fs::write(
            config.raw_path(Source::FinancialInstitution),
            "STALP,NAMEHCR,CITY,NAME,UNINUM,ESTYMD,CERT\n\
             NY,Holding Co,Albany,Bank C,77,20010101,9001\n",
        )
        .unwrap();
        // a directory where the reshaped file should go
        fs::create_dir_all(config.reshaped_path(Source::OfficeLocation)).unwrap();

        let mut log = Diagnostics::quiet();
        let results = reshape_all(&config, &mut log);

        assert!(results[0].1.is_ok());
        assert!(matches!(results[1].1, Err(ReshapeError::Write { .. })));
        assert!(results[2].1.is_ok());
        assert!(config.reshaped_path(Source::FailedBank).is_file());
        assert!(config.reshaped_path(Source::FinancialInstitution).is_file());
        assert_eq!(log.count(crate::logs::LogLevel::Error), 1);
    }

    #[test]
    fn test_invalid_utf8_is_a_decode_error() {
        let dir = tempdir().unwrap();
        let config = PipelineConfig::from_base(dir.path());
        config.ensure_dirs().unwrap();
        fs::write(
            config.raw_path(Source::FinancialInstitution),
            b"STALP,NAME\nQC,Soci\xe9t\xe9\n",
        )
        .unwrap();

        let mut log = Diagnostics::quiet();
        let err = reshape_source(&config, Source::FinancialInstitution, &mut log).unwrap_err();
        assert!(matches!(
            err,
            ReshapeError::Read(crate::error::CsvError::Decode { .. })
        ));
    }

    #[test]
    fn test_failed_bank_windows_1252_is_detected() {
        let dir = tempdir().unwrap();
        let config = PipelineConfig::from_base(dir.path());
        config.ensure_dirs().unwrap();
        let mut bytes = b"Bank Name,City,State,Cert,Closing Date,Fund\n".to_vec();
        for _ in 0..20 {
            bytes.extend_from_slice(
                b"Banco Popular de Puerto Rico \x96 Espa\xf1a,San Juan,PR,1234,01-Jan-20,10001\n",
            );
        }
        fs::write(config.raw_path(Source::FailedBank), &bytes).unwrap();

        let mut log = Diagnostics::quiet();
        let outcome = reshape_source(&config, Source::FailedBank, &mut log).unwrap();
        assert_eq!(outcome.rows, 20);
        assert_ne!(outcome.encoding, "utf-8");

        let written = fs::read_to_string(&outcome.output).unwrap();
        assert!(written.starts_with("Indicator,NAME,CITY,STATE,DATE,Cert,Fund"));
    }
}
