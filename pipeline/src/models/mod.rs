//! Domain models for the bankmerge pipeline.
//!
//! - [`Source`] - The three published datasets and everything that differs between them
//! - [`Table`] - A loosely-typed delimited table as read from disk
//! - [`ColumnReport`] - Which canonical columns a reshape found
//! - [`CombinedRecord`] - One row of the final nine-column sheet

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Column names
// =============================================================================

pub const INDICATOR: &str = "Indicator";
pub const NAME: &str = "NAME";
pub const CITY: &str = "CITY";
pub const STATE: &str = "STATE";
pub const DATE: &str = "DATE";

/// Canonical prefix every reshaped table starts with.
pub const KEY_COLUMNS: [&str; 5] = [INDICATOR, NAME, CITY, STATE, DATE];

/// Header of the combined sheet, in order.
pub const COMBINED_COLUMNS: [&str; 9] = [
    INDICATOR,
    NAME,
    CITY,
    STATE,
    DATE,
    "Information Type",
    "Data 1",
    "Information Type 2",
    "Data 2",
];

// =============================================================================
// Source
// =============================================================================

/// How the bytes of a raw file are turned into text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodingPolicy {
    /// Detect the charset from a leading sample of the file.
    Detect,
    /// Strict UTF-8; invalid bytes are a decode error.
    Utf8,
}

/// One of the three published datasets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    /// FDIC failed bank list.
    FailedBank,
    /// Financial institution office (branch) locations.
    OfficeLocation,
    /// Financial institutions.
    FinancialInstitution,
}

impl Source {
    /// All sources in combined-sheet order.
    pub const ALL: [Source; 3] = [
        Source::FailedBank,
        Source::OfficeLocation,
        Source::FinancialInstitution,
    ];

    /// Constant written to the `Indicator` column.
    pub fn indicator(&self) -> &'static str {
        match self {
            Source::FailedBank => "Failed Bank",
            Source::OfficeLocation => "Office Location",
            Source::FinancialInstitution => "Financial Institution",
        }
    }

    /// File name in the raw download directory.
    pub fn raw_file_name(&self) -> &'static str {
        match self {
            Source::FailedBank => "FDIC_Failed_Bank_List.csv",
            Source::OfficeLocation => "Financial_Institution_Office_Locations.csv",
            Source::FinancialInstitution => "Financial_Institutions.csv",
        }
    }

    /// File name in the reshaped directory.
    pub fn reshaped_file_name(&self) -> &'static str {
        match self {
            Source::FailedBank => "FDIC_Failed_Bank_List_Reshaped.csv",
            Source::OfficeLocation => "Financial_Institution_Office_Locations_Reshaped.csv",
            Source::FinancialInstitution => "Financial_Institutions_Reshaped.csv",
        }
    }

    /// Header aliases mapped onto canonical names.
    pub fn renames(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            Source::FailedBank => &[
                ("State", STATE),
                ("Closing Date", DATE),
                ("Bank Name", NAME),
                ("City", CITY),
            ],
            Source::OfficeLocation | Source::FinancialInstitution => &[
                ("STALP", STATE),
                ("ESTYMD", DATE),
                ("Closing Date", DATE),
            ],
        }
    }

    /// Columns kept from the raw file after renaming, or `None` to keep all.
    pub fn selected_columns(&self) -> Option<&'static [&'static str]> {
        match self {
            Source::FailedBank => None,
            Source::OfficeLocation => Some(&[
                STATE,
                "OFFNAME",
                CITY,
                NAME,
                "FI_UNINUM",
                DATE,
                "CBSA_METRO",
            ]),
            Source::FinancialInstitution => Some(&[
                STATE, "NAMEHCR", CITY, NAME, "UNINUM", DATE, "CERT",
            ]),
        }
    }

    pub fn encoding(&self) -> EncodingPolicy {
        match self {
            Source::FailedBank => EncodingPolicy::Detect,
            Source::OfficeLocation | Source::FinancialInstitution => EncodingPolicy::Utf8,
        }
    }

    /// Whether text columns get their leading zeros stripped.
    pub fn strips_leading_zeros(&self) -> bool {
        !matches!(self, Source::FailedBank)
    }

    /// Columns a reshaped table must expose before merging; absent ones are
    /// backfilled with nulls.
    pub fn required_columns(&self) -> [&'static str; 6] {
        match self {
            Source::FailedBank | Source::FinancialInstitution => {
                [INDICATOR, NAME, CITY, STATE, DATE, "Cert"]
            }
            Source::OfficeLocation => [INDICATOR, NAME, CITY, STATE, DATE, "CBSA_METRO"],
        }
    }

    /// Label columns summarized into `Data 1` and `Data 2`.
    ///
    /// The label doubles as the `Information Type` value.
    pub fn information_types(&self) -> (&'static str, &'static str) {
        match self {
            Source::FailedBank => ("Cert", "Fund"),
            Source::OfficeLocation => ("CBSA_METRO", "FI_UNINUM"),
            Source::FinancialInstitution => ("Cert", "UNINUM"),
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.indicator())
    }
}

// =============================================================================
// Table
// =============================================================================

/// Delimited table with a header row. `None` cells are nulls.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl Table {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    /// Position of a column by exact header name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Append a column filled with `value` for every row.
    pub fn push_column(&mut self, name: impl Into<String>, value: Option<String>) {
        self.headers.push(name.into());
        for row in &mut self.rows {
            row.push(value.clone());
        }
    }

    /// Insert a column at `index` filled with `value` for every row.
    pub fn insert_column(&mut self, index: usize, name: impl Into<String>, value: Option<String>) {
        self.headers.insert(index, name.into());
        for row in &mut self.rows {
            row.insert(index, value.clone());
        }
    }

    /// Keep only the columns at `indices`, in that order.
    pub fn select(&self, indices: &[usize]) -> Table {
        Table {
            headers: indices.iter().map(|&i| self.headers[i].clone()).collect(),
            rows: self
                .rows
                .iter()
                .map(|row| indices.iter().map(|&i| row.get(i).cloned().flatten()).collect())
                .collect(),
        }
    }

    /// Cell value, `None` when null or out of range.
    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.rows.get(row)?.get(column)?.as_deref()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// =============================================================================
// Column Report
// =============================================================================

/// Outcome of looking up the expected columns of a source.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ColumnReport {
    /// Expected columns that were found.
    pub present: Vec<String>,
    /// Expected columns that were absent and left out.
    pub missing: Vec<String>,
}

impl ColumnReport {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

// =============================================================================
// Combined Record
// =============================================================================

/// One row of the combined sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedRecord {
    #[serde(rename = "Indicator")]
    pub indicator: String,
    #[serde(rename = "NAME")]
    pub name: Option<String>,
    #[serde(rename = "CITY")]
    pub city: Option<String>,
    #[serde(rename = "STATE")]
    pub state: Option<String>,
    #[serde(rename = "DATE")]
    pub date: Option<String>,
    #[serde(rename = "Information Type")]
    pub information_type: String,
    #[serde(rename = "Data 1")]
    pub data_1: String,
    #[serde(rename = "Information Type 2")]
    pub information_type_2: String,
    #[serde(rename = "Data 2")]
    pub data_2: String,
}

impl CombinedRecord {
    /// Cells in [`COMBINED_COLUMNS`] order.
    pub fn cells(&self) -> [Option<&str>; 9] {
        [
            Some(self.indicator.as_str()),
            self.name.as_deref(),
            self.city.as_deref(),
            self.state.as_deref(),
            self.date.as_deref(),
            Some(self.information_type.as_str()),
            Some(self.data_1.as_str()),
            Some(self.information_type_2.as_str()),
            Some(self.data_2.as_str()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indicators_are_distinct() {
        let labels: Vec<_> = Source::ALL.iter().map(|s| s.indicator()).collect();
        assert_eq!(labels, vec!["Failed Bank", "Office Location", "Financial Institution"]);
    }

    #[test]
    fn test_required_columns_start_with_keys() {
        for source in Source::ALL {
            assert_eq!(source.required_columns()[..5], KEY_COLUMNS);
        }
    }

    #[test]
    fn test_table_insert_and_select() {
        let mut table = Table::new(vec!["a".into(), "b".into()]);
        table.rows.push(vec![Some("1".into()), None]);
        table.insert_column(0, "tag", Some("x".into()));

        assert_eq!(table.headers, vec!["tag", "a", "b"]);
        assert_eq!(table.cell(0, 0), Some("x"));

        let picked = table.select(&[2, 0]);
        assert_eq!(picked.headers, vec!["b", "tag"]);
        assert_eq!(picked.rows[0], vec![None, Some("x".to_string())]);
    }

    #[test]
    fn test_combined_record_serializes_sheet_headers() {
        let record = CombinedRecord {
            indicator: "Failed Bank".into(),
            name: Some("ABC Bank".into()),
            city: None,
            state: Some("IL".into()),
            date: None,
            information_type: "Cert".into(),
            data_1: " 1234".into(),
            information_type_2: "Fund".into(),
            data_2: " 10538".into(),
        };
        let json = serde_json::to_value(&record).unwrap();
        let keys: Vec<_> = json.as_object().unwrap().keys().cloned().collect();
        for column in COMBINED_COLUMNS {
            assert!(keys.iter().any(|k| k == column), "missing {column}");
        }
        assert_eq!(record.cells().len(), COMBINED_COLUMNS.len());
    }
}
