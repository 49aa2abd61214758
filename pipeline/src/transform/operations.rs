//! Column and value operations shared by the reshape and merge stages.

use crate::models::{Table, KEY_COLUMNS};

/// Text written in place of a null label value in `Data 1` / `Data 2`.
pub const NULL_LITERAL: &str = "<NA>";

/// Strip surrounding whitespace from every header.
pub fn normalize_headers(table: &mut Table) {
    for header in &mut table.headers {
        let trimmed = header.trim();
        if trimmed.len() != header.len() {
            *header = trimmed.to_string();
        }
    }
}

/// Remove leading `'0'` characters. `"007A"` becomes `"7A"`, `"000"` becomes `""`.
pub fn strip_leading_zeros(value: &str) -> &str {
    value.trim_start_matches('0')
}

/// Whether a value reads as a number (integer, decimal or exponent form).
pub fn is_numeric(value: &str) -> bool {
    value.trim().parse::<f64>().is_ok()
}

/// A column is text when at least one non-null value is not numeric.
/// All-null columns count as numeric.
pub fn is_text_column(table: &Table, column: usize) -> bool {
    table
        .rows
        .iter()
        .filter_map(|row| row.get(column).and_then(|v| v.as_deref()))
        .any(|v| !is_numeric(v))
}

/// Strip leading zeros from every value of every text column. Numeric
/// columns are left untouched. Returns the number of columns treated as text.
pub fn strip_text_columns(table: &mut Table) -> usize {
    let text_columns: Vec<usize> = (0..table.headers.len())
        .filter(|&c| is_text_column(table, c))
        .collect();

    for row in &mut table.rows {
        for &c in &text_columns {
            if let Some(Some(value)) = row.get_mut(c) {
                let stripped = strip_leading_zeros(value);
                if stripped.len() != value.len() {
                    *value = stripped.to_string();
                }
            }
        }
    }

    text_columns.len()
}

/// Rename headers matching an alias. Returns the `(from, to)` pairs applied.
pub fn rename_columns(table: &mut Table, renames: &[(&str, &str)]) -> Vec<(String, String)> {
    let mut applied = Vec::new();
    for header in &mut table.headers {
        if let Some((from, to)) = renames.iter().find(|(from, _)| header.as_str() == *from) {
            applied.push((from.to_string(), to.to_string()));
            *header = to.to_string();
        }
    }
    applied
}

/// Column order with the present key columns first, in key order, followed by
/// every other column in its original order.
pub fn key_first_order(headers: &[String]) -> Vec<usize> {
    let mut order: Vec<usize> = KEY_COLUMNS
        .iter()
        .filter_map(|key| headers.iter().position(|h| h == key))
        .collect();
    let rest: Vec<usize> = (0..headers.len()).filter(|i| !order.contains(i)).collect();
    order.extend(rest);
    order
}

/// Numeric coercion used by the summary columns.
///
/// The trimmed value must parse as a finite number; the result is truncated
/// toward zero. Empty, textual, `nan` and `inf` values yield `None`.
pub fn coerce_integer(value: Option<&str>) -> Option<i64> {
    let parsed = value?.trim().parse::<f64>().ok()?;
    parsed.is_finite().then(|| parsed.trunc() as i64)
}

/// Build a `Data 1` / `Data 2` value.
///
/// Coercible key values are joined with single spaces, then a space and the
/// label value are appended. A null label renders as [`NULL_LITERAL`].
pub fn synthesize_summary<'a>(
    keys: impl IntoIterator<Item = Option<&'a str>>,
    label: Option<&str>,
) -> String {
    let prefix = keys
        .into_iter()
        .filter_map(coerce_integer)
        .map(|n| n.to_string())
        .collect::<Vec<_>>()
        .join(" ");

    format!("{} {}", prefix, label.unwrap_or(NULL_LITERAL))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(headers: &[&str], rows: &[&[Option<&str>]]) -> Table {
        Table {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: rows
                .iter()
                .map(|r| r.iter().map(|c| c.map(String::from)).collect())
                .collect(),
        }
    }

    #[test]
    fn test_strip_leading_zeros() {
        assert_eq!(strip_leading_zeros("007A"), "7A");
        assert_eq!(strip_leading_zeros("000123"), "123");
        assert_eq!(strip_leading_zeros("000"), "");
        assert_eq!(strip_leading_zeros("A00"), "A00");
    }

    #[test]
    fn test_strip_leading_zeros_is_idempotent() {
        for value in ["000123", "007A", "0", "", "10", "0x0"] {
            let once = strip_leading_zeros(value);
            assert_eq!(strip_leading_zeros(once), once);
        }
    }

    #[test]
    fn test_only_text_columns_are_stripped() {
        let mut t = table(
            &["ZIP", "CERT", "EMPTY"],
            &[
                &[Some("02134"), Some("007"), None],
                &[Some("MA01"), Some("12"), None],
            ],
        );
        let text = strip_text_columns(&mut t);

        assert_eq!(text, 1);
        assert_eq!(t.cell(0, 0), Some("2134"));
        assert_eq!(t.cell(1, 0), Some("MA01"));
        // numeric column keeps its zeros
        assert_eq!(t.cell(0, 1), Some("007"));
        assert_eq!(t.cell(0, 2), None);
    }

    #[test]
    fn test_normalize_headers() {
        let mut t = table(&["Bank Name\u{a0}", " City ", "Cert"], &[]);
        normalize_headers(&mut t);
        assert_eq!(t.headers, vec!["Bank Name", "City", "Cert"]);
    }

    #[test]
    fn test_rename_columns() {
        let mut t = table(&["STALP", "ESTYMD", "NAME"], &[]);
        let renames = [("STALP", "STATE"), ("ESTYMD", "DATE"), ("Closing Date", "DATE")];
        let applied = rename_columns(&mut t, &renames);

        assert_eq!(t.headers, vec!["STATE", "DATE", "NAME"]);
        assert_eq!(applied.len(), 2);
    }

    #[test]
    fn test_key_first_order() {
        let headers: Vec<String> = ["Cert", "STATE", "NAME", "Fund", "Indicator", "CITY", "DATE"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let order = key_first_order(&headers);
        let ordered: Vec<&str> = order.iter().map(|&i| headers[i].as_str()).collect();
        assert_eq!(ordered, vec!["Indicator", "NAME", "CITY", "STATE", "DATE", "Cert", "Fund"]);
    }

    #[test]
    fn test_key_first_order_skips_absent_keys() {
        let headers: Vec<String> =
            ["X", "NAME", "Indicator"].iter().map(|s| s.to_string()).collect();
        let order = key_first_order(&headers);
        assert_eq!(order, vec![2, 1, 0]);
    }

    #[test]
    fn test_coerce_integer() {
        assert_eq!(coerce_integer(Some("20200101")), Some(20200101));
        assert_eq!(coerce_integer(Some(" 42 ")), Some(42));
        assert_eq!(coerce_integer(Some("12.7")), Some(12));
        assert_eq!(coerce_integer(Some("-3.9")), Some(-3));
        assert_eq!(coerce_integer(Some("1e3")), Some(1000));
        assert_eq!(coerce_integer(Some("2020-01-01")), None);
        assert_eq!(coerce_integer(Some("IL")), None);
        assert_eq!(coerce_integer(Some("")), None);
        assert_eq!(coerce_integer(Some("nan")), None);
        assert_eq!(coerce_integer(Some("inf")), None);
        assert_eq!(coerce_integer(None), None);
    }

    #[test]
    fn test_summary_all_text_keys() {
        let keys = [
            Some("Failed Bank"),
            Some("ABC Bank"),
            Some("Springfield"),
            Some("IL"),
            Some("2020-01-01"),
        ];
        assert_eq!(synthesize_summary(keys, Some("1234")), " 1234");
    }

    #[test]
    fn test_summary_mixed_keys() {
        let keys = [
            Some("Failed Bank"),
            Some("ABC Bank"),
            Some("Springfield"),
            Some("IL"),
            Some("20200101"),
        ];
        assert_eq!(synthesize_summary(keys, Some("1234")), "20200101 1234");
    }

    #[test]
    fn test_summary_several_numeric_keys() {
        let keys = [Some("Office Location"), Some("7"), None, Some("12.0"), Some("19991231")];
        assert_eq!(synthesize_summary(keys, Some("31080")), "7 12 19991231 31080");
    }

    #[test]
    fn test_summary_null_label() {
        let keys = [Some("Financial Institution"), None, None, None, None];
        assert_eq!(synthesize_summary(keys, None), " <NA>");
    }
}
