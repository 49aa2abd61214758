//! Delimited-text reading and writing with encoding and delimiter auto-detection.
//!
//! Turns raw bytes into a [`Table`] and back. No source-specific logic here.

use std::fs;
use std::path::Path;

use crate::error::{CsvError, CsvResult};
use crate::models::{EncodingPolicy, Table};

/// Result of parsing with metadata
#[derive(Debug, Clone)]
pub struct ParseResult {
    pub table: Table,
    /// Detected or used encoding
    pub encoding: String,
    /// Detected or used delimiter
    pub delimiter: char,
}

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    // Normalize charset names
    match charset.to_lowercase().as_str() {
        "" | "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        other => other.to_string(),
    }
}

/// Decode bytes to a string using the specified encoding.
///
/// UTF-8 is strict: invalid sequences are a [`CsvError::Decode`]. Other
/// labels go through `encoding_rs`; unknown labels fall back to lossy UTF-8.
pub fn decode_content(bytes: &[u8], encoding: &str) -> CsvResult<String> {
    match encoding.to_lowercase().as_str() {
        "utf-8" | "utf8" | "ascii" => {
            let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
            std::str::from_utf8(bytes)
                .map(str::to_string)
                .map_err(|e| CsvError::Decode {
                    encoding: "utf-8".to_string(),
                    message: e.to_string(),
                })
        }
        label => match encoding_rs::Encoding::for_label(label.as_bytes()) {
            Some(enc) => Ok(enc.decode(bytes).0.into_owned()),
            None => Ok(String::from_utf8_lossy(bytes).into_owned()),
        },
    }
}

/// Decode as UTF-8, falling back to ISO-8859-1 when the bytes are not valid UTF-8.
pub fn decode_lenient(bytes: &[u8]) -> (String, &'static str) {
    match decode_content(bytes, "utf-8") {
        Ok(text) => (text, "utf-8"),
        Err(_) => (encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned(), "iso-8859-1"),
    }
}

/// Detect the delimiter by counting occurrences in the first line
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [',', ';', '\t', '|'];
    let mut best_sep = ',';
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Parse delimited text into a [`Table`].
///
/// Empty fields become nulls. Short rows are padded with nulls and fields
/// beyond the header are ignored.
pub fn parse_table(content: &str, delimiter: char) -> CsvResult<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter as u8)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(String::from).collect();
    if headers.is_empty() || headers.iter().all(|h| h.trim().is_empty()) {
        return Err(CsvError::EmptyFile);
    }

    let mut table = Table::new(headers);
    for record in reader.records() {
        let record = record?;
        let row = (0..table.headers.len())
            .map(|i| record.get(i).filter(|v| !v.is_empty()).map(String::from))
            .collect();
        table.rows.push(row);
    }

    Ok(table)
}

/// Parse raw bytes under the given encoding policy.
///
/// With [`EncodingPolicy::Detect`] the first `sample_bytes` are fed to the
/// detector. A UTF-8 guess that fails on the full buffer triggers detection
/// over all of it.
pub fn parse_bytes(
    bytes: &[u8],
    policy: EncodingPolicy,
    sample_bytes: usize,
) -> CsvResult<ParseResult> {
    if bytes.is_empty() {
        return Err(CsvError::EmptyFile);
    }

    let (content, encoding) = match policy {
        EncodingPolicy::Detect => decode_detected(bytes, sample_bytes)?,
        EncodingPolicy::Utf8 => (decode_content(bytes, "utf-8")?, "utf-8".to_string()),
    };

    let delimiter = detect_delimiter(&content);
    let table = parse_table(&content, delimiter)?;

    Ok(ParseResult {
        table,
        encoding,
        delimiter,
    })
}

fn decode_detected(bytes: &[u8], sample_bytes: usize) -> CsvResult<(String, String)> {
    let sampled = bytes.len() > sample_bytes;
    let encoding = detect_encoding(&bytes[..bytes.len().min(sample_bytes)]);

    match decode_content(bytes, &encoding) {
        Ok(content) => Ok((content, encoding)),
        // sample was plain ASCII, non-UTF-8 bytes come later
        Err(CsvError::Decode { .. }) if sampled && encoding == "utf-8" => {
            let encoding = detect_encoding(bytes);
            match decode_content(bytes, &encoding) {
                Ok(content) => Ok((content, encoding)),
                Err(_) => {
                    let (content, used) = decode_lenient(bytes);
                    Ok((content, used.to_string()))
                }
            }
        }
        Err(e) => Err(e),
    }
}

/// Read and parse a file under the given encoding policy.
pub fn parse_file(
    path: &Path,
    policy: EncodingPolicy,
    sample_bytes: usize,
) -> CsvResult<ParseResult> {
    let bytes = fs::read(path)?;
    parse_bytes(&bytes, policy, sample_bytes)
}

/// Read a comma-delimited file written by this pipeline.
pub fn read_table_lenient(path: &Path) -> CsvResult<ParseResult> {
    let bytes = fs::read(path)?;
    if bytes.is_empty() {
        return Err(CsvError::EmptyFile);
    }
    let (content, encoding) = decode_lenient(&bytes);
    let table = parse_table(&content, ',')?;

    Ok(ParseResult {
        table,
        encoding: encoding.to_string(),
        delimiter: ',',
    })
}

/// Write a table as comma-delimited UTF-8 with a header row. Nulls become
/// empty fields.
pub fn write_table(path: &Path, table: &Table) -> CsvResult<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(&table.headers)?;
    for row in &table.rows {
        writer.write_record(row.iter().map(|cell| cell.as_deref().unwrap_or("")))?;
    }
    writer.flush()?;
    Ok(())
}
