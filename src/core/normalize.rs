//! Convert slip exports into typed [`Record`]s.
//!
//! Empty cells become absent fields. Amount columns must hold integers and
//! flag columns (退職, 乙欄) must read `Yes`; anything else aborts the read.

use super::record::{Field, Record};
use serde_json::Value;
use std::collections::HashSet;
use std::io::{Read, Write};

/// The only accepted value for a set flag column.
pub const FLAG_SENTINEL: &str = "Yes";

#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    #[error("invalid {column} value {value:?} at line {line}")]
    InvalidAmount {
        column: String,
        line: u64,
        value: String,
    },
    #[error("invalid {column} value {value:?} at line {line} (expected \"Yes\" or empty)")]
    InvalidFlag {
        column: String,
        line: u64,
        value: String,
    },
    #[error("column {0} appears more than once")]
    DuplicateColumn(String),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

enum Column {
    Field(Field),
    Text(String),
}

/// Read records from CSV with a header row.
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<Record>, FormatError> {
    let mut rdr = csv::Reader::from_reader(reader);
    let columns = map_headers(rdr.headers()?)?;

    let mut records = Vec::new();
    for row in rdr.records() {
        let row = row?;
        let line = row.position().map_or(0, |p| p.line());
        let mut record = Record::default();

        for (column, cell) in columns.iter().zip(row.iter()) {
            let value = cell.trim();
            if value.is_empty() {
                continue;
            }
            match column {
                Column::Field(field) if field.is_flag() => {
                    if value != FLAG_SENTINEL {
                        return Err(FormatError::InvalidFlag {
                            column: field.column().to_string(),
                            line,
                            value: value.to_string(),
                        });
                    }
                    record.set_flag(*field);
                }
                Column::Field(field) => {
                    let amount = parse_amount(value).ok_or_else(|| FormatError::InvalidAmount {
                        column: field.column().to_string(),
                        line,
                        value: value.to_string(),
                    })?;
                    record.set_amount(*field, amount);
                }
                Column::Text(name) => {
                    record
                        .extra
                        .insert(name.clone(), Value::String(value.to_string()));
                }
            }
        }
        records.push(record);
    }

    log::info!("Read {} csv records", records.len());
    Ok(records)
}

fn map_headers(headers: &csv::StringRecord) -> Result<Vec<Column>, FormatError> {
    let mut seen = HashSet::new();
    let mut columns = Vec::with_capacity(headers.len());
    for (i, header) in headers.iter().enumerate() {
        let header = if i == 0 {
            header.trim_start_matches('\u{feff}')
        } else {
            header
        }
        .trim();
        if !seen.insert(Field::from_header(header).map_or(header, |f| f.key())) {
            return Err(FormatError::DuplicateColumn(header.to_string()));
        }
        columns.push(match Field::from_header(header) {
            Some(field) => Column::Field(field),
            None => Column::Text(header.to_string()),
        });
    }
    log::debug!("Mapped {} csv columns", columns.len());
    Ok(columns)
}

/// Whole yen, optionally signed. Fractions and separators are rejected.
fn parse_amount(value: &str) -> Option<i64> {
    let digits = value.strip_prefix(|c: char| c == '-' || c == '+').unwrap_or(value);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    value.parse().ok()
}

/// Read normalized records (a JSON array).
pub fn read_json<R: Read>(reader: R) -> Result<Vec<Record>, FormatError> {
    let records: Vec<Record> = serde_json::from_reader(reader)?;
    log::info!("Read {} json records", records.len());
    Ok(records)
}

/// Write records as a pretty-printed JSON array, omitting absent fields.
pub fn write_json<W: Write>(records: &[Record], mut writer: W) -> Result<(), FormatError> {
    serde_json::to_writer_pretty(&mut writer, records)?;
    writeln!(writer).map_err(serde_json::Error::io)?;
    Ok(())
}
