//! Records command - per-record view of recorded and recomputed amounts
//!
//! Unlike `validate`, every record is compared for every check.

use crate::cmd::{read_records, ConfigArgs};
use crate::utils::{format_yen, write_csv};
use clap::Args;
use gensen::core::{compare, Check, Record, Unmet, UnsupportedError, ValidationConfig};
use std::io;
use std::path::PathBuf;
use tabled::{settings::Style, Table, Tabled};

#[derive(Args, Debug)]
pub struct RecordsCommand {
    /// CSV or JSON file containing slip records ("-" for stdin)
    #[arg(short, long)]
    records: PathBuf,

    /// Only show rows that do not match
    #[arg(long)]
    failures_only: bool,

    /// Output as CSV instead of formatted table
    #[arg(long)]
    csv: bool,

    #[command(flatten)]
    config: ConfigArgs,
}

/// Row for the records table output
#[derive(Debug, Clone, PartialEq, Eq, Tabled, serde::Serialize)]
pub struct RecordRow {
    #[tabled(rename = "#")]
    #[serde(rename = "record")]
    pub index: usize,

    #[tabled(rename = "Check")]
    pub check: String,

    #[tabled(rename = "Column")]
    pub column: String,

    #[tabled(rename = "Recorded")]
    pub recorded: String,

    #[tabled(rename = "Expected")]
    pub expected: String,

    #[tabled(rename = "Status")]
    pub status: String,

    #[serde(skip)]
    #[tabled(skip)]
    pub ok: bool,
}

impl RecordsCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let records = read_records(&self.records)?;
        let rows: Vec<RecordRow> = build_rows(&records, &self.config.config())
            .into_iter()
            .filter(|row| !self.failures_only || !row.ok)
            .collect();

        if self.csv {
            write_csv(&rows, io::stdout())
        } else {
            print_table(&rows);
            Ok(())
        }
    }
}

fn print_table(rows: &[RecordRow]) {
    if rows.is_empty() {
        println!("No rows to show");
        return;
    }
    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{}", table);
}

/// One row per applicable (record, check) pair; skipped checks are left out.
fn build_rows(records: &[Record], config: &ValidationConfig) -> Vec<RecordRow> {
    let mut rows = Vec::new();
    for (position, record) in records.iter().enumerate() {
        for check in Check::ALL {
            let field = check.field();
            let recorded = record.amount(field).map(format_yen).unwrap_or_default();
            let (expected, status, ok) = match compare(check, record, config) {
                Ok(None) => continue,
                Ok(Some(comparison)) if comparison.matches() => {
                    (format_yen(comparison.expected), "ok".to_string(), true)
                }
                Ok(Some(comparison)) => (
                    format_yen(comparison.expected),
                    format!(
                        "MISMATCH ({})",
                        format_yen(comparison.actual.saturating_sub(comparison.expected))
                    ),
                    false,
                ),
                Err(Unmet::Missing(missing)) => {
                    (String::new(), format!("missing {}", missing.column()), false)
                }
                Err(Unmet::Unsupported(reason)) => {
                    (String::new(), unsupported_status(&reason), false)
                }
            };
            rows.push(RecordRow {
                index: position + 1,
                check: check.display().to_string(),
                column: field.column().to_string(),
                recorded,
                expected,
                status,
                ok,
            });
        }
    }
    rows
}

fn unsupported_status(reason: &UnsupportedError) -> String {
    match reason {
        UnsupportedError::ColumnBBand { .. } => "not implemented (column B band)".to_string(),
        UnsupportedError::IncomeAboveCeiling { ceiling, .. } => {
            format!("not implemented (payment above {})", format_yen(*ceiling))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> Record {
        Record {
            payment_amount: Some(3_000_000),
            income_after_deduction_amount: Some(2_020_000),
            social_insurance_amount: Some(450_000),
            total_deduction_amount: Some(930_000),
            withholding_tax_amount: Some(55_100),
            ..Default::default()
        }
    }

    #[test]
    fn rows_cover_every_applicable_check() {
        let rows = build_rows(&[record()], &ValidationConfig::default());
        // no life insurance deduction recorded
        assert_eq!(rows.len(), 3);
        assert!(rows[0].ok);
        assert!(rows[1].ok);
        assert_eq!(rows[2].column, "源泉徴収税額");
        assert_eq!(rows[2].recorded, "55,100");
        assert_eq!(rows[2].expected, "55,000");
        assert_eq!(rows[2].status, "MISMATCH (100)");
        assert!(!rows[2].ok);
    }

    #[test]
    fn rows_continue_past_failures() {
        let records = vec![
            record(),
            Record {
                life_insurance_deduction_amount: Some(10_000),
                ..Default::default()
            },
            Record {
                payment_amount: Some(500_000),
                withholding_tax_amount: Some(15_000),
                is_column_b: true,
                ..Default::default()
            },
        ];
        let rows = build_rows(&records, &ValidationConfig::default());
        let statuses: Vec<_> = rows.iter().map(|r| (r.index, r.status.as_str())).collect();
        assert_eq!(
            statuses,
            vec![
                (1, "ok"),
                (1, "ok"),
                (1, "MISMATCH (100)"),
                (2, "missing 新生命保険料の金額"),
                (3, "not implemented (column B band)"),
            ]
        );
    }
}
