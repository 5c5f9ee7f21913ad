pub mod calc;
pub mod normalize;
pub mod records;
pub mod schema;
pub mod validate;

use clap::Args;
use gensen::core::{read_csv, read_json, Record, ValidationConfig};
use rust_decimal::Decimal;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

/// Overrides for the reconciliation parameters
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// Surtax multiplier on the standard schedule [default: 1.0102]
    #[arg(long)]
    surtax_rate: Option<Decimal>,

    /// Basic deduction in yen [default: 480000]
    #[arg(long)]
    basic_deduction: Option<i64>,

    /// Highest supported payment for the total-deduction check [default: 24000000]
    #[arg(long)]
    income_ceiling: Option<i64>,
}

impl ConfigArgs {
    pub fn config(&self) -> ValidationConfig {
        let defaults = ValidationConfig::default();
        ValidationConfig {
            basic_deduction: self.basic_deduction.unwrap_or(defaults.basic_deduction),
            income_ceiling: self.income_ceiling.unwrap_or(defaults.income_ceiling),
            surtax_rate: self.surtax_rate.unwrap_or(defaults.surtax_rate),
        }
    }
}

/// Read records from a CSV or JSON file (or stdin with "-")
pub fn read_records(path: &Path) -> anyhow::Result<Vec<Record>> {
    if path.as_os_str() == "-" {
        read_from_stdin()
    } else {
        read_from_file(path)
    }
}

fn read_from_file(path: &Path) -> anyhow::Result<Vec<Record>> {
    let reader = BufReader::new(File::open(path)?);
    let is_csv = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
    let records = if is_csv {
        read_csv(reader)?
    } else {
        read_json(reader)?
    };
    Ok(records)
}

fn read_from_stdin() -> anyhow::Result<Vec<Record>> {
    let stdin = io::stdin();
    let mut reader = BufReader::new(stdin.lock());

    let mut buffer = Vec::new();
    reader.read_to_end(&mut buffer)?;

    if buffer.is_empty() {
        anyhow::bail!("No input received. Provide a file or pipe data to stdin.");
    }

    let records = if looks_like_json(&buffer) {
        read_json(buffer.as_slice())?
    } else {
        read_csv(buffer.as_slice())?
    };
    Ok(records)
}

fn looks_like_json(buffer: &[u8]) -> bool {
    buffer
        .iter()
        .find(|b| !b.is_ascii_whitespace())
        .is_some_and(|b| *b == b'[')
}
