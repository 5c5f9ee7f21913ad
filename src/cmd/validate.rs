//! Validate command - recompute derived slip amounts and flag mismatches

use crate::cmd::{read_records, ConfigArgs};
use crate::utils::format_yen;
use clap::Args;
use gensen::core::{validate, CheckFailure, CheckResult, ValidationConfig, ValidationReport};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct ValidateCommand {
    /// CSV or JSON file containing slip records ("-" for stdin)
    #[arg(short, long)]
    records: PathBuf,

    /// Output as JSON instead of formatted text
    #[arg(long)]
    json: bool,

    #[command(flatten)]
    config: ConfigArgs,
}

/// JSON output structure
#[derive(Debug, Serialize)]
struct ValidationOutput<'a> {
    passed: bool,
    config: ValidationConfig,
    #[serde(flatten)]
    report: &'a ValidationReport,
}

impl ValidateCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let records = read_records(&self.records)?;
        let config = self.config.config();
        let report = validate(&records, &config);

        if self.json {
            self.print_json(&report, config)?;
        } else {
            self.print_text(&report);
        }

        // Exit with code 1 if any check failed
        if !report.passed() {
            std::process::exit(1);
        }
        Ok(())
    }

    fn print_text(&self, report: &ValidationReport) {
        println!();
        println!("VALIDATION RESULTS ({} records)", report.record_count);
        println!();

        for result in &report.results {
            print_result(result);
        }

        println!();
        let failed = report.failures().count();
        if failed == 0 {
            println!("\u{2713} All checks passed.");
        } else {
            println!("\u{26A0} {} of {} check(s) failed.", failed, report.results.len());
        }
    }

    fn print_json(&self, report: &ValidationReport, config: ValidationConfig) -> anyhow::Result<()> {
        let output = ValidationOutput {
            passed: report.passed(),
            config,
            report,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        Ok(())
    }
}

fn print_result(result: &CheckResult) {
    let mark = if result.passed() { "\u{2713}" } else { "\u{2717}" };
    println!(
        "  {} {} [{} / {}]: {} checked, {} skipped",
        mark,
        result.check,
        result.field.column(),
        result.field,
        result.checked,
        result.skipped
    );
    if let Some(failure) = &result.failure {
        println!("     {}", failure_message(failure));
    }
}

fn failure_message(failure: &CheckFailure) -> String {
    match failure {
        CheckFailure::Mismatch {
            index,
            field,
            expected,
            actual,
        } => format!(
            "Record {}: {} does not match (expected {}, actual {}, difference {})",
            index,
            field.column(),
            format_yen(*expected),
            format_yen(*actual),
            format_yen(actual.saturating_sub(*expected))
        ),
        CheckFailure::MissingInput {
            index,
            field,
            missing,
        } => format!(
            "Record {}: {} cannot be checked because {} is empty",
            index,
            field.column(),
            missing.column()
        ),
        CheckFailure::Unsupported { index, reason, .. } => {
            format!("Record {}: not implemented: {}", index, reason)
        }
    }
}
