//! E2E tests for the gensen command line

use std::io::Write;
use std::process::{Command, Output, Stdio};

fn gensen(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_gensen"))
        .args(args)
        .output()
        .expect("Failed to execute command")
}

fn gensen_with_stdin(args: &[&str], input: &str) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_gensen"))
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to execute command");
    child
        .stdin
        .take()
        .expect("stdin")
        .write_all(input.as_bytes())
        .expect("write stdin");
    child.wait_with_output().expect("wait for command")
}

/// Every record in the CSV export is computed correctly
#[test]
fn validate_csv_passes() {
    let output = gensen(&["validate", "-r", "tests/data/slips.csv"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Command failed: {:?}", output);
    assert!(stdout.contains("VALIDATION RESULTS (4 records)"));
    assert!(stdout.contains("All checks passed."));
    // retired record is excluded from the withholding check
    assert!(stdout.contains("Withholding tax [源泉徴収税額 / withholdingTaxAmount]: 3 checked, 1 skipped"));
}

/// A withholding amount off by 100 yen fails only the withholding check
#[test]
fn validate_reports_mismatch() {
    let output = gensen(&["validate", "-r", "tests/data/mismatch.json"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert_eq!(output.status.code(), Some(1), "Unexpected status: {:?}", output);
    assert!(stdout.contains(
        "Record 1: 源泉徴収税額 does not match (expected 55,000, actual 55,100, difference 100)"
    ));
    assert!(stdout.contains("1 of 4 check(s) failed."));
}

/// JSON output carries the structured failure
#[test]
fn validate_json_output() {
    let output = gensen(&["validate", "-r", "tests/data/mismatch.json", "--json"]);
    assert_eq!(output.status.code(), Some(1));

    let report: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("valid JSON output");
    assert_eq!(report["passed"], false);
    assert_eq!(report["record_count"], 2);
    assert_eq!(report["config"]["basic_deduction"], 480000);

    let results = report["results"].as_array().expect("results array");
    assert_eq!(results.len(), 4);
    let failed: Vec<_> = results
        .iter()
        .filter(|r| r.get("failure").is_some())
        .collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0]["check"], "withholdingTax");
    assert_eq!(failed[0]["failure"]["type"], "Mismatch");
    assert_eq!(failed[0]["failure"]["index"], 1);
    assert_eq!(failed[0]["failure"]["field"], "withholdingTaxAmount");
    assert_eq!(failed[0]["failure"]["expected"], 55000);
    assert_eq!(failed[0]["failure"]["actual"], 55100);
}

/// A different surtax rate changes the expected withholding
#[test]
fn validate_with_surtax_override() {
    let output = gensen(&[
        "validate",
        "-r",
        "tests/data/mismatch.json",
        "--surtax-rate",
        "1.021",
    ]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert_eq!(output.status.code(), Some(1));
    assert!(stdout.contains("expected 55,600, actual 55,100"));
}

/// Unimplemented brackets are reported per check
#[test]
fn validate_reports_unsupported_ranges() {
    let output = gensen(&["validate", "-r", "tests/data/unsupported.json", "--json"]);
    assert_eq!(output.status.code(), Some(1));

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let results = report["results"].as_array().unwrap();
    assert_eq!(results[1]["failure"]["type"], "Unsupported");
    assert_eq!(results[1]["failure"]["index"], 2);
    assert_eq!(results[1]["failure"]["reason"]["type"], "IncomeAboveCeiling");
    assert_eq!(results[2]["failure"]["type"], "Unsupported");
    assert_eq!(results[2]["failure"]["reason"]["type"], "ColumnBBand");
}

/// Records can be piped in on stdin
#[test]
fn validate_reads_stdin() {
    let json = std::fs::read_to_string("tests/data/mismatch.json").unwrap();
    let output = gensen_with_stdin(&["validate", "-r", "-"], &json);
    assert_eq!(output.status.code(), Some(1));

    let csv = std::fs::read_to_string("tests/data/slips.csv").unwrap();
    let output = gensen_with_stdin(&["validate", "-r", "-"], &csv);
    assert!(output.status.success(), "Command failed: {:?}", output);
}

/// CSV export converts to JSON with absent fields omitted
#[test]
fn normalize_csv_to_json() {
    let output = gensen(&["normalize", "-i", "tests/data/slips.csv"]);
    assert!(output.status.success(), "Command failed: {:?}", output);

    let records: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let records = records.as_array().unwrap();
    assert_eq!(records.len(), 4);
    assert_eq!(records[0]["paymentAmount"], 3000000);
    assert_eq!(records[0]["氏名"], "山田太郎");
    assert!(records[0].get("lifeInsuranceDeductionAmount").is_none());
    assert!(records[0].get("isRetired").is_none());
    assert_eq!(records[1]["isRetired"], true);
    assert_eq!(records[2]["isColumnB"], true);
}

/// Flag columns only accept "Yes"
#[test]
fn normalize_rejects_malformed_flag() {
    let output = gensen(&["normalize", "-i", "tests/data/malformed.csv"]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success());
    assert!(stderr.contains("invalid 退職 value \"No\" at line 2"), "{stderr}");
}

/// Audit view lists only failing rows when asked
#[test]
fn records_failures_only_csv() {
    let output = gensen(&[
        "records",
        "-r",
        "tests/data/mismatch.json",
        "--failures-only",
        "--csv",
    ]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Command failed: {:?}", output);
    let lines: Vec<_> = stdout.lines().collect();
    assert_eq!(lines[0], "record,check,column,recorded,expected,status");
    assert_eq!(lines.len(), 2);
    assert!(lines[1].starts_with("1,Withholding tax,源泉徴収税額,"));
    assert!(lines[1].ends_with("MISMATCH (100)"));
}

#[test]
fn calc_functions() {
    let output = gensen(&["calc", "employment-income", "3000000"]);
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "2020000");

    let output = gensen(&["calc", "life-insurance", "80001"]);
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "40000");

    let output = gensen(&["calc", "column-b", "100000"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("not implemented"));
}

#[test]
fn schema_csv_header() {
    let output = gensen(&["schema", "csv-header"]);
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        "支払金額,給与所得控除後の金額,所得控除後の額の合計額,源泉徴収税額,社会保険料等の金額,生命保険料の控除額,新生命保険料の金額,退職,乙欄"
    );
}
