//! Re-derive computed slip fields and compare them with the recorded values.
//!
//! Each check scans every record on its own and stops at its first failure;
//! the other checks always run.

use super::calc::{self, UnsupportedError};
use super::config::ValidationConfig;
use super::record::{Field, Record};
use serde::Serialize;

/// One of the recomputed fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Check {
    EmploymentIncome,
    TotalDeduction,
    WithholdingTax,
    LifeInsurance,
}

impl Check {
    pub const ALL: [Check; 4] = [
        Check::EmploymentIncome,
        Check::TotalDeduction,
        Check::WithholdingTax,
        Check::LifeInsurance,
    ];

    /// The recorded field this check verifies
    pub fn field(self) -> Field {
        match self {
            Check::EmploymentIncome => Field::IncomeAfterDeductionAmount,
            Check::TotalDeduction => Field::TotalDeductionAmount,
            Check::WithholdingTax => Field::WithholdingTaxAmount,
            Check::LifeInsurance => Field::LifeInsuranceDeductionAmount,
        }
    }

    pub fn display(self) -> &'static str {
        match self {
            Check::EmploymentIncome => "Employment income after deduction",
            Check::TotalDeduction => "Total deductions",
            Check::WithholdingTax => "Withholding tax",
            Check::LifeInsurance => "Life insurance deduction",
        }
    }
}

impl std::fmt::Display for Check {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display())
    }
}

/// Recorded value alongside the recomputed one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Comparison {
    pub expected: i64,
    pub actual: i64,
}

impl Comparison {
    pub fn matches(&self) -> bool {
        self.expected == self.actual
    }
}

/// Why no expected value could be computed for an applicable check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unmet {
    Missing(Field),
    Unsupported(UnsupportedError),
}

/// First failure of a check, located by 1-based record position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "type")]
pub enum CheckFailure {
    #[error("record {index}: {field} is {actual}, expected {expected}")]
    Mismatch {
        index: usize,
        field: Field,
        expected: i64,
        actual: i64,
    },
    #[error("record {index}: {field} cannot be checked without {missing}")]
    MissingInput {
        index: usize,
        field: Field,
        missing: Field,
    },
    #[error("record {index}: {field} cannot be checked: {reason}")]
    Unsupported {
        index: usize,
        field: Field,
        #[source]
        reason: UnsupportedError,
    },
}

impl CheckFailure {
    fn from_unmet(unmet: Unmet, index: usize, field: Field) -> Self {
        match unmet {
            Unmet::Missing(missing) => CheckFailure::MissingInput {
                index,
                field,
                missing,
            },
            Unmet::Unsupported(reason) => CheckFailure::Unsupported {
                index,
                field,
                reason,
            },
        }
    }

    pub fn index(&self) -> usize {
        match self {
            CheckFailure::Mismatch { index, .. }
            | CheckFailure::MissingInput { index, .. }
            | CheckFailure::Unsupported { index, .. } => *index,
        }
    }
}

/// Outcome of one check over the whole record set.
#[derive(Debug, Clone, Serialize)]
pub struct CheckResult {
    pub check: Check,
    pub field: Field,
    /// Records compared before the check stopped
    pub checked: usize,
    /// Records the check did not apply to
    pub skipped: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<CheckFailure>,
}

impl CheckResult {
    pub fn passed(&self) -> bool {
        self.failure.is_none()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub record_count: usize,
    pub results: Vec<CheckResult>,
}

impl ValidationReport {
    pub fn passed(&self) -> bool {
        self.results.iter().all(CheckResult::passed)
    }

    pub fn result(&self, check: Check) -> Option<&CheckResult> {
        self.results.iter().find(|r| r.check == check)
    }

    pub fn failures(&self) -> impl Iterator<Item = &CheckFailure> {
        self.results.iter().filter_map(|r| r.failure.as_ref())
    }
}

/// Run all four checks over `records`.
pub fn validate(records: &[Record], config: &ValidationConfig) -> ValidationReport {
    let results = Check::ALL
        .into_iter()
        .map(|check| run_check(check, records, config))
        .collect();
    ValidationReport {
        record_count: records.len(),
        results,
    }
}

/// Run a single check, stopping at the first failing record.
pub fn run_check(check: Check, records: &[Record], config: &ValidationConfig) -> CheckResult {
    let field = check.field();
    let mut result = CheckResult {
        check,
        field,
        checked: 0,
        skipped: 0,
        failure: None,
    };

    for (position, record) in records.iter().enumerate() {
        let index = position + 1;
        match compare(check, record, config) {
            Ok(None) => result.skipped += 1,
            Ok(Some(comparison)) if comparison.matches() => result.checked += 1,
            Ok(Some(Comparison { expected, actual })) => {
                result.failure = Some(CheckFailure::Mismatch {
                    index,
                    field,
                    expected,
                    actual,
                });
                break;
            }
            Err(unmet) => {
                result.failure = Some(CheckFailure::from_unmet(unmet, index, field));
                break;
            }
        }
    }

    match &result.failure {
        Some(failure) => log::debug!("{} failed: {}", check, failure),
        None => log::info!(
            "{}: {} checked, {} skipped",
            check,
            result.checked,
            result.skipped
        ),
    }
    result
}

/// Recompute the value `check` expects for `record`.
///
/// `Ok(None)` when the check does not apply: the recorded field is absent,
/// or the record is excluded (no payment for the employment-income check,
/// retired for the withholding-tax check).
pub fn compare(
    check: Check,
    record: &Record,
    config: &ValidationConfig,
) -> Result<Option<Comparison>, Unmet> {
    let Some(actual) = record.amount(check.field()) else {
        return Ok(None);
    };

    let expected = match check {
        Check::EmploymentIncome => {
            let Some(payment) = record.payment_amount else {
                return Ok(None);
            };
            calc::employment_income_after_deduction(payment)
        }
        Check::TotalDeduction => expected_total_deduction(record, config)?,
        Check::WithholdingTax => {
            // mid-year leavers are not reconciled
            if record.is_retired {
                return Ok(None);
            }
            expected_withholding_tax(record, config)?
        }
        Check::LifeInsurance => {
            // an absent premium is not read as the 40,000 cap
            let premium = require(record, Field::NewLifeInsurancePremiumAmount)?;
            calc::life_insurance_deduction(premium)
        }
    };

    Ok(Some(Comparison { expected, actual }))
}

fn require(record: &Record, field: Field) -> Result<i64, Unmet> {
    record.amount(field).ok_or(Unmet::Missing(field))
}

fn expected_total_deduction(record: &Record, config: &ValidationConfig) -> Result<i64, Unmet> {
    if let Some(payment) = record.payment_amount {
        if payment > config.income_ceiling {
            return Err(Unmet::Unsupported(UnsupportedError::IncomeAboveCeiling {
                payment,
                ceiling: config.income_ceiling,
            }));
        }
    }
    let social = require(record, Field::SocialInsuranceAmount)?;
    let life = record.life_insurance_deduction_amount.unwrap_or(0);
    Ok(config
        .basic_deduction
        .saturating_add(social)
        .saturating_add(life))
}

fn expected_withholding_tax(record: &Record, config: &ValidationConfig) -> Result<i64, Unmet> {
    if record.is_column_b {
        let payment = require(record, Field::PaymentAmount)?;
        return calc::column_b_withholding_tax(payment).map_err(Unmet::Unsupported);
    }
    let income = require(record, Field::IncomeAfterDeductionAmount)?;
    let deductions = require(record, Field::TotalDeductionAmount)?;
    let taxable = income.saturating_sub(deductions);
    Ok(calc::reconciled_withholding_tax(taxable, config.surtax_rate))
}
