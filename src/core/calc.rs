//! Piecewise tax formulas for year-end reconciliation.
//!
//! Each formula is an ordered schedule of inclusive upper bounds scanned in
//! ascending order, with a final open-ended bracket.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

/// A value falls into a range the calculations deliberately do not cover.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "type")]
pub enum UnsupportedError {
    #[error("column B withholding tax for payment {payment} is not implemented (88,000 to 740,000 yen)")]
    ColumnBBand { payment: i64 },
    #[error("payment {payment} is above the supported income ceiling of {ceiling}")]
    IncomeAboveCeiling { payment: i64, ceiling: i64 },
}

/// Ordered brackets: the first whose inclusive upper bound covers the amount
/// wins, otherwise `top`.
struct Schedule<F: Copy> {
    brackets: Vec<(i64, F)>,
    top: F,
}

impl<F: Copy> Schedule<F> {
    fn formula_for(&self, amount: i64) -> F {
        self.brackets
            .iter()
            .find(|(upper, _)| amount <= *upper)
            .map_or(self.top, |(_, formula)| *formula)
    }
}

/// Round down to a multiple of `unit`, saturating at `i64::MIN`.
pub fn truncate_to_unit(amount: i64, unit: i64) -> i64 {
    amount.saturating_sub(amount.rem_euclid(unit))
}

/// Floor a fractional yen amount to whole yen, saturating at the i64 range.
pub fn floor_yen(amount: Decimal) -> i64 {
    amount.floor().to_i64().unwrap_or(if amount.is_sign_negative() {
        i64::MIN
    } else {
        i64::MAX
    })
}

#[derive(Debug, Clone, Copy)]
enum DeductionFormula {
    Fixed(i64),
    Less(i64),
    /// floor(payment / 4000) × 1000 × rate + adjust
    Quartered { rate: Decimal, adjust: i64 },
    /// floor(payment × rate) + adjust
    Scaled { rate: Decimal, adjust: i64 },
}

fn deduction_schedule() -> Schedule<DeductionFormula> {
    use DeductionFormula::*;
    Schedule {
        brackets: vec![
            (550_999, Fixed(0)),
            (1_618_999, Less(550_000)),
            (1_619_999, Fixed(1_069_000)),
            (1_621_999, Fixed(1_070_000)),
            (1_623_999, Fixed(1_072_000)),
            (1_627_999, Fixed(1_074_000)),
            (1_799_999, Quartered { rate: dec!(2.4), adjust: 100_000 }),
            (3_599_999, Quartered { rate: dec!(2.8), adjust: -80_000 }),
            (6_599_999, Quartered { rate: dec!(3.2), adjust: -440_000 }),
            (8_499_999, Scaled { rate: dec!(0.9), adjust: -1_100_000 }),
        ],
        top: Less(1_950_000),
    }
}

/// Income after the employment-income deduction (給与所得控除後の金額).
pub fn employment_income_after_deduction(payment: i64) -> i64 {
    match deduction_schedule().formula_for(payment) {
        DeductionFormula::Fixed(amount) => amount,
        DeductionFormula::Less(deduction) => payment - deduction,
        DeductionFormula::Quartered { rate, adjust } => {
            let base = payment.div_euclid(4000) * 1000;
            floor_yen(Decimal::from(base) * rate) + adjust
        }
        DeductionFormula::Scaled { rate, adjust } => {
            floor_yen(Decimal::from(payment) * rate) + adjust
        }
    }
}

/// (rate in percent, fixed subtraction)
fn income_tax_schedule() -> Schedule<(i64, i64)> {
    Schedule {
        brackets: vec![
            (1_949_000, (5, 0)),
            (3_299_000, (10, 97_500)),
            (6_949_000, (20, 427_500)),
            (8_999_000, (23, 636_000)),
            (17_999_000, (33, 1_536_000)),
            (39_999_000, (40, 2_796_000)),
        ],
        top: (45, 4_796_000),
    }
}

/// Income tax on a taxable amount before surtax and the final 100 yen rounding.
///
/// The amount is truncated to the thousand yen first; the bracket is chosen
/// on the truncated amount.
pub fn withholding_tax(taxable: i64) -> i64 {
    let amount = truncate_to_unit(taxable, 1000);
    let (rate, subtraction) = income_tax_schedule().formula_for(amount);
    // amount is a multiple of 1000, so this division is exact
    (amount / 100).saturating_mul(rate).saturating_sub(subtraction)
}

/// Year-end withholding on the standard schedule: income tax plus surtax,
/// rounded down to the hundred yen.
pub fn reconciled_withholding_tax(taxable: i64, surtax_rate: Decimal) -> i64 {
    let tax = floor_yen(Decimal::from(withholding_tax(taxable)) * surtax_rate);
    truncate_to_unit(tax, 100)
}

#[derive(Debug, Clone, Copy)]
enum ColumnBFormula {
    Flat(Decimal),
    Unimplemented,
    /// base + floor((payment - threshold) × rate)
    Progressive { base: i64, threshold: i64, rate: Decimal },
}

fn column_b_schedule() -> Schedule<ColumnBFormula> {
    use ColumnBFormula::*;
    Schedule {
        brackets: vec![
            (87_999, Flat(dec!(0.03063))),
            (740_000, Unimplemented),
            (
                1_699_999,
                Progressive { base: 259_800, threshold: 740_000, rate: dec!(0.4084) },
            ),
        ],
        top: Progressive { base: 651_900, threshold: 1_700_000, rate: dec!(0.45945) },
    }
}

/// Withholding tax under column B (乙欄), applied to the gross payment.
///
/// Payments from 88,000 to 740,000 yen inclusive are not supported.
pub fn column_b_withholding_tax(payment: i64) -> Result<i64, UnsupportedError> {
    match column_b_schedule().formula_for(payment) {
        ColumnBFormula::Flat(rate) => Ok(floor_yen(Decimal::from(payment) * rate)),
        ColumnBFormula::Unimplemented => Err(UnsupportedError::ColumnBBand { payment }),
        ColumnBFormula::Progressive { base, threshold, rate } => {
            Ok(base + floor_yen(Decimal::from(payment - threshold) * rate))
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum LifeInsuranceFormula {
    Full,
    /// floor(premium / divisor) + add
    Divided { divisor: i64, add: i64 },
    Cap(i64),
}

fn life_insurance_schedule() -> Schedule<LifeInsuranceFormula> {
    use LifeInsuranceFormula::*;
    Schedule {
        brackets: vec![
            (20_000, Full),
            (40_000, Divided { divisor: 2, add: 10_000 }),
            (80_000, Divided { divisor: 4, add: 20_000 }),
        ],
        top: Cap(40_000),
    }
}

/// Life insurance deduction (生命保険料控除) for premiums under the new scheme.
pub fn life_insurance_deduction(premium: i64) -> i64 {
    match life_insurance_schedule().formula_for(premium) {
        LifeInsuranceFormula::Full => premium,
        LifeInsuranceFormula::Divided { divisor, add } => premium.div_euclid(divisor) + add,
        LifeInsuranceFormula::Cap(cap) => cap,
    }
}
