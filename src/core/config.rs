use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

/// Basic deduction (基礎控除) for total income up to the ceiling.
pub const BASIC_DEDUCTION: i64 = 480_000;

/// Highest payment for which the flat basic deduction applies.
pub const INCOME_CEILING: i64 = 24_000_000;

/// Parameters of the reconciliation rules that vary between tax years.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ValidationConfig {
    pub basic_deduction: i64,
    pub income_ceiling: i64,
    /// Multiplier applied to income tax on the standard schedule
    pub surtax_rate: Decimal,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        ValidationConfig {
            basic_deduction: BASIC_DEDUCTION,
            income_ceiling: INCOME_CEILING,
            surtax_rate: dec!(1.0102),
        }
    }
}
