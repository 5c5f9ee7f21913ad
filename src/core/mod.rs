pub mod calc;
pub mod config;
pub mod normalize;
pub mod record;
pub mod validate;

// Flat public surface for domain types and functions.
pub use calc::{
    column_b_withholding_tax, employment_income_after_deduction, life_insurance_deduction,
    reconciled_withholding_tax, withholding_tax, UnsupportedError,
};
pub use config::ValidationConfig;
pub use normalize::{read_csv, read_json, write_json, FormatError};
pub use record::{CsvField, Field, Record};
pub use validate::{
    compare, run_check, validate, Check, CheckFailure, CheckResult, Comparison, Unmet,
    ValidationReport,
};
