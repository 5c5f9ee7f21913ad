//! Calc command - evaluate one tax formula for an amount

use clap::{Args, ValueEnum};
use gensen::core::{calc, ValidationConfig};
use rust_decimal::Decimal;

#[derive(Args, Debug)]
pub struct CalcCommand {
    /// Formula to evaluate
    #[arg(value_enum)]
    function: CalcFunction,

    /// Input amount in yen
    #[arg(allow_negative_numbers = true)]
    amount: i64,

    /// Surtax multiplier for the reconciled withholding tax [default: 1.0102]
    #[arg(long)]
    surtax_rate: Option<Decimal>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CalcFunction {
    /// Payment -> income after the employment-income deduction
    EmploymentIncome,
    /// Taxable amount -> income tax before surtax
    WithholdingTax,
    /// Taxable amount -> income tax with surtax, rounded down to 100 yen
    ReconciledWithholdingTax,
    /// Payment -> column B (乙欄) withholding tax
    ColumnB,
    /// New-scheme premium -> life insurance deduction
    LifeInsurance,
}

impl CalcCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let surtax_rate = self
            .surtax_rate
            .unwrap_or(ValidationConfig::default().surtax_rate);
        let result = evaluate(self.function, self.amount, surtax_rate)?;
        println!("{}", result);
        Ok(())
    }
}

fn evaluate(function: CalcFunction, amount: i64, surtax_rate: Decimal) -> anyhow::Result<i64> {
    let result = match function {
        CalcFunction::EmploymentIncome => calc::employment_income_after_deduction(amount),
        CalcFunction::WithholdingTax => calc::withholding_tax(amount),
        CalcFunction::ReconciledWithholdingTax => {
            calc::reconciled_withholding_tax(amount, surtax_rate)
        }
        CalcFunction::ColumnB => calc::column_b_withholding_tax(amount)?,
        CalcFunction::LifeInsurance => calc::life_insurance_deduction(amount),
    };
    log::debug!("{:?}({}) = {}", function, amount, result);
    Ok(result)
}
