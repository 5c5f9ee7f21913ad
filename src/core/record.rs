use gensen_derive::CsvSchema;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Column description generated by `#[derive(CsvSchema)]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvField {
    /// JSON key (camelCase)
    pub key: &'static str,
    /// Column header as it appears on the withholding slip export
    pub column: &'static str,
    pub required: bool,
    pub description: &'static str,
}

/// One employee's year-end reconciliation data for one tax year.
///
/// Every amount is optional: an absent field means "not provided" and is
/// never treated as zero.
#[derive(
    Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema, CsvSchema,
)]
pub struct Record {
    /// Gross payment (支払金額) in yen
    #[serde(
        rename = "paymentAmount",
        alias = "支払金額",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub payment_amount: Option<i64>,

    /// Income after the employment-income deduction (給与所得控除後の金額)
    #[serde(
        rename = "incomeAfterDeductionAmount",
        alias = "給与所得控除後の金額",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub income_after_deduction_amount: Option<i64>,

    /// Sum of all personal deductions (所得控除後の額の合計額)
    #[serde(
        rename = "totalDeductionAmount",
        alias = "所得控除後の額の合計額",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub total_deduction_amount: Option<i64>,

    /// Final withheld tax, rounded down to 100 yen (源泉徴収税額)
    #[serde(
        rename = "withholdingTaxAmount",
        alias = "源泉徴収税額",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub withholding_tax_amount: Option<i64>,

    /// Social insurance premiums (社会保険料等の金額)
    #[serde(
        rename = "socialInsuranceAmount",
        alias = "社会保険料等の金額",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub social_insurance_amount: Option<i64>,

    /// Life insurance deduction (生命保険料の控除額)
    #[serde(
        rename = "lifeInsuranceDeductionAmount",
        alias = "生命保険料の控除額",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub life_insurance_deduction_amount: Option<i64>,

    /// Premiums paid under the new life insurance scheme (新生命保険料の金額)
    #[serde(
        rename = "newLifeInsurancePremiumAmount",
        alias = "新生命保険料の金額",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub new_life_insurance_premium_amount: Option<i64>,

    /// Left employment during the year (退職); "Yes" or empty
    #[serde(
        rename = "isRetired",
        alias = "退職",
        default,
        skip_serializing_if = "is_false"
    )]
    pub is_retired: bool,

    /// No dependent exemption declaration on file (乙欄); "Yes" or empty
    #[serde(
        rename = "isColumnB",
        alias = "乙欄",
        default,
        skip_serializing_if = "is_false"
    )]
    pub is_column_b: bool,

    /// Columns with no tax meaning (employee name, department, ...)
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// A typed field of a [`Record`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    PaymentAmount,
    IncomeAfterDeductionAmount,
    TotalDeductionAmount,
    WithholdingTaxAmount,
    SocialInsuranceAmount,
    LifeInsuranceDeductionAmount,
    NewLifeInsurancePremiumAmount,
    IsRetired,
    IsColumnB,
}

impl Field {
    pub const ALL: [Field; 9] = [
        Field::PaymentAmount,
        Field::IncomeAfterDeductionAmount,
        Field::TotalDeductionAmount,
        Field::WithholdingTaxAmount,
        Field::SocialInsuranceAmount,
        Field::LifeInsuranceDeductionAmount,
        Field::NewLifeInsurancePremiumAmount,
        Field::IsRetired,
        Field::IsColumnB,
    ];

    /// JSON key
    pub fn key(self) -> &'static str {
        match self {
            Field::PaymentAmount => "paymentAmount",
            Field::IncomeAfterDeductionAmount => "incomeAfterDeductionAmount",
            Field::TotalDeductionAmount => "totalDeductionAmount",
            Field::WithholdingTaxAmount => "withholdingTaxAmount",
            Field::SocialInsuranceAmount => "socialInsuranceAmount",
            Field::LifeInsuranceDeductionAmount => "lifeInsuranceDeductionAmount",
            Field::NewLifeInsurancePremiumAmount => "newLifeInsurancePremiumAmount",
            Field::IsRetired => "isRetired",
            Field::IsColumnB => "isColumnB",
        }
    }

    /// Column header used on the slip export
    pub fn column(self) -> &'static str {
        match self {
            Field::PaymentAmount => "支払金額",
            Field::IncomeAfterDeductionAmount => "給与所得控除後の金額",
            Field::TotalDeductionAmount => "所得控除後の額の合計額",
            Field::WithholdingTaxAmount => "源泉徴収税額",
            Field::SocialInsuranceAmount => "社会保険料等の金額",
            Field::LifeInsuranceDeductionAmount => "生命保険料の控除額",
            Field::NewLifeInsurancePremiumAmount => "新生命保険料の金額",
            Field::IsRetired => "退職",
            Field::IsColumnB => "乙欄",
        }
    }

    /// Match a CSV header against either the slip column name or the JSON key.
    pub fn from_header(header: &str) -> Option<Field> {
        Field::ALL
            .into_iter()
            .find(|f| f.column() == header || f.key() == header)
    }

    pub fn is_flag(self) -> bool {
        matches!(self, Field::IsRetired | Field::IsColumnB)
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl Record {
    /// Value of an amount field; `None` for flags.
    pub fn amount(&self, field: Field) -> Option<i64> {
        match field {
            Field::PaymentAmount => self.payment_amount,
            Field::IncomeAfterDeductionAmount => self.income_after_deduction_amount,
            Field::TotalDeductionAmount => self.total_deduction_amount,
            Field::WithholdingTaxAmount => self.withholding_tax_amount,
            Field::SocialInsuranceAmount => self.social_insurance_amount,
            Field::LifeInsuranceDeductionAmount => self.life_insurance_deduction_amount,
            Field::NewLifeInsurancePremiumAmount => self.new_life_insurance_premium_amount,
            Field::IsRetired | Field::IsColumnB => None,
        }
    }

    pub(crate) fn set_amount(&mut self, field: Field, value: i64) {
        let slot = match field {
            Field::PaymentAmount => &mut self.payment_amount,
            Field::IncomeAfterDeductionAmount => &mut self.income_after_deduction_amount,
            Field::TotalDeductionAmount => &mut self.total_deduction_amount,
            Field::WithholdingTaxAmount => &mut self.withholding_tax_amount,
            Field::SocialInsuranceAmount => &mut self.social_insurance_amount,
            Field::LifeInsuranceDeductionAmount => &mut self.life_insurance_deduction_amount,
            Field::NewLifeInsurancePremiumAmount => &mut self.new_life_insurance_premium_amount,
            Field::IsRetired | Field::IsColumnB => return,
        };
        *slot = Some(value);
    }

    pub(crate) fn set_flag(&mut self, field: Field) {
        match field {
            Field::IsRetired => self.is_retired = true,
            Field::IsColumnB => self.is_column_b = true,
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn absent_fields_are_omitted_when_serialized() {
        let record = Record {
            payment_amount: Some(3_000_000),
            social_insurance_amount: Some(0),
            ..Default::default()
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(
            value,
            json!({ "paymentAmount": 3000000, "socialInsuranceAmount": 0 })
        );
    }

    #[test]
    fn flags_serialized_only_when_true() {
        let record = Record {
            is_column_b: true,
            ..Default::default()
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value, json!({ "isColumnB": true }));
    }

    #[test]
    fn deserializes_slip_column_names() {
        let record: Record = serde_json::from_value(json!({
            "支払金額": 1000000,
            "退職": true,
            "氏名": "山田太郎",
        }))
        .unwrap();
        assert_eq!(record.payment_amount, Some(1_000_000));
        assert!(record.is_retired);
        assert!(!record.is_column_b);
        assert_eq!(record.extra.get("氏名"), Some(&json!("山田太郎")));
    }

    #[test]
    fn zero_is_distinct_from_absent() {
        let record: Record = serde_json::from_value(json!({ "withholdingTaxAmount": 0 })).unwrap();
        assert_eq!(record.withholding_tax_amount, Some(0));
        assert_eq!(record.amount(Field::PaymentAmount), None);
    }

    #[test]
    fn field_from_header_accepts_both_names() {
        assert_eq!(Field::from_header("源泉徴収税額"), Some(Field::WithholdingTaxAmount));
        assert_eq!(Field::from_header("withholdingTaxAmount"), Some(Field::WithholdingTaxAmount));
        assert_eq!(Field::from_header("乙欄"), Some(Field::IsColumnB));
        assert_eq!(Field::from_header("氏名"), None);
    }

    #[test]
    fn csv_schema_matches_fields() {
        let schema = Record::csv_schema();
        assert_eq!(schema.len(), Field::ALL.len());
        for (entry, field) in schema.iter().zip(Field::ALL) {
            assert_eq!(entry.key, field.key());
            assert_eq!(entry.column, field.column());
            assert!(!entry.required);
        }
        assert_eq!(schema[0].description, "Gross payment (支払金額) in yen");
    }

    #[test]
    fn set_amount_ignores_flags() {
        let mut record = Record::default();
        record.set_amount(Field::IsRetired, 1);
        record.set_flag(Field::IsRetired);
        record.set_amount(Field::SocialInsuranceAmount, 450_000);
        assert!(record.is_retired);
        assert_eq!(record.amount(Field::SocialInsuranceAmount), Some(450_000));
    }
}
