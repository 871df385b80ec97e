use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::errors::{BillingError, Result};
use crate::types::{PaymentMethod, PaymentMethodKind, PaymentPeriod, StudentId};

/// loosely typed scalar as it arrives from a form or json body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawScalar {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl RawScalar {
    fn describe(&self) -> String {
        match self {
            RawScalar::Integer(i) => i.to_string(),
            RawScalar::Float(f) => f.to_string(),
            RawScalar::Text(s) => s.clone(),
        }
    }
}

impl From<i64> for RawScalar {
    fn from(value: i64) -> Self {
        RawScalar::Integer(value)
    }
}

impl From<i32> for RawScalar {
    fn from(value: i32) -> Self {
        RawScalar::Integer(value as i64)
    }
}

impl From<&str> for RawScalar {
    fn from(value: &str) -> Self {
        RawScalar::Text(value.to_string())
    }
}

/// channel-specific fields; which ones are required depends on the method
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDetails {
    pub cheque_number: Option<String>,
    pub cheque_date: Option<String>,
    pub bank_name: Option<String>,
    pub transaction_id: Option<String>,
    pub transaction_date: Option<String>,
}

/// unvalidated payment submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentSubmission {
    pub student_id: StudentId,
    pub invoice_date: NaiveDate,
    pub amount: RawScalar,
    pub period: RawScalar,
    pub method: String,
    #[serde(default)]
    pub method_details: MethodDetails,
    #[serde(default)]
    pub remarks: Option<String>,
}

/// submission that passed every check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedPayment {
    pub student_id: StudentId,
    pub invoice_date: NaiveDate,
    pub amount: Money,
    pub period: PaymentPeriod,
    pub method: PaymentMethod,
    pub remarks: Option<String>,
}

impl PaymentSubmission {
    /// cheque submission
    pub fn cheque(
        student_id: StudentId,
        invoice_date: NaiveDate,
        amount: impl Into<RawScalar>,
        period: impl Into<RawScalar>,
        cheque_number: &str,
        cheque_date: &str,
        bank_name: &str,
    ) -> Self {
        Self {
            student_id,
            invoice_date,
            amount: amount.into(),
            period: period.into(),
            method: PaymentMethodKind::Cheque.to_string(),
            method_details: MethodDetails {
                cheque_number: Some(cheque_number.to_string()),
                cheque_date: Some(cheque_date.to_string()),
                bank_name: Some(bank_name.to_string()),
                ..MethodDetails::default()
            },
            remarks: None,
        }
    }

    /// online transfer submission
    pub fn online(
        student_id: StudentId,
        invoice_date: NaiveDate,
        amount: impl Into<RawScalar>,
        period: impl Into<RawScalar>,
        transaction_id: &str,
        transaction_date: &str,
    ) -> Self {
        Self {
            student_id,
            invoice_date,
            amount: amount.into(),
            period: period.into(),
            method: PaymentMethodKind::Online.to_string(),
            method_details: MethodDetails {
                transaction_id: Some(transaction_id.to_string()),
                transaction_date: Some(transaction_date.to_string()),
                ..MethodDetails::default()
            },
            remarks: None,
        }
    }

    pub fn with_remarks(mut self, remarks: &str) -> Self {
        self.remarks = Some(remarks.to_string());
        self
    }

    /// check every field, failing on the first problem
    pub fn validate(&self, enabled_methods: &[PaymentMethodKind]) -> Result<ValidatedPayment> {
        let period = parse_period(&self.period)?;
        let method = self.parse_method(enabled_methods)?;
        let amount = parse_amount(&self.amount)?;

        Ok(ValidatedPayment {
            student_id: self.student_id,
            invoice_date: self.invoice_date,
            amount,
            period,
            method,
            remarks: self
                .remarks
                .as_deref()
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .map(str::to_string),
        })
    }

    fn parse_method(&self, enabled_methods: &[PaymentMethodKind]) -> Result<PaymentMethod> {
        let kind: PaymentMethodKind = self.method.parse()?;
        if !enabled_methods.contains(&kind) {
            return Err(BillingError::PaymentMethodDisabled {
                method: kind.to_string(),
            });
        }

        let details = &self.method_details;
        match kind {
            PaymentMethodKind::Cheque => Ok(PaymentMethod::Cheque {
                number: required(kind, "cheque_number", &details.cheque_number)?,
                date: required_date(kind, "cheque_date", &details.cheque_date)?,
                bank_name: required(kind, "bank_name", &details.bank_name)?,
            }),
            PaymentMethodKind::Online => Ok(PaymentMethod::Online {
                transaction_id: required(kind, "transaction_id", &details.transaction_id)?,
                date: required_date(kind, "transaction_date", &details.transaction_date)?,
            }),
        }
    }
}

/// accepts 6, 12, "6" or "12"; nothing else
pub fn parse_period(raw: &RawScalar) -> Result<PaymentPeriod> {
    match raw {
        RawScalar::Integer(value) => u32::try_from(*value)
            .map_err(|_| BillingError::InvalidPeriod { value: value.to_string() })
            .and_then(PaymentPeriod::try_from),
        RawScalar::Text(text) => text.parse(),
        RawScalar::Float(_) => Err(BillingError::InvalidPeriod { value: raw.describe() }),
    }
}

/// positive, finite amount rounded to 2 dp
pub fn parse_amount(raw: &RawScalar) -> Result<Money> {
    let invalid = || BillingError::InvalidAmount { value: raw.describe() };

    let amount = match raw {
        RawScalar::Integer(value) => Some(Money::from_major(*value)),
        RawScalar::Float(value) => Money::from_f64(*value),
        RawScalar::Text(text) => Money::from_str_exact(text).ok(),
    }
    .ok_or_else(invalid)?;

    if !amount.is_positive() {
        return Err(invalid());
    }
    Ok(amount)
}

fn required(kind: PaymentMethodKind, field: &'static str, value: &Option<String>) -> Result<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or_else(|| BillingError::MissingMethodDetail {
            method: kind.to_string(),
            field,
        })
}

fn required_date(
    kind: PaymentMethodKind,
    field: &'static str,
    value: &Option<String>,
) -> Result<NaiveDate> {
    let text = required(kind, field, value)?;
    NaiveDate::parse_from_str(&text, "%Y-%m-%d").map_err(|e| BillingError::InvalidDate {
        message: format!("{} '{}': {}", field, text, e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use uuid::Uuid;

    const BOTH: [PaymentMethodKind; 2] = [PaymentMethodKind::Cheque, PaymentMethodKind::Online];

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn online() -> PaymentSubmission {
        PaymentSubmission::online(Uuid::new_v4(), date(2024, 6, 1), "30000", 6, "UTR123", "2024-06-01")
    }

    #[test]
    fn test_valid_online_submission() {
        let payment = online().validate(&BOTH).unwrap();
        assert_eq!(payment.period, PaymentPeriod::SixMonths);
        assert_eq!(payment.amount, Money::from_major(30_000));
        assert_eq!(payment.method.kind(), PaymentMethodKind::Online);
        assert_eq!(payment.method.reference(), "UTR123");
    }

    #[test]
    fn test_valid_cheque_submission() {
        let submission = PaymentSubmission::cheque(
            Uuid::new_v4(),
            date(2024, 6, 1),
            55_000,
            "12",
            "000341",
            "2024-05-30",
            "Canara Bank",
        );
        let payment = submission.validate(&BOTH).unwrap();
        assert_eq!(payment.period, PaymentPeriod::TwelveMonths);
        assert_eq!(
            payment.method,
            PaymentMethod::Cheque {
                number: "000341".to_string(),
                date: date(2024, 5, 30),
                bank_name: "Canara Bank".to_string(),
            }
        );
    }

    #[test]
    fn test_period_values() {
        assert!(parse_period(&RawScalar::Integer(6)).is_ok());
        assert!(parse_period(&RawScalar::Text("12".to_string())).is_ok());
        for bad in [
            RawScalar::Integer(7),
            RawScalar::Integer(-6),
            RawScalar::Float(6.0),
            RawScalar::Text("six".to_string()),
            RawScalar::Text("6 months".to_string()),
        ] {
            let err = parse_period(&bad).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidInput);
        }
    }

    #[test]
    fn test_amount_values() {
        assert_eq!(
            parse_amount(&RawScalar::Float(2500.5)).unwrap(),
            Money::from_str_exact("2500.50").unwrap()
        );
        for bad in [
            RawScalar::Integer(0),
            RawScalar::Integer(-100),
            RawScalar::Float(f64::NAN),
            RawScalar::Text("abc".to_string()),
            RawScalar::Text("0.001".to_string()),
            RawScalar::Text("".to_string()),
        ] {
            assert!(
                matches!(parse_amount(&bad), Err(BillingError::InvalidAmount { .. })),
                "{:?} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_missing_cheque_detail() {
        let mut submission = PaymentSubmission::cheque(
            Uuid::new_v4(),
            date(2024, 6, 1),
            "30000",
            6,
            "000341",
            "2024-05-30",
            "   ",
        );
        let err = submission.validate(&BOTH).unwrap_err();
        assert_eq!(
            err,
            BillingError::MissingMethodDetail {
                method: "cheque".to_string(),
                field: "bank_name",
            }
        );

        submission.method_details.bank_name = Some("HDFC".to_string());
        submission.method_details.cheque_number = None;
        assert!(matches!(
            submission.validate(&BOTH),
            Err(BillingError::MissingMethodDetail { field: "cheque_number", .. })
        ));
    }

    #[test]
    fn test_online_needs_its_own_fields() {
        let mut submission = online();
        submission.method_details.transaction_id = None;
        submission.method_details.cheque_number = Some("123".to_string());
        assert!(matches!(
            submission.validate(&BOTH),
            Err(BillingError::MissingMethodDetail { field: "transaction_id", .. })
        ));
    }

    #[test]
    fn test_bad_detail_date() {
        let mut submission = online();
        submission.method_details.transaction_date = Some("01/06/2024".to_string());
        assert!(matches!(submission.validate(&BOTH), Err(BillingError::InvalidDate { .. })));
    }

    #[test]
    fn test_unknown_and_disabled_methods() {
        let mut submission = online();
        submission.method = "cash".to_string();
        assert!(matches!(
            submission.validate(&BOTH),
            Err(BillingError::InvalidPaymentMethod { .. })
        ));

        let err = online().validate(&[PaymentMethodKind::Cheque]).unwrap_err();
        assert!(matches!(err, BillingError::PaymentMethodDisabled { .. }));
    }

    #[test]
    fn test_deserialize_mixed_scalars() {
        let json = r#"{
            "student_id": "67e55044-10b1-426f-9247-bb680e5fe0c8",
            "invoice_date": "2024-06-01",
            "amount": 30000.0,
            "period": "6",
            "method": "online",
            "method_details": { "transaction_id": "UTR9", "transaction_date": "2024-06-01" }
        }"#;
        let submission: PaymentSubmission = serde_json::from_str(json).unwrap();
        assert_eq!(submission.period, RawScalar::Text("6".to_string()));
        let payment = submission.validate(&BOTH).unwrap();
        assert_eq!(payment.amount, Money::from_major(30_000));
    }

    #[test]
    fn test_blank_remarks_dropped() {
        let payment = online().with_remarks("  ").validate(&BOTH).unwrap();
        assert_eq!(payment.remarks, None);
    }
}
