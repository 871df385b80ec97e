use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::errors::{BillingError, Result};
use crate::period::AcademicPeriodCode;
use crate::types::{HostelId, InvoiceId, PaymentMethod, PaymentPeriod, StudentId};

/// student billing state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentBillingState {
    pub student_id: StudentId,
    pub hostel_id: HostelId,
    pub admission_date: NaiveDate,
    /// absent until the first payment, then never moves backwards
    pub due_date: Option<NaiveDate>,
}

impl StudentBillingState {
    /// state of a newly admitted student who has not paid yet
    pub fn new(student_id: StudentId, hostel_id: HostelId, admission_date: NaiveDate) -> Self {
        Self {
            student_id,
            hostel_id,
            admission_date,
            due_date: None,
        }
    }

    pub fn with_due_date(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// check if any payment was ever recorded
    pub fn has_paid(&self) -> bool {
        self.due_date.is_some()
    }

    /// move the due date forward, rejecting any move backwards
    pub fn advance_due_date(&mut self, new_due_date: NaiveDate) -> Result<()> {
        if let Some(current) = self.due_date {
            if new_due_date < current {
                return Err(BillingError::DueDateRegression {
                    current,
                    requested: new_due_date,
                });
            }
        }
        self.due_date = Some(new_due_date);
        Ok(())
    }
}

/// recorded payment event; financial fields never change after creation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    pub invoice_id: InvoiceId,
    pub student_id: StudentId,
    pub hostel_id: HostelId,
    pub invoice_date: NaiveDate,
    pub amount: Money,
    pub period: PaymentPeriod,
    pub method: PaymentMethod,
    /// academic half of the period paid for, fixed at creation
    pub academic_code: AcademicPeriodCode,
    pub remarks: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

/// most recent invoice by invoice date; later entries win ties
pub fn latest_invoice<'a, I>(invoices: I) -> Option<&'a Invoice>
where
    I: IntoIterator<Item = &'a Invoice>,
{
    invoices
        .into_iter()
        .fold(None::<&'a Invoice>, |best, inv| match best {
            Some(b) if b.invoice_date > inv.invoice_date => Some(b),
            _ => Some(inv),
        })
}

/// billing state paired with the student's last payment, input to aggregation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentLedger {
    pub state: StudentBillingState,
    pub last_payment: Option<Invoice>,
}

impl StudentLedger {
    pub fn new(state: StudentBillingState, last_payment: Option<Invoice>) -> Self {
        Self { state, last_payment }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn invoice(student_id: StudentId, invoice_date: NaiveDate, amount: i64) -> Invoice {
        Invoice {
            invoice_id: Uuid::new_v4(),
            student_id,
            hostel_id: Uuid::nil(),
            invoice_date,
            amount: Money::from_major(amount),
            period: PaymentPeriod::SixMonths,
            method: PaymentMethod::Online {
                transaction_id: "TXN-1".to_string(),
                date: invoice_date,
            },
            academic_code: AcademicPeriodCode::classify(invoice_date),
            remarks: None,
            recorded_at: Utc::now(),
        }
    }

    #[test]
    fn test_new_student_has_no_due_date() {
        let state = StudentBillingState::new(Uuid::new_v4(), Uuid::new_v4(), date(2024, 1, 10));
        assert!(!state.has_paid());
        assert_eq!(state.due_date, None);
    }

    #[test]
    fn test_due_date_is_monotonic() {
        let mut state = StudentBillingState::new(Uuid::new_v4(), Uuid::new_v4(), date(2024, 1, 10))
            .with_due_date(date(2024, 7, 10));

        state.advance_due_date(date(2025, 1, 10)).unwrap();
        assert_eq!(state.due_date, Some(date(2025, 1, 10)));

        // same date is allowed
        state.advance_due_date(date(2025, 1, 10)).unwrap();

        let err = state.advance_due_date(date(2024, 12, 31)).unwrap_err();
        assert!(matches!(err, BillingError::DueDateRegression { .. }));
        assert_eq!(state.due_date, Some(date(2025, 1, 10)));
    }

    #[test]
    fn test_latest_invoice() {
        let student = Uuid::new_v4();
        let invoices = vec![
            invoice(student, date(2024, 1, 5), 100),
            invoice(student, date(2024, 7, 5), 200),
            invoice(student, date(2024, 3, 5), 300),
        ];
        let latest = latest_invoice(&invoices).unwrap();
        assert_eq!(latest.amount, Money::from_major(200));

        assert!(latest_invoice(&Vec::<Invoice>::new()).is_none());
    }

    #[test]
    fn test_latest_invoice_tie_prefers_later_record() {
        let student = Uuid::new_v4();
        let invoices = vec![
            invoice(student, date(2024, 7, 5), 100),
            invoice(student, date(2024, 7, 5), 200),
        ];
        assert_eq!(latest_invoice(&invoices).unwrap().amount, Money::from_major(200));
    }
}
