use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::period::AcademicPeriodCode;
use crate::state::{Invoice, StudentBillingState, StudentLedger};
use crate::types::{FeeSchedule, HostelId, PaymentPeriod, StudentId};

/// last payment fields passed through for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastPayment {
    pub date: NaiveDate,
    pub amount: Money,
    pub period: PaymentPeriod,
    pub academic_code: AcademicPeriodCode,
}

impl From<&Invoice> for LastPayment {
    fn from(invoice: &Invoice) -> Self {
        Self {
            date: invoice.invoice_date,
            amount: invoice.amount,
            period: invoice.period,
            academic_code: invoice.academic_code,
        }
    }
}

/// arrears view of one student relative to `now`; never stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DueStatus {
    pub student_id: StudentId,
    pub hostel_id: HostelId,
    pub has_dues: bool,
    pub due_amount: Money,
    pub next_due_date: NaiveDate,
    pub days_overdue: u32,
    pub last_payment: Option<LastPayment>,
}

fn days_between(from: NaiveDate, to: NaiveDate) -> u32 {
    (to - from).num_days().max(0) as u32
}

/// determine arrears for one student
///
/// A student who never paid is in arrears from the admission date. Otherwise
/// dues exist only once the due date is strictly before `now`. The quoted
/// amount is always the 6 month fee.
pub fn evaluate(
    state: &StudentBillingState,
    fees: &FeeSchedule,
    last_payment: Option<&Invoice>,
    now: NaiveDate,
) -> DueStatus {
    let (has_dues, next_due_date, days_overdue) = match state.due_date {
        None => (true, state.admission_date, days_between(state.admission_date, now)),
        Some(due_date) => {
            let overdue = due_date < now;
            let days = if overdue { days_between(due_date, now) } else { 0 };
            (overdue, due_date, days)
        }
    };

    DueStatus {
        student_id: state.student_id,
        hostel_id: state.hostel_id,
        has_dues,
        due_amount: if has_dues { fees.quoted_due() } else { Money::ZERO },
        next_due_date,
        days_overdue,
        last_payment: last_payment.map(LastPayment::from),
    }
}

/// evaluate a ledger entry
pub fn evaluate_ledger(ledger: &StudentLedger, fees: &FeeSchedule, now: NaiveDate) -> DueStatus {
    evaluate(&ledger.state, fees, ledger.last_payment.as_ref(), now)
}
