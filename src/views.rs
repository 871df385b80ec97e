/// serializable views of engine output
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::dues::{DueStatus, DuesSummary, OrganizationDues};
use crate::invoice::PaymentReceipt;
use crate::types::{HostelId, InvoiceId, PaymentMethodKind, StudentId};

/// last payment as shown to staff
#[derive(Debug, Serialize, Deserialize)]
pub struct LastPaymentView {
    pub date: NaiveDate,
    pub amount: Money,
    pub period_months: u32,
    pub academic_code: String,
    pub academic_period: String,
}

/// one student's dues
#[derive(Debug, Serialize, Deserialize)]
pub struct DueStatusView {
    pub student_id: StudentId,
    pub has_dues: bool,
    pub due_amount: Money,
    pub next_due_date: NaiveDate,
    pub days_overdue: u32,
    pub last_payment: Option<LastPaymentView>,
}

impl DueStatusView {
    pub fn from_status(status: &DueStatus) -> Self {
        DueStatusView {
            student_id: status.student_id,
            has_dues: status.has_dues,
            due_amount: status.due_amount,
            next_due_date: status.next_due_date,
            days_overdue: status.days_overdue,
            last_payment: status.last_payment.as_ref().map(|last| LastPaymentView {
                date: last.date,
                amount: last.amount,
                period_months: last.period.months(),
                academic_code: last.academic_code.to_string(),
                academic_period: last.academic_code.label(),
            }),
        }
    }

    /// convert to pretty-printed json string
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// hostel-level dues listing
#[derive(Debug, Serialize, Deserialize)]
pub struct DuesSummaryView {
    pub hostel_id: Option<HostelId>,
    pub total_students: usize,
    pub count: usize,
    pub total_due_amount: Money,
    pub percentage_with_dues: u32,
    pub students: Vec<DueStatusView>,
}

impl DuesSummaryView {
    pub fn from_summary(hostel_id: Option<HostelId>, summary: &DuesSummary) -> Self {
        DuesSummaryView {
            hostel_id,
            total_students: summary.total_students,
            count: summary.count,
            total_due_amount: summary.total_due_amount,
            percentage_with_dues: summary.percentage_with_dues,
            students: summary.per_student.iter().map(DueStatusView::from_status).collect(),
        }
    }

    /// one entry per hostel, without student detail
    pub fn from_organization(rollup: &OrganizationDues) -> Vec<Self> {
        rollup
            .hostels
            .iter()
            .map(|h| DuesSummaryView {
                students: Vec::new(),
                ..DuesSummaryView::from_summary(Some(h.hostel_id), &h.summary)
            })
            .collect()
    }

    /// convert to pretty-printed json string
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// result relayed to whoever submitted a payment
#[derive(Debug, Serialize, Deserialize)]
pub struct ReceiptView {
    pub invoice_id: InvoiceId,
    pub new_due_date: NaiveDate,
    pub academic_code: String,
    pub academic_period: String,
    pub amount: Money,
    pub scheduled_fee: Money,
    pub method: PaymentMethodKind,
    pub reference: String,
}

impl ReceiptView {
    pub fn from_receipt(receipt: &PaymentReceipt) -> Self {
        ReceiptView {
            invoice_id: receipt.invoice_id,
            new_due_date: receipt.new_due_date,
            academic_code: receipt.academic_code.to_string(),
            academic_period: receipt.academic_code.label(),
            amount: receipt.invoice.amount,
            scheduled_fee: receipt.scheduled_fee,
            method: receipt.invoice.method.kind(),
            reference: receipt.invoice.method.reference().to_string(),
        }
    }

    /// convert to pretty-printed json string
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
