use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::errors::{BillingError, Result};
use crate::events::{Event, EventStore};
use crate::invoice::submission::{PaymentSubmission, ValidatedPayment};
use crate::period::{academic_code_for_payment, project, AcademicPeriodCode, Projection};
use crate::state::{Invoice, StudentBillingState};
use crate::store::BillingStore;
use crate::decimal::Money;
use crate::types::{FeeSchedule, InvoiceId, PaymentMethodKind};

/// invoice and projection computed for a payment, not yet persisted
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedPayment {
    pub invoice: Invoice,
    pub previous_due_date: Option<NaiveDate>,
    pub projection: Projection,
}

/// outcome of a recorded payment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentReceipt {
    pub invoice_id: InvoiceId,
    pub new_due_date: NaiveDate,
    pub academic_code: AcademicPeriodCode,
    pub grace_forfeited: bool,
    /// hostel fee for the period paid, for comparison with the amount
    pub scheduled_fee: Money,
    pub invoice: Invoice,
}

/// build the invoice and new due date for a validated payment
///
/// The academic code labels the period being paid for: it is classified from
/// the day after the prior due date (or the invoice date on a first payment).
pub fn prepare_payment(
    payment: ValidatedPayment,
    prior: &StudentBillingState,
    now: NaiveDate,
    recorded_at: DateTime<Utc>,
) -> Result<PreparedPayment> {
    if payment.student_id != prior.student_id {
        return Err(BillingError::StudentNotFound { id: payment.student_id });
    }

    let academic_code = academic_code_for_payment(prior.due_date, payment.invoice_date)?;
    let projection = project(prior.due_date, payment.invoice_date, payment.period, now)?;

    let invoice = Invoice {
        invoice_id: Uuid::new_v4(),
        student_id: prior.student_id,
        hostel_id: prior.hostel_id,
        invoice_date: payment.invoice_date,
        amount: payment.amount,
        period: payment.period,
        method: payment.method,
        academic_code,
        remarks: payment.remarks,
        recorded_at,
    };

    Ok(PreparedPayment {
        invoice,
        previous_due_date: prior.due_date,
        projection,
    })
}

/// validates submissions and persists payments through a store
pub struct InvoiceRecorder<'a, S: BillingStore> {
    store: &'a S,
    fees: &'a FeeSchedule,
    enabled_methods: &'a [PaymentMethodKind],
}

impl<'a, S: BillingStore> InvoiceRecorder<'a, S> {
    pub fn new(store: &'a S, fees: &'a FeeSchedule, enabled_methods: &'a [PaymentMethodKind]) -> Self {
        Self {
            store,
            fees,
            enabled_methods,
        }
    }

    /// validate, project and persist a payment
    ///
    /// Nothing is written unless every check passes; a store failure is
    /// reported and never retried. The commit is refused if the student's due
    /// date changed after `prior` was read.
    pub fn record_payment(
        &self,
        submission: &PaymentSubmission,
        prior: &StudentBillingState,
        now: NaiveDate,
        recorded_at: DateTime<Utc>,
        events: &mut EventStore,
    ) -> Result<PaymentReceipt> {
        let prepared = submission
            .validate(self.enabled_methods)
            .and_then(|payment| prepare_payment(payment, prior, now, recorded_at));

        let prepared = match prepared {
            Ok(prepared) => prepared,
            Err(err) => {
                warn!(student_id = %submission.student_id, error = %err, "payment rejected");
                events.emit(Event::PaymentRejected {
                    student_id: submission.student_id,
                    reason: err.to_string(),
                    timestamp: recorded_at,
                });
                return Err(err);
            }
        };

        let PreparedPayment {
            invoice,
            previous_due_date,
            projection,
        } = prepared;

        let committed = self
            .store
            .commit_payment(&invoice, previous_due_date, projection.new_due_date);
        if let Err(err) = committed {
            error!(
                student_id = %invoice.student_id,
                invoice_id = %invoice.invoice_id,
                error = %err,
                "failed to persist payment"
            );
            return Err(err);
        }

        info!(
            student_id = %invoice.student_id,
            invoice_id = %invoice.invoice_id,
            academic_code = %invoice.academic_code,
            new_due_date = %projection.new_due_date,
            grace_forfeited = projection.grace_forfeited,
            "payment recorded"
        );

        events.emit(Event::PaymentRecorded {
            invoice_id: invoice.invoice_id,
            student_id: invoice.student_id,
            hostel_id: invoice.hostel_id,
            amount: invoice.amount,
            period: invoice.period,
            academic_code: invoice.academic_code,
            timestamp: recorded_at,
        });
        events.emit(Event::DueDateAdvanced {
            student_id: invoice.student_id,
            previous_due_date,
            new_due_date: projection.new_due_date,
            grace_forfeited: projection.grace_forfeited,
            timestamp: recorded_at,
        });

        Ok(PaymentReceipt {
            invoice_id: invoice.invoice_id,
            new_due_date: projection.new_due_date,
            academic_code: invoice.academic_code,
            grace_forfeited: projection.grace_forfeited,
            scheduled_fee: self.fees.fee_for(invoice.period),
            invoice,
        })
    }
}
