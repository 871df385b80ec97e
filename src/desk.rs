use chrono::{DateTime, NaiveDate, Utc};
use hourglass_rs::SafeTimeProvider;
use tracing::{debug, info, warn};

use crate::config::BillingConfig;
use crate::dues::{
    aggregate, aggregate_organization, collections_by_period, evaluate, DueStatus, DuesSummary,
    HostelLedgers, OrganizationDues, PeriodCollection,
};
use crate::errors::{BillingError, Result};
use crate::events::{Event, EventStore};
use crate::invoice::{InvoiceRecorder, PaymentReceipt, PaymentSubmission};
use crate::state::{latest_invoice, Invoice, StudentBillingState};
use crate::store::BillingStore;
use crate::types::{Actor, HostelId, InvoiceId, StudentId};

/// entry point used by the service layer
///
/// Reads the clock once per call and threads that single date through every
/// evaluation, so a batch never straddles midnight.
pub struct BillingDesk<S: BillingStore> {
    pub config: BillingConfig,
    pub events: EventStore,
    store: S,
}

impl<S: BillingStore> BillingDesk<S> {
    /// create a desk over a store
    pub fn new(config: BillingConfig, store: S) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            events: EventStore::new(),
            store,
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// current instant and the local calendar date it falls on
    fn clock(&self, time: &SafeTimeProvider) -> Result<(DateTime<Utc>, NaiveDate)> {
        let instant = time.now();
        Ok((instant, self.config.local_date(instant)?))
    }

    fn authorize(&self, actor: Actor, hostel_id: HostelId, target: String) -> Result<()> {
        match actor {
            Actor::Hostel(own) if !actor.can_access(hostel_id) => {
                warn!(actor_hostel = %own, resource = %target, "cross-hostel access denied");
                Err(BillingError::Unauthorized {
                    actor_hostel: own,
                    target,
                })
            }
            _ => Ok(()),
        }
    }

    fn require_organization(&self, actor: Actor, target: &str) -> Result<()> {
        match actor {
            Actor::Organization => Ok(()),
            Actor::Hostel(own) => {
                warn!(actor_hostel = %own, resource = target, "organization-level access denied");
                Err(BillingError::Unauthorized {
                    actor_hostel: own,
                    target: target.to_string(),
                })
            }
        }
    }

    /// student the actor is allowed to see
    fn scoped_student(&self, actor: Actor, student_id: StudentId) -> Result<StudentBillingState> {
        let student = self.store.student(student_id)?;
        self.authorize(actor, student.hostel_id, format!("student {}", student_id))?;
        Ok(student)
    }

    /// dues of a single student
    pub fn student_dues(
        &self,
        actor: Actor,
        student_id: StudentId,
        time: &SafeTimeProvider,
    ) -> Result<DueStatus> {
        let student = self.scoped_student(actor, student_id)?;
        let hostel = self.store.hostel(student.hostel_id)?;
        let invoices = self.store.invoices_for_student(student_id)?;
        let (_, now) = self.clock(time)?;

        Ok(evaluate(&student, &hostel.fees, latest_invoice(&invoices), now))
    }

    /// dues of every student in a hostel
    pub fn hostel_dues(
        &self,
        actor: Actor,
        hostel_id: HostelId,
        time: &SafeTimeProvider,
    ) -> Result<DuesSummary> {
        self.authorize(actor, hostel_id, format!("hostel {}", hostel_id))?;
        let hostel = self.store.hostel(hostel_id)?;
        let ledgers = self.store.ledgers_for_hostel(hostel_id)?;
        let (_, now) = self.clock(time)?;

        let summary = aggregate(&ledgers, &hostel.fees, now);
        debug!(
            hostel_id = %hostel_id,
            students = summary.total_students,
            with_dues = summary.count,
            "hostel dues aggregated"
        );
        Ok(summary)
    }

    /// students of a hostel with dues, most overdue first, capped by config
    pub fn overdue_students(
        &self,
        actor: Actor,
        hostel_id: HostelId,
        time: &SafeTimeProvider,
    ) -> Result<Vec<DueStatus>> {
        let summary = self.hostel_dues(actor, hostel_id, time)?;
        Ok(summary
            .overdue_students(self.config.overdue_listing_limit)
            .into_iter()
            .cloned()
            .collect())
    }

    /// organization-wide rollup; each hostel is evaluated with its own fees
    pub fn organization_dues(&self, actor: Actor, time: &SafeTimeProvider) -> Result<OrganizationDues> {
        self.require_organization(actor, "organization dues")?;

        let groups = self
            .store
            .hostels()?
            .into_iter()
            .map(|hostel| {
                let students = self.store.ledgers_for_hostel(hostel.id)?;
                Ok(HostelLedgers { hostel, students })
            })
            .collect::<Result<Vec<_>>>()?;
        let (_, now) = self.clock(time)?;

        let rollup = aggregate_organization(&groups, now);
        debug!(
            hostels = rollup.hostels.len(),
            students = rollup.total_students,
            with_dues = rollup.count,
            "organization dues aggregated"
        );
        Ok(rollup)
    }

    /// record a payment and advance the student's due date
    pub fn record_payment(
        &mut self,
        actor: Actor,
        submission: &PaymentSubmission,
        time: &SafeTimeProvider,
    ) -> Result<PaymentReceipt> {
        let student = self.scoped_student(actor, submission.student_id)?;
        let hostel = self.store.hostel(student.hostel_id)?;
        let (instant, now) = self.clock(time)?;

        let recorder = InvoiceRecorder::new(&self.store, &hostel.fees, &self.config.enabled_methods);
        recorder.record_payment(submission, &student, now, instant, &mut self.events)
    }

    /// replace an invoice's remarks; financial fields stay untouched
    pub fn annotate_invoice(
        &mut self,
        actor: Actor,
        invoice_id: InvoiceId,
        remarks: Option<&str>,
        time: &SafeTimeProvider,
    ) -> Result<Invoice> {
        let invoice = self.store.invoice(invoice_id)?;
        self.authorize(actor, invoice.hostel_id, format!("invoice {}", invoice_id))?;

        let remarks = remarks.map(str::trim).filter(|r| !r.is_empty()).map(str::to_string);
        let updated = self.store.update_remarks(invoice_id, remarks.clone())?;

        self.events.emit(Event::InvoiceAnnotated {
            invoice_id,
            remarks,
            timestamp: time.now(),
        });
        Ok(updated)
    }

    /// set a due date directly, refusing to move it backwards
    pub fn override_due_date(
        &mut self,
        actor: Actor,
        student_id: StudentId,
        new_due_date: NaiveDate,
        time: &SafeTimeProvider,
    ) -> Result<StudentBillingState> {
        let mut student = self.scoped_student(actor, student_id)?;
        let previous_due_date = student.due_date;
        student.advance_due_date(new_due_date)?;
        self.store.set_due_date(student_id, new_due_date)?;

        info!(
            student_id = %student_id,
            previous = ?previous_due_date,
            new_due_date = %new_due_date,
            "due date overridden"
        );
        self.events.emit(Event::DueDateOverridden {
            student_id,
            previous_due_date,
            new_due_date,
            timestamp: time.now(),
        });
        Ok(student)
    }

    /// money collected per academic half for a hostel
    pub fn collections_by_period(
        &self,
        actor: Actor,
        hostel_id: HostelId,
    ) -> Result<Vec<PeriodCollection>> {
        self.authorize(actor, hostel_id, format!("hostel {}", hostel_id))?;
        self.store.hostel(hostel_id)?;
        let invoices = self.store.invoices_for_hostel(hostel_id)?;
        Ok(collections_by_period(&invoices))
    }
}
