use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::period::AcademicPeriodCode;
use crate::types::{HostelId, InvoiceId, PaymentPeriod, StudentId};

/// audit events emitted by the billing desk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    // payment events
    PaymentRecorded {
        invoice_id: InvoiceId,
        student_id: StudentId,
        hostel_id: HostelId,
        amount: Money,
        period: PaymentPeriod,
        academic_code: AcademicPeriodCode,
        timestamp: DateTime<Utc>,
    },
    PaymentRejected {
        student_id: StudentId,
        reason: String,
        timestamp: DateTime<Utc>,
    },

    // due date events
    DueDateAdvanced {
        student_id: StudentId,
        previous_due_date: Option<NaiveDate>,
        new_due_date: NaiveDate,
        grace_forfeited: bool,
        timestamp: DateTime<Utc>,
    },
    DueDateOverridden {
        student_id: StudentId,
        previous_due_date: Option<NaiveDate>,
        new_due_date: NaiveDate,
        timestamp: DateTime<Utc>,
    },

    // annotation events
    InvoiceAnnotated {
        invoice_id: InvoiceId,
        remarks: Option<String>,
        timestamp: DateTime<Utc>,
    },
}

impl Event {
    /// student the event concerns; annotations are keyed by invoice only
    pub fn student_id(&self) -> Option<StudentId> {
        match self {
            Event::PaymentRecorded { student_id, .. }
            | Event::PaymentRejected { student_id, .. }
            | Event::DueDateAdvanced { student_id, .. }
            | Event::DueDateOverridden { student_id, .. } => Some(*student_id),
            Event::InvoiceAnnotated { .. } => None,
        }
    }
}

/// event store for collecting events during operations
#[derive(Debug, Default)]
pub struct EventStore {
    events: Vec<Event>,
}

impl EventStore {
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
        }
    }

    pub fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// audit trail of one student, oldest first
    pub fn for_student(&self, student_id: StudentId) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|event| event.student_id() == Some(student_id))
            .collect()
    }
}
