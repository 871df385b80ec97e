use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::errors::{BillingError, Result};
use crate::state::{latest_invoice, Invoice, StudentBillingState, StudentLedger};
use crate::types::{Hostel, HostelId, InvoiceId, StudentId};

/// persistence collaborator supplying records to the engine
///
/// `commit_payment` must apply the invoice insert and the due date update as
/// one unit: readers never observe one without the other. Due date writes are
/// conditional on the value the caller read, so a stale read never moves a
/// due date backwards or swallows another payment's period.
pub trait BillingStore {
    fn hostel(&self, id: HostelId) -> Result<Hostel>;

    fn hostels(&self) -> Result<Vec<Hostel>>;

    fn student(&self, id: StudentId) -> Result<StudentBillingState>;

    fn invoice(&self, id: InvoiceId) -> Result<Invoice>;

    /// invoices of one student in recording order
    fn invoices_for_student(&self, student_id: StudentId) -> Result<Vec<Invoice>>;

    /// invoices of every student in a hostel, in recording order
    fn invoices_for_hostel(&self, hostel_id: HostelId) -> Result<Vec<Invoice>>;

    /// every student of a hostel paired with their latest invoice
    fn ledgers_for_hostel(&self, hostel_id: HostelId) -> Result<Vec<StudentLedger>>;

    /// insert the invoice and set the student's due date atomically, provided
    /// the stored due date still equals `expected_due_date`
    fn commit_payment(
        &self,
        invoice: &Invoice,
        expected_due_date: Option<NaiveDate>,
        new_due_date: NaiveDate,
    ) -> Result<()>;

    /// overwrite a student's due date outside the payment flow; never earlier
    /// than the stored one
    fn set_due_date(&self, student_id: StudentId, due_date: NaiveDate) -> Result<()>;

    /// replace the non-financial remarks of an invoice
    fn update_remarks(&self, invoice_id: InvoiceId, remarks: Option<String>) -> Result<Invoice>;
}

#[derive(Debug, Default)]
struct Tables {
    hostels: HashMap<HostelId, Hostel>,
    students: HashMap<StudentId, StudentBillingState>,
    invoices: Vec<Invoice>,
}

/// in-memory store; one lock guards all tables
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>> {
        self.tables.read().map_err(|_| BillingError::StorageFailure {
            message: "store lock poisoned".to_string(),
        })
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>> {
        self.tables.write().map_err(|_| BillingError::StorageFailure {
            message: "store lock poisoned".to_string(),
        })
    }

    pub fn insert_hostel(&self, hostel: Hostel) -> Result<()> {
        self.write()?.hostels.insert(hostel.id, hostel);
        Ok(())
    }

    /// register a student; the hostel must exist
    pub fn insert_student(&self, student: StudentBillingState) -> Result<()> {
        let mut tables = self.write()?;
        if !tables.hostels.contains_key(&student.hostel_id) {
            return Err(BillingError::HostelNotFound { id: student.hostel_id });
        }
        tables.students.insert(student.student_id, student);
        Ok(())
    }
}

impl BillingStore for MemoryStore {
    fn hostel(&self, id: HostelId) -> Result<Hostel> {
        self.read()?
            .hostels
            .get(&id)
            .cloned()
            .ok_or(BillingError::HostelNotFound { id })
    }

    fn hostels(&self) -> Result<Vec<Hostel>> {
        let mut hostels: Vec<Hostel> = self.read()?.hostels.values().cloned().collect();
        hostels.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(hostels)
    }

    fn student(&self, id: StudentId) -> Result<StudentBillingState> {
        self.read()?
            .students
            .get(&id)
            .cloned()
            .ok_or(BillingError::StudentNotFound { id })
    }

    fn invoice(&self, id: InvoiceId) -> Result<Invoice> {
        self.read()?
            .invoices
            .iter()
            .find(|inv| inv.invoice_id == id)
            .cloned()
            .ok_or(BillingError::InvoiceNotFound { id })
    }

    fn invoices_for_student(&self, student_id: StudentId) -> Result<Vec<Invoice>> {
        Ok(self
            .read()?
            .invoices
            .iter()
            .filter(|inv| inv.student_id == student_id)
            .cloned()
            .collect())
    }

    fn invoices_for_hostel(&self, hostel_id: HostelId) -> Result<Vec<Invoice>> {
        Ok(self
            .read()?
            .invoices
            .iter()
            .filter(|inv| inv.hostel_id == hostel_id)
            .cloned()
            .collect())
    }

    fn ledgers_for_hostel(&self, hostel_id: HostelId) -> Result<Vec<StudentLedger>> {
        let tables = self.read()?;
        let mut students: Vec<&StudentBillingState> = tables
            .students
            .values()
            .filter(|s| s.hostel_id == hostel_id)
            .collect();
        students.sort_by_key(|s| (s.admission_date, s.student_id));

        Ok(students
            .into_iter()
            .map(|state| {
                let last = latest_invoice(
                    tables
                        .invoices
                        .iter()
                        .filter(|inv| inv.student_id == state.student_id),
                );
                StudentLedger::new(state.clone(), last.cloned())
            })
            .collect())
    }

    fn commit_payment(
        &self,
        invoice: &Invoice,
        expected_due_date: Option<NaiveDate>,
        new_due_date: NaiveDate,
    ) -> Result<()> {
        let mut guard = self.write()?;
        let tables = &mut *guard;

        // check everything before touching either table
        if tables.invoices.iter().any(|inv| inv.invoice_id == invoice.invoice_id) {
            return Err(BillingError::StorageFailure {
                message: format!("duplicate invoice id {}", invoice.invoice_id),
            });
        }
        let student = tables
            .students
            .get_mut(&invoice.student_id)
            .ok_or(BillingError::StudentNotFound { id: invoice.student_id })?;
        if student.hostel_id != invoice.hostel_id {
            return Err(BillingError::StorageFailure {
                message: format!(
                    "invoice {} hostel does not match student {}",
                    invoice.invoice_id, invoice.student_id
                ),
            });
        }
        if student.due_date != expected_due_date {
            return Err(BillingError::StaleDueDate {
                id: invoice.student_id,
                expected: expected_due_date,
                current: student.due_date,
            });
        }
        student.advance_due_date(new_due_date)?;
        tables.invoices.push(invoice.clone());
        Ok(())
    }

    fn set_due_date(&self, student_id: StudentId, due_date: NaiveDate) -> Result<()> {
        let mut tables = self.write()?;
        let student = tables
            .students
            .get_mut(&student_id)
            .ok_or(BillingError::StudentNotFound { id: student_id })?;
        student.advance_due_date(due_date)
    }

    fn update_remarks(&self, invoice_id: InvoiceId, remarks: Option<String>) -> Result<Invoice> {
        let mut tables = self.write()?;
        let invoice = tables
            .invoices
            .iter_mut()
            .find(|inv| inv.invoice_id == invoice_id)
            .ok_or(BillingError::InvoiceNotFound { id: invoice_id })?;
        invoice.remarks = remarks;
        Ok(invoice.clone())
    }
}
