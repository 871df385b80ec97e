use chrono::NaiveDate;
use thiserror::Error;

use crate::types::{HostelId, InvoiceId, StudentId};

/// coarse error categories surfaced to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// malformed submission, rejected without any state change
    InvalidInput,
    /// referenced record does not exist
    NotFound,
    /// actor addressed another hostel's data
    Unauthorized,
    /// persistence layer failed, nothing was written
    StorageFailure,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BillingError {
    #[error("invalid payment period: {value} (expected 6 or 12)")]
    InvalidPeriod {
        value: String,
    },

    #[error("invalid payment method: {method}")]
    InvalidPaymentMethod {
        method: String,
    },

    #[error("payment method {method} is disabled")]
    PaymentMethodDisabled {
        method: String,
    },

    #[error("missing {field} for {method} payment")]
    MissingMethodDetail {
        method: String,
        field: &'static str,
    },

    #[error("invalid payment amount: {value}")]
    InvalidAmount {
        value: String,
    },

    #[error("invalid date: {message}")]
    InvalidDate {
        message: String,
    },

    #[error("invalid academic period code: {code}")]
    InvalidAcademicCode {
        code: String,
    },

    #[error("due date cannot move backwards: current {current}, requested {requested}")]
    DueDateRegression {
        current: NaiveDate,
        requested: NaiveDate,
    },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        message: String,
    },

    #[error("student not found: {id}")]
    StudentNotFound {
        id: StudentId,
    },

    #[error("hostel not found: {id}")]
    HostelNotFound {
        id: HostelId,
    },

    #[error("invoice not found: {id}")]
    InvoiceNotFound {
        id: InvoiceId,
    },

    #[error("unauthorized: actor scoped to hostel {actor_hostel} cannot access {target}")]
    Unauthorized {
        actor_hostel: HostelId,
        target: String,
    },

    #[error("storage failure: {message}")]
    StorageFailure {
        message: String,
    },

    #[error("due date of student {id} changed since it was read: expected {expected:?}, found {current:?}")]
    StaleDueDate {
        id: StudentId,
        expected: Option<NaiveDate>,
        current: Option<NaiveDate>,
    },
}

impl BillingError {
    /// map to the caller-facing category
    pub fn kind(&self) -> ErrorKind {
        match self {
            BillingError::InvalidPeriod { .. }
            | BillingError::InvalidPaymentMethod { .. }
            | BillingError::PaymentMethodDisabled { .. }
            | BillingError::MissingMethodDetail { .. }
            | BillingError::InvalidAmount { .. }
            | BillingError::InvalidDate { .. }
            | BillingError::InvalidAcademicCode { .. }
            | BillingError::DueDateRegression { .. }
            | BillingError::InvalidConfiguration { .. } => ErrorKind::InvalidInput,
            BillingError::StudentNotFound { .. }
            | BillingError::HostelNotFound { .. }
            | BillingError::InvoiceNotFound { .. } => ErrorKind::NotFound,
            BillingError::Unauthorized { .. } => ErrorKind::Unauthorized,
            BillingError::StorageFailure { .. } | BillingError::StaleDueDate { .. } => {
                ErrorKind::StorageFailure
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, BillingError>;
