pub mod config;
pub mod decimal;
pub mod desk;
pub mod dues;
pub mod errors;
pub mod events;
pub mod invoice;
pub mod period;
pub mod state;
pub mod store;
pub mod types;
pub mod views;

// re-export key types
pub use config::BillingConfig;
pub use decimal::Money;
pub use desk::BillingDesk;
pub use dues::{
    aggregate, aggregate_organization, collections_by_period, evaluate, DueStatus, DuesSummary,
    HostelDues, HostelLedgers, LastPayment, OrganizationDues, PeriodCollection,
};
pub use errors::{BillingError, ErrorKind, Result};
pub use events::{Event, EventStore};
pub use invoice::{
    prepare_payment, InvoiceRecorder, MethodDetails, PaymentReceipt, PaymentSubmission, RawScalar,
};
pub use period::{classify, project, project_due_date, AcademicPeriodCode, Half, Projection};
pub use state::{Invoice, StudentBillingState, StudentLedger};
pub use store::{BillingStore, MemoryStore};
pub use types::{
    Actor, FeeSchedule, Hostel, HostelId, InvoiceId, PaymentMethod, PaymentMethodKind,
    PaymentPeriod, StudentId,
};
pub use views::{DueStatusView, DuesSummaryView, ReceiptView};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;
