pub mod aggregator;
pub mod collections;
pub mod evaluator;

pub use aggregator::{
    aggregate, aggregate_organization, percentage_with_dues, DuesSummary, HostelDues,
    HostelLedgers, OrganizationDues,
};
pub use collections::{collections_by_period, PeriodCollection};
pub use evaluator::{evaluate, evaluate_ledger, DueStatus, LastPayment};
