use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::decimal::Money;
use crate::period::AcademicPeriodCode;
use crate::state::Invoice;
use crate::types::PaymentPeriod;

/// money collected for one academic half, keyed by the period paid for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodCollection {
    pub academic_code: AcademicPeriodCode,
    pub label: String,
    pub invoice_count: usize,
    pub total_amount: Money,
    pub six_month_invoices: usize,
    pub twelve_month_invoices: usize,
}

impl PeriodCollection {
    fn empty(academic_code: AcademicPeriodCode) -> Self {
        Self {
            academic_code,
            label: academic_code.label(),
            invoice_count: 0,
            total_amount: Money::ZERO,
            six_month_invoices: 0,
            twelve_month_invoices: 0,
        }
    }

    fn add(&mut self, invoice: &Invoice) {
        self.invoice_count += 1;
        self.total_amount += invoice.amount;
        match invoice.period {
            PaymentPeriod::SixMonths => self.six_month_invoices += 1,
            PaymentPeriod::TwelveMonths => self.twelve_month_invoices += 1,
        }
    }
}

/// group invoices by their stored academic code, oldest period first
pub fn collections_by_period<'a, I>(invoices: I) -> Vec<PeriodCollection>
where
    I: IntoIterator<Item = &'a Invoice>,
{
    let mut groups: BTreeMap<AcademicPeriodCode, PeriodCollection> = BTreeMap::new();
    for invoice in invoices {
        groups
            .entry(invoice.academic_code)
            .or_insert_with(|| PeriodCollection::empty(invoice.academic_code))
            .add(invoice);
    }
    groups.into_values().collect()
}
