use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::decimal::Money;
use crate::errors::BillingError;

/// unique identifier for a student
pub type StudentId = Uuid;

/// unique identifier for a hostel
pub type HostelId = Uuid;

/// unique identifier for an invoice
pub type InvoiceId = Uuid;

/// length of the period a payment covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum PaymentPeriod {
    SixMonths,
    TwelveMonths,
}

impl PaymentPeriod {
    /// number of calendar months covered
    pub fn months(&self) -> u32 {
        match self {
            PaymentPeriod::SixMonths => 6,
            PaymentPeriod::TwelveMonths => 12,
        }
    }
}

impl TryFrom<u32> for PaymentPeriod {
    type Error = BillingError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            6 => Ok(PaymentPeriod::SixMonths),
            12 => Ok(PaymentPeriod::TwelveMonths),
            other => Err(BillingError::InvalidPeriod { value: other.to_string() }),
        }
    }
}

impl From<PaymentPeriod> for u32 {
    fn from(period: PaymentPeriod) -> Self {
        period.months()
    }
}

impl FromStr for PaymentPeriod {
    type Err = BillingError;

    /// only the numerals "6" and "12" are accepted
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "6" => Ok(PaymentPeriod::SixMonths),
            "12" => Ok(PaymentPeriod::TwelveMonths),
            _ => Err(BillingError::InvalidPeriod { value: s.to_string() }),
        }
    }
}

impl fmt::Display for PaymentPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} months", self.months())
    }
}

/// supported payment channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethodKind {
    Cheque,
    Online,
}

impl PaymentMethodKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethodKind::Cheque => "cheque",
            PaymentMethodKind::Online => "online",
        }
    }
}

impl FromStr for PaymentMethodKind {
    type Err = BillingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cheque" => Ok(PaymentMethodKind::Cheque),
            "online" => Ok(PaymentMethodKind::Online),
            _ => Err(BillingError::InvalidPaymentMethod { method: s.to_string() }),
        }
    }
}

impl fmt::Display for PaymentMethodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// payment channel with the details that channel requires
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "lowercase")]
pub enum PaymentMethod {
    Cheque {
        number: String,
        date: NaiveDate,
        bank_name: String,
    },
    Online {
        transaction_id: String,
        date: NaiveDate,
    },
}

impl PaymentMethod {
    pub fn kind(&self) -> PaymentMethodKind {
        match self {
            PaymentMethod::Cheque { .. } => PaymentMethodKind::Cheque,
            PaymentMethod::Online { .. } => PaymentMethodKind::Online,
        }
    }

    /// cheque number or transaction id
    pub fn reference(&self) -> &str {
        match self {
            PaymentMethod::Cheque { number, .. } => number,
            PaymentMethod::Online { transaction_id, .. } => transaction_id,
        }
    }
}

/// flat fees charged per billing period, owned by a hostel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSchedule {
    pub fee_6_month: Money,
    pub fee_12_month: Money,
}

impl FeeSchedule {
    pub fn new(fee_6_month: Money, fee_12_month: Money) -> Self {
        Self { fee_6_month, fee_12_month }
    }

    /// fee for the given period
    pub fn fee_for(&self, period: PaymentPeriod) -> Money {
        match period {
            PaymentPeriod::SixMonths => self.fee_6_month,
            PaymentPeriod::TwelveMonths => self.fee_12_month,
        }
    }

    /// amount quoted as owed; always the 6 month fee
    pub fn quoted_due(&self) -> Money {
        self.fee_6_month
    }
}

/// hostel record as supplied by the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hostel {
    pub id: HostelId,
    pub name: String,
    pub fees: FeeSchedule,
}

/// who is asking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Actor {
    /// organization-wide administrator
    Organization,
    /// staff scoped to a single hostel
    Hostel(HostelId),
}

impl Actor {
    pub fn can_access(&self, hostel_id: HostelId) -> bool {
        match self {
            Actor::Organization => true,
            Actor::Hostel(own) => *own == hostel_id,
        }
    }
}
