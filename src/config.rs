use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{BillingError, Result};
use crate::types::PaymentMethodKind;

/// largest utc offset in use anywhere, in minutes
const MAX_UTC_OFFSET_MINUTES: i32 = 14 * 60;

/// billing configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillingConfig {
    /// offset of the organization's local calendar from utc
    pub utc_offset_minutes: i32,
    /// payment channels the desk accepts
    pub enabled_methods: Vec<PaymentMethodKind>,
    /// cap on overdue listings, `None` for no cap
    #[serde(default)]
    pub overdue_listing_limit: Option<usize>,
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self::standard()
    }
}

impl BillingConfig {
    /// india standard time, both channels, no listing cap
    pub fn standard() -> Self {
        Self {
            utc_offset_minutes: 330,
            enabled_methods: vec![PaymentMethodKind::Cheque, PaymentMethodKind::Online],
            overdue_listing_limit: None,
        }
    }

    /// utc calendar, both channels
    pub fn utc() -> Self {
        Self {
            utc_offset_minutes: 0,
            ..Self::standard()
        }
    }

    /// load from a json document and validate it
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: BillingConfig =
            serde_json::from_str(json).map_err(|e| BillingError::InvalidConfiguration {
                message: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.utc_offset_minutes.abs() > MAX_UTC_OFFSET_MINUTES {
            return Err(BillingError::InvalidConfiguration {
                message: format!("utc offset {} minutes out of range", self.utc_offset_minutes),
            });
        }
        if self.enabled_methods.is_empty() {
            return Err(BillingError::InvalidConfiguration {
                message: "at least one payment method must be enabled".to_string(),
            });
        }
        Ok(())
    }

    fn offset(&self) -> Result<FixedOffset> {
        FixedOffset::east_opt(self.utc_offset_minutes * 60).ok_or_else(|| {
            BillingError::InvalidConfiguration {
                message: format!("utc offset {} minutes out of range", self.utc_offset_minutes),
            }
        })
    }

    /// local calendar date of an instant
    pub fn local_date(&self, instant: DateTime<Utc>) -> Result<NaiveDate> {
        Ok(instant.with_timezone(&self.offset()?).date_naive())
    }
}
