use chrono::{Days, Months, NaiveDate};

use crate::errors::{BillingError, Result};
use crate::period::academic::AcademicPeriodCode;
use crate::types::PaymentPeriod;

/// add calendar months, clamping to the last valid day of the target month
///
/// Jan 31 + 1 month is Feb 28 (Feb 29 in leap years).
pub fn add_months(date: NaiveDate, months: u32) -> Result<NaiveDate> {
    date.checked_add_months(Months::new(months))
        .ok_or_else(|| BillingError::InvalidDate {
            message: format!("{} + {} months is out of range", date, months),
        })
}

/// date the previous period is counted from: stored due date, else invoice date
pub fn baseline(previous_due_date: Option<NaiveDate>, invoice_date: NaiveDate) -> NaiveDate {
    previous_due_date.unwrap_or(invoice_date)
}

/// first day of the period being paid for
pub fn billing_period_start(
    previous_due_date: Option<NaiveDate>,
    invoice_date: NaiveDate,
) -> Result<NaiveDate> {
    let base = baseline(previous_due_date, invoice_date);
    base.checked_add_days(Days::new(1))
        .ok_or_else(|| BillingError::InvalidDate {
            message: format!("no day after {}", base),
        })
}

/// academic code of the period being paid for, not of the invoice date
pub fn academic_code_for_payment(
    previous_due_date: Option<NaiveDate>,
    invoice_date: NaiveDate,
) -> Result<AcademicPeriodCode> {
    billing_period_start(previous_due_date, invoice_date).map(AcademicPeriodCode::classify)
}

/// projection outcome with the anchor actually used
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Projection {
    pub new_due_date: NaiveDate,
    /// date the new period was counted from
    pub effective_start: NaiveDate,
    /// a stale due date was discarded in favour of `now`
    pub grace_forfeited: bool,
}

/// compute the next due date after a payment
///
/// Counting starts from the later of the baseline and `now`, so a late
/// payment never yields a due date that is already past and an overdue
/// student forfeits the days between the old due date and today.
pub fn project(
    previous_due_date: Option<NaiveDate>,
    invoice_date: NaiveDate,
    period: PaymentPeriod,
    now: NaiveDate,
) -> Result<Projection> {
    let base = baseline(previous_due_date, invoice_date);
    let effective_start = base.max(now);
    let new_due_date = add_months(effective_start, period.months())?;

    Ok(Projection {
        new_due_date,
        effective_start,
        grace_forfeited: base < now,
    })
}

/// next due date only
pub fn project_due_date(
    previous_due_date: Option<NaiveDate>,
    invoice_date: NaiveDate,
    period: PaymentPeriod,
    now: NaiveDate,
) -> Result<NaiveDate> {
    project(previous_due_date, invoice_date, period, now).map(|p| p.new_due_date)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_late_payment_anchors_to_now() {
        let projection = project(
            Some(date(2024, 1, 10)),
            date(2024, 6, 1),
            PaymentPeriod::SixMonths,
            date(2024, 6, 1),
        )
        .unwrap();

        assert_eq!(projection.new_due_date, date(2024, 12, 1));
        assert_eq!(projection.effective_start, date(2024, 6, 1));
        assert!(projection.grace_forfeited);
    }

    #[test]
    fn test_early_payment_keeps_banked_period() {
        let due = project_due_date(
            Some(date(2025, 3, 1)),
            date(2025, 1, 1),
            PaymentPeriod::TwelveMonths,
            date(2025, 1, 1),
        )
        .unwrap();

        assert_eq!(due, date(2026, 3, 1));
    }

    #[test]
    fn test_payment_on_due_date_is_not_late() {
        let projection = project(
            Some(date(2025, 3, 1)),
            date(2025, 3, 1),
            PaymentPeriod::SixMonths,
            date(2025, 3, 1),
        )
        .unwrap();

        assert_eq!(projection.new_due_date, date(2025, 9, 1));
        assert!(!projection.grace_forfeited);
    }

    #[test]
    fn test_first_payment_uses_invoice_date() {
        let due = project_due_date(None, date(2024, 8, 15), PaymentPeriod::SixMonths, date(2024, 8, 15))
            .unwrap();
        assert_eq!(due, date(2025, 2, 15));
    }

    #[test]
    fn test_backdated_first_invoice_counts_from_now() {
        let due = project_due_date(None, date(2024, 7, 1), PaymentPeriod::SixMonths, date(2024, 8, 1))
            .unwrap();
        assert_eq!(due, date(2025, 2, 1));
    }

    #[test]
    fn test_month_end_clamps() {
        assert_eq!(add_months(date(2024, 1, 31), 1).unwrap(), date(2024, 2, 29));
        assert_eq!(add_months(date(2023, 8, 31), 6).unwrap(), date(2024, 2, 29));
        assert_eq!(add_months(date(2025, 8, 31), 6).unwrap(), date(2026, 2, 28));
        assert_eq!(add_months(date(2024, 2, 29), 12).unwrap(), date(2025, 2, 28));
    }

    #[test]
    fn test_academic_code_uses_day_after_baseline() {
        let code = academic_code_for_payment(Some(date(2024, 1, 10)), date(2024, 6, 1)).unwrap();
        assert_eq!(code.to_string(), "23242");

        // due date on the last day of may rolls into the next academic year
        let code = academic_code_for_payment(Some(date(2024, 5, 31)), date(2024, 5, 20)).unwrap();
        assert_eq!(code.to_string(), "24251");

        let code = academic_code_for_payment(None, date(2024, 11, 30)).unwrap();
        assert_eq!(code.to_string(), "24252");
    }
}
