use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::BillingError;

/// first month of the academic year
pub const ACADEMIC_YEAR_START_MONTH: u32 = 6;

/// last month of the first half
const FIRST_HALF_END_MONTH: u32 = 11;

/// half of an academic year
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Half {
    /// june through november
    First,
    /// december through may
    Second,
}

impl Half {
    pub fn digit(&self) -> u8 {
        match self {
            Half::First => 1,
            Half::Second => 2,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Half::First => "First Half (Jun-Nov)",
            Half::Second => "Second Half (Dec-May)",
        }
    }
}

/// reporting code `YYyyH` for an academic half-year
///
/// `YY`/`yy` are the two-digit start and end years of a june-to-may academic
/// year and `H` is the half. Field order gives chronological ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AcademicPeriodCode {
    start_year: i32,
    half: Half,
}

impl AcademicPeriodCode {
    pub fn new(start_year: i32, half: Half) -> Self {
        Self { start_year, half }
    }

    /// classify a calendar date
    pub fn classify(date: NaiveDate) -> Self {
        let month = date.month();
        let start_year = if month >= ACADEMIC_YEAR_START_MONTH {
            date.year()
        } else {
            date.year() - 1
        };
        let half = if (ACADEMIC_YEAR_START_MONTH..=FIRST_HALF_END_MONTH).contains(&month) {
            Half::First
        } else {
            Half::Second
        };

        Self { start_year, half }
    }

    pub fn start_year(&self) -> i32 {
        self.start_year
    }

    pub fn end_year(&self) -> i32 {
        self.start_year + 1
    }

    pub fn half(&self) -> Half {
        self.half
    }

    /// display label, e.g. "2023-2024 Second Half (Dec-May)"
    ///
    /// Built from the two-digit code fields with a fixed "20" century prefix.
    pub fn label(&self) -> String {
        format!(
            "20{:02}-20{:02} {}",
            two_digit(self.start_year),
            two_digit(self.end_year()),
            self.half.label()
        )
    }
}

fn two_digit(year: i32) -> i32 {
    year.rem_euclid(100)
}

/// academic code for a date
pub fn classify(date: NaiveDate) -> AcademicPeriodCode {
    AcademicPeriodCode::classify(date)
}

impl fmt::Display for AcademicPeriodCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}{:02}{}",
            two_digit(self.start_year),
            two_digit(self.end_year()),
            self.half.digit()
        )
    }
}

impl FromStr for AcademicPeriodCode {
    type Err = BillingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || BillingError::InvalidAcademicCode { code: s.to_string() };

        if s.len() != 5 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let start: i32 = s[0..2].parse().map_err(|_| invalid())?;
        let end: i32 = s[2..4].parse().map_err(|_| invalid())?;
        if end != (start + 1) % 100 {
            return Err(invalid());
        }

        let half = match &s[4..5] {
            "1" => Half::First,
            "2" => Half::Second,
            _ => return Err(invalid()),
        };

        Ok(Self {
            start_year: 2000 + start,
            half,
        })
    }
}

impl TryFrom<String> for AcademicPeriodCode {
    type Error = BillingError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<AcademicPeriodCode> for String {
    fn from(code: AcademicPeriodCode) -> Self {
        code.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_first_half() {
        assert_eq!(classify(date(2024, 6, 1)).to_string(), "24251");
        assert_eq!(classify(date(2024, 11, 30)).to_string(), "24251");
    }

    #[test]
    fn test_second_half_spans_new_year() {
        assert_eq!(classify(date(2024, 12, 1)).to_string(), "24252");
        assert_eq!(classify(date(2025, 1, 15)).to_string(), "24252");
        assert_eq!(classify(date(2025, 5, 31)).to_string(), "24252");
    }

    #[test]
    fn test_day_after_old_due_date() {
        // january belongs to the academic year that started the previous june
        assert_eq!(classify(date(2024, 1, 11)).to_string(), "23242");
    }

    #[test]
    fn test_century_wrap() {
        let code = classify(date(2099, 7, 1));
        assert_eq!(code.to_string(), "99001");
        assert_eq!(code.end_year(), 2100);
    }

    #[test]
    fn test_labels() {
        assert_eq!(
            classify(date(2024, 1, 11)).label(),
            "2023-2024 Second Half (Dec-May)"
        );
        assert_eq!(
            classify(date(2025, 9, 1)).label(),
            "2025-2026 First Half (Jun-Nov)"
        );
    }

    #[test]
    fn test_parse() {
        let code: AcademicPeriodCode = "23242".parse().unwrap();
        assert_eq!(code.start_year(), 2023);
        assert_eq!(code.half(), Half::Second);
        assert_eq!(code.to_string(), "23242");

        let wrapped: AcademicPeriodCode = "99001".parse().unwrap();
        assert_eq!(wrapped.label(), "2099-2000 First Half (Jun-Nov)");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in ["2324", "232423", "23243", "23252", "2a242", "", "23240"] {
            assert!(bad.parse::<AcademicPeriodCode>().is_err(), "{} should be rejected", bad);
        }
    }

    #[test]
    fn test_chronological_ordering() {
        let a: AcademicPeriodCode = "23241".parse().unwrap();
        let b: AcademicPeriodCode = "23242".parse().unwrap();
        let c: AcademicPeriodCode = "24251".parse().unwrap();
        assert!(a < b && b < c);
    }

    #[test]
    fn test_serde_as_string() {
        let code = classify(date(2024, 8, 1));
        let json = serde_json::to_string(&code).unwrap();
        assert_eq!(json, "\"24251\"");
        let back: AcademicPeriodCode = serde_json::from_str(&json).unwrap();
        assert_eq!(back, code);
    }
}
