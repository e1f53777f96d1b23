//! Calendar units used to plan fetch windows and to filter frames.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Ord, PartialOrd, Hash)]
pub struct Year(pub i32);
impl Display for Year {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}", self.0)
    }
}

/// A calendar month, `Month(year, month)`. Orders chronologically.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct Month(pub i32, pub u32);
impl Month {

    /// The month a date falls in.
    pub fn containing(date: NaiveDate) -> Self {
        Self(date.year(), date.month())
    }

    pub fn first_day(self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.0, self.1, 1)
    }

    pub fn last_day(self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.0, self.1, days_in_month(self.0, self.1)?)
    }

    pub fn succ(self) -> Self {
        if self.1 >= 12 {
            Self(self.0 + 1, 1)
        } else {
            Self(self.0, self.1 + 1)
        }
    }
}

impl Display for Month {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.0, self.1)
    }
}

impl FromStr for Month {
    type Err = InvalidMonth;

    /// Parses `YYYY-MM`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidMonth(s.to_string());
        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        let month = Month(
            year.parse().map_err(|_| invalid())?,
            month.parse().map_err(|_| invalid())?,
        );
        month.first_day().map(|_| month).ok_or_else(invalid)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid month '{0}', expected YYYY-MM")]
pub struct InvalidMonth(pub String);

pub struct StartEndDate {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

pub(crate) fn days_in_month(year: i32, month: u32) -> Option<u32> {
    if !(1..=12).contains(&month) {
        return None;
    }
    let (next_month_year, next_month) = if month == 12 {
        (year.checked_add(1)?, 1)
    } else {
        (year, month + 1)
    };
    let first_day_of_next_month = NaiveDate::from_ymd_opt(next_month_year, next_month, 1)?;
    let last_day_of_current_month = first_day_of_next_month - Duration::days(1);
    Some(last_day_of_current_month.day())
}

pub const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Three-letter English name of a month number (1-12).
pub fn month_abbreviation(month: u32) -> &'static str {
    month
        .checked_sub(1)
        .and_then(|i| MONTH_ABBREVIATIONS.get(i as usize))
        .copied()
        .unwrap_or("???")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_days_in_month_handles_leap_years() {
        assert_eq!(days_in_month(2024, 2), Some(29));
        assert_eq!(days_in_month(2023, 2), Some(28));
        assert_eq!(days_in_month(2023, 12), Some(31));
        assert_eq!(days_in_month(2023, 13), None);
    }

    #[test]
    fn test_month_boundaries_and_succ() {
        let december = Month(2023, 12);
        assert_eq!(december.succ(), Month(2024, 1));
        assert_eq!(
            december.last_day(),
            NaiveDate::from_ymd_opt(2023, 12, 31)
        );
        assert_eq!(
            Month::containing(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()),
            Month(2024, 3)
        );
        assert!(Month(2023, 12) < Month(2024, 1));
        assert_eq!(Month(2024, 3).to_string(), "2024-03");
    }

    #[test]
    fn test_parse_month() {
        assert_eq!("2024-04".parse::<Month>(), Ok(Month(2024, 4)));
        assert_eq!(" 2023-12 ".parse::<Month>(), Ok(Month(2023, 12)));
        assert!("2024-13".parse::<Month>().is_err());
        assert!("2024".parse::<Month>().is_err());
        assert!("April".parse::<Month>().is_err());
    }

    #[test]
    fn test_month_abbreviation() {
        assert_eq!(month_abbreviation(1), "Jan");
        assert_eq!(month_abbreviation(11), "Nov");
        assert_eq!(month_abbreviation(0), "???");
    }
}
