use crate::types::calendar::{Month, StartEndDate, Year};
use chrono::NaiveDate;

/// Anything that resolves to an inclusive range of dates.
pub trait AnyDate {
    fn get_date_range(self) -> Option<StartEndDate>;
}

impl AnyDate for NaiveDate {
    fn get_date_range(self) -> Option<StartEndDate> {
        Some(StartEndDate {
            start: self,
            end: self,
        })
    }
}

impl AnyDate for &str {
    fn get_date_range(self) -> Option<StartEndDate> {
        NaiveDate::parse_from_str(self, "%Y-%m-%d")
            .ok()?
            .get_date_range()
    }
}

impl AnyDate for Year {
    fn get_date_range(self) -> Option<StartEndDate> {
        self.get_date_period()
    }
}

impl AnyDate for Month {
    fn get_date_range(self) -> Option<StartEndDate> {
        self.get_date_period()
    }
}

/// A period spanning more than one day.
pub trait DatePeriod {
    fn get_date_period(self) -> Option<StartEndDate>;
}

impl DatePeriod for Year {
    fn get_date_period(self) -> Option<StartEndDate> {
        Some(StartEndDate {
            start: NaiveDate::from_ymd_opt(self.0, 1, 1)?,
            end: NaiveDate::from_ymd_opt(self.0, 12, 31)?,
        })
    }
}

impl DatePeriod for Month {
    fn get_date_period(self) -> Option<StartEndDate> {
        Some(StartEndDate {
            start: self.first_day()?,
            end: self.last_day()?,
        })
    }
}
