//! Record-by-record patterns that don't map onto a group-by.

use crate::types::dataset::Dataset;
use chrono::{Datelike, NaiveDate};
use serde::Serialize;

/// Consecutive calendar days with the maximum temperature below a threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColdStreak {
    pub start: NaiveDate,
    pub days: u32,
}

impl ColdStreak {
    pub fn end(&self) -> NaiveDate {
        self.start + chrono::Duration::days(i64::from(self.days) - 1)
    }
}

/// Cold streaks inside calendar month `month` (1-12) of every year, chronologically.
///
/// A streak never crosses into another month and is broken by a missing day.
pub fn cold_streaks(dataset: &Dataset, month: u32, threshold_c: f64) -> Vec<ColdStreak> {
    let mut streaks = Vec::new();
    let mut current: Option<ColdStreak> = None;

    for record in dataset.iter().filter(|r| r.date.month() == month) {
        let is_cold = record.temperature_max_c < threshold_c;
        current = match (current, is_cold) {
            (Some(mut streak), true) if streak.end().succ_opt() == Some(record.date) => {
                streak.days += 1;
                Some(streak)
            }
            (previous, true) => {
                streaks.extend(previous);
                Some(ColdStreak {
                    start: record.date,
                    days: 1,
                })
            }
            (previous, false) => {
                streaks.extend(previous);
                None
            }
        };
    }
    streaks.extend(current);
    streaks
}
