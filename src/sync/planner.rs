//! Decides which calendar months still have to be requested from the provider.

use crate::types::calendar::Month;
use crate::types::fetch_window::FetchWindow;
use chrono::NaiveDate;

/// Plans the fetch windows needed to bring a dataset up to `today`.
///
/// * Empty dataset (`last_date` is `None`): every month from `target_range_start`
///   (or `earliest_available`, whichever is later) through the month containing `today`.
/// * Non-empty dataset: the month containing `last_date` is fetched again, followed by
///   every month up to the one containing `today`. When `last_date` already lies in the
///   current month (or later) nothing is planned.
///
/// Windows are aligned to month boundaries, in chronological order, and are clipped so they
/// never start before `earliest_available` nor end after `today`.
///
/// # Examples
///
/// ```rust
/// use chrono::NaiveDate;
/// use weather_sync::plan_fetch_windows;
///
/// let d = |y, m, day| NaiveDate::from_ymd_opt(y, m, day).unwrap();
/// let windows = plan_fetch_windows(Some(d(2024, 3, 15)), d(2024, 5, 2), d(2008, 7, 1), d(2020, 1, 1));
/// assert_eq!(windows.len(), 3);
/// assert_eq!(windows[0].start, d(2024, 3, 1));
/// assert_eq!(windows[2].end, d(2024, 5, 2));
/// ```
pub fn plan_fetch_windows(
    last_date: Option<NaiveDate>,
    today: NaiveDate,
    earliest_available: NaiveDate,
    target_range_start: NaiveDate,
) -> Vec<FetchWindow> {
    let current_month = Month::containing(today);
    let first_month = match last_date {
        None => Month::containing(target_range_start.max(earliest_available)),
        Some(last) => {
            let last_month = Month::containing(last);
            if last_month >= current_month {
                return Vec::new();
            }
            last_month
        }
    };

    let mut windows = Vec::new();
    let mut month = first_month;
    while month <= current_month {
        if let Some(window) = month_window(month, today, earliest_available) {
            windows.push(window);
        }
        month = month.succ();
    }
    windows
}

/// The window covering `month`, clipped to `[earliest_available, today]`.
pub fn month_window(
    month: Month,
    today: NaiveDate,
    earliest_available: NaiveDate,
) -> Option<FetchWindow> {
    let start = month.first_day()?.max(earliest_available);
    let end = month.last_day()?.min(today);
    (start <= end).then(|| FetchWindow::new(start, end))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn earliest() -> NaiveDate {
        d(2008, 7, 1)
    }

    #[test]
    fn test_resumes_from_month_of_last_date() {
        let windows = plan_fetch_windows(Some(d(2024, 3, 15)), d(2024, 5, 2), earliest(), d(2020, 1, 1));
        assert_eq!(
            windows,
            vec![
                FetchWindow::new(d(2024, 3, 1), d(2024, 3, 31)),
                FetchWindow::new(d(2024, 4, 1), d(2024, 4, 30)),
                FetchWindow::new(d(2024, 5, 1), d(2024, 5, 2)),
            ]
        );
    }

    #[test]
    fn test_empty_dataset_bootstraps_from_target_start() {
        let windows = plan_fetch_windows(None, d(2023, 2, 10), earliest(), d(2023, 1, 1));
        assert_eq!(
            windows,
            vec![
                FetchWindow::new(d(2023, 1, 1), d(2023, 1, 31)),
                FetchWindow::new(d(2023, 2, 1), d(2023, 2, 10)),
            ]
        );
    }

    #[test]
    fn test_target_start_mid_month_still_fetches_whole_month() {
        let windows = plan_fetch_windows(None, d(2023, 2, 10), earliest(), d(2023, 1, 20));
        assert_eq!(windows[0], FetchWindow::new(d(2023, 1, 1), d(2023, 1, 31)));
    }

    #[test]
    fn test_never_starts_before_provider_horizon() {
        let windows = plan_fetch_windows(None, d(2008, 8, 15), earliest(), d(2000, 1, 1));
        assert_eq!(
            windows,
            vec![
                FetchWindow::new(d(2008, 7, 1), d(2008, 7, 31)),
                FetchWindow::new(d(2008, 8, 1), d(2008, 8, 15)),
            ]
        );

        let mid_month_horizon = d(2008, 7, 10);
        let windows = plan_fetch_windows(Some(d(2008, 6, 20)), d(2008, 7, 20), mid_month_horizon, d(2000, 1, 1));
        assert_eq!(windows, vec![FetchWindow::new(d(2008, 7, 10), d(2008, 7, 20))]);
    }

    #[test]
    fn test_current_dataset_plans_nothing() {
        assert!(plan_fetch_windows(Some(d(2024, 5, 1)), d(2024, 5, 2), earliest(), d(2020, 1, 1)).is_empty());
        assert!(plan_fetch_windows(Some(d(2024, 5, 2)), d(2024, 5, 2), earliest(), d(2020, 1, 1)).is_empty());
        // Clock behind the data.
        assert!(plan_fetch_windows(Some(d(2024, 6, 2)), d(2024, 5, 2), earliest(), d(2020, 1, 1)).is_empty());
    }

    #[test]
    fn test_target_in_future_plans_nothing() {
        assert!(plan_fetch_windows(None, d(2024, 5, 2), earliest(), d(2024, 7, 1)).is_empty());
    }

    #[test]
    fn test_windows_cross_year_boundary_in_order() {
        let windows = plan_fetch_windows(Some(d(2023, 11, 30)), d(2024, 1, 3), earliest(), d(2020, 1, 1));
        let months: Vec<Month> = windows.iter().map(FetchWindow::month).collect();
        assert_eq!(months, vec![Month(2023, 11), Month(2023, 12), Month(2024, 1)]);
        assert!(windows.windows(2).all(|w| w[0].end < w[1].start));
        assert!(windows.iter().all(|w| w.end <= d(2024, 1, 3)));
    }

    #[test]
    fn test_last_day_of_month_refetches_that_month() {
        let windows = plan_fetch_windows(Some(d(2024, 2, 29)), d(2024, 3, 1), earliest(), d(2020, 1, 1));
        assert_eq!(
            windows,
            vec![
                FetchWindow::new(d(2024, 2, 1), d(2024, 2, 29)),
                FetchWindow::new(d(2024, 3, 1), d(2024, 3, 1)),
            ]
        );
    }
}
