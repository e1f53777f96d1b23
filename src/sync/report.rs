use crate::types::fetch_window::FetchWindow;
use chrono::NaiveDate;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A window whose request or normalization failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailedWindow {
    pub window: FetchWindow,
    pub error: String,
    pub rate_limited: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncOutcome {
    /// Nothing was planned.
    UpToDate,
    /// Every planned window succeeded.
    Updated,
    /// Some windows failed, the rest were merged and saved.
    PartiallyUpdated,
    /// Windows were planned but none succeeded; the file was left alone.
    Failed,
}

impl fmt::Display for SyncOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SyncOutcome::UpToDate => "up to date",
            SyncOutcome::Updated => "updated",
            SyncOutcome::PartiallyUpdated => "partially updated",
            SyncOutcome::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// Summary of one synchronization run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncReport {
    pub windows_planned: usize,
    pub windows_attempted: usize,
    pub windows_succeeded: usize,
    /// Dates that were not in the dataset before.
    pub records_added: usize,
    /// Existing dates whose values changed.
    pub records_updated: usize,
    pub failed_windows: Vec<FailedWindow>,
    /// Whether the dataset file was rewritten.
    pub saved: bool,
    pub last_recorded_date: Option<NaiveDate>,
}

impl SyncReport {
    pub fn outcome(&self) -> SyncOutcome {
        if self.windows_planned == 0 {
            SyncOutcome::UpToDate
        } else if self.windows_succeeded == 0 {
            SyncOutcome::Failed
        } else if self.failed_windows.is_empty() {
            SyncOutcome::Updated
        } else {
            SyncOutcome::PartiallyUpdated
        }
    }

    pub fn log_summary(&self) {
        info!(
            "Sync {}: {}/{} windows succeeded, {} records added, {} updated, last date {}",
            self.outcome(),
            self.windows_succeeded,
            self.windows_planned,
            self.records_added,
            self.records_updated,
            self.last_recorded_date
                .map(|d| d.to_string())
                .unwrap_or_else(|| "none".to_string()),
        );
        for failed in &self.failed_windows {
            warn!("  {} failed: {}", failed.window, failed.error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(month: u32) -> FetchWindow {
        FetchWindow::new(
            NaiveDate::from_ymd_opt(2024, month, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, month, 28).unwrap(),
        )
    }

    #[test]
    fn test_outcome() {
        let mut report = SyncReport::default();
        assert_eq!(report.outcome(), SyncOutcome::UpToDate);

        report.windows_planned = 2;
        report.windows_attempted = 2;
        report.failed_windows = vec![
            FailedWindow { window: window(3), error: "boom".into(), rate_limited: false },
            FailedWindow { window: window(4), error: "boom".into(), rate_limited: true },
        ];
        assert_eq!(report.outcome(), SyncOutcome::Failed);

        report.windows_succeeded = 1;
        report.failed_windows.pop();
        assert_eq!(report.outcome(), SyncOutcome::PartiallyUpdated);

        report.windows_succeeded = 2;
        report.failed_windows.clear();
        assert_eq!(report.outcome(), SyncOutcome::Updated);
    }

    #[test]
    fn test_report_serializes_failed_window_dates() -> Result<(), serde_json::Error> {
        let report = SyncReport {
            windows_planned: 1,
            windows_attempted: 1,
            failed_windows: vec![FailedWindow {
                window: window(4),
                error: "Rate limit reached".into(),
                rate_limited: true,
            }],
            ..SyncReport::default()
        };
        let json = serde_json::to_value(&report)?;
        assert_eq!(json["failed_windows"][0]["window"]["start"], "2024-04-01");
        assert_eq!(json["failed_windows"][0]["rate_limited"], true);
        assert_eq!(json["last_recorded_date"], serde_json::Value::Null);
        Ok(())
    }
}
