//! Drives a run: load, plan, fetch window by window, merge, save once.

use crate::config::SyncConfig;
use crate::provider::error::ProviderError;
use crate::provider::WeatherProvider;
use crate::store::dataset_store::{merge, DatasetStore};
use crate::sync::error::SyncError;
use crate::sync::normalize::normalize_days;
use crate::sync::planner::{month_window, plan_fetch_windows};
use crate::sync::report::{FailedWindow, SyncReport};
use crate::types::calendar::Month;
use crate::types::daily_record::DailyRecord;
use crate::types::dataset::Dataset;
use crate::types::fetch_window::FetchWindow;
use bon::bon;
use chrono::{Local, NaiveDate};
use log::{debug, info, warn};
use std::fmt;
use tokio_util::sync::CancellationToken;

/// Phases a run moves through, logged at debug level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SyncState {
    Idle,
    Loaded,
    Planned,
    Fetching(FetchWindow),
    Merging(FetchWindow),
    Saving,
    Done,
    Aborted,
}

impl fmt::Display for SyncState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncState::Idle => write!(f, "idle"),
            SyncState::Loaded => write!(f, "loaded"),
            SyncState::Planned => write!(f, "planned"),
            SyncState::Fetching(window) => write!(f, "fetching {window}"),
            SyncState::Merging(window) => write!(f, "merging {window}"),
            SyncState::Saving => write!(f, "saving"),
            SyncState::Done => write!(f, "done"),
            SyncState::Aborted => write!(f, "aborted before save"),
        }
    }
}

fn enter(state: SyncState) {
    debug!("Sync state: {}", state);
}

/// Brings the local dataset up to date with a [`WeatherProvider`].
///
/// One run loads the dataset, plans month-aligned windows, fetches them in order and saves
/// the merged result once at the end. A failing window is logged and reported, and the
/// remaining windows still run. The file is only rewritten when at least one window
/// succeeded, and never when loading failed.
///
/// # Example
///
/// ```no_run
/// # use weather_sync::{SyncConfig, Synchronizer, WorldWeatherOnline, WeatherSyncError};
/// # #[tokio::main]
/// # async fn main() -> Result<(), WeatherSyncError> {
/// let config = SyncConfig::from_env()?;
/// let provider = WorldWeatherOnline::new(config.api_key.clone(), config.request_timeout)?;
/// let target = config.target_range_start;
/// let synchronizer = Synchronizer::builder().config(config).provider(provider).build();
///
/// let report = synchronizer.run(target).await?;
/// println!("{}", report.outcome());
/// # Ok(())
/// # }
/// ```
pub struct Synchronizer<P> {
    config: SyncConfig,
    provider: P,
    store: DatasetStore,
}

#[bon]
impl<P: WeatherProvider> Synchronizer<P> {
    /// `store` defaults to the configured data file.
    #[builder]
    pub fn new(config: SyncConfig, provider: P, store: Option<DatasetStore>) -> Self {
        let store = store.unwrap_or_else(|| DatasetStore::new(config.data_file.clone()));
        Self {
            config,
            provider,
            store,
        }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn store(&self) -> &DatasetStore {
        &self.store
    }

    /// Synchronizes up to the local calendar date.
    pub async fn run(&self, target_range_start: NaiveDate) -> Result<SyncReport, SyncError> {
        self.run_on(target_range_start, Local::now().date_naive())
            .await
    }

    /// Synchronizes up to `today`.
    pub async fn run_on(
        &self,
        target_range_start: NaiveDate,
        today: NaiveDate,
    ) -> Result<SyncReport, SyncError> {
        self.run_with_cancel(target_range_start, today, &CancellationToken::new())
            .await
    }

    /// Like [`Synchronizer::run_on`], stopping before the save if `cancel` fires.
    ///
    /// A cancelled run leaves the dataset file exactly as it was.
    pub async fn run_with_cancel(
        &self,
        target_range_start: NaiveDate,
        today: NaiveDate,
        cancel: &CancellationToken,
    ) -> Result<SyncReport, SyncError> {
        enter(SyncState::Idle);
        let dataset = self.load().await.inspect_err(|_| enter(SyncState::Aborted))?;
        enter(SyncState::Loaded);

        let windows = plan_fetch_windows(
            dataset.last_recorded_date(),
            today,
            self.config.earliest_available,
            target_range_start,
        );
        self.sync_windows(dataset, windows, cancel).await
    }

    /// Fetches exactly `windows`, in order, and merges them into the stored dataset.
    ///
    /// Use it to retry the [`FailedWindow`]s of an earlier report: once a later month has
    /// been merged, regular planning no longer reaches back to a failed one.
    pub async fn run_windows(
        &self,
        windows: &[FetchWindow],
        cancel: &CancellationToken,
    ) -> Result<SyncReport, SyncError> {
        enter(SyncState::Idle);
        let dataset = self.load().await.inspect_err(|_| enter(SyncState::Aborted))?;
        enter(SyncState::Loaded);
        self.sync_windows(dataset, windows.to_vec(), cancel).await
    }

    /// Re-fetches the month containing `today`, regardless of what the dataset holds.
    ///
    /// Regular runs skip the current month once the dataset has reached it; this picks up
    /// days recorded since then.
    pub async fn refresh_current_month(
        &self,
        today: NaiveDate,
        cancel: &CancellationToken,
    ) -> Result<SyncReport, SyncError> {
        let windows: Vec<FetchWindow> =
            month_window(Month::containing(today), today, self.config.earliest_available)
                .into_iter()
                .collect();
        self.run_windows(&windows, cancel).await
    }

    /// Fetches one window and converts it to records that all fall inside the window.
    pub async fn fetch_and_normalize(
        &self,
        window: &FetchWindow,
    ) -> Result<Vec<DailyRecord>, ProviderError> {
        let timeout = self.config.request_timeout;
        let raw = tokio::time::timeout(
            timeout,
            self.provider
                .fetch_history(&self.config.location, window.start, window.end),
        )
        .await
        .map_err(|_| ProviderError::Timeout(timeout))??;
        normalize_days(&raw, window)
    }

    async fn load(&self) -> Result<Dataset, SyncError> {
        let store = self.store.clone();
        let dataset = tokio::task::spawn_blocking(move || store.load()).await??;
        Ok(dataset)
    }

    async fn save(&self, dataset: Dataset) -> Result<Dataset, SyncError> {
        let store = self.store.clone();
        let (dataset, result) = tokio::task::spawn_blocking(move || {
            let result = store.save(&dataset);
            (dataset, result)
        })
        .await?;
        result?;
        Ok(dataset)
    }

    async fn sync_windows(
        &self,
        dataset: Dataset,
        windows: Vec<FetchWindow>,
        cancel: &CancellationToken,
    ) -> Result<SyncReport, SyncError> {
        let result = self.fetch_merge_save(dataset, windows, cancel).await;
        match &result {
            Ok(report) => {
                enter(SyncState::Done);
                report.log_summary();
            }
            Err(e) => {
                enter(SyncState::Aborted);
                warn!("Sync aborted: {}", e);
            }
        }
        result
    }

    async fn fetch_merge_save(
        &self,
        mut dataset: Dataset,
        windows: Vec<FetchWindow>,
        cancel: &CancellationToken,
    ) -> Result<SyncReport, SyncError> {
        let mut report = SyncReport {
            windows_planned: windows.len(),
            last_recorded_date: dataset.last_recorded_date(),
            ..SyncReport::default()
        };
        enter(SyncState::Planned);
        if windows.is_empty() {
            info!(
                "Dataset {} is up to date",
                self.store.path().display()
            );
            return Ok(report);
        }
        info!(
            "Planned {} window(s) for '{}' from {}",
            windows.len(),
            self.config.location,
            self.provider.name()
        );

        for (i, window) in windows.iter().enumerate() {
            if cancel.is_cancelled() {
                return Err(SyncError::Cancelled);
            }
            if i > 0 && !self.config.request_delay.is_zero() {
                tokio::select! {
                    _ = cancel.cancelled() => return Err(SyncError::Cancelled),
                    _ = tokio::time::sleep(self.config.request_delay) => {}
                }
            }

            enter(SyncState::Fetching(*window));
            report.windows_attempted += 1;
            let fetched = tokio::select! {
                _ = cancel.cancelled() => return Err(SyncError::Cancelled),
                fetched = self.fetch_and_normalize(window) => fetched,
            };

            match fetched {
                Ok(records) => {
                    enter(SyncState::Merging(*window));
                    let incoming = Dataset::from_records(records);
                    for record in &incoming {
                        match dataset.get(record.date) {
                            None => report.records_added += 1,
                            Some(existing) if existing != record => report.records_updated += 1,
                            Some(_) => {}
                        }
                    }
                    info!("Fetched {} day(s) for {}", incoming.len(), window);
                    dataset = merge(&dataset, incoming.into_records());
                    report.windows_succeeded += 1;
                }
                Err(e) => {
                    warn!("Window {} failed: {}", window, e);
                    report.failed_windows.push(FailedWindow {
                        window: *window,
                        error: e.to_string(),
                        rate_limited: e.is_rate_limited(),
                    });
                }
            }
        }

        if report.windows_succeeded == 0 {
            warn!(
                "No window succeeded; leaving {} untouched",
                self.store.path().display()
            );
            return Ok(report);
        }
        if cancel.is_cancelled() {
            return Err(SyncError::Cancelled);
        }

        enter(SyncState::Saving);
        let dataset = self.save(dataset).await?;
        report.saved = true;
        report.last_recorded_date = dataset.last_recorded_date();
        Ok(report)
    }
}
