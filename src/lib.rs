mod analysis;
#[cfg(feature = "charts")]
pub mod charts;
mod config;
mod error;
mod provider;
mod store;
mod sync;
mod types;

pub use error::WeatherSyncError;

pub use config::{ConfigError, SyncConfig, DEFAULT_DATA_FILE, DEFAULT_LOCATION};

pub use types::calendar::{month_abbreviation, InvalidMonth, Month, StartEndDate, Year};
pub use types::compass_point::{CompassPoint, InvalidCompassPoint};
pub use types::daily_record::{celsius_to_fahrenheit, DailyRecord};
pub use types::dataset::Dataset;
pub use types::fetch_window::FetchWindow;
pub use types::period::{AnyDate, DatePeriod};

pub use store::dataset_store::{last_recorded_date, merge, DatasetStore, StagedDataset};
pub use store::error::{PersistenceError, SchemaError};
pub use store::schema::{SchemaVersion, COLUMNS};

pub use provider::error::ProviderError;
pub use provider::response::{RawDay, RawHour};
pub use provider::world_weather_online::{
    earliest_available_date, parse_past_weather, WorldWeatherOnline,
};
pub use provider::WeatherProvider;

pub use sync::error::SyncError;
pub use sync::normalize::{normalize_day, normalize_days};
pub use sync::planner::{month_window, plan_fetch_windows};
pub use sync::report::{FailedWindow, SyncOutcome, SyncReport};
pub use sync::synchronizer::Synchronizer;

pub use analysis::daily_frame::*;
pub use analysis::error::AnalysisError;
pub use analysis::patterns::{cold_streaks, ColdStreak};
