//! Run configuration, loaded once at process start.

use crate::provider::world_weather_online::earliest_available_date;
use bon::Builder;
use chrono::NaiveDate;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_LOCATION: &str = "Digby,Nova Scotia,Canada";
pub const DEFAULT_DATA_FILE: &str = "digby_temperature.csv";
const PLACEHOLDER_API_KEY: &str = "your_api_key_here";

pub const ENV_API_KEY: &str = "WEATHER_API_KEY";
pub const ENV_LOCATION: &str = "WEATHER_LOCATION";
pub const ENV_DATA_FILE: &str = "WEATHER_DATA_FILE";
pub const ENV_START_DATE: &str = "WEATHER_START_DATE";
pub const ENV_EARLIEST_DATE: &str = "WEATHER_EARLIEST_DATE";
pub const ENV_TIMEOUT_SECS: &str = "WEATHER_TIMEOUT_SECS";
pub const ENV_REQUEST_DELAY_MS: &str = "WEATHER_REQUEST_DELAY_MS";

fn default_target_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 1, 1).unwrap_or(NaiveDate::MIN)
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{ENV_API_KEY} is not set; add it to the environment or a .env file")]
    MissingApiKey,

    #[error("{ENV_API_KEY} still holds the placeholder value; set a real API key")]
    PlaceholderApiKey,

    #[error("Invalid value '{value}' for {key}")]
    InvalidValue { key: &'static str, value: String },
}

/// Immutable settings for one synchronization run.
#[derive(Clone, Builder)]
pub struct SyncConfig {
    /// Provider credential.
    #[builder(into)]
    pub api_key: String,
    /// Location query sent to the provider.
    #[builder(into, default = DEFAULT_LOCATION.to_string())]
    pub location: String,
    /// CSV file holding the dataset.
    #[builder(into, default = PathBuf::from(DEFAULT_DATA_FILE))]
    pub data_file: PathBuf,
    /// First date wanted when bootstrapping an empty dataset.
    #[builder(default = default_target_start())]
    pub target_range_start: NaiveDate,
    /// Oldest date the provider has data for.
    #[builder(default = earliest_available_date())]
    pub earliest_available: NaiveDate,
    /// Upper bound for a single provider request.
    #[builder(default = Duration::from_secs(30))]
    pub request_timeout: Duration,
    /// Pause between consecutive provider requests.
    #[builder(default = Duration::from_millis(500))]
    pub request_delay: Duration,
}

impl fmt::Debug for SyncConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncConfig")
            .field("api_key", &"<redacted>")
            .field("location", &self.location)
            .field("data_file", &self.data_file)
            .field("target_range_start", &self.target_range_start)
            .field("earliest_available", &self.earliest_available)
            .field("request_timeout", &self.request_timeout)
            .field("request_delay", &self.request_delay)
            .finish()
    }
}

impl SyncConfig {
    /// Reads the configuration from the process environment, after loading `.env` if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_key = lookup(ENV_API_KEY)
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .ok_or(ConfigError::MissingApiKey)?;
        if api_key == PLACEHOLDER_API_KEY {
            return Err(ConfigError::PlaceholderApiKey);
        }

        let date = |key: &'static str, default: NaiveDate| -> Result<NaiveDate, ConfigError> {
            match lookup(key) {
                None => Ok(default),
                Some(value) => NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
                    .map_err(|_| ConfigError::InvalidValue { key, value }),
            }
        };
        let number = |key: &'static str, default: u64| -> Result<u64, ConfigError> {
            match lookup(key) {
                None => Ok(default),
                Some(value) => value
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue { key, value }),
            }
        };

        Ok(SyncConfig::builder()
            .api_key(api_key)
            .location(lookup(ENV_LOCATION).unwrap_or_else(|| DEFAULT_LOCATION.to_string()))
            .data_file(lookup(ENV_DATA_FILE).unwrap_or_else(|| DEFAULT_DATA_FILE.to_string()))
            .target_range_start(date(ENV_START_DATE, default_target_start())?)
            .earliest_available(date(ENV_EARLIEST_DATE, earliest_available_date())?)
            .request_timeout(Duration::from_secs(number(ENV_TIMEOUT_SECS, 30)?))
            .request_delay(Duration::from_millis(number(ENV_REQUEST_DELAY_MS, 500)?))
            .build())
    }
}
