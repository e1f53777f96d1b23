//! The external weather data source.

pub mod error;
pub mod response;
pub mod world_weather_online;

use crate::provider::error::ProviderError;
use crate::provider::response::RawDay;
use chrono::NaiveDate;
use std::future::Future;

/// Historical daily observations for a location, one request per date range.
///
/// Implementations are expected to enforce their own window limits; the synchronizer
/// never asks for more than one calendar month at a time.
pub trait WeatherProvider {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Fetches raw daily observations for `location` from `start` to `end`, inclusive.
    fn fetch_history(
        &self,
        location: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> impl Future<Output = Result<Vec<RawDay>, ProviderError>> + Send;
}
