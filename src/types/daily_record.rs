use crate::types::compass_point::CompassPoint;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Converts degrees Celsius to degrees Fahrenheit.
pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    celsius * 9.0 / 5.0 + 32.0
}

/// Converts a UV reading to an index. Integral values like `2.0` are accepted; fractional,
/// negative or out-of-range values are not.
pub(crate) fn uv_index_from_f64(value: f64) -> Option<u8> {
    (value.is_finite() && value.fract() == 0.0 && (0.0..=255.0).contains(&value))
        .then_some(value as u8)
}

/// One day of observations at the configured location.
///
/// Fahrenheit values are not stored; use the `*_f` accessors. The wind fields are
/// `None` for records that came from a file written before wind data was collected.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct DailyRecord {
    pub date: NaiveDate,
    pub temperature_max_c: f64,
    pub temperature_min_c: f64,
    pub temperature_avg_c: f64,
    pub uv_index: Option<u8>,
    pub sun_hours: Option<f64>,
    pub wind_speed_kmh: Option<f64>,
    pub wind_gust_kmh: Option<f64>,
    pub wind_direction_compass: Option<CompassPoint>,
}

impl DailyRecord {
    /// A record with only the temperatures set. The average is the midpoint of max and min.
    pub fn from_temperatures(date: NaiveDate, max_c: f64, min_c: f64) -> Self {
        Self {
            date,
            temperature_max_c: max_c,
            temperature_min_c: min_c,
            temperature_avg_c: (max_c + min_c) / 2.0,
            uv_index: None,
            sun_hours: None,
            wind_speed_kmh: None,
            wind_gust_kmh: None,
            wind_direction_compass: None,
        }
    }

    pub fn temperature_max_f(&self) -> f64 {
        celsius_to_fahrenheit(self.temperature_max_c)
    }

    pub fn temperature_min_f(&self) -> f64 {
        celsius_to_fahrenheit(self.temperature_min_c)
    }

    pub fn temperature_avg_f(&self) -> f64 {
        celsius_to_fahrenheit(self.temperature_avg_c)
    }

    pub fn has_wind_data(&self) -> bool {
        self.wind_speed_kmh.is_some()
            || self.wind_gust_kmh.is_some()
            || self.wind_direction_compass.is_some()
    }
}
