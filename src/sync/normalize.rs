//! Maps provider days onto the dataset's record type.

use crate::provider::error::ProviderError;
use crate::provider::response::RawDay;
use crate::types::compass_point::CompassPoint;
use crate::types::daily_record::{uv_index_from_f64, DailyRecord};
use crate::types::fetch_window::FetchWindow;
use chrono::NaiveDate;
use log::{debug, warn};

fn parse_number(date: &str, field: &str, raw: &str) -> Result<f64, ProviderError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| {
            ProviderError::InvalidResponse(format!("{date}: field '{field}' is not a number: '{raw}'"))
        })
}

fn required(date: &str, field: &str, raw: Option<&str>) -> Result<f64, ProviderError> {
    let raw = raw.ok_or_else(|| {
        ProviderError::InvalidResponse(format!("{date}: missing field '{field}'"))
    })?;
    parse_number(date, field, raw)
}

fn optional(date: &str, field: &str, raw: Option<&str>) -> Result<Option<f64>, ProviderError> {
    raw.map(|raw| parse_number(date, field, raw)).transpose()
}

/// Converts one provider day into a [`DailyRecord`].
///
/// The average temperature is the midpoint of max and min. Wind speed is the mean of the
/// hourly speeds, rounded to one decimal; direction and gust come from the first hourly entry.
pub fn normalize_day(raw: &RawDay) -> Result<DailyRecord, ProviderError> {
    let date = NaiveDate::parse_from_str(raw.date.trim(), "%Y-%m-%d").map_err(|_| {
        ProviderError::InvalidResponse(format!("invalid date '{}'", raw.date))
    })?;
    let label = raw.date.as_str();

    let max_c = required(label, "maxtempC", raw.max_temp_c.as_deref())?;
    let min_c = required(label, "mintempC", raw.min_temp_c.as_deref())?;

    let uv_index = match optional(label, "uvIndex", raw.uv_index.as_deref())? {
        Some(v) => Some(uv_index_from_f64(v).ok_or_else(|| {
            ProviderError::InvalidResponse(format!("{label}: uvIndex is not a whole index: {v}"))
        })?),
        None => None,
    };
    let sun_hours = optional(label, "sunHour", raw.sun_hour.as_deref())?;

    let speeds = raw
        .hourly
        .iter()
        .filter_map(|h| h.wind_speed_kmph.as_deref())
        .map(|s| parse_number(label, "windspeedKmph", s))
        .collect::<Result<Vec<f64>, _>>()?;
    let wind_speed_kmh = (!speeds.is_empty()).then(|| {
        let mean = speeds.iter().sum::<f64>() / speeds.len() as f64;
        (mean * 10.0).round() / 10.0
    });

    let first_hour = raw.hourly.first();
    let wind_gust_kmh = optional(
        label,
        "WindGustKmph",
        first_hour.and_then(|h| h.wind_gust_kmph.as_deref()),
    )?;
    let wind_direction_compass = match first_hour.and_then(|h| h.wind_direction.as_deref()) {
        None => None,
        Some(dir) => {
            let parsed = CompassPoint::from_label(dir);
            if parsed.is_none() {
                warn!("{}: ignoring unknown wind direction '{}'", label, dir);
            }
            parsed
        }
    };

    Ok(DailyRecord {
        date,
        temperature_max_c: max_c,
        temperature_min_c: min_c,
        temperature_avg_c: (max_c + min_c) / 2.0,
        uv_index,
        sun_hours,
        wind_speed_kmh,
        wind_gust_kmh,
        wind_direction_compass,
    })
}

/// Normalizes every day of a window response, dropping days the window doesn't cover.
pub fn normalize_days(
    raw_days: &[RawDay],
    window: &FetchWindow,
) -> Result<Vec<DailyRecord>, ProviderError> {
    let mut records = Vec::with_capacity(raw_days.len());
    for raw in raw_days {
        let record = normalize_day(raw)?;
        if window.contains(record.date) {
            records.push(record);
        } else {
            debug!("Dropping {} outside window {}", record.date, window);
        }
    }
    Ok(records)
}
