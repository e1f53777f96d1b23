//! Column layout of the persisted CSV and conversion between rows and `DailyRecord`s.

use crate::store::error::SchemaError;
use crate::types::compass_point::CompassPoint;
use crate::types::daily_record::{uv_index_from_f64, DailyRecord};
use crate::types::dataset::Dataset;
use chrono::NaiveDate;
use polars::prelude::*;
use std::path::Path;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Header written by every save, in order.
pub const COLUMNS: [&str; 12] = [
    "date",
    "max_temp_c",
    "min_temp_c",
    "max_temp_f",
    "min_temp_f",
    "avg_temp_c",
    "avg_temp_f",
    "uv_index",
    "sun_hour",
    "wind_speed_kmph",
    "wind_direction",
    "wind_gust_kmph",
];

/// Number of leading columns present in files written before wind data was collected.
const LEGACY_WIDTH: usize = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaVersion {
    /// Temperatures, UV index and sun hours only.
    Legacy,
    /// Full layout including the wind columns.
    Current,
}

impl SchemaVersion {
    pub fn columns(self) -> &'static [&'static str] {
        match self {
            SchemaVersion::Legacy => &COLUMNS[..LEGACY_WIDTH],
            SchemaVersion::Current => &COLUMNS,
        }
    }

    /// Matches a header exactly against the known layouts.
    pub fn detect<S: AsRef<str>>(header: &[S]) -> Option<Self> {
        [SchemaVersion::Current, SchemaVersion::Legacy]
            .into_iter()
            .find(|version| {
                let expected = version.columns();
                expected.len() == header.len()
                    && expected
                        .iter()
                        .zip(header)
                        .all(|(e, h)| *e == h.as_ref())
            })
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Builds the frame that gets written to disk, Fahrenheit columns included.
pub(crate) fn dataset_to_frame(dataset: &Dataset) -> PolarsResult<DataFrame> {
    let records = dataset.records();
    let dates: Vec<String> = records
        .iter()
        .map(|r| r.date.format(DATE_FORMAT).to_string())
        .collect();
    let max_c: Vec<f64> = records.iter().map(|r| r.temperature_max_c).collect();
    let min_c: Vec<f64> = records.iter().map(|r| r.temperature_min_c).collect();
    let max_f: Vec<f64> = records.iter().map(|r| round1(r.temperature_max_f())).collect();
    let min_f: Vec<f64> = records.iter().map(|r| round1(r.temperature_min_f())).collect();
    let avg_c: Vec<f64> = records.iter().map(|r| r.temperature_avg_c).collect();
    let avg_f: Vec<f64> = records.iter().map(|r| round1(r.temperature_avg_f())).collect();
    let uv: Vec<Option<u32>> = records.iter().map(|r| r.uv_index.map(u32::from)).collect();
    let sun: Vec<Option<f64>> = records.iter().map(|r| r.sun_hours).collect();
    let wind_speed: Vec<Option<f64>> = records.iter().map(|r| r.wind_speed_kmh).collect();
    let wind_direction: Vec<Option<&str>> = records
        .iter()
        .map(|r| r.wind_direction_compass.map(CompassPoint::label))
        .collect();
    let wind_gust: Vec<Option<f64>> = records.iter().map(|r| r.wind_gust_kmh).collect();

    df!(
        COLUMNS[0] => dates,
        COLUMNS[1] => max_c,
        COLUMNS[2] => min_c,
        COLUMNS[3] => max_f,
        COLUMNS[4] => min_f,
        COLUMNS[5] => avg_c,
        COLUMNS[6] => avg_f,
        COLUMNS[7] => uv,
        COLUMNS[8] => sun,
        COLUMNS[9] => wind_speed,
        COLUMNS[10] => wind_direction,
        COLUMNS[11] => wind_gust,
    )
}

fn string_column<'a>(
    df: &'a DataFrame,
    path: &Path,
    column: &'static str,
) -> Result<&'a StringChunked, SchemaError> {
    df.column(column)
        .and_then(|c| c.str())
        .map_err(|source| SchemaError::Column {
            path: path.to_path_buf(),
            column,
            source,
        })
}

struct WindColumns<'a> {
    speed: &'a StringChunked,
    direction: &'a StringChunked,
    gust: &'a StringChunked,
}

/// Reads rows of a frame whose columns were all loaded as strings.
///
/// Columns are resolved once up front; `wind` is `None` for legacy files.
struct RowReader<'a> {
    path: &'a Path,
    date: &'a StringChunked,
    max_temp: &'a StringChunked,
    min_temp: &'a StringChunked,
    avg_temp: &'a StringChunked,
    uv_index: &'a StringChunked,
    sun_hour: &'a StringChunked,
    wind: Option<WindColumns<'a>>,
}

impl<'a> RowReader<'a> {
    fn new(df: &'a DataFrame, path: &'a Path, version: SchemaVersion) -> Result<Self, SchemaError> {
        let wind = match version {
            SchemaVersion::Legacy => None,
            SchemaVersion::Current => Some(WindColumns {
                speed: string_column(df, path, "wind_speed_kmph")?,
                direction: string_column(df, path, "wind_direction")?,
                gust: string_column(df, path, "wind_gust_kmph")?,
            }),
        };
        Ok(Self {
            path,
            date: string_column(df, path, "date")?,
            max_temp: string_column(df, path, "max_temp_c")?,
            min_temp: string_column(df, path, "min_temp_c")?,
            avg_temp: string_column(df, path, "avg_temp_c")?,
            uv_index: string_column(df, path, "uv_index")?,
            sun_hour: string_column(df, path, "sun_hour")?,
            wind,
        })
    }

    fn optional_str(values: &'a StringChunked, row: usize) -> Option<&'a str> {
        values.get(row).map(str::trim).filter(|s| !s.is_empty())
    }

    fn optional_f64(
        &self,
        values: &'a StringChunked,
        column: &'static str,
        row: usize,
    ) -> Result<Option<f64>, SchemaError> {
        match Self::optional_str(values, row) {
            None => Ok(None),
            Some(raw) => raw
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(Some)
                .ok_or_else(|| self.invalid(column, row, raw)),
        }
    }

    fn required_f64(
        &self,
        values: &'a StringChunked,
        column: &'static str,
        row: usize,
    ) -> Result<f64, SchemaError> {
        self.optional_f64(values, column, row)?
            .ok_or_else(|| self.missing(column, row))
    }

    fn missing(&self, column: &'static str, row: usize) -> SchemaError {
        SchemaError::MissingValue {
            path: self.path.to_path_buf(),
            row,
            column,
        }
    }

    fn invalid(&self, column: &'static str, row: usize, value: &str) -> SchemaError {
        SchemaError::InvalidValue {
            path: self.path.to_path_buf(),
            row,
            column,
            value: value.to_string(),
        }
    }

    fn record(&self, row: usize) -> Result<DailyRecord, SchemaError> {
        let raw_date =
            Self::optional_str(self.date, row).ok_or_else(|| self.missing("date", row))?;
        // pandas-written files may carry a time component
        let date = NaiveDate::parse_from_str(raw_date, DATE_FORMAT)
            .or_else(|_| NaiveDate::parse_from_str(raw_date, "%Y-%m-%d %H:%M:%S"))
            .map_err(|_| self.invalid("date", row, raw_date))?;

        let uv_index = match self.optional_f64(self.uv_index, "uv_index", row)? {
            None => None,
            Some(v) => Some(
                uv_index_from_f64(v).ok_or_else(|| self.invalid("uv_index", row, &v.to_string()))?,
            ),
        };

        let mut record = DailyRecord {
            date,
            temperature_max_c: self.required_f64(self.max_temp, "max_temp_c", row)?,
            temperature_min_c: self.required_f64(self.min_temp, "min_temp_c", row)?,
            temperature_avg_c: self.required_f64(self.avg_temp, "avg_temp_c", row)?,
            uv_index,
            sun_hours: self.optional_f64(self.sun_hour, "sun_hour", row)?,
            wind_speed_kmh: None,
            wind_gust_kmh: None,
            wind_direction_compass: None,
        };

        if let Some(wind) = &self.wind {
            let direction = match Self::optional_str(wind.direction, row) {
                None => None,
                Some(raw) => Some(
                    CompassPoint::from_label(raw)
                        .ok_or_else(|| self.invalid("wind_direction", row, raw))?,
                ),
            };
            let mut speed = self.optional_f64(wind.speed, "wind_speed_kmph", row)?;
            let mut gust = self.optional_f64(wind.gust, "wind_gust_kmph", row)?;
            // Older update runs wrote 0 instead of leaving the cell empty.
            if direction.is_none() {
                speed = speed.filter(|v| *v != 0.0);
                gust = gust.filter(|v| *v != 0.0);
            }
            record.wind_speed_kmh = speed;
            record.wind_gust_kmh = gust;
            record.wind_direction_compass = direction;
        }

        Ok(record)
    }
}

/// Converts a frame read with every column as a string into records, validating the header.
pub(crate) fn frame_to_records(
    df: &DataFrame,
    path: &Path,
) -> Result<Vec<DailyRecord>, SchemaError> {
    let header: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();
    let version = SchemaVersion::detect(&header).ok_or_else(|| SchemaError::HeaderMismatch {
        path: path.to_path_buf(),
        expected: COLUMNS.iter().map(|c| c.to_string()).collect(),
        found: header.clone(),
    })?;

    let reader = RowReader::new(df, path, version)?;
    (0..df.height()).map(|row| reader.record(row)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_schema_versions() {
        assert_eq!(SchemaVersion::detect(&COLUMNS[..]), Some(SchemaVersion::Current));
        assert_eq!(
            SchemaVersion::detect(&COLUMNS[..9]),
            Some(SchemaVersion::Legacy)
        );
        assert_eq!(SchemaVersion::detect(&COLUMNS[..10]), None);

        let mut shuffled = COLUMNS.to_vec();
        shuffled.swap(1, 2);
        assert_eq!(SchemaVersion::detect(&shuffled), None);
    }

    #[test]
    fn test_frame_has_fixed_column_order() -> Result<(), Box<dyn std::error::Error>> {
        let mut record = DailyRecord::from_temperatures(
            NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
            3.0,
            -4.0,
        );
        record.wind_direction_compass = Some(CompassPoint::SouthWest);
        let df = dataset_to_frame(&Dataset::from_records(vec![record]))?;

        let names: Vec<String> = df.get_column_names().iter().map(|n| n.to_string()).collect();
        assert_eq!(names, COLUMNS);
        assert_eq!(df.height(), 1);
        assert_eq!(df.column("date")?.str()?.get(0), Some("2024-01-05"));
        assert_eq!(df.column("max_temp_f")?.f64()?.get(0), Some(37.4));
        assert_eq!(df.column("wind_direction")?.str()?.get(0), Some("SW"));
        assert_eq!(df.column("wind_gust_kmph")?.f64()?.get(0), None);
        Ok(())
    }
}
