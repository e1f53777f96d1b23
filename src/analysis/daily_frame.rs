//! Contains `DailyFrame`, a lazy polars view over a [`Dataset`] with the aggregations the
//! reports and charts are built from.

use crate::analysis::error::AnalysisError;
use crate::types::calendar::Month;
use crate::types::compass_point::CompassPoint;
use crate::types::dataset::Dataset;
use crate::types::period::{AnyDate, DatePeriod};
use chrono::NaiveDate;
use polars::prelude::*;
use serde::Serialize;

/// Numeric columns of a [`DailyFrame`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Measure {
    MaxTemperature,
    MinTemperature,
    AvgTemperature,
    UvIndex,
    SunHours,
    WindSpeed,
    WindGust,
}

impl Measure {
    pub fn column(self) -> &'static str {
        match self {
            Measure::MaxTemperature => "max_temp_c",
            Measure::MinTemperature => "min_temp_c",
            Measure::AvgTemperature => "avg_temp_c",
            Measure::UvIndex => "uv_index",
            Measure::SunHours => "sun_hour",
            Measure::WindSpeed => "wind_speed_kmph",
            Measure::WindGust => "wind_gust_kmph",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct YearCount {
    pub year: i32,
    pub days: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct YearValue {
    pub year: i32,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DayOfYearMean {
    /// 1-based ordinal day.
    pub day: u32,
    pub max_c: f64,
    pub min_c: f64,
    pub avg_c: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MonthlyMean {
    pub month: Month,
    /// `None` when every value in the month is missing.
    pub mean: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DirectionFrequency {
    pub direction: CompassPoint,
    pub days: u32,
    pub mean_speed_kmh: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct YearlySummary {
    pub year: i32,
    pub days: u32,
    pub mean_c: f64,
    pub min_c: f64,
    pub max_c: f64,
}

/// Mean average temperature of two calendar months in one year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MonthComparison {
    pub year: i32,
    pub first_mean_c: f64,
    pub second_mean_c: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ColderMonth {
    First,
    Second,
    Same,
}

impl MonthComparison {
    /// `first - second`; positive when the first month was warmer.
    pub fn difference(&self) -> f64 {
        self.first_mean_c - self.second_mean_c
    }

    pub fn colder(&self) -> ColderMonth {
        let diff = self.difference();
        if diff > 0.0 {
            ColderMonth::Second
        } else if diff < 0.0 {
            ColderMonth::First
        } else {
            ColderMonth::Same
        }
    }
}

fn year_expr() -> Expr {
    col("date").dt().year().cast(DataType::Int32).alias("year")
}

/// A wrapper around a polars `LazyFrame` holding one row per [`Dataset`] record.
///
/// Columns: `date` (Date), the temperature, UV, sun and wind measures as `f64`
/// (see [`Measure`]), and `wind_direction` as a compass label.
///
/// Filtering methods return a new `DailyFrame`; aggregations collect and return plain values.
#[derive(Clone)]
pub struct DailyFrame {
    /// The underlying polars LazyFrame.
    pub frame: LazyFrame,
}

impl DailyFrame {
    pub fn new(frame: LazyFrame) -> Self {
        Self { frame }
    }

    /// Builds the frame from a dataset's records.
    pub fn from_dataset(dataset: &Dataset) -> Result<Self, AnalysisError> {
        let records = dataset.records();
        let df = df!(
            "date" => records.iter().map(|r| r.date).collect::<Vec<NaiveDate>>(),
            Measure::MaxTemperature.column() => records.iter().map(|r| r.temperature_max_c).collect::<Vec<f64>>(),
            Measure::MinTemperature.column() => records.iter().map(|r| r.temperature_min_c).collect::<Vec<f64>>(),
            Measure::AvgTemperature.column() => records.iter().map(|r| r.temperature_avg_c).collect::<Vec<f64>>(),
            Measure::UvIndex.column() => records.iter().map(|r| r.uv_index.map(f64::from)).collect::<Vec<Option<f64>>>(),
            Measure::SunHours.column() => records.iter().map(|r| r.sun_hours).collect::<Vec<Option<f64>>>(),
            Measure::WindSpeed.column() => records.iter().map(|r| r.wind_speed_kmh).collect::<Vec<Option<f64>>>(),
            Measure::WindGust.column() => records.iter().map(|r| r.wind_gust_kmh).collect::<Vec<Option<f64>>>(),
            "wind_direction" => records
                .iter()
                .map(|r| r.wind_direction_compass.map(CompassPoint::label))
                .collect::<Vec<Option<&str>>>(),
        )?;
        Ok(Self::new(df.lazy()))
    }

    /// Filters rows with an arbitrary polars predicate.
    ///
    /// ```
    /// # use weather_sync::{DailyFrame, DailyRecord, Dataset};
    /// # use chrono::NaiveDate;
    /// use polars::prelude::{col, lit};
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let day = |d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap();
    /// let dataset = Dataset::from_records(vec![
    ///     DailyRecord::from_temperatures(day(1), -12.0, -20.0),
    ///     DailyRecord::from_temperatures(day(2), 3.0, -1.0),
    /// ]);
    /// let frame = DailyFrame::from_dataset(&dataset)?;
    /// let frigid = frame.filter(col("max_temp_c").lt(lit(-10.0))).frame.collect()?;
    /// assert_eq!(frigid.height(), 1);
    /// # Ok(())
    /// # }
    /// ```
    pub fn filter(&self, predicate: Expr) -> DailyFrame {
        DailyFrame::new(self.frame.clone().filter(predicate))
    }

    /// Keeps rows from the start of `start` through the end of `end`, inclusive.
    pub fn get_range(
        &self,
        start: impl AnyDate,
        end: impl AnyDate,
    ) -> Result<DailyFrame, AnalysisError> {
        let start = start
            .get_date_range()
            .ok_or(AnalysisError::DateParsing)?
            .start;
        let end = end.get_date_range().ok_or(AnalysisError::DateParsing)?.end;

        Ok(self.filter(
            col("date")
                .gt_eq(lit(start))
                .and(col("date").lt_eq(lit(end))),
        ))
    }

    /// The row for a single date. For multi-day inputs the first day is used.
    pub fn get_at(&self, date: impl AnyDate) -> Result<DailyFrame, AnalysisError> {
        let date = date
            .get_date_range()
            .ok_or(AnalysisError::DateParsing)?
            .start;
        Ok(self.filter(col("date").eq(lit(date))))
    }

    pub fn get_for_period(&self, period: impl DatePeriod) -> Result<DailyFrame, AnalysisError> {
        let period = period
            .get_date_period()
            .ok_or(AnalysisError::DateParsing)?;
        self.get_range(period.start, period.end)
    }

    /// Per-year count of days where `measure` is below `threshold`.
    ///
    /// Every year with data is listed, including years with no such day.
    pub fn days_below_by_year(
        &self,
        measure: Measure,
        threshold: f64,
    ) -> Result<Vec<YearCount>, AnalysisError> {
        let df = self
            .frame
            .clone()
            .group_by([year_expr()])
            .agg([col(measure.column())
                .lt(lit(threshold))
                .cast(DataType::UInt32)
                .sum()
                .cast(DataType::UInt32)
                .alias("days")])
            .sort(["year"], SortMultipleOptions::default())
            .collect()?;

        let years = df.column("year")?.i32()?;
        let days = df.column("days")?.u32()?;
        Ok(years
            .into_iter()
            .zip(days)
            .filter_map(|(year, days)| {
                Some(YearCount {
                    year: year?,
                    days: days.unwrap_or(0),
                })
            })
            .collect())
    }

    /// Days with a minimum temperature below -10 °C, per year.
    pub fn cold_days_by_year(&self) -> Result<Vec<YearCount>, AnalysisError> {
        self.days_below_by_year(Measure::MinTemperature, -10.0)
    }

    /// Days that never got above -10 °C, per year.
    pub fn extreme_cold_days_by_year(&self) -> Result<Vec<YearCount>, AnalysisError> {
        self.days_below_by_year(Measure::MaxTemperature, -10.0)
    }

    /// Mean max, min and average temperature for each day of the year, across all years.
    pub fn day_of_year_means(&self) -> Result<Vec<DayOfYearMean>, AnalysisError> {
        let df = self
            .frame
            .clone()
            .group_by([col("date")
                .dt()
                .ordinal_day()
                .cast(DataType::UInt32)
                .alias("day")])
            .agg([
                col(Measure::MaxTemperature.column()).mean().alias("max"),
                col(Measure::MinTemperature.column()).mean().alias("min"),
                col(Measure::AvgTemperature.column()).mean().alias("avg"),
            ])
            .sort(["day"], SortMultipleOptions::default())
            .collect()?;

        let day = df.column("day")?.u32()?;
        let max = df.column("max")?.f64()?;
        let min = df.column("min")?.f64()?;
        let avg = df.column("avg")?.f64()?;
        Ok((0..df.height())
            .filter_map(|i| {
                Some(DayOfYearMean {
                    day: day.get(i)?,
                    max_c: max.get(i)?,
                    min_c: min.get(i)?,
                    avg_c: avg.get(i)?,
                })
            })
            .collect())
    }

    /// Mean of `measure` for every (year, month) present, chronologically.
    pub fn monthly_means(&self, measure: Measure) -> Result<Vec<MonthlyMean>, AnalysisError> {
        let df = self
            .frame
            .clone()
            .group_by([
                year_expr(),
                col("date")
                    .dt()
                    .month()
                    .cast(DataType::UInt32)
                    .alias("month"),
            ])
            .agg([col(measure.column()).mean().alias("mean")])
            .sort(["year", "month"], SortMultipleOptions::default())
            .collect()?;

        let years = df.column("year")?.i32()?;
        let months = df.column("month")?.u32()?;
        let means = df.column("mean")?.f64()?;
        Ok((0..df.height())
            .filter_map(|i| {
                Some(MonthlyMean {
                    month: Month(years.get(i)?, months.get(i)?),
                    mean: means.get(i),
                })
            })
            .collect())
    }

    /// Day counts and mean wind speed per compass point, most frequent first.
    ///
    /// Days without a recorded direction are left out.
    pub fn wind_direction_frequency(&self) -> Result<Vec<DirectionFrequency>, AnalysisError> {
        let df = self
            .frame
            .clone()
            .filter(col("wind_direction").is_not_null())
            .group_by([col("wind_direction")])
            .agg([
                len().cast(DataType::UInt32).alias("days"),
                col(Measure::WindSpeed.column()).mean().alias("mean_speed"),
            ])
            .sort(
                ["days", "wind_direction"],
                SortMultipleOptions::default().with_order_descending_multi([true, false]),
            )
            .collect()?;

        let directions = df.column("wind_direction")?.str()?;
        let days = df.column("days")?.u32()?;
        let speeds = df.column("mean_speed")?.f64()?;
        Ok((0..df.height())
            .filter_map(|i| {
                Some(DirectionFrequency {
                    direction: CompassPoint::from_label(directions.get(i)?)?,
                    days: days.get(i)?,
                    mean_speed_kmh: speeds.get(i),
                })
            })
            .collect())
    }

    /// Strongest gust recorded in each year that has gust data.
    pub fn peak_gust_by_year(&self) -> Result<Vec<YearValue>, AnalysisError> {
        let df = self
            .frame
            .clone()
            .filter(col(Measure::WindGust.column()).is_not_null())
            .group_by([year_expr()])
            .agg([col(Measure::WindGust.column()).max().alias("value")])
            .sort(["year"], SortMultipleOptions::default())
            .collect()?;

        let years = df.column("year")?.i32()?;
        let values = df.column("value")?.f64()?;
        Ok(years
            .into_iter()
            .zip(values)
            .filter_map(|(year, value)| {
                Some(YearValue {
                    year: year?,
                    value: value?,
                })
            })
            .collect())
    }

    /// Mean average temperature of calendar months `first` and `second` (1-12), for every
    /// year that has data for both.
    pub fn compare_months(
        &self,
        first: u32,
        second: u32,
    ) -> Result<Vec<MonthComparison>, AnalysisError> {
        let avg = Measure::AvgTemperature.column();
        let month = || col("date").dt().month().cast(DataType::Int32);
        let df = self
            .frame
            .clone()
            .group_by([year_expr()])
            .agg([
                col(avg)
                    .filter(month().eq(lit(first as i32)))
                    .mean()
                    .alias("first"),
                col(avg)
                    .filter(month().eq(lit(second as i32)))
                    .mean()
                    .alias("second"),
            ])
            .filter(col("first").is_not_null().and(col("second").is_not_null()))
            .sort(["year"], SortMultipleOptions::default())
            .collect()?;

        let years = df.column("year")?.i32()?;
        let firsts = df.column("first")?.f64()?;
        let seconds = df.column("second")?.f64()?;
        Ok((0..df.height())
            .filter_map(|i| {
                Some(MonthComparison {
                    year: years.get(i)?,
                    first_mean_c: firsts.get(i)?,
                    second_mean_c: seconds.get(i)?,
                })
            })
            .collect())
    }

    /// Mean, lowest and highest daily average temperature per year.
    pub fn yearly_temperature_summary(&self) -> Result<Vec<YearlySummary>, AnalysisError> {
        let avg = Measure::AvgTemperature.column();
        let df = self
            .frame
            .clone()
            .group_by([year_expr()])
            .agg([
                len().cast(DataType::UInt32).alias("days"),
                col(avg).mean().alias("mean"),
                col(avg).min().alias("min"),
                col(avg).max().alias("max"),
            ])
            .sort(["year"], SortMultipleOptions::default())
            .collect()?;

        let years = df.column("year")?.i32()?;
        let days = df.column("days")?.u32()?;
        let mean = df.column("mean")?.f64()?;
        let min = df.column("min")?.f64()?;
        let max = df.column("max")?.f64()?;
        Ok((0..df.height())
            .filter_map(|i| {
                Some(YearlySummary {
                    year: years.get(i)?,
                    days: days.get(i)?,
                    mean_c: mean.get(i)?,
                    min_c: min.get(i)?,
                    max_c: max.get(i)?,
                })
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::calendar::Year;
    use crate::types::daily_record::DailyRecord;
    use chrono::Datelike;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn windy(date: NaiveDate, max: f64, min: f64, dir: CompassPoint, speed: f64, gust: f64) -> DailyRecord {
        let mut record = DailyRecord::from_temperatures(date, max, min);
        record.wind_direction_compass = Some(dir);
        record.wind_speed_kmh = Some(speed);
        record.wind_gust_kmh = Some(gust);
        record
    }

    fn sample() -> Dataset {
        Dataset::from_records(vec![
            DailyRecord::from_temperatures(d(2022, 1, 1), -12.0, -20.0),
            DailyRecord::from_temperatures(d(2022, 1, 2), -4.0, -11.0),
            DailyRecord::from_temperatures(d(2022, 7, 1), 25.0, 15.0),
            windy(d(2023, 1, 1), -2.0, -8.0, CompassPoint::NorthWest, 20.0, 40.0),
            windy(d(2023, 1, 2), 0.0, -6.0, CompassPoint::NorthWest, 10.0, 55.0),
            windy(d(2023, 1, 3), 4.0, 0.0, CompassPoint::South, 30.0, 35.0),
        ])
    }

    fn frame() -> DailyFrame {
        DailyFrame::from_dataset(&sample()).unwrap()
    }

    #[test]
    fn test_frame_schema() -> Result<(), Box<dyn std::error::Error>> {
        let df = frame().frame.collect()?;
        assert_eq!(df.height(), 6);
        assert_eq!(df.column("date")?.dtype(), &DataType::Date);
        assert_eq!(df.column("max_temp_c")?.dtype(), &DataType::Float64);
        assert_eq!(df.column("wind_direction")?.dtype(), &DataType::String);
        Ok(())
    }

    #[test]
    fn test_get_range_and_period() -> Result<(), Box<dyn std::error::Error>> {
        let january = frame().get_for_period(Month(2023, 1))?.frame.collect()?;
        assert_eq!(january.height(), 3);

        let span = frame().get_range(d(2022, 1, 2), Year(2022))?.frame.collect()?;
        assert_eq!(span.height(), 2);

        let single = frame().get_at("2022-07-01")?.frame.collect()?;
        assert_eq!(single.height(), 1);
        assert_eq!(single.column("max_temp_c")?.f64()?.get(0), Some(25.0));

        assert!(matches!(
            frame().get_at("July 1st"),
            Err(AnalysisError::DateParsing)
        ));
        Ok(())
    }

    #[test]
    fn test_days_below_by_year_lists_zero_years() -> Result<(), AnalysisError> {
        let cold = frame().cold_days_by_year()?;
        assert_eq!(
            cold,
            vec![
                YearCount { year: 2022, days: 2 },
                YearCount { year: 2023, days: 0 },
            ]
        );
        let extreme = frame().extreme_cold_days_by_year()?;
        assert_eq!(extreme[0], YearCount { year: 2022, days: 1 });
        assert_eq!(extreme[1].days, 0);
        Ok(())
    }

    #[test]
    fn test_day_of_year_means_average_across_years() -> Result<(), AnalysisError> {
        let means = frame().day_of_year_means()?;
        let first = means[0];
        assert_eq!(first.day, d(2022, 1, 1).ordinal());
        assert_eq!(first.max_c, -7.0);
        assert_eq!(first.min_c, -14.0);
        assert_eq!(means.last().map(|m| m.day), Some(d(2022, 7, 1).ordinal()));
        Ok(())
    }

    #[test]
    fn test_monthly_means_skip_missing_values() -> Result<(), AnalysisError> {
        let wind = frame().monthly_means(Measure::WindSpeed)?;
        assert_eq!(wind.len(), 3);
        assert_eq!(wind[0], MonthlyMean { month: Month(2022, 1), mean: None });
        assert_eq!(wind[2], MonthlyMean { month: Month(2023, 1), mean: Some(20.0) });
        Ok(())
    }

    #[test]
    fn test_wind_direction_frequency_most_frequent_first() -> Result<(), AnalysisError> {
        let frequency = frame().wind_direction_frequency()?;
        assert_eq!(
            frequency,
            vec![
                DirectionFrequency {
                    direction: CompassPoint::NorthWest,
                    days: 2,
                    mean_speed_kmh: Some(15.0),
                },
                DirectionFrequency {
                    direction: CompassPoint::South,
                    days: 1,
                    mean_speed_kmh: Some(30.0),
                },
            ]
        );
        Ok(())
    }

    #[test]
    fn test_peak_gust_and_yearly_summary() -> Result<(), AnalysisError> {
        assert_eq!(
            frame().peak_gust_by_year()?,
            vec![YearValue { year: 2023, value: 55.0 }]
        );

        let summary = frame().yearly_temperature_summary()?;
        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0].year, 2022);
        assert_eq!(summary[0].days, 3);
        assert_eq!(summary[0].min_c, -16.0);
        assert_eq!(summary[0].max_c, 20.0);
        assert_eq!(summary[1].mean_c, -2.0);
        Ok(())
    }

    #[test]
    fn test_compare_months_only_years_with_both() -> Result<(), AnalysisError> {
        let dataset = Dataset::from_records(vec![
            DailyRecord::from_temperatures(d(2022, 3, 1), 4.0, -2.0),
            DailyRecord::from_temperatures(d(2022, 3, 2), 6.0, 0.0),
            DailyRecord::from_temperatures(d(2022, 11, 1), 8.0, 2.0),
            DailyRecord::from_temperatures(d(2023, 3, 1), 10.0, 0.0),
            DailyRecord::from_temperatures(d(2023, 11, 1), 2.0, 0.0),
            DailyRecord::from_temperatures(d(2024, 3, 1), 2.0, 0.0),
        ]);

        let comparison = DailyFrame::from_dataset(&dataset)?.compare_months(3, 11)?;

        assert_eq!(comparison.len(), 2);
        assert_eq!(
            comparison[0],
            MonthComparison { year: 2022, first_mean_c: 2.0, second_mean_c: 5.0 }
        );
        assert_eq!(comparison[0].colder(), ColderMonth::First);
        assert_eq!(comparison[1].year, 2023);
        assert_eq!(comparison[1].difference(), 4.0);
        assert_eq!(comparison[1].colder(), ColderMonth::Second);
        Ok(())
    }

    #[test]
    fn test_empty_dataset_yields_empty_results() -> Result<(), AnalysisError> {
        let frame = DailyFrame::from_dataset(&Dataset::new())?;
        assert!(frame.cold_days_by_year()?.is_empty());
        assert!(frame.wind_direction_frequency()?.is_empty());
        assert!(frame.yearly_temperature_summary()?.is_empty());
        assert!(frame.compare_months(3, 11)?.is_empty());
        Ok(())
    }
}
