//! Interactive HTML charts of a dataset. Requires the `charts` feature.

use crate::analysis::daily_frame::{DailyFrame, Measure};
use crate::analysis::error::AnalysisError;
use crate::types::dataset::Dataset;
use log::info;
use plotlars::{BarPlot, Legend, Line, LinePlot, Plot, Rgb, Text, TimeSeriesPlot};
use polars::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    #[error("Failed to build chart data")]
    Polars(#[from] PolarsError),

    #[error("Failed to create chart directory '{0}'")]
    OutputDir(PathBuf, #[source] std::io::Error),

    #[error("Chart path '{0}' is not valid UTF-8")]
    NonUtf8Path(PathBuf),

    #[error("No records to chart")]
    Empty,
}

fn path_string(path: &Path) -> Result<String, ChartError> {
    path.to_str()
        .map(str::to_string)
        .ok_or_else(|| ChartError::NonUtf8Path(path.to_path_buf()))
}

/// Daily max and min temperature over the whole dataset.
pub fn temperature_chart(frame: &DailyFrame, path: &Path) -> Result<(), ChartError> {
    let df = frame.frame.clone().collect()?;
    TimeSeriesPlot::builder()
        .data(&df)
        .x("date")
        .y(Measure::MaxTemperature.column())
        .additional_series(vec![Measure::MinTemperature.column()])
        .colors(vec![Rgb(235, 117, 0), Rgb(69, 157, 230)])
        .lines(vec![Line::Solid, Line::Solid])
        .plot_title(Text::from("Daily temperature").size(18))
        .legend(&Legend::new().x(0.05).y(0.95))
        .y_title("°C")
        .build()
        .write_html(path_string(path)?);
    Ok(())
}

/// Mean high, low and average temperature for each day of the year.
pub fn day_of_year_chart(frame: &DailyFrame, path: &Path) -> Result<(), ChartError> {
    let means = frame.day_of_year_means()?;
    let df = df!(
        "day" => means.iter().map(|m| m.day).collect::<Vec<u32>>(),
        "high" => means.iter().map(|m| m.max_c).collect::<Vec<f64>>(),
        "low" => means.iter().map(|m| m.min_c).collect::<Vec<f64>>(),
        "average" => means.iter().map(|m| m.avg_c).collect::<Vec<f64>>(),
    )?;
    LinePlot::builder()
        .data(&df)
        .x("day")
        .y("high")
        .additional_lines(vec!["low", "average"])
        .colors(vec![Rgb(214, 39, 40), Rgb(31, 119, 180), Rgb(44, 160, 44)])
        .lines(vec![Line::Solid, Line::Solid, Line::Dash])
        .plot_title(Text::from("Temperature by day of year").size(18))
        .x_title("Day of year")
        .y_title("°C")
        .build()
        .write_html(path_string(path)?);
    Ok(())
}

/// Average temperature by day of year, one line per year.
pub fn yearly_overlay_chart(frame: &DailyFrame, path: &Path) -> Result<(), ChartError> {
    let avg = Measure::AvgTemperature.column();
    let by_day = frame.frame.clone().select([
        col("date").dt().year().cast(DataType::Int32).alias("year"),
        col("date")
            .dt()
            .ordinal_day()
            .cast(DataType::UInt32)
            .alias("day"),
        col(avg),
    ]);
    let years = by_day
        .clone()
        .select([col("year").unique().sort(SortOptions::default())])
        .collect()?;
    let years: Vec<i32> = years.column("year")?.i32()?.into_no_null_iter().collect();

    let mut overlay = df!("day" => (1..=366u32).collect::<Vec<u32>>())?.lazy();
    for year in &years {
        let series = by_day
            .clone()
            .filter(col("year").eq(lit(*year)))
            .select([col("day"), col(avg).alias(year.to_string())]);
        overlay = overlay.left_join(series, col("day"), col("day"));
    }
    let df = overlay
        .sort(["day"], SortMultipleOptions::default())
        .collect()?;

    let names: Vec<String> = years.iter().map(i32::to_string).collect();
    let (first, rest) = names.split_first().ok_or(ChartError::Empty)?;
    LinePlot::builder()
        .data(&df)
        .x("day")
        .y(first)
        .additional_lines(rest.iter().map(String::as_str).collect())
        .plot_title(Text::from("Average temperature by day of year, per year").size(18))
        .x_title("Day of year")
        .y_title("°C")
        .build()
        .write_html(path_string(path)?);
    Ok(())
}

/// Daily peak wind gust over the whole dataset.
pub fn wind_gust_chart(frame: &DailyFrame, path: &Path) -> Result<(), ChartError> {
    let gust = Measure::WindGust.column();
    let df = frame
        .frame
        .clone()
        .select([col("date"), col(gust)])
        .filter(col(gust).is_not_null())
        .collect()?;
    TimeSeriesPlot::builder()
        .data(&df)
        .x("date")
        .y(gust)
        .colors(vec![Rgb(148, 103, 189)])
        .plot_title(Text::from("Daily wind gust").size(18))
        .y_title("km/h")
        .build()
        .write_html(path_string(path)?);
    Ok(())
}

/// Days per wind direction, bars ordered clockwise from north.
pub fn wind_rose_chart(frame: &DailyFrame, path: &Path) -> Result<(), ChartError> {
    let mut frequency = frame.wind_direction_frequency()?;
    frequency.sort_by(|a, b| a.direction.degrees().total_cmp(&b.direction.degrees()));
    let df = df!(
        "direction" => frequency
            .iter()
            .map(|f| format!("{} ({}°)", f.direction, f.direction.degrees()))
            .collect::<Vec<String>>(),
        "days" => frequency.iter().map(|f| f.days).collect::<Vec<u32>>(),
    )?;
    BarPlot::builder()
        .data(&df)
        .labels("direction")
        .values("days")
        .plot_title(Text::from("Wind direction").size(18))
        .x_title("Direction")
        .y_title("Days")
        .build()
        .write_html(path_string(path)?);
    Ok(())
}

/// Monthly mean wind speed, for months with wind data.
pub fn monthly_wind_chart(frame: &DailyFrame, path: &Path) -> Result<(), ChartError> {
    let means: Vec<_> = frame
        .monthly_means(Measure::WindSpeed)?
        .into_iter()
        .filter_map(|m| Some((m.month.to_string(), m.mean?)))
        .collect();
    let df = df!(
        "month" => means.iter().map(|(month, _)| month.as_str()).collect::<Vec<&str>>(),
        "wind_speed_kmph" => means.iter().map(|(_, mean)| *mean).collect::<Vec<f64>>(),
    )?;
    TimeSeriesPlot::builder()
        .data(&df)
        .x("month")
        .y("wind_speed_kmph")
        .plot_title(Text::from("Monthly average wind speed").size(18))
        .y_title("km/h")
        .build()
        .write_html(path_string(path)?);
    Ok(())
}

/// Writes every chart into `dir` and returns the files written. An empty dataset writes
/// nothing.
pub fn write_charts(dataset: &Dataset, dir: &Path) -> Result<Vec<PathBuf>, ChartError> {
    std::fs::create_dir_all(dir).map_err(|e| ChartError::OutputDir(dir.to_path_buf(), e))?;
    if dataset.is_empty() {
        info!("No records, skipping charts");
        return Ok(Vec::new());
    }
    let frame = DailyFrame::from_dataset(dataset)?;

    let charts: [(&str, fn(&DailyFrame, &Path) -> Result<(), ChartError>); 6] = [
        ("temperature.html", temperature_chart),
        ("temperature_by_day_of_year.html", day_of_year_chart),
        ("temperature_by_day_of_year_per_year.html", yearly_overlay_chart),
        ("monthly_wind_speed.html", monthly_wind_chart),
        ("wind_gust.html", wind_gust_chart),
        ("wind_rose.html", wind_rose_chart),
    ];
    let mut written = Vec::with_capacity(charts.len());
    for (name, chart) in charts {
        let path = dir.join(name);
        chart(&frame, &path)?;
        info!("Wrote {}", path.display());
        written.push(path);
    }
    Ok(written)
}
