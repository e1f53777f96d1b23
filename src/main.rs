//! `weather-sync` command line.

use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use log::{error, info, warn};
use serde::Serialize;
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;
use weather_sync::{
    cold_streaks, month_abbreviation, month_window, ColdStreak, DailyFrame, DatasetStore,
    DirectionFrequency, Month, MonthComparison, SyncConfig, SyncOutcome, Synchronizer,
    WeatherSyncError, WorldWeatherOnline, YearCount, YearValue, YearlySummary,
    DEFAULT_DATA_FILE,
};

#[derive(Parser)]
#[command(name = "weather-sync")]
#[command(about = "Keep a local CSV of daily weather observations up to date", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch missing months from the provider and merge them into the data file
    Sync {
        /// First date to fetch when the data file is empty (YYYY-MM-DD)
        #[arg(long)]
        from: Option<NaiveDate>,
        /// Data file, overrides WEATHER_DATA_FILE
        #[arg(long)]
        file: Option<PathBuf>,
        /// Location query, overrides WEATHER_LOCATION
        #[arg(long)]
        location: Option<String>,
        /// Also re-fetch the current month when the data file already reached it
        #[arg(long)]
        refresh_current_month: bool,
        /// Re-fetch only these months (YYYY-MM), e.g. the failed windows of an earlier run
        #[arg(long = "retry", value_name = "YYYY-MM", conflicts_with = "refresh_current_month")]
        retry: Vec<Month>,
        /// Print the run report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print cold-day, streak, month comparison and wind summaries
    Report {
        #[arg(long)]
        file: Option<PathBuf>,
        /// Month to look for cold streaks in (1-12)
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..=12))]
        streak_month: u32,
        /// Daily maximum below which a day counts toward a streak (°C)
        #[arg(long, default_value_t = -5.0, allow_negative_numbers = true)]
        streak_threshold: f64,
        #[arg(long)]
        json: bool,
    },
    /// Write interactive HTML charts
    #[cfg(feature = "charts")]
    Chart {
        #[arg(long)]
        file: Option<PathBuf>,
        /// Output directory
        #[arg(long, default_value = "charts")]
        out: PathBuf,
    },
}

fn data_file(file: Option<PathBuf>) -> PathBuf {
    dotenvy::dotenv().ok();
    file.or_else(|| std::env::var_os("WEATHER_DATA_FILE").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_FILE))
}

async fn sync(
    from: Option<NaiveDate>,
    file: Option<PathBuf>,
    location: Option<String>,
    refresh_current_month: bool,
    retry: Vec<Month>,
    json: bool,
) -> Result<ExitCode, WeatherSyncError> {
    let mut config = SyncConfig::from_env()?;
    if let Some(from) = from {
        config.target_range_start = from;
    }
    if let Some(file) = file {
        config.data_file = file;
    }
    if let Some(location) = location {
        config.location = location;
    }
    info!("Syncing '{}' into {}", config.location, config.data_file.display());

    let provider = WorldWeatherOnline::new(config.api_key.clone(), config.request_timeout)?;
    let target = config.target_range_start;
    let earliest_available = config.earliest_available;
    let synchronizer = Synchronizer::builder()
        .config(config)
        .provider(provider)
        .build();

    let cancel = CancellationToken::new();
    let on_ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, stopping before the next save");
            on_ctrl_c.cancel();
        }
    });

    let today = Local::now().date_naive();
    let mut report = if retry.is_empty() {
        synchronizer.run_with_cancel(target, today, &cancel).await?
    } else {
        let windows: Vec<_> = retry
            .iter()
            .filter_map(|&month| {
                let window = month_window(month, today, earliest_available);
                if window.is_none() {
                    warn!("Skipping {}: outside the fetchable range", month);
                }
                window
            })
            .collect();
        synchronizer.run_windows(&windows, &cancel).await?
    };
    if refresh_current_month && report.outcome() == SyncOutcome::UpToDate {
        report = synchronizer.refresh_current_month(today, &cancel).await?;
    }

    if json {
        match serde_json::to_string_pretty(&report) {
            Ok(out) => println!("{out}"),
            Err(e) => error!("Failed to serialize report: {}", e),
        }
    }

    Ok(match report.outcome() {
        SyncOutcome::UpToDate | SyncOutcome::Updated => ExitCode::SUCCESS,
        SyncOutcome::PartiallyUpdated => ExitCode::from(2),
        SyncOutcome::Failed => ExitCode::FAILURE,
    })
}

#[derive(Serialize)]
struct AnalysisReport {
    yearly: Vec<YearlySummary>,
    cold_days: Vec<YearCount>,
    extreme_cold_days: Vec<YearCount>,
    cold_streaks: Vec<ColdStreak>,
    march_vs_november: Vec<MonthComparison>,
    wind_directions: Vec<DirectionFrequency>,
    peak_gusts: Vec<YearValue>,
}

fn print_report(report: &AnalysisReport, streak_month: u32, streak_threshold: f64) {
    println!("Year   Days   Mean °C   Min °C   Max °C");
    for y in &report.yearly {
        println!(
            "{:<6} {:>4} {:>9.1} {:>8.1} {:>8.1}",
            y.year, y.days, y.mean_c, y.min_c, y.max_c
        );
    }

    println!("\nDays with min < -10 °C / max < -10 °C");
    for (cold, extreme) in report.cold_days.iter().zip(&report.extreme_cold_days) {
        println!("{:<6} {:>4} / {}", cold.year, cold.days, extreme.days);
    }

    println!(
        "\n{} streaks with max < {:.1} °C",
        month_abbreviation(streak_month),
        streak_threshold
    );
    if report.cold_streaks.is_empty() {
        println!("  none");
    }
    for streak in &report.cold_streaks {
        println!("  {} days starting {}", streak.days, streak.start);
    }

    println!("\nMarch vs November mean temperature");
    for c in &report.march_vs_november {
        println!(
            "{:<6} {:>6.1} {:>6.1}  diff {:+.1}",
            c.year,
            c.first_mean_c,
            c.second_mean_c,
            c.difference()
        );
    }

    if !report.wind_directions.is_empty() {
        println!("\nWind direction  Days  Mean km/h");
        for w in &report.wind_directions {
            println!(
                "{:<15} {:>4} {:>10}",
                w.direction.label(),
                w.days,
                w.mean_speed_kmh
                    .map(|s| format!("{s:.1}"))
                    .unwrap_or_else(|| "-".to_string())
            );
        }
    }
    for gust in &report.peak_gusts {
        println!("Peak gust {}: {:.0} km/h", gust.year, gust.value);
    }
}

fn report(
    file: Option<PathBuf>,
    streak_month: u32,
    streak_threshold: f64,
    json: bool,
) -> Result<ExitCode, WeatherSyncError> {
    let dataset = DatasetStore::new(data_file(file)).load()?;
    let frame = DailyFrame::from_dataset(&dataset)?;

    let report = AnalysisReport {
        yearly: frame.yearly_temperature_summary()?,
        cold_days: frame.cold_days_by_year()?,
        extreme_cold_days: frame.extreme_cold_days_by_year()?,
        cold_streaks: cold_streaks(&dataset, streak_month, streak_threshold),
        march_vs_november: frame.compare_months(3, 11)?,
        wind_directions: frame.wind_direction_frequency()?,
        peak_gusts: frame.peak_gust_by_year()?,
    };

    if json {
        match serde_json::to_string_pretty(&report) {
            Ok(out) => println!("{out}"),
            Err(e) => error!("Failed to serialize report: {}", e),
        }
    } else {
        print_report(&report, streak_month, streak_threshold);
    }
    Ok(ExitCode::SUCCESS)
}

#[cfg(feature = "charts")]
fn chart(file: Option<PathBuf>, out: PathBuf) -> Result<ExitCode, WeatherSyncError> {
    let dataset = DatasetStore::new(data_file(file)).load()?;
    weather_sync::charts::write_charts(&dataset, &out)?;
    Ok(ExitCode::SUCCESS)
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Sync {
            from,
            file,
            location,
            refresh_current_month,
            retry,
            json,
        } => sync(from, file, location, refresh_current_month, retry, json).await,
        Commands::Report {
            file,
            streak_month,
            streak_threshold,
            json,
        } => report(file, streak_month, streak_threshold, json),
        #[cfg(feature = "charts")]
        Commands::Chart { file, out } => chart(file, out),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            error!("{}", e);
            let mut source = e.source();
            while let Some(cause) = source {
                error!("  caused by: {}", cause);
                source = cause.source();
            }
            ExitCode::FAILURE
        }
    }
}
