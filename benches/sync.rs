use chrono::{Duration, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use weather_sync::{merge, plan_fetch_windows, DailyRecord, Dataset};

fn records(start: NaiveDate, days: i64, offset: f64) -> Vec<DailyRecord> {
    (0..days)
        .map(|i| {
            let max = (i % 30) as f64 + offset;
            DailyRecord::from_temperatures(start + Duration::days(i), max, max - 8.0)
        })
        .collect()
}

fn bench_sync(c: &mut Criterion) {
    let start = NaiveDate::from_ymd_opt(2010, 1, 1).unwrap_or_default();
    let existing = Dataset::from_records(records(start, 5_000, 0.0));
    let incoming = records(start + Duration::days(4_970), 62, 1.0);

    c.bench_function("merge_two_months", |b| {
        b.iter(|| merge(black_box(&existing), black_box(incoming.clone())))
    });

    let today = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap_or_default();
    let earliest = NaiveDate::from_ymd_opt(2008, 7, 1).unwrap_or_default();
    c.bench_function("plan_from_empty", |b| {
        b.iter(|| plan_fetch_windows(None, black_box(today), earliest, earliest))
    });
}

criterion_group!(benches, bench_sync);
criterion_main!(benches);
