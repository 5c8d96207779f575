use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ist_processor::models::{DailyMean, DayKey, Granule, GranuleMetadata, TemperatureSeries, VariationSeries};
use ist_processor::processors::OutlierFilter;
use ist_processor::utils::successive_differences;
use std::path::PathBuf;

// Synthetic swath: mostly plausible IST with fill values and a few hot pixels
fn create_test_grid(size: usize) -> Vec<f64> {
    (0..size)
        .map(|i| match i % 50 {
            0 => 65533.0,
            1 => 0.0,
            2 => 2500.0,
            3 => 310.0 + (i % 7) as f64,
            _ => 240.0 + (i % 40) as f64 * 0.5,
        })
        .collect()
}

fn create_test_series(days: usize) -> TemperatureSeries {
    let base = chrono::NaiveDate::from_ymd_opt(2022, 1, 1).unwrap();
    TemperatureSeries::new(
        (0..days)
            .map(|i| {
                let date = base + chrono::Duration::days(i as i64);
                DailyMean {
                    day: DayKey::from_production_time(&date.format("%Y-%m-%d").to_string()).unwrap(),
                    path: PathBuf::from(format!("granule_{}.nc", i)),
                    mean: 250.0 + (i as f64 * 0.37).sin() * 10.0,
                    outliers: None,
                }
            })
            .collect(),
    )
}

fn benchmark_outlier_filter(c: &mut Criterion) {
    let filter = OutlierFilter::default();
    let grid = create_test_grid(3200 * 768);

    c.bench_function("outlier_filter_clean", |b| {
        b.iter(|| black_box(filter.clean(black_box(&grid)).cleaned.len()))
    });
}

fn benchmark_granule_mean(c: &mut Criterion) {
    let filter = OutlierFilter::default();
    let mut group = c.benchmark_group("granule_mean_by_size");

    for &size in &[10_000usize, 100_000, 1_000_000] {
        let granule = Granule::new(
            PathBuf::from("bench.nc"),
            GranuleMetadata::new("2022-07-05T01:00:00Z"),
            vec![size],
            create_test_grid(size),
        )
        .unwrap();

        group.bench_with_input(BenchmarkId::new("values", size), &granule, |b, granule| {
            b.iter(|| black_box(filter.mean_of(granule, true).map(|m| m.mean).unwrap_or(0.0)))
        });
    }
    group.finish();
}

fn benchmark_variation(c: &mut Criterion) {
    let series = create_test_series(365);
    let means = series.raw_means();

    c.bench_function("successive_differences", |b| {
        b.iter(|| black_box(successive_differences(black_box(&means)).len()))
    });

    c.bench_function("variation_series", |b| {
        b.iter(|| black_box(VariationSeries::from_means(&series).len()))
    });
}

criterion_group!(
    benches,
    benchmark_outlier_filter,
    benchmark_granule_mean,
    benchmark_variation
);
criterion_main!(benches);
