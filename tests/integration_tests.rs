use ist_processor::cli::commands::aggregate_with;
use ist_processor::config::{DataPaths, MalformedPolicy, PipelineConfig};
use ist_processor::processors::{
    CoverageChecker, DayDeduplicator, OutlierFilter, TimeSeriesAggregator,
};
use ist_processor::readers::MemoryGranuleSource;
use ist_processor::staging::Stager;
use ist_processor::writers::{read_series, CsvSeriesWriter, SeriesSink};
use ist_processor::ProcessingError;
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn touch(dir: &Path, name: &str) {
    fs::write(dir.join(name), b"").expect("Failed to create granule placeholder");
}

// Two passes over the same day, a gap on 07-08 and one hot pixel on 07-06
fn july_source(raw_dir: &Path) -> MemoryGranuleSource {
    let mut source = MemoryGranuleSource::new();
    for (name, time, values) in [
        ("VNP30.A2022186.0100.nc", "2022-07-05T03:10:00Z", vec![0.0, 250.0, 270.0, 65533.0]),
        ("VNP30.A2022186.1300.nc", "2022-07-05T15:40:00Z", vec![200.0, 210.0]),
        ("VNP30.A2022187.0100.nc", "2022-07-06T03:05:00Z", vec![262.5, 3900.0, 301.0]),
        ("VNP30.A2022188.0100.nc", "2022-07-07T02:55:00Z", vec![255.25, 256.75]),
        ("VNP30.A2022190.0100.nc", "2022-07-09T03:00:00Z", vec![258.0]),
    ] {
        touch(raw_dir, name);
        source.insert(name, time, values);
    }
    source
}

#[test]
fn test_stage_then_aggregate() {
    let root = TempDir::new().expect("Failed to create temp directory");
    let paths = DataPaths::from_root(root.path());
    fs::create_dir_all(&paths.staging_dir).unwrap();

    let source = july_source(&paths.staging_dir);
    touch(&paths.staging_dir, "VNP30.A2022186.0100.nc.xml");
    touch(&paths.staging_dir, "nsidc-download.py");

    let report = Stager::default()
        .stage(&paths.staging_dir, &paths.raw_dir)
        .unwrap();
    assert_eq!(report.moved.len(), 5);
    assert_eq!(report.sidecars_removed.len(), 1);
    assert_eq!(report.ignored, 1);

    let config = PipelineConfig::default().with_root_dir(root.path());
    let mut outcome = aggregate_with(&source, &config, &paths.raw_dir, true, None).unwrap();

    assert_eq!(outcome.granules, 5);
    assert_eq!(outcome.duplicates, 1);
    assert_eq!(outcome.temperature.values(), vec![260.0, 262.5, 256.0, 258.0]);
    assert_eq!(outcome.temperature.outlier_counts(), Some(vec![0, 1, 0, 0]));
    assert_eq!(outcome.variation.values, vec![2.5, -6.5, 2.0]);

    outcome
        .persist(&CsvSeriesWriter::new(&paths.interim_dir))
        .unwrap();
    assert_eq!(
        read_series(&paths.interim_dir.join("4days_temperature.csv")).unwrap(),
        vec![260.0, 262.5, 256.0, 258.0]
    );
    assert_eq!(
        read_series(&paths.interim_dir.join("4days_temperature_var.csv")).unwrap(),
        vec![2.5, -6.5, 2.0]
    );
}

#[test]
fn test_duplicates_are_never_read() {
    let dir = TempDir::new().unwrap();
    let source = july_source(dir.path());

    let aggregator = TimeSeriesAggregator::from_directory(
        &source,
        OutlierFilter::default(),
        &DayDeduplicator::default(),
        dir.path(),
    )
    .unwrap();

    assert_eq!(aggregator.index().positions(), vec![0, 2, 3, 4]);
    aggregator.mean_series(false, None).unwrap();

    let read: Vec<String> = source
        .granule_reads()
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert!(!read.contains(&"VNP30.A2022186.1300.nc".to_string()));
    assert_eq!(read.len(), 4);
}

#[test]
fn test_series_lengths_agree() {
    let dir = TempDir::new().unwrap();
    let source = july_source(dir.path());

    let aggregator = TimeSeriesAggregator::from_directory(
        &source,
        OutlierFilter::default(),
        &DayDeduplicator::default(),
        dir.path(),
    )
    .unwrap();

    let means = aggregator.mean_series(false, None).unwrap();
    let variation = aggregator.variation_series(None).unwrap();

    assert_eq!(means.len(), aggregator.index().len());
    assert_eq!(variation.len(), means.len() - 1);
    assert_eq!(variation.day_count, means.len());
    assert!(means.outlier_counts().is_none());
}

#[test]
fn test_coverage_of_raw_directory() {
    let dir = TempDir::new().unwrap();
    let source = july_source(dir.path());

    let index = DayDeduplicator::default()
        .deduplicate(dir.path(), &source)
        .unwrap();
    let coverage = CoverageChecker::new().check(&index).unwrap();

    assert_eq!(coverage.present_days, 4);
    assert_eq!(coverage.span_days(), 5);
    assert_eq!(coverage.missing_days.len(), 1);
    assert_eq!(coverage.missing_days[0].to_string(), "2022-07-08");
}

#[test]
fn test_malformed_granule_policies() {
    let dir = TempDir::new().unwrap();
    let mut source = july_source(dir.path());
    touch(dir.path(), "VNP30.A2022189.0100.nc");
    source.insert_malformed("VNP30.A2022189.0100.nc", Some("2022-07-08T03:00:00Z"), "no IST_Data group");

    let halting = PipelineConfig::default();
    let err = aggregate_with(&source, &halting, dir.path(), false, None).unwrap_err();
    assert!(matches!(err, ProcessingError::FileFormat { .. }));

    let mut skipping = PipelineConfig::default();
    skipping.on_malformed = MalformedPolicy::Skip;
    let outcome = aggregate_with(&source, &skipping, dir.path(), false, None).unwrap();

    assert_eq!(outcome.temperature.len(), 4);
    assert_eq!(outcome.skipped_granules, 1);
    assert!(outcome.temperature.skipped[0]
        .path
        .ends_with("VNP30.A2022189.0100.nc"));
}

#[test]
fn test_all_fill_granule_halts() {
    let dir = TempDir::new().unwrap();
    touch(dir.path(), "fill.nc");
    let source = MemoryGranuleSource::new().with_granule(
        "fill.nc",
        "2022-07-05T00:00:00Z",
        vec![0.0, 65533.0, 3700.0],
    );

    let err = aggregate_with(&source, &PipelineConfig::default(), dir.path(), false, None)
        .unwrap_err();
    assert!(matches!(err, ProcessingError::EmptyData { .. }));
}

#[test]
fn test_empty_raw_directory() {
    let dir = TempDir::new().unwrap();
    let writer = CsvSeriesWriter::new(dir.path().join("interim"));

    let mut outcome = aggregate_with(
        MemoryGranuleSource::new(),
        &PipelineConfig::default(),
        dir.path(),
        false,
        None,
    )
    .unwrap();
    assert!(outcome.temperature.is_empty());
    assert!(outcome.variation.is_empty());

    outcome.persist(&writer).unwrap();
    assert_eq!(
        read_series(&dir.path().join("interim").join("0days_temperature.csv")).unwrap(),
        Vec::<f64>::new()
    );
    assert!(writer.persist(&[1.0], "../outside").is_err());
}
