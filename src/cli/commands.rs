use crate::cli::args::{Cli, Commands};
use crate::config::{DataPaths, MalformedPolicy, PipelineConfig};
use crate::error::{ProcessingError, Result};
use crate::models::{SkippedGranule, TemperatureSeries, VariationSeries};
use crate::processors::{
    CoverageChecker, CoverageReport, DayDeduplicator, DeduplicationIndex, OutlierFilter,
    TimeSeriesAggregator,
};
use crate::readers::GranuleSource;
use crate::staging::{RetrievalRunner, Stager};
use crate::utils::progress::ProgressReporter;
use crate::writers::{get_file_info, read_series, CsvSeriesWriter, SeriesSink};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

pub async fn run(cli: Cli) -> Result<()> {
    setup_logging(cli.verbose, cli.log_file.as_deref())?;

    let mut config = PipelineConfig::load(cli.config.as_deref())?;
    if let Some(root) = cli.root {
        config = config.with_root_dir(root);
    }
    let paths = config.paths();
    debug!("Resolved paths: {:?}", paths);

    match cli.command {
        Commands::Download => {
            download(&config, &paths).await?;
        }

        Commands::Stage => {
            stage(&config, &paths)?;
        }

        Commands::Aggregate {
            outliers,
            no_save,
            skip_malformed,
            json,
        } => {
            if skip_malformed {
                config.on_malformed = MalformedPolicy::Skip;
            }

            let mut outcome = aggregate(&config, &paths, outliers, json)?;
            if !no_save {
                outcome.persist(&CsvSeriesWriter::new(&paths.interim_dir))?;
            }

            if json {
                println!("{}", to_json(&outcome)?);
            } else {
                print_aggregation(&outcome);
            }
        }

        Commands::Run {
            skip_download,
            outliers,
            skip_malformed,
        } => {
            if skip_malformed {
                config.on_malformed = MalformedPolicy::Skip;
            }

            if skip_download {
                println!("Skipping download, using files in {}", paths.staging_dir.display());
            } else {
                download(&config, &paths).await?;
            }
            stage(&config, &paths)?;

            let mut outcome = aggregate(&config, &paths, outliers, false)?;
            outcome.persist(&CsvSeriesWriter::new(&paths.interim_dir))?;
            print_aggregation(&outcome);
        }

        Commands::Inspect { json } => {
            let source = granule_source()?;
            let index = deduplicator(&config).deduplicate(&paths.raw_dir, &source)?;
            let checker = CoverageChecker::new();
            let coverage = checker.check(&index)?;

            if json {
                println!("{}", to_json(&InspectionReport { index, coverage })?);
            } else {
                print_index(&index);
                println!("\n{}", checker.generate_summary(&coverage));
            }
        }

        Commands::Info { file, sample } => {
            println!("Analyzing series file: {}", file.display());

            let file_info = get_file_info(&file)?;
            println!("\n{}", file_info.summary());

            if sample > 0 {
                let values = read_series(&file)?;
                println!("\nSample Values (showing {} of {}):", sample.min(values.len()), values.len());
                for (i, value) in values.iter().take(sample).enumerate() {
                    println!("{}. {:.2}", i + 1, value);
                }
            }
        }
    }

    Ok(())
}

/// Everything one aggregation run produced.
#[derive(Debug, Serialize)]
pub struct AggregationOutcome {
    pub raw_dir: PathBuf,
    pub granules: usize,
    pub duplicates: usize,
    pub skipped_granules: usize,
    /// Granules whose metadata could not be read, so no day was assigned
    pub unreadable: Vec<SkippedGranule>,
    pub temperature: TemperatureSeries,
    pub variation: VariationSeries,
    pub written: Vec<PathBuf>,
}

impl AggregationOutcome {
    /// Write both series; re-running replaces the files rather than appending
    pub fn persist(&mut self, sink: &impl SeriesSink) -> Result<()> {
        self.written.push(sink.persist_temperature(&self.temperature)?);
        self.written.push(sink.persist_variation(&self.variation)?);
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct InspectionReport {
    index: DeduplicationIndex,
    coverage: CoverageReport,
}

#[cfg(feature = "netcdf")]
fn granule_source() -> Result<crate::readers::NetcdfGranuleReader> {
    Ok(crate::readers::NetcdfGranuleReader::new())
}

#[cfg(not(feature = "netcdf"))]
fn granule_source() -> Result<crate::readers::MemoryGranuleSource> {
    Err(ProcessingError::Config(
        "ist-processor was built without the `netcdf` feature; granules cannot be read"
            .to_string(),
    ))
}

fn deduplicator(config: &PipelineConfig) -> DayDeduplicator {
    DayDeduplicator::new(&config.extension).with_policy(config.on_malformed)
}

async fn download(config: &PipelineConfig, paths: &DataPaths) -> Result<()> {
    println!("Downloading granules...");
    let progress = ProgressReporter::new_spinner("Running download script...", false);

    RetrievalRunner::from_config(&config.retrieval, &paths.staging_dir)
        .run()
        .await?;

    progress.finish_with_message("Download complete");
    Ok(())
}

fn stage(config: &PipelineConfig, paths: &DataPaths) -> Result<()> {
    println!(
        "Staging granules from {} to {}",
        paths.staging_dir.display(),
        paths.raw_dir.display()
    );

    let report = Stager::new(&config.extension, &config.sidecar_extension)
        .stage(&paths.staging_dir, &paths.raw_dir)?;

    println!("\n{}", report.summary());
    Ok(())
}

/// Deduplicate the raw directory and compute both series from one pass over
/// the selected granules
pub fn aggregate_with<S: GranuleSource>(
    source: S,
    config: &PipelineConfig,
    raw_dir: &Path,
    outliers: bool,
    progress: Option<&ProgressReporter>,
) -> Result<AggregationOutcome> {
    let aggregator = TimeSeriesAggregator::from_directory(
        source,
        OutlierFilter::from_config(&config.filter),
        &deduplicator(config),
        raw_dir,
    )?
    .with_policy(config.on_malformed);

    let temperature = aggregator.mean_series(outliers, progress)?;
    let variation = VariationSeries::from_means(&temperature);
    let index = aggregator.index();

    Ok(AggregationOutcome {
        raw_dir: raw_dir.to_path_buf(),
        granules: index.candidates,
        duplicates: index.duplicates.len(),
        skipped_granules: index.skipped.len() + temperature.skipped.len(),
        unreadable: index.skipped.clone(),
        temperature,
        variation,
        written: Vec::new(),
    })
}

fn aggregate(
    config: &PipelineConfig,
    paths: &DataPaths,
    outliers: bool,
    silent: bool,
) -> Result<AggregationOutcome> {
    if !silent {
        println!("Aggregating granules in {}", paths.raw_dir.display());
    }

    let progress = ProgressReporter::new(0, "Computing daily means...", silent);
    let outcome = aggregate_with(granule_source()?, config, &paths.raw_dir, outliers, Some(&progress))?;
    progress.finish_with_message(&format!("Computed {} daily means", outcome.temperature.len()));

    Ok(outcome)
}

fn print_index(index: &DeduplicationIndex) {
    println!("=== Granule Selection ===");
    println!("Directory: {}", index.directory.display());
    println!(
        "Granules: {}, Days: {}, Duplicates: {}, Unreadable: {}",
        index.candidates,
        index.len(),
        index.duplicates.len(),
        index.skipped.len()
    );
    for selected in index.iter() {
        let name = selected
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        println!("  {:>4}  {}  {}", selected.position, selected.day, name);
    }
}

fn print_aggregation(outcome: &AggregationOutcome) {
    print!("{}", aggregation_summary(outcome));
}

fn aggregation_summary(outcome: &AggregationOutcome) -> String {
    let mut summary = String::new();

    summary.push_str("\n=== Temperature Series ===\n");
    summary.push_str(&format!(
        "Granules: {}, Duplicates: {}, Skipped: {}\n",
        outcome.granules, outcome.duplicates, outcome.skipped_granules
    ));

    let means = outcome.temperature.values();
    for (i, daily) in outcome.temperature.days.iter().enumerate() {
        let change = i
            .checked_sub(1)
            .and_then(|j| outcome.variation.values.get(j))
            .map(|v| format!("{:+.2}", v))
            .unwrap_or_else(|| "-".to_string());

        summary.push_str(&match daily.outliers {
            Some(count) => format!(
                "{}  {:>7.2} K  {:>7}  ({} outliers)\n",
                daily.day, means[i], change, count
            ),
            None => format!("{}  {:>7.2} K  {:>7}\n", daily.day, means[i], change),
        });
    }

    if outcome.temperature.outlier_counts().is_some() {
        summary.push_str(&format!(
            "Total outliers: {}\n",
            outcome.temperature.total_outliers()
        ));
    }

    for skipped in outcome.unreadable.iter().chain(&outcome.temperature.skipped) {
        summary.push_str(&format!(
            "Skipped {}: {}\n",
            skipped.path.display(),
            skipped.reason
        ));
    }

    if outcome.written.is_empty() {
        summary.push_str("\nNo series files written\n");
    } else {
        summary.push('\n');
        for path in &outcome.written {
            summary.push_str(&format!("Wrote {}\n", path.display()));
        }
    }

    summary
}

fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value)
        .map_err(|e| ProcessingError::InvalidFormat(format!("Could not encode JSON: {}", e)))
}

/// Set up structured logging on stderr, or in `log_file` when given
fn setup_logging(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    use std::sync::Mutex;
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let log_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("ist_processor={}", log_level)));

    let result = match log_file {
        Some(path) => {
            let file = std::fs::File::create(path)?;
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .with_target(false)
                        .with_level(true)
                        .with_ansi(false)
                        .with_writer(Mutex::new(file)),
                )
                .try_init()
        }
        None => tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .try_init(),
    };

    result.map_err(|e| ProcessingError::Config(format!("Could not initialize logging: {}", e)))?;
    debug!("Logging initialized at level: {}", log_level);
    Ok(())
}
