use crate::config::MalformedPolicy;
use crate::error::Result;
use crate::models::{DailyMean, SkippedGranule, TemperatureSeries, VariationSeries};
use crate::processors::day_deduplicator::{DayDeduplicator, DeduplicationIndex, SelectedGranule};
use crate::processors::outlier_filter::OutlierFilter;
use crate::readers::GranuleSource;
use crate::utils::progress::ProgressReporter;
use std::path::Path;
use tracing::{debug, info, warn};

/// Daily mean and day-over-day variation series over a deduplicated granule
/// set. Computation only; persisting a series is the caller's choice (see
/// `writers::SeriesSink`).
pub struct TimeSeriesAggregator<S: GranuleSource> {
    source: S,
    filter: OutlierFilter,
    index: DeduplicationIndex,
    policy: MalformedPolicy,
}

impl<S: GranuleSource> TimeSeriesAggregator<S> {
    pub fn new(source: S, filter: OutlierFilter, index: DeduplicationIndex) -> Self {
        Self {
            source,
            filter,
            index,
            policy: MalformedPolicy::Halt,
        }
    }

    /// Deduplicate `dir` once and keep the index for every later call
    pub fn from_directory(
        source: S,
        filter: OutlierFilter,
        deduplicator: &DayDeduplicator,
        dir: &Path,
    ) -> Result<Self> {
        let index = deduplicator.deduplicate(dir, &source)?;
        Ok(Self::new(source, filter, index))
    }

    pub fn with_policy(mut self, policy: MalformedPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn index(&self) -> &DeduplicationIndex {
        &self.index
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Mean of the cleaned IST grid for every selected day, in traversal
    /// order. With `report_outliers` each day also carries the number of
    /// values that exceeded the bound.
    pub fn mean_series(
        &self,
        report_outliers: bool,
        progress: Option<&ProgressReporter>,
    ) -> Result<TemperatureSeries> {
        info!(
            "Computing daily means for {} days from {}",
            self.index.len(),
            self.index.directory.display()
        );

        if let Some(p) = progress {
            p.set_length(self.index.len() as u64);
            p.set_message("Computing daily means...");
        }

        let mut series = TemperatureSeries::default();

        for selected in self.index.iter() {
            match self.daily_mean(selected, report_outliers) {
                Ok(daily) => series.days.push(daily),
                Err(e) if self.policy == MalformedPolicy::Skip && e.is_granule_local() => {
                    warn!("Leaving {} out of the series: {}", selected.day, e);
                    series.skipped.push(SkippedGranule {
                        path: selected.path.clone(),
                        reason: e.to_string(),
                    });
                }
                Err(e) => return Err(e),
            }

            if let Some(p) = progress {
                p.increment(1);
            }
        }

        info!(
            "Computed {} daily means ({} skipped)",
            series.len(),
            series.skipped.len()
        );
        Ok(series)
    }

    /// Day-over-day differences of freshly computed daily means
    pub fn variation_series(&self, progress: Option<&ProgressReporter>) -> Result<VariationSeries> {
        let means = self.mean_series(false, progress)?;
        let variation = VariationSeries::from_means(&means);
        info!("Computed {} day-over-day variations", variation.len());
        Ok(variation)
    }

    fn daily_mean(&self, selected: &SelectedGranule, report_outliers: bool) -> Result<DailyMean> {
        let granule = self.source.read_granule(&selected.path)?;
        let filtered = self.filter.mean_of(&granule, report_outliers)?;

        debug!(
            "{}: mean {:.4} K over {} values ({} invalid, {:?} above bound)",
            selected.day,
            filtered.mean,
            filtered.retained,
            filtered.invalid_removed,
            filtered.outlier_count()
        );

        Ok(DailyMean {
            day: selected.day.clone(),
            path: selected.path.clone(),
            mean: filtered.mean,
            outliers: filtered.outlier_count(),
        })
    }
}
