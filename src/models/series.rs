use serde::Serialize;
use std::path::PathBuf;

use crate::models::DayKey;
use crate::utils::numeric::{round_series_value, successive_differences};

/// Mean of the cleaned IST grid for one day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyMean {
    pub day: DayKey,
    pub path: PathBuf,
    /// Unrounded mean; rounding happens when the series is reported
    pub mean: f64,
    /// Number of values above the bound, when outlier reporting was requested
    pub outliers: Option<usize>,
}

impl DailyMean {
    pub fn rounded(&self) -> f64 {
        round_series_value(self.mean)
    }
}

/// A granule left out of a series under the skip policy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedGranule {
    pub path: PathBuf,
    pub reason: String,
}

/// Daily means in granule traversal order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TemperatureSeries {
    pub days: Vec<DailyMean>,
    pub skipped: Vec<SkippedGranule>,
}

impl TemperatureSeries {
    pub fn new(days: Vec<DailyMean>) -> Self {
        Self {
            days,
            skipped: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Reported values, rounded to two decimals
    pub fn values(&self) -> Vec<f64> {
        self.days.iter().map(DailyMean::rounded).collect()
    }

    pub fn raw_means(&self) -> Vec<f64> {
        self.days.iter().map(|d| d.mean).collect()
    }

    /// Per-day outlier counts, present only if every day recorded them
    pub fn outlier_counts(&self) -> Option<Vec<usize>> {
        self.days.iter().map(|d| d.outliers).collect()
    }

    pub fn total_outliers(&self) -> usize {
        self.days.iter().filter_map(|d| d.outliers).sum()
    }
}

/// Day-over-day change of the daily means.
#[derive(Debug, Clone, Default, Serialize)]
pub struct VariationSeries {
    /// Day on which each change was observed (the later day of each pair)
    pub days: Vec<DayKey>,
    /// Rounded differences; one fewer than the number of days
    pub values: Vec<f64>,
    /// Number of daily means the differences were taken over
    pub day_count: usize,
}

impl VariationSeries {
    /// Differences of the unrounded means, rounded afterwards. The result can
    /// differ in the last decimal from differencing the rounded daily values.
    pub fn from_means(series: &TemperatureSeries) -> Self {
        let values = successive_differences(&series.raw_means())
            .into_iter()
            .map(round_series_value)
            .collect();

        Self {
            days: series.days.iter().skip(1).map(|d| d.day.clone()).collect(),
            values,
            day_count: series.len(),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
