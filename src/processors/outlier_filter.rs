use crate::config::FilterConfig;
use crate::error::{ProcessingError, Result};
use crate::models::Granule;
use crate::utils::constants::{MAX_VALID_IST, SENTINEL_VALUES};
use crate::utils::numeric::mean;
use serde::Serialize;

/// Result of cleaning one raw IST array.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterOutcome {
    /// Values that are neither sentinels nor above the bound
    pub cleaned: Vec<f64>,
    /// Sentinel codes and non-finite values dropped in the first pass
    pub invalid_removed: usize,
    /// Positions of values above the bound, counted within the array left
    /// after the sentinel pass
    pub outlier_positions: Vec<usize>,
}

/// Mean of one granule after cleaning.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilteredMean {
    pub mean: f64,
    pub retained: usize,
    pub invalid_removed: usize,
    pub outlier_positions: Option<Vec<usize>>,
}

impl FilteredMean {
    pub fn outlier_count(&self) -> Option<usize> {
        self.outlier_positions.as_ref().map(Vec::len)
    }
}

/// Drops sentinel codes, then values above a physical ceiling.
#[derive(Debug, Clone)]
pub struct OutlierFilter {
    sentinels: Vec<f64>,
    upper_bound: f64,
}

impl OutlierFilter {
    pub fn new(sentinels: Vec<f64>, upper_bound: f64) -> Self {
        Self {
            sentinels,
            upper_bound,
        }
    }

    pub fn from_config(config: &FilterConfig) -> Self {
        Self::new(config.sentinels.clone(), config.upper_bound)
    }

    pub fn sentinels(&self) -> &[f64] {
        &self.sentinels
    }

    pub fn upper_bound(&self) -> f64 {
        self.upper_bound
    }

    fn is_invalid(&self, value: f64) -> bool {
        !value.is_finite() || self.sentinels.contains(&value)
    }

    /// Clean a flattened array. Sentinel removal is order independent, so a
    /// single pass replaces one pass per sentinel.
    pub fn clean(&self, raw: &[f64]) -> FilterOutcome {
        let valid: Vec<f64> = raw.iter().copied().filter(|&v| !self.is_invalid(v)).collect();
        let invalid_removed = raw.len() - valid.len();

        let outlier_positions: Vec<usize> = valid
            .iter()
            .enumerate()
            .filter(|(_, v)| **v > self.upper_bound)
            .map(|(i, _)| i)
            .collect();

        let cleaned = if outlier_positions.is_empty() {
            valid
        } else {
            valid.into_iter().filter(|&v| v <= self.upper_bound).collect()
        };

        FilterOutcome {
            cleaned,
            invalid_removed,
            outlier_positions,
        }
    }

    /// Mean of the cleaned granule. Fails with `EmptyData` when nothing
    /// survives the filter instead of producing NaN.
    pub fn mean_of(&self, granule: &Granule, record_outliers: bool) -> Result<FilteredMean> {
        let outcome = self.clean(&granule.values);

        let mean = mean(&outcome.cleaned).ok_or_else(|| ProcessingError::EmptyData {
            path: granule.path.clone(),
        })?;

        Ok(FilteredMean {
            mean,
            retained: outcome.cleaned.len(),
            invalid_removed: outcome.invalid_removed,
            outlier_positions: record_outliers.then_some(outcome.outlier_positions),
        })
    }
}

impl Default for OutlierFilter {
    fn default() -> Self {
        Self::new(SENTINEL_VALUES.to_vec(), MAX_VALID_IST)
    }
}
