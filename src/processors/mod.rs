pub mod coverage;
pub mod day_deduplicator;
pub mod outlier_filter;
pub mod time_series;

pub use coverage::{CoverageChecker, CoverageReport};
pub use day_deduplicator::{DayDeduplicator, DeduplicationIndex, SelectedGranule};
pub use outlier_filter::{FilterOutcome, FilteredMean, OutlierFilter};
pub use time_series::TimeSeriesAggregator;
