pub mod granule;
pub mod series;

pub use granule::{DayKey, Granule, GranuleMetadata};
pub use series::{DailyMean, SkippedGranule, TemperatureSeries, VariationSeries};
