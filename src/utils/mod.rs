pub mod constants;
pub mod filename;
pub mod numeric;
pub mod progress;

pub use constants::*;
pub use filename::{has_extension, series_name, series_path, SeriesKind};
pub use numeric::{mean, round_series_value, round_to, successive_differences};
pub use progress::ProgressReporter;
