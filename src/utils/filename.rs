use crate::utils::constants::SERIES_EXTENSION;
use std::path::{Path, PathBuf};

/// Series kinds written to the interim directory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesKind {
    Temperature,
    Variation,
}

/// Output name for a series covering `days` days, e.g. `8days_temperature`
pub fn series_name(days: usize, kind: SeriesKind) -> String {
    match kind {
        SeriesKind::Temperature => format!("{}days_temperature", days),
        SeriesKind::Variation => format!("{}days_temperature_var", days),
    }
}

/// Full path of a series file inside `dir`
pub fn series_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{}.{}", name, SERIES_EXTENSION))
}

/// True when the path carries `extension` (case-sensitive, without the dot)
pub fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some(extension)
}
