use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProcessingError>;

#[derive(Error, Debug)]
pub enum ProcessingError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Date parsing error: {0}")]
    DateParse(#[from] chrono::ParseError),

    #[cfg(feature = "netcdf")]
    #[error("netCDF error: {0}")]
    NetCdf(#[from] netcdf::Error),

    #[error("Malformed granule {path}: {reason}")]
    FileFormat { path: PathBuf, reason: String },

    #[error("No valid temperature values left in {path} after filtering")]
    EmptyData { path: PathBuf },

    #[error("Invalid output name: '{0}'")]
    InvalidName(String),

    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("Retrieval failed: {0}")]
    Retrieval(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration source error: {0}")]
    ConfigSource(#[from] config::ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Invalid data format: {0}")]
    InvalidFormat(String),
}

impl ProcessingError {
    pub fn file_format(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        ProcessingError::FileFormat {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Errors that describe a single bad granule rather than a broken environment.
    pub fn is_granule_local(&self) -> bool {
        matches!(
            self,
            ProcessingError::FileFormat { .. } | ProcessingError::EmptyData { .. }
        )
    }
}
