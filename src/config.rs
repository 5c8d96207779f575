//! Pipeline configuration.
//!
//! Settings are layered: built-in defaults, then an optional TOML file, then
//! `IST_*` environment variables, then command-line overrides. The result is
//! validated once and resolved into [`DataPaths`], so nothing downstream
//! depends on the process working directory.

use crate::error::{ProcessingError, Result};
use crate::utils::constants::{
    DEFAULT_CONFIG_FILE, DEFAULT_INTERPRETER, DEFAULT_RETRIEVAL_SCRIPT, ENV_PREFIX,
    GRANULE_EXTENSION, INTERIM_DATA_DIR, MAX_VALID_IST, RAW_DATA_DIR, SENTINEL_VALUES,
    SIDECAR_EXTENSION, STAGING_DIR,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;
use validator::Validate;

/// What to do with a granule that cannot be read or leaves no valid values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MalformedPolicy {
    /// Stop at the first bad granule
    #[default]
    Halt,
    /// Log it, leave it out and keep going
    Skip,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct FilterConfig {
    #[validate(length(min = 1))]
    pub sentinels: Vec<f64>,

    #[validate(range(min = 1.0))]
    pub upper_bound: f64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            sentinels: SENTINEL_VALUES.to_vec(),
            upper_bound: MAX_VALID_IST,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct RetrievalConfig {
    #[validate(length(min = 1))]
    pub interpreter: String,

    /// Download script, relative to the staging directory unless absolute
    pub script: PathBuf,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            interpreter: DEFAULT_INTERPRETER.to_string(),
            script: PathBuf::from(DEFAULT_RETRIEVAL_SCRIPT),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct PipelineConfig {
    pub root_dir: PathBuf,
    pub raw_dir: Option<PathBuf>,
    pub interim_dir: Option<PathBuf>,
    pub staging_dir: Option<PathBuf>,

    #[validate(length(min = 1))]
    pub extension: String,

    #[validate(length(min = 1))]
    pub sidecar_extension: String,

    pub on_malformed: MalformedPolicy,

    #[validate(nested)]
    pub filter: FilterConfig,

    #[validate(nested)]
    pub retrieval: RetrievalConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::from("."),
            raw_dir: None,
            interim_dir: None,
            staging_dir: None,
            extension: GRANULE_EXTENSION.to_string(),
            sidecar_extension: SIDECAR_EXTENSION.to_string(),
            on_malformed: MalformedPolicy::default(),
            filter: FilterConfig::default(),
            retrieval: RetrievalConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Load configuration from `file` (or `ist-processor.toml` when present)
    /// and `IST_*` environment variables, then validate it.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let file_source = match file {
            Some(path) => {
                if !path.exists() {
                    return Err(ProcessingError::Config(format!(
                        "Configuration file not found: {}",
                        path.display()
                    )));
                }
                config::File::from(path).required(true)
            }
            None => config::File::from(Path::new(DEFAULT_CONFIG_FILE)).required(false),
        };

        let settings = config::Config::builder()
            .add_source(file_source)
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        let config: PipelineConfig = settings.try_deserialize()?;
        config.check()?;
        debug!("Loaded configuration: {:?}", config);
        Ok(config)
    }

    /// Field validation plus the checks `validator` cannot express
    pub fn check(&self) -> Result<()> {
        self.validate()?;

        if !self.filter.upper_bound.is_finite() {
            return Err(ProcessingError::Config(format!(
                "filter.upper_bound must be finite, got {}",
                self.filter.upper_bound
            )));
        }
        if self.filter.sentinels.iter().any(|v| !v.is_finite()) {
            return Err(ProcessingError::Config(
                "filter.sentinels must be finite numbers".to_string(),
            ));
        }
        if self.extension == self.sidecar_extension {
            return Err(ProcessingError::Config(format!(
                "Granule and sidecar extensions must differ (both '{}')",
                self.extension
            )));
        }

        Ok(())
    }

    pub fn with_root_dir(mut self, root_dir: impl Into<PathBuf>) -> Self {
        self.root_dir = root_dir.into();
        self
    }

    /// Resolve every directory against the root once
    pub fn paths(&self) -> DataPaths {
        let resolve = |override_dir: &Option<PathBuf>, default: &str| match override_dir {
            Some(dir) if dir.is_absolute() => dir.clone(),
            Some(dir) => self.root_dir.join(dir),
            None => self.root_dir.join(default),
        };

        DataPaths {
            root_dir: self.root_dir.clone(),
            raw_dir: resolve(&self.raw_dir, RAW_DATA_DIR),
            interim_dir: resolve(&self.interim_dir, INTERIM_DATA_DIR),
            staging_dir: resolve(&self.staging_dir, STAGING_DIR),
        }
    }
}

/// Directory layout used by one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPaths {
    pub root_dir: PathBuf,
    pub raw_dir: PathBuf,
    pub interim_dir: PathBuf,
    pub staging_dir: PathBuf,
}

impl DataPaths {
    pub fn from_root(root_dir: impl Into<PathBuf>) -> Self {
        PipelineConfig::default().with_root_dir(root_dir).paths()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_default_layout() {
        let paths = DataPaths::from_root("/srv/ist");
        assert_eq!(paths.raw_dir, PathBuf::from("/srv/ist/data/raw"));
        assert_eq!(paths.interim_dir, PathBuf::from("/srv/ist/data/interim"));
        assert_eq!(paths.staging_dir, PathBuf::from("/srv/ist/utils"));
    }

    #[test]
    fn test_directory_overrides() {
        let mut config = PipelineConfig::default().with_root_dir("/srv/ist");
        config.raw_dir = Some(PathBuf::from("granules"));
        config.interim_dir = Some(PathBuf::from("/tmp/out"));

        let paths = config.paths();
        assert_eq!(paths.raw_dir, PathBuf::from("/srv/ist/granules"));
        assert_eq!(paths.interim_dir, PathBuf::from("/tmp/out"));
    }

    #[test]
    fn test_defaults_validate() {
        let config = PipelineConfig::default();
        assert!(config.check().is_ok());
        assert_eq!(config.filter.sentinels.len(), 7);
        assert_eq!(config.filter.upper_bound, 300.0);
        assert_eq!(config.on_malformed, MalformedPolicy::Halt);
    }

    #[test]
    fn test_invalid_filter_rejected() {
        let mut config = PipelineConfig::default();
        config.filter.upper_bound = f64::NAN;
        assert!(config.check().is_err());

        let mut config = PipelineConfig::default();
        config.filter.upper_bound = -5.0;
        assert!(matches!(
            config.check(),
            Err(ProcessingError::Validation(_))
        ));

        let mut config = PipelineConfig::default();
        config.extension = String::new();
        assert!(config.check().is_err());

        let mut config = PipelineConfig::default();
        config.sidecar_extension = "nc".to_string();
        assert!(matches!(config.check(), Err(ProcessingError::Config(_))));
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(
            &path,
            r#"
root_dir = "/data/ist"
on_malformed = "skip"

[filter]
upper_bound = 290.0
"#,
        )
        .unwrap();

        let config = PipelineConfig::load(Some(&path)).unwrap();
        assert_eq!(config.root_dir, PathBuf::from("/data/ist"));
        assert_eq!(config.on_malformed, MalformedPolicy::Skip);
        assert_eq!(config.filter.upper_bound, 290.0);
        assert_eq!(config.filter.sentinels, SENTINEL_VALUES.to_vec());
        assert_eq!(config.extension, "nc");
    }

    #[test]
    fn test_load_missing_file_fails() {
        let err = PipelineConfig::load(Some(Path::new("/nonexistent/ist.toml"))).unwrap_err();
        assert!(matches!(err, ProcessingError::Config(_)));
    }
}
