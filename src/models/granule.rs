use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{ProcessingError, Result};
use crate::utils::constants::{DAY_KEY_FORMAT, DAY_KEY_LEN};

/// Calendar day a granule was produced, taken from the first ten characters
/// of its `ProductionTime` attribute.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DayKey(String);

impl DayKey {
    /// Derive the key from a production timestamp such as
    /// `2022-07-05T01:23:45.000Z`. Fails when the prefix is not a date.
    pub fn from_production_time(production_time: &str) -> Result<Self> {
        let prefix = production_time
            .trim()
            .get(..DAY_KEY_LEN)
            .ok_or_else(|| {
                ProcessingError::InvalidFormat(format!(
                    "Production time too short for a day key: '{}'",
                    production_time
                ))
            })?;

        NaiveDate::parse_from_str(prefix, DAY_KEY_FORMAT)?;
        Ok(Self(prefix.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn date(&self) -> Result<NaiveDate> {
        Ok(NaiveDate::parse_from_str(&self.0, DAY_KEY_FORMAT)?)
    }
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Global attributes of a granule that matter for aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GranuleMetadata {
    pub production_time: String,
}

impl GranuleMetadata {
    pub fn new(production_time: impl Into<String>) -> Self {
        Self {
            production_time: production_time.into(),
        }
    }

    pub fn day_key(&self) -> Result<DayKey> {
        DayKey::from_production_time(&self.production_time)
    }
}

/// One granule loaded into memory: the IST grid flattened in row-major
/// order together with its original shape.
#[derive(Debug, Clone)]
pub struct Granule {
    pub path: PathBuf,
    pub metadata: GranuleMetadata,
    pub shape: Vec<usize>,
    pub values: Vec<f64>,
}

impl Granule {
    pub fn new(
        path: impl Into<PathBuf>,
        metadata: GranuleMetadata,
        shape: Vec<usize>,
        values: Vec<f64>,
    ) -> Result<Self> {
        let path = path.into();
        let expected: usize = shape.iter().product();
        if expected != values.len() {
            return Err(ProcessingError::file_format(
                &path,
                format!(
                    "IST shape {:?} holds {} values but {} were read",
                    shape,
                    expected,
                    values.len()
                ),
            ));
        }

        Ok(Self {
            path,
            metadata,
            shape,
            values,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn day_key(&self) -> Result<DayKey> {
        self.metadata.day_key()
    }
}
