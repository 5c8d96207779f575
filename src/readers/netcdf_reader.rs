use crate::error::{ProcessingError, Result};
use crate::models::{Granule, GranuleMetadata};
use crate::readers::GranuleSource;
use crate::utils::constants::{IST_GROUP, IST_VARIABLE, PRODUCTION_TIME_ATTR};
use netcdf::AttributeValue;
use std::path::Path;
use tracing::debug;

/// Reads VIIRS IST granules: the `IST` variable of the `IST_Data` group and
/// the global `ProductionTime` attribute. The netCDF handle is dropped (and
/// the file closed) before every return, including error returns.
pub struct NetcdfGranuleReader {
    group: String,
    variable: String,
    production_time_attr: String,
}

impl NetcdfGranuleReader {
    pub fn new() -> Self {
        Self {
            group: IST_GROUP.to_string(),
            variable: IST_VARIABLE.to_string(),
            production_time_attr: PRODUCTION_TIME_ATTR.to_string(),
        }
    }

    fn open(&self, path: &Path) -> Result<netcdf::File> {
        if !path.exists() {
            return Err(ProcessingError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("Granule not found: {}", path.display()),
            )));
        }

        netcdf::open(path).map_err(|e| {
            ProcessingError::file_format(path, format!("not a readable netCDF file ({})", e))
        })
    }

    fn production_time(&self, path: &Path, file: &netcdf::File) -> Result<String> {
        let attribute = file.attribute(&self.production_time_attr).ok_or_else(|| {
            ProcessingError::file_format(
                path,
                format!("missing global attribute '{}'", self.production_time_attr),
            )
        })?;

        let value = attribute
            .value()
            .map_err(|e| ProcessingError::file_format(path, e.to_string()))?;

        match value {
            AttributeValue::Str(value) => Ok(value),
            AttributeValue::Strs(values) => values.into_iter().next().ok_or_else(|| {
                ProcessingError::file_format(
                    path,
                    format!("attribute '{}' is empty", self.production_time_attr),
                )
            }),
            _ => Err(ProcessingError::file_format(
                path,
                format!("attribute '{}' is not text", self.production_time_attr),
            )),
        }
    }
}

impl Default for NetcdfGranuleReader {
    fn default() -> Self {
        Self::new()
    }
}

impl GranuleSource for NetcdfGranuleReader {
    fn read_metadata(&self, path: &Path) -> Result<GranuleMetadata> {
        let file = self.open(path)?;
        let production_time = self.production_time(path, &file)?;
        Ok(GranuleMetadata::new(production_time))
    }

    fn read_granule(&self, path: &Path) -> Result<Granule> {
        let file = self.open(path)?;
        let production_time = self.production_time(path, &file)?;

        let group = file
            .group(&self.group)
            .map_err(|e| ProcessingError::file_format(path, e.to_string()))?
            .ok_or_else(|| {
                ProcessingError::file_format(path, format!("missing group '{}'", self.group))
            })?;

        let variable = group.variable(&self.variable).ok_or_else(|| {
            ProcessingError::file_format(
                path,
                format!("missing variable '{}/{}'", self.group, self.variable),
            )
        })?;

        let shape: Vec<usize> = variable.dimensions().iter().map(|d| d.len()).collect();
        let values = variable
            .get_values::<f64, _>(..)
            .map_err(|e| ProcessingError::file_format(path, format!("unreadable IST values ({})", e)))?;

        debug!(
            "Read {} IST values with shape {:?} from {}",
            values.len(),
            shape,
            path.display()
        );

        Granule::new(path, GranuleMetadata::new(production_time), shape, values)
    }
}
