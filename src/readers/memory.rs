use crate::error::{ProcessingError, Result};
use crate::models::{Granule, GranuleMetadata};
use crate::readers::GranuleSource;
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
enum Entry {
    Valid {
        production_time: String,
        shape: Vec<usize>,
        values: Vec<f64>,
    },
    Malformed {
        production_time: Option<String>,
        reason: String,
    },
}

/// Granules held in memory and looked up by file name, so directory-driven
/// code can run against placeholder files without HDF5. Records every full
/// read for later inspection.
#[derive(Debug, Default)]
pub struct MemoryGranuleSource {
    entries: HashMap<String, Entry>,
    reads: RefCell<Vec<PathBuf>>,
}

impl MemoryGranuleSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a 1-D granule under `file_name`
    pub fn insert(&mut self, file_name: &str, production_time: &str, values: Vec<f64>) {
        let shape = vec![values.len()];
        self.insert_grid(file_name, production_time, shape, values);
    }

    pub fn insert_grid(
        &mut self,
        file_name: &str,
        production_time: &str,
        shape: Vec<usize>,
        values: Vec<f64>,
    ) {
        self.entries.insert(
            file_name.to_string(),
            Entry::Valid {
                production_time: production_time.to_string(),
                shape,
                values,
            },
        );
    }

    /// Register a granule whose layout is broken. With a production time
    /// only the full read fails; without one the metadata read fails too.
    pub fn insert_malformed(&mut self, file_name: &str, production_time: Option<&str>, reason: &str) {
        self.entries.insert(
            file_name.to_string(),
            Entry::Malformed {
                production_time: production_time.map(str::to_string),
                reason: reason.to_string(),
            },
        );
    }

    pub fn with_granule(mut self, file_name: &str, production_time: &str, values: Vec<f64>) -> Self {
        self.insert(file_name, production_time, values);
        self
    }

    /// Paths passed to `read_granule`, in call order
    pub fn granule_reads(&self) -> Vec<PathBuf> {
        self.reads.borrow().clone()
    }

    fn entry(&self, path: &Path) -> Result<&Entry> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| ProcessingError::file_format(path, "path has no file name"))?;

        self.entries
            .get(name)
            .ok_or_else(|| ProcessingError::file_format(path, "unknown granule"))
    }
}

impl GranuleSource for MemoryGranuleSource {
    fn read_metadata(&self, path: &Path) -> Result<GranuleMetadata> {
        match self.entry(path)? {
            Entry::Valid {
                production_time, ..
            } => Ok(GranuleMetadata::new(production_time.clone())),
            Entry::Malformed {
                production_time: Some(production_time),
                ..
            } => Ok(GranuleMetadata::new(production_time.clone())),
            Entry::Malformed { reason, .. } => {
                Err(ProcessingError::file_format(path, reason.clone()))
            }
        }
    }

    fn read_granule(&self, path: &Path) -> Result<Granule> {
        self.reads.borrow_mut().push(path.to_path_buf());

        match self.entry(path)? {
            Entry::Valid {
                production_time,
                shape,
                values,
            } => Granule::new(
                path,
                GranuleMetadata::new(production_time.clone()),
                shape.clone(),
                values.clone(),
            ),
            Entry::Malformed { reason, .. } => {
                Err(ProcessingError::file_format(path, reason.clone()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_file_name() {
        let source = MemoryGranuleSource::new().with_granule(
            "a.nc",
            "2022-07-05T00:00:00Z",
            vec![250.0, 260.0],
        );

        let granule = source.read_granule(Path::new("/any/dir/a.nc")).unwrap();
        assert_eq!(granule.values, vec![250.0, 260.0]);
        assert_eq!(source.granule_reads(), vec![PathBuf::from("/any/dir/a.nc")]);

        let metadata = source.read_metadata(Path::new("a.nc")).unwrap();
        assert_eq!(metadata.production_time, "2022-07-05T00:00:00Z");
    }

    #[test]
    fn test_unknown_and_malformed_granules() {
        let mut source = MemoryGranuleSource::new();
        source.insert_malformed("bad.nc", Some("2022-07-05T00:00:00Z"), "missing group 'IST_Data'");
        source.insert_malformed("worse.nc", None, "missing attribute 'ProductionTime'");

        assert!(matches!(
            source.read_metadata(Path::new("missing.nc")),
            Err(ProcessingError::FileFormat { .. })
        ));
        assert!(source.read_metadata(Path::new("bad.nc")).is_ok());
        assert!(source.read_metadata(Path::new("worse.nc")).is_err());
        assert!(matches!(
            source.read_granule(Path::new("bad.nc")),
            Err(ProcessingError::FileFormat { .. })
        ));
    }
}
