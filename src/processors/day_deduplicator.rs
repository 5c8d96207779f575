//! One granule per production day.
//!
//! Several granules cover each day. The deduplicator lists the raw directory
//! in file-name order, reads only the `ProductionTime` of each granule, and
//! keeps the first granule seen for every calendar day. The index it returns
//! carries resolved paths, so consumers never re-list the directory or do
//! position arithmetic against a second listing.

use crate::config::MalformedPolicy;
use crate::error::{ProcessingError, Result};
use crate::models::{DayKey, SkippedGranule};
use crate::readers::GranuleSource;
use crate::utils::constants::GRANULE_EXTENSION;
use crate::utils::filename::has_extension;
use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// The granule chosen to represent one day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectedGranule {
    /// Position among the extension-matching files, in traversal order
    pub position: usize,
    pub day: DayKey,
    pub path: PathBuf,
}

/// First-occurrence granule per day, in traversal (file-name) order.
///
/// Built from a snapshot of the directory; rebuild it after the directory
/// changes.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DeduplicationIndex {
    pub directory: PathBuf,
    pub selected: Vec<SelectedGranule>,
    /// Number of extension-matching files examined
    pub candidates: usize,
    /// Granules dropped because an earlier one covered the same day
    pub duplicates: Vec<PathBuf>,
    /// Granules whose metadata could not be read (skip policy only)
    pub skipped: Vec<SkippedGranule>,
}

impl DeduplicationIndex {
    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SelectedGranule> {
        self.selected.iter()
    }

    pub fn positions(&self) -> Vec<usize> {
        self.selected.iter().map(|s| s.position).collect()
    }

    pub fn paths(&self) -> Vec<&Path> {
        self.selected.iter().map(|s| s.path.as_path()).collect()
    }
}

pub struct DayDeduplicator {
    extension: String,
    policy: MalformedPolicy,
}

impl DayDeduplicator {
    pub fn new(extension: &str) -> Self {
        Self {
            extension: extension.to_string(),
            policy: MalformedPolicy::Halt,
        }
    }

    pub fn with_policy(mut self, policy: MalformedPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Extension-matching regular files in `dir`, sorted by file name
    pub fn list_granules(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        if !dir.is_dir() {
            return Err(ProcessingError::DirectoryNotFound {
                path: dir.to_path_buf(),
            });
        }

        let mut files = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_file() && has_extension(&path, &self.extension) {
                files.push(path);
            }
        }

        files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        Ok(files)
    }

    /// Build the index for `dir`, reading only granule metadata
    pub fn deduplicate<S: GranuleSource>(&self, dir: &Path, source: &S) -> Result<DeduplicationIndex> {
        let files = self.list_granules(dir)?;
        info!(
            "Deduplicating {} granules in {}",
            files.len(),
            dir.display()
        );

        let mut index = DeduplicationIndex {
            directory: dir.to_path_buf(),
            candidates: files.len(),
            ..Default::default()
        };
        let mut seen: HashSet<DayKey> = HashSet::new();

        for (position, path) in files.into_iter().enumerate() {
            let day = match source.read_metadata(&path).and_then(|m| m.day_key()) {
                Ok(day) => day,
                Err(e) => {
                    let e = as_granule_error(&path, e);
                    if self.policy == MalformedPolicy::Skip && e.is_granule_local() {
                        warn!("Skipping {}: {}", path.display(), e);
                        index.skipped.push(SkippedGranule {
                            path,
                            reason: e.to_string(),
                        });
                        continue;
                    }
                    return Err(e);
                }
            };

            if seen.insert(day.clone()) {
                debug!("{} -> {}", day, path.display());
                index.selected.push(SelectedGranule {
                    position,
                    day,
                    path,
                });
            } else {
                debug!("Duplicate granule for {}: {}", day, path.display());
                index.duplicates.push(path);
            }
        }

        info!(
            "Selected {} days from {} granules ({} duplicates, {} skipped)",
            index.len(),
            index.candidates,
            index.duplicates.len(),
            index.skipped.len()
        );

        Ok(index)
    }
}

impl Default for DayDeduplicator {
    fn default() -> Self {
        Self::new(GRANULE_EXTENSION)
    }
}

/// A production time that does not start with a date is a format problem of
/// that granule, not a general parsing failure.
fn as_granule_error(path: &Path, error: ProcessingError) -> ProcessingError {
    match error {
        ProcessingError::DateParse(e) => {
            ProcessingError::file_format(path, format!("ProductionTime is not a date ({})", e))
        }
        ProcessingError::InvalidFormat(reason) => ProcessingError::file_format(path, reason),
        other => other,
    }
}
