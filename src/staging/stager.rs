use crate::error::{ProcessingError, Result};
use crate::utils::constants::{GRANULE_EXTENSION, SIDECAR_EXTENSION};
use crate::utils::filename::has_extension;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// What one staging pass did.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StagingReport {
    pub moved: Vec<PathBuf>,
    /// Downloads already present in the raw directory, deleted from staging
    pub duplicates_removed: Vec<PathBuf>,
    pub sidecars_removed: Vec<PathBuf>,
    /// Files with neither extension, left in place
    pub ignored: usize,
}

impl StagingReport {
    pub fn summary(&self) -> String {
        format!(
            "Moved: {}\nAlready present (removed from staging): {}\nSidecar files removed: {}\nOther files left in place: {}",
            self.moved.len(),
            self.duplicates_removed.len(),
            self.sidecars_removed.len(),
            self.ignored
        )
    }
}

/// Moves downloaded granules into the raw directory. Safe to re-run: files
/// already at the destination are never overwritten.
pub struct Stager {
    extension: String,
    sidecar_extension: String,
}

impl Stager {
    pub fn new(extension: &str, sidecar_extension: &str) -> Self {
        Self {
            extension: extension.to_string(),
            sidecar_extension: sidecar_extension.to_string(),
        }
    }

    pub fn stage(&self, from: &Path, to: &Path) -> Result<StagingReport> {
        if !from.is_dir() {
            return Err(ProcessingError::DirectoryNotFound {
                path: from.to_path_buf(),
            });
        }
        fs::create_dir_all(to)?;

        let mut entries: Vec<PathBuf> = fs::read_dir(from)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<std::io::Result<_>>()?;
        entries.sort();

        let mut report = StagingReport::default();

        for source in entries.into_iter().filter(|p| p.is_file()) {
            let Some(file_name) = source.file_name() else {
                continue;
            };

            if has_extension(&source, &self.extension) {
                let destination = to.join(file_name);
                if destination.exists() {
                    warn!(
                        "{} is already in {}",
                        file_name.to_string_lossy(),
                        to.display()
                    );
                    fs::remove_file(&source)?;
                    report.duplicates_removed.push(source);
                } else {
                    move_file(&source, &destination)?;
                    debug!("Moved {}", file_name.to_string_lossy());
                    report.moved.push(destination);
                }
            } else if has_extension(&source, &self.sidecar_extension) {
                fs::remove_file(&source)?;
                report.sidecars_removed.push(source);
            } else {
                report.ignored += 1;
            }
        }

        info!(
            "Staged {} granules into {} ({} duplicates, {} sidecars removed)",
            report.moved.len(),
            to.display(),
            report.duplicates_removed.len(),
            report.sidecars_removed.len()
        );

        Ok(report)
    }
}

impl Default for Stager {
    fn default() -> Self {
        Self::new(GRANULE_EXTENSION, SIDECAR_EXTENSION)
    }
}

/// Rename, falling back to copy-and-delete across filesystems. When the
/// fallback fails too, the rename error is the one reported.
fn move_file(source: &Path, destination: &Path) -> Result<()> {
    let rename_error = match fs::rename(source, destination) {
        Ok(()) => return Ok(()),
        Err(e) => e,
    };
    debug!(
        "Rename of {} failed ({}), copying instead",
        source.display(),
        rename_error
    );

    if let Err(copy_error) = fs::copy(source, destination) {
        debug!("Copy of {} failed: {}", source.display(), copy_error);
        return Err(rename_error.into());
    }
    fs::remove_file(source)?;
    Ok(())
}
