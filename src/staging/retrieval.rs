use crate::config::RetrievalConfig;
use crate::error::{ProcessingError, Result};
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::info;

/// Runs the external download script. The script decides what to fetch; the
/// only contract is that granules land in its working directory.
pub struct RetrievalRunner {
    interpreter: String,
    script: PathBuf,
    working_dir: PathBuf,
}

impl RetrievalRunner {
    pub fn new(interpreter: &str, script: impl Into<PathBuf>, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            interpreter: interpreter.to_string(),
            script: script.into(),
            working_dir: working_dir.into(),
        }
    }

    pub fn from_config(config: &RetrievalConfig, staging_dir: &Path) -> Self {
        Self::new(&config.interpreter, &config.script, staging_dir)
    }

    /// Script path as seen from the working directory
    pub fn script_path(&self) -> PathBuf {
        if self.script.is_absolute() {
            self.script.clone()
        } else {
            self.working_dir.join(&self.script)
        }
    }

    pub async fn run(&self) -> Result<()> {
        let script = self.script_path();
        if !script.is_file() {
            return Err(ProcessingError::Retrieval(format!(
                "Download script not found: {}",
                script.display()
            )));
        }

        info!(
            "Running {} {} in {}",
            self.interpreter,
            script.display(),
            self.working_dir.display()
        );

        let status = Command::new(&self.interpreter)
            .arg(&script)
            .current_dir(&self.working_dir)
            .status()
            .await
            .map_err(|e| {
                ProcessingError::Retrieval(format!("Could not start '{}': {}", self.interpreter, e))
            })?;

        if !status.success() {
            return Err(ProcessingError::Retrieval(format!(
                "{} exited with {}",
                script.display(),
                status
            )));
        }

        info!("Download script finished");
        Ok(())
    }
}
