use crate::error::{ProcessingError, Result};
use crate::models::{TemperatureSeries, VariationSeries};
use crate::utils::filename::{series_name, series_path, SeriesKind};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Destination for computed series.
pub trait SeriesSink {
    /// Write `values` under `name`, replacing any earlier output of that name
    fn persist(&self, values: &[f64], name: &str) -> Result<PathBuf>;

    /// `{N}days_temperature`, N = number of days
    fn persist_temperature(&self, series: &TemperatureSeries) -> Result<PathBuf> {
        self.persist(
            &series.values(),
            &series_name(series.len(), SeriesKind::Temperature),
        )
    }

    /// `{N}days_temperature_var`, N = number of days the differences span
    fn persist_variation(&self, series: &VariationSeries) -> Result<PathBuf> {
        self.persist(
            &series.values,
            &series_name(series.day_count, SeriesKind::Variation),
        )
    }
}

/// Writes one value per row to `{output_dir}/{name}.csv`.
pub struct CsvSeriesWriter {
    output_dir: PathBuf,
}

impl CsvSeriesWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    fn validate_name(name: &str) -> Result<()> {
        let invalid = name.trim().is_empty()
            || name.contains(|c: char| c == '/' || c == '\\')
            || name == "."
            || name == "..";

        if invalid {
            return Err(ProcessingError::InvalidName(name.to_string()));
        }
        Ok(())
    }
}

impl SeriesSink for CsvSeriesWriter {
    fn persist(&self, values: &[f64], name: &str) -> Result<PathBuf> {
        Self::validate_name(name)?;
        fs::create_dir_all(&self.output_dir)?;

        let path = series_path(&self.output_dir, name);
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(&path)?;

        for value in values {
            writer.write_record([value.to_string()])?;
        }
        writer.flush()?;

        info!("Wrote {} values to {}", values.len(), path.display());
        Ok(path)
    }
}

/// Parse a series file back into values. Rows may hold several
/// comma-separated values; they are read left to right.
pub fn read_series(path: &Path) -> Result<Vec<f64>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;

    let mut values = Vec::new();
    for record in reader.records() {
        let record = record?;
        for field in record.iter() {
            let field = field.trim();
            if field.is_empty() {
                continue;
            }
            let value = field.parse::<f64>().map_err(|_| {
                ProcessingError::InvalidFormat(format!(
                    "Invalid value '{}' in {}",
                    field,
                    path.display()
                ))
            })?;
            values.push(value);
        }
    }

    Ok(values)
}

/// Row count and value range of a written series
pub fn get_file_info(path: &Path) -> Result<SeriesFileInfo> {
    let values = read_series(path)?;
    let min = values.iter().copied().reduce(f64::min);
    let max = values.iter().copied().reduce(f64::max);

    Ok(SeriesFileInfo {
        path: path.to_path_buf(),
        file_size: fs::metadata(path)?.len(),
        rows: values.len(),
        min,
        max,
    })
}

#[derive(Debug, Clone)]
pub struct SeriesFileInfo {
    pub path: PathBuf,
    pub file_size: u64,
    pub rows: usize,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl SeriesFileInfo {
    pub fn summary(&self) -> String {
        let range = match (self.min, self.max) {
            (Some(min), Some(max)) => format!("{:.2} to {:.2}", min, max),
            _ => "n/a".to_string(),
        };

        format!(
            "File: {}\nSize: {:.1} KB\nRows: {}\nRange: {}",
            self.path.display(),
            self.file_size as f64 / 1024.0,
            self.rows,
            range
        )
    }
}
