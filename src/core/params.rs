use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::FailurePolicy;

/// Errors raised while loading or validating a `PipelineConfig`
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config {path:?}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Missing required setting: {field}")]
    MissingField { field: &'static str },

    #[error("workers must be at least 1, got: {workers}")]
    ZeroWorkers { workers: usize },

    #[error("Invalid setting: {field}={value}")]
    InvalidField { field: &'static str, value: String },
}

/// Inputs and knobs for one extraction run, suitable for config files and library callers
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PipelineConfig {
    /// Delimited sensor table
    pub catalog_path: PathBuf,
    /// Directory holding `<date>_..._band_<LABEL>.<ext>` tiles
    pub raster_directory: PathBuf,
    /// Destination CSV
    pub output_path: PathBuf,
    /// Raster file extension without the dot
    #[serde(default = "default_extension")]
    pub raster_extension: String,
    #[serde(default = "default_delimiter")]
    pub catalog_delimiter: char,
    #[serde(default)]
    pub failure_policy: FailurePolicy,
    /// Number of sampling threads; 1 keeps the run sequential
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// Optional JSON run report
    #[serde(default)]
    pub report_path: Option<PathBuf>,
}

fn default_extension() -> String {
    "tif".to_string()
}

fn default_delimiter() -> char {
    ','
}

fn default_workers() -> usize {
    1
}

impl PipelineConfig {
    pub fn new(
        catalog_path: impl Into<PathBuf>,
        raster_directory: impl Into<PathBuf>,
        output_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            catalog_path: catalog_path.into(),
            raster_directory: raster_directory.into(),
            output_path: output_path.into(),
            raster_extension: default_extension(),
            catalog_delimiter: default_delimiter(),
            failure_policy: FailurePolicy::default(),
            workers: default_workers(),
            report_path: None,
        }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let reader = BufReader::new(file);

        let config: PipelineConfig =
            serde_json::from_reader(reader).map_err(|source| ConfigError::Json {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.catalog_path.as_os_str().is_empty() {
            return Err(ConfigError::MissingField {
                field: "catalog_path",
            });
        }
        if self.raster_directory.as_os_str().is_empty() {
            return Err(ConfigError::MissingField {
                field: "raster_directory",
            });
        }
        if self.output_path.as_os_str().is_empty() {
            return Err(ConfigError::MissingField {
                field: "output_path",
            });
        }
        if self.workers == 0 {
            return Err(ConfigError::ZeroWorkers {
                workers: self.workers,
            });
        }
        let ext = self.raster_extension.trim_start_matches('.');
        if ext.is_empty() || ext.contains(['/', '\\']) {
            return Err(ConfigError::InvalidField {
                field: "raster_extension",
                value: self.raster_extension.clone(),
            });
        }
        if !self.catalog_delimiter.is_ascii() {
            return Err(ConfigError::InvalidField {
                field: "catalog_delimiter",
                value: self.catalog_delimiter.to_string(),
            });
        }
        Ok(())
    }

    /// Extension with any leading dot removed.
    pub fn extension(&self) -> &str {
        self.raster_extension.trim_start_matches('.')
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_from_file_applies_defaults() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("config.json");
        let mut file = File::create(&file_path).unwrap();

        let config_data = r#"
    {
        "catalog_path": "coordenadas sensores.csv",
        "raster_directory": "crops",
        "output_path": "valores_pixeles.csv"
    }
    "#;
        file.write_all(config_data.as_bytes()).unwrap();

        let config = PipelineConfig::from_file(&file_path).unwrap();

        assert_eq!(config.catalog_path, PathBuf::from("coordenadas sensores.csv"));
        assert_eq!(config.raster_directory, PathBuf::from("crops"));
        assert_eq!(config.output_path, PathBuf::from("valores_pixeles.csv"));
        assert_eq!(config.raster_extension, "tif");
        assert_eq!(config.catalog_delimiter, ',');
        assert_eq!(config.failure_policy, FailurePolicy::Collect);
        assert_eq!(config.workers, 1);
        assert!(config.report_path.is_none());
    }

    #[test]
    fn test_from_file_reads_all_fields() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("config.json");
        std::fs::write(
            &file_path,
            r#"{
                "catalog_path": "s.csv",
                "raster_directory": "tiles",
                "output_path": "out.csv",
                "raster_extension": ".tiff",
                "catalog_delimiter": ";",
                "failure_policy": "abort",
                "workers": 4,
                "report_path": "out.json"
            }"#,
        )
        .unwrap();

        let config = PipelineConfig::from_file(&file_path).unwrap();
        assert_eq!(config.extension(), "tiff");
        assert_eq!(config.catalog_delimiter, ';');
        assert_eq!(config.failure_policy, FailurePolicy::Abort);
        assert_eq!(config.workers, 4);
        assert_eq!(config.report_path, Some(PathBuf::from("out.json")));
    }

    #[test]
    fn test_zero_workers_rejected() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("config.json");
        std::fs::write(
            &file_path,
            r#"{"catalog_path": "s.csv", "raster_directory": "t", "output_path": "o.csv", "workers": 0}"#,
        )
        .unwrap();

        let err = PipelineConfig::from_file(&file_path).unwrap_err();
        assert!(matches!(err, ConfigError::ZeroWorkers { workers: 0 }));
    }

    #[test]
    fn test_missing_required_field_is_json_error() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("config.json");
        std::fs::write(&file_path, r#"{"catalog_path": "s.csv"}"#).unwrap();

        let err = PipelineConfig::from_file(&file_path).unwrap_err();
        assert!(matches!(err, ConfigError::Json { .. }));
    }

    #[test]
    fn test_validate_rejects_empty_paths() {
        let config = PipelineConfig::new("", "tiles", "out.csv");
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingField {
                field: "catalog_path"
            })
        ));
    }

    #[test]
    fn test_missing_config_file() {
        let err = PipelineConfig::from_file("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
