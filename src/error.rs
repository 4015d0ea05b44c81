//! Crate-level error type and `Result` alias for stable, structured error handling.
//! Fatal pipeline failures (catalog, directory, serialization, configuration) are
//! top-level variants; per-file raster failures are grouped under `Sample` so the
//! assembler can decide whether to collect or propagate them.
use std::path::PathBuf;

use thiserror::Error;

pub use crate::core::params::ConfigError;
pub use crate::io::gdal::SampleError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Malformed sensor catalog {path:?}: {reason}")]
    CatalogFormat { path: PathBuf, reason: String },

    #[error("Sensor catalog {path:?} contains no sensors")]
    EmptyCatalog { path: PathBuf },

    #[error(
        "Sensor {sensor_id} has coordinates outside WGS84 range: lat={latitude}, lon={longitude}"
    )]
    InvalidCoordinate {
        sensor_id: String,
        latitude: f64,
        longitude: f64,
    },

    #[error("Raster directory {path:?} not found or unreadable: {source}")]
    DirectoryNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Sample(#[from] SampleError),

    #[error("Failed to write {path:?}: {reason}")]
    Serialization { path: PathBuf, reason: String },

    #[error("Failed to start sampling workers: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl Error {
    pub fn serialization<E: std::fmt::Display>(path: impl Into<PathBuf>, e: E) -> Self {
        Error::Serialization {
            path: path.into(),
            reason: e.to_string(),
        }
    }

    /// True for failures scoped to a single raster file.
    pub fn is_per_file(&self) -> bool {
        matches!(self, Error::Sample(_))
    }
}
