use thiserror::Error;

/// Application-specific errors for the CLI
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{failed} of {total} raster files could not be sampled (--strict)")]
    IncompleteRun { failed: usize, total: usize },

    #[error(transparent)]
    Pipeline(#[from] bandseries::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] bandseries::ConfigError),
}
