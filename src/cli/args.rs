use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "bandseries",
    version,
    about = "Per-date, per-band pixel time series for the most central ground sensor"
)]
pub struct CliArgs {
    /// JSON config file (catalog_path, raster_directory, output_path, ...).
    /// Flags below override values from the file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Sensor catalog (delimited text with id, latitude and longitude columns)
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// Directory containing `<date>_..._band_<LABEL>.<ext>` raster tiles
    #[arg(long)]
    pub raster_dir: Option<PathBuf>,

    /// Output CSV path
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Raster file extension
    #[arg(long)]
    pub extension: Option<String>,

    /// Catalog field delimiter
    #[arg(long)]
    pub delimiter: Option<char>,

    /// Number of sampling threads (1 = sequential)
    #[arg(long)]
    pub workers: Option<usize>,

    /// Abort on the first raster that cannot be sampled instead of collecting failures
    #[arg(long, default_value_t = false)]
    pub fail_fast: bool,

    /// Exit with an error if any raster could not be sampled
    #[arg(long, default_value_t = false)]
    pub strict: bool,

    /// Write a JSON run report to this path
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Enable debug logging (otherwise RUST_LOG, defaulting to info)
    #[arg(long, default_value_t = false)]
    pub log: bool,
}
