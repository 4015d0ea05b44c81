#![doc = r#"
bandseries — per-date, per-band pixel time series for a representative ground sensor.

Given a sensor catalog and a directory of single-band Sentinel-2 tiles named
`<date>_..._band_<LABEL>.<ext>`, the crate picks the sensor closest to the catalog
centroid, samples every tile at that sensor's location (reprojecting from WGS84 into
each raster's native CRS) and writes one CSV row per (date, band).

Requirements
------------
- GDAL development headers and runtime available on your system.
- Rust 2024 edition toolchain.

Quick start
-----------
```rust,no_run
use bandseries::{PipelineConfig, run_pipeline};

fn main() -> bandseries::Result<()> {
    let config = PipelineConfig::new(
        "coordenadas sensores.csv",
        "crops",
        "valores_pixeles.csv",
    );
    let report = run_pipeline(&config)?;
    println!(
        "sensor={} rows={} failures={}",
        report.central_sensor.sensor.sensor_id,
        report.rows_written,
        report.failures.len()
    );
    Ok(())
}
```

Step by step
------------
```rust,no_run
use std::path::Path;
use bandseries::{
    SamplingOptions, build_inventory, load_catalog, sample_inventory, select_central_sensor,
    write_time_series,
};

fn main() -> bandseries::Result<()> {
    let catalog = load_catalog(Path::new("sensors.csv"))?;
    let central = select_central_sensor(&catalog)?;
    let inventory = build_inventory(Path::new("crops"), "tif")?;

    let outcome = sample_inventory(&central.sensor, &inventory, &SamplingOptions::default())?;
    for failure in &outcome.failures {
        eprintln!("{:?}: {}", failure.source_file, failure.reason);
    }
    write_time_series(Path::new("out.csv"), &outcome.rows)?;
    Ok(())
}
```

Error handling
--------------
All public functions return `bandseries::Result<T>`. Per-file raster failures are
`Error::Sample`; with `FailurePolicy::Collect` (the default) they are gathered into the
report instead of aborting the run.

Useful modules
--------------
- [`api`] — `run_pipeline` and `sample_inventory`.
- [`core`] — configuration, central sensor selection, tile inventory, affine helpers.
- [`io`] — catalog loader, GDAL pixel sampler, CSV and JSON writers.
- [`types`] — `BandLabel`, `SensorRecord`, `TimeSeriesRow` and friends.
- [`error`] — crate-level `Error` and `Result`.
"#]

pub mod api;
pub mod core;
pub mod error;
pub mod io;
pub mod types;

// Curated public API surface
pub use crate::core::inventory::{TileInventory, build_inventory};
pub use crate::core::params::{ConfigError, PipelineConfig};
pub use crate::core::selection::{CentralSensor, select_central_sensor};
pub use crate::error::{Error, Result};
pub use crate::types::{
    BandFile, BandLabel, FailurePolicy, PixelSample, PixelValue, Resolution, SampleFailure,
    SensorCatalog, SensorRecord, TimeSeriesRow,
};

// Readers and writers
pub use crate::io::catalog::{load_catalog, load_catalog_with_delimiter};
pub use crate::io::gdal::{GdalRaster, RasterMetadata, SampleError, sample_pixel};
pub use crate::io::writers::{write_run_report, write_time_series};

// High-level API re-exports
pub use crate::api::{RunReport, SampleOutcome, SamplingOptions, run_pipeline, sample_inventory};
