//! High-level library API: run the full extraction for a `PipelineConfig`, or sample
//! an inventory you already built. Prefer these entrypoints over the lower-level
//! `core` and `io` modules when embedding the pipeline.
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::core::inventory::{TileInventory, build_inventory};
use crate::core::params::PipelineConfig;
use crate::core::selection::{CentralSensor, select_central_sensor};
use crate::error::{Error, Result};
use crate::io::catalog::load_catalog_with_delimiter;
use crate::io::gdal::{SampleError, sample_pixel};
use crate::io::writers::{write_run_report, write_time_series};
use crate::types::{BandFile, FailurePolicy, SampleFailure, SensorRecord, TimeSeriesRow};

/// How per-file sampling is scheduled and how its failures are handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplingOptions {
    pub failure_policy: FailurePolicy,
    /// 1 samples sequentially on the calling thread
    pub workers: usize,
}

impl Default for SamplingOptions {
    fn default() -> Self {
        Self {
            failure_policy: FailurePolicy::Collect,
            workers: 1,
        }
    }
}

impl From<&PipelineConfig> for SamplingOptions {
    fn from(config: &PipelineConfig) -> Self {
        Self {
            failure_policy: config.failure_policy,
            workers: config.workers,
        }
    }
}

/// Rows and failures from sampling an inventory, both in inventory order
#[derive(Debug, Clone, Default)]
pub struct SampleOutcome {
    pub rows: Vec<TimeSeriesRow>,
    pub failures: Vec<SampleFailure>,
    pub skipped_cloud_masks: usize,
}

/// Summary of one pipeline run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub generated_at: DateTime<Utc>,
    pub central_sensor: CentralSensor,
    pub catalog_size: usize,
    pub dates: usize,
    pub files: usize,
    pub rows_written: usize,
    pub skipped_cloud_masks: usize,
    pub failures: Vec<SampleFailure>,
    pub output_path: PathBuf,
}

fn sample_all(
    jobs: &[&BandFile],
    sensor: &SensorRecord,
    options: &SamplingOptions,
) -> Result<Vec<std::result::Result<TimeSeriesRow, SampleError>>> {
    let sample = |file: &BandFile| {
        debug!("Sampling {:?}", file.path);
        sample_pixel(&file.path, sensor.latitude, sensor.longitude)
            .map(|s| TimeSeriesRow::new(sensor, file, s))
    };

    if options.workers <= 1 {
        let mut results = Vec::with_capacity(jobs.len());
        for &file in jobs {
            let result = sample(file);
            let failed = result.is_err();
            results.push(result);
            if failed && options.failure_policy == FailurePolicy::Abort {
                break;
            }
        }
        return Ok(results);
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(options.workers)
        .build()?;
    // indexed collect keeps inventory order regardless of completion order
    Ok(pool.install(|| jobs.par_iter().map(|&file| sample(file)).collect()))
}

/// Sample every file of `inventory` at the sensor location.
///
/// Cloud-mask files are skipped. Under `FailurePolicy::Abort` the first failure in
/// inventory order is returned as an error; under `Collect` it is recorded and
/// processing continues.
pub fn sample_inventory(
    sensor: &SensorRecord,
    inventory: &TileInventory,
    options: &SamplingOptions,
) -> Result<SampleOutcome> {
    let mut outcome = SampleOutcome::default();

    let mut jobs = Vec::with_capacity(inventory.file_count());
    for file in inventory.iter() {
        if file.band.is_cloud_mask() {
            debug!("Skipping cloud mask {}", file.file_name);
            outcome.skipped_cloud_masks += 1;
        } else {
            jobs.push(file);
        }
    }

    let results = sample_all(&jobs, sensor, options)?;
    for (file, result) in jobs.iter().zip(results) {
        match result {
            Ok(row) => outcome.rows.push(row),
            Err(e) => match options.failure_policy {
                FailurePolicy::Abort => return Err(e.into()),
                FailurePolicy::Collect => {
                    warn!("Error sampling {:?}: {}", file.path, e);
                    outcome.failures.push(SampleFailure {
                        date: file.date.clone(),
                        band_label: file.band,
                        source_file: file.path.clone(),
                        reason: e.to_string(),
                    });
                }
            },
        }
    }

    Ok(outcome)
}

/// Run the whole extraction: catalog → central sensor → inventory → sampling → table.
pub fn run_pipeline(config: &PipelineConfig) -> Result<RunReport> {
    config.validate()?;

    let catalog =
        load_catalog_with_delimiter(&config.catalog_path, config.catalog_delimiter as u8)?;
    let central = select_central_sensor(&catalog)?;
    let sensor = &central.sensor;
    if !sensor.has_valid_coordinates() {
        return Err(Error::InvalidCoordinate {
            sensor_id: sensor.sensor_id.clone(),
            latitude: sensor.latitude,
            longitude: sensor.longitude,
        });
    }
    info!(
        "Central sensor selected: {} (lat {}, lon {})",
        sensor.sensor_id, sensor.latitude, sensor.longitude
    );

    let inventory = build_inventory(&config.raster_directory, config.extension())?;
    info!(
        "Found {} band files across {} dates in {:?}",
        inventory.file_count(),
        inventory.date_count(),
        config.raster_directory
    );

    let outcome = sample_inventory(sensor, &inventory, &SamplingOptions::from(config))?;
    let rows_written = write_time_series(&config.output_path, &outcome.rows)?;

    if !outcome.failures.is_empty() {
        warn!(
            "{} of {} files could not be sampled:",
            outcome.failures.len(),
            outcome.failures.len() + rows_written
        );
        for failure in &outcome.failures {
            warn!("  {:?}: {}", failure.source_file, failure.reason);
        }
    }

    let report = RunReport {
        generated_at: Utc::now(),
        catalog_size: catalog.len(),
        dates: inventory.date_count(),
        files: inventory.file_count(),
        rows_written,
        skipped_cloud_masks: outcome.skipped_cloud_masks,
        failures: outcome.failures,
        output_path: config.output_path.clone(),
        central_sensor: central,
    };

    if let Some(path) = &config.report_path {
        write_run_report(path, &report)?;
    }

    Ok(report)
}
