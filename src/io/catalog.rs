//! Sensor catalog loader.
//!
//! Accepts the raw device export columns (`sensor_device_id`, `sensor_lat`,
//! `sensor_lon`) or the normalized names (`sensor_id`, `latitud`, `longitud`).
//! Column names are case-sensitive; extra columns are ignored.
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::info;

use crate::error::{Error, Result};
use crate::types::{SensorCatalog, SensorRecord};

const ID_COLUMNS: [&str; 2] = ["sensor_device_id", "sensor_id"];
const LAT_COLUMNS: [&str; 2] = ["sensor_lat", "latitud"];
const LON_COLUMNS: [&str; 2] = ["sensor_lon", "longitud"];

fn find_column(headers: &StringRecord, names: &[&str]) -> Option<usize> {
    names
        .iter()
        .find_map(|name| headers.iter().position(|h| h == *name))
}

/// Load a comma-separated catalog.
pub fn load_catalog(path: &Path) -> Result<SensorCatalog> {
    load_catalog_with_delimiter(path, b',')
}

pub fn load_catalog_with_delimiter(path: &Path, delimiter: u8) -> Result<SensorCatalog> {
    let format_err = |reason: String| Error::CatalogFormat {
        path: path.to_path_buf(),
        reason,
    };

    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(Trim::All)
        .from_path(path)
        .map_err(|e| format_err(format!("cannot open: {}", e)))?;

    let headers = reader
        .headers()
        .map_err(|e| format_err(format!("cannot read header: {}", e)))?
        .clone();

    let id_idx = find_column(&headers, &ID_COLUMNS)
        .ok_or_else(|| format_err(format!("missing column, expected one of {:?}", ID_COLUMNS)))?;
    let lat_idx = find_column(&headers, &LAT_COLUMNS)
        .ok_or_else(|| format_err(format!("missing column, expected one of {:?}", LAT_COLUMNS)))?;
    let lon_idx = find_column(&headers, &LON_COLUMNS)
        .ok_or_else(|| format_err(format!("missing column, expected one of {:?}", LON_COLUMNS)))?;

    let mut sensors = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let row = i + 1;
        let record = record.map_err(|e| format_err(format!("row {}: {}", row, e)))?;

        let field = |idx: usize, name: &str| {
            record
                .get(idx)
                .ok_or_else(|| format_err(format!("row {}: missing {}", row, name)))
        };
        let parse_coord = |idx: usize, name: &str| -> Result<f64> {
            let raw = field(idx, name)?;
            raw.parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| format_err(format!("row {}: {} is not a number: {:?}", row, name, raw)))
        };

        let sensor_id = field(id_idx, "sensor_id")?.to_string();
        let latitude = parse_coord(lat_idx, "latitud")?;
        let longitude = parse_coord(lon_idx, "longitud")?;
        sensors.push(SensorRecord {
            sensor_id,
            latitude,
            longitude,
        });
    }

    info!("Loaded {} sensors from {:?}", sensors.len(), path);
    Ok(SensorCatalog::new(path, sensors))
}
