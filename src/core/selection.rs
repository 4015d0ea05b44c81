//! Central sensor selection.
//!
//! The centroid and distances are computed in raw degree space (planar Euclidean).
//! This is adequate for sensors clustered over a single field or farm and wrong at
//! continental scale.
use serde::Serialize;

use crate::error::{Error, Result};
use crate::types::{SensorCatalog, SensorRecord};

/// The sensor closest to the catalog centroid, with the values used to pick it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CentralSensor {
    pub sensor: SensorRecord,
    /// (mean latitude, mean longitude)
    pub centroid: (f64, f64),
    /// Degree-space distance from `sensor` to `centroid`
    pub distance: f64,
}

/// Arithmetic mean of latitudes and longitudes, `None` for an empty slice.
pub fn centroid(sensors: &[SensorRecord]) -> Option<(f64, f64)> {
    if sensors.is_empty() {
        return None;
    }
    let n = sensors.len() as f64;
    let lat = sensors.iter().map(|s| s.latitude).sum::<f64>() / n;
    let lon = sensors.iter().map(|s| s.longitude).sum::<f64>() / n;
    Some((lat, lon))
}

pub fn degree_distance(sensor: &SensorRecord, point: (f64, f64)) -> f64 {
    let dlat = sensor.latitude - point.0;
    let dlon = sensor.longitude - point.1;
    (dlat * dlat + dlon * dlon).sqrt()
}

/// Pick the sensor nearest the catalog centroid. Ties go to the earliest record.
pub fn select_central_sensor(catalog: &SensorCatalog) -> Result<CentralSensor> {
    let sensors = catalog.sensors();
    let centroid = centroid(sensors).ok_or_else(|| Error::EmptyCatalog {
        path: catalog.source().map(|p| p.to_path_buf()).unwrap_or_default(),
    })?;

    let mut best: Option<(usize, f64)> = None;
    for (idx, sensor) in sensors.iter().enumerate() {
        let d = degree_distance(sensor, centroid);
        // strict `<` keeps the first minimum
        if best.is_none_or(|(_, best_d)| d < best_d) {
            best = Some((idx, d));
        }
    }

    let (idx, distance) = best.ok_or_else(|| Error::EmptyCatalog {
        path: catalog.source().map(|p| p.to_path_buf()).unwrap_or_default(),
    })?;

    Ok(CentralSensor {
        sensor: sensors[idx].clone(),
        centroid,
        distance,
    })
}
