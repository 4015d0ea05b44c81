use std::fs;
use std::path::{Path, PathBuf};

use csv::WriterBuilder;
use tracing::info;

use crate::error::{Error, Result};
use crate::types::TimeSeriesRow;

/// Column order of the output table; matches the `TimeSeriesRow` field order.
pub const HEADER: [&str; 11] = [
    "date",
    "sensor_id",
    "latitud",
    "longitud",
    "band_label",
    "pixel_value",
    "crs",
    "resolution",
    "width",
    "height",
    "source_file",
];

fn partial_path(output: &Path) -> PathBuf {
    let mut name = output.file_name().unwrap_or_default().to_os_string();
    name.push(".partial");
    output.with_file_name(name)
}

/// Write the header plus one line per row. The table is written to a sibling
/// `.partial` file and renamed into place, so a failed write leaves no output.
pub fn write_time_series(output: &Path, rows: &[TimeSeriesRow]) -> Result<usize> {
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| Error::serialization(output, e))?;
    }

    let tmp = partial_path(output);
    let written = write_rows(&tmp, rows).and_then(|n| {
        fs::rename(&tmp, output).map_err(|e| Error::serialization(output, e))?;
        Ok(n)
    });
    if written.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    let written = written?;

    info!("Wrote {} rows to {:?}", written, output);
    Ok(written)
}

fn write_rows(path: &Path, rows: &[TimeSeriesRow]) -> Result<usize> {
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(|e| Error::serialization(path, e))?;

    writer
        .write_record(HEADER)
        .map_err(|e| Error::serialization(path, e))?;
    for row in rows {
        writer
            .serialize(row)
            .map_err(|e| Error::serialization(path, e))?;
    }
    writer.flush().map_err(|e| Error::serialization(path, e))?;
    Ok(rows.len())
}
