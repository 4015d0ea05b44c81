use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::error::{Error, Result};

/// Write a pretty-printed JSON run report.
pub fn write_run_report<T: Serialize>(path: &Path, report: &T) -> Result<()> {
    let json_string =
        serde_json::to_string_pretty(report).map_err(|e| Error::serialization(path, e))?;
    std::fs::write(path, json_string).map_err(|e| Error::serialization(path, e))?;

    info!("Created run report: {:?}", path);
    Ok(())
}
