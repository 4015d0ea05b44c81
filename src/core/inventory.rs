//! Tile inventory: groups per-band raster files in a directory by acquisition date.
//!
//! File names follow `<date>_..._band_<LABEL>.<ext>`. The date key is the text before
//! the first underscore and is not parsed. Files that do not match are skipped
//! silently (thumbnails, metadata, cloud masks).
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{Error, Result};
use crate::types::{BandFile, BandLabel};

const BAND_MARKER: &str = "_band_";

/// Date key to band files, iterated in date order; files within a date are
/// sorted by band label then file name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TileInventory {
    by_date: BTreeMap<String, Vec<BandFile>>,
}

impl TileInventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a file, keeping the per-date ordering.
    pub fn insert(&mut self, file: BandFile) {
        let files = self.by_date.entry(file.date.clone()).or_default();
        let pos = files
            .binary_search_by(|f| (f.band, &f.file_name).cmp(&(file.band, &file.file_name)))
            .unwrap_or_else(|p| p);
        files.insert(pos, file);
    }

    pub fn get(&self, date: &str) -> Option<&[BandFile]> {
        self.by_date.get(date).map(|v| v.as_slice())
    }

    pub fn dates(&self) -> impl Iterator<Item = &str> {
        self.by_date.keys().map(|k| k.as_str())
    }

    /// All files in output order.
    pub fn iter(&self) -> impl Iterator<Item = &BandFile> {
        self.by_date.values().flatten()
    }

    pub fn date_count(&self) -> usize {
        self.by_date.len()
    }

    pub fn file_count(&self) -> usize {
        self.by_date.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_date.is_empty()
    }
}

/// Classify a file name. Returns `(date, band)` for names ending in
/// `_band_<LABEL>.<extension>` with LABEL in the inventory vocabulary.
pub fn classify_file_name(file_name: &str, extension: &str) -> Option<(String, BandLabel)> {
    let stem = file_name.strip_suffix(extension)?.strip_suffix('.')?;
    let (_, label) = stem.rsplit_once(BAND_MARKER)?;
    let band = BandLabel::parse(label)?;
    if !band.in_inventory_vocabulary() {
        return None;
    }
    let date = file_name.split('_').next().unwrap_or(file_name);
    Some((date.to_string(), band))
}

/// Scan `dir` (non-recursive) for band tiles with the given extension.
pub fn build_inventory(dir: &Path, extension: &str) -> Result<TileInventory> {
    let extension = extension.trim_start_matches('.');
    let not_found = |source: std::io::Error| Error::DirectoryNotFound {
        path: dir.to_path_buf(),
        source,
    };

    if !dir.is_dir() {
        return Err(not_found(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "not a directory",
        )));
    }

    let mut inventory = TileInventory::new();
    for entry in fs::read_dir(dir).map_err(not_found)? {
        let entry = entry.map_err(not_found)?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if path.extension().and_then(|e| e.to_str()) != Some(extension) {
            continue;
        }
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()).map(str::to_string)
        else {
            debug!("Skipping non UTF-8 file name: {:?}", path);
            continue;
        };

        match classify_file_name(&file_name, extension) {
            Some((date, band)) => inventory.insert(BandFile {
                path,
                date,
                band,
                file_name,
            }),
            None => debug!("Skipping unrecognized raster: {}", file_name),
        }
    }

    debug!(
        "Inventory of {:?}: {} dates, {} files",
        dir,
        inventory.date_count(),
        inventory.file_count()
    );
    Ok(inventory)
}
