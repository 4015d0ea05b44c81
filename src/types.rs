//! Shared types used across the pipeline.
//! Includes `BandLabel`, the sensor records and catalog, `BandFile`, the sampled
//! `PixelValue`/`PixelSample`, the output `TimeSeriesRow` and `FailurePolicy`.
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use serde::{Deserialize, Serialize, Serializer};

/// Band labels recognized in tile file names.
///
/// Ordering follows declaration order, which is also the order rows are emitted
/// within one acquisition date.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BandLabel {
    B01,
    B02,
    B03,
    B04,
    B05,
    B06,
    B07,
    B08,
    B09,
    B10,
    B11,
    B12,
    Aot,
    Wvp,
    Scl,
    Tci,
    /// Cloud mask. Recognized but never part of the inventory vocabulary.
    Cld,
}

impl BandLabel {
    pub const ALL: [BandLabel; 17] = [
        BandLabel::B01,
        BandLabel::B02,
        BandLabel::B03,
        BandLabel::B04,
        BandLabel::B05,
        BandLabel::B06,
        BandLabel::B07,
        BandLabel::B08,
        BandLabel::B09,
        BandLabel::B10,
        BandLabel::B11,
        BandLabel::B12,
        BandLabel::Aot,
        BandLabel::Wvp,
        BandLabel::Scl,
        BandLabel::Tci,
        BandLabel::Cld,
    ];

    /// Exact, case-sensitive match against the label text used in file names.
    pub fn parse(label: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|b| b.as_str() == label)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BandLabel::B01 => "B01",
            BandLabel::B02 => "B02",
            BandLabel::B03 => "B03",
            BandLabel::B04 => "B04",
            BandLabel::B05 => "B05",
            BandLabel::B06 => "B06",
            BandLabel::B07 => "B07",
            BandLabel::B08 => "B08",
            BandLabel::B09 => "B09",
            BandLabel::B10 => "B10",
            BandLabel::B11 => "B11",
            BandLabel::B12 => "B12",
            BandLabel::Aot => "AOT",
            BandLabel::Wvp => "WVP",
            BandLabel::Scl => "SCL",
            BandLabel::Tci => "TCI",
            BandLabel::Cld => "CLD",
        }
    }

    pub fn is_cloud_mask(&self) -> bool {
        matches!(self, BandLabel::Cld)
    }

    /// Labels admitted into a tile inventory: B01..B12, AOT, WVP, SCL, TCI.
    pub fn in_inventory_vocabulary(&self) -> bool {
        !self.is_cloud_mask()
    }
}

impl std::fmt::Display for BandLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One ground sensor as read from the catalog. Coordinates are WGS84 degrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorRecord {
    pub sensor_id: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl SensorRecord {
    pub fn new(sensor_id: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            sensor_id: sensor_id.into(),
            latitude,
            longitude,
        }
    }

    pub fn has_valid_coordinates(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// Sensors in catalog order. Duplicate identifiers are kept as-is.
#[derive(Debug, Clone, Default)]
pub struct SensorCatalog {
    source: Option<PathBuf>,
    sensors: Vec<SensorRecord>,
}

impl SensorCatalog {
    pub fn new(source: impl Into<PathBuf>, sensors: Vec<SensorRecord>) -> Self {
        Self {
            source: Some(source.into()),
            sensors,
        }
    }

    pub fn from_records(sensors: Vec<SensorRecord>) -> Self {
        Self {
            source: None,
            sensors,
        }
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn sensors(&self) -> &[SensorRecord] {
        &self.sensors
    }

    pub fn len(&self) -> usize {
        self.sensors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sensors.is_empty()
    }
}

/// A single-band raster tile for one acquisition date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BandFile {
    pub path: PathBuf,
    pub date: String,
    pub band: BandLabel,
    pub file_name: String,
}

/// Raw pixel value in the band's native data type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PixelValue {
    U8(u8),
    I8(i8),
    U16(u16),
    I16(i16),
    U32(u32),
    I32(i32),
    U64(u64),
    I64(i64),
    F32(f32),
    F64(f64),
}

impl std::fmt::Display for PixelValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PixelValue::U8(v) => write!(f, "{}", v),
            PixelValue::I8(v) => write!(f, "{}", v),
            PixelValue::U16(v) => write!(f, "{}", v),
            PixelValue::I16(v) => write!(f, "{}", v),
            PixelValue::U32(v) => write!(f, "{}", v),
            PixelValue::I32(v) => write!(f, "{}", v),
            PixelValue::U64(v) => write!(f, "{}", v),
            PixelValue::I64(v) => write!(f, "{}", v),
            PixelValue::F32(v) => write!(f, "{:?}", v),
            PixelValue::F64(v) => write!(f, "{:?}", v),
        }
    }
}

impl Serialize for PixelValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match *self {
            PixelValue::U8(v) => serializer.serialize_u8(v),
            PixelValue::I8(v) => serializer.serialize_i8(v),
            PixelValue::U16(v) => serializer.serialize_u16(v),
            PixelValue::I16(v) => serializer.serialize_i16(v),
            PixelValue::U32(v) => serializer.serialize_u32(v),
            PixelValue::I32(v) => serializer.serialize_i32(v),
            PixelValue::U64(v) => serializer.serialize_u64(v),
            PixelValue::I64(v) => serializer.serialize_i64(v),
            PixelValue::F32(v) => serializer.serialize_f32(v),
            PixelValue::F64(v) => serializer.serialize_f64(v),
        }
    }
}

/// Pixel size along each axis, always positive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution {
    pub x: f64,
    pub y: f64,
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:?}, {:?})", self.x, self.y)
    }
}

impl Serialize for Resolution {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Value and raster metadata read at one coordinate.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelSample {
    pub value: PixelValue,
    pub crs: String,
    pub resolution: Resolution,
    pub width: usize,
    pub height: usize,
    pub row: usize,
    pub col: usize,
}

/// One line of the output table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeriesRow {
    pub date: String,
    pub sensor_id: String,
    pub latitud: f64,
    pub longitud: f64,
    pub band_label: BandLabel,
    pub pixel_value: PixelValue,
    pub crs: String,
    pub resolution: Resolution,
    pub width: usize,
    pub height: usize,
    pub source_file: String,
}

impl TimeSeriesRow {
    pub fn new(sensor: &SensorRecord, file: &BandFile, sample: PixelSample) -> Self {
        Self {
            date: file.date.clone(),
            sensor_id: sensor.sensor_id.clone(),
            latitud: sensor.latitude,
            longitud: sensor.longitude,
            band_label: file.band,
            pixel_value: sample.value,
            crs: sample.crs,
            resolution: sample.resolution,
            width: sample.width,
            height: sample.height,
            source_file: file.file_name.clone(),
        }
    }
}

/// A raster that could not be sampled, kept when the run continues past it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampleFailure {
    pub date: String,
    pub band_label: BandLabel,
    pub source_file: PathBuf,
    pub reason: String,
}

/// What the assembler does when a single raster cannot be sampled.
#[derive(
    Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Record the failure and keep processing remaining files
    #[default]
    Collect,
    /// Stop at the first failure; nothing is written
    Abort,
}

impl std::fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailurePolicy::Collect => write!(f, "Collect"),
            FailurePolicy::Abort => write!(f, "Abort"),
        }
    }
}
