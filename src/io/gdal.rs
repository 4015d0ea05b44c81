use gdal::Dataset;
use gdal::raster::{GdalDataType, GdalType, RasterBand};
use gdal::spatial_ref::{AxisMappingStrategy, CoordTransform, SpatialRef};
use std::ffi::{CStr, c_int, c_void};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::affine::{self, InverseGeoTransform, PixelIndex};
use crate::types::{PixelSample, PixelValue, Resolution};

const WGS84_EPSG: u32 = 4326;

/// Failures sampling a single raster file
#[derive(Debug, Error)]
pub enum SampleError {
    #[error("Cannot read raster {path:?}: {reason}")]
    RasterOpen { path: PathBuf, reason: String },

    #[error(
        "Coordinate falls outside raster {path:?}: pixel (row={row}, col={col}) not in {width}x{height}"
    )]
    OutOfBounds {
        path: PathBuf,
        row: i64,
        col: i64,
        width: usize,
        height: usize,
    },

    #[error("Invalid georeferencing in {path:?}: {reason}")]
    Georeferencing { path: PathBuf, reason: String },
}

impl SampleError {
    pub fn path(&self) -> &Path {
        match self {
            SampleError::RasterOpen { path, .. }
            | SampleError::OutOfBounds { path, .. }
            | SampleError::Georeferencing { path, .. } => path,
        }
    }

    fn open(path: &Path, reason: impl std::fmt::Display) -> Self {
        SampleError::RasterOpen {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    }
}

/// Metadata extracted from a GDAL-supported raster
#[derive(Debug, Clone)]
pub struct RasterMetadata {
    /// Width (pixels) of the raster
    pub size_x: usize,
    /// Height (lines) of the raster
    pub size_y: usize,
    /// Number of raster bands
    pub bands: usize,
    /// Affine geotransform coefficients ([origin_x, pixel_width, rot_x, origin_y, rot_y, pixel_height])
    pub geotransform: [f64; 6],
    /// `EPSG:<code>` when the CRS carries an EPSG authority, WKT otherwise
    pub crs: String,
}

/// A raster opened read-only. The dataset handle is released when this is dropped.
pub struct GdalRaster {
    path: PathBuf,
    dataset: Dataset,
    spatial_ref: SpatialRef,
    pub metadata: RasterMetadata,
}

/// `AUTH:CODE` when the CRS carries an authority at its top level, WKT otherwise.
fn crs_identifier(srs: &SpatialRef, projection: &str) -> String {
    if let (Some(name), Ok(code)) = (srs.auth_name(), srs.auth_code()) {
        return format!("{}:{}", name, code);
    }
    srs.to_wkt().unwrap_or_else(|_| projection.to_string())
}

fn read_pixel<T: GdalType + Copy>(band: &RasterBand, index: PixelIndex) -> Result<T, String> {
    let buf = band
        .read_as::<T>(
            (index.col as isize, index.row as isize),
            (1, 1),
            (1, 1),
            None,
        )
        .map_err(|e| e.to_string())?;
    Ok(buf.data()[0])
}

fn native_type_name(band: &RasterBand) -> String {
    unsafe {
        let dtype = gdal_sys::GDALGetRasterDataType(band.c_rasterband());
        let name = gdal_sys::GDALGetDataTypeName(dtype);
        if name.is_null() {
            return String::new();
        }
        CStr::from_ptr(name).to_string_lossy().into_owned()
    }
}

// GdalType impls for i8, u64 and i64 depend on the linked GDAL version, so these
// bands are read through the C API in their own type.
fn read_native_bytes<const N: usize>(
    band: &RasterBand,
    index: PixelIndex,
) -> Result<[u8; N], String> {
    let mut buf = [0u8; N];
    let err = unsafe {
        let handle = band.c_rasterband();
        let dtype = gdal_sys::GDALGetRasterDataType(handle);
        if gdal_sys::GDALGetDataTypeSizeBytes(dtype) as usize != N {
            return Err(format!("unexpected sample size for {}", native_type_name(band)));
        }
        gdal_sys::GDALRasterIO(
            handle,
            gdal_sys::GDALRWFlag::GF_Read,
            index.col as c_int,
            index.row as c_int,
            1,
            1,
            buf.as_mut_ptr() as *mut c_void,
            1,
            1,
            dtype,
            0,
            0,
        )
    };
    if err != gdal_sys::CPLErr::CE_None {
        return Err(format!("GDALRasterIO failed with {}", err));
    }
    Ok(buf)
}

impl GdalRaster {
    /// Open a GDAL-supported raster and collect its georeferencing.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, SampleError> {
        let path = path.as_ref();
        let dataset = Dataset::open(path).map_err(|e| SampleError::open(path, e))?;
        let (size_x, size_y) = dataset.raster_size();
        let bands = dataset.raster_count() as usize;
        if bands == 0 {
            return Err(SampleError::open(path, "no raster bands found"));
        }
        let geotransform = dataset
            .geo_transform()
            .map_err(|e| SampleError::Georeferencing {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        let mut spatial_ref = dataset
            .spatial_ref()
            .map_err(|e| SampleError::open(path, format!("no coordinate reference system: {}", e)))?;
        spatial_ref.set_axis_mapping_strategy(AxisMappingStrategy::TraditionalGisOrder);
        let crs = crs_identifier(&spatial_ref, &dataset.projection());

        Ok(GdalRaster {
            path: path.to_path_buf(),
            dataset,
            spatial_ref,
            metadata: RasterMetadata {
                size_x: size_x as usize,
                size_y: size_y as usize,
                bands,
                geotransform,
                crs,
            },
        })
    }

    /// Project a WGS84 (lon, lat) into the raster's native CRS as (x, y).
    pub fn project_lon_lat(&self, lon: f64, lat: f64) -> Result<(f64, f64), SampleError> {
        let mut wgs84 =
            SpatialRef::from_epsg(WGS84_EPSG).map_err(|e| SampleError::open(&self.path, e))?;
        // (x, y) = (lon, lat) regardless of the EPSG axis order
        wgs84.set_axis_mapping_strategy(AxisMappingStrategy::TraditionalGisOrder);

        let transform = CoordTransform::new(&wgs84, &self.spatial_ref)
            .map_err(|e| SampleError::open(&self.path, format!("no transform to raster CRS: {}", e)))?;

        let mut xs = [lon];
        let mut ys = [lat];
        let mut zs = [0.0];
        transform
            .transform_coords(&mut xs, &mut ys, &mut zs)
            .map_err(|e| SampleError::open(&self.path, format!("reprojection failed: {}", e)))?;
        Ok((xs[0], ys[0]))
    }

    /// Resolve the pixel containing a coordinate expressed in the raster's CRS.
    pub fn pixel_at(&self, x: f64, y: f64) -> Result<PixelIndex, SampleError> {
        let inverse = InverseGeoTransform::new(self.metadata.geotransform).ok_or_else(|| {
            SampleError::Georeferencing {
                path: self.path.clone(),
                reason: format!("singular geotransform {:?}", self.metadata.geotransform),
            }
        })?;
        let (row, col) = inverse.containing_pixel(x, y);
        affine::checked_index(row, col, self.metadata.size_x, self.metadata.size_y).ok_or_else(
            || SampleError::OutOfBounds {
                path: self.path.clone(),
                row,
                col,
                width: self.metadata.size_x,
                height: self.metadata.size_y,
            },
        )
    }

    /// Read the first band at `index` in the band's own data type.
    pub fn read_value(&self, index: PixelIndex) -> Result<PixelValue, SampleError> {
        let band = self
            .dataset
            .rasterband(1)
            .map_err(|e| SampleError::open(&self.path, e))?;
        let value = match band.band_type() {
            GdalDataType::UInt8 => read_pixel::<u8>(&band, index).map(PixelValue::U8),
            GdalDataType::UInt16 => read_pixel::<u16>(&band, index).map(PixelValue::U16),
            GdalDataType::Int16 => read_pixel::<i16>(&band, index).map(PixelValue::I16),
            GdalDataType::UInt32 => read_pixel::<u32>(&band, index).map(PixelValue::U32),
            GdalDataType::Int32 => read_pixel::<i32>(&band, index).map(PixelValue::I32),
            GdalDataType::Float32 => read_pixel::<f32>(&band, index).map(PixelValue::F32),
            GdalDataType::Float64 => read_pixel::<f64>(&band, index).map(PixelValue::F64),
            _ => match native_type_name(&band).as_str() {
                "Int8" => read_native_bytes::<1>(&band, index)
                    .map(|b| PixelValue::I8(i8::from_ne_bytes(b))),
                "UInt64" => read_native_bytes::<8>(&band, index)
                    .map(|b| PixelValue::U64(u64::from_ne_bytes(b))),
                "Int64" => read_native_bytes::<8>(&band, index)
                    .map(|b| PixelValue::I64(i64::from_ne_bytes(b))),
                _ => read_pixel::<f64>(&band, index).map(PixelValue::F64),
            },
        };
        value.map_err(|e| SampleError::open(&self.path, format!("band read failed: {}", e)))
    }

    pub fn resolution(&self) -> Resolution {
        let (x, y) = affine::resolution(&self.metadata.geotransform);
        Resolution { x, y }
    }

    /// Sample the pixel covering a WGS84 coordinate.
    pub fn sample(&self, lat: f64, lon: f64) -> Result<PixelSample, SampleError> {
        let (x, y) = self.project_lon_lat(lon, lat)?;
        let index = self.pixel_at(x, y)?;
        let value = self.read_value(index)?;
        Ok(PixelSample {
            value,
            crs: self.metadata.crs.clone(),
            resolution: self.resolution(),
            width: self.metadata.size_x,
            height: self.metadata.size_y,
            row: index.row,
            col: index.col,
        })
    }
}

/// Open `path`, sample it at (lat, lon) and close it again.
pub fn sample_pixel(path: &Path, lat: f64, lon: f64) -> Result<PixelSample, SampleError> {
    let raster = GdalRaster::open(path)?;
    raster.sample(lat, lon)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::fixtures::{write_georeferenced, write_georeferenced_native, write_with_srs};
    use tempfile::tempdir;

    // 4x3 grid of 0.01 degree pixels with its upper-left corner at (lon 10, lat 50)
    const GEO_GT: [f64; 6] = [10.0, 0.01, 0.0, 50.0, 0.0, -0.01];

    #[test]
    fn test_sample_exact_pixel_in_geographic_raster() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("2024-06-01_x_band_B02.tif");
        let data: Vec<u16> = (0..12).map(|v| v * 100 + 7).collect();
        write_georeferenced(&path, 4, 3, &data, GEO_GT, 4326).unwrap();

        // centre of row 2, col 1
        let sample = sample_pixel(&path, 50.0 - 2.5 * 0.01, 10.0 + 1.5 * 0.01).unwrap();
        assert_eq!((sample.row, sample.col), (2, 1));
        assert_eq!(sample.value, PixelValue::U16(data[2 * 4 + 1]));
        assert_eq!(sample.crs, "EPSG:4326");
        assert_eq!((sample.width, sample.height), (4, 3));
        assert!((sample.resolution.x - 0.01).abs() < 1e-12);
        assert!((sample.resolution.y - 0.01).abs() < 1e-12);
    }

    #[test]
    fn test_float_values_are_bit_exact() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("f.tif");
        let data: Vec<f32> = vec![0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8, 0.9, 1.1, 1.2, 1.3];
        write_georeferenced(&path, 4, 3, &data, GEO_GT, 4326).unwrap();

        let sample = sample_pixel(&path, 50.0 - 1.5 * 0.01, 10.0 + 2.5 * 0.01).unwrap();
        match sample.value {
            PixelValue::F32(v) => assert_eq!(v.to_bits(), data[6].to_bits()),
            other => panic!("unexpected pixel type: {:?}", other),
        }
    }

    #[test]
    fn test_u64_values_keep_full_precision() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("u64.tif");
        let big: u64 = (1 << 53) + 1;
        let bytes: Vec<u8> = [big, 1, 2, 3].iter().flat_map(|v| v.to_ne_bytes()).collect();
        // the linked GDAL predates 64-bit integer bands
        if !write_georeferenced_native(&path, 2, 2, "UInt64", &bytes, GEO_GT, 4326).unwrap() {
            return;
        }

        let sample = sample_pixel(&path, 50.0 - 0.5 * 0.01, 10.0 + 0.5 * 0.01).unwrap();
        assert_eq!(sample.value, PixelValue::U64(big));
        assert_eq!(sample.value.to_string(), "9007199254740993");
    }

    #[test]
    fn test_int8_and_int64_values_keep_native_type() {
        let dir = tempdir().unwrap();

        let path = dir.path().join("i8.tif");
        let bytes: Vec<u8> = [3i8, -4, 5, -6].iter().flat_map(|v| v.to_ne_bytes()).collect();
        if write_georeferenced_native(&path, 2, 2, "Int8", &bytes, GEO_GT, 4326).unwrap() {
            let sample = sample_pixel(&path, 50.0 - 1.5 * 0.01, 10.0 + 1.5 * 0.01).unwrap();
            assert_eq!(sample.value, PixelValue::I8(-6));
        }

        let path = dir.path().join("i64.tif");
        let bytes: Vec<u8> = [i64::MIN, 0, 1, i64::MAX]
            .iter()
            .flat_map(|v| v.to_ne_bytes())
            .collect();
        if write_georeferenced_native(&path, 2, 2, "Int64", &bytes, GEO_GT, 4326).unwrap() {
            let sample = sample_pixel(&path, 50.0 - 0.5 * 0.01, 10.0 + 0.5 * 0.01).unwrap();
            assert_eq!(sample.value, PixelValue::I64(i64::MIN));
        }
    }

    #[test]
    fn test_custom_projection_reports_wkt() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tmerc.tif");
        let srs = SpatialRef::from_proj4(
            "+proj=tmerc +lat_0=0 +lon_0=-68.5 +k=1 +x_0=500000 +y_0=0 +datum=WGS84 +units=m +no_defs",
        )
        .unwrap();
        let gt = [499990.0, 10.0, 0.0, 10.0, 0.0, -10.0];
        write_with_srs(&path, 2, 2, &[1u16, 2, 3, 4], gt, &srs).unwrap();

        let raster = GdalRaster::open(&path).unwrap();
        let crs = &raster.metadata.crs;
        assert_ne!(crs, "EPSG:9001");
        assert!(!crs.starts_with("EPSG:"), "{}", crs);
        assert!(crs.contains("-68.5"), "{}", crs);

        // the projected origin sits on the corner shared by all four pixels
        let sample = raster.sample(-0.00003, -68.49997).unwrap();
        assert_eq!((sample.row, sample.col), (1, 1));
        assert_eq!(sample.value, PixelValue::U16(4));
    }

    #[test]
    fn test_sample_reprojects_into_web_mercator() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("m.tif");
        // 2x2 grid of 10 m pixels centred on the projected origin
        let gt = [-10.0, 10.0, 0.0, 10.0, 0.0, -10.0];
        let data: Vec<i16> = vec![1, 2, 3, 4];
        write_georeferenced(&path, 2, 2, &data, gt, 3857).unwrap();

        // a few metres south-east of the projected origin
        let sample = sample_pixel(&path, -0.00003, 0.00003).unwrap();
        assert_eq!((sample.row, sample.col), (1, 1));
        assert_eq!(sample.value, PixelValue::I16(4));
        assert_eq!(sample.crs, "EPSG:3857");

        // just north-west of the origin
        let sample = sample_pixel(&path, 0.00003, -0.00003).unwrap();
        assert_eq!((sample.row, sample.col), (0, 0));
        assert_eq!(sample.value, PixelValue::I16(1));
    }

    #[test]
    fn test_outside_extent_is_out_of_bounds() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("b.tif");
        write_georeferenced(&path, 4, 3, &[0u8; 12], GEO_GT, 4326).unwrap();

        // just west of the left edge
        let err = sample_pixel(&path, 49.995, 9.995).unwrap_err();
        match err {
            SampleError::OutOfBounds { row, col, width, height, .. } => {
                assert_eq!((row, col), (0, -1));
                assert_eq!((width, height), (4, 3));
            }
            other => panic!("expected OutOfBounds, got {:?}", other),
        }

        // far south-east
        assert!(matches!(
            sample_pixel(&path, 40.0, 20.0),
            Err(SampleError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn test_unreadable_file_is_raster_open_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.tif");
        std::fs::write(&path, b"not a tiff").unwrap();

        let err = sample_pixel(&path, 0.0, 0.0).unwrap_err();
        assert!(matches!(err, SampleError::RasterOpen { .. }));
        assert_eq!(err.path(), path.as_path());
    }

    #[test]
    fn test_missing_file_is_raster_open_error() {
        let dir = tempdir().unwrap();
        let err = sample_pixel(&dir.path().join("missing.tif"), 0.0, 0.0).unwrap_err();
        assert!(matches!(err, SampleError::RasterOpen { .. }));
    }
}
