//! Georeferenced GeoTIFF writers for tests.
use gdal::raster::{Buffer, GdalType};
use gdal::spatial_ref::SpatialRef;
use gdal::{Dataset, DriverManager};
use std::ffi::{CString, c_int, c_void};
use std::path::Path;
use std::ptr;

/// Write a single-band GeoTIFF with the given geotransform and EPSG code.
pub fn write_georeferenced<T: GdalType + Copy>(
    output: &Path,
    cols: usize,
    rows: usize,
    data: &[T],
    geotransform: [f64; 6],
    epsg: u32,
) -> Result<(), Box<dyn std::error::Error>> {
    write_with_srs(output, cols, rows, data, geotransform, &SpatialRef::from_epsg(epsg)?)
}

pub fn write_with_srs<T: GdalType + Copy>(
    output: &Path,
    cols: usize,
    rows: usize,
    data: &[T],
    geotransform: [f64; 6],
    srs: &SpatialRef,
) -> Result<(), Box<dyn std::error::Error>> {
    let driver = DriverManager::get_driver_by_name("GTiff")?;
    let mut ds = driver.create_with_band_type::<T, _>(output, cols, rows, 1)?;
    ds.set_geo_transform(&geotransform)?;
    ds.set_spatial_ref(srs)?;
    let mut buf = Buffer::new((cols, rows), data.to_vec());
    let mut band = ds.rasterband(1)?;
    band.write((0, 0), (cols, rows), &mut buf)?;
    Ok(())
}

/// Write raw native-endian samples into a band of GDAL type `type_name`
/// (`"Int8"`, `"UInt64"`, ...).
///
/// Returns `false` without creating anything when the linked GDAL does not know the type.
pub fn write_georeferenced_native(
    output: &Path,
    cols: usize,
    rows: usize,
    type_name: &str,
    bytes: &[u8],
    geotransform: [f64; 6],
    epsg: u32,
) -> Result<bool, Box<dyn std::error::Error>> {
    let c_type = CString::new(type_name)?;
    let dtype = unsafe { gdal_sys::GDALGetDataTypeByName(c_type.as_ptr()) };
    if dtype == gdal_sys::GDALDataType::GDT_Unknown {
        return Ok(false);
    }
    let sample_size = unsafe { gdal_sys::GDALGetDataTypeSizeBytes(dtype) } as usize;
    let expected = cols * rows * sample_size;
    if bytes.len() != expected {
        return Err(format!("expected {} bytes, got {}", expected, bytes.len()).into());
    }

    let driver = DriverManager::get_driver_by_name("GTiff")?;
    let c_path = CString::new(output.to_str().ok_or("non UTF-8 path")?)?;
    let mut data = bytes.to_vec();
    let mut ds = unsafe {
        let handle = gdal_sys::GDALCreate(
            driver.c_driver(),
            c_path.as_ptr(),
            cols as c_int,
            rows as c_int,
            1,
            dtype,
            ptr::null_mut(),
        );
        if handle.is_null() {
            return Err(format!("GDALCreate failed for {:?}", output).into());
        }
        let ds = Dataset::from_c_dataset(handle);
        let band = gdal_sys::GDALGetRasterBand(handle, 1);
        let err = gdal_sys::GDALRasterIO(
            band,
            gdal_sys::GDALRWFlag::GF_Write,
            0,
            0,
            cols as c_int,
            rows as c_int,
            data.as_mut_ptr() as *mut c_void,
            cols as c_int,
            rows as c_int,
            dtype,
            0,
            0,
        );
        if err != gdal_sys::CPLErr::CE_None {
            return Err(format!("GDALRasterIO write failed with {}", err).into());
        }
        ds
    };
    ds.set_geo_transform(&geotransform)?;
    ds.set_spatial_ref(&SpatialRef::from_epsg(epsg)?)?;
    Ok(true)
}

/// Constant-valued tile covering `[lon0, lon0 + cols*step] x [lat0 - rows*step, lat0]` in WGS84.
pub fn write_constant_wgs84_tile(
    output: &Path,
    value: u16,
    lon0: f64,
    lat0: f64,
    step: f64,
    cols: usize,
    rows: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let data = vec![value; cols * rows];
    write_georeferenced(output, cols, rows, &data, [lon0, step, 0.0, lat0, 0.0, -step], 4326)
}
