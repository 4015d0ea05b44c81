//! I/O layer: the sensor catalog loader, the GDAL-backed pixel sampler and
//! `writers` for the output table and the JSON run report.
pub mod catalog;
pub use catalog::{load_catalog, load_catalog_with_delimiter};

pub mod gdal;
pub use gdal::{GdalRaster, RasterMetadata, SampleError, sample_pixel};

pub mod writers;

#[cfg(test)]
pub(crate) mod fixtures;
