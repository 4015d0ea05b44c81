//! Pure pipeline logic: configuration, central sensor selection, tile inventory
//! and affine georeferencing. Nothing here touches GDAL.
pub mod affine;
pub mod inventory;
pub mod params;
pub mod selection;
