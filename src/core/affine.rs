//! GDAL-style affine geotransform helpers.
//!
//! Coefficients follow GDAL ordering:
//! `[origin_x, pixel_width, rot_x, origin_y, rot_y, pixel_height]`, mapping
//! `(col, row)` to `x = gt0 + col*gt1 + row*gt2`, `y = gt3 + col*gt4 + row*gt5`.

/// Inverse of a geotransform, world coordinates to fractional pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InverseGeoTransform {
    gt: [f64; 6],
    det: f64,
}

/// Integer pixel location, guaranteed inside the raster it was resolved against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelIndex {
    pub row: usize,
    pub col: usize,
}

impl InverseGeoTransform {
    /// `None` when the transform is singular.
    pub fn new(gt: [f64; 6]) -> Option<Self> {
        let det = gt[1] * gt[5] - gt[2] * gt[4];
        if det == 0.0 || !det.is_finite() {
            return None;
        }
        Some(Self { gt, det })
    }

    /// Fractional (row, col) of a world coordinate.
    pub fn fractional(&self, x: f64, y: f64) -> (f64, f64) {
        let gt = &self.gt;
        let dx = x - gt[0];
        let dy = y - gt[3];
        let col = (gt[5] * dx - gt[2] * dy) / self.det;
        let row = (-gt[4] * dx + gt[1] * dy) / self.det;
        (row, col)
    }

    /// Pixel containing the world coordinate, floored. Returns the signed index
    /// so callers can report where an out-of-range point landed.
    pub fn containing_pixel(&self, x: f64, y: f64) -> (i64, i64) {
        let (row, col) = self.fractional(x, y);
        (row.floor() as i64, col.floor() as i64)
    }
}

/// Bounds-check a signed index against the raster size.
pub fn checked_index(row: i64, col: i64, width: usize, height: usize) -> Option<PixelIndex> {
    if row < 0 || col < 0 {
        return None;
    }
    let (row, col) = (row as usize, col as usize);
    if row >= height || col >= width {
        return None;
    }
    Some(PixelIndex { row, col })
}

/// Absolute pixel size along x and y, accounting for rotation terms.
pub fn resolution(gt: &[f64; 6]) -> (f64, f64) {
    let x = (gt[1] * gt[1] + gt[4] * gt[4]).sqrt();
    let y = (gt[2] * gt[2] + gt[5] * gt[5]).sqrt();
    (x, y)
}
