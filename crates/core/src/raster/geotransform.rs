//! Affine georeferencing for elevation grids and masks

use serde::{Deserialize, Serialize};

/// Affine transformation from pixel space to projected coordinates.
///
/// ```text
/// x = origin_x + col * pixel_width + row * row_rotation
/// y = origin_y + col * col_rotation + row * pixel_height
/// ```
///
/// `col`/`row` here are continuous pixel-corner coordinates: `(0, 0)` is the
/// outer corner of the first cell and `(0.5, 0.5)` its centre. North-up grids
/// have zero rotation terms and a negative `pixel_height`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoTransform {
    /// X coordinate of the upper-left corner
    pub origin_x: f64,
    /// Y coordinate of the upper-left corner
    pub origin_y: f64,
    /// Cell size along X
    pub pixel_width: f64,
    /// Cell size along Y (negative for north-up)
    pub pixel_height: f64,
    pub row_rotation: f64,
    pub col_rotation: f64,
}

impl GeoTransform {
    /// North-up transform with no rotation
    pub fn new(origin_x: f64, origin_y: f64, pixel_width: f64, pixel_height: f64) -> Self {
        Self {
            origin_x,
            origin_y,
            pixel_width,
            pixel_height,
            row_rotation: 0.0,
            col_rotation: 0.0,
        }
    }

    /// From a GDAL-ordered coefficient array
    /// `[origin_x, pixel_width, row_rotation, origin_y, col_rotation, pixel_height]`
    pub fn from_gdal(coeffs: [f64; 6]) -> Self {
        Self {
            origin_x: coeffs[0],
            pixel_width: coeffs[1],
            row_rotation: coeffs[2],
            origin_y: coeffs[3],
            col_rotation: coeffs[4],
            pixel_height: coeffs[5],
        }
    }

    /// Map continuous pixel-corner coordinates to projected coordinates
    pub fn corner_to_geo(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.origin_x + x * self.pixel_width + y * self.row_rotation,
            self.origin_y + x * self.col_rotation + y * self.pixel_height,
        )
    }

    /// Projected coordinates of the centre of cell (col, row)
    pub fn pixel_to_geo(&self, col: usize, row: usize) -> (f64, f64) {
        self.corner_to_geo(col as f64 + 0.5, row as f64 + 0.5)
    }

    /// Inverse mapping; returns fractional corner coordinates (col, row).
    /// NaN for a degenerate transform.
    pub fn geo_to_pixel(&self, x: f64, y: f64) -> (f64, f64) {
        let det = self.pixel_width * self.pixel_height - self.row_rotation * self.col_rotation;
        if det.abs() < 1e-12 {
            return (f64::NAN, f64::NAN);
        }

        let dx = x - self.origin_x;
        let dy = y - self.origin_y;
        (
            (self.pixel_height * dx - self.row_rotation * dy) / det,
            (-self.col_rotation * dx + self.pixel_width * dy) / det,
        )
    }

    /// Ground size of one pixel, averaged over both axes
    pub fn pixel_size(&self) -> f64 {
        let x = self.pixel_width.hypot(self.col_rotation);
        let y = self.pixel_height.hypot(self.row_rotation);
        (x + y) / 2.0
    }

    pub fn is_north_up(&self) -> bool {
        self.row_rotation.abs() < 1e-10
            && self.col_rotation.abs() < 1e-10
            && self.pixel_height < 0.0
    }

    /// Bounding box (min_x, min_y, max_x, max_y) of a `cols` x `rows` grid
    pub fn bounds(&self, cols: usize, rows: usize) -> (f64, f64, f64, f64) {
        let corners = [
            self.corner_to_geo(0.0, 0.0),
            self.corner_to_geo(cols as f64, 0.0),
            self.corner_to_geo(0.0, rows as f64),
            self.corner_to_geo(cols as f64, rows as f64),
        ];

        corners.iter().fold(
            (f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
            |(min_x, min_y, max_x, max_y), &(x, y)| {
                (min_x.min(x), min_y.min(y), max_x.max(x), max_y.max(y))
            },
        )
    }

    /// Transform of a sub-window starting at (col_off, row_off)
    pub fn window(&self, col_off: usize, row_off: usize) -> Self {
        let (origin_x, origin_y) = self.corner_to_geo(col_off as f64, row_off as f64);
        Self {
            origin_x,
            origin_y,
            ..*self
        }
    }
}

impl Default for GeoTransform {
    fn default() -> Self {
        Self::new(0.0, 0.0, 1.0, -1.0)
    }
}
