//! DEM sources
//!
//! The delineation core only sees the [`DemSource`] capability. Acquisition,
//! download caching and reprojection live behind implementations of it.

mod geotiff;

pub use geotiff::{write_geotiff, GeoTiffDem};

use crate::crs::CRS;
use crate::error::{Error, Result};
use crate::raster::ElevationGrid;
use serde::{Deserialize, Serialize};

/// Axis-aligned region in the target CRS
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x: min_x.min(max_x),
            min_y: min_y.min(max_y),
            max_x: min_x.max(max_x),
            max_y: min_y.max(max_y),
        }
    }

    pub fn from_tuple((min_x, min_y, max_x, max_y): (f64, f64, f64, f64)) -> Self {
        Self::new(min_x, min_y, max_x, max_y)
    }

    /// Grow on every side by `amount`
    pub fn expand(&self, amount: f64) -> Self {
        Self::new(
            self.min_x - amount,
            self.min_y - amount,
            self.max_x + amount,
            self.max_y + amount,
        )
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

/// Anything that can produce an elevation grid for a region.
pub trait DemSource {
    /// Load elevations covering `bounds` grown by `buffer_m`, in `target_crs`.
    fn load_for_region(
        &self,
        bounds: Bounds,
        target_crs: &CRS,
        buffer_m: f64,
    ) -> Result<ElevationGrid>;
}

/// A DEM already materialised in memory (tests, pre-fetched tiles)
#[derive(Debug, Clone)]
pub struct InMemoryDem {
    grid: ElevationGrid,
}

impl InMemoryDem {
    pub fn new(grid: ElevationGrid) -> Self {
        Self { grid }
    }
}

impl DemSource for InMemoryDem {
    fn load_for_region(
        &self,
        bounds: Bounds,
        target_crs: &CRS,
        buffer_m: f64,
    ) -> Result<ElevationGrid> {
        crop_to_bounds(&self.grid, bounds, target_crs, buffer_m)
    }
}

/// Crop `grid` to the pixels intersecting `bounds` + `buffer_m`.
pub(crate) fn crop_to_bounds(
    grid: &ElevationGrid,
    bounds: Bounds,
    target_crs: &CRS,
    buffer_m: f64,
) -> Result<ElevationGrid> {
    if !grid.crs().is_equivalent(target_crs) {
        return Err(Error::CrsMismatch(
            grid.crs().identifier(),
            target_crs.identifier(),
        ));
    }

    let wanted = bounds.expand(buffer_m.max(0.0));
    let transform = grid.transform();
    let (rows, cols) = grid.shape();

    let corners = [
        transform.geo_to_pixel(wanted.min_x, wanted.min_y),
        transform.geo_to_pixel(wanted.max_x, wanted.max_y),
        transform.geo_to_pixel(wanted.min_x, wanted.max_y),
        transform.geo_to_pixel(wanted.max_x, wanted.min_y),
    ];
    if corners.iter().any(|(c, r)| !c.is_finite() || !r.is_finite()) {
        return Err(Error::Other("degenerate transform".into()));
    }

    let col_lo = corners.iter().map(|c| c.0).fold(f64::INFINITY, f64::min);
    let col_hi = corners.iter().map(|c| c.0).fold(f64::NEG_INFINITY, f64::max);
    let row_lo = corners.iter().map(|c| c.1).fold(f64::INFINITY, f64::min);
    let row_hi = corners.iter().map(|c| c.1).fold(f64::NEG_INFINITY, f64::max);

    let c0 = col_lo.floor().max(0.0) as usize;
    let r0 = row_lo.floor().max(0.0) as usize;
    let c1 = (col_hi.ceil().max(0.0) as usize).min(cols);
    let r1 = (row_hi.ceil().max(0.0) as usize).min(rows);

    if c0 >= c1 || r0 >= r1 {
        return Err(Error::Other(format!(
            "region ({:.1}, {:.1}) - ({:.1}, {:.1}) does not overlap the DEM",
            wanted.min_x, wanted.min_y, wanted.max_x, wanted.max_y
        )));
    }

    grid.crop(r0, c0, r1 - r0, c1 - c0)
}
