//! Elevation grids with NaN no-data and a metric pixel size

use crate::crs::CRS;
use crate::error::{Error, Result};
use crate::raster::{GeoTransform, Raster, TerrainMask};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Relative disagreement tolerated between an explicit pixel size and the
/// one implied by the transform.
const PIXEL_SIZE_TOLERANCE: f64 = 0.01;

/// Summary of the finite cells of a grid
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FiniteStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub count: usize,
}

/// DEM elevations in metres on a projected grid.
///
/// No-data cells are `NaN`. The pixel size is always derived from, or checked
/// against, the transform so the two cannot drift apart.
#[derive(Debug, Clone, PartialEq)]
pub struct ElevationGrid {
    raster: Raster<f64>,
    pixel_size_m: f64,
}

impl ElevationGrid {
    /// Build a grid; the pixel size is the transform's averaged cell size.
    pub fn new(data: Array2<f64>, transform: GeoTransform, crs: CRS) -> Result<Self> {
        let pixel_size_m = transform.pixel_size();
        Self::with_pixel_size(data, transform, crs, pixel_size_m)
    }

    /// Build a grid with an explicit pixel size (e.g. reported by a DEM source).
    pub fn with_pixel_size(
        data: Array2<f64>,
        transform: GeoTransform,
        crs: CRS,
        pixel_size_m: f64,
    ) -> Result<Self> {
        let (rows, cols) = data.dim();
        if rows == 0 || cols == 0 {
            return Err(Error::InvalidDimensions {
                width: cols,
                height: rows,
            });
        }
        if !pixel_size_m.is_finite() || pixel_size_m <= 0.0 {
            return Err(Error::invalid_parameter(
                "pixel_size_m",
                pixel_size_m,
                "pixel size must be finite and positive",
            ));
        }

        let implied = transform.pixel_size();
        if (implied - pixel_size_m).abs() > implied * PIXEL_SIZE_TOLERANCE {
            return Err(Error::invalid_parameter(
                "pixel_size_m",
                pixel_size_m,
                format!("transform implies a pixel size of {implied}"),
            ));
        }

        let mut raster = Raster::from_array(data);
        raster.set_transform(transform);
        raster.set_crs(Some(crs));
        Ok(Self {
            raster,
            pixel_size_m,
        })
    }

    /// Wrap an existing raster; it must carry a CRS.
    pub fn from_raster(raster: Raster<f64>) -> Result<Self> {
        let crs = raster
            .crs()
            .cloned()
            .ok_or_else(|| Error::Other("elevation raster has no CRS".into()))?;
        let transform = *raster.transform();
        Self::new(raster.into_array(), transform, crs)
    }

    pub fn raster(&self) -> &Raster<f64> {
        &self.raster
    }

    pub fn data(&self) -> &Array2<f64> {
        self.raster.data()
    }

    pub fn transform(&self) -> &GeoTransform {
        self.raster.transform()
    }

    pub fn crs(&self) -> &CRS {
        // Constructors always set a CRS.
        self.raster.crs().unwrap_or(&CRS::UNKNOWN)
    }

    pub fn pixel_size_m(&self) -> f64 {
        self.pixel_size_m
    }

    pub fn shape(&self) -> (usize, usize) {
        self.raster.shape()
    }

    /// Min / max / mean over finite cells; `None` if there are none.
    pub fn finite_stats(&self) -> Option<FiniteStats> {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut sum = 0.0;
        let mut count = 0usize;

        for &v in self.data().iter().filter(|v| v.is_finite()) {
            min = min.min(v);
            max = max.max(v);
            sum += v;
            count += 1;
        }

        (count > 0).then(|| FiniteStats {
            min,
            max,
            mean: sum / count as f64,
            count,
        })
    }

    /// Like [`finite_stats`](Self::finite_stats) but an all-no-data grid is an error.
    pub fn require_finite(&self) -> Result<FiniteStats> {
        self.finite_stats().ok_or(Error::NoFiniteData)
    }

    /// True where the elevation is finite
    pub fn finite_mask(&self) -> TerrainMask {
        self.raster.map(f64::is_finite)
    }

    /// Copy of the elevations with no-data replaced by `fill`
    pub fn filled(&self, fill: f64) -> Array2<f64> {
        self.data().mapv(|v| if v.is_finite() { v } else { fill })
    }

    /// Sub-grid covering rows `row_off..row_off+rows`, cols `col_off..col_off+cols`
    pub fn crop(&self, row_off: usize, col_off: usize, rows: usize, cols: usize) -> Result<Self> {
        let (total_rows, total_cols) = self.shape();
        if rows == 0 || cols == 0 || row_off + rows > total_rows || col_off + cols > total_cols {
            return Err(Error::InvalidDimensions {
                width: cols,
                height: rows,
            });
        }

        let data = self
            .data()
            .slice(ndarray::s![row_off..row_off + rows, col_off..col_off + cols])
            .to_owned();
        let transform = self.transform().window(col_off, row_off);
        Self::with_pixel_size(data, transform, self.crs().clone(), self.pixel_size_m)
    }
}
