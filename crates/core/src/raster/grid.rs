//! Georeferenced 2D grid container

use crate::crs::CRS;
use crate::error::{Error, Result};
use crate::raster::GeoTransform;
use ndarray::{Array2, ArrayView2};

/// A georeferenced 2D grid.
///
/// Cells are stored row-major as `(row, col)`. Elevations and derived metrics
/// use `Raster<f64>` with `NaN` as no-data; classification masks use
/// `Raster<bool>` (see [`TerrainMask`](crate::raster::TerrainMask)).
///
/// ```ignore
/// use ridgeline_core::{GeoTransform, Raster};
///
/// let mut slope: Raster<f64> = Raster::filled(100, 100, 0.0);
/// slope.set_transform(GeoTransform::new(500_000.0, 3_000_000.0, 30.0, -30.0));
/// slope.set(10, 20, 4.5)?;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Raster<T> {
    data: Array2<T>,
    transform: GeoTransform,
    crs: Option<CRS>,
}

impl<T: Copy> Raster<T> {
    /// Raster filled with a single value
    pub fn filled(rows: usize, cols: usize, value: T) -> Self {
        Self::from_array(Array2::from_elem((rows, cols), value))
    }

    /// Raster from row-major cell values
    pub fn from_vec(data: Vec<T>, rows: usize, cols: usize) -> Result<Self> {
        if data.len() != rows * cols {
            return Err(Error::InvalidDimensions {
                width: cols,
                height: rows,
            });
        }

        let array = Array2::from_shape_vec((rows, cols), data)
            .map_err(|e| Error::Other(e.to_string()))?;
        Ok(Self::from_array(array))
    }

    pub fn from_array(data: Array2<T>) -> Self {
        Self {
            data,
            transform: GeoTransform::default(),
            crs: None,
        }
    }

    /// New raster on the same grid (transform + CRS) holding `data`
    pub fn with_data<U: Copy>(&self, data: Array2<U>) -> Result<Raster<U>> {
        if data.dim() != self.shape() {
            let (er, ec) = self.shape();
            let (ar, ac) = data.dim();
            return Err(Error::SizeMismatch { er, ec, ar, ac });
        }
        Ok(Raster {
            data,
            transform: self.transform,
            crs: self.crs.clone(),
        })
    }

    /// Cell-wise map onto a raster sharing this grid
    pub fn map<U: Copy>(&self, f: impl Fn(T) -> U) -> Raster<U> {
        Raster {
            data: self.data.mapv(f),
            transform: self.transform,
            crs: self.crs.clone(),
        }
    }

    pub fn rows(&self) -> usize {
        self.data.nrows()
    }

    pub fn cols(&self) -> usize {
        self.data.ncols()
    }

    /// Dimensions as (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        self.data.dim()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Fails with `SizeMismatch` unless `other` has the same dimensions
    pub fn ensure_same_shape<U>(&self, other: &Raster<U>) -> Result<()> {
        let (er, ec) = self.shape();
        let (ar, ac) = other.data.dim();
        if (er, ec) != (ar, ac) {
            return Err(Error::SizeMismatch { er, ec, ar, ac });
        }
        Ok(())
    }

    pub fn get(&self, row: usize, col: usize) -> Result<T> {
        self.data
            .get((row, col))
            .copied()
            .ok_or(Error::InvalidParameter {
                name: "index",
                value: format!("({}, {})", row, col),
                reason: format!("outside raster of size {:?}", self.shape()),
            })
    }

    pub fn set(&mut self, row: usize, col: usize, value: T) -> Result<()> {
        let shape = self.shape();
        match self.data.get_mut((row, col)) {
            Some(cell) => {
                *cell = value;
                Ok(())
            }
            None => Err(Error::InvalidParameter {
                name: "index",
                value: format!("({}, {})", row, col),
                reason: format!("outside raster of size {:?}", shape),
            }),
        }
    }

    pub fn view(&self) -> ArrayView2<'_, T> {
        self.data.view()
    }

    pub fn data(&self) -> &Array2<T> {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut Array2<T> {
        &mut self.data
    }

    pub fn into_array(self) -> Array2<T> {
        self.data
    }

    pub fn transform(&self) -> &GeoTransform {
        &self.transform
    }

    pub fn set_transform(&mut self, transform: GeoTransform) {
        self.transform = transform;
    }

    pub fn crs(&self) -> Option<&CRS> {
        self.crs.as_ref()
    }

    pub fn set_crs(&mut self, crs: Option<CRS>) {
        self.crs = crs;
    }

    /// Projected bounds (min_x, min_y, max_x, max_y)
    pub fn bounds(&self) -> (f64, f64, f64, f64) {
        self.transform.bounds(self.cols(), self.rows())
    }

    /// Projected coordinates of a cell centre
    pub fn pixel_to_geo(&self, col: usize, row: usize) -> (f64, f64) {
        self.transform.pixel_to_geo(col, row)
    }
}
