//! Slope in degrees from an elevation grid
//!
//! Partial derivatives use second-order central differences in the interior
//! and first-order one-sided differences along the border, so every finite
//! cell gets a slope (no edge ring of no-data).

use crate::maybe_rayon::*;
use ndarray::Array2;
use ridgeline_core::raster::{ElevationGrid, Raster};
use ridgeline_core::{Algorithm, Error, Result};

/// Slope algorithm
#[derive(Debug, Clone, Default)]
pub struct Slope;

impl Algorithm for Slope {
    type Input = ElevationGrid;
    type Output = Raster<f64>;
    type Params = ();
    type Error = Error;

    fn name(&self) -> &'static str {
        "Slope"
    }

    fn description(&self) -> &'static str {
        "Slope in degrees from central-difference elevation gradients"
    }

    fn execute(&self, input: Self::Input, _params: Self::Params) -> Result<Self::Output> {
        slope_degrees(&input)
    }
}

/// Calculate slope in degrees.
///
/// ```text
/// dz/dx = (z[c+1] - z[c-1]) / (2 * pixel)     interior
/// dz/dx = (z[1] - z[0]) / pixel               first column (mirrored at the last)
/// slope = atan(sqrt(dz/dx² + dz/dy²))
/// ```
///
/// No-data cells are filled with the finite mean before differencing and set
/// back to NaN in the output.
pub fn slope_degrees(grid: &ElevationGrid) -> Result<Raster<f64>> {
    let stats = grid.require_finite()?;
    let (rows, cols) = grid.shape();
    let pixel = grid.pixel_size_m();
    let source = grid.data();
    let z = grid.filled(stats.mean);

    let output_data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![f64::NAN; cols];

            for (col, out) in row_data.iter_mut().enumerate() {
                if !source[(row, col)].is_finite() {
                    continue;
                }

                let dz_dx = axis_gradient(cols, col, pixel, |c| z[(row, c)]);
                let dz_dy = axis_gradient(rows, row, pixel, |r| z[(r, col)]);

                *out = dz_dx.hypot(dz_dy).atan().to_degrees();
            }

            row_data
        })
        .collect();

    let data = Array2::from_shape_vec((rows, cols), output_data)
        .map_err(|e| Error::Other(e.to_string()))?;
    grid.raster().with_data(data)
}

/// Derivative along one axis at index `i` of a line of length `n`
fn axis_gradient(n: usize, i: usize, spacing: f64, at: impl Fn(usize) -> f64) -> f64 {
    if n < 2 {
        0.0
    } else if i == 0 {
        (at(1) - at(0)) / spacing
    } else if i == n - 1 {
        (at(n - 1) - at(n - 2)) / spacing
    } else {
        (at(i + 1) - at(i - 1)) / (2.0 * spacing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ridgeline_core::{GeoTransform, CRS};

    fn make_grid(data: Array2<f64>, pixel: f64) -> ElevationGrid {
        ElevationGrid::new(
            data,
            GeoTransform::new(0.0, 0.0, pixel, -pixel),
            CRS::from_epsg(32643),
        )
        .unwrap()
    }

    #[test]
    fn test_slope_flat() {
        let grid = make_grid(Array2::from_elem((10, 10), 250.0), 30.0);
        let result = slope_degrees(&grid).unwrap();
        assert!(result.data().iter().all(|&v| v.abs() < 1e-12));
    }

    #[test]
    fn test_slope_uniform_ramp_including_edges() {
        // Rise of tan(5°) * 30 m per column
        let rise = 5.0_f64.to_radians().tan() * 30.0;
        let grid = make_grid(
            Array2::from_shape_fn((8, 12), |(_, c)| 100.0 + c as f64 * rise),
            30.0,
        );
        let result = slope_degrees(&grid).unwrap();

        for &v in result.data().iter() {
            assert_relative_eq!(v, 5.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_slope_diagonal_plane() {
        // z = x + y with 1 m pixels: |grad| = sqrt(2)
        let grid = make_grid(Array2::from_shape_fn((6, 6), |(r, c)| (r + c) as f64), 1.0);
        let result = slope_degrees(&grid).unwrap();
        assert_relative_eq!(
            result.get(3, 3).unwrap(),
            2.0_f64.sqrt().atan().to_degrees(),
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_nodata_stays_nodata() {
        let mut data = Array2::from_elem((5, 5), 10.0);
        data[(2, 2)] = f64::NAN;
        let result = slope_degrees(&make_grid(data, 10.0)).unwrap();
        assert!(result.get(2, 2).unwrap().is_nan());
        assert_relative_eq!(result.get(0, 0).unwrap(), 0.0);
    }

    #[test]
    fn test_all_nodata_is_error() {
        let grid = make_grid(Array2::from_elem((3, 3), f64::NAN), 10.0);
        assert!(matches!(slope_degrees(&grid), Err(Error::NoFiniteData)));
    }
}
