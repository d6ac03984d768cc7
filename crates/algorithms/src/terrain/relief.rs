//! Local relief by windowed minimum
//!
//! Relief at a cell is its elevation minus the lowest elevation inside a
//! square window whose side approximates the search radius. This is the
//! fast approximation of "height above the enclosing base".

use super::filters::window_minimum;
use ridgeline_core::raster::{ElevationGrid, Raster};
use ridgeline_core::{Algorithm, Error, Result};

/// Parameters for local relief
#[derive(Debug, Clone)]
pub struct LocalReliefParams {
    /// Search radius in metres
    pub radius_m: f64,
}

impl Default for LocalReliefParams {
    fn default() -> Self {
        Self { radius_m: 2000.0 }
    }
}

/// Local relief algorithm
#[derive(Debug, Clone, Default)]
pub struct LocalRelief;

impl Algorithm for LocalRelief {
    type Input = ElevationGrid;
    type Output = Raster<f64>;
    type Params = LocalReliefParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "LocalRelief"
    }

    fn description(&self) -> &'static str {
        "Elevation above the windowed local minimum"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        local_relief(&input, params.radius_m)
    }
}

/// Odd window side (in pixels, at least 3) covering `radius_m` at `pixel_size`.
///
/// `max(3, floor(radius / pixel))`, bumped to the next odd number.
pub fn relief_window_size(radius_m: f64, pixel_size: f64) -> usize {
    let ratio = radius_m / pixel_size;
    let size = if ratio.is_finite() && ratio > 3.0 {
        ratio.floor() as usize
    } else {
        3
    };
    if size % 2 == 0 { size + 1 } else { size }
}

/// Elevation minus the local minimum over the relief window.
///
/// No-data is filled with the global finite minimum for the filter only and
/// stays NaN in the output.
pub fn local_relief(grid: &ElevationGrid, radius_m: f64) -> Result<Raster<f64>> {
    if !radius_m.is_finite() || radius_m <= 0.0 {
        return Err(Error::invalid_parameter(
            "radius_m",
            radius_m,
            "relief radius must be positive",
        ));
    }

    let stats = grid.require_finite()?;
    let size = relief_window_size(radius_m, grid.pixel_size_m());
    tracing::debug!(
        "Local relief window {}x{} px for radius {} m",
        size,
        size,
        radius_m
    );

    let filled = grid.filled(stats.min);
    let mut relief = window_minimum(&filled, size)?;
    relief.zip_mut_with(grid.data(), |low, &z| {
        *low = if z.is_finite() { z - *low } else { f64::NAN };
    });

    grid.raster().with_data(relief)
}
