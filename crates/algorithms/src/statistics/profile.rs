//! Elevation profiles along straight transects

use super::elevation::ElevationSummary;
use geo::Point;
use ridgeline_core::raster::ElevationGrid;
use ridgeline_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// One sample of a transect
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProfileSample {
    /// Distance from the start in metres
    pub distance_m: f64,
    pub x: f64,
    pub y: f64,
    /// Nearest-cell elevation; NaN outside the grid or on no-data
    pub elevation: f64,
}

/// Elevations sampled along a transect
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElevationProfile {
    pub length_m: f64,
    pub samples: Vec<ProfileSample>,
    /// `None` when every sample fell on no-data
    pub summary: Option<ElevationSummary>,
}

/// Sample `grid` every `step_m` from `start` to `end` (projected coordinates
/// in the grid CRS), endpoints included.
pub fn elevation_profile(
    grid: &ElevationGrid,
    start: Point<f64>,
    end: Point<f64>,
    step_m: f64,
) -> Result<ElevationProfile> {
    if !step_m.is_finite() || step_m <= 0.0 {
        return Err(Error::invalid_parameter("step_m", step_m, "profile step must be positive"));
    }

    let (dx, dy) = (end.x() - start.x(), end.y() - start.y());
    let length_m = dx.hypot(dy);
    let n = (length_m / step_m).floor() as usize + 1;
    let transform = grid.transform();
    let (rows, cols) = grid.shape();

    let samples: Vec<ProfileSample> = (0..n)
        .map(|i| {
            let t = if n > 1 { i as f64 / (n - 1) as f64 } else { 0.0 };
            let (x, y) = (start.x() + t * dx, start.y() + t * dy);
            let (col, row) = transform.geo_to_pixel(x, y);

            let elevation = if col >= 0.0 && row >= 0.0 && (col as usize) < cols && (row as usize) < rows {
                grid.data()[(row as usize, col as usize)]
            } else {
                f64::NAN
            };

            ProfileSample {
                distance_m: t * length_m,
                x,
                y,
                elevation,
            }
        })
        .collect();

    let summary = ElevationSummary::from_values(samples.iter().map(|s| s.elevation));
    Ok(ElevationProfile {
        length_m,
        samples,
        summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::Array2;
    use ridgeline_core::{GeoTransform, CRS};

    #[test]
    fn test_profile_across_ramp() {
        let grid = ElevationGrid::new(
            Array2::from_shape_fn((10, 10), |(_, c)| c as f64 * 10.0),
            GeoTransform::new(0.0, 100.0, 10.0, -10.0),
            CRS::from_epsg(32643),
        )
        .unwrap();

        let profile =
            elevation_profile(&grid, Point::new(5.0, 50.0), Point::new(95.0, 50.0), 30.0).unwrap();
        assert_relative_eq!(profile.length_m, 90.0);
        assert_eq!(profile.samples.len(), 4);
        assert_relative_eq!(profile.samples[0].elevation, 0.0);
        assert_relative_eq!(profile.samples[3].elevation, 90.0);
        assert_relative_eq!(profile.summary.unwrap().max, 90.0);
    }

    #[test]
    fn test_profile_outside_grid_is_nan() {
        let grid = ElevationGrid::new(
            Array2::from_elem((4, 4), 1.0),
            GeoTransform::new(0.0, 40.0, 10.0, -10.0),
            CRS::from_epsg(32643),
        )
        .unwrap();

        let profile =
            elevation_profile(&grid, Point::new(500.0, 500.0), Point::new(600.0, 500.0), 50.0).unwrap();
        assert!(profile.samples.iter().all(|s| s.elevation.is_nan()));
        assert!(profile.summary.is_none());
        assert!(elevation_profile(&grid, Point::new(0.0, 0.0), Point::new(1.0, 1.0), 0.0).is_err());
    }
}
