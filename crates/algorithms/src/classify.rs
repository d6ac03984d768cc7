//! Raster classification: threshold, exclusion and gap/buffer morphology
//!
//! Turns a metric grid into a [`TerrainMask`] and conditions it before
//! polygonization. Distances are converted to iteration counts of the
//! 4-connected cross element.

use crate::morphology::{self, StructuringElement};
use ridgeline_core::raster::{ElevationGrid, Raster, TerrainMask};
use ridgeline_core::Result;

/// Comparison applied against the threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThresholdOp {
    /// metric > value (slope)
    Greater,
    /// metric >= value (relief)
    GreaterOrEqual,
}

impl ThresholdOp {
    fn test(self, metric: f64, value: f64) -> bool {
        match self {
            ThresholdOp::Greater => metric > value,
            ThresholdOp::GreaterOrEqual => metric >= value,
        }
    }
}

/// Optional mask of areas to remove from the classification (urban land).
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Exclusion {
    /// No exclusion data was obtained
    #[default]
    Absent,
    /// Mask aligned with the elevation grid; true cells are removed
    Computed(TerrainMask),
}

impl Exclusion {
    pub fn is_absent(&self) -> bool {
        matches!(self, Exclusion::Absent)
    }
}

/// Cells where `metric op value` holds and the source elevation is finite.
pub fn threshold(
    metric: &Raster<f64>,
    grid: &ElevationGrid,
    op: ThresholdOp,
    value: f64,
) -> Result<TerrainMask> {
    metric.ensure_same_shape(grid.raster())?;

    let mut mask = metric.map(|m| m.is_finite() && op.test(m, value));
    mask.and(&grid.finite_mask())?;
    Ok(mask)
}

/// Remove excluded cells from `mask`.
pub fn exclude(mask: TerrainMask, exclusion: &Exclusion) -> Result<TerrainMask> {
    match exclusion {
        Exclusion::Absent => {
            tracing::info!("No exclusion mask available; classification left unmasked");
            Ok(mask)
        }
        Exclusion::Computed(excluded) => {
            let mut mask = mask;
            let before = mask.count_true();
            mask.and_not(excluded)?;
            tracing::info!("Excluded {} cells", before - mask.count_true());
            Ok(mask)
        }
    }
}

/// Closing iterations for bridging gaps up to `radius_m`: `ceil(radius / pixel / 2)`
pub fn gap_bridge_iterations(radius_m: f64, pixel_size: f64) -> usize {
    distance_to_iterations(radius_m / pixel_size / 2.0)
}

/// Dilation iterations for a `radius_m` buffer: `ceil(radius / pixel)`
pub fn buffer_iterations(radius_m: f64, pixel_size: f64) -> usize {
    distance_to_iterations(radius_m / pixel_size)
}

fn distance_to_iterations(steps: f64) -> usize {
    if steps.is_finite() && steps > 0.0 {
        steps.ceil() as usize
    } else {
        0
    }
}

/// Bridge gaps narrower than about `radius_m` with a cross-element closing.
pub fn morphological_close(
    mask: &TerrainMask,
    radius_m: f64,
    pixel_size: f64,
) -> Result<TerrainMask> {
    let iterations = gap_bridge_iterations(radius_m, pixel_size);
    tracing::debug!("Closing with {} iterations", iterations);
    morphology::closing(mask, StructuringElement::Cross, iterations)
}

/// Grow the mask outward by about `radius_m` with a cross-element dilation.
pub fn dilate(mask: &TerrainMask, radius_m: f64, pixel_size: f64) -> Result<TerrainMask> {
    let iterations = buffer_iterations(radius_m, pixel_size);
    tracing::debug!("Dilating with {} iterations", iterations);
    morphology::dilate(mask, StructuringElement::Cross, iterations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;
    use ridgeline_core::{Error, GeoTransform, CRS};

    fn grid(data: Array2<f64>) -> ElevationGrid {
        ElevationGrid::new(
            data,
            GeoTransform::new(0.0, 0.0, 30.0, -30.0),
            CRS::from_epsg(32643),
        )
        .unwrap()
    }

    #[test]
    fn test_iteration_counts() {
        assert_eq!(gap_bridge_iterations(500.0, 30.0), 9);
        assert_eq!(buffer_iterations(100.0, 30.0), 4);
        assert_eq!(buffer_iterations(90.0, 30.0), 3);
        assert_eq!(gap_bridge_iterations(0.0, 30.0), 0);
        assert_eq!(buffer_iterations(-5.0, 30.0), 0);
    }

    #[test]
    fn test_threshold_ops_and_nodata() {
        let mut data = Array2::from_elem((2, 2), 10.0);
        data[(1, 1)] = f64::NAN;
        let g = grid(data);
        let metric = g.raster().with_data(ndarray::array![[3.0, 2.0], [4.0, 5.0]]).unwrap();

        let gt = threshold(&metric, &g, ThresholdOp::Greater, 3.0).unwrap();
        assert_eq!(gt.count_true(), 1);
        assert!(gt.get(1, 0).unwrap());

        let ge = threshold(&metric, &g, ThresholdOp::GreaterOrEqual, 3.0).unwrap();
        assert_eq!(ge.count_true(), 2);
        // (1, 1) passes the metric test but has no elevation
        assert!(!ge.get(1, 1).unwrap());
    }

    #[test]
    fn test_threshold_shape_mismatch() {
        let g = grid(Array2::from_elem((2, 2), 10.0));
        let metric = Raster::filled(3, 2, 1.0);
        assert!(matches!(
            threshold(&metric, &g, ThresholdOp::Greater, 0.5),
            Err(Error::SizeMismatch { .. })
        ));
    }

    #[test]
    fn test_exclude() {
        let mask = TerrainMask::filled(3, 3, true);
        assert_eq!(exclude(mask.clone(), &Exclusion::Absent).unwrap(), mask);

        let mut urban = TerrainMask::filled(3, 3, false);
        urban.set(1, 1, true).unwrap();
        let result = exclude(mask, &Exclusion::Computed(urban)).unwrap();
        assert_eq!(result.count_true(), 8);

        let wrong = Exclusion::Computed(TerrainMask::filled(2, 2, true));
        assert!(exclude(TerrainMask::filled(3, 3, true), &wrong).is_err());
    }
}
