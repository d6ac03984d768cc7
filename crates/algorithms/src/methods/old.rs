//! Slope-based OLD delineation

use crate::classify::{self, Exclusion, ThresholdOp};
use crate::config::OldParams;
use crate::polygonize::mask_to_multipolygon;
use crate::terrain::slope_degrees;
use ridgeline_core::raster::ElevationGrid;
use ridgeline_core::vector::{Layer, LayerTag};
use ridgeline_core::{Algorithm, Error, Result};

/// OLD delineation as an [`Algorithm`]; input is the grid and its exclusion mask
#[derive(Debug, Clone, Default)]
pub struct OldDelineation;

impl Algorithm for OldDelineation {
    type Input = (ElevationGrid, Exclusion);
    type Output = Layer;
    type Params = OldParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "OldDelineation"
    }

    fn description(&self) -> &'static str {
        "Slope threshold with gap bridging and foothill buffer"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        let (grid, exclusion) = input;
        compute_old_delineation(&grid, &exclusion, &params)
    }
}

/// Cells steeper than the slope threshold, minus exclusions, with gaps
/// bridged and a foothill buffer, as one dissolved layer.
///
/// No qualifying cells is not an error: the layer comes back empty.
pub fn compute_old_delineation(
    grid: &ElevationGrid,
    exclusion: &Exclusion,
    params: &OldParams,
) -> Result<Layer> {
    params.validate()?;
    grid.require_finite()?;
    let crs = grid.crs().clone();
    let pixel = grid.pixel_size_m();

    tracing::info!(
        "OLD: slope > {}°, gap bridge {} m, foothill buffer {} m",
        params.slope_threshold_deg,
        params.gap_bridge_m,
        params.foothill_buffer_m
    );

    let slope = slope_degrees(grid)?;
    let steep = classify::threshold(&slope, grid, ThresholdOp::Greater, params.slope_threshold_deg)?;
    let steep = classify::exclude(steep, exclusion)?;

    if steep.is_all_false() {
        tracing::warn!("OLD: no cells exceed {}° of slope", params.slope_threshold_deg);
        return Ok(Layer::empty(LayerTag::Old, crs));
    }
    tracing::info!("OLD: {} steep cells", steep.count_true());

    let bridged = classify::morphological_close(&steep, params.gap_bridge_m, pixel)?;
    let buffered = classify::dilate(&bridged, params.foothill_buffer_m, pixel)?;

    let geometry = mask_to_multipolygon(&buffered);
    if geometry.0.is_empty() {
        tracing::warn!("OLD: polygonization produced no valid polygons");
        return Ok(Layer::empty(LayerTag::Old, crs));
    }

    tracing::info!("OLD: {} polygon parts", geometry.0.len());
    Ok(Layer::new(LayerTag::Old, crs, geometry))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use geo::Area;
    use ndarray::Array2;
    use ridgeline_core::{GeoTransform, CRS};

    fn grid(data: Array2<f64>) -> ElevationGrid {
        ElevationGrid::new(
            data,
            GeoTransform::new(0.0, 0.0, 30.0, -30.0),
            CRS::from_epsg(32643),
        )
        .unwrap()
    }

    fn ramp(rows: usize, cols: usize, degrees: f64) -> ElevationGrid {
        let rise = degrees.to_radians().tan() * 30.0;
        grid(Array2::from_shape_fn((rows, cols), |(_, c)| c as f64 * rise))
    }

    #[test]
    fn test_flat_grid_gives_empty_layer() {
        let layer = compute_old_delineation(
            &grid(Array2::from_elem((20, 20), 300.0)),
            &Exclusion::Absent,
            &OldParams::default(),
        )
        .unwrap();
        assert!(layer.is_empty());
        assert_eq!(layer.tag, LayerTag::Old);
    }

    #[test]
    fn test_ramp_without_morphology_covers_grid() {
        let params = OldParams {
            foothill_buffer_m: 0.0,
            gap_bridge_m: 0.0,
            ..Default::default()
        };
        let layer = compute_old_delineation(&ramp(20, 20, 5.0), &Exclusion::Absent, &params).unwrap();
        assert_eq!(layer.part_count(), 1);
        assert_relative_eq!(layer.geometry.unsigned_area(), 600.0 * 600.0, epsilon = 1e-6);
    }

    #[test]
    fn test_full_exclusion_gives_empty_layer() {
        let dem = ramp(10, 10, 5.0);
        let everything = dem.finite_mask();
        let layer = compute_old_delineation(
            &dem,
            &Exclusion::Computed(everything),
            &OldParams::default(),
        )
        .unwrap();
        assert!(layer.is_empty());
    }

    #[test]
    fn test_all_nodata_is_an_error() {
        let result = compute_old_delineation(
            &grid(Array2::from_elem((5, 5), f64::NAN)),
            &Exclusion::Absent,
            &OldParams::default(),
        );
        assert!(matches!(result, Err(Error::NoFiniteData)));
    }

    #[test]
    fn test_algorithm_trait() {
        let layer = OldDelineation
            .execute_default((ramp(40, 40, 5.0), Exclusion::Absent))
            .unwrap();
        assert!(!layer.is_empty());
        assert_eq!(OldDelineation.name(), "OldDelineation");
    }
}
