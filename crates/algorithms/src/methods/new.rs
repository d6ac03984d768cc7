//! Relief-based NEW delineation

use crate::classify::{self, ThresholdOp};
use crate::config::{NewMethod, NewParams};
use crate::contour::{closed_contours, enclosing_footprints, ClosedContour, HillFootprint};
use crate::polygonize::{dissolve, mask_to_multipolygon};
use crate::terrain::{detect_peaks, local_relief};
use crate::vector::cluster_by_proximity;
use ridgeline_core::raster::ElevationGrid;
use ridgeline_core::vector::{Layer, LayerTag, PolygonFeature};
use ridgeline_core::{Algorithm, Error, Result};
use std::collections::BTreeMap;

/// NEW delineation as an [`Algorithm`]
#[derive(Debug, Clone, Default)]
pub struct NewDelineation;

impl Algorithm for NewDelineation {
    type Input = ElevationGrid;
    type Output = Layer;
    type Params = NewParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "NewDelineation"
    }

    fn description(&self) -> &'static str {
        "Local relief threshold with proximity clustering"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        compute_new_delineation(&input, &params)
    }
}

/// Land with at least `relief_threshold_m` of local relief.
///
/// The contour method falls back to the relief method when tracing fails or
/// finds no closed contour; the returned layer's tag says which one ran.
pub fn compute_new_delineation(grid: &ElevationGrid, params: &NewParams) -> Result<Layer> {
    params.validate()?;
    grid.require_finite()?;

    match params.method {
        NewMethod::Relief => relief_method(grid, params),
        NewMethod::Contour => match closed_contours(grid, params.contour_interval_m) {
            Ok(contours) if !contours.is_empty() => contour_method(grid, &contours, params),
            Ok(_) => {
                tracing::warn!("NEW: no closed contours found; falling back to the relief method");
                relief_method(grid, params)
            }
            Err(e) => {
                tracing::warn!("NEW: contour tracing failed ({e}); falling back to the relief method");
                relief_method(grid, params)
            }
        },
    }
}

fn relief_method(grid: &ElevationGrid, params: &NewParams) -> Result<Layer> {
    let crs = grid.crs().clone();
    tracing::info!(
        "NEW (relief): relief >= {} m within {} m",
        params.relief_threshold_m,
        params.relief_radius_m
    );

    let relief = local_relief(grid, params.relief_radius_m)?;
    let mask = classify::threshold(&relief, grid, ThresholdOp::GreaterOrEqual, params.relief_threshold_m)?;
    if mask.is_all_false() {
        tracing::warn!("NEW (relief): no cells reach {} m of relief", params.relief_threshold_m);
        return Ok(Layer::empty(LayerTag::NewRelief, crs));
    }

    let geometry = cluster_by_proximity(
        &mask_to_multipolygon(&mask),
        params.proximity_for(NewMethod::Relief),
    );
    if geometry.0.is_empty() {
        tracing::warn!("NEW (relief): polygonization produced no valid polygons");
        return Ok(Layer::empty(LayerTag::NewRelief, crs));
    }

    tracing::info!("NEW (relief): {} landform parts", geometry.0.len());
    Ok(Layer::new(LayerTag::NewRelief, crs, geometry))
}

fn contour_method(
    grid: &ElevationGrid,
    contours: &[ClosedContour],
    params: &NewParams,
) -> Result<Layer> {
    let crs = grid.crs().clone();
    let peaks = detect_peaks(grid)?;
    tracing::info!(
        "NEW (contour): {} closed contours, {} peaks",
        contours.len(),
        peaks.len()
    );

    // One footprint per enclosing contour, attributed to its highest peak
    let mut by_contour: BTreeMap<usize, HillFootprint> = BTreeMap::new();
    for footprint in enclosing_footprints(&peaks, contours, params.relief_threshold_m) {
        match by_contour.get(&footprint.contour) {
            Some(kept) if kept.peak.elevation >= footprint.peak.elevation => {}
            _ => {
                by_contour.insert(footprint.contour, footprint);
            }
        }
    }

    if by_contour.is_empty() {
        tracing::warn!(
            "NEW (contour): no peak rises {} m above its enclosing contour",
            params.relief_threshold_m
        );
        return Ok(Layer::empty(LayerTag::NewContour, crs));
    }

    let features: Vec<PolygonFeature> = by_contour
        .into_values()
        .map(|f| PolygonFeature {
            attributes: Some(f.attributes()),
            geometry: f.polygon,
        })
        .collect();

    let dissolved = dissolve(features.iter().map(|f| f.geometry.clone()));
    let geometry = cluster_by_proximity(&dissolved, params.proximity_for(NewMethod::Contour));
    if geometry.0.is_empty() {
        tracing::warn!("NEW (contour): hill footprints did not survive repair");
        return Ok(Layer::empty(LayerTag::NewContour, crs));
    }

    tracing::info!(
        "NEW (contour): {} hills in {} landform parts",
        features.len(),
        geometry.0.len()
    );
    Ok(Layer::new(LayerTag::NewContour, crs, geometry).with_features(features))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;
    use ridgeline_core::{GeoTransform, CRS};

    fn grid(data: Array2<f64>, pixel: f64) -> ElevationGrid {
        ElevationGrid::new(
            data,
            GeoTransform::new(0.0, 0.0, pixel, -pixel),
            CRS::from_epsg(32643),
        )
        .unwrap()
    }

    /// Cone of height 150 on a 100.5 m plain, peak at the centre
    fn cone() -> ElevationGrid {
        grid(
            Array2::from_shape_fn((41, 41), |(r, c)| {
                let d = ((r as f64 - 20.0).powi(2) + (c as f64 - 20.0).powi(2)).sqrt();
                100.5 + 10.0 * (15.0 - d).max(0.0)
            }),
            10.0,
        )
    }

    #[test]
    fn test_flat_grid_gives_empty_layer() {
        let flat = grid(Array2::from_elem((30, 30), 500.0), 30.0);
        let layer = compute_new_delineation(&flat, &NewParams::default()).unwrap();
        assert!(layer.is_empty());
        assert_eq!(layer.tag, LayerTag::NewRelief);
    }

    #[test]
    fn test_relief_method_on_cone() {
        let layer = compute_new_delineation(&cone(), &NewParams::default()).unwrap();
        assert_eq!(layer.tag, LayerTag::NewRelief);
        assert_eq!(layer.part_count(), 1);
        assert!(layer.features.is_empty());
    }

    #[test]
    fn test_contour_method_on_cone() {
        let params = NewParams {
            method: NewMethod::Contour,
            ..Default::default()
        };
        let layer = compute_new_delineation(&cone(), &params).unwrap();
        assert_eq!(layer.tag, LayerTag::NewContour);
        assert_eq!(layer.features.len(), 1);

        let attrs = layer.features[0].attributes.unwrap();
        assert_eq!(attrs.peak_elev, 250.5);
        assert_eq!(attrs.base_elev, 110.0);
        assert!((attrs.relief - 140.5).abs() < 1e-9);
    }

    #[test]
    fn test_contour_method_falls_back_without_closed_contours() {
        let rise = 30f64.to_radians().tan() * 30.0;
        let ramp = grid(Array2::from_shape_fn((20, 20), |(_, c)| c as f64 * rise), 30.0);
        let params = NewParams {
            method: NewMethod::Contour,
            ..Default::default()
        };

        let layer = compute_new_delineation(&ramp, &params).unwrap();
        assert_eq!(layer.tag, LayerTag::NewRelief);
        assert!(!layer.is_empty());
    }

    #[test]
    fn test_contour_layer_clusters_with_its_own_distance() {
        // Two cones 360 m apart; their 110 m rings leave an 80 m gap
        let twins = grid(
            Array2::from_shape_fn((41, 77), |(r, c)| {
                let d = |cc: f64| ((r as f64 - 20.0).powi(2) + (c as f64 - cc).powi(2)).sqrt();
                100.5 + (10.0 * (15.0 - d(20.0)).max(0.0)).max(9.0 * (15.0 - d(56.0)).max(0.0))
            }),
            10.0,
        );

        let apart = NewParams {
            method: NewMethod::Contour,
            contour_proximity_m: 0.0,
            relief_proximity_m: 1000.0,
            ..Default::default()
        };
        let layer = compute_new_delineation(&twins, &apart).unwrap();
        assert_eq!(layer.tag, LayerTag::NewContour);
        assert_eq!(layer.features.len(), 2);
        assert_eq!(layer.part_count(), 2);

        let joined = NewParams {
            method: NewMethod::Contour,
            ..Default::default()
        };
        let layer = compute_new_delineation(&twins, &joined).unwrap();
        assert_eq!(layer.part_count(), 1);
    }

    #[test]
    fn test_invalid_params_rejected() {
        let params = NewParams {
            relief_radius_m: -1.0,
            ..Default::default()
        };
        let result = compute_new_delineation(&cone(), &params);
        assert!(matches!(result, Err(Error::Configuration(_))));
    }
}
