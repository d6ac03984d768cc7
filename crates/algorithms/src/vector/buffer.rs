//! Buffer operations
//!
//! Proximity clustering merges landforms separated by less than a distance:
//! grow every part by half the distance, union, then shrink back by the same
//! amount. Parts closer than the distance end up joined by a neck.

use crate::polygonize::dissolve;
use geo::{unary_union, Area, Buffer, LineString, MultiPolygon, Point, Polygon};
use std::f64::consts::PI;

/// Parts at or below this area (m²) left by the inward buffer are discarded
const MIN_PART_AREA_M2: f64 = 1e-6;

/// Polygon approximating a circle with `segments` vertices.
pub fn circle(center: Point<f64>, radius: f64, segments: usize) -> Polygon<f64> {
    let n = segments.max(4);
    let r = radius.abs();

    let coords: Vec<(f64, f64)> = (0..=n)
        .map(|i| {
            let angle = 2.0 * PI * (i % n) as f64 / n as f64;
            (center.x() + r * angle.cos(), center.y() + r * angle.sin())
        })
        .collect();

    Polygon::new(LineString::from(coords), vec![])
}

/// Merge parts closer than `proximity_m` into single footprints.
///
/// A non-positive or non-finite distance returns the geometry unchanged.
pub fn cluster_by_proximity(geometry: &MultiPolygon<f64>, proximity_m: f64) -> MultiPolygon<f64> {
    if !proximity_m.is_finite() || proximity_m <= 0.0 || geometry.0.is_empty() {
        return geometry.clone();
    }

    let half = proximity_m / 2.0;
    let grown = geometry.buffer(half);
    let merged = unary_union(&grown.0);
    let shrunk = merged.buffer(-half);
    let parts: Vec<Polygon<f64>> = shrunk
        .0
        .into_iter()
        .filter(|p| p.unsigned_area() > MIN_PART_AREA_M2)
        .collect();
    let clustered = dissolve(parts);

    tracing::debug!(
        "Proximity clustering at {} m: {} parts -> {} parts",
        proximity_m,
        geometry.0.len(),
        clustered.0.len()
    );
    clustered
}
