//! Clipping layers to region boundaries

use geo::{BooleanOps, MultiPolygon, Polygon};

/// Part of `geometry` inside `region`
pub fn clip_to_region(geometry: &MultiPolygon<f64>, region: &MultiPolygon<f64>) -> MultiPolygon<f64> {
    if geometry.0.is_empty() || region.0.is_empty() {
        return MultiPolygon::new(Vec::new());
    }
    geometry.intersection(region)
}

/// Individual polygons of a multipolygon, empty parts skipped
pub fn explode(geometry: &MultiPolygon<f64>) -> Vec<Polygon<f64>> {
    geometry
        .0
        .iter()
        .filter(|p| !p.exterior().0.is_empty())
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use geo::{polygon, Area};

    #[test]
    fn test_clip_half_overlap() {
        let layer = MultiPolygon::new(vec![polygon![
            (x: 0.0, y: 0.0), (x: 20.0, y: 0.0), (x: 20.0, y: 10.0), (x: 0.0, y: 10.0)
        ]]);
        let region = MultiPolygon::new(vec![polygon![
            (x: 10.0, y: -5.0), (x: 40.0, y: -5.0), (x: 40.0, y: 15.0), (x: 10.0, y: 15.0)
        ]]);
        assert_relative_eq!(clip_to_region(&layer, &region).unsigned_area(), 100.0, epsilon = 1e-9);
    }

    #[test]
    fn test_clip_empty() {
        let empty = MultiPolygon::new(Vec::new());
        let region = MultiPolygon::new(vec![polygon![
            (x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0)
        ]]);
        assert!(clip_to_region(&empty, &region).0.is_empty());
        assert!(explode(&empty).is_empty());
    }
}
