//! Planar area measurement

use geo::{Area, MultiPolygon};
use ridgeline_core::vector::Layer;
use ridgeline_core::{Error, Result, CRS};
use serde::{Deserialize, Serialize};

const M2_PER_KM2: f64 = 1.0e6;

/// Round to `decimals` places, the precision of the published tables
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Unsigned planar area in km².
///
/// Refuses geographic CRSs: an area in square degrees is meaningless.
pub fn total_area_km2(geometry: &MultiPolygon<f64>, crs: &CRS) -> Result<f64> {
    if crs.is_geographic() {
        return Err(Error::GeographicCrs(crs.identifier()));
    }
    Ok(geometry.unsigned_area() / M2_PER_KM2)
}

/// Headline comparison of the two layers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub old_km2: f64,
    pub new_km2: f64,
    pub change_km2: f64,
    /// Percent change from OLD to NEW; 0 when OLD is empty
    pub change_pct: f64,
}

impl AnalysisSummary {
    pub fn from_layers(old: &Layer, new: &Layer) -> Result<Self> {
        let old_km2 = total_area_km2(&old.geometry, &old.crs)?;
        let new_km2 = total_area_km2(&new.geometry, &new.crs)?;
        let change_km2 = new_km2 - old_km2;
        let change_pct = if old_km2 > 0.0 {
            change_km2 / old_km2 * 100.0
        } else {
            0.0
        };

        Ok(Self {
            old_km2: round_to(old_km2, 2),
            new_km2: round_to(new_km2, 2),
            change_km2: round_to(change_km2, 2),
            change_pct: round_to(change_pct, 1),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use geo::polygon;
    use ridgeline_core::vector::LayerTag;

    fn square_km(side_km: f64) -> MultiPolygon<f64> {
        let s = side_km * 1000.0;
        MultiPolygon::new(vec![polygon![
            (x: 0.0, y: 0.0), (x: s, y: 0.0), (x: s, y: s), (x: 0.0, y: s)
        ]])
    }

    #[test]
    fn test_area_km2() {
        let area = total_area_km2(&square_km(2.0), &CRS::from_epsg(32643)).unwrap();
        assert_relative_eq!(area, 4.0);
    }

    #[test]
    fn test_geographic_area_refused() {
        assert!(matches!(
            total_area_km2(&square_km(1.0), &CRS::wgs84()),
            Err(Error::GeographicCrs(_))
        ));
    }

    #[test]
    fn test_summary_change() {
        let crs = CRS::from_epsg(32643);
        let old = Layer::new(LayerTag::Old, crs.clone(), square_km(2.0));
        let new = Layer::new(LayerTag::NewRelief, crs.clone(), square_km(1.0));
        let summary = AnalysisSummary::from_layers(&old, &new).unwrap();
        assert_relative_eq!(summary.change_km2, -3.0);
        assert_relative_eq!(summary.change_pct, -75.0);

        let empty = Layer::empty(LayerTag::Old, crs);
        let summary = AnalysisSummary::from_layers(&empty, &new).unwrap();
        assert_relative_eq!(summary.change_pct, 0.0);
    }

    #[test]
    fn test_round_to() {
        assert_relative_eq!(round_to(1.23456, 2), 1.23);
        assert_relative_eq!(round_to(-12.345, 1), -12.3);
    }
}
