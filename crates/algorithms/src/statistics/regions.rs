//! Per-region area comparison table

use super::area::{round_to, total_area_km2};
use crate::vector::clip_to_region;
use ridgeline_core::vector::{Layer, RegionBoundary};
use ridgeline_core::{Result, CRS};
use serde::{Deserialize, Serialize};

/// One row of the district comparison table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionStats {
    #[serde(rename = "District")]
    pub district: String,
    #[serde(rename = "State")]
    pub state: String,
    #[serde(rename = "District_Area_km2")]
    pub district_area_km2: f64,
    #[serde(rename = "OLD_Area_km2")]
    pub old_area_km2: f64,
    #[serde(rename = "NEW_Area_km2")]
    pub new_area_km2: f64,
    #[serde(rename = "Change_km2")]
    pub change_km2: f64,
    #[serde(rename = "Change_pct")]
    pub change_pct: f64,
    #[serde(rename = "OLD_pct_of_District")]
    pub old_pct_of_district: f64,
    #[serde(rename = "NEW_pct_of_District")]
    pub new_pct_of_district: f64,
}

fn percent(part: f64, whole: f64) -> f64 {
    if whole > 0.0 { part / whole * 100.0 } else { 0.0 }
}

/// Clip both layers to each region and tabulate their areas.
///
/// Areas are rounded to 0.01 km² and percentages to 0.1.
pub fn per_region_stats(
    old: &Layer,
    new: &Layer,
    regions: &[RegionBoundary],
    crs: &CRS,
) -> Result<Vec<RegionStats>> {
    regions
        .iter()
        .map(|region| {
            let district = total_area_km2(&region.geometry, crs)?;
            let old_km2 = total_area_km2(&clip_to_region(&old.geometry, &region.geometry), crs)?;
            let new_km2 = total_area_km2(&clip_to_region(&new.geometry, &region.geometry), crs)?;
            let change = new_km2 - old_km2;

            tracing::debug!(
                "{}: OLD {:.2} km², NEW {:.2} km² of {:.2} km²",
                region.name,
                old_km2,
                new_km2,
                district
            );

            Ok(RegionStats {
                district: region.name.clone(),
                state: region.state.clone(),
                district_area_km2: round_to(district, 2),
                old_area_km2: round_to(old_km2, 2),
                new_area_km2: round_to(new_km2, 2),
                change_km2: round_to(change, 2),
                change_pct: round_to(percent(change, old_km2), 1),
                old_pct_of_district: round_to(percent(old_km2, district), 1),
                new_pct_of_district: round_to(percent(new_km2, district), 1),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use geo::{polygon, MultiPolygon};
    use ridgeline_core::vector::LayerTag;

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> MultiPolygon<f64> {
        MultiPolygon::new(vec![polygon![
            (x: x0, y: y0), (x: x1, y: y0), (x: x1, y: y1), (x: x0, y: y1)
        ]])
    }

    #[test]
    fn test_two_districts() {
        let crs = CRS::from_epsg(32643);
        // OLD covers 0..4 km, NEW covers 0..1 km, both 2 km tall
        let old = Layer::new(LayerTag::Old, crs.clone(), rect(0.0, 0.0, 4000.0, 2000.0));
        let new = Layer::new(LayerTag::NewRelief, crs.clone(), rect(0.0, 0.0, 1000.0, 2000.0));
        let regions = vec![
            RegionBoundary::new("West", "Haryana", rect(0.0, 0.0, 2000.0, 2000.0)),
            RegionBoundary::new("East", "Rajasthan", rect(2000.0, 0.0, 6000.0, 2000.0)),
        ];

        let stats = per_region_stats(&old, &new, &regions, &crs).unwrap();
        assert_eq!(stats.len(), 2);

        let west = &stats[0];
        assert_relative_eq!(west.district_area_km2, 4.0);
        assert_relative_eq!(west.old_area_km2, 4.0);
        assert_relative_eq!(west.new_area_km2, 2.0);
        assert_relative_eq!(west.change_pct, -50.0);
        assert_relative_eq!(west.new_pct_of_district, 50.0);

        let east = &stats[1];
        assert_relative_eq!(east.new_area_km2, 0.0);
        assert_relative_eq!(east.change_km2, -4.0);
        assert_relative_eq!(east.old_pct_of_district, 50.0);
    }

    #[test]
    fn test_zero_old_area_gives_zero_change_pct() {
        let crs = CRS::from_epsg(32643);
        let old = Layer::empty(LayerTag::Old, crs.clone());
        let new = Layer::new(LayerTag::NewRelief, crs.clone(), rect(0.0, 0.0, 1000.0, 1000.0));
        let regions = vec![RegionBoundary::new("Only", "Delhi", rect(0.0, 0.0, 1000.0, 1000.0))];

        let stats = per_region_stats(&old, &new, &regions, &crs).unwrap();
        assert_relative_eq!(stats[0].change_pct, 0.0);
        assert_relative_eq!(stats[0].change_km2, 1.0);
    }

    #[test]
    fn test_serialized_column_names() {
        let row = RegionStats {
            district: "Alwar".into(),
            state: "Rajasthan".into(),
            district_area_km2: 1.0,
            old_area_km2: 0.5,
            new_area_km2: 0.25,
            change_km2: -0.25,
            change_pct: -50.0,
            old_pct_of_district: 50.0,
            new_pct_of_district: 25.0,
        };
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["District"], "Alwar");
        assert_eq!(json["NEW_pct_of_District"], 25.0);
    }
}
