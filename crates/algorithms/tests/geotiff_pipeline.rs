//! End-to-end run from a GeoTIFF on disk through both delineations.

use geo::polygon;
use ndarray::Array2;
use ridgeline_algorithms::classify::Exclusion;
use ridgeline_algorithms::config::{AnalysisConfig, NewMethod};
use ridgeline_algorithms::pipeline::run_analysis;
use ridgeline_core::source::{write_geotiff, Bounds, DemSource, GeoTiffDem};
use ridgeline_core::vector::{LayerTag, RegionBoundary};
use ridgeline_core::{ElevationGrid, GeoTransform, CRS};

const ORIGIN_X: f64 = 720_000.0;
const ORIGIN_Y: f64 = 3_140_000.0;

/// Two 240 m cones 1.8 km apart on a 30 m grid
fn twin_hills() -> ElevationGrid {
    let data = Array2::from_shape_fn((60, 120), |(r, c)| {
        let cone = |cr: f64, cc: f64| {
            let d = ((r as f64 - cr).powi(2) + (c as f64 - cc).powi(2)).sqrt();
            (12.0 - d).max(0.0) * 20.0
        };
        250.5 + cone(30.0, 30.0).max(cone(30.0, 90.0))
    });
    ElevationGrid::new(
        data,
        GeoTransform::new(ORIGIN_X, ORIGIN_Y, 30.0, -30.0),
        CRS::from_epsg(32643),
    )
    .unwrap()
}

fn districts() -> Vec<RegionBoundary> {
    let (x0, y0) = (ORIGIN_X, ORIGIN_Y - 1800.0);
    vec![
        RegionBoundary::new(
            "West",
            "Haryana",
            polygon![(x: x0, y: y0), (x: x0 + 1800.0, y: y0), (x: x0 + 1800.0, y: y0 + 1800.0), (x: x0, y: y0 + 1800.0)],
        ),
        RegionBoundary::new(
            "East",
            "Rajasthan",
            polygon![(x: x0 + 1800.0, y: y0), (x: x0 + 3600.0, y: y0), (x: x0 + 3600.0, y: y0 + 1800.0), (x: x0 + 1800.0, y: y0 + 1800.0)],
        ),
    ]
}

fn load(path: &std::path::Path) -> ElevationGrid {
    let bounds = Bounds::new(ORIGIN_X, ORIGIN_Y - 1800.0, ORIGIN_X + 3600.0, ORIGIN_Y);
    GeoTiffDem::new(path)
        .unwrap()
        .load_for_region(bounds, &CRS::from_epsg(32643), 0.0)
        .unwrap()
}

#[test]
fn geotiff_run_with_relief_method() {
    let tmp = tempfile::NamedTempFile::with_suffix(".tif").unwrap();
    write_geotiff(&twin_hills(), tmp.path()).unwrap();
    let dem = load(tmp.path());
    assert_eq!(dem.shape(), (60, 120));

    let outcome =
        run_analysis(&dem, &Exclusion::Absent, &districts(), &AnalysisConfig::default()).unwrap();

    assert_eq!(outcome.metadata.new_layer, LayerTag::NewRelief);
    assert_eq!(outcome.regions.len(), 2);
    for row in &outcome.regions {
        assert!(row.old_area_km2 > 0.0, "{} has no OLD area", row.district);
        assert!(row.new_area_km2 > 0.0, "{} has no NEW area", row.district);
        assert!(row.new_area_km2 <= row.district_area_km2);
    }

    // The cones are 1.8 km apart, beyond the 500 m clustering distance
    assert_eq!(outcome.new.part_count(), 2);
    assert_eq!(outcome.distances.len(), 2);
    let summary = outcome.distance_summary.unwrap();
    assert!(summary.min_m > 500.0 && summary.max_m < 1800.0);

    // OLD (slope + 100 m buffer) is wider than NEW (top 140 m of each cone)
    assert!(outcome.summary.old_km2 > outcome.summary.new_km2);
    assert!(outcome.summary.change_pct < 0.0);
}

#[test]
fn geotiff_run_with_contour_method() {
    let tmp = tempfile::NamedTempFile::with_suffix(".tif").unwrap();
    write_geotiff(&twin_hills(), tmp.path()).unwrap();
    let dem = load(tmp.path());

    let mut config = AnalysisConfig::default();
    config.new.method = NewMethod::Contour;
    let outcome = run_analysis(&dem, &Exclusion::Absent, &districts(), &config).unwrap();

    assert_eq!(outcome.metadata.new_layer, LayerTag::NewContour);
    assert_eq!(outcome.new.features.len(), 2);
    for feature in &outcome.new.features {
        let attrs = feature.attributes.unwrap();
        assert_eq!(attrs.peak_elev, 490.5);
        assert_eq!(attrs.base_elev, 260.0);
        assert!((attrs.relief - 230.5).abs() < 1e-9);
    }

    let json = serde_json::to_string(&outcome.report()).unwrap();
    assert!(json.contains("NEW_2025_contour"));
    assert!(json.contains("\"District\":\"West\""));
}
