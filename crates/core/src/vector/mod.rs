//! Vector layers produced by the delineation pipelines

use crate::crs::CRS;
use geo_types::{MultiPolygon, Polygon};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which rule set produced a layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LayerTag {
    /// Slope threshold + gap bridging + foothill buffer
    #[serde(rename = "OLD_FSI_like")]
    Old,
    /// Local relief via windowed minimum filter
    #[serde(rename = "NEW_2025_relief")]
    NewRelief,
    /// Local relief via lowest enclosing closed contour
    #[serde(rename = "NEW_2025_contour")]
    NewContour,
}

impl LayerTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            LayerTag::Old => "OLD_FSI_like",
            LayerTag::NewRelief => "NEW_2025_relief",
            LayerTag::NewContour => "NEW_2025_contour",
        }
    }

    pub fn is_new(&self) -> bool {
        !matches!(self, LayerTag::Old)
    }
}

impl fmt::Display for LayerTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Attributes of a hill footprint found by contour enclosure
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HillAttributes {
    pub peak_elev: f64,
    pub base_elev: f64,
    pub relief: f64,
}

/// One polygon of a layer with its optional hill attributes
#[derive(Debug, Clone, PartialEq)]
pub struct PolygonFeature {
    pub geometry: Polygon<f64>,
    pub attributes: Option<HillAttributes>,
}

/// A tagged delineation layer.
///
/// `geometry` is the dissolved extent used for area statistics; `features`
/// keeps the per-hill footprints when the contour method produced them.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub tag: LayerTag,
    pub crs: CRS,
    pub geometry: MultiPolygon<f64>,
    pub features: Vec<PolygonFeature>,
}

impl Layer {
    pub fn new(tag: LayerTag, crs: CRS, geometry: MultiPolygon<f64>) -> Self {
        Self {
            tag,
            crs,
            geometry,
            features: Vec::new(),
        }
    }

    /// The explicit result of a classification with no qualifying pixels
    pub fn empty(tag: LayerTag, crs: CRS) -> Self {
        Self::new(tag, crs, MultiPolygon::new(Vec::new()))
    }

    pub fn with_features(mut self, features: Vec<PolygonFeature>) -> Self {
        self.features = features;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.geometry.0.is_empty()
    }

    pub fn part_count(&self) -> usize {
        self.geometry.0.len()
    }
}

/// An administrative region (district) used for per-region statistics
#[derive(Debug, Clone, PartialEq)]
pub struct RegionBoundary {
    pub name: String,
    pub state: String,
    pub geometry: MultiPolygon<f64>,
}

impl RegionBoundary {
    pub fn new(
        name: impl Into<String>,
        state: impl Into<String>,
        geometry: impl Into<MultiPolygon<f64>>,
    ) -> Self {
        Self {
            name: name.into(),
            state: state.into(),
            geometry: geometry.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::polygon;

    #[test]
    fn test_empty_layer() {
        let layer = Layer::empty(LayerTag::NewRelief, CRS::from_epsg(32643));
        assert!(layer.is_empty());
        assert!(layer.tag.is_new());
        assert_eq!(layer.tag.to_string(), "NEW_2025_relief");
    }

    #[test]
    fn test_region_from_polygon() {
        let square = polygon![(x: 0.0, y: 0.0), (x: 10.0, y: 0.0), (x: 10.0, y: 10.0), (x: 0.0, y: 10.0)];
        let region = RegionBoundary::new("Gurugram", "Haryana", square);
        assert_eq!(region.geometry.0.len(), 1);
        assert_eq!(region.state, "Haryana");
    }
}
