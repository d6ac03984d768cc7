//! Envelope R-tree over indexed geometries

use geo::{BoundingRect, Polygon};
use rstar::{RTree, RTreeObject, AABB};

/// Index entry: position in the caller's slice plus its envelope
#[derive(Debug, Clone)]
struct IndexedEnvelope {
    index: usize,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for IndexedEnvelope {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// Axis-aligned bounding box of a polygon as an rstar envelope
pub fn envelope_of(polygon: &Polygon<f64>) -> Option<AABB<[f64; 2]>> {
    let rect = polygon.bounding_rect()?;
    Some(AABB::from_corners(
        [rect.min().x, rect.min().y],
        [rect.max().x, rect.max().y],
    ))
}

/// Bulk-loaded R-tree answering "which polygons may touch this box" queries.
///
/// Results are indices into the slice the index was built from.
pub struct EnvelopeIndex {
    tree: RTree<IndexedEnvelope>,
}

impl EnvelopeIndex {
    /// Bulk-load the envelopes of `polygons`; degenerate ones without a
    /// bounding box are skipped.
    pub fn build(polygons: &[Polygon<f64>]) -> Self {
        let entries: Vec<IndexedEnvelope> = polygons
            .iter()
            .enumerate()
            .filter_map(|(index, p)| {
                envelope_of(p).map(|envelope| IndexedEnvelope { index, envelope })
            })
            .collect();
        Self {
            tree: RTree::bulk_load(entries),
        }
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Indices whose envelope intersects `[min, max]`, ascending
    pub fn query(&self, min: [f64; 2], max: [f64; 2]) -> Vec<usize> {
        let query = AABB::from_corners(min, max);
        let mut hits: Vec<usize> = self
            .tree
            .locate_in_envelope_intersecting(&query)
            .map(|e| e.index)
            .collect();
        hits.sort_unstable();
        hits
    }

    /// Indices whose envelope contains the point
    pub fn query_point(&self, x: f64, y: f64) -> Vec<usize> {
        self.query([x, y], [x, y])
    }

    /// Indices whose envelope comes within `distance` of `envelope`
    pub fn query_near(&self, envelope: &AABB<[f64; 2]>, distance: f64) -> Vec<usize> {
        let lower = envelope.lower();
        let upper = envelope.upper();
        self.query(
            [lower[0] - distance, lower[1] - distance],
            [upper[0] + distance, upper[1] + distance],
        )
    }
}
