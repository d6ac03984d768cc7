//! Nearest-neighbour distances between landform parts

use super::area::round_to;
use crate::vector::{envelope_of, explode, EnvelopeIndex};
use geo::{Distance, Euclidean, MultiPolygon};
use serde::{Deserialize, Serialize};

/// Gap from one part to its closest other part
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistanceRecord {
    pub hill_id: usize,
    pub nearest_id: usize,
    pub distance_m: f64,
}

/// Distribution of nearest-neighbour gaps
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistanceSummary {
    pub count: usize,
    pub min_m: f64,
    pub max_m: f64,
    pub mean_m: f64,
    pub median_m: f64,
}

impl DistanceSummary {
    /// `None` for an empty table
    pub fn from_records(records: &[DistanceRecord]) -> Option<Self> {
        if records.is_empty() {
            return None;
        }

        let mut d: Vec<f64> = records.iter().map(|r| r.distance_m).collect();
        d.sort_by(f64::total_cmp);
        let n = d.len();
        let median = if n % 2 == 1 {
            d[n / 2]
        } else {
            (d[n / 2 - 1] + d[n / 2]) / 2.0
        };

        Some(Self {
            count: n,
            min_m: d[0],
            max_m: d[n - 1],
            mean_m: d.iter().sum::<f64>() / n as f64,
            median_m: median,
        })
    }
}

/// Distance from every part of `geometry` to its nearest other part.
///
/// Parts whose nearest neighbour is not strictly closer than `max_search_m`
/// are omitted; fewer than two parts gives an empty table. Distances are
/// rounded to 0.1 m. Part ids are positions in the multipolygon.
pub fn nearest_neighbor_distances(
    geometry: &MultiPolygon<f64>,
    max_search_m: f64,
) -> Vec<DistanceRecord> {
    let parts = explode(geometry);
    if parts.len() < 2 {
        return Vec::new();
    }

    let index = EnvelopeIndex::build(&parts);
    let records: Vec<DistanceRecord> = parts
        .iter()
        .enumerate()
        .filter_map(|(i, part)| {
            let envelope = envelope_of(part)?;
            let (nearest_id, distance) = index
                .query_near(&envelope, max_search_m)
                .into_iter()
                .filter(|&j| j != i)
                .map(|j| (j, Euclidean.distance(part, &parts[j])))
                .min_by(|a, b| a.1.total_cmp(&b.1))?;

            (distance < max_search_m).then(|| DistanceRecord {
                hill_id: i,
                nearest_id,
                distance_m: round_to(distance, 1),
            })
        })
        .collect();

    if let Some(summary) = DistanceSummary::from_records(&records) {
        tracing::info!(
            "Nearest-neighbour gaps: {} parts, min {:.1} m, median {:.1} m, max {:.1} m",
            summary.count,
            summary.min_m,
            summary.median_m,
            summary.max_m
        );
    }
    records
}
