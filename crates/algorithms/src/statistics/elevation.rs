//! Descriptive statistics of elevations

use geo::{BoundingRect, Contains, MultiPolygon, Point};
use ridgeline_core::raster::ElevationGrid;
use ridgeline_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Summary of a set of elevations (population standard deviation)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElevationSummary {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std: f64,
    pub median: f64,
}

impl ElevationSummary {
    /// Summary of the finite values; `None` if there are none
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Option<Self> {
        let mut v: Vec<f64> = values.into_iter().filter(|x| x.is_finite()).collect();
        if v.is_empty() {
            return None;
        }
        v.sort_by(f64::total_cmp);

        let n = v.len();
        let mean = v.iter().sum::<f64>() / n as f64;
        let var = v.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n as f64;
        let median = if n % 2 == 1 {
            v[n / 2]
        } else {
            (v[n / 2 - 1] + v[n / 2]) / 2.0
        };

        Some(Self {
            count: n,
            min: v[0],
            max: v[n - 1],
            mean,
            std: var.sqrt(),
            median,
        })
    }
}

/// Summary of every finite cell of the grid
pub fn summarize_elevation(grid: &ElevationGrid) -> Result<ElevationSummary> {
    ElevationSummary::from_values(grid.data().iter().copied()).ok_or(Error::NoFiniteData)
}

/// Summary of the cells whose centre lies inside `geometry`
pub fn elevation_within(
    geometry: &MultiPolygon<f64>,
    grid: &ElevationGrid,
) -> Option<ElevationSummary> {
    let rect = geometry.bounding_rect()?;
    let transform = grid.transform();
    let (rows, cols) = grid.shape();

    // Pixel window covering the bounding box
    let corners = [
        transform.geo_to_pixel(rect.min().x, rect.min().y),
        transform.geo_to_pixel(rect.max().x, rect.max().y),
    ];
    let col_lo = corners[0].0.min(corners[1].0).floor().max(0.0) as usize;
    let col_hi = (corners[0].0.max(corners[1].0).ceil().max(0.0) as usize).min(cols);
    let row_lo = corners[0].1.min(corners[1].1).floor().max(0.0) as usize;
    let row_hi = (corners[0].1.max(corners[1].1).ceil().max(0.0) as usize).min(rows);

    let data = grid.data();
    let values = (row_lo..row_hi).flat_map(|row| {
        (col_lo..col_hi).filter_map(move |col| {
            let (x, y) = transform.pixel_to_geo(col, row);
            geometry
                .contains(&Point::new(x, y))
                .then(|| data[(row, col)])
        })
    });

    ElevationSummary::from_values(values)
}
