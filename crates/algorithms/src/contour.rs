//! Closed contours and contour-enclosure hill footprints
//!
//! Isolines are traced with marching squares over pixel centres. Only rings
//! that close on themselves inside the grid are kept: a closed contour
//! encloses higher ground, so the lowest one around a peak marks the base of
//! that hill.
//!
//! ```text
//!  tl ─ top ─ tr
//!  │           │       case bits: tl = 8, tr = 4, br = 2, bl = 1
//! left       right     (set when sample >= level)
//!  │           │
//!  bl ─ bottom─ br
//! ```

use crate::maybe_rayon::*;
use crate::terrain::Peak;
use crate::vector::EnvelopeIndex;
use geo::{Area, Contains, Coord, LineString, Polygon, Validation};
use ridgeline_core::raster::{ElevationGrid, GeoTransform};
use ridgeline_core::vector::HillAttributes;
use ridgeline_core::{Error, Result};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Upper bound on the number of levels traced in one call
const MAX_LEVELS: usize = 100_000;

/// A closed isoline at `level`, as the polygon it encloses
#[derive(Debug, Clone, PartialEq)]
pub struct ClosedContour {
    pub level: f64,
    pub polygon: Polygon<f64>,
    /// Enclosed area in square metres
    pub area: f64,
}

/// A peak with its lowest enclosing closed contour
#[derive(Debug, Clone, PartialEq)]
pub struct HillFootprint {
    pub peak: Peak,
    /// Index of the enclosing contour in the searched slice
    pub contour: usize,
    /// Level of the enclosing contour
    pub base_elevation: f64,
    pub relief: f64,
    pub polygon: Polygon<f64>,
}

impl HillFootprint {
    pub fn attributes(&self) -> HillAttributes {
        HillAttributes {
            peak_elev: self.peak.elevation,
            base_elev: self.base_elevation,
            relief: self.relief,
        }
    }
}

/// Contour levels from `floor(min / interval) * interval` to
/// `ceil(max / interval) * interval`, inclusive.
pub fn contour_levels(min: f64, max: f64, interval: f64) -> Result<Vec<f64>> {
    if !interval.is_finite() || interval <= 0.0 {
        return Err(Error::invalid_parameter(
            "contour_interval_m",
            interval,
            "contour interval must be positive",
        ));
    }
    if !min.is_finite() || !max.is_finite() || min > max {
        return Err(Error::Algorithm(format!(
            "invalid elevation range {min} .. {max} for contouring"
        )));
    }

    let start = (min / interval).floor();
    let end = (max / interval).ceil();
    let steps = end - start;
    if steps + 1.0 > MAX_LEVELS as f64 {
        return Err(Error::Algorithm(format!(
            "{} contour levels requested (limit {MAX_LEVELS}); increase the interval",
            steps + 1.0
        )));
    }

    Ok((0..=steps as usize)
        .map(|k| (start + k as f64) * interval)
        .collect())
}

/// All closed contours of `grid` at `interval`, sorted by (level, area).
///
/// No-data is filled with the finite minimum. Only cycles of linked segments
/// are traced; a ring is kept when it has more than 3 distinct vertices, is
/// valid and encloses a positive area.
pub fn closed_contours(grid: &ElevationGrid, interval: f64) -> Result<Vec<ClosedContour>> {
    let stats = grid.require_finite()?;
    let levels = contour_levels(stats.min, stats.max, interval)?;
    let z = grid.filled(stats.min);
    let transform = *grid.transform();

    tracing::debug!(
        "Tracing {} contour levels from {} to {}",
        levels.len(),
        levels.first().copied().unwrap_or(f64::NAN),
        levels.last().copied().unwrap_or(f64::NAN)
    );

    let mut contours: Vec<ClosedContour> = levels
        .into_par_iter()
        .flat_map(|level| {
            trace_level(&z, level)
                .into_iter()
                .filter_map(|ring| closed_ring(ring, level, &transform))
                .collect::<Vec<_>>()
        })
        .collect();

    contours.sort_by(|a, b| {
        a.level
            .partial_cmp(&b.level)
            .unwrap_or(Ordering::Equal)
            .then(a.area.partial_cmp(&b.area).unwrap_or(Ordering::Equal))
    });
    Ok(contours)
}

/// Footprints of the peaks whose lowest enclosing contour leaves at least
/// `threshold` of relief.
///
/// `contours` must be sorted by (level, area) as returned by
/// [`closed_contours`]; the first one containing a peak is its base, which
/// picks the smallest ring when several at the same level contain it.
pub fn enclosing_footprints(
    peaks: &[Peak],
    contours: &[ClosedContour],
    threshold: f64,
) -> Vec<HillFootprint> {
    let polygons: Vec<Polygon<f64>> = contours.iter().map(|c| c.polygon.clone()).collect();
    let index = EnvelopeIndex::build(&polygons);

    let footprints: Vec<HillFootprint> = peaks
        .iter()
        .filter_map(|peak| {
            let base = index
                .query_point(peak.location.x(), peak.location.y())
                .into_iter()
                .find(|&i| contours[i].polygon.contains(&peak.location))?;
            let contour = &contours[base];
            let relief = peak.elevation - contour.level;

            (relief >= threshold).then(|| HillFootprint {
                peak: *peak,
                contour: base,
                base_elevation: contour.level,
                relief,
                polygon: contour.polygon.clone(),
            })
        })
        .collect();

    tracing::debug!(
        "{} of {} peaks have at least {} m of contour relief",
        footprints.len(),
        peaks.len(),
        threshold
    );
    footprints
}

/// Raw rings (pixel-centre index coordinates, not closed) at one level
fn trace_level(z: &ndarray::Array2<f64>, level: f64) -> Vec<Vec<Coord<f64>>> {
    let (rows, cols) = z.dim();
    if rows < 2 || cols < 2 {
        return Vec::new();
    }

    let mut segments: Vec<(usize, usize)> = Vec::new();

    for r in 0..rows - 1 {
        for c in 0..cols - 1 {
            let tl = z[(r, c)];
            let tr = z[(r, c + 1)];
            let br = z[(r + 1, c + 1)];
            let bl = z[(r + 1, c)];

            let case = (u8::from(tl >= level) << 3)
                | (u8::from(tr >= level) << 2)
                | (u8::from(br >= level) << 1)
                | u8::from(bl >= level);
            if case == 0 || case == 15 {
                continue;
            }

            let top = horizontal_edge(r, c, cols);
            let right = vertical_edge(r, c + 1, cols);
            let bottom = horizontal_edge(r + 1, c, cols);
            let left = vertical_edge(r, c, cols);
            let centre_high = (tl + tr + br + bl) / 4.0 >= level;

            match case {
                1 | 14 => segments.push((left, bottom)),
                2 | 13 => segments.push((bottom, right)),
                3 | 12 => segments.push((left, right)),
                4 | 11 => segments.push((top, right)),
                6 | 9 => segments.push((top, bottom)),
                7 | 8 => segments.push((top, left)),
                5 if centre_high => segments.extend([(top, left), (bottom, right)]),
                5 => segments.extend([(top, right), (left, bottom)]),
                10 if centre_high => segments.extend([(top, right), (left, bottom)]),
                10 => segments.extend([(top, left), (bottom, right)]),
                _ => {}
            }
        }
    }

    link_rings(&segments)
        .into_iter()
        .map(|ids| ids.into_iter().map(|id| crossing(z, id, level)).collect())
        .collect()
}

/// Id of the sample edge (r, c)-(r, c+1)
fn horizontal_edge(r: usize, c: usize, cols: usize) -> usize {
    2 * (r * cols + c)
}

/// Id of the sample edge (r, c)-(r+1, c)
fn vertical_edge(r: usize, c: usize, cols: usize) -> usize {
    2 * (r * cols + c) + 1
}

/// Linear interpolation of `level` along a sample edge that changes sign
fn crossing(z: &ndarray::Array2<f64>, id: usize, level: f64) -> Coord<f64> {
    let cols = z.ncols();
    let cell = id / 2;
    let (r0, c0) = (cell / cols, cell % cols);
    let (r1, c1) = if id % 2 == 0 { (r0, c0 + 1) } else { (r0 + 1, c0) };

    let a = z[(r0, c0)];
    let b = z[(r1, c1)];
    let t = (level - a) / (b - a);
    Coord {
        x: c0 as f64 + t * (c1 as f64 - c0 as f64),
        y: r0 as f64 + t * (r1 as f64 - r0 as f64),
    }
}

/// Chain segments sharing edge ids into closed cycles; open chains are dropped.
fn link_rings(segments: &[(usize, usize)]) -> Vec<Vec<usize>> {
    let mut at: HashMap<usize, Vec<usize>> = HashMap::with_capacity(segments.len() * 2);
    for (i, &(a, b)) in segments.iter().enumerate() {
        at.entry(a).or_default().push(i);
        at.entry(b).or_default().push(i);
    }

    let other = |seg: usize, node: usize| {
        let (a, b) = segments[seg];
        if a == node { b } else { a }
    };
    let next_segment = |seg: usize, node: usize| {
        at.get(&node)
            .and_then(|list| list.iter().copied().find(|&s| s != seg))
    };

    let mut used = vec![false; segments.len()];

    // Open chains start at a node touched by a single segment
    for (&node, list) in &at {
        if list.len() != 1 || used[list[0]] {
            continue;
        }
        let (mut seg, mut node) = (list[0], node);
        loop {
            used[seg] = true;
            node = other(seg, node);
            match next_segment(seg, node) {
                Some(next) if !used[next] => seg = next,
                _ => break,
            }
        }
    }

    let mut rings = Vec::new();
    for first in 0..segments.len() {
        if used[first] {
            continue;
        }
        let start = segments[first].0;
        let mut ring = vec![start];
        let (mut seg, mut node) = (first, start);
        let closed = loop {
            used[seg] = true;
            node = other(seg, node);
            if node == start {
                break true;
            }
            ring.push(node);
            match next_segment(seg, node) {
                Some(next) if !used[next] => seg = next,
                _ => break false,
            }
        };
        if closed {
            rings.push(ring);
        }
    }

    rings
}

/// Map a raw ring to projected coordinates and apply the closed-ring filters
fn closed_ring(
    ring: Vec<Coord<f64>>,
    level: f64,
    transform: &GeoTransform,
) -> Option<ClosedContour> {
    // Samples lying exactly on the level collapse neighbouring crossings
    let mut coords: Vec<Coord<f64>> = Vec::with_capacity(ring.len() + 1);
    for c in ring {
        let (x, y) = transform.corner_to_geo(c.x + 0.5, c.y + 0.5);
        let p = Coord { x, y };
        if coords.last() != Some(&p) {
            coords.push(p);
        }
    }
    while coords.len() > 1 && coords.first() == coords.last() {
        coords.pop();
    }

    let first = *coords.first()?;
    coords.push(first);
    if coords.len() <= 3 {
        return None;
    }

    let polygon = Polygon::new(LineString::new(coords), Vec::new());
    let area = polygon.unsigned_area();
    if area <= 0.0 || !polygon.is_valid() {
        return None;
    }

    Some(ClosedContour {
        level,
        polygon,
        area,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use geo::Point;
    use ndarray::Array2;
    use ridgeline_core::CRS;

    fn bump(size: usize, peak: f64) -> ElevationGrid {
        let mid = (size / 2) as f64;
        let data = Array2::from_shape_fn((size, size), |(r, c)| {
            let d = ((r as f64 - mid).powi(2) + (c as f64 - mid).powi(2)).sqrt();
            100.5 + (peak - 10.0 * d).max(0.0)
        });
        ElevationGrid::new(
            data,
            GeoTransform::new(0.0, size as f64 * 10.0, 10.0, -10.0),
            CRS::from_epsg(32643),
        )
        .unwrap()
    }

    #[test]
    fn test_levels_span_range() {
        let levels = contour_levels(101.0, 149.0, 10.0).unwrap();
        assert_eq!(levels, vec![100.0, 110.0, 120.0, 130.0, 140.0, 150.0]);
        assert_eq!(contour_levels(100.0, 100.0, 10.0).unwrap(), vec![100.0]);
    }

    #[test]
    fn test_levels_reject_bad_interval() {
        assert!(contour_levels(0.0, 10.0, 0.0).is_err());
        assert!(contour_levels(0.0, 10.0, -5.0).is_err());
        assert!(contour_levels(0.0, 1.0e9, 1.0).is_err());
    }

    #[test]
    fn test_single_square_ring() {
        // 3x3 block of 10 in a field of 0: one diamond-cornered ring at 5
        let mut z = Array2::zeros((7, 7));
        for r in 2..5 {
            for c in 2..5 {
                z[(r, c)] = 10.0;
            }
        }
        let rings = trace_level(&z, 5.0);
        assert_eq!(rings.len(), 1);
        // 3 crossings per side, 4 sides
        assert_eq!(rings[0].len(), 12);
    }

    #[test]
    fn test_ring_through_on_level_samples() {
        // Plus of samples at exactly 10 around a 20 summit: the ring joins the
        // four arm tips with diagonal steps longer than one pixel
        let mut z = Array2::zeros((7, 7));
        for (r, c) in [(2, 3), (4, 3), (3, 2), (3, 4)] {
            z[(r, c)] = 10.0;
        }
        z[(3, 3)] = 20.0;
        let grid = ElevationGrid::new(
            z,
            GeoTransform::new(0.0, 70.0, 10.0, -10.0),
            CRS::from_epsg(32643),
        )
        .unwrap();

        let contours = closed_contours(&grid, 10.0).unwrap();
        assert_eq!(contours.len(), 1);
        assert_eq!(contours[0].level, 10.0);
        // Diamond with half-diagonals of one pixel
        assert_relative_eq!(contours[0].area, 200.0, epsilon = 1e-6);
        assert_eq!(contours[0].polygon.exterior().0.len(), 5);
    }

    #[test]
    fn test_open_contours_discarded() {
        // A ramp only produces lines running off the grid
        let z = Array2::from_shape_fn((6, 6), |(_, c)| c as f64 * 10.0);
        assert!(trace_level(&z, 25.0).is_empty());
    }

    #[test]
    fn test_bump_contours_nest() {
        let grid = bump(21, 60.0);
        let contours = closed_contours(&grid, 10.0).unwrap();

        // Levels 110..=160 lie strictly between base (100.5) and peak (160.5)
        let levels: Vec<f64> = contours.iter().map(|c| c.level).collect();
        assert_eq!(levels, vec![110.0, 120.0, 130.0, 140.0, 150.0, 160.0]);
        assert!(contours.windows(2).all(|w| w[0].area > w[1].area));
    }

    #[test]
    fn test_enclosure_picks_lowest_ring() {
        let grid = bump(21, 60.0);
        let contours = closed_contours(&grid, 10.0).unwrap();
        let (x, y) = grid.transform().pixel_to_geo(10, 10);
        let peak = Peak {
            row: 10,
            col: 10,
            elevation: 160.5,
            location: Point::new(x, y),
        };

        let footprints = enclosing_footprints(&[peak], &contours, 50.0);
        assert_eq!(footprints.len(), 1);
        assert_relative_eq!(footprints[0].base_elevation, 110.0);
        assert_relative_eq!(footprints[0].relief, 50.5);

        assert!(enclosing_footprints(&[peak], &contours, 60.0).is_empty());
    }
}
