//! Raster-to-vector conversion of terrain masks
//!
//! Each 4-connected group of true cells becomes one polygon whose rings run
//! along pixel edges. Edges are directed so the region is always on the same
//! side; where two cells of a region meet only at a corner the trace keeps
//! to the background cell it was already following, which splits the
//! boundary into separate simple rings instead of one self-touching ring.

use geo::{
    unary_union, Area, Buffer, Contains, Coord, LineString, MultiPolygon, Point, Polygon,
    Validation,
};
use ridgeline_core::raster::{GeoTransform, TerrainMask};
use std::collections::{HashMap, VecDeque};

/// Unit step between pixel corners, in (x = col, y = row) with y pointing down
type Dir = (i8, i8);

const EAST: Dir = (1, 0);
const SOUTH: Dir = (0, 1);
const WEST: Dir = (-1, 0);
const NORTH: Dir = (0, -1);

/// Directed boundary edge between pixel corners
#[derive(Debug, Clone, Copy)]
struct Edge {
    start: (usize, usize),
    end: (usize, usize),
    dir: Dir,
}

/// Trace every true region of `mask` into polygons in projected coordinates.
///
/// Invalid polygons are repaired with a zero-width buffer; polygons that are
/// still invalid or empty afterwards are dropped.
pub fn polygonize(mask: &TerrainMask, transform: &GeoTransform) -> Vec<Polygon<f64>> {
    let (labels, count) = label_components(mask);
    if count == 0 {
        return Vec::new();
    }

    let edges = boundary_edges(&labels, count);
    let mut polygons = Vec::with_capacity(count);
    let mut dropped = 0usize;

    for component in edges {
        let rings = trace_rings(&component);
        for polygon in assemble(rings, transform) {
            match repair(polygon) {
                Some(fixed) => polygons.extend(fixed.0),
                None => dropped += 1,
            }
        }
    }

    if dropped > 0 {
        tracing::debug!("Dropped {} polygons that could not be repaired", dropped);
    }
    tracing::debug!("Polygonized {} regions into {} polygons", count, polygons.len());
    polygons
}

/// Make a polygon valid.
///
/// A valid polygon is returned unchanged; otherwise it is rebuilt with a
/// zero-width buffer. `None` when the result is still invalid or empty.
pub fn repair(polygon: Polygon<f64>) -> Option<MultiPolygon<f64>> {
    if polygon.is_valid() {
        return Some(MultiPolygon::new(vec![polygon]));
    }

    let rebuilt = polygon.buffer(0.0);
    if rebuilt.0.is_empty() || rebuilt.unsigned_area() <= 0.0 || !rebuilt.is_valid() {
        tracing::debug!("Polygon could not be repaired; dropping it");
        return None;
    }
    Some(rebuilt)
}

/// Union of all polygons after repair.
pub fn dissolve(polygons: impl IntoIterator<Item = Polygon<f64>>) -> MultiPolygon<f64> {
    let parts: Vec<Polygon<f64>> = polygons
        .into_iter()
        .filter_map(repair)
        .flat_map(|mp| mp.0)
        .collect();

    match parts.len() {
        0 => MultiPolygon::new(Vec::new()),
        1 => MultiPolygon::new(parts),
        _ => unary_union(&parts),
    }
}

/// Polygonize and dissolve in one step
pub fn mask_to_multipolygon(mask: &TerrainMask) -> MultiPolygon<f64> {
    dissolve(polygonize(mask, mask.transform()))
}

/// 4-connected component labels (0 = background) and the component count
fn label_components(mask: &TerrainMask) -> (ndarray::Array2<usize>, usize) {
    let data = mask.data();
    let (rows, cols) = data.dim();
    let mut labels = ndarray::Array2::<usize>::zeros((rows, cols));
    let mut next = 0usize;
    let mut queue = VecDeque::new();

    for ((row, col), &set) in data.indexed_iter() {
        if !set || labels[(row, col)] != 0 {
            continue;
        }

        next += 1;
        labels[(row, col)] = next;
        queue.push_back((row, col));

        while let Some((r, c)) = queue.pop_front() {
            let neighbors = [
                r.checked_sub(1).map(|r| (r, c)),
                (r + 1 < rows).then_some((r + 1, c)),
                c.checked_sub(1).map(|c| (r, c)),
                (c + 1 < cols).then_some((r, c + 1)),
            ];
            for cell in neighbors.into_iter().flatten() {
                if data[cell] && labels[cell] == 0 {
                    labels[cell] = next;
                    queue.push_back(cell);
                }
            }
        }
    }

    (labels, next)
}

/// Directed edges of every cell side facing outside its component, grouped
/// by component.
fn boundary_edges(labels: &ndarray::Array2<usize>, count: usize) -> Vec<Vec<Edge>> {
    let (rows, cols) = labels.dim();
    let mut edges: Vec<Vec<Edge>> = vec![Vec::new(); count];

    let outside = |r: Option<usize>, c: Option<usize>, label: usize| match (r, c) {
        (Some(r), Some(c)) if r < rows && c < cols => labels[(r, c)] != label,
        _ => true,
    };

    for ((r, c), &label) in labels.indexed_iter() {
        if label == 0 {
            continue;
        }
        let bucket = &mut edges[label - 1];

        if outside(r.checked_sub(1), Some(c), label) {
            bucket.push(Edge {
                start: (c, r),
                end: (c + 1, r),
                dir: EAST,
            });
        }
        if outside(Some(r), Some(c + 1), label) {
            bucket.push(Edge {
                start: (c + 1, r),
                end: (c + 1, r + 1),
                dir: SOUTH,
            });
        }
        if outside(Some(r + 1), Some(c), label) {
            bucket.push(Edge {
                start: (c + 1, r + 1),
                end: (c, r + 1),
                dir: WEST,
            });
        }
        if outside(Some(r), c.checked_sub(1), label) {
            bucket.push(Edge {
                start: (c, r + 1),
                end: (c, r),
                dir: NORTH,
            });
        }
    }

    edges
}

/// z-component of the cross product in y-down coordinates
fn turn(a: Dir, b: Dir) -> i8 {
    a.0 * b.1 - a.1 * b.0
}

/// Closed rings of corner vertices, collinear vertices removed
fn trace_rings(edges: &[Edge]) -> Vec<Vec<(usize, usize)>> {
    let mut outgoing: HashMap<(usize, usize), Vec<usize>> = HashMap::with_capacity(edges.len());
    for (i, e) in edges.iter().enumerate() {
        outgoing.entry(e.start).or_default().push(i);
    }

    let successor = |i: usize| -> Option<usize> {
        let e = &edges[i];
        let candidates = outgoing.get(&e.end)?;
        match candidates.as_slice() {
            [only] => Some(*only),
            many => many
                .iter()
                .copied()
                .find(|&j| turn(e.dir, edges[j].dir) < 0)
                .or_else(|| many.first().copied()),
        }
    };

    let mut visited = vec![false; edges.len()];
    let mut rings = Vec::new();

    for first in 0..edges.len() {
        if visited[first] {
            continue;
        }

        let mut ring = Vec::new();
        let mut current = first;
        loop {
            visited[current] = true;
            ring.push(current);
            match successor(current) {
                Some(next) if !visited[next] => current = next,
                _ => break,
            }
        }

        let n = ring.len();
        let vertices: Vec<(usize, usize)> = (0..n)
            .filter(|&k| edges[ring[(k + n - 1) % n]].dir != edges[ring[k]].dir)
            .map(|k| edges[ring[k]].start)
            .collect();
        if vertices.len() >= 3 {
            rings.push(vertices);
        }
    }

    rings
}

/// Twice the signed area in pixel space; positive for outer rings
fn signed_area2(ring: &[(usize, usize)]) -> i64 {
    let n = ring.len();
    (0..n)
        .map(|i| {
            let (x0, y0) = ring[i];
            let (x1, y1) = ring[(i + 1) % n];
            x0 as i64 * y1 as i64 - x1 as i64 * y0 as i64
        })
        .sum()
}

fn pixel_ring(ring: &[(usize, usize)]) -> LineString<f64> {
    ring.iter()
        .map(|&(x, y)| Coord {
            x: x as f64,
            y: y as f64,
        })
        .collect()
}

fn geo_ring(ring: &[(usize, usize)], transform: &GeoTransform) -> LineString<f64> {
    let mut coords: Vec<Coord<f64>> = ring
        .iter()
        .map(|&(x, y)| {
            let (gx, gy) = transform.corner_to_geo(x as f64, y as f64);
            Coord { x: gx, y: gy }
        })
        .collect();
    if let Some(&first) = coords.first() {
        coords.push(first);
    }
    LineString::new(coords)
}

/// Pair holes with their exterior and build projected polygons
fn assemble(rings: Vec<Vec<(usize, usize)>>, transform: &GeoTransform) -> Vec<Polygon<f64>> {
    let (exteriors, holes): (Vec<_>, Vec<_>) =
        rings.into_iter().partition(|r| signed_area2(r) > 0);

    let mut owned: Vec<Vec<Vec<(usize, usize)>>> = vec![Vec::new(); exteriors.len()];

    if exteriors.len() == 1 {
        owned[0] = holes;
    } else if !exteriors.is_empty() {
        let shells: Vec<(Polygon<f64>, i64)> = exteriors
            .iter()
            .map(|r| (Polygon::new(pixel_ring(r), Vec::new()), signed_area2(r)))
            .collect();

        for hole in holes {
            // Midpoint of the first hole edge belongs to no other ring
            let (x0, y0) = hole[0];
            let (x1, y1) = hole[1 % hole.len()];
            let midpoint = Point::new((x0 + x1) as f64 / 2.0, (y0 + y1) as f64 / 2.0);

            let owner = shells
                .iter()
                .enumerate()
                .filter(|(_, (shell, _))| shell.contains(&midpoint))
                .min_by_key(|(_, (_, area))| *area)
                .map(|(i, _)| i);
            if let Some(i) = owner {
                owned[i].push(hole);
            }
        }
    }

    exteriors
        .iter()
        .zip(owned)
        .map(|(shell, holes)| {
            Polygon::new(
                geo_ring(shell, transform),
                holes.iter().map(|h| geo_ring(h, transform)).collect(),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use geo::polygon;

    fn mask_from(rows: &[&str]) -> TerrainMask {
        let cols = rows[0].len();
        let cells: Vec<bool> = rows.iter().flat_map(|r| r.chars().map(|ch| ch == '#')).collect();
        let mut mask = TerrainMask::from_vec(cells, rows.len(), cols).unwrap();
        mask.set_transform(GeoTransform::new(1000.0, 5000.0, 10.0, -10.0));
        mask
    }

    fn total_area(polygons: &[Polygon<f64>]) -> f64 {
        polygons.iter().map(|p| p.unsigned_area()).sum()
    }

    #[test]
    fn test_single_block_is_rectangle() {
        let mask = mask_from(&["....", ".##.", ".##.", "...."]);
        let polygons = polygonize(&mask, mask.transform());

        assert_eq!(polygons.len(), 1);
        // Collinear corners removed: 4 vertices + closing
        assert_eq!(polygons[0].exterior().0.len(), 5);
        assert_relative_eq!(total_area(&polygons), 400.0);
    }

    #[test]
    fn test_ring_with_hole() {
        let mask = mask_from(&["###", "#.#", "###"]);
        let polygons = polygonize(&mask, mask.transform());

        assert_eq!(polygons.len(), 1);
        assert_eq!(polygons[0].interiors().len(), 1);
        assert_relative_eq!(polygons[0].unsigned_area(), 800.0);
    }

    #[test]
    fn test_separate_components() {
        let mask = mask_from(&["#...#", ".....", "..#.."]);
        let polygons = polygonize(&mask, mask.transform());
        assert_eq!(polygons.len(), 3);
        assert_relative_eq!(total_area(&polygons), 300.0);
    }

    #[test]
    fn test_corner_contact_within_one_region() {
        // (1,1) and (2,2) touch only at a corner but are joined around the
        // top right, enclosing (1,2) as a hole
        let mask = mask_from(&[".###", ".#.#", "..##", "...."]);
        let polygons = polygonize(&mask, mask.transform());

        assert!(!polygons.is_empty());
        assert!(polygons.iter().all(|p| p.is_valid()));
        assert_relative_eq!(total_area(&polygons), 700.0, epsilon = 1e-6);
    }

    #[test]
    fn test_diagonal_regions_stay_separate() {
        let mask = mask_from(&["##..", "##..", "..##", "..##"]);
        let polygons = polygonize(&mask, mask.transform());

        assert_eq!(polygons.len(), 2);
        assert!(polygons.iter().all(|p| p.exterior().0.len() == 5));
        assert_relative_eq!(total_area(&polygons), 800.0);
    }

    #[test]
    fn test_empty_mask() {
        let mask = mask_from(&["...", "..."]);
        assert!(polygonize(&mask, mask.transform()).is_empty());
        assert!(mask_to_multipolygon(&mask).0.is_empty());
    }

    #[test]
    fn test_repair_keeps_valid_polygon() {
        let square = polygon![
            (x: 0.0, y: 0.0), (x: 10.0, y: 0.0), (x: 10.0, y: 10.0), (x: 0.0, y: 10.0)
        ];
        let repaired = repair(square.clone()).unwrap();
        assert_relative_eq!(repaired.unsigned_area(), square.unsigned_area());
    }

    #[test]
    fn test_dissolve_merges_adjacent() {
        let a = polygon![(x: 0.0, y: 0.0), (x: 10.0, y: 0.0), (x: 10.0, y: 10.0), (x: 0.0, y: 10.0)];
        let b = polygon![(x: 10.0, y: 0.0), (x: 20.0, y: 0.0), (x: 20.0, y: 10.0), (x: 10.0, y: 10.0)];
        let merged = dissolve(vec![a, b]);
        assert_eq!(merged.0.len(), 1);
        assert_relative_eq!(merged.unsigned_area(), 200.0, epsilon = 1e-6);
    }
}
