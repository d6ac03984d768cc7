//! Binary erosion

use crate::maybe_rayon::*;
use ndarray::Array2;
use ridgeline_core::raster::TerrainMask;
use ridgeline_core::{Error, Result};

use super::element::{neighbor, StructuringElement};

/// Erode `mask` by `element`, `iterations` times.
///
/// A cell stays true only when every cell under the element is true;
/// positions outside the grid count as false, so true regions touching the
/// border shrink away from it.
pub fn erode(
    mask: &TerrainMask,
    element: StructuringElement,
    iterations: usize,
) -> Result<TerrainMask> {
    let mut data = mask.data().clone();
    for _ in 0..iterations {
        let next = step(&data, element)?;
        if next == data {
            break;
        }
        data = next;
    }
    mask.with_data(data)
}

fn step(data: &Array2<bool>, element: StructuringElement) -> Result<Array2<bool>> {
    let (rows, cols) = data.dim();
    let offsets = element.offsets();

    let out: Vec<bool> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            (0..cols)
                .map(|col| {
                    offsets.iter().all(|&off| {
                        neighbor(row, col, off, rows, cols).is_some_and(|cell| data[cell])
                    })
                })
                .collect::<Vec<_>>()
        })
        .collect();

    Array2::from_shape_vec((rows, cols), out).map_err(|e| Error::Other(e.to_string()))
}
