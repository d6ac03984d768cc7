//! Binary dilation

use crate::maybe_rayon::*;
use ndarray::Array2;
use ridgeline_core::raster::TerrainMask;
use ridgeline_core::{Algorithm, Error, Result};

use super::element::{neighbor, StructuringElement};

/// Parameters for binary dilation
#[derive(Debug, Clone)]
pub struct DilateParams {
    pub element: StructuringElement,
    /// Number of successive applications of the element
    pub iterations: usize,
}

impl Default for DilateParams {
    fn default() -> Self {
        Self {
            element: StructuringElement::Cross,
            iterations: 1,
        }
    }
}

/// Dilation algorithm
#[derive(Debug, Clone, Default)]
pub struct Dilate;

impl Algorithm for Dilate {
    type Input = TerrainMask;
    type Output = TerrainMask;
    type Params = DilateParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Dilate"
    }

    fn description(&self) -> &'static str {
        "Binary dilation of a terrain mask"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        dilate(&input, params.element, params.iterations)
    }
}

/// Dilate `mask` by `element`, `iterations` times.
///
/// A cell becomes true when any in-grid cell under the element is true.
/// Zero iterations returns a copy.
pub fn dilate(
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
                    offsets.iter().any(|&off| {
                        neighbor(row, col, off, rows, cols).is_some_and(|cell| data[cell])
                    })
                })
                .collect::<Vec<_>>()
        })
        .collect();

    Array2::from_shape_vec((rows, cols), out).map_err(|e| Error::Other(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single_pixel(rows: usize, cols: usize, row: usize, col: usize) -> TerrainMask {
        let mut mask = TerrainMask::filled(rows, cols, false);
        mask.set(row, col, true).unwrap();
        mask
    }

    #[test]
    fn test_cross_dilation_grows_diamond() {
        let mask = single_pixel(9, 9, 4, 4);
        let result = dilate(&mask, StructuringElement::Cross, 2).unwrap();
        // Manhattan ball of radius 2: 1 + 4 + 8
        assert_eq!(result.count_true(), 13);
        assert!(result.get(4, 6).unwrap());
        assert!(result.get(3, 5).unwrap());
        assert!(!result.get(2, 6).unwrap());
    }

    #[test]
    fn test_square_dilation() {
        let mask = single_pixel(9, 9, 4, 4);
        let result = dilate(&mask, StructuringElement::Square, 1).unwrap();
        assert_eq!(result.count_true(), 9);
    }

    #[test]
    fn test_zero_iterations_is_copy() {
        let mask = single_pixel(5, 5, 0, 0);
        let result = dilate(&mask, StructuringElement::Cross, 0).unwrap();
        assert_eq!(result, mask);
    }

    #[test]
    fn test_dilation_clipped_at_edge() {
        let mask = single_pixel(3, 3, 0, 0);
        let result = dilate(&mask, StructuringElement::Cross, 1).unwrap();
        assert_eq!(result.count_true(), 3);
    }
}
