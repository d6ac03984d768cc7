//! Square sliding-window extremum filters
//!
//! Separable: a 1D pass along rows then along columns, each in O(n) with a
//! monotonic deque. Windows are clipped at the grid edge, which for min/max
//! gives the same result as reflecting the border.

use crate::maybe_rayon::*;
use ndarray::{Array2, Axis};
use ridgeline_core::{Error, Result};
use std::collections::VecDeque;

/// Minimum over the `size` x `size` window centred on each cell
pub fn window_minimum(array: &Array2<f64>, size: usize) -> Result<Array2<f64>> {
    window_extreme(array, size, |candidate, held| candidate <= held)
}

/// Maximum over the `size` x `size` window centred on each cell
pub fn window_maximum(array: &Array2<f64>, size: usize) -> Result<Array2<f64>> {
    window_extreme(array, size, |candidate, held| candidate >= held)
}

fn window_extreme(
    array: &Array2<f64>,
    size: usize,
    dominates: fn(f64, f64) -> bool,
) -> Result<Array2<f64>> {
    if size == 0 || size % 2 == 0 {
        return Err(Error::InvalidParameter {
            name: "size",
            value: size.to_string(),
            reason: "window size must be odd and positive".to_string(),
        });
    }

    let (rows, cols) = array.dim();
    let half = size / 2;

    // Along rows
    let horizontal: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let line = array.row(row).to_vec();
            sliding_extreme(&line, half, dominates)
        })
        .collect();
    let horizontal = Array2::from_shape_vec((rows, cols), horizontal)
        .map_err(|e| Error::Other(e.to_string()))?;

    // Along columns, collected column-major then transposed back
    let vertical: Vec<f64> = (0..cols)
        .into_par_iter()
        .flat_map(|col| {
            let line = horizontal.index_axis(Axis(1), col).to_vec();
            sliding_extreme(&line, half, dominates)
        })
        .collect();
    let vertical = Array2::from_shape_vec((cols, rows), vertical)
        .map_err(|e| Error::Other(e.to_string()))?;

    Ok(vertical.reversed_axes().as_standard_layout().into_owned())
}

/// 1D extremum over `[i - half, i + half]` clipped to the line
fn sliding_extreme(line: &[f64], half: usize, dominates: fn(f64, f64) -> bool) -> Vec<f64> {
    let n = line.len();
    let mut out = Vec::with_capacity(n);
    let mut window: VecDeque<usize> = VecDeque::with_capacity(2 * half + 1);
    let mut next = 0;

    for i in 0..n {
        let hi = (i + half).min(n - 1);
        while next <= hi {
            while window.back().is_some_and(|&j| dominates(line[next], line[j])) {
                window.pop_back();
            }
            window.push_back(next);
            next += 1;
        }

        let lo = i.saturating_sub(half);
        while window.front().is_some_and(|&j| j < lo) {
            window.pop_front();
        }

        out.push(window.front().map_or(f64::NAN, |&j| line[j]));
    }

    out
}
