//! Local-maximum peak detection

use super::filters::window_maximum;
use geo::Point;
use ridgeline_core::raster::ElevationGrid;
use ridgeline_core::Result;

/// Search distance used to size the peak window
const PEAK_SEARCH_M: f64 = 500.0;

/// A local-maximum cell
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Peak {
    pub row: usize,
    pub col: usize,
    pub elevation: f64,
    /// Cell centre in projected coordinates
    pub location: Point<f64>,
}

/// Odd window side for peak detection: `max(5, floor(500 / pixel))`, made odd.
pub fn peak_window_size(pixel_size: f64) -> usize {
    let ratio = PEAK_SEARCH_M / pixel_size;
    let size = if ratio.is_finite() && ratio > 5.0 {
        ratio.floor() as usize
    } else {
        5
    };
    if size % 2 == 0 { size + 1 } else { size }
}

/// Finite cells equal to the maximum of their peak window.
///
/// Flat plateaus report every cell as a peak; the enclosure search discards
/// those with too little relief.
pub fn detect_peaks(grid: &ElevationGrid) -> Result<Vec<Peak>> {
    let stats = grid.require_finite()?;
    let size = peak_window_size(grid.pixel_size_m());
    let maxima = window_maximum(&grid.filled(stats.min), size)?;
    let transform = grid.transform();

    let peaks: Vec<Peak> = grid
        .data()
        .indexed_iter()
        .filter(|&((row, col), z)| z.is_finite() && *z == maxima[(row, col)])
        .map(|((row, col), &elevation)| {
            let (x, y) = transform.pixel_to_geo(col, row);
            Peak {
                row,
                col,
                elevation,
                location: Point::new(x, y),
            }
        })
        .collect();

    tracing::debug!("Found {} peaks with a {}x{} window", peaks.len(), size, size);
    Ok(peaks)
}
