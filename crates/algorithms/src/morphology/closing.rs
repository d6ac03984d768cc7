//! Binary closing (dilation followed by erosion)
//!
//! Bridges gaps up to `2 * iterations` cells wide between true regions while
//! keeping their outer outline roughly in place.

use ridgeline_core::raster::TerrainMask;
use ridgeline_core::{Algorithm, Error, Result};

use super::dilate::dilate;
use super::element::StructuringElement;
use super::erode::erode;

/// Parameters for binary closing
#[derive(Debug, Clone)]
pub struct ClosingParams {
    pub element: StructuringElement,
    pub iterations: usize,
}

impl Default for ClosingParams {
    fn default() -> Self {
        Self {
            element: StructuringElement::Cross,
            iterations: 1,
        }
    }
}

/// Closing algorithm
#[derive(Debug, Clone, Default)]
pub struct Closing;

impl Algorithm for Closing {
    type Input = TerrainMask;
    type Output = TerrainMask;
    type Params = ClosingParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Closing"
    }

    fn description(&self) -> &'static str {
        "Binary closing (dilation then erosion) to bridge small gaps"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        closing(&input, params.element, params.iterations)
    }
}

/// `iterations` dilations then `iterations` erosions. Zero iterations is a no-op.
pub fn closing(
    mask: &TerrainMask,
    element: StructuringElement,
    iterations: usize,
) -> Result<TerrainMask> {
    if iterations == 0 {
        return Ok(mask.clone());
    }
    let dilated = dilate(mask, element, iterations)?;
    erode(&dilated, element, iterations)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_bars(gap: usize) -> TerrainMask {
        // Two vertical bars 3 px wide, `gap` px apart, away from the border
        let cols = 12 + gap;
        let mut mask = TerrainMask::filled(12, cols, false);
        for r in 3..9 {
            for c in 3..6 {
                mask.set(r, c, true).unwrap();
                mask.set(r, c + 3 + gap, true).unwrap();
            }
        }
        mask
    }

    #[test]
    fn test_closing_bridges_narrow_gap() {
        let mask = two_bars(2);
        let result = closing(&mask, StructuringElement::Cross, 1).unwrap();
        assert!(result.get(5, 6).unwrap());
        assert!(result.get(5, 7).unwrap());
    }

    #[test]
    fn test_closing_keeps_wide_gap() {
        let mask = two_bars(6);
        let result = closing(&mask, StructuringElement::Cross, 1).unwrap();
        assert!(!result.get(5, 8).unwrap());
        assert_eq!(result.count_true(), mask.count_true());
    }

    #[test]
    fn test_zero_iterations() {
        let mask = two_bars(2);
        assert_eq!(closing(&mask, StructuringElement::Cross, 0).unwrap(), mask);
    }
}
