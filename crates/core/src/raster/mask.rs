//! Boolean classification masks

use crate::error::Result;
use crate::raster::Raster;

/// Boolean grid aligned with its source elevation grid.
pub type TerrainMask = Raster<bool>;

impl Raster<bool> {
    /// Number of true cells
    pub fn count_true(&self) -> usize {
        self.data().iter().filter(|&&v| v).count()
    }

    pub fn is_all_false(&self) -> bool {
        !self.data().iter().any(|&v| v)
    }

    /// In-place `self &= !other`
    pub fn and_not(&mut self, other: &TerrainMask) -> Result<()> {
        self.ensure_same_shape(other)?;
        self.data_mut()
            .zip_mut_with(other.data(), |a, &b| *a = *a && !b);
        Ok(())
    }

    /// In-place `self &= other`
    pub fn and(&mut self, other: &TerrainMask) -> Result<()> {
        self.ensure_same_shape(other)?;
        self.data_mut().zip_mut_with(other.data(), |a, &b| *a = *a && b);
        Ok(())
    }
}
