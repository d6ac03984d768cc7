//! Raster data structures

mod elevation;
mod geotransform;
mod grid;
mod mask;

pub use elevation::{ElevationGrid, FiniteStats};
pub use geotransform::GeoTransform;
pub use grid::Raster;
pub use mask::TerrainMask;
