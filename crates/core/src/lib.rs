//! # Ridgeline Core
//!
//! Core types, traits and DEM access for the Ridgeline delineation toolkit.
//!
//! This crate provides:
//! - `Raster<T>`: grid type with georeferencing, plus `ElevationGrid` and `TerrainMask`
//! - `GeoTransform`: affine pixel to projected mapping
//! - `CRS`: coordinate reference system identifiers
//! - Vector layer types produced by the delineation pipelines
//! - The `DemSource` capability with GeoTIFF and in-memory implementations
//! - Algorithm traits for a consistent API

pub mod crs;
pub mod error;
pub mod metadata;
pub mod raster;
pub mod source;
pub mod vector;

pub use crs::CRS;
pub use error::{Error, Result};
pub use metadata::LegalStatus;
pub use raster::{ElevationGrid, GeoTransform, Raster, TerrainMask};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::crs::CRS;
    pub use crate::error::{Error, Result};
    pub use crate::raster::{ElevationGrid, GeoTransform, Raster, TerrainMask};
    pub use crate::source::{Bounds, DemSource};
    pub use crate::vector::{Layer, LayerTag, RegionBoundary};
    pub use crate::Algorithm;
}

/// Core trait for the delineation stages.
///
/// Algorithms are pure functions that transform input data according to parameters.
pub trait Algorithm {
    /// Input type for the algorithm
    type Input;
    /// Output type for the algorithm
    type Output;
    /// Parameters controlling algorithm behavior
    type Params: Default;
    /// Error type for algorithm execution
    type Error: std::error::Error;

    /// Returns the algorithm name
    fn name(&self) -> &'static str;

    /// Returns a description of what the algorithm does
    fn description(&self) -> &'static str;

    /// Execute the algorithm
    fn execute(
        &self,
        input: Self::Input,
        params: Self::Params,
    ) -> std::result::Result<Self::Output, Self::Error>;

    /// Execute with default parameters
    fn execute_default(&self, input: Self::Input) -> std::result::Result<Self::Output, Self::Error> {
        self.execute(input, Self::Params::default())
    }
}
