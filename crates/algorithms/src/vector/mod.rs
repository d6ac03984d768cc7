//! Vector operations on delineation layers
//!
//! - Buffer: circles and proximity clustering by outward-then-inward buffering
//! - Clip: intersect a layer with a region boundary
//! - Spatial: envelope R-tree used by enclosure and distance searches

mod buffer;
mod clip;
mod spatial;

pub use buffer::{circle, cluster_by_proximity};
pub use clip::{clip_to_region, explode};
pub use spatial::{envelope_of, EnvelopeIndex};
