//! Spatial statistics over delineation layers
//!
//! - **Area**: planar area totals and the OLD/NEW summary
//! - **Regions**: per-district area table
//! - **Distance**: nearest-neighbour gaps between landform parts
//! - **Elevation**: descriptive statistics of DEM values
//! - **Profile**: elevations sampled along a transect

mod area;
mod distance;
mod elevation;
mod profile;
mod regions;

pub use area::{round_to, total_area_km2, AnalysisSummary};
pub use distance::{nearest_neighbor_distances, DistanceRecord, DistanceSummary};
pub use elevation::{elevation_within, summarize_elevation, ElevationSummary};
pub use profile::{elevation_profile, ElevationProfile, ProfileSample};
pub use regions::{per_region_stats, RegionStats};
