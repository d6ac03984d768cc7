//! # Ridgeline Algorithms
//!
//! Raster-to-vector delineation of a mountain range under two rule sets,
//! and the statistics that compare them.
//!
//! ## Modules
//!
//! - **terrain**: slope, local relief, windowed min/max filters, peaks
//! - **morphology**: binary dilation, erosion and closing
//! - **classify**: thresholds, exclusion and distance-based morphology
//! - **polygonize**: mask to polygons, repair and dissolve
//! - **contour**: closed contours and contour-enclosure hill footprints
//! - **vector**: proximity clustering, clipping and the envelope index
//! - **statistics**: areas, per-region tables, distances, elevation summaries
//! - **methods**: the OLD and NEW delineations
//! - **pipeline**: a full single-region comparison run

pub mod classify;
pub mod config;
pub mod contour;
pub(crate) mod maybe_rayon;
pub mod methods;
pub mod morphology;
pub mod pipeline;
pub mod polygonize;
pub mod statistics;
pub mod terrain;
pub mod vector;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::classify::Exclusion;
    pub use crate::config::{AnalysisConfig, NewMethod, NewParams, OldParams};
    pub use crate::methods::{
        compute_new_delineation, compute_old_delineation, NewDelineation, OldDelineation,
    };
    pub use crate::pipeline::{run_analysis, AnalysisOutcome, AnalysisReport, RunMetadata};
    pub use crate::statistics::{
        elevation_profile, nearest_neighbor_distances, per_region_stats, summarize_elevation,
        total_area_km2, AnalysisSummary, DistanceRecord, DistanceSummary, ElevationProfile,
        ElevationSummary, RegionStats,
    };
    pub use crate::terrain::{local_relief, slope_degrees, LocalRelief, Slope};
    pub use ridgeline_core::prelude::*;
}
