//! Single-region comparison run
//!
//! OLD, then NEW, then statistics, strictly in sequence. Fatal errors abort
//! the run; empty layers and method fallbacks are reported through logs and
//! the run metadata.

use crate::classify::Exclusion;
use crate::config::AnalysisConfig;
use crate::methods::{compute_new_delineation, compute_old_delineation};
use crate::statistics::{
    nearest_neighbor_distances, per_region_stats, summarize_elevation, AnalysisSummary,
    DistanceRecord, DistanceSummary, ElevationSummary, RegionStats,
};
use ridgeline_core::metadata::LegalStatus;
use ridgeline_core::raster::ElevationGrid;
use ridgeline_core::vector::{Layer, LayerTag, RegionBoundary};
use ridgeline_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Provenance of one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMetadata {
    pub config: AnalysisConfig,
    /// Tag of the NEW layer actually produced (differs from the requested
    /// method after a fallback)
    pub new_layer: LayerTag,
    pub pixel_size_m: f64,
    pub crs: String,
    pub regions: Vec<String>,
    pub exclusion_applied: bool,
    pub legal_status: LegalStatus,
}

/// Everything a run produces
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub old: Layer,
    pub new: Layer,
    pub regions: Vec<RegionStats>,
    pub distances: Vec<DistanceRecord>,
    pub distance_summary: Option<DistanceSummary>,
    pub summary: AnalysisSummary,
    pub elevation: ElevationSummary,
    pub metadata: RunMetadata,
}

/// Serializable view of an [`AnalysisOutcome`] without geometry
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport<'a> {
    pub metadata: &'a RunMetadata,
    pub summary: &'a AnalysisSummary,
    pub elevation: &'a ElevationSummary,
    pub old_parts: usize,
    pub new_parts: usize,
    pub regions: &'a [RegionStats],
    pub distance_summary: Option<&'a DistanceSummary>,
    pub distances: &'a [DistanceRecord],
}

impl AnalysisOutcome {
    pub fn report(&self) -> AnalysisReport<'_> {
        AnalysisReport {
            metadata: &self.metadata,
            summary: &self.summary,
            elevation: &self.elevation,
            old_parts: self.old.part_count(),
            new_parts: self.new.part_count(),
            regions: &self.regions,
            distance_summary: self.distance_summary.as_ref(),
            distances: &self.distances,
        }
    }
}

/// Run both delineations on `grid` and compare them over `regions`.
pub fn run_analysis(
    grid: &ElevationGrid,
    exclusion: &Exclusion,
    regions: &[RegionBoundary],
    config: &AnalysisConfig,
) -> Result<AnalysisOutcome> {
    config.validate()?;
    grid.require_finite()?;

    let crs = grid.crs().clone();
    if crs.is_geographic() {
        return Err(Error::GeographicCrs(crs.identifier()));
    }

    let (rows, cols) = grid.shape();
    tracing::info!(
        "Analysing {}x{} grid at {:.1} m ({})",
        rows,
        cols,
        grid.pixel_size_m(),
        crs.identifier()
    );
    if config.legal_status.new_definition_in_abeyance() {
        tracing::info!("{}", config.legal_status.disclaimer());
    }

    let old = compute_old_delineation(grid, exclusion, &config.old)?;
    let new = compute_new_delineation(grid, &config.new)?;

    let region_stats = per_region_stats(&old, &new, regions, &crs)?;
    let summary = AnalysisSummary::from_layers(&old, &new)?;
    tracing::info!(
        "OLD {:.2} km², NEW {:.2} km² ({:+.1}%)",
        summary.old_km2,
        summary.new_km2,
        summary.change_pct
    );

    let distances = nearest_neighbor_distances(&new.geometry, config.max_distance_m);
    let distance_summary = DistanceSummary::from_records(&distances);
    let elevation = summarize_elevation(grid)?;

    let metadata = RunMetadata {
        config: config.clone(),
        new_layer: new.tag,
        pixel_size_m: grid.pixel_size_m(),
        crs: crs.identifier(),
        regions: regions.iter().map(|r| r.name.clone()).collect(),
        exclusion_applied: !exclusion.is_absent(),
        legal_status: config.legal_status.clone(),
    };

    Ok(AnalysisOutcome {
        old,
        new,
        regions: region_stats,
        distances,
        distance_summary,
        summary,
        elevation,
        metadata,
    })
}
