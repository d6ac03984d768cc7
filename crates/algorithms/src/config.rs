//! Run configuration for the OLD and NEW delineations
//!
//! Every struct deserializes with per-field defaults, so a partial JSON
//! document (or none at all) yields the published parameter set.

use ridgeline_core::metadata::LegalStatus;
use ridgeline_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

fn require_positive(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(Error::Configuration(format!("{name} is missing or not a number")));
    }
    if value <= 0.0 {
        return Err(Error::Configuration(format!("{name} must be positive, got {value}")));
    }
    Ok(())
}

fn require_non_negative(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(Error::Configuration(format!("{name} must be >= 0, got {value}")));
    }
    Ok(())
}

/// Parameters of the slope-based OLD definition
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OldParams {
    /// Cells steeper than this (degrees) qualify
    pub slope_threshold_deg: f64,
    /// Outward buffer after gap bridging (metres)
    pub foothill_buffer_m: f64,
    /// Gaps narrower than about this are bridged (metres)
    pub gap_bridge_m: f64,
}

impl Default for OldParams {
    fn default() -> Self {
        Self {
            slope_threshold_deg: 3.0,
            foothill_buffer_m: 100.0,
            gap_bridge_m: 500.0,
        }
    }
}

impl OldParams {
    /// Positive slope threshold, non-negative buffer and gap distances
    pub fn validate(&self) -> Result<()> {
        require_positive("slope_threshold_deg", self.slope_threshold_deg)?;
        require_non_negative("foothill_buffer_m", self.foothill_buffer_m)?;
        require_non_negative("gap_bridge_m", self.gap_bridge_m)
    }
}

/// How local relief is measured for the NEW definition
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NewMethod {
    /// Elevation minus the windowed minimum; fast approximation
    #[default]
    Relief,
    /// Peak minus its lowest enclosing closed contour
    Contour,
}

impl NewMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            NewMethod::Relief => "relief",
            NewMethod::Contour => "contour",
        }
    }
}

impl fmt::Display for NewMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NewMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "relief" => Ok(NewMethod::Relief),
            "contour" => Ok(NewMethod::Contour),
            other => Err(Error::Configuration(format!(
                "unknown NEW method '{other}' (expected 'relief' or 'contour')"
            ))),
        }
    }
}

/// Parameters of the relief-based NEW definition
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewParams {
    pub method: NewMethod,
    /// Minimum local relief (metres)
    pub relief_threshold_m: f64,
    /// Neighbourhood radius of the relief filter (metres)
    pub relief_radius_m: f64,
    /// Contour spacing for the contour method (metres)
    pub contour_interval_m: f64,
    /// Clustering distance applied after the relief method (metres)
    pub relief_proximity_m: f64,
    /// Clustering distance applied after the contour method (metres)
    pub contour_proximity_m: f64,
}

impl Default for NewParams {
    fn default() -> Self {
        Self {
            method: NewMethod::Relief,
            relief_threshold_m: 100.0,
            relief_radius_m: 2000.0,
            contour_interval_m: 10.0,
            relief_proximity_m: 500.0,
            contour_proximity_m: 500.0,
        }
    }
}

impl NewParams {
    /// Relief parameters are always checked since the contour method can fall
    /// back to relief; contour parameters only when that method is selected.
    pub fn validate(&self) -> Result<()> {
        require_positive("relief_threshold_m", self.relief_threshold_m)?;
        require_positive("relief_radius_m", self.relief_radius_m)?;
        require_non_negative("relief_proximity_m", self.relief_proximity_m)?;
        if self.method == NewMethod::Contour {
            require_positive("contour_interval_m", self.contour_interval_m)?;
            require_non_negative("contour_proximity_m", self.contour_proximity_m)?;
        }
        Ok(())
    }

    /// Clustering distance for the layer a method produced
    pub fn proximity_for(&self, method: NewMethod) -> f64 {
        match method {
            NewMethod::Relief => self.relief_proximity_m,
            NewMethod::Contour => self.contour_proximity_m,
        }
    }
}

/// Everything one comparison run needs besides the data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub old: OldParams,
    pub new: NewParams,
    /// Search radius of the nearest-neighbour table (metres)
    pub max_distance_m: f64,
    pub legal_status: LegalStatus,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            old: OldParams::default(),
            new: NewParams::default(),
            max_distance_m: 10_000.0,
            legal_status: LegalStatus::default(),
        }
    }
}

impl AnalysisConfig {
    /// Validate both parameter sets and the nearest-neighbour search radius
    pub fn validate(&self) -> Result<()> {
        self.old.validate()?;
        self.new.validate()?;
        require_positive("max_distance_m", self.max_distance_m)
    }
}
