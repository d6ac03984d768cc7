//! Terrain metrics derived from elevation grids
//!
//! - **Slope**: gradient magnitude in degrees
//! - **Local relief**: elevation above the windowed local minimum
//! - **Peaks**: windowed local maxima
//! - **Window filters**: shared square min/max filters

mod filters;
mod peaks;
mod relief;
mod slope;

pub use filters::{window_maximum, window_minimum};
pub use peaks::{detect_peaks, peak_window_size, Peak};
pub use relief::{local_relief, relief_window_size, LocalRelief, LocalReliefParams};
pub use slope::{slope_degrees, Slope};
