//! The two competing delineations
//!
//! - **OLD**: slope threshold, exclusion, gap bridging and foothill buffer
//! - **NEW**: local relief threshold, measured by the windowed-minimum filter
//!   or by contour enclosure, followed by proximity clustering

mod new;
mod old;

pub use new::{compute_new_delineation, NewDelineation};
pub use old::{compute_old_delineation, OldDelineation};
