//! Binary morphology on terrain masks
//!
//! - **Dilation**: grows true regions by one element step per iteration
//! - **Erosion**: shrinks true regions; cells outside the grid count as false
//! - **Closing**: n dilations then n erosions, bridging gaps narrower than 2n

mod closing;
mod dilate;
mod element;
mod erode;

pub use closing::{closing, Closing, ClosingParams};
pub use dilate::{dilate, Dilate, DilateParams};
pub use element::StructuringElement;
pub use erode::erode;
