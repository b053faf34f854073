//! Slice mesh structures for wavescope.
//!
//! - [`SliceGrid`] - a column-major heightfield mesh for one slice orientation
//! - [`SliceSet`] - the three main slices and their ghost overlays for a frame

#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]

pub mod slice_grid;
pub mod slice_set;

pub use slice_grid::SliceGrid;
pub use slice_set::SliceSet;
