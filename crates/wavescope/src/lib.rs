//! wavescope: an interactive playback viewer for volumetric slice datasets.
//!
//! A dataset is a headerless little-endian `f32` file holding, per frame, six
//! `N x N` slices: three orthogonal main slices (X, Y, Z) of a scalar field and
//! three ghost slices of a secondary field. The viewer turns each slice into a
//! height-field mesh, colors it through a transfer function and plays the
//! frames back at a fixed rate.
//!
//! # Quick Start
//!
//! ```no_run
//! use wavescope::*;
//!
//! fn main() -> std::result::Result<(), ViewerError> {
//!     let config = ViewerConfig::new("frames.bin", 120).with_title("tunneling");
//!     show(config)
//! }
//! ```
//!
//! # Layers
//!
//! - [`wavescope_core`]: dataset layout and loading, transfer function, playback
//! - [`wavescope_structures`]: slice height-field meshes
//! - [`wavescope_render`]: wgpu engine and camera
//! - [`wavescope_ui`]: egui control panel
//!
//! [`QuantumViewer`] ties them together without a window and is what the
//! integration tests drive.

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
// Pointer deltas and frame sizes convert between f64/f32/u32 routinely
#![allow(clippy::cast_possible_truncation)]

mod app;
pub mod error;
pub mod viewer;

pub use error::ViewerError;
pub use viewer::{LoadState, QuantumViewer};

// Re-export core types
pub use wavescope_core::{
    Colormap, Dataset, FrameBuffer, FrameLayout, HeightMode, ParameterRanges, Playback,
    PlaybackState, Result, SliceAxis, SliceId, SliceKind, TransferParams, ViewerConfig,
    ViewerOptions, WavescopeError, GRID_SIZE, SLICES_PER_FRAME, Vec2, Vec3, Vec4,
};
pub use wavescope_core::frame_store::{encode_frames, load as load_dataset};

// Re-export structures and render types
pub use wavescope_render::{Camera, RenderEngine};
pub use wavescope_structures::{SliceGrid, SliceSet};

/// Opens the viewer window for `config` and blocks until it closes.
///
/// The dataset loads in the background; the window shows a loading state
/// until it is ready, and the failure message if it cannot be read.
pub fn show(config: ViewerConfig) -> std::result::Result<(), ViewerError> {
    let _ = env_logger::try_init();
    log::info!("wavescope starting: {}", config.title);
    app::run_app(config)
}
