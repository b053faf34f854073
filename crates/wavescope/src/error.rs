//! Errors surfaced by the windowed viewer.

use thiserror::Error;
use wavescope_core::WavescopeError;
use wavescope_render::RenderError;

/// Fatal errors from [`crate::show`].
#[derive(Error, Debug)]
pub enum ViewerError {
    /// Dataset or configuration error.
    #[error(transparent)]
    Core(#[from] WavescopeError),

    /// GPU initialization or surface error.
    #[error(transparent)]
    Render(#[from] RenderError),

    /// The window could not be created.
    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),

    /// The event loop could not be created or exited with an error.
    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
}
