//! Core data pipeline for wavescope.
//!
//! This crate provides the windowless parts of the slice viewer:
//! - [`FrameLayout`] offsets into the flat binary dataset
//! - [`FrameBuffer`] / [`Dataset`] loading and validation, with a cancellable background loader
//! - [`TransferParams`] mapping density samples to height and color
//! - [`Playback`] frame cursor and fixed-interval scheduler
//! - [`ViewerConfig`] / [`ViewerOptions`] configuration

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
// Builder patterns return Self which doesn't need must_use
#![allow(clippy::must_use_candidate)]
// Grid indices and frame rates convert between usize/u32/f32 routinely
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

pub mod colormap;
pub mod error;
pub mod frame_store;
pub mod layout;
pub mod options;
pub mod playback;
pub mod transfer;

pub use colormap::{hot_color, Colormap};
pub use error::{Result, WavescopeError};
pub use frame_store::{encode_frames, Dataset, FrameBuffer, LoadPoll, PendingLoad};
pub use layout::{
    vertex_index, FrameLayout, SliceAxis, SliceId, SliceKind, GRID_SIZE, SLICES_PER_FRAME,
};
pub use options::{ParamRange, ParameterRanges, ViewerConfig, ViewerOptions};
pub use playback::{Playback, PlaybackState};
pub use transfer::{HeightMode, TransferParams};

// Re-export glam types for convenience
pub use glam::{Vec2, Vec3, Vec4};
