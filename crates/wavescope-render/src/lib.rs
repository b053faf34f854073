//! Rendering backend for wavescope.
//!
//! This crate provides the wgpu-based rendering engine, including:
//! - Device, surface and depth-buffer management
//! - Slice mesh GPU buffers and the WGSL slice shader
//! - The orbit camera

#![allow(clippy::missing_errors_doc)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]

pub mod camera;
pub mod engine;
pub mod error;
pub mod slice_render;

pub use camera::Camera;
pub use engine::{CameraUniforms, FrameTarget, RenderEngine};
pub use error::{RenderError, RenderResult};
pub use slice_render::{pack_vertices, SliceMeshRenderData, SliceUniforms, SliceVertex};
