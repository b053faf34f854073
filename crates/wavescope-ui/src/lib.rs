//! UI layer for wavescope using egui.

pub mod integration;
pub mod panels;

pub use integration::EguiIntegration;
pub use panels::*;
