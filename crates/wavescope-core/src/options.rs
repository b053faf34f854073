//! Configuration options for the viewer.

use std::path::{Path, PathBuf};

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::layout::GRID_SIZE;
use crate::transfer::TransferParams;

/// Inclusive slider range for a floating-point parameter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParamRange {
    pub min: f32,
    pub max: f32,
}

impl ParamRange {
    /// Creates a range; bounds are swapped if given in the wrong order.
    #[must_use]
    pub fn new(min: f32, max: f32) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    /// Clamps `value` into the range. Non-finite values map to `min`.
    #[must_use]
    pub fn clamp(&self, value: f32) -> f32 {
        if value.is_finite() {
            value.clamp(self.min, self.max)
        } else {
            self.min
        }
    }
}

/// Slider ranges exposed by the control panel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParameterRanges {
    pub fps_min: u32,
    pub fps_max: u32,
    pub gamma: ParamRange,
    pub threshold: ParamRange,
    pub height_scale: ParamRange,
}

impl Default for ParameterRanges {
    fn default() -> Self {
        Self {
            fps_min: 10,
            fps_max: 60,
            gamma: ParamRange::new(0.1, 3.0),
            threshold: ParamRange::new(0.0, 1.0),
            height_scale: ParamRange::new(0.0, 40.0),
        }
    }
}

/// Dataset constants and viewer appearance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerOptions {
    /// Samples per grid side. Must match the dataset producer.
    pub grid_size: usize,

    /// World-space side length of each slice mesh.
    pub slice_extent: f32,

    /// Offset of ghost slices along the slice normal, avoiding z-fighting.
    pub ghost_depth_offset: f32,

    /// Fixed accent color of ghost slices.
    pub ghost_color: Vec3,

    /// Initial frames per second.
    pub fps: u32,

    /// Initial transfer-function parameters.
    pub transfer: TransferParams,

    /// Slider ranges.
    pub ranges: ParameterRanges,

    /// Background color.
    pub background_color: Vec3,
}

impl Default for ViewerOptions {
    fn default() -> Self {
        Self {
            grid_size: GRID_SIZE,
            slice_extent: 10.0,
            ghost_depth_offset: 0.02,
            ghost_color: Vec3::new(0.25, 0.85, 1.0),
            fps: 24,
            transfer: TransferParams::default(),
            ranges: ParameterRanges::default(),
            background_color: Vec3::new(0.02, 0.02, 0.03),
        }
    }
}

/// Everything needed to open one viewer instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewerConfig {
    /// Path of the binary frame dataset.
    pub dataset_path: PathBuf,

    /// Number of frames the dataset is expected to hold.
    pub frame_count: usize,

    /// Viewport height in logical pixels.
    #[serde(default = "default_display_height")]
    pub display_height: u32,

    /// Window title.
    #[serde(default = "default_title")]
    pub title: String,

    #[serde(default)]
    pub options: ViewerOptions,
}

fn default_display_height() -> u32 {
    800
}

fn default_title() -> String {
    "wavescope".to_string()
}

impl ViewerConfig {
    /// Creates a config with default options.
    pub fn new(dataset_path: impl Into<PathBuf>, frame_count: usize) -> Self {
        Self {
            dataset_path: dataset_path.into(),
            frame_count,
            display_height: default_display_height(),
            title: default_title(),
            options: ViewerOptions::default(),
        }
    }

    /// Sets the viewport height.
    #[must_use]
    pub fn with_display_height(mut self, height: u32) -> Self {
        self.display_height = height;
        self
    }

    /// Sets the window title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Reads a config from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Writes this config as pretty-printed JSON.
    pub fn save_json_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path, text)?;
        Ok(())
    }
}
