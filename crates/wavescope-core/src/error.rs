//! Error types for wavescope.

use thiserror::Error;

/// The main error type for wavescope data-pipeline operations.
#[derive(Error, Debug)]
pub enum WavescopeError {
    /// A frame index past the end of the playable range.
    #[error("frame {frame} out of range (frame count {frame_count})")]
    FrameOutOfRange { frame: usize, frame_count: usize },

    /// A slice index outside the six slices of a frame.
    #[error("slice index {0} out of range (expected 0..6)")]
    SliceOutOfRange(usize),

    /// The grid dimension cannot form a triangulated slice.
    #[error("invalid grid size {0}: need at least 2 samples per side")]
    InvalidGridSize(usize),

    /// The dataset contained no samples.
    #[error("dataset is empty")]
    EmptyDataset,

    /// The dataset does not hold a single complete frame.
    #[error("dataset too short: {available} floats, one frame needs {frame_len}")]
    DatasetTooShort { available: usize, frame_len: usize },

    /// A slice read would run past the end of the buffer.
    #[error("dataset truncated: slice ends at {end}, buffer holds {len} floats")]
    DatasetTruncated { end: usize, len: usize },

    /// Data size mismatch.
    #[error("data size mismatch: expected {expected}, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    /// The background loader went away without producing a result.
    #[error("dataset loader for '{0}' disconnected")]
    LoaderDisconnected(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// A specialized Result type for wavescope operations.
pub type Result<T> = std::result::Result<T, WavescopeError>;
