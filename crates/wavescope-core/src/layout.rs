//! Binary dataset layout: frames, slices, and offsets.
//!
//! A dataset is a headerless sequence of `f32` samples. Each frame holds six
//! `N x N` slices in a fixed order:
//!
//! | index | slice   |
//! |-------|---------|
//! | 0     | main X  |
//! | 1     | main Y  |
//! | 2     | main Z  |
//! | 3     | ghost X |
//! | 4     | ghost Y |
//! | 5     | ghost Z |
//!
//! Within a slice, samples are flattened column-major: sample `(row, col)` lives
//! at `col * N + row`.

use std::ops::Range;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::{Result, WavescopeError};

/// Default number of samples per grid side.
pub const GRID_SIZE: usize = 50;

/// Number of slices stored per frame.
pub const SLICES_PER_FRAME: usize = 6;

/// Axis normal to a slice plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SliceAxis {
    X,
    Y,
    Z,
}

impl SliceAxis {
    /// All axes in storage order.
    pub const ALL: [SliceAxis; 3] = [SliceAxis::X, SliceAxis::Y, SliceAxis::Z];

    /// Unit normal of the slice plane.
    #[must_use]
    pub fn normal(self) -> Vec3 {
        match self {
            SliceAxis::X => Vec3::X,
            SliceAxis::Y => Vec3::Y,
            SliceAxis::Z => Vec3::Z,
        }
    }

    /// Maps in-plane coordinates `(u, v)` and a height along the normal to world space.
    ///
    /// `u` follows the row direction and `v` the column direction of the slice.
    #[must_use]
    pub fn place(self, u: f32, v: f32, height: f32) -> Vec3 {
        match self {
            SliceAxis::X => Vec3::new(height, u, v),
            SliceAxis::Y => Vec3::new(u, height, v),
            SliceAxis::Z => Vec3::new(u, v, height),
        }
    }

    /// Display name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            SliceAxis::X => "X",
            SliceAxis::Y => "Y",
            SliceAxis::Z => "Z",
        }
    }
}

/// Whether a slice is the primary sample or the ghost overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SliceKind {
    Main,
    Ghost,
}

/// Identifies one of the six slices of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SliceId {
    pub kind: SliceKind,
    pub axis: SliceAxis,
}

impl SliceId {
    /// All slices in storage order.
    pub const ALL: [SliceId; SLICES_PER_FRAME] = [
        SliceId::main(SliceAxis::X),
        SliceId::main(SliceAxis::Y),
        SliceId::main(SliceAxis::Z),
        SliceId::ghost(SliceAxis::X),
        SliceId::ghost(SliceAxis::Y),
        SliceId::ghost(SliceAxis::Z),
    ];

    /// Main slice along `axis`.
    #[must_use]
    pub const fn main(axis: SliceAxis) -> Self {
        Self {
            kind: SliceKind::Main,
            axis,
        }
    }

    /// Ghost slice along `axis`.
    #[must_use]
    pub const fn ghost(axis: SliceAxis) -> Self {
        Self {
            kind: SliceKind::Ghost,
            axis,
        }
    }

    /// Position of this slice within a frame.
    #[must_use]
    pub fn index(self) -> usize {
        let base = match self.kind {
            SliceKind::Main => 0,
            SliceKind::Ghost => 3,
        };
        let axis = match self.axis {
            SliceAxis::X => 0,
            SliceAxis::Y => 1,
            SliceAxis::Z => 2,
        };
        base + axis
    }

    /// Inverse of [`SliceId::index`].
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Returns true for ghost slices.
    #[must_use]
    pub fn is_ghost(self) -> bool {
        self.kind == SliceKind::Ghost
    }

    /// Display label, e.g. `"main X"`.
    #[must_use]
    pub fn label(self) -> String {
        let kind = match self.kind {
            SliceKind::Main => "main",
            SliceKind::Ghost => "ghost",
        };
        format!("{kind} {}", self.axis.name())
    }
}

/// Shape of a frame dataset, supplied out-of-band by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameLayout {
    grid_size: usize,
    frame_count: usize,
}

impl FrameLayout {
    /// Creates a layout for `frame_count` frames of `grid_size x grid_size` slices.
    pub fn new(grid_size: usize, frame_count: usize) -> Result<Self> {
        if grid_size < 2 {
            return Err(WavescopeError::InvalidGridSize(grid_size));
        }
        Ok(Self {
            grid_size,
            frame_count,
        })
    }

    /// Samples per grid side (`N`).
    #[must_use]
    pub fn grid_size(&self) -> usize {
        self.grid_size
    }

    /// Number of frames described by this layout.
    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    /// Samples per slice (`N * N`).
    #[must_use]
    pub fn slice_len(&self) -> usize {
        self.grid_size * self.grid_size
    }

    /// Samples per frame (`6 * N * N`).
    #[must_use]
    pub fn frame_len(&self) -> usize {
        SLICES_PER_FRAME * self.slice_len()
    }

    /// Minimum buffer length holding every frame.
    #[must_use]
    pub fn required_len(&self) -> usize {
        self.frame_count * self.frame_len()
    }

    /// Flat offset of the first sample of `slice_index` in `frame`.
    pub fn offset(&self, frame: usize, slice_index: usize) -> Result<usize> {
        if frame >= self.frame_count {
            return Err(WavescopeError::FrameOutOfRange {
                frame,
                frame_count: self.frame_count,
            });
        }
        if slice_index >= SLICES_PER_FRAME {
            return Err(WavescopeError::SliceOutOfRange(slice_index));
        }
        Ok(frame * self.frame_len() + slice_index * self.slice_len())
    }

    /// Half-open sample range of a slice.
    pub fn slice_range(&self, frame: usize, slice: SliceId) -> Result<Range<usize>> {
        let start = self.offset(frame, slice.index())?;
        Ok(start..start + self.slice_len())
    }

    /// Number of complete frames available in a buffer of `available_len` floats,
    /// capped at the declared frame count.
    #[must_use]
    pub fn playable_frames(&self, available_len: usize) -> usize {
        self.frame_count.min(available_len / self.frame_len())
    }

    /// Returns a copy with the frame count replaced.
    #[must_use]
    pub fn with_frame_count(self, frame_count: usize) -> Self {
        Self {
            frame_count,
            ..self
        }
    }

    /// Column-major vertex index of grid sample `(row, col)`.
    #[must_use]
    pub fn vertex_index(&self, row: usize, col: usize) -> usize {
        vertex_index(self.grid_size, row, col)
    }
}

/// Column-major vertex index `col * n + row`.
///
/// This is the flattening used by the dataset producer; mesh vertices must use
/// the same mapping or samples land on the wrong vertex.
#[must_use]
pub fn vertex_index(n: usize, row: usize, col: usize) -> usize {
    col * n + row
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_offsets_for_reference_shape() {
        let layout = FrameLayout::new(GRID_SIZE, 2).unwrap();
        assert_eq!(layout.slice_len(), 2500);
        assert_eq!(layout.frame_len(), 15_000);
        assert_eq!(layout.required_len(), 30_000);
        assert_eq!(layout.offset(0, 0).unwrap(), 0);
        assert_eq!(layout.offset(0, 3).unwrap(), 7_500);
        assert_eq!(layout.offset(1, 2).unwrap(), 20_000);
    }

    #[test]
    fn test_offset_rejects_out_of_range() {
        let layout = FrameLayout::new(GRID_SIZE, 2).unwrap();
        assert!(matches!(
            layout.offset(2, 0),
            Err(WavescopeError::FrameOutOfRange {
                frame: 2,
                frame_count: 2
            })
        ));
        assert!(matches!(
            layout.offset(0, 6),
            Err(WavescopeError::SliceOutOfRange(6))
        ));
    }

    #[test]
    fn test_invalid_grid_size() {
        assert!(matches!(
            FrameLayout::new(1, 4),
            Err(WavescopeError::InvalidGridSize(1))
        ));
    }

    #[test]
    fn test_slice_id_round_trip_order() {
        for (i, id) in SliceId::ALL.iter().enumerate() {
            assert_eq!(id.index(), i);
            assert_eq!(SliceId::from_index(i), Some(*id));
        }
        assert_eq!(SliceId::from_index(6), None);
        assert!(SliceId::ghost(SliceAxis::Y).is_ghost());
        assert_eq!(SliceId::ghost(SliceAxis::Y).label(), "ghost Y");
    }

    #[test]
    fn test_playable_frames_clamps() {
        let layout = FrameLayout::new(4, 10).unwrap();
        let frame_len = layout.frame_len();
        assert_eq!(layout.playable_frames(frame_len * 10), 10);
        assert_eq!(layout.playable_frames(frame_len * 12), 10);
        assert_eq!(layout.playable_frames(frame_len * 3 + 5), 3);
        assert_eq!(layout.playable_frames(frame_len - 1), 0);
    }

    #[test]
    fn test_place_puts_height_on_normal() {
        let p = SliceAxis::X.place(1.0, 2.0, 0.5);
        assert_eq!(p, Vec3::new(0.5, 1.0, 2.0));
        let p = SliceAxis::Y.place(1.0, 2.0, 0.5);
        assert_eq!(p.y, 0.5);
        let p = SliceAxis::Z.place(1.0, 2.0, 0.5);
        assert_eq!(p.z, 0.5);
    }

    #[test]
    fn test_vertex_index_is_bijection_for_reference_grid() {
        let n = GRID_SIZE;
        let mut seen = vec![false; n * n];
        for col in 0..n {
            for row in 0..n {
                let idx = vertex_index(n, row, col);
                assert!(!seen[idx], "index {idx} visited twice");
                seen[idx] = true;
            }
        }
        assert!(seen.iter().all(|&s| s));
    }

    proptest! {
        #[test]
        fn prop_offsets_injective_and_in_bounds(
            n in 2usize..12,
            frame_count in 1usize..6,
        ) {
            let layout = FrameLayout::new(n, frame_count).unwrap();
            let mut offsets = Vec::new();
            for frame in 0..frame_count {
                for slice in 0..SLICES_PER_FRAME {
                    let off = layout.offset(frame, slice).unwrap();
                    prop_assert!(off < layout.required_len());
                    prop_assert!(off + layout.slice_len() <= layout.required_len());
                    offsets.push(off);
                }
            }
            let total = offsets.len();
            offsets.sort_unstable();
            offsets.dedup();
            prop_assert_eq!(offsets.len(), total);
        }

        #[test]
        fn prop_vertex_index_bijection(n in 2usize..64) {
            let mut seen = vec![0u8; n * n];
            for col in 0..n {
                for row in 0..n {
                    seen[vertex_index(n, row, col)] += 1;
                }
            }
            prop_assert!(seen.iter().all(|&c| c == 1));
        }
    }
}
