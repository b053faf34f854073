//! The six slice meshes drawn for one frame.

use glam::Vec3;
use wavescope_core::{Dataset, Result, SliceAxis, SliceId, TransferParams, ViewerOptions};

use crate::slice_grid::SliceGrid;

/// Main and ghost meshes for every slice of a frame, in storage order.
#[derive(Debug, Clone)]
pub struct SliceSet {
    grids: Vec<SliceGrid>,
    frame: Option<usize>,
}

impl SliceSet {
    /// Builds the three main grids once and clones each as a ghost overlay.
    #[must_use]
    pub fn new(grid_size: usize, extent: f32, ghost_offset: f32, ghost_color: Vec3) -> Self {
        let mains: Vec<SliceGrid> = SliceAxis::ALL
            .iter()
            .map(|&axis| SliceGrid::new(axis, grid_size, extent))
            .collect();
        let ghosts: Vec<SliceGrid> = mains
            .iter()
            .map(|g| g.clone_as_ghost(ghost_offset, ghost_color))
            .collect();

        let mut grids = mains;
        grids.extend(ghosts);
        Self { grids, frame: None }
    }

    /// Builds a slice set from viewer options.
    #[must_use]
    pub fn from_options(options: &ViewerOptions) -> Self {
        Self::new(
            options.grid_size,
            options.slice_extent,
            options.ghost_depth_offset,
            options.ghost_color,
        )
    }

    /// Recomputes every slice for `frame` with one parameter snapshot.
    ///
    /// On error no grid is left partially updated from a different frame: the
    /// slice reads are validated before any mesh is touched.
    pub fn update_frame(
        &mut self,
        dataset: &Dataset,
        frame: usize,
        params: &TransferParams,
    ) -> Result<()> {
        let slices = SliceId::ALL
            .iter()
            .map(|&id| dataset.slice(frame, id))
            .collect::<Result<Vec<_>>>()?;

        for (grid, values) in self.grids.iter_mut().zip(slices) {
            grid.update(values, params)?;
        }
        self.frame = Some(frame);
        log::trace!("slice set updated to frame {frame}");
        Ok(())
    }

    /// Frame most recently applied.
    #[must_use]
    pub fn frame(&self) -> Option<usize> {
        self.frame
    }

    /// Grid for a given slice.
    #[must_use]
    pub fn grid(&self, id: SliceId) -> &SliceGrid {
        &self.grids[id.index()]
    }

    /// All grids with their slice ids.
    pub fn iter(&self) -> impl Iterator<Item = (SliceId, &SliceGrid)> {
        SliceId::ALL.iter().copied().zip(self.grids.iter())
    }

    /// All grids, mutably.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (SliceId, &mut SliceGrid)> {
        SliceId::ALL.iter().copied().zip(self.grids.iter_mut())
    }

    /// Main slices only.
    pub fn mains(&self) -> impl Iterator<Item = &SliceGrid> {
        self.grids.iter().filter(|g| !g.is_ghost())
    }

    /// Ghost slices only.
    pub fn ghosts(&self) -> impl Iterator<Item = &SliceGrid> {
        self.grids.iter().filter(|g| g.is_ghost())
    }

    /// Bounding box over every grid.
    #[must_use]
    pub fn bounding_box(&self) -> (Vec3, Vec3) {
        self.grids.iter().map(SliceGrid::bounding_box).fold(
            (Vec3::splat(f32::MAX), Vec3::splat(f32::MIN)),
            |(min, max), (lo, hi)| (min.min(lo), max.max(hi)),
        )
    }
}
