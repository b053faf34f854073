//! Structured grid mesh for one slice orientation.
//!
//! Vertices are laid out column-major, `index = col * n + row`, matching the
//! flattening of the dataset so sample `i` always drives vertex `i`.

use glam::{Vec2, Vec3, Vec4};
use wavescope_core::{vertex_index, Result, SliceAxis, TransferParams, WavescopeError};

/// A heightfield mesh over an `n x n` slice.
#[derive(Debug, Clone)]
pub struct SliceGrid {
    axis: SliceAxis,
    grid_size: usize,
    /// In-plane coordinates, fixed at construction.
    plane_coords: Vec<Vec2>,
    /// Constant displacement along the slice normal (non-zero for ghosts).
    depth_offset: f32,
    /// Fixed color for ghost slices; `None` for main slices.
    ghost_color: Option<Vec3>,
    positions: Vec<Vec3>,
    normals: Vec<Vec3>,
    colors: Vec<Vec4>,
    triangles: Vec<[u32; 3]>,
    dirty: bool,
}

impl SliceGrid {
    /// Builds a flat grid of side `extent` centered at the origin.
    ///
    /// # Panics
    ///
    /// Panics if `grid_size < 2`; layouts reject such sizes before meshes are built.
    #[must_use]
    pub fn new(axis: SliceAxis, grid_size: usize, extent: f32) -> Self {
        assert!(grid_size >= 2, "slice grid needs at least 2 samples per side");

        let n = grid_size;
        let step = extent / (n - 1) as f32;
        let half = extent * 0.5;

        let mut plane_coords = vec![Vec2::ZERO; n * n];
        for col in 0..n {
            for row in 0..n {
                plane_coords[vertex_index(n, row, col)] =
                    Vec2::new(row as f32 * step - half, col as f32 * step - half);
            }
        }

        let positions = plane_coords
            .iter()
            .map(|uv| axis.place(uv.x, uv.y, 0.0))
            .collect();

        Self {
            axis,
            grid_size: n,
            plane_coords,
            depth_offset: 0.0,
            ghost_color: None,
            positions,
            normals: vec![axis.normal(); n * n],
            colors: vec![Vec4::new(0.0, 0.0, 0.0, 1.0); n * n],
            triangles: Self::triangulate(n),
            dirty: true,
        }
    }

    /// Two triangles per cell, connecting `(row, col)`, `(row + 1, col)`,
    /// `(row, col + 1)` and `(row + 1, col + 1)`.
    fn triangulate(n: usize) -> Vec<[u32; 3]> {
        let mut triangles = Vec::with_capacity(2 * (n - 1) * (n - 1));
        for col in 0..n - 1 {
            for row in 0..n - 1 {
                let a = vertex_index(n, row, col) as u32;
                let b = vertex_index(n, row + 1, col) as u32;
                let c = vertex_index(n, row, col + 1) as u32;
                let d = vertex_index(n, row + 1, col + 1) as u32;
                triangles.push([a, b, c]);
                triangles.push([b, d, c]);
            }
        }
        triangles
    }

    /// Clones this grid's topology as a ghost overlay.
    #[must_use]
    pub fn clone_as_ghost(&self, depth_offset: f32, color: Vec3) -> Self {
        let mut ghost = self.clone();
        ghost.depth_offset = depth_offset;
        ghost.ghost_color = Some(color);
        for (p, uv) in ghost.positions.iter_mut().zip(&ghost.plane_coords) {
            *p = ghost.axis.place(uv.x, uv.y, depth_offset);
        }
        ghost.dirty = true;
        ghost
    }

    /// Rewrites heights and colors from one slice of samples, then recomputes normals.
    pub fn update(&mut self, values: &[f32], params: &TransferParams) -> Result<()> {
        if values.len() != self.positions.len() {
            return Err(WavescopeError::SizeMismatch {
                expected: self.positions.len(),
                actual: values.len(),
            });
        }

        let samples = params.evaluate_slice(values, self.ghost_color);
        for (i, (height, color)) in samples.enumerate() {
            let uv = self.plane_coords[i];
            self.positions[i] = self.axis.place(uv.x, uv.y, height + self.depth_offset);
            self.colors[i] = color;
        }

        self.compute_vertex_normals();
        self.dirty = true;
        Ok(())
    }

    /// Area-weighted vertex normals from the current positions.
    fn compute_vertex_normals(&mut self) {
        self.normals.clear();
        self.normals.resize(self.positions.len(), Vec3::ZERO);

        for tri in &self.triangles {
            let [i0, i1, i2] = tri.map(|i| i as usize);
            let e1 = self.positions[i1] - self.positions[i0];
            let e2 = self.positions[i2] - self.positions[i0];
            // Cross product length is twice the area, which is the weight we want.
            let weighted = e1.cross(e2);
            self.normals[i0] += weighted;
            self.normals[i1] += weighted;
            self.normals[i2] += weighted;
        }

        let fallback = self.axis.normal();
        for normal in &mut self.normals {
            let n = normal.normalize_or_zero();
            *normal = if n == Vec3::ZERO { fallback } else { n };
        }
    }

    /// Returns and clears the dirty flag.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Returns whether GPU data is stale.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Slice orientation.
    #[must_use]
    pub fn axis(&self) -> SliceAxis {
        self.axis
    }

    /// Samples per side.
    #[must_use]
    pub fn grid_size(&self) -> usize {
        self.grid_size
    }

    /// Returns true for ghost overlays.
    #[must_use]
    pub fn is_ghost(&self) -> bool {
        self.ghost_color.is_some()
    }

    /// Constant offset along the normal.
    #[must_use]
    pub fn depth_offset(&self) -> f32 {
        self.depth_offset
    }

    /// Vertex positions.
    #[must_use]
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    /// Vertex normals.
    #[must_use]
    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    /// Vertex colors (RGBA).
    #[must_use]
    pub fn colors(&self) -> &[Vec4] {
        &self.colors
    }

    /// Triangle indices.
    #[must_use]
    pub fn triangles(&self) -> &[[u32; 3]] {
        &self.triangles
    }

    /// Height of vertex `i` along the slice normal, excluding the depth offset.
    #[must_use]
    pub fn height(&self, i: usize) -> f32 {
        self.positions[i].dot(self.axis.normal()) - self.depth_offset
    }

    /// Axis-aligned bounding box of the current positions.
    #[must_use]
    pub fn bounding_box(&self) -> (Vec3, Vec3) {
        self.positions.iter().fold(
            (Vec3::splat(f32::MAX), Vec3::splat(f32::MIN)),
            |(min, max), &p| (min.min(p), max.max(p)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use wavescope_core::HeightMode;

    #[test]
    fn test_grid_counts() {
        let grid = SliceGrid::new(SliceAxis::Z, 4, 3.0);
        assert_eq!(grid.positions().len(), 16);
        assert_eq!(grid.triangles().len(), 2 * 3 * 3);
        assert!(grid.is_dirty());
        assert!(!grid.is_ghost());
    }

    #[test]
    fn test_column_major_placement() {
        let grid = SliceGrid::new(SliceAxis::Z, 3, 2.0);
        // Vertex 1 is (row 1, col 0); vertex 3 is (row 0, col 1).
        assert_eq!(grid.positions()[1], Vec3::new(0.0, -1.0, 0.0));
        assert_eq!(grid.positions()[3], Vec3::new(-1.0, 0.0, 0.0));
        assert_eq!(grid.positions()[8], Vec3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn test_triangles_cover_every_vertex_in_range() {
        let n = 5;
        let grid = SliceGrid::new(SliceAxis::X, n, 1.0);
        let mut used = vec![false; n * n];
        for tri in grid.triangles() {
            for &i in tri {
                assert!((i as usize) < n * n);
                used[i as usize] = true;
            }
        }
        assert!(used.iter().all(|&u| u));
    }

    #[test]
    fn test_first_cell_triangles() {
        let grid = SliceGrid::new(SliceAxis::Y, 3, 1.0);
        // (0,0)=0, (1,0)=1, (0,1)=3, (1,1)=4
        assert_eq!(grid.triangles()[0], [0, 1, 3]);
        assert_eq!(grid.triangles()[1], [1, 4, 3]);
    }

    #[test]
    fn test_update_writes_height_along_normal() {
        let mut grid = SliceGrid::new(SliceAxis::X, 3, 2.0);
        grid.take_dirty();
        let mut values = vec![0.0; 9];
        values[4] = 1.0;
        let params = TransferParams {
            threshold: 0.0,
            height_scale: 2.0,
            mode: HeightMode::Physical,
            ..TransferParams::default()
        };
        grid.update(&values, &params).unwrap();
        assert!(grid.is_dirty());
        assert_eq!(grid.positions()[4].x, 2.0);
        assert_eq!(grid.height(0), 0.0);
        // Peak color is the top of the ramp; zero samples are black.
        assert_eq!(grid.colors()[4], Vec4::ONE);
        assert_eq!(grid.colors()[0], Vec4::new(0.0, 0.0, 0.0, 1.0));
    }

    #[test]
    fn test_update_rejects_wrong_length() {
        let mut grid = SliceGrid::new(SliceAxis::Z, 3, 1.0);
        let err = grid.update(&[0.0; 8], &TransferParams::default());
        assert!(matches!(
            err,
            Err(WavescopeError::SizeMismatch {
                expected: 9,
                actual: 8
            })
        ));
    }

    #[test]
    fn test_flat_update_keeps_axis_normal() {
        let mut grid = SliceGrid::new(SliceAxis::Y, 4, 1.0);
        grid.update(&[0.0; 16], &TransferParams::default()).unwrap();
        for n in grid.normals() {
            assert!(n.abs().abs_diff_eq(Vec3::Y, 1e-6));
        }
    }

    #[test]
    fn test_normals_are_unit_after_update() {
        let mut grid = SliceGrid::new(SliceAxis::Z, 6, 1.0);
        let values: Vec<f32> = (0..36).map(|i| (i as f32 * 0.37).sin().abs()).collect();
        grid.update(&values, &TransferParams::default()).unwrap();
        for n in grid.normals() {
            assert!((n.length() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_ghost_clone_offsets_and_colors() {
        let base = SliceGrid::new(SliceAxis::Z, 3, 1.0);
        let accent = Vec3::new(0.2, 0.9, 1.0);
        let mut ghost = base.clone_as_ghost(0.05, accent);
        assert!(ghost.is_ghost());
        assert_eq!(ghost.triangles(), base.triangles());
        assert!((ghost.positions()[0].z - 0.05).abs() < 1e-6);

        let params = TransferParams {
            ghost_opacity: 0.5,
            ..TransferParams::default()
        };
        ghost.update(&[1.0; 9], &params).unwrap();
        assert_eq!(ghost.colors()[0], accent.extend(0.5));
        assert!((ghost.height(0) - 10.0).abs() < 1e-5);
    }

    #[test]
    fn test_take_dirty_clears() {
        let mut grid = SliceGrid::new(SliceAxis::X, 2, 1.0);
        assert!(grid.take_dirty());
        assert!(!grid.take_dirty());
    }

    proptest! {
        #[test]
        fn prop_update_keeps_geometry_finite(
            values in proptest::collection::vec(
                prop_oneof![0.0f32..100.0, Just(f32::NAN)],
                25,
            ),
            threshold in 0.0f32..1.0,
            enhanced in any::<bool>(),
        ) {
            let mut grid = SliceGrid::new(SliceAxis::Y, 5, 4.0);
            let params = TransferParams {
                threshold,
                mode: if enhanced { HeightMode::Enhanced } else { HeightMode::Physical },
                ..TransferParams::default()
            };
            grid.update(&values, &params).unwrap();
            for (p, n) in grid.positions().iter().zip(grid.normals()) {
                prop_assert!(p.is_finite());
                prop_assert!((n.length() - 1.0).abs() < 1e-3);
            }
        }
    }
}
