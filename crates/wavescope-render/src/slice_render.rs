//! Slice mesh GPU rendering resources.

use wgpu::util::DeviceExt;
use wavescope_structures::SliceGrid;

/// Per-vertex data uploaded for a slice mesh.
/// Note: Layout must match the WGSL `VertexInput` (three vec4 attributes).
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SliceVertex {
    pub position: [f32; 4],
    pub normal: [f32; 4],
    pub color: [f32; 4],
}

impl SliceVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x4, 1 => Float32x4, 2 => Float32x4];

    /// Vertex buffer layout for the slice pipeline.
    #[must_use]
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<SliceVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Uniforms for slice rendering.
/// Note: Layout must match WGSL `SliceUniforms` exactly (16 bytes).
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
#[allow(clippy::pub_underscore_fields)]
pub struct SliceUniforms {
    /// 1 for ghost overlays (unlit, additive), 0 for main slices.
    pub is_ghost: u32,
    /// Ambient light floor for lit slices.
    pub ambient: f32,
    pub _pad: [f32; 2],
}

impl Default for SliceUniforms {
    fn default() -> Self {
        Self {
            is_ghost: 0,
            ambient: 0.35,
            _pad: [0.0; 2],
        }
    }
}

/// Packs a grid's positions, normals and colors into vertex data.
#[must_use]
pub fn pack_vertices(grid: &SliceGrid) -> Vec<SliceVertex> {
    grid.positions()
        .iter()
        .zip(grid.normals())
        .zip(grid.colors())
        .map(|((p, n), c)| SliceVertex {
            position: p.extend(1.0).to_array(),
            normal: n.extend(0.0).to_array(),
            color: c.to_array(),
        })
        .collect()
}

/// GPU resources for rendering one slice grid.
pub struct SliceMeshRenderData {
    /// Interleaved vertex buffer.
    pub vertex_buffer: wgpu::Buffer,
    /// Triangle index buffer; topology is fixed for the life of the grid.
    pub index_buffer: wgpu::Buffer,
    /// Uniform buffer for slice-specific settings.
    pub uniform_buffer: wgpu::Buffer,
    /// Bind group for this slice.
    pub bind_group: wgpu::BindGroup,
    /// Number of indices (num_triangles * 3).
    pub num_indices: u32,
    /// Whether this slice is drawn with the ghost pipeline.
    pub is_ghost: bool,
}

impl SliceMeshRenderData {
    /// Creates render data from a grid's current state.
    pub fn new(
        device: &wgpu::Device,
        bind_group_layout: &wgpu::BindGroupLayout,
        camera_buffer: &wgpu::Buffer,
        grid: &SliceGrid,
    ) -> Self {
        let vertices = pack_vertices(grid);
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("slice vertices"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });

        let indices: Vec<u32> = grid.triangles().iter().flatten().copied().collect();
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("slice indices"),
            contents: bytemuck::cast_slice(&indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let uniforms = SliceUniforms {
            is_ghost: u32::from(grid.is_ghost()),
            ..SliceUniforms::default()
        };
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("slice uniforms"),
            contents: bytemuck::cast_slice(&[uniforms]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        // Bindings:
        // 0: camera uniforms (uniform)
        // 1: slice uniforms (uniform)
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("slice bind group"),
            layout: bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: camera_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: uniform_buffer.as_entire_binding(),
                },
            ],
        });

        Self {
            vertex_buffer,
            index_buffer,
            uniform_buffer,
            bind_group,
            num_indices: indices.len() as u32,
            is_ghost: grid.is_ghost(),
        }
    }

    /// Rewrites the vertex buffer from the grid.
    pub fn update_vertices(&self, queue: &wgpu::Queue, grid: &SliceGrid) {
        let vertices = pack_vertices(grid);
        queue.write_buffer(&self.vertex_buffer, 0, bytemuck::cast_slice(&vertices));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use wavescope_core::{SliceAxis, TransferParams};

    #[test]
    fn test_slice_uniforms_size() {
        let size = std::mem::size_of::<SliceUniforms>();
        assert_eq!(size % 16, 0, "SliceUniforms must be 16-byte aligned");
        assert_eq!(size, 16);
    }

    #[test]
    fn test_slice_vertex_stride() {
        assert_eq!(std::mem::size_of::<SliceVertex>(), 48);
        assert_eq!(SliceVertex::layout().array_stride, 48);
    }

    #[test]
    fn test_pack_vertices_follows_grid() {
        let mut grid = SliceGrid::new(SliceAxis::Z, 3, 2.0);
        let mut values = vec![0.0; 9];
        values[5] = 1.0;
        grid.update(&values, &TransferParams::default()).unwrap();

        let packed = pack_vertices(&grid);
        assert_eq!(packed.len(), 9);
        let p = grid.positions()[5];
        assert_eq!(packed[5].position, [p.x, p.y, p.z, 1.0]);
        assert_eq!(packed[5].color, grid.colors()[5].to_array());
        assert_eq!(packed[5].normal[3], 0.0);
        assert!(Vec3::from_slice(&packed[0].normal[..3]).length() > 0.99);
    }
}
