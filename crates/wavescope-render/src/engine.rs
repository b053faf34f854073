//! The rendering engine: device, surface, camera, and slice pipelines.

use std::sync::Arc;

use glam::Vec3;
use wgpu::util::DeviceExt;
use wavescope_structures::SliceGrid;

use crate::camera::Camera;
use crate::error::{RenderError, RenderResult};
use crate::slice_render::{SliceMeshRenderData, SliceVertex};

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Camera uniforms for GPU.
/// Note: Layout must match WGSL `CameraUniforms` exactly (80 bytes).
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
#[allow(clippy::pub_underscore_fields)]
pub struct CameraUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub camera_pos: [f32; 3],
    pub _padding: f32,
}

impl Default for CameraUniforms {
    fn default() -> Self {
        Self {
            view_proj: glam::Mat4::IDENTITY.to_cols_array_2d(),
            camera_pos: [0.0, 0.0, 5.0],
            _padding: 0.0,
        }
    }
}

/// A surface texture acquired for one frame.
pub struct FrameTarget {
    pub surface_texture: wgpu::SurfaceTexture,
    pub view: wgpu::TextureView,
}

/// The main rendering engine backed by wgpu.
pub struct RenderEngine {
    /// The wgpu instance.
    pub instance: wgpu::Instance,
    /// The wgpu adapter.
    pub adapter: wgpu::Adapter,
    /// The wgpu device.
    pub device: wgpu::Device,
    /// The wgpu queue.
    pub queue: wgpu::Queue,
    /// The render surface.
    pub surface: wgpu::Surface<'static>,
    /// Surface configuration.
    pub surface_config: wgpu::SurfaceConfiguration,
    /// Depth texture view.
    pub depth_view: wgpu::TextureView,
    /// Main camera.
    pub camera: Camera,
    /// Camera uniform buffer, shared by every slice bind group.
    pub camera_buffer: wgpu::Buffer,
    /// Bind group layout for slices (camera + slice uniforms).
    pub slice_bind_group_layout: wgpu::BindGroupLayout,
    /// Opaque pipeline for main slices.
    main_pipeline: wgpu::RenderPipeline,
    /// Additive, depth-tested but not depth-writing pipeline for ghost slices.
    ghost_pipeline: wgpu::RenderPipeline,
    /// Current viewport width.
    pub width: u32,
    /// Current viewport height.
    pub height: u32,
}

impl RenderEngine {
    /// Creates a new windowed render engine.
    pub async fn new_windowed(window: Arc<winit::window::Window>) -> RenderResult<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..wgpu::InstanceDescriptor::default()
        });

        let surface = instance.create_surface(window.clone())?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|_| RenderError::AdapterCreationFailed)?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("wavescope device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::default(),
                experimental_features: wgpu::ExperimentalFeatures::default(),
            })
            .await?;

        let size = window.inner_size();
        let width = size.width.max(1);
        let height = size.height.max(1);

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or(RenderError::SurfaceConfigurationFailed)?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);

        let depth_view = Self::create_depth_view(&device, width, height);

        let camera = Camera::new(width as f32 / height as f32);

        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("camera uniforms"),
            contents: bytemuck::cast_slice(&[CameraUniforms::default()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let slice_bind_group_layout = Self::create_slice_bind_group_layout(&device);
        let main_pipeline =
            Self::create_slice_pipeline(&device, &slice_bind_group_layout, surface_format, false);
        let ghost_pipeline =
            Self::create_slice_pipeline(&device, &slice_bind_group_layout, surface_format, true);

        log::info!(
            "render engine ready: {} ({:?}), {width}x{height}",
            adapter.get_info().name,
            surface_format
        );

        Ok(Self {
            instance,
            adapter,
            device,
            queue,
            surface,
            surface_config,
            depth_view,
            camera,
            camera_buffer,
            slice_bind_group_layout,
            main_pipeline,
            ghost_pipeline,
            width,
            height,
        })
    }

    fn create_slice_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
        let uniform_entry = |binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };

        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("slice bind group layout"),
            entries: &[
                // Camera uniforms
                uniform_entry(0),
                // Slice uniforms
                uniform_entry(1),
            ],
        })
    }

    /// Creates a slice pipeline. Ghost pipelines blend additively and do not write depth.
    fn create_slice_pipeline(
        device: &wgpu::Device,
        bind_group_layout: &wgpu::BindGroupLayout,
        format: wgpu::TextureFormat,
        ghost: bool,
    ) -> wgpu::RenderPipeline {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("slice mesh shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/slice_mesh.wgsl").into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("slice pipeline layout"),
            bind_group_layouts: &[bind_group_layout],
            push_constant_ranges: &[],
        });

        let additive = wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::One,
            dst_factor: wgpu::BlendFactor::One,
            operation: wgpu::BlendOperation::Add,
        };
        let blend = if ghost {
            Some(wgpu::BlendState {
                color: additive,
                alpha: additive,
            })
        } else {
            None
        };

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(if ghost {
                "ghost slice pipeline"
            } else {
                "main slice pipeline"
            }),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[SliceVertex::layout()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None, // Slices are seen from both sides
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: !ghost,
                depth_compare: wgpu::CompareFunction::LessEqual,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        })
    }

    fn create_depth_view(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth texture"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&wgpu::TextureViewDescriptor::default())
    }

    /// Resizes the render target.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }

        self.width = width;
        self.height = height;
        self.surface_config.width = width;
        self.surface_config.height = height;
        self.surface.configure(&self.device, &self.surface_config);
        self.depth_view = Self::create_depth_view(&self.device, width, height);
        self.camera.set_aspect_ratio(width as f32 / height as f32);
    }

    /// Updates camera uniforms.
    pub fn update_camera_uniforms(&self) {
        let uniforms = CameraUniforms {
            view_proj: self.camera.view_projection_matrix().to_cols_array_2d(),
            camera_pos: self.camera.position.to_array(),
            _padding: 0.0,
        };

        self.queue
            .write_buffer(&self.camera_buffer, 0, bytemuck::cast_slice(&[uniforms]));
    }

    /// Creates GPU resources for a slice grid.
    #[must_use]
    pub fn create_slice_render_data(&self, grid: &SliceGrid) -> SliceMeshRenderData {
        SliceMeshRenderData::new(
            &self.device,
            &self.slice_bind_group_layout,
            &self.camera_buffer,
            grid,
        )
    }

    /// Acquires the next surface texture, reconfiguring once if the surface went stale.
    pub fn begin_frame(&mut self) -> RenderResult<FrameTarget> {
        let surface_texture = match self.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.surface_config);
                self.surface
                    .get_current_texture()
                    .map_err(|_| RenderError::SurfaceLost)?
            }
            Err(wgpu::SurfaceError::Timeout) => return Err(RenderError::Timeout),
            Err(wgpu::SurfaceError::OutOfMemory) => return Err(RenderError::OutOfMemory),
            Err(_) => return Err(RenderError::SurfaceOutdated),
        };
        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        Ok(FrameTarget {
            surface_texture,
            view,
        })
    }

    /// Clears the target and draws main slices, then ghost overlays on top.
    pub fn render_slices(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        slices: &[SliceMeshRenderData],
        background: Vec3,
    ) {
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("slice pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color {
                        r: f64::from(background.x),
                        g: f64::from(background.y),
                        b: f64::from(background.z),
                        a: 1.0,
                    }),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            ..Default::default()
        });

        for (pipeline, ghost) in [(&self.main_pipeline, false), (&self.ghost_pipeline, true)] {
            render_pass.set_pipeline(pipeline);
            for slice in slices.iter().filter(|s| s.is_ghost == ghost) {
                render_pass.set_bind_group(0, &slice.bind_group, &[]);
                render_pass.set_vertex_buffer(0, slice.vertex_buffer.slice(..));
                render_pass.set_index_buffer(slice.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                render_pass.draw_indexed(0..slice.num_indices, 0, 0..1);
            }
        }
    }

    /// Submits the encoder and presents the frame.
    pub fn end_frame(&self, encoder: wgpu::CommandEncoder, target: FrameTarget) {
        self.queue.submit(std::iter::once(encoder.finish()));
        target.surface_texture.present();
    }
}
