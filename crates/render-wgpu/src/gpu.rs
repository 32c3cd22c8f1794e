use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use glam::Vec4;
use shapeview_geometry::{Mesh, Vertex};
use shapeview_render::{
    Camera, Drawable, RenderError, Renderer, ShaderKind, ShaderProgram, UniformValues,
    check_upload, upload_camera,
};
use wgpu::util::DeviceExt;

use crate::shaders;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Uniform block shared by every shader variant. Must match `struct Uniforms`
/// in the WGSL sources.
#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct GpuUniforms {
    model: [[f32; 4]; 4],
    model_inv_tr: [[f32; 4]; 4],
    view_proj: [[f32; 4]; 4],
    color: [f32; 4],
    camera_forward: [f32; 4],
    time: f32,
    _pad: [f32; 3],
}

impl From<&UniformValues> for GpuUniforms {
    fn from(v: &UniformValues) -> Self {
        Self {
            model: v.model.to_cols_array_2d(),
            model_inv_tr: v.model_inv_tr.to_cols_array_2d(),
            view_proj: v.view_proj.to_cols_array_2d(),
            color: v.color.to_array(),
            camera_forward: v.camera_forward.to_array(),
            time: v.time,
            _pad: [0.0; 3],
        }
    }
}

/// Compiled pipeline and uniform storage for one shader variant.
struct GpuProgram {
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    uploaded_revision: Option<u64>,
}

/// Mesh uploaded to vertex and index buffers.
pub struct GpuDrawable {
    label: String,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    vertex_count: u32,
    index_count: u32,
}

impl Drawable for GpuDrawable {
    fn label(&self) -> &str {
        &self.label
    }

    fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    fn index_count(&self) -> u32 {
        self.index_count
    }
}

/// wgpu-based renderer.
pub struct WgpuRenderer {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    programs: [GpuProgram; 2],
    depth_texture: wgpu::TextureView,
    surface_format: wgpu::TextureFormat,
    clear_color: wgpu::Color,
    pending_clear: bool,
    width: u32,
    height: u32,
}

impl WgpuRenderer {
    /// Compile every shader variant. A compile or validation failure is fatal
    /// for the caller.
    pub fn new(
        device: Arc<wgpu::Device>,
        queue: Arc<wgpu::Queue>,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> Result<Self, RenderError> {
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("uniform_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let programs = [
            Self::create_program(
                &device,
                ShaderKind::Lambert,
                &pipeline_layout,
                &bind_group_layout,
                surface_format,
            )?,
            Self::create_program(
                &device,
                ShaderKind::Special,
                &pipeline_layout,
                &bind_group_layout,
                surface_format,
            )?,
        ];

        let depth_texture = Self::create_depth_texture(&device, width, height);

        Ok(Self {
            device,
            queue,
            programs,
            depth_texture,
            surface_format,
            clear_color: wgpu::Color::BLACK,
            pending_clear: false,
            width,
            height,
        })
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.surface_format
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn create_program(
        device: &wgpu::Device,
        kind: ShaderKind,
        pipeline_layout: &wgpu::PipelineLayout,
        bind_group_layout: &wgpu::BindGroupLayout,
        surface_format: wgpu::TextureFormat,
    ) -> Result<GpuProgram, RenderError> {
        let [vert, frag] = shaders::sources(kind);

        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let vert_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(vert.label),
            source: wgpu::ShaderSource::Wgsl(vert.source.clone()),
        });
        let frag_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(frag.label),
            source: wgpu::ShaderSource::Wgsl(frag.source.clone()),
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(kind.name()),
            layout: Some(pipeline_layout),
            vertex: wgpu::VertexState {
                module: &vert_module,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<Vertex>() as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![
                        0 => Float32x3,
                        1 => Float32x3,
                        2 => Float32x4,
                    ],
                }],
            },
            fragment: Some(wgpu::FragmentState {
                module: &frag_module,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: Some(wgpu::Face::Back),
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: Default::default(),
                bias: Default::default(),
            }),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        if let Some(error) = pollster::block_on(device.pop_error_scope()) {
            return Err(RenderError::ShaderCompile {
                label: kind.name().to_string(),
                message: error.to_string(),
            });
        }

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("uniform_buffer"),
            contents: bytemuck::bytes_of(&GpuUniforms::from(&UniformValues::default())),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("uniform_bind_group"),
            layout: bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        tracing::info!(shader = %kind, "shader program compiled");
        Ok(GpuProgram {
            pipeline,
            uniform_buffer,
            bind_group,
            uploaded_revision: None,
        })
    }

    fn create_depth_texture(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth_texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&Default::default())
    }
}

impl Renderer for WgpuRenderer {
    type Drawable = GpuDrawable;
    type Target = wgpu::TextureView;

    fn create_drawable(&mut self, label: &str, mesh: &Mesh) -> Result<GpuDrawable, RenderError> {
        check_upload(label, mesh)?;
        let vertex_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: bytemuck::cast_slice(&mesh.vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
        let index_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: bytemuck::cast_slice(&mesh.indices),
                usage: wgpu::BufferUsages::INDEX,
            });
        tracing::debug!(
            label,
            vertices = mesh.vertex_count(),
            indices = mesh.index_count(),
            "mesh uploaded"
        );
        Ok(GpuDrawable {
            label: label.to_string(),
            vertex_buffer,
            index_buffer,
            vertex_count: mesh.vertex_count() as u32,
            index_count: mesh.index_count() as u32,
        })
    }

    fn set_clear_color(&mut self, color: Vec4) {
        self.clear_color = wgpu::Color {
            r: color.x as f64,
            g: color.y as f64,
            b: color.z as f64,
            a: color.w as f64,
        };
    }

    fn set_size(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.depth_texture = Self::create_depth_texture(&self.device, width, height);
    }

    fn clear(&mut self) {
        self.pending_clear = true;
    }

    fn render(
        &mut self,
        target: &wgpu::TextureView,
        camera: &Camera,
        program: &mut ShaderProgram,
        drawables: &[&GpuDrawable],
    ) -> Result<(), RenderError> {
        upload_camera(program, camera);

        let gpu = &mut self.programs[program.kind().index()];
        if gpu.uploaded_revision != Some(program.revision()) {
            self.queue.write_buffer(
                &gpu.uniform_buffer,
                0,
                bytemuck::bytes_of(&GpuUniforms::from(program.values())),
            );
            gpu.uploaded_revision = Some(program.revision());
        }

        let (color_load, depth_load) = if std::mem::take(&mut self.pending_clear) {
            (wgpu::LoadOp::Clear(self.clear_color), wgpu::LoadOp::Clear(1.0))
        } else {
            (wgpu::LoadOp::Load, wgpu::LoadOp::Load)
        };

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("render_encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("main_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: color_load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture,
                    depth_ops: Some(wgpu::Operations {
                        load: depth_load,
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            pass.set_pipeline(&gpu.pipeline);
            pass.set_bind_group(0, &gpu.bind_group, &[]);
            for drawable in drawables {
                pass.set_vertex_buffer(0, drawable.vertex_buffer.slice(..));
                pass.set_index_buffer(drawable.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..drawable.index_count, 0, 0..1);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        Ok(())
    }
}
