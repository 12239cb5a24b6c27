use std::mem;
use std::path::PathBuf;

use bytemuck::{Pod, Zeroable};
use cgmath::Matrix4;
use thiserror::Error;
use wgpu::util::DeviceExt;
use wgpu::{
    BindGroup, BindGroupLayoutDescriptor, BindGroupLayoutEntry, BindingType, Buffer,
    BufferBindingType, BufferSize, BufferUsages, PipelineLayoutDescriptor, RenderPipeline,
    ShaderSource, ShaderStages,
};

use crate::context::{Context, DEPTH_FORMAT};

mod polygon;
mod shaders;

pub use polygon::{Geometry, Vertex, COL_ATTR_LOCATION, POS_ATTR_LOCATION};
pub use shaders::{ShaderSources, FRAGMENT_FILE, VERTEX_FILE};

/// Reasons the widget can fail to initialize.
#[derive(Error, Debug)]
pub enum InitError {
    #[error("failed to read shader {path}: {source}")]
    ShaderRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("shader program failed to build: {0}")]
    Shader(String),
}

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct TransformUniform {
    pvm: [[f32; 4]; 4],
}

/// Device-side copy of the tetrahedron and the pipeline that draws it.
pub struct TetraMesh {
    vertex_buffer: Buffer,
    index_buffer: Buffer,
    uniform_buffer: Buffer,
    bind_group: BindGroup,
    pipeline: RenderPipeline,
    num_indices: u32,
}

impl TetraMesh {
    /// Uploads `geometry` and builds the pipeline from `sources`.
    ///
    /// The staging geometry is consumed; nothing is read back later.
    pub fn new(ctx: &Context, geometry: Geometry, sources: &ShaderSources) -> Result<Self, InitError> {
        ctx.device.push_error_scope(wgpu::ErrorFilter::Validation);

        let vertex_shader = ctx
            .device
            .create_shader_module(&wgpu::ShaderModuleDescriptor {
                label: Some(VERTEX_FILE),
                source: ShaderSource::Wgsl(sources.vertex.clone()),
            });
        let fragment_shader = ctx
            .device
            .create_shader_module(&wgpu::ShaderModuleDescriptor {
                label: Some(FRAGMENT_FILE),
                source: ShaderSource::Wgsl(sources.fragment.clone()),
            });

        let bind_group_layout = ctx
            .device
            .create_bind_group_layout(&BindGroupLayoutDescriptor {
                label: Some("PVM layout"),
                entries: &[BindGroupLayoutEntry {
                    binding: 0,
                    visibility: ShaderStages::VERTEX,
                    ty: BindingType::Buffer {
                        ty: BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: BufferSize::new(
                            mem::size_of::<TransformUniform>() as u64
                        ),
                    },
                    count: None,
                }],
            });

        let pipeline_layout = ctx
            .device
            .create_pipeline_layout(&PipelineLayoutDescriptor {
                label: None,
                bind_group_layouts: &[&bind_group_layout],
                push_constant_ranges: &[],
            });

        let pipeline = ctx
            .device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("tetrahedron pipeline"),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &vertex_shader,
                    entry_point: "vs_main",
                    buffers: &[Vertex::layout()],
                },
                fragment: Some(wgpu::FragmentState {
                    module: &fragment_shader,
                    entry_point: "fs_main",
                    targets: &[ctx.surface_config.format.into()],
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
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
            });

        if let Some(error) = futures::executor::block_on(ctx.device.pop_error_scope()) {
            return Err(InitError::Shader(error.to_string()));
        }

        let vertex_buffer = ctx
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Vertex Buffer"),
                contents: bytemuck::cast_slice(&geometry.vertices),
                usage: BufferUsages::VERTEX,
            });

        let index_buffer = ctx
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Index Buffer"),
                contents: bytemuck::cast_slice(&geometry.indices),
                usage: BufferUsages::INDEX,
            });

        let uniform_buffer = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("PVM Buffer"),
            size: mem::size_of::<TransformUniform>() as u64,
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("PVM bind group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        log::info!(
            "uploaded {} vertices ({} bytes) and {} indices",
            geometry.vertices.len(),
            geometry.vertices.len() * mem::size_of::<Vertex>(),
            geometry.indices.len()
        );

        Ok(TetraMesh {
            vertex_buffer,
            index_buffer,
            uniform_buffer,
            bind_group,
            pipeline,
            num_indices: geometry.indices.len() as u32,
        })
    }

    pub fn num_indices(&self) -> u32 {
        self.num_indices
    }

    pub fn write_pvm(&self, queue: &wgpu::Queue, pvm: Matrix4<f32>) {
        let uniform = TransformUniform { pvm: pvm.into() };
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniform));
    }

    pub fn draw<'a>(&'a self, rpass: &mut wgpu::RenderPass<'a>) {
        rpass.set_pipeline(&self.pipeline);
        rpass.set_bind_group(0, &self.bind_group, &[]);
        rpass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        rpass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        rpass.draw_indexed(0..self.num_indices, 0, 0..1);
    }

    /// Frees the device memory now instead of when the handles drop.
    pub fn destroy(self) {
        self.vertex_buffer.destroy();
        self.index_buffer.destroy();
        self.uniform_buffer.destroy();
    }
}
