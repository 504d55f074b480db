//! Mesh pipelines: the sky dome and the extruded text.

use glam::Mat4;
use tracing::{debug, warn};
use wgpu::util::DeviceExt;

use super::{uniform_entry, DEPTH_FORMAT, HDR_FORMAT};
use crate::config::{SkyConfig, TextConfig};
use crate::material::{host_shader, MaterialUniforms, ModelUniforms};
use crate::mesh::{MeshData, MeshVertex};
use crate::shader_override::{inject_holographic, TimeUniform};
use crate::sky::{sky_shader, uv_sphere, SkyUniform, HEIGHT_SEGMENTS, WIDTH_SEGMENTS};

/// Vertex and index buffers for one [`MeshData`].
pub struct MeshBuffers {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
}

impl MeshBuffers {
    pub fn new(device: &wgpu::Device, label: &str, mesh: &MeshData) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Vertex Buffer", label)),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Index Buffer", label)),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            vertex_buffer,
            index_buffer,
            index_count: mesh.indices.len() as u32,
        }
    }

    fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..self.index_count, 0, 0..1);
    }
}

fn mesh_pipeline(
    device: &wgpu::Device,
    label: &str,
    source: String,
    bind_group_layouts: &[&wgpu::BindGroupLayout],
    cull_mode: wgpu::Face,
    depth_write_enabled: bool,
    blend: wgpu::BlendState,
) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    });

    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(label),
        bind_group_layouts,
        push_constant_ranges: &[],
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[MeshVertex::layout()],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: HDR_FORMAT,
                blend: Some(blend),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: Some(cull_mode),
            ..Default::default()
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled,
            depth_compare: wgpu::CompareFunction::LessEqual,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

/// Sky dome seen from inside.
pub struct SkyRenderer {
    pipeline: wgpu::RenderPipeline,
    bind_group: wgpu::BindGroup,
    buffers: MeshBuffers,
}

impl SkyRenderer {
    pub fn new(device: &wgpu::Device, scene_layout: &wgpu::BindGroupLayout, sky: &SkyConfig) -> Self {
        let mesh = uv_sphere(sky.radius, WIDTH_SEGMENTS, HEIGHT_SEGMENTS);
        let buffers = MeshBuffers::new(device, "Sky", &mesh);

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Sky Uniform Buffer"),
            contents: bytemuck::bytes_of(&SkyUniform::from_config(sky)),
            usage: wgpu::BufferUsages::UNIFORM,
        });
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Sky Bind Group Layout"),
            entries: &[uniform_entry(0, wgpu::ShaderStages::FRAGMENT)],
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Sky Bind Group"),
            layout: &layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        // inside faces are back faces
        let pipeline = mesh_pipeline(
            device,
            "Sky Pipeline",
            sky_shader(),
            &[scene_layout, &layout],
            wgpu::Face::Front,
            false,
            wgpu::BlendState::REPLACE,
        );

        Self {
            pipeline,
            bind_group,
            buffers,
        }
    }

    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>, scene_bind_group: &wgpu::BindGroup) {
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, scene_bind_group, &[]);
        pass.set_bind_group(1, &self.bind_group, &[]);
        self.buffers.draw(pass);
    }
}

/// Extruded text with the configured material.
///
/// When the style takes the holographic override, the time uniform is bound
/// at group 2. If the host source lacks an anchor the override is dropped and
/// the plain host material renders instead.
pub struct TextRenderer {
    pipeline: wgpu::RenderPipeline,
    object_bind_group: wgpu::BindGroup,
    model_buffer: wgpu::Buffer,
    time: Option<(wgpu::Buffer, wgpu::BindGroup)>,
    buffers: MeshBuffers,
}

impl TextRenderer {
    pub fn new(
        device: &wgpu::Device,
        scene_layout: &wgpu::BindGroupLayout,
        text: &TextConfig,
        mesh: &MeshData,
    ) -> Self {
        let buffers = MeshBuffers::new(device, "Text", mesh);

        let model_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Text Model Buffer"),
            contents: bytemuck::bytes_of(&ModelUniforms::new(Mat4::IDENTITY)),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let material_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Text Material Buffer"),
            contents: bytemuck::bytes_of(&MaterialUniforms::from_config(text)),
            usage: wgpu::BufferUsages::UNIFORM,
        });

        let object_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Text Bind Group Layout"),
            entries: &[
                uniform_entry(0, wgpu::ShaderStages::VERTEX),
                uniform_entry(1, wgpu::ShaderStages::FRAGMENT),
            ],
        });
        let object_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Text Bind Group"),
            layout: &object_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: model_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: material_buffer.as_entire_binding(),
                },
            ],
        });

        let host = host_shader(text.material);
        let injected = if text.material.uses_override() {
            match inject_holographic(&host) {
                Ok(source) => Some(source),
                Err(e) => {
                    warn!("Holographic override skipped, using host material: {}", e);
                    None
                }
            }
        } else {
            None
        };

        let (pipeline, time) = match injected {
            Some(source) => {
                let time_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Time Buffer"),
                    contents: bytemuck::bytes_of(&TimeUniform::new(0.0)),
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                });
                let time_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some("Time Bind Group Layout"),
                    entries: &[uniform_entry(0, wgpu::ShaderStages::FRAGMENT)],
                });
                let time_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("Time Bind Group"),
                    layout: &time_layout,
                    entries: &[wgpu::BindGroupEntry {
                        binding: 0,
                        resource: time_buffer.as_entire_binding(),
                    }],
                });
                let pipeline = mesh_pipeline(
                    device,
                    "Holographic Text Pipeline",
                    source,
                    &[scene_layout, &object_layout, &time_layout],
                    wgpu::Face::Back,
                    true,
                    wgpu::BlendState::ALPHA_BLENDING,
                );
                debug!("Text material {:?} with holographic override", text.material);
                (pipeline, Some((time_buffer, time_bind_group)))
            }
            None => {
                let pipeline = mesh_pipeline(
                    device,
                    "Text Pipeline",
                    host,
                    &[scene_layout, &object_layout],
                    wgpu::Face::Back,
                    true,
                    wgpu::BlendState::ALPHA_BLENDING,
                );
                debug!("Text material {:?}", text.material);
                (pipeline, None)
            }
        };

        Self {
            pipeline,
            object_bind_group,
            model_buffer,
            time,
            buffers,
        }
    }

    pub fn set_transform(&self, queue: &wgpu::Queue, model: Mat4) {
        queue.write_buffer(&self.model_buffer, 0, bytemuck::bytes_of(&ModelUniforms::new(model)));
    }

    /// Advance the holographic time uniform. No-op without the override.
    pub fn set_time(&self, queue: &wgpu::Queue, seconds: f32) {
        if let Some((buffer, _)) = &self.time {
            queue.write_buffer(buffer, 0, bytemuck::bytes_of(&TimeUniform::new(seconds)));
        }
    }

    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>, scene_bind_group: &wgpu::BindGroup) {
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, scene_bind_group, &[]);
        pass.set_bind_group(1, &self.object_bind_group, &[]);
        if let Some((_, bind_group)) = &self.time {
            pass.set_bind_group(2, bind_group, &[]);
        }
        self.buffers.draw(pass);
    }
}
