//! Scene rendering pass with depth testing, texturing and wireframe.
//!
//! [`MeshPass`] draws every node of a [`SceneGraph`] that carries geometry.
//! GPU resources for a node are created once, the first time the pass sees
//! it in [`MeshPass::sync`]; after that only the uniforms change.
//!
//! # Architecture
//!
//! The pass uses three bind groups:
//! - **Group 0**: Camera uniforms (view-projection matrix)
//! - **Group 1**: Model uniforms (world matrix, color), one buffer per node
//! - **Group 2**: Texture and sampler for the surface
//!
//! Filled meshes go through one of two triangle pipelines, picked by the
//! material's [`Side`]. Wireframe meshes and line helpers share a line-list
//! pipeline that draws each unique triangle edge once.

use tracing::{debug, warn};

use crate::camera::Camera;
use crate::color::Color;
use crate::gpu::GpuContext;
use crate::material::{Side, TextureId};
use crate::mesh::{IndexBuffer, Mesh, Vertex3d};
use crate::scene_graph::{NodeKind, SceneGraph};
use crate::texture::{DecodedImage, Texture};

/// Camera uniforms for 3D rendering.
#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniforms {
    /// Combined view-projection matrix for transforming world positions to clip space.
    pub view_proj: [[f32; 4]; 4],
}

/// Per-node model uniforms.
#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelUniforms {
    /// Model matrix (object to world space transformation).
    pub model: [[f32; 4]; 4],
    /// Linear RGBA color multiplied with the texture.
    pub color: [f32; 4],
}

/// GPU resources owned by one scene node.
struct NodeResources {
    mesh: Mesh,
    model_buffer: wgpu::Buffer,
    model_bind_group: wgpu::BindGroup,
}

struct TextureSlot {
    #[allow(dead_code)]
    texture: Texture,
    bind_group: wgpu::BindGroup,
}

/// How a node is drawn this frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum DrawMode {
    Fill(Side),
    Lines,
}

/// Renders a [`SceneGraph`] with depth testing.
pub struct MeshPass {
    fill_pipeline: wgpu::RenderPipeline,
    fill_double_pipeline: wgpu::RenderPipeline,
    line_pipeline: wgpu::RenderPipeline,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    model_bind_group_layout: wgpu::BindGroupLayout,
    texture_bind_group_layout: wgpu::BindGroupLayout,
    default_texture: TextureSlot,
    textures: Vec<Option<TextureSlot>>,
    // Indexed like the scene graph arena; `None` for groups.
    nodes: Vec<Option<NodeResources>>,
    #[allow(dead_code)]
    depth_texture: wgpu::Texture,
    depth_view: wgpu::TextureView,
    depth_size: (u32, u32),
}

impl MeshPass {
    /// Creates the pipelines, the camera uniforms, a default white texture
    /// and a depth buffer sized to the current surface.
    pub fn new(gpu: &GpuContext) -> Self {
        let device = &gpu.device;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Scene Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/scene.wgsl").into()),
        });

        // Camera uniform buffer (group 0)
        let camera_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Camera Uniforms"),
            size: std::mem::size_of::<CameraUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let camera_bind_group_layout = Self::uniform_layout(device, "Camera Bind Group Layout");

        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Camera Bind Group"),
            layout: &camera_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        });

        // Model uniforms (group 1), one buffer per node created in `sync`
        let model_bind_group_layout = Self::uniform_layout(device, "Model Bind Group Layout");

        // Texture bind group layout (group 2)
        let texture_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Texture Bind Group Layout"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                            view_dimension: wgpu::TextureViewDimension::D2,
                            multisampled: false,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                ],
            });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Scene Pipeline Layout"),
            bind_group_layouts: &[
                &camera_bind_group_layout,
                &model_bind_group_layout,
                &texture_bind_group_layout,
            ],
            push_constant_ranges: &[],
        });

        let pipeline = |label: &str, primitive: wgpu::PrimitiveState| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs"),
                    buffers: &[Vertex3d::LAYOUT],
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some("fs"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: gpu.config.format,
                        blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: Default::default(),
                }),
                primitive,
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: wgpu::TextureFormat::Depth32Float,
                    depth_write_enabled: true,
                    depth_compare: wgpu::CompareFunction::Less,
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            })
        };

        let fill_pipeline = pipeline(
            "Scene Fill Pipeline",
            wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: Some(wgpu::Face::Back),
                front_face: wgpu::FrontFace::Ccw,
                ..Default::default()
            },
        );
        let fill_double_pipeline = pipeline(
            "Scene Double-Sided Fill Pipeline",
            wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                front_face: wgpu::FrontFace::Ccw,
                ..Default::default()
            },
        );
        let line_pipeline = pipeline(
            "Scene Line Pipeline",
            wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::LineList,
                ..Default::default()
            },
        );

        let (depth_texture, depth_view) = Self::create_depth_texture(gpu);

        let white = Texture::from_image(gpu, &DecodedImage::white(), "Default White Texture");
        let default_texture = Self::texture_slot(gpu, &texture_bind_group_layout, white);

        Self {
            fill_pipeline,
            fill_double_pipeline,
            line_pipeline,
            camera_buffer,
            camera_bind_group,
            model_bind_group_layout,
            texture_bind_group_layout,
            default_texture,
            textures: Vec::new(),
            nodes: Vec::new(),
            depth_texture,
            depth_view,
            depth_size: (gpu.width(), gpu.height()),
        }
    }

    fn uniform_layout(device: &wgpu::Device, label: &str) -> wgpu::BindGroupLayout {
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some(label),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        })
    }

    fn texture_slot(
        gpu: &GpuContext,
        layout: &wgpu::BindGroupLayout,
        texture: Texture,
    ) -> TextureSlot {
        let bind_group = gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Scene Texture Bind Group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&texture.sampler),
                },
            ],
        });
        TextureSlot {
            texture,
            bind_group,
        }
    }

    /// Reserves a texture slot that materials can reference before the image
    /// exists. Until [`set_texture`](Self::set_texture) fills it, the slot
    /// samples as plain white.
    pub fn reserve_texture(&mut self) -> TextureId {
        self.textures.push(None);
        TextureId(self.textures.len() - 1)
    }

    /// Fills or replaces the texture in a reserved slot.
    pub fn set_texture(&mut self, gpu: &GpuContext, id: TextureId, texture: Texture) {
        let slot = Self::texture_slot(gpu, &self.texture_bind_group_layout, texture);
        match self.textures.get_mut(id.0) {
            Some(entry) => *entry = Some(slot),
            None => warn!(?id, "texture slot was never reserved"),
        }
    }

    /// Uploads geometry for nodes added since the last call.
    pub fn sync(&mut self, gpu: &GpuContext, scene: &SceneGraph) {
        if self.nodes.len() >= scene.len() {
            return;
        }

        let first = self.nodes.len();
        for (_, node) in scene.iter().skip(first) {
            let mesh = match &node.kind {
                NodeKind::Group => None,
                NodeKind::Mesh { geometry, .. } => Some(Mesh::from_geometry(gpu, geometry)),
                NodeKind::Lines { geometry, .. } => Some(Mesh::from_lines(gpu, geometry)),
            };
            let resources = mesh.map(|mesh| self.node_resources(gpu, &node.name, mesh));
            self.nodes.push(resources);
        }
        debug!(uploaded = scene.len() - first, "scene nodes synced");
    }

    fn node_resources(&self, gpu: &GpuContext, name: &str, mesh: Mesh) -> NodeResources {
        let model_buffer = gpu.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&format!("{} Model Uniforms", name)),
            size: std::mem::size_of::<ModelUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let model_bind_group = gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{} Model Bind Group", name)),
            layout: &self.model_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: model_buffer.as_entire_binding(),
            }],
        });
        NodeResources {
            mesh,
            model_buffer,
            model_bind_group,
        }
    }

    fn create_depth_texture(gpu: &GpuContext) -> (wgpu::Texture, wgpu::TextureView) {
        let texture = gpu.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Texture"),
            size: wgpu::Extent3d {
                width: gpu.width(),
                height: gpu.height(),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Depth32Float,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        (texture, view)
    }

    /// Ensures the depth buffer matches the current screen size.
    pub fn ensure_depth_size(&mut self, gpu: &GpuContext) {
        if self.depth_size != (gpu.width(), gpu.height()) {
            let (texture, view) = Self::create_depth_texture(gpu);
            self.depth_texture = texture;
            self.depth_view = view;
            self.depth_size = (gpu.width(), gpu.height());
        }
    }

    /// Renders one frame of `scene` to the window surface.
    ///
    /// Nodes not yet seen by [`sync`](Self::sync) are skipped. Surface
    /// errors are returned to the caller, which decides whether to
    /// reconfigure or give up.
    pub fn render(
        &mut self,
        gpu: &GpuContext,
        scene: &SceneGraph,
        camera: &Camera,
        clear: Color,
    ) -> Result<(), wgpu::SurfaceError> {
        self.ensure_depth_size(gpu);

        let output = gpu.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let camera_uniforms = CameraUniforms {
            view_proj: camera.view_projection(gpu.aspect()).to_cols_array_2d(),
        };
        gpu.queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::cast_slice(&[camera_uniforms]),
        );

        let world = scene.world_matrices();
        let mut draws = Vec::new();
        for ((id, node), resources) in scene.iter().zip(&self.nodes) {
            let Some(resources) = resources else {
                continue;
            };
            let (color, texture, mode) = match &node.kind {
                NodeKind::Group => continue,
                NodeKind::Mesh { material, .. } => {
                    let mode = if material.wireframe {
                        DrawMode::Lines
                    } else {
                        DrawMode::Fill(material.side)
                    };
                    (material.color, material.map, mode)
                }
                NodeKind::Lines { color, .. } => (*color, None, DrawMode::Lines),
            };

            let model_uniforms = ModelUniforms {
                model: world[id.index()].to_cols_array_2d(),
                color: color.to_linear(),
            };
            gpu.queue.write_buffer(
                &resources.model_buffer,
                0,
                bytemuck::cast_slice(&[model_uniforms]),
            );
            draws.push((resources, texture, mode));
        }

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Scene Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear.to_wgpu()),
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
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_bind_group(0, &self.camera_bind_group, &[]);

            for (resources, texture, mode) in draws {
                let (pipeline, indices) = match mode {
                    DrawMode::Fill(Side::Front) => {
                        (&self.fill_pipeline, resources.mesh.triangles.as_ref())
                    }
                    DrawMode::Fill(Side::Double) => {
                        (&self.fill_double_pipeline, resources.mesh.triangles.as_ref())
                    }
                    DrawMode::Lines => (&self.line_pipeline, resources.mesh.edges.as_ref()),
                };
                let Some(IndexBuffer { buffer, count }) = indices else {
                    continue;
                };

                render_pass.set_pipeline(pipeline);
                render_pass.set_bind_group(1, &resources.model_bind_group, &[]);
                render_pass.set_bind_group(2, &self.bound_texture(texture).bind_group, &[]);
                render_pass.set_vertex_buffer(0, resources.mesh.vertex_buffer.slice(..));
                render_pass.set_index_buffer(buffer.slice(..), wgpu::IndexFormat::Uint32);
                render_pass.draw_indexed(0..*count, 0, 0..1);
            }
        }

        gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }

    /// The slot bound for `texture`, falling back to white while it loads.
    fn bound_texture(&self, texture: Option<TextureId>) -> &TextureSlot {
        texture
            .and_then(|id| self.textures.get(id.0))
            .and_then(Option::as_ref)
            .unwrap_or(&self.default_texture)
    }
}
