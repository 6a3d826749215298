//! Vertex format and GPU-resident mesh buffers.
//!
//! - [`Vertex3d`]: the vertex layout shared by every primitive
//! - [`Mesh`]: vertex buffer plus separate index buffers for filled and
//!   wireframe drawing
//!
//! # Vertex Layout
//!
//! The [`Vertex3d`] struct uses the following GPU layout (32 bytes per vertex):
//!
//! | Attribute | Format    | Offset | Shader Location |
//! |-----------|-----------|--------|-----------------|
//! | position  | Float32x3 | 0      | 0               |
//! | normal    | Float32x3 | 12     | 1               |
//! | uv        | Float32x2 | 24     | 2               |

use crate::geometry::RawGeometry;
use crate::gpu::GpuContext;

/// A vertex for 3D mesh rendering with position, normal, and texture coordinates.
///
/// `#[repr(C)]` plus [`bytemuck::Pod`] lets vertex slices be cast straight
/// to bytes for upload.
///
/// # Example
///
/// ```
/// use goalpost::Vertex3d;
///
/// let vertex = Vertex3d::new(
///     [0.0, 1.0, 0.0],  // position
///     [0.0, 1.0, 0.0],  // normal (pointing up)
///     [0.5, 0.5],       // uv (center of texture)
/// );
/// assert_eq!(vertex.uv, [0.5, 0.5]);
/// ```
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex3d {
    /// The 3D position of this vertex in model space.
    pub position: [f32; 3],
    /// The surface normal vector.
    pub normal: [f32; 3],
    /// Texture coordinates, typically in the range [0, 1].
    pub uv: [f32; 2],
}

impl Vertex3d {
    /// The wgpu vertex buffer layout descriptor for this vertex type.
    pub const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<Vertex3d>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[
            // position
            wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x3,
            },
            // normal
            wgpu::VertexAttribute {
                offset: 12,
                shader_location: 1,
                format: wgpu::VertexFormat::Float32x3,
            },
            // uv
            wgpu::VertexAttribute {
                offset: 24,
                shader_location: 2,
                format: wgpu::VertexFormat::Float32x2,
            },
        ],
    };

    pub fn new(position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            uv,
        }
    }
}

/// An index buffer together with the number of indices it holds.
#[derive(Debug)]
pub(crate) struct IndexBuffer {
    pub(crate) buffer: wgpu::Buffer,
    pub(crate) count: u32,
}

/// GPU-resident geometry.
///
/// A mesh keeps two index lists over the same vertices: triangles for
/// filled drawing and unique edges for wireframe drawing. Either may be
/// absent (a line helper has no triangles). Meshes are immutable after
/// creation; node poses live in the scene graph, not in the buffers.
#[derive(Debug)]
pub struct Mesh {
    pub(crate) vertex_buffer: wgpu::Buffer,
    pub(crate) triangles: Option<IndexBuffer>,
    pub(crate) edges: Option<IndexBuffer>,
}

impl Mesh {
    /// Uploads vertices plus triangle and edge index lists.
    ///
    /// Empty index lists are not uploaded; the corresponding draw is
    /// skipped at render time.
    pub fn new(gpu: &GpuContext, vertices: &[Vertex3d], triangles: &[u32], edges: &[u32]) -> Self {
        use wgpu::util::DeviceExt;

        let vertex_buffer = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Mesh Vertex Buffer"),
                contents: bytemuck::cast_slice(vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });

        let upload = |indices: &[u32], label: &str| {
            (!indices.is_empty()).then(|| IndexBuffer {
                buffer: gpu
                    .device
                    .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                        label: Some(label),
                        contents: bytemuck::cast_slice(indices),
                        usage: wgpu::BufferUsages::INDEX,
                    }),
                count: indices.len() as u32,
            })
        };

        Self {
            vertex_buffer,
            triangles: upload(triangles, "Mesh Triangle Index Buffer"),
            edges: upload(edges, "Mesh Edge Index Buffer"),
        }
    }

    /// Uploads a triangle geometry, deriving its wireframe edges.
    pub fn from_geometry(gpu: &GpuContext, geometry: &RawGeometry) -> Self {
        Self::new(gpu, &geometry.vertices, &geometry.indices, &geometry.edges())
    }

    /// Uploads a line geometry whose index list is already segment pairs.
    pub fn from_lines(gpu: &GpuContext, geometry: &RawGeometry) -> Self {
        Self::new(gpu, &geometry.vertices, &[], &geometry.indices)
    }
}
