//! Uploaded GPU meshes
//!
//! CPU attribute streams are interleaved into the engine vertex format and
//! uploaded once during scene initialization; buffers are never resized.

use wgpu::util::DeviceExt;

use crate::gfx::rendering::vertex::Vertex;
use crate::gfx::scene::Mesh;

/// Vertex and index buffers for one mesh.
pub struct GpuMesh {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
}

impl GpuMesh {
    /// Interleaves the mesh's attribute streams and uploads both buffers.
    ///
    /// Absent attributes get per-vertex defaults: zero normal/tangent/uv,
    /// white color.
    pub fn upload(device: &wgpu::Device, mesh: &Mesh, label: &str) -> Self {
        let vertex_len = mesh.vertex_len();
        let mut vertices = Vec::with_capacity(vertex_len);
        for i in 0..vertex_len {
            let fetch3 = |stream: &[f32], default: [f32; 3]| -> [f32; 3] {
                if stream.is_empty() {
                    default
                } else {
                    [stream[i * 3], stream[i * 3 + 1], stream[i * 3 + 2]]
                }
            };
            vertices.push(Vertex {
                position: fetch3(&mesh.positions, [0.0; 3]),
                normal: fetch3(&mesh.normals, [0.0; 3]),
                uv: if mesh.uvs.is_empty() {
                    [0.0; 2]
                } else {
                    [mesh.uvs[i * 2], mesh.uvs[i * 2 + 1]]
                },
                color: if mesh.colors.is_empty() {
                    [1.0; 4]
                } else {
                    [
                        mesh.colors[i * 4],
                        mesh.colors[i * 4 + 1],
                        mesh.colors[i * 4 + 2],
                        mesh.colors[i * 4 + 3],
                    ]
                },
                tangent: fetch3(&mesh.tangents, [0.0; 3]),
            });
        }

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} Vertex Buffer")),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} Index Buffer")),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        Self {
            vertex_buffer,
            index_buffer,
            index_count: mesh.indices.len() as u32,
        }
    }
}
