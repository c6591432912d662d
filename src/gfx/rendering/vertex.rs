//! # Vertex Data Structures
//!
//! GPU-compatible vertex format for mesh rendering. CPU-side meshes keep
//! attributes in separate streams; upload interleaves them into this
//! layout.

/// Interleaved vertex: position, normal, uv, color, tangent.
///
/// `#[repr(C)]` guarantees the C-compatible memory layout GPU buffer
/// uploads require.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
    pub color: [f32; 4],
    pub tangent: [f32; 3],
}

impl Vertex {
    /// Returns the vertex buffer layout for wgpu rendering.
    ///
    /// Attributes at shader locations 0..4 in declaration order.
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 5] = wgpu::vertex_attr_array![
            0 => Float32x3,
            1 => Float32x3,
            2 => Float32x2,
            3 => Float32x4,
            4 => Float32x3,
        ];
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &ATTRIBUTES,
        }
    }
}
