// src/wgpu_utils/binding_types.rs
//! Shorthands for the `wgpu::BindingType` shapes the engine binds

fn plain_buffer(ty: wgpu::BufferBindingType) -> wgpu::BindingType {
    wgpu::BindingType::Buffer {
        ty,
        has_dynamic_offset: false,
        min_binding_size: None,
    }
}

fn sampled_texture(
    sample_type: wgpu::TextureSampleType,
    view_dimension: wgpu::TextureViewDimension,
) -> wgpu::BindingType {
    wgpu::BindingType::Texture {
        sample_type,
        view_dimension,
        multisampled: false,
    }
}

/// Uniform block fed by the packing engine.
pub fn uniform() -> wgpu::BindingType {
    plain_buffer(wgpu::BufferBindingType::Uniform)
}

/// Read-only storage block; the light array binds as one.
pub fn readonly_storage() -> wgpu::BindingType {
    plain_buffer(wgpu::BufferBindingType::Storage { read_only: true })
}

/// Filterable 2D color texture (albedo / roughness maps).
pub fn color_texture_2d() -> wgpu::BindingType {
    sampled_texture(
        wgpu::TextureSampleType::Float { filterable: true },
        wgpu::TextureViewDimension::D2,
    )
}

/// Cube texture (irradiance ambient, background environment).
pub fn cube_texture() -> wgpu::BindingType {
    sampled_texture(
        wgpu::TextureSampleType::Float { filterable: true },
        wgpu::TextureViewDimension::Cube,
    )
}

/// Depth texture for shadow-map slots.
pub fn depth_texture_2d() -> wgpu::BindingType {
    sampled_texture(
        wgpu::TextureSampleType::Depth,
        wgpu::TextureViewDimension::D2,
    )
}

/// Filtering sampler paired with color textures.
pub fn filtering_sampler() -> wgpu::BindingType {
    wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering)
}

/// Comparison sampler for hardware shadow tests.
pub fn comparison_sampler() -> wgpu::BindingType {
    wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Comparison)
}
