//! GPU texture creation and upload
//!
//! Depth targets (the canvas depth buffer, per-light shadow maps), uploaded
//! scene textures, and the reserved placeholder/irradiance resources all
//! come from here. Each resource bundles the texture, its view, and a
//! sampler so bind groups can be assembled from one handle.

use crate::gfx::scene::TextureSource;

const COLOR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

fn extent(width: u32, height: u32, layers: u32) -> wgpu::Extent3d {
    wgpu::Extent3d {
        width,
        height,
        depth_or_array_layers: layers,
    }
}

/// A texture together with its default view and sampler.
#[derive(Clone)]
pub struct TextureResource {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
}

impl TextureResource {
    /// Depth format shared by the canvas depth buffer and every shadow map.
    pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    /// Renderable, sampleable depth texture with a comparison sampler.
    fn depth_target(device: &wgpu::Device, width: u32, height: u32, label: &str) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: extent(width, height, 1),
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        Self {
            view: texture.create_view(&wgpu::TextureViewDescriptor::default()),
            sampler: create_shadow_sampler(device),
            texture,
        }
    }

    /// The canvas depth buffer. Recreated on every resize; everything else
    /// survives.
    pub fn create_depth_texture(
        device: &wgpu::Device,
        config: &wgpu::SurfaceConfiguration,
        label: &str,
    ) -> Self {
        Self::depth_target(device, config.width.max(1), config.height.max(1), label)
    }

    /// Square depth-only shadow target for one light.
    pub fn create_shadow_map(device: &wgpu::Device, size: u32, label: &str) -> Self {
        Self::depth_target(device, size, size, label)
    }

    /// 1x1 depth texture bound to unused shadow-map slots.
    pub fn create_placeholder_depth(device: &wgpu::Device) -> Self {
        Self::depth_target(device, 1, 1, "Placeholder Depth")
    }

    /// Uploads tightly packed RGBA8 data into a fresh 2D texture.
    pub fn create_from_rgba(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        data: &[u8],
        width: u32,
        height: u32,
        label: &str,
    ) -> Self {
        let texture = color_texture(device, width, height, 1, label);
        upload_rgba(queue, &texture, data, width, height, 1);
        Self {
            view: texture.create_view(&wgpu::TextureViewDescriptor::default()),
            sampler: create_default_sampler(device),
            texture,
        }
    }

    /// Uploads a scene-supplied texture source.
    pub fn create_from_source(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        source: &TextureSource,
        label: &str,
    ) -> Self {
        match source {
            TextureSource::Data {
                width,
                height,
                rgba,
            } => Self::create_from_rgba(device, queue, rgba, *width, *height, label),
            TextureSource::Solid(color) => Self::create_from_rgba(device, queue, color, 1, 1, label),
        }
    }

    /// Cube texture with every face filled from `source`.
    ///
    /// Used for the ambient irradiance map; a solid source produces a
    /// uniform 1x1 cube.
    pub fn create_cube_from_source(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        source: &TextureSource,
        label: &str,
    ) -> Self {
        let (width, height, face): (u32, u32, &[u8]) = match source {
            TextureSource::Data {
                width,
                height,
                rgba,
            } => (*width, *height, rgba),
            TextureSource::Solid(color) => (1, 1, color.as_slice()),
        };
        let faces: Vec<u8> = std::iter::repeat(face).take(6).flatten().copied().collect();

        let texture = color_texture(device, width, height, 6, label);
        upload_rgba(queue, &texture, &faces, width, height, 6);
        Self {
            view: texture.create_view(&wgpu::TextureViewDescriptor {
                dimension: Some(wgpu::TextureViewDimension::Cube),
                ..Default::default()
            }),
            sampler: create_default_sampler(device),
            texture,
        }
    }
}

fn color_texture(
    device: &wgpu::Device,
    width: u32,
    height: u32,
    layers: u32,
    label: &str,
) -> wgpu::Texture {
    device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: extent(width, height, layers),
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: COLOR_FORMAT,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    })
}

fn upload_rgba(
    queue: &wgpu::Queue,
    texture: &wgpu::Texture,
    data: &[u8],
    width: u32,
    height: u32,
    layers: u32,
) {
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        data,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(4 * width),
            rows_per_image: Some(height),
        },
        extent(width, height, layers),
    );
}

/// Linear clamp-to-edge sampler for color textures.
pub fn create_default_sampler(device: &wgpu::Device) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("Default Sampler"),
        address_mode_u: wgpu::AddressMode::ClampToEdge,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        mipmap_filter: wgpu::FilterMode::Nearest,
        ..Default::default()
    })
}

/// Comparison sampler for hardware shadow-map tests.
pub fn create_shadow_sampler(device: &wgpu::Device) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("Shadow Sampler"),
        compare: Some(wgpu::CompareFunction::LessEqual),
        address_mode_u: wgpu::AddressMode::ClampToEdge,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        mipmap_filter: wgpu::FilterMode::Nearest,
        ..Default::default()
    })
}
