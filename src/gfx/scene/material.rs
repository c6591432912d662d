//! Material records for PBR rendering
//!
//! A material is plain data: texture/sampler registry references and scalar
//! shading parameters. GPU resources (uniform block, bind group) live with
//! the renderer, not here.

use crate::gfx::resources::registry::{ReservedKey, ResourceKey};

#[derive(Debug, Clone)]
pub struct Material {
    pub name: String,
    pub albedo_map: ResourceKey,
    pub albedo_sampler: ResourceKey,
    pub roughness_map: ResourceKey,
    pub roughness_sampler: ResourceKey,
    pub roughness: f32,
    pub metalness: f32,
    /// Base reflectance at normal incidence.
    pub reflectance: [f32; 3],
    /// When false the scalar `roughness` wins over the roughness map.
    pub use_roughness_map: bool,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            albedo_map: ReservedKey::PlaceholderTexture.into(),
            albedo_sampler: ReservedKey::DefaultSampler.into(),
            roughness_map: ReservedKey::PlaceholderTexture.into(),
            roughness_sampler: ReservedKey::DefaultSampler.into(),
            roughness: 0.5,
            metalness: 0.0,
            reflectance: [0.04, 0.04, 0.04],
            use_roughness_map: false,
        }
    }
}

impl Material {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    /// Builder pattern: albedo texture by registry name.
    pub fn with_albedo_map(mut self, texture: &str) -> Self {
        self.albedo_map = ResourceKey::named(texture);
        self
    }

    /// Builder pattern: roughness texture by registry name; enables the map.
    pub fn with_roughness_map(mut self, texture: &str) -> Self {
        self.roughness_map = ResourceKey::named(texture);
        self.use_roughness_map = true;
        self
    }

    pub fn with_roughness(mut self, roughness: f32) -> Self {
        self.roughness = roughness.clamp(0.0, 1.0);
        self
    }

    pub fn with_metalness(mut self, metalness: f32) -> Self {
        self.metalness = metalness.clamp(0.0, 1.0);
        self
    }

    pub fn with_reflectance(mut self, r: f32, g: f32, b: f32) -> Self {
        self.reflectance = [r, g, b];
        self
    }
}
