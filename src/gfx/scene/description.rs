//! Scene supplier contract
//!
//! The engine does not parse any markup or file format. Before
//! initialization a host-side supplier produces a [`SceneDescription`] —
//! keyed entity lists plus the ordered pipeline associations — and the
//! engine builds its registries and GPU resources from it.

use cgmath::Point3;

use super::group::Group;
use super::light::Light;
use super::material::Material;
use super::mesh::Mesh;
use super::probe::Probe;

/// Everything the engine needs to build a scene, in supplier order.
///
/// Entries are `(name, value)` pairs rather than maps so registry insertion
/// order — which drives shadow slot assignment and pass order — is exactly
/// the supplier's order.
#[derive(Debug, Clone, Default)]
pub struct SceneDescription {
    pub cameras: Vec<(String, CameraDescription)>,
    pub textures: Vec<(String, TextureSource)>,
    pub materials: Vec<(String, Material)>,
    pub meshes: Vec<(String, Mesh)>,
    pub groups: Vec<(String, Group)>,
    pub lights: Vec<(String, Light)>,
    pub probes: Vec<(String, Probe)>,
    /// Ordered (pipeline name, group key) associations; main-pass pipelines
    /// execute in this order.
    pub passes: Vec<(String, String)>,
    /// Camera to render with; defaults to the first camera entry.
    pub active_camera: Option<String>,
}

/// Camera parameters before validation. Exactly one of the two projection
/// parameter sets must be present.
#[derive(Debug, Clone)]
pub struct CameraDescription {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub perspective: Option<PerspectiveParams>,
    pub orthographic: Option<OrthographicParams>,
}

#[derive(Debug, Clone, Copy)]
pub struct PerspectiveParams {
    pub fov_y_deg: f32,
    pub near: f32,
    pub far: f32,
}

#[derive(Debug, Clone, Copy)]
pub struct OrthographicParams {
    pub left: f32,
    pub right: f32,
    pub bottom: f32,
    pub top: f32,
    pub near: f32,
    pub far: f32,
}

/// Texture content from the supplier: decoded image bytes or a solid color.
#[derive(Debug, Clone)]
pub enum TextureSource {
    Data {
        width: u32,
        height: u32,
        /// Tightly packed RGBA8, `width * height * 4` bytes.
        rgba: Vec<u8>,
    },
    Solid([u8; 4]),
}
