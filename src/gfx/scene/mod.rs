//! Scene entities and the scene graph
//!
//! Entities are plain data records plus free functions over them; GPU
//! resources live with the renderer. The scene is built once from a
//! supplier description, then mutated only through transform and property
//! setters.

pub mod camera;
pub mod description;
pub mod group;
pub mod light;
pub mod material;
pub mod mesh;
pub mod probe;
pub mod scene;
pub mod transform;

pub use camera::{Camera, Projection};
pub use description::{
    CameraDescription, OrthographicParams, PerspectiveParams, SceneDescription, TextureSource,
};
pub use group::{Group, Node};
pub use light::{Light, LightKind};
pub use material::Material;
pub use mesh::Mesh;
pub use probe::{Probe, ProbeKind};
pub use scene::Scene;
pub use transform::{Transform, TransformOp};

use thiserror::Error;

/// Configuration errors raised while building a scene from its
/// description. Fatal; the host surfaces them.
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("scene description contains no usable camera")]
    MissingCamera,
    #[error("camera `{name}`: {reason}")]
    InvalidCamera { name: String, reason: String },
    #[error("mesh `{name}`: {reason}")]
    InvalidMesh { name: String, reason: String },
}
