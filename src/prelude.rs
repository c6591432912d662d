//! # Glint Prelude
//!
//! Brings the commonly used types into scope so typical hosts need a
//! single import:
//!
//! ```rust
//! use glint::prelude::*;
//! ```

// Re-export core application types
pub use crate::app::GlintApp;
pub use crate::with_scene;

// Re-export scene and entity types
pub use crate::gfx::scene::{
    Camera, CameraDescription, Group, Light, LightKind, Material, Mesh, Node, OrthographicParams,
    PerspectiveParams, Probe, ProbeKind, Scene, SceneDescription, TextureSource, Transform,
    TransformOp,
};

// Re-export the packing engine
pub use crate::gfx::layout::{FieldMap, Layout, LayoutError, Schema, Value, WgslType};

// Re-export geometry generators
pub use crate::gfx::geometry::{cube, fullscreen_triangle, grid, quad, sphere};

// Re-export rendering types
pub use crate::gfx::camera::CameraController;
pub use crate::gfx::rendering::{
    RenderError, Renderer, BACKGROUND_PIPELINE, MAIN_PIPELINE, SHADOW_PIPELINE,
};
pub use crate::gfx::resources::{Registry, ReservedKey, ResourceKey};

// Re-export common external dependencies
pub use cgmath::{Deg, InnerSpace, Point3, Rad, Vector3, Zero};
pub use wgpu::{Device, Queue};
