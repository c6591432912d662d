//! GPU resource management
//!
//! Registries of uploaded GPU objects plus the texture/mesh upload paths.
//! Everything here is created during the async initialization phase and
//! read-only during steady-state rendering.

pub mod mesh_resource;
pub mod registry;
pub mod texture_resource;

pub use mesh_resource::GpuMesh;
pub use registry::{Registry, ReservedKey, ResourceKey};
pub use texture_resource::TextureResource;
