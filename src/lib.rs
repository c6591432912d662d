// src/lib.rs
//! Glint 3D Engine
//!
//! A shadow-mapped physically-based rendering engine built on wgpu and
//! winit: a schema-driven buffer packing engine, a hierarchical scene
//! graph, and a two-pass (shadow + lit) frame pipeline.

pub mod app;
pub mod gfx;
pub mod prelude;
pub mod wgpu_utils;

// Re-export main types for convenience
pub use app::GlintApp;

/// Creates an application for the given scene description
pub fn with_scene(
    description: gfx::scene::SceneDescription,
) -> anyhow::Result<GlintApp> {
    GlintApp::new(description)
}
