//! # Procedural Geometry Generation
//!
//! Deterministic generators for common primitives. Every generator returns
//! a [`Mesh`](crate::gfx::scene::Mesh) with positions, normals, and texture
//! coordinates populated, ready for upload or further CPU-side editing.

pub mod primitives;

pub use primitives::{cube, fullscreen_triangle, grid, quad, sphere};
