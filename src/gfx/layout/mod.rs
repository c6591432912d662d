//! Memory layout and packing engine for GPU buffers
//!
//! Uniform and storage blocks have strict per-type alignment rules. This
//! module computes alignment-correct byte offsets for schema-described
//! blocks and serializes typed values into byte buffers at those offsets,
//! so bind groups can be fed without hand-maintaining `#[repr(C)]` padding.

pub mod packer;
pub mod schema;

pub use packer::{pack, pack_into, FieldMap, Value};
pub use schema::{FieldLayout, Layout, LayoutError, Schema, WgslType};
