//! GPU block schemas and per-frame packing
//!
//! The uniform and storage blocks the pipelines bind are described as
//! layout-engine schemas and packed from live scene data each frame. The
//! field order here must match the structs declared in the WGSL sources.

use cgmath::{Matrix4, SquareMatrix};

use crate::gfx::layout::{pack, FieldMap, Layout, LayoutError, Schema, Value, WgslType};
use crate::gfx::rendering::shadow::light_view_projection;
use crate::gfx::scene::mesh::normal_matrix;
use crate::gfx::scene::{Light, Material};

/// Per-draw scene block: camera and object matrices plus the eye position.
pub fn scene_uniform_schema() -> Schema {
    Schema::new()
        .field("view", WgslType::Mat4)
        .field("projection", WgslType::Mat4)
        .field("model", WgslType::Mat4)
        .field("world", WgslType::Mat4)
        .field("normal_matrix", WgslType::Mat3)
        .field("camera_position", WgslType::Vec4)
}

pub fn pack_scene_uniforms(
    layout: &Layout,
    view: Matrix4<f32>,
    projection: Matrix4<f32>,
    model: Matrix4<f32>,
    world: Matrix4<f32>,
    camera_position: [f32; 4],
) -> Result<Vec<u8>, LayoutError> {
    let normal = normal_matrix(&(world * model));
    let mut values = FieldMap::new();
    values.insert("view".into(), Value::Mat4(view));
    values.insert("projection".into(), Value::Mat4(projection));
    values.insert("model".into(), Value::Mat4(model));
    values.insert("world".into(), Value::Mat4(world));
    values.insert("normal_matrix".into(), Value::Mat3(normal));
    values.insert("camera_position".into(), Value::Vec4(camera_position));
    pack(layout, &values)
}

/// Per-material block: reflectance + scalar shading parameters.
pub fn material_uniform_schema() -> Schema {
    Schema::new()
        .field("reflectance", WgslType::Vec3)
        .field("roughness", WgslType::Float)
        .field("metalness", WgslType::Float)
        .field("use_roughness_map", WgslType::UInt)
}

pub fn pack_material_uniforms(
    layout: &Layout,
    material: &Material,
) -> Result<Vec<u8>, LayoutError> {
    let mut values = FieldMap::new();
    values.insert("reflectance".into(), Value::Vec3(material.reflectance));
    values.insert("roughness".into(), Value::Float(material.roughness));
    values.insert("metalness".into(), Value::Float(material.metalness));
    values.insert(
        "use_roughness_map".into(),
        Value::UInt(material.use_roughness_map as u32),
    );
    pack(layout, &values)
}

fn light_element_schema() -> Schema {
    Schema::new()
        .field("position", WgslType::Vec4)
        .field("direction", WgslType::Vec4)
        .field("color", WgslType::Vec4)
        .field("view_projection", WgslType::Mat4)
        .field("kind", WgslType::UInt)
        .field("shadow_index", WgslType::Int)
        .field("intensity", WgslType::Float)
}

/// Light-array storage block: light count plus a trailing array of light
/// structs. Exercises the packing engine's array-of-struct path.
pub fn light_block_schema() -> Schema {
    Schema::new()
        .field("count", WgslType::UInt)
        .field("lights", WgslType::Array(light_element_schema()))
}

/// Packs every light in registry order with its assigned shadow slot.
pub fn pack_light_block(
    layout: &Layout,
    lights: &[(&Light, i32)],
) -> Result<Vec<u8>, LayoutError> {
    let elements = lights
        .iter()
        .map(|(light, slot)| {
            let mut element = FieldMap::new();
            element.insert("position".into(), Value::Vec4(light.homogeneous_position()));
            element.insert(
                "direction".into(),
                Value::Vec4(light.homogeneous_direction()),
            );
            element.insert("color".into(), Value::Vec4(light.color));
            element.insert(
                "view_projection".into(),
                Value::Mat4(light_view_projection(light)),
            );
            element.insert("kind".into(), Value::UInt(light.kind as u32));
            element.insert("shadow_index".into(), Value::Int(*slot));
            element.insert("intensity".into(), Value::Float(light.intensity));
            element
        })
        .collect();

    let mut values = FieldMap::new();
    values.insert("count".into(), Value::UInt(lights.len() as u32));
    values.insert("lights".into(), Value::Structs(elements));
    pack(layout, &values)
}

/// Background block: the ray-reconstruction matrix and the eye position.
pub fn background_uniform_schema() -> Schema {
    Schema::new()
        .field("inverse_view_projection", WgslType::Mat4)
        .field("camera_position", WgslType::Vec4)
}

pub fn pack_background_uniforms(
    layout: &Layout,
    view: Matrix4<f32>,
    projection: Matrix4<f32>,
    camera_position: [f32; 4],
) -> Result<Vec<u8>, LayoutError> {
    let inverse = (projection * view).invert().unwrap_or_else(|| {
        log::warn!("non-invertible view-projection; background ray matrix falls back to identity");
        Matrix4::identity()
    });
    let mut values = FieldMap::new();
    values.insert("inverse_view_projection".into(), Value::Mat4(inverse));
    values.insert("camera_position".into(), Value::Vec4(camera_position));
    pack(layout, &values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::scene::LightKind;

    #[test]
    fn scene_block_matches_wgsl_layout() {
        let layout = scene_uniform_schema().layout().unwrap();
        let offsets: Vec<u64> = layout.fields.iter().map(|f| f.offset).collect();
        // Four mat4s, a mat3 (3 x 16 bytes), then a vec4.
        assert_eq!(offsets, vec![0, 64, 128, 192, 256, 304]);
        assert_eq!(layout.size, 320);
    }

    #[test]
    fn material_block_matches_wgsl_layout() {
        let layout = material_uniform_schema().layout().unwrap();
        let offsets: Vec<u64> = layout.fields.iter().map(|f| f.offset).collect();
        // The scalars pack into the vec3's tail padding.
        assert_eq!(offsets, vec![0, 12, 16, 20]);
        assert_eq!(layout.size, 32);
    }

    #[test]
    fn light_element_stride_matches_wgsl() {
        let layout = light_block_schema().layout().unwrap();
        let array = layout.array.as_ref().unwrap();
        assert_eq!(array.offset, 16);
        assert_eq!(array.stride, 128);
    }

    #[test]
    fn packed_light_block_round_trips_count_and_slots() {
        let layout = light_block_schema().layout().unwrap();
        let a = Light::new(LightKind::Point).with_position(1.0, 2.0, 3.0);
        let b = Light::new(LightKind::Directional).with_shadow(true);
        let buffer = pack_light_block(&layout, &[(&a, -1), (&b, 0)]).unwrap();

        assert_eq!(buffer.len(), 16 + 2 * 128);
        let count = u32::from_le_bytes(buffer[0..4].try_into().unwrap());
        assert_eq!(count, 2);
        // Element 1 begins at 16 + 128; shadow_index sits at +116.
        let slot = i32::from_le_bytes(buffer[260..264].try_into().unwrap());
        assert_eq!(slot, 0);
        let kind = u32::from_le_bytes(buffer[256..260].try_into().unwrap());
        assert_eq!(kind, LightKind::Directional as u32);
    }
}
