//! Shadow-map derivation and slot assignment
//!
//! Every shadow-casting light renders the scene into its own depth-only
//! target from a fixed orthographic frustum looking at the origin along the
//! light's direction. The main pass can sample at most
//! [`MAX_SHADOW_MAPS`](crate::gfx::rendering::renderer::Renderer::MAX_SHADOW_MAPS)
//! of those targets; slot indices are handed out in registry order.

use cgmath::{ortho, InnerSpace, Matrix4, Point3, Vector3};

use crate::gfx::resources::registry::ResourceKey;
use crate::gfx::scene::camera::OPENGL_TO_WGPU_MATRIX;
use crate::gfx::scene::Light;

/// Square shadow-map resolution per light.
pub const SHADOW_MAP_SIZE: u32 = 2048;

/// Half-extent of the orthographic shadow frustum.
const FRUSTUM_EXTENT: f32 = 25.0;
/// Distance of the virtual shadow camera from the origin.
const CAMERA_DISTANCE: f32 = 30.0;
const NEAR: f32 = 1.0;
const FAR: f32 = 60.0;

/// View matrix of a light's shadow camera: positioned `CAMERA_DISTANCE`
/// back along the light direction, aimed at the origin.
pub fn light_view_matrix(light: &Light) -> Matrix4<f32> {
    let d = light.homogeneous_direction();
    let mut direction = Vector3::new(d[0], d[1], d[2]);
    if direction.magnitude2() < f32::EPSILON {
        direction = -Vector3::unit_y();
    }
    let direction = direction.normalize();
    let eye = Point3::new(0.0, 0.0, 0.0) - direction * CAMERA_DISTANCE;
    // Straight-down lights would be singular against the default up axis.
    let up = if direction.cross(Vector3::unit_y()).magnitude2() < 1e-6 {
        Vector3::unit_z()
    } else {
        Vector3::unit_y()
    };
    Matrix4::look_at_rh(eye, Point3::new(0.0, 0.0, 0.0), up)
}

/// Fixed orthographic projection shared by every shadow camera.
pub fn light_projection_matrix() -> Matrix4<f32> {
    OPENGL_TO_WGPU_MATRIX
        * ortho(
            -FRUSTUM_EXTENT,
            FRUSTUM_EXTENT,
            -FRUSTUM_EXTENT,
            FRUSTUM_EXTENT,
            NEAR,
            FAR,
        )
}

/// Combined view-projection uploaded with each light for shadow sampling.
pub fn light_view_projection(light: &Light) -> Matrix4<f32> {
    light_projection_matrix() * light_view_matrix(light)
}

/// Assigns shadow-map slot indices to lights in registry insertion order.
///
/// A running counter hands slots 0..`capacity` to shadow-casting lights
/// that have a shadow-map resource, in encounter order. Every other light —
/// non-casting, target-less, or beyond capacity — gets −1 and samples the
/// placeholder depth texture. Overflow is flagged, not silent.
pub fn assign_shadow_slots<'a>(
    lights: impl Iterator<Item = (&'a ResourceKey, &'a Light)>,
    has_shadow_map: impl Fn(&ResourceKey) -> bool,
    capacity: usize,
) -> Vec<i32> {
    let mut slots = Vec::new();
    let mut next = 0usize;
    for (key, light) in lights {
        if light.casts_shadow && has_shadow_map(key) {
            if next < capacity {
                slots.push(next as i32);
                next += 1;
            } else {
                log::warn!(
                    "light `{key}` casts shadows but all {capacity} shadow-map slots are taken; \
                     its shadows are disabled"
                );
                slots.push(-1);
            }
        } else {
            slots.push(-1);
        }
    }
    slots
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::resources::registry::Registry;
    use crate::gfx::scene::LightKind;

    fn light(casts_shadow: bool) -> Light {
        Light::new(LightKind::Directional)
            .with_direction(0.2, -1.0, 0.1)
            .with_shadow(casts_shadow)
    }

    fn slots_for(lights: &[(&str, bool, bool)], capacity: usize) -> Vec<i32> {
        let mut registry = Registry::new();
        let mut with_target = Vec::new();
        for (name, casts, has_target) in lights {
            registry.insert(ResourceKey::named(*name), light(*casts));
            if *has_target {
                with_target.push(ResourceKey::named(*name));
            }
        }
        assign_shadow_slots(registry.iter(), |key| with_target.contains(key), capacity)
    }

    #[test]
    fn first_casters_get_slots_in_registry_order() {
        let slots = slots_for(
            &[
                ("a", true, true),
                ("b", false, false),
                ("c", true, true),
                ("d", true, true),
            ],
            3,
        );
        assert_eq!(slots, vec![0, -1, 1, 2]);
    }

    #[test]
    fn overflow_lights_get_negative_one() {
        let slots = slots_for(
            &[
                ("a", true, true),
                ("b", true, true),
                ("c", true, true),
                ("d", true, true),
            ],
            3,
        );
        assert_eq!(slots, vec![0, 1, 2, -1]);
    }

    #[test]
    fn casters_without_targets_are_skipped() {
        let slots = slots_for(&[("a", true, false), ("b", true, true)], 3);
        assert_eq!(slots, vec![-1, 0]);
    }

    #[test]
    fn light_view_aims_at_origin() {
        let light = Light::new(LightKind::Directional).with_direction(0.0, -1.0, 0.0);
        let view = light_view_matrix(&light);
        let origin = view * cgmath::Point3::new(0.0, 0.0, 0.0).to_homogeneous();
        // The origin sits straight ahead of the shadow camera.
        assert!(origin.x.abs() < 1e-5 && origin.y.abs() < 1e-5);
        assert!((origin.z + CAMERA_DISTANCE).abs() < 1e-4);
    }
}
