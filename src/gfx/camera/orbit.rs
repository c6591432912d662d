//! Orbit, pan, and zoom operations on a scene camera
//!
//! The camera position is converted to spherical coordinates relative to
//! its look-at target; orbit deltas add to latitude/longitude, the radius
//! is floor-clamped, and the cartesian position is recomputed so the
//! camera immediately re-aims at the target.

use cgmath::{InnerSpace, Vector3};

use crate::gfx::scene::Camera;

/// Smallest allowed orbit radius; dolly and zoom clamp against it.
pub const MIN_RADIUS: f32 = 0.1;

/// Keep latitude off the poles to avoid a degenerate up vector.
const MAX_LATITUDE: f32 = std::f32::consts::FRAC_PI_2 - 1e-4;

struct Spherical {
    radius: f32,
    latitude: f32,
    longitude: f32,
}

fn to_spherical(camera: &Camera) -> Spherical {
    let offset = camera.position - camera.target;
    let radius = offset.magnitude().max(MIN_RADIUS);
    Spherical {
        radius,
        latitude: (offset.y / radius).clamp(-1.0, 1.0).asin(),
        longitude: offset.x.atan2(offset.z),
    }
}

fn apply_spherical(camera: &mut Camera, spherical: Spherical) {
    let Spherical {
        radius,
        latitude,
        longitude,
    } = spherical;
    let offset = Vector3::new(
        radius * latitude.cos() * longitude.sin(),
        radius * latitude.sin(),
        radius * latitude.cos() * longitude.cos(),
    );
    camera.position = camera.target + offset;
}

/// Orbits around the target: deltas add to longitude/latitude.
pub fn orbit(camera: &mut Camera, d_longitude: f32, d_latitude: f32) {
    let mut spherical = to_spherical(camera);
    spherical.longitude += d_longitude;
    spherical.latitude = (spherical.latitude + d_latitude).clamp(-MAX_LATITUDE, MAX_LATITUDE);
    apply_spherical(camera, spherical);
}

/// Adds `delta` to the orbit radius, floor-clamped to [`MIN_RADIUS`].
pub fn dolly(camera: &mut Camera, delta: f32) {
    let mut spherical = to_spherical(camera);
    spherical.radius = (spherical.radius + delta).max(MIN_RADIUS);
    apply_spherical(camera, spherical);
}

/// Multiplies the orbit radius, floor-clamped to [`MIN_RADIUS`].
pub fn zoom(camera: &mut Camera, factor: f32) {
    let mut spherical = to_spherical(camera);
    spherical.radius = (spherical.radius * factor).max(MIN_RADIUS);
    apply_spherical(camera, spherical);
}

/// Pans in view space: position and target move by the same delta, so the
/// view direction is preserved.
pub fn pan(camera: &mut Camera, dx: f32, dy: f32) {
    let forward = (camera.target - camera.position).normalize();
    let right = forward.cross(camera.up).normalize();
    let up = right.cross(forward);

    let movement = right * dx + up * dy;
    camera.position += movement;
    camera.target += movement;
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{Deg, Point3};

    fn camera() -> Camera {
        Camera::perspective(
            Point3::new(0.0, 0.0, 5.0),
            Point3::new(0.0, 0.0, 0.0),
            Deg(60.0),
            0.1,
            100.0,
            1.0,
        )
    }

    fn radius(camera: &Camera) -> f32 {
        (camera.position - camera.target).magnitude()
    }

    #[test]
    fn orbit_preserves_radius_and_target() {
        let mut camera = camera();
        orbit(&mut camera, 0.5, 0.25);
        assert!((radius(&camera) - 5.0).abs() < 1e-4);
        assert_eq!(camera.target, Point3::new(0.0, 0.0, 0.0));
    }

    #[test]
    fn dolly_floor_clamps_the_radius() {
        let mut camera = camera();
        dolly(&mut camera, -100.0);
        assert!((radius(&camera) - MIN_RADIUS).abs() < 1e-5);
    }

    #[test]
    fn zoom_multiplies_the_radius() {
        let mut camera = camera();
        zoom(&mut camera, 0.5);
        assert!((radius(&camera) - 2.5).abs() < 1e-4);
        zoom(&mut camera, 0.0);
        assert!((radius(&camera) - MIN_RADIUS).abs() < 1e-5);
    }

    #[test]
    fn pan_preserves_view_direction() {
        let mut camera = camera();
        let before = (camera.target - camera.position).normalize();
        pan(&mut camera, 1.5, -0.75);
        let after = (camera.target - camera.position).normalize();
        assert!((before - after).magnitude() < 1e-6);
        assert!(camera.target != Point3::new(0.0, 0.0, 0.0));
    }
}
