//! Light entities

use cgmath::{Point3, Vector3};

use super::transform::Transform;

/// Light type, encoded as a small integer for GPU consumption.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightKind {
    Point = 0,
    Directional = 1,
    Spot = 2,
}

/// A scene light with its own transform for placement.
#[derive(Debug, Clone)]
pub struct Light {
    pub kind: LightKind,
    pub position: Point3<f32>,
    pub direction: Vector3<f32>,
    /// RGBA; alpha is carried through to the GPU block unchanged.
    pub color: [f32; 4],
    pub intensity: f32,
    pub casts_shadow: bool,
    pub transform: Transform,
}

impl Light {
    pub fn new(kind: LightKind) -> Self {
        Self {
            kind,
            position: Point3::new(0.0, 0.0, 0.0),
            direction: Vector3::new(0.0, -1.0, 0.0),
            color: [1.0, 1.0, 1.0, 1.0],
            intensity: 1.0,
            casts_shadow: false,
            transform: Transform::new(),
        }
    }

    pub fn with_position(mut self, x: f32, y: f32, z: f32) -> Self {
        self.position = Point3::new(x, y, z);
        self
    }

    pub fn with_direction(mut self, x: f32, y: f32, z: f32) -> Self {
        self.direction = Vector3::new(x, y, z);
        self
    }

    pub fn with_color(mut self, r: f32, g: f32, b: f32) -> Self {
        self.color = [r, g, b, self.color[3]];
        self
    }

    pub fn with_intensity(mut self, intensity: f32) -> Self {
        self.intensity = intensity;
        self
    }

    pub fn with_shadow(mut self, casts_shadow: bool) -> Self {
        self.casts_shadow = casts_shadow;
        self
    }

    /// Placement-adjusted position as a homogeneous point (w = 1).
    pub fn homogeneous_position(&self) -> [f32; 4] {
        let p = self.transform.model_matrix() * self.position.to_homogeneous();
        [p.x, p.y, p.z, 1.0]
    }

    /// Placement-adjusted direction as a homogeneous vector (w = 0).
    pub fn homogeneous_direction(&self) -> [f32; 4] {
        let d = self.transform.model_matrix() * self.direction.extend(0.0);
        [d.x, d.y, d.z, 0.0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placement_transform_moves_position_but_not_direction() {
        let mut light = Light::new(LightKind::Directional)
            .with_position(0.0, 10.0, 0.0)
            .with_direction(0.0, -1.0, 0.0);
        light.transform.translate(5.0, 0.0, 0.0);

        assert_eq!(light.homogeneous_position(), [5.0, 10.0, 0.0, 1.0]);
        // Directions are w = 0 vectors, unaffected by translation.
        assert_eq!(light.homogeneous_direction(), [0.0, -1.0, 0.0, 0.0]);
    }
}
