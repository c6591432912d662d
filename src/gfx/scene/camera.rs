//! Camera entity and projection derivation

use cgmath::{ortho, perspective, Deg, Matrix4, Point3, Vector3};

use super::description::CameraDescription;
use super::SceneError;

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.5,
    0.0, 0.0, 0.0, 1.0,
);

/// Exactly one projection parameter set per camera.
#[derive(Debug, Clone, Copy)]
pub enum Projection {
    Perspective {
        fov_y: Deg<f32>,
        near: f32,
        far: f32,
        aspect: f32,
    },
    Orthographic {
        left: f32,
        right: f32,
        bottom: f32,
        top: f32,
        near: f32,
        far: f32,
    },
}

/// A scene camera. View and projection matrices are derived on demand,
/// never stored.
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
    pub projection: Projection,
}

impl Camera {
    pub fn perspective(
        position: Point3<f32>,
        target: Point3<f32>,
        fov_y: Deg<f32>,
        near: f32,
        far: f32,
        aspect: f32,
    ) -> Self {
        Self {
            position,
            target,
            up: Vector3::unit_y(),
            projection: Projection::Perspective {
                fov_y,
                near,
                far,
                aspect,
            },
        }
    }

    /// Builds a camera from a scene description entry.
    ///
    /// Exactly one of the perspective/orthographic parameter sets must be
    /// present; anything else is a configuration error.
    pub fn from_description(name: &str, desc: &CameraDescription) -> Result<Self, SceneError> {
        let projection = match (&desc.perspective, &desc.orthographic) {
            (Some(p), None) => Projection::Perspective {
                fov_y: Deg(p.fov_y_deg),
                near: p.near,
                far: p.far,
                // Placeholder until the canvas reports its aspect ratio.
                aspect: 1.0,
            },
            (None, Some(o)) => Projection::Orthographic {
                left: o.left,
                right: o.right,
                bottom: o.bottom,
                top: o.top,
                near: o.near,
                far: o.far,
            },
            (Some(_), Some(_)) => {
                return Err(SceneError::InvalidCamera {
                    name: name.to_string(),
                    reason: "both perspective and orthographic parameters supplied".to_string(),
                })
            }
            (None, None) => {
                return Err(SceneError::InvalidCamera {
                    name: name.to_string(),
                    reason: "no projection parameters supplied".to_string(),
                })
            }
        };

        Ok(Self {
            position: desc.position,
            target: desc.target,
            up: Vector3::unit_y(),
            projection,
        })
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(self.position, self.target, self.up)
    }

    pub fn projection_matrix(&self) -> Matrix4<f32> {
        let projection = match self.projection {
            Projection::Perspective {
                fov_y,
                near,
                far,
                aspect,
            } => perspective(fov_y, aspect, near, far),
            Projection::Orthographic {
                left,
                right,
                bottom,
                top,
                near,
                far,
            } => ortho(left, right, bottom, top, near, far),
        };
        OPENGL_TO_WGPU_MATRIX * projection
    }

    /// Updates the perspective aspect ratio on canvas resize. Orthographic
    /// cameras keep their explicit frustum.
    pub fn set_aspect(&mut self, new_aspect: f32) {
        if let Projection::Perspective { ref mut aspect, .. } = self.projection {
            *aspect = new_aspect;
        }
    }

    /// Eye position as a homogeneous point for uniform upload.
    pub fn homogeneous_position(&self) -> [f32; 4] {
        [self.position.x, self.position.y, self.position.z, 1.0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::scene::description::{OrthographicParams, PerspectiveParams};

    fn base_description() -> CameraDescription {
        CameraDescription {
            position: Point3::new(0.0, 2.0, 5.0),
            target: Point3::new(0.0, 0.0, 0.0),
            perspective: None,
            orthographic: None,
        }
    }

    #[test]
    fn requires_exactly_one_projection() {
        let missing = Camera::from_description("main", &base_description());
        assert!(matches!(
            missing,
            Err(SceneError::InvalidCamera { ref name, .. }) if name == "main"
        ));

        let mut both = base_description();
        both.perspective = Some(PerspectiveParams {
            fov_y_deg: 60.0,
            near: 0.1,
            far: 100.0,
        });
        both.orthographic = Some(OrthographicParams {
            left: -1.0,
            right: 1.0,
            bottom: -1.0,
            top: 1.0,
            near: 0.1,
            far: 10.0,
        });
        assert!(Camera::from_description("main", &both).is_err());

        both.orthographic = None;
        assert!(Camera::from_description("main", &both).is_ok());
    }

    #[test]
    fn view_matrix_places_eye_at_origin() {
        let camera = Camera::perspective(
            Point3::new(0.0, 0.0, 5.0),
            Point3::new(0.0, 0.0, 0.0),
            Deg(45.0),
            0.1,
            100.0,
            1.0,
        );
        let eye = camera.view_matrix() * camera.position.to_homogeneous();
        assert!(eye.x.abs() < 1e-6 && eye.y.abs() < 1e-6 && eye.z.abs() < 1e-6);
    }
}
