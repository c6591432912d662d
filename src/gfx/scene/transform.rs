//! Transform stacks and model/world matrices

use cgmath::{Matrix4, Rad, SquareMatrix, Vector3};

/// One entry in a transform stack.
#[derive(Debug, Clone, Copy)]
pub enum TransformOp {
    Translate(Vector3<f32>),
    Scale(Vector3<f32>),
    RotateX(Rad<f32>),
    RotateY(Rad<f32>),
    RotateZ(Rad<f32>),
}

impl TransformOp {
    pub fn matrix(&self) -> Matrix4<f32> {
        match *self {
            TransformOp::Translate(v) => Matrix4::from_translation(v),
            TransformOp::Scale(v) => Matrix4::from_nonuniform_scale(v.x, v.y, v.z),
            TransformOp::RotateX(angle) => Matrix4::from_angle_x(angle),
            TransformOp::RotateY(angle) => Matrix4::from_angle_y(angle),
            TransformOp::RotateZ(angle) => Matrix4::from_angle_z(angle),
        }
    }
}

/// An ordered transform stack plus the ancestor-assigned world matrix.
///
/// Ops are appended and never reordered. The model matrix is the fold of
/// the stack with the first-pushed op applied first (innermost). Rotations
/// are pushed as separate X/Y/Z matrices in the order supplied — there is
/// no quaternion normalization, so rotation order is the caller's
/// responsibility.
#[derive(Debug, Clone)]
pub struct Transform {
    ops: Vec<TransformOp>,
    world: Matrix4<f32>,
    dirty: bool,
}

impl Transform {
    pub fn new() -> Self {
        Self {
            ops: Vec::new(),
            world: Matrix4::identity(),
            dirty: true,
        }
    }

    pub fn push(&mut self, op: TransformOp) {
        self.ops.push(op);
        self.dirty = true;
    }

    pub fn translate(&mut self, x: f32, y: f32, z: f32) {
        self.push(TransformOp::Translate(Vector3::new(x, y, z)));
    }

    pub fn scale(&mut self, x: f32, y: f32, z: f32) {
        self.push(TransformOp::Scale(Vector3::new(x, y, z)));
    }

    pub fn rotate_x(&mut self, angle: Rad<f32>) {
        self.push(TransformOp::RotateX(angle));
    }

    pub fn rotate_y(&mut self, angle: Rad<f32>) {
        self.push(TransformOp::RotateY(angle));
    }

    pub fn rotate_z(&mut self, angle: Rad<f32>) {
        self.push(TransformOp::RotateZ(angle));
    }

    pub fn ops(&self) -> &[TransformOp] {
        &self.ops
    }

    /// Removes every op. Used after baking transforms into mesh data.
    pub fn clear_ops(&mut self) {
        self.ops.clear();
        self.dirty = true;
    }

    /// Model matrix: the fold of the op stack in application order.
    pub fn model_matrix(&self) -> Matrix4<f32> {
        self.ops
            .iter()
            .fold(Matrix4::identity(), |acc, op| op.matrix() * acc)
    }

    /// Ancestor-accumulated matrix, assigned by the propagation pass (or
    /// explicitly by the caller for root nodes).
    pub fn world_matrix(&self) -> Matrix4<f32> {
        self.world
    }

    /// Explicitly assigns the world matrix and marks the node dirty so the
    /// next propagation pass pushes it down to descendants.
    pub fn set_world_matrix(&mut self, world: Matrix4<f32>) {
        self.world = world;
        self.dirty = true;
    }

    /// Assignment from the propagation pass itself; does not re-dirty.
    pub(crate) fn assign_world(&mut self, world: Matrix4<f32>) {
        self.world = world;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Returns the dirty flag and clears it.
    pub(crate) fn take_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{Point3, Rad};

    #[test]
    fn first_pushed_op_applies_first() {
        let mut transform = Transform::new();
        transform.translate(1.0, 0.0, 0.0);
        transform.scale(2.0, 2.0, 2.0);

        let model = transform.model_matrix();
        let p = model * Point3::new(0.0, 0.0, 0.0).to_homogeneous();
        // Translate first, then scale: (0,0,0) -> (1,0,0) -> (2,0,0).
        assert_eq!(p.x, 2.0);
        assert_eq!(p.y, 0.0);
        assert_eq!(p.z, 0.0);
    }

    #[test]
    fn rotations_apply_in_push_order() {
        let half_pi = Rad(std::f32::consts::FRAC_PI_2);

        let mut xy = Transform::new();
        xy.rotate_x(half_pi);
        xy.rotate_y(half_pi);

        let mut yx = Transform::new();
        yx.rotate_y(half_pi);
        yx.rotate_x(half_pi);

        let p = Point3::new(0.0, 1.0, 0.0).to_homogeneous();
        let a = xy.model_matrix() * p;
        let b = yx.model_matrix() * p;
        // X then Y sends +Y to +X; Y then X sends +Y to +Z.
        assert!((a.x - 1.0).abs() < 1e-6 && a.z.abs() < 1e-6);
        assert!((b.z - 1.0).abs() < 1e-6 && b.x.abs() < 1e-6);
    }

    #[test]
    fn model_matrices_invert_cleanly() {
        let mut transform = Transform::new();
        transform.translate(1.0, 2.0, 3.0);
        transform.rotate_y(Rad(0.7));
        transform.scale(2.0, 1.0, 0.5);

        let model = transform.model_matrix();
        let back = model.invert().unwrap().invert().unwrap();
        let a: &[f32; 16] = model.as_ref();
        let b: &[f32; 16] = back.as_ref();
        for (x, y) in a.iter().zip(b.iter()) {
            assert!((x - y).abs() < 1e-4);
        }

        assert_eq!(Matrix4::<f32>::identity().determinant(), 1.0);
    }

    #[test]
    fn mutation_marks_dirty() {
        let mut transform = Transform::new();
        assert!(transform.take_dirty());
        assert!(!transform.is_dirty());

        transform.translate(1.0, 2.0, 3.0);
        assert!(transform.is_dirty());
        transform.take_dirty();

        transform.set_world_matrix(Matrix4::identity());
        assert!(transform.is_dirty());
    }
}
