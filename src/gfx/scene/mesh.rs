//! CPU-side mesh data and geometry operations
//!
//! A mesh holds independently sized vertex attribute buffers, a triangle
//! index buffer, a material reference, and its own transform stack. All
//! populated attribute buffers must have length `vertex_len * components`.

use cgmath::{InnerSpace, Matrix, Matrix3, Matrix4, SquareMatrix, Vector3};

use super::transform::Transform;

/// Raw mesh data as supplied by the scene description.
///
/// Attribute buffers are flat `f32` streams: positions/normals/tangents
/// with 3 components per vertex, uvs with 2, colors with 4. Empty buffers
/// mean the attribute is absent.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub positions: Vec<f32>,
    pub normals: Vec<f32>,
    pub uvs: Vec<f32>,
    pub colors: Vec<f32>,
    pub tangents: Vec<f32>,
    pub indices: Vec<u32>,
    /// Material registry name; resolved at bind time.
    pub material: String,
    pub transform: Transform,
}

impl Mesh {
    pub fn new(positions: Vec<f32>, normals: Vec<f32>, indices: Vec<u32>) -> Self {
        Self {
            positions,
            normals,
            indices,
            ..Self::default()
        }
    }

    pub fn vertex_len(&self) -> usize {
        self.positions.len() / 3
    }

    /// Checks the attribute length invariant. Returns a description of the
    /// first violation found.
    pub fn validate(&self) -> Result<(), String> {
        if self.positions.len() % 3 != 0 {
            return Err(format!(
                "positions length {} is not a multiple of 3",
                self.positions.len()
            ));
        }
        let vertex_len = self.vertex_len();
        let attributes: [(&str, usize, usize); 4] = [
            ("normals", self.normals.len(), 3),
            ("uvs", self.uvs.len(), 2),
            ("colors", self.colors.len(), 4),
            ("tangents", self.tangents.len(), 3),
        ];
        for (name, len, components) in attributes {
            if len != 0 && len != vertex_len * components {
                return Err(format!(
                    "{name} length {len} does not match {vertex_len} vertices x {components} components"
                ));
            }
        }
        if let Some(&index) = self.indices.iter().find(|&&i| i as usize >= vertex_len) {
            return Err(format!(
                "index {index} out of range for {vertex_len} vertices"
            ));
        }
        Ok(())
    }

    /// Axis-aligned bounding box of the positions, if any.
    pub fn bounding_box(&self) -> Option<([f32; 3], [f32; 3])> {
        if self.positions.is_empty() {
            return None;
        }
        let mut min = [f32::MAX; 3];
        let mut max = [f32::MIN; 3];
        for vertex in self.positions.chunks_exact(3) {
            for axis in 0..3 {
                min[axis] = min[axis].min(vertex[axis]);
                max[axis] = max[axis].max(vertex[axis]);
            }
        }
        Some((min, max))
    }

    /// Recenters and/or rescales positions in place.
    ///
    /// With `center`, the bounding box midpoint moves to the origin; with
    /// `scale`, positions are divided by the box's maximum extent so the
    /// largest dimension spans exactly 1.
    pub fn normalize_positions(&mut self, center: bool, scale: bool) {
        let Some((min, max)) = self.bounding_box() else {
            return;
        };
        let mid = [
            (min[0] + max[0]) * 0.5,
            (min[1] + max[1]) * 0.5,
            (min[2] + max[2]) * 0.5,
        ];
        let extent = (max[0] - min[0])
            .max(max[1] - min[1])
            .max(max[2] - min[2]);

        for vertex in self.positions.chunks_exact_mut(3) {
            if center {
                for axis in 0..3 {
                    vertex[axis] -= mid[axis];
                }
            }
            if scale && extent > 0.0 {
                for value in vertex.iter_mut() {
                    *value /= extent;
                }
            }
        }
    }

    /// Applies the transform stack to the vertex data and clears it.
    ///
    /// Positions go through the model matrix; normals and tangents through
    /// the normal matrix (inverse-transpose), then renormalized. The world
    /// matrix is untouched.
    pub fn bake_transforms(&mut self) {
        let model = self.transform.model_matrix();
        let normal_matrix = normal_matrix(&model);

        for vertex in self.positions.chunks_exact_mut(3) {
            let p = model * cgmath::Point3::new(vertex[0], vertex[1], vertex[2]).to_homogeneous();
            vertex[0] = p.x;
            vertex[1] = p.y;
            vertex[2] = p.z;
        }
        for stream in [&mut self.normals, &mut self.tangents] {
            for vertex in stream.chunks_exact_mut(3) {
                let mut v = normal_matrix * Vector3::new(vertex[0], vertex[1], vertex[2]);
                let magnitude = v.magnitude();
                if magnitude > 0.0 {
                    v /= magnitude;
                }
                vertex[0] = v.x;
                vertex[1] = v.y;
                vertex[2] = v.z;
            }
        }

        self.transform.clear_ops();
    }

    /// Computes per-vertex normals by accumulating face normals, replacing
    /// any existing normal data. Used when the supplier omits normals.
    pub fn calculate_normals(&mut self) {
        let vertex_len = self.vertex_len();
        let mut normals = vec![0.0f32; vertex_len * 3];

        for triangle in self.indices.chunks_exact(3) {
            let [i0, i1, i2] = [
                triangle[0] as usize,
                triangle[1] as usize,
                triangle[2] as usize,
            ];
            let p = |i: usize| {
                Vector3::new(
                    self.positions[i * 3],
                    self.positions[i * 3 + 1],
                    self.positions[i * 3 + 2],
                )
            };
            let face = (p(i1) - p(i0)).cross(p(i2) - p(i0));
            for &i in &[i0, i1, i2] {
                normals[i * 3] += face.x;
                normals[i * 3 + 1] += face.y;
                normals[i * 3 + 2] += face.z;
            }
        }

        for vertex in normals.chunks_exact_mut(3) {
            let v = Vector3::new(vertex[0], vertex[1], vertex[2]);
            let magnitude = v.magnitude();
            if magnitude > 0.0 {
                vertex[0] = v.x / magnitude;
                vertex[1] = v.y / magnitude;
                vertex[2] = v.z / magnitude;
            }
        }

        self.normals = normals;
    }
}

/// Inverse-transpose of the upper 3x3 of `model`.
///
/// A non-invertible model matrix (degenerate scale) falls back to identity
/// with a warning instead of propagating NaN into vertex data.
pub fn normal_matrix(model: &Matrix4<f32>) -> Matrix3<f32> {
    let upper = Matrix3::new(
        model.x.x, model.x.y, model.x.z,
        model.y.x, model.y.y, model.y.z,
        model.z.x, model.z.y, model.z.z,
    );
    match upper.invert() {
        Some(inverse) => inverse.transpose(),
        None => {
            log::warn!("non-invertible model matrix; using identity normal matrix");
            Matrix3::identity()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad() -> Mesh {
        Mesh::new(
            vec![
                0.0, 0.0, 0.0, //
                1.0, 0.0, 0.0, //
                1.0, 1.0, 0.0, //
                0.0, 1.0, 0.0,
            ],
            vec![
                0.0, 0.0, 1.0, //
                0.0, 0.0, 1.0, //
                0.0, 0.0, 1.0, //
                0.0, 0.0, 1.0,
            ],
            vec![0, 1, 2, 2, 3, 0],
        )
    }

    #[test]
    fn validate_accepts_well_formed_meshes() {
        assert!(quad().validate().is_ok());
    }

    #[test]
    fn validate_rejects_short_attributes() {
        let mut mesh = quad();
        mesh.uvs = vec![0.0, 0.0, 1.0];
        let err = mesh.validate().unwrap_err();
        assert!(err.contains("uvs"), "unexpected error: {err}");
    }

    #[test]
    fn validate_rejects_out_of_range_indices() {
        let mut mesh = quad();
        mesh.indices.push(9);
        assert!(mesh.validate().is_err());
    }

    #[test]
    fn baking_a_translation_offsets_positions_and_keeps_normals() {
        let mut mesh = quad();
        mesh.transform.translate(2.0, -1.0, 0.5);
        mesh.bake_transforms();

        assert_eq!(&mesh.positions[0..3], &[2.0, -1.0, 0.5]);
        assert_eq!(&mesh.positions[3..6], &[3.0, -1.0, 0.5]);
        // Pure translation leaves unit normals untouched.
        assert_eq!(&mesh.normals[0..3], &[0.0, 0.0, 1.0]);
        assert!(mesh.transform.ops().is_empty());
    }

    #[test]
    fn normalize_centers_and_scales_to_unit_extent() {
        let mut mesh = Mesh::new(
            vec![
                -2.0, -2.0, 0.0, //
                0.0, -2.0, 0.0, //
                -2.0, 0.0, 0.0,
            ],
            Vec::new(),
            vec![0, 1, 2],
        );
        mesh.normalize_positions(true, true);

        assert_eq!(&mesh.positions[0..3], &[-0.5, -0.5, 0.0]);
        assert_eq!(&mesh.positions[3..6], &[0.5, -0.5, 0.0]);
        assert_eq!(&mesh.positions[6..9], &[-0.5, 0.5, 0.0]);
    }

    #[test]
    fn degenerate_model_matrix_falls_back_to_identity_normals() {
        let n = normal_matrix(&Matrix4::from_scale(0.0));
        assert_eq!(n, Matrix3::identity());
    }

    #[test]
    fn calculated_normals_are_unit_length() {
        let mut mesh = quad();
        mesh.normals.clear();
        mesh.calculate_normals();

        assert_eq!(mesh.normals.len(), 12);
        for vertex in mesh.normals.chunks_exact(3) {
            let sq = vertex[0] * vertex[0] + vertex[1] * vertex[1] + vertex[2] * vertex[2];
            assert!((sq - 1.0).abs() < 1e-5);
            assert!(vertex[2] > 0.0);
        }
    }
}
