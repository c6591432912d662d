//! # Primitive Shape Generation
//!
//! This module contains functions to generate common 3D primitive shapes.
//! All shapes are generated with proper normals and texture coordinates.

use std::f32::consts::PI;

use crate::gfx::scene::Mesh;

/// Generate a unit cube centered at the origin
///
/// Returns a cube with vertices from -0.5 to 0.5 on all axes. Each face has
/// normals pointing outward and UV coordinates from 0 to 1.
pub fn cube() -> Mesh {
    let positions: [[f32; 3]; 24] = [
        // Front face
        [-0.5, -0.5, 0.5], [0.5, -0.5, 0.5], [0.5, 0.5, 0.5], [-0.5, 0.5, 0.5],
        // Back face
        [-0.5, -0.5, -0.5], [-0.5, 0.5, -0.5], [0.5, 0.5, -0.5], [0.5, -0.5, -0.5],
        // Left face
        [-0.5, -0.5, -0.5], [-0.5, -0.5, 0.5], [-0.5, 0.5, 0.5], [-0.5, 0.5, -0.5],
        // Right face
        [0.5, -0.5, 0.5], [0.5, -0.5, -0.5], [0.5, 0.5, -0.5], [0.5, 0.5, 0.5],
        // Top face
        [-0.5, 0.5, 0.5], [0.5, 0.5, 0.5], [0.5, 0.5, -0.5], [-0.5, 0.5, -0.5],
        // Bottom face
        [-0.5, -0.5, -0.5], [0.5, -0.5, -0.5], [0.5, -0.5, 0.5], [-0.5, -0.5, 0.5],
    ];

    let normals: [[f32; 3]; 6] = [
        [0.0, 0.0, 1.0],
        [0.0, 0.0, -1.0],
        [-1.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.0, -1.0, 0.0],
    ];

    let face_uvs: [[f32; 2]; 4] = [[0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]];

    let mut mesh = Mesh::default();
    for (i, position) in positions.iter().enumerate() {
        mesh.positions.extend_from_slice(position);
        mesh.normals.extend_from_slice(&normals[i / 4]);
        mesh.uvs.extend_from_slice(&face_uvs[i % 4]);
    }
    for face in 0..6u32 {
        let base = face * 4;
        mesh.indices
            .extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
    }
    mesh
}

/// Generate a unit quad in the XY plane
///
/// Vertices span -0.5 to 0.5 in X and Y; the normal points along +Z.
pub fn quad() -> Mesh {
    let mut mesh = Mesh::default();
    let corners: [([f32; 2], [f32; 2]); 4] = [
        ([-0.5, -0.5], [0.0, 1.0]),
        ([0.5, -0.5], [1.0, 1.0]),
        ([0.5, 0.5], [1.0, 0.0]),
        ([-0.5, 0.5], [0.0, 0.0]),
    ];
    for (position, uv) in corners {
        mesh.positions
            .extend_from_slice(&[position[0], position[1], 0.0]);
        mesh.normals.extend_from_slice(&[0.0, 0.0, 1.0]);
        mesh.uvs.extend_from_slice(&uv);
    }
    mesh.indices = vec![0, 1, 2, 2, 3, 0];
    mesh
}

/// Generate a triangle covering the whole clip-space viewport
///
/// Three vertices at (-1,-1), (3,-1), (-1,3); UVs chosen so the visible
/// unit square maps to 0..1.
pub fn fullscreen_triangle() -> Mesh {
    let mut mesh = Mesh::default();
    let vertices: [([f32; 2], [f32; 2]); 3] =
        [([-1.0, -1.0], [0.0, 1.0]), ([3.0, -1.0], [2.0, 1.0]), ([-1.0, 3.0], [0.0, -1.0])];
    for (position, uv) in vertices {
        mesh.positions
            .extend_from_slice(&[position[0], position[1], 0.0]);
        mesh.normals.extend_from_slice(&[0.0, 0.0, 1.0]);
        mesh.uvs.extend_from_slice(&uv);
    }
    mesh.indices = vec![0, 1, 2];
    mesh
}

/// Generate a UV sphere of radius 1 centered at the origin
///
/// # Arguments
/// * `longitude_segments` - Subdivision density around the equator (min 3)
/// * `latitude_segments` - Subdivision density pole to pole (min 2)
///
/// Pole rings collapse to a single vertex each; interior rings carry one
/// duplicated seam vertex so UVs can wrap without a discontinuity.
pub fn sphere(longitude_segments: u32, latitude_segments: u32) -> Mesh {
    let cols = longitude_segments.max(3);
    let rows = latitude_segments.max(2);

    let mut mesh = Mesh::default();

    // North pole
    mesh.positions.extend_from_slice(&[0.0, 1.0, 0.0]);
    mesh.normals.extend_from_slice(&[0.0, 1.0, 0.0]);
    mesh.uvs.extend_from_slice(&[0.5, 0.0]);

    // Interior rings duplicate the seam vertex (long == cols) for UV wrap.
    for lat in 1..rows {
        let theta = lat as f32 * PI / rows as f32;
        let (sin_theta, cos_theta) = theta.sin_cos();
        for long in 0..=cols {
            let phi = long as f32 * 2.0 * PI / cols as f32;
            let (sin_phi, cos_phi) = phi.sin_cos();
            let x = sin_theta * cos_phi;
            let y = cos_theta;
            let z = sin_theta * sin_phi;
            mesh.positions.extend_from_slice(&[x, y, z]);
            mesh.normals.extend_from_slice(&[x, y, z]);
            mesh.uvs
                .extend_from_slice(&[long as f32 / cols as f32, lat as f32 / rows as f32]);
        }
    }

    // South pole
    let south = (mesh.positions.len() / 3) as u32;
    mesh.positions.extend_from_slice(&[0.0, -1.0, 0.0]);
    mesh.normals.extend_from_slice(&[0.0, -1.0, 0.0]);
    mesh.uvs.extend_from_slice(&[0.5, 1.0]);

    let ring = |r: u32| 1 + r * (cols + 1);

    // Top fan
    for long in 0..cols {
        mesh.indices
            .extend_from_slice(&[0, ring(0) + long + 1, ring(0) + long]);
    }
    // Quads between interior rings
    for r in 0..rows.saturating_sub(2) {
        for long in 0..cols {
            let a = ring(r) + long;
            let b = a + 1;
            let c = ring(r + 1) + long;
            let d = c + 1;
            mesh.indices.extend_from_slice(&[a, c, b, b, c, d]);
        }
    }
    // Bottom fan
    let last = ring(rows - 2);
    for long in 0..cols {
        mesh.indices
            .extend_from_slice(&[last + long, south, last + long + 1]);
    }

    mesh
}

/// Generate a unit plane subdivided into a row/column grid
///
/// The plane lies in the XY plane, spans -0.5 to 0.5 on both axes, and has
/// its normal along +Z.
pub fn grid(rows: u32, cols: u32) -> Mesh {
    let rows = rows.max(1);
    let cols = cols.max(1);

    let mut mesh = Mesh::default();
    for y in 0..=rows {
        let v = y as f32 / rows as f32;
        for x in 0..=cols {
            let u = x as f32 / cols as f32;
            mesh.positions
                .extend_from_slice(&[u - 0.5, v - 0.5, 0.0]);
            mesh.normals.extend_from_slice(&[0.0, 0.0, 1.0]);
            mesh.uvs.extend_from_slice(&[u, 1.0 - v]);
        }
    }
    for y in 0..rows {
        for x in 0..cols {
            let i = y * (cols + 1) + x;
            let next_row = i + cols + 1;
            mesh.indices
                .extend_from_slice(&[i, i + 1, next_row, i + 1, next_row + 1, next_row]);
        }
    }
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_counts() {
        let cube = cube();
        assert_eq!(cube.vertex_len(), 24); // 6 faces * 4 vertices
        assert_eq!(cube.indices.len(), 36); // 6 faces * 2 triangles * 3
        assert!(cube.validate().is_ok());
    }

    #[test]
    fn sphere_counts_and_pole_collapse() {
        let cols = 8u32;
        let rows = 6u32;
        let sphere = sphere(cols, rows);

        // 2 poles + (rows - 1) interior rings of (cols + 1) vertices.
        let expected_vertices = 2 + (rows - 1) * (cols + 1);
        assert_eq!(sphere.vertex_len(), expected_vertices as usize);

        // 2 fans of `cols` triangles + (rows - 2) quad strips.
        let expected_triangles = 2 * cols + (rows - 2) * cols * 2;
        assert_eq!(sphere.indices.len(), (expected_triangles * 3) as usize);
        assert!(sphere.validate().is_ok());
    }

    #[test]
    fn sphere_interior_rings_duplicate_the_seam() {
        let sphere = sphere(8, 4);
        // First interior ring starts at vertex 1; its seam duplicate is at
        // the same position with wrapped UV.
        let first = 1usize;
        let seam = first + 8;
        for axis in 0..3 {
            assert!(
                (sphere.positions[first * 3 + axis] - sphere.positions[seam * 3 + axis]).abs()
                    < 1e-6
            );
        }
        assert_eq!(sphere.uvs[first * 2], 0.0);
        assert_eq!(sphere.uvs[seam * 2], 1.0);
    }

    #[test]
    fn sphere_normals_match_positions() {
        let sphere = sphere(6, 4);
        assert_eq!(sphere.positions.len(), sphere.normals.len());
        for (p, n) in sphere
            .positions
            .chunks_exact(3)
            .zip(sphere.normals.chunks_exact(3))
        {
            for axis in 0..3 {
                assert!((p[axis] - n[axis]).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn grid_counts() {
        let grid = grid(2, 3);
        assert_eq!(grid.vertex_len(), 12); // 3 rows x 4 cols of vertices
        assert_eq!(grid.indices.len(), 36); // 6 cells * 2 triangles * 3
        assert!(grid.validate().is_ok());
    }

    #[test]
    fn fullscreen_triangle_covers_clip_space() {
        let triangle = fullscreen_triangle();
        assert_eq!(triangle.vertex_len(), 3);
        let xs: Vec<f32> = triangle.positions.chunks_exact(3).map(|v| v[0]).collect();
        assert!(xs.contains(&3.0) && xs.contains(&-1.0));
    }
}
