//! Group hierarchy and world-matrix propagation
//!
//! Groups form a tree (children are owned, so cycles cannot be built).
//! Mutating any node's transform marks it dirty; the per-frame propagation
//! pass pushes recomputed world matrices down to every descendant using an
//! explicit worklist rather than recursion.

use cgmath::Matrix4;

use super::mesh::Mesh;
use super::transform::Transform;
use crate::gfx::resources::registry::Registry;

/// A child of a group: a leaf mesh (by mesh registry key) or a nested
/// group.
#[derive(Debug, Clone)]
pub enum Node {
    Mesh(String),
    Group(Group),
}

/// A scene-graph interior node with its own transform stack.
#[derive(Debug, Clone, Default)]
pub struct Group {
    pub transform: Transform,
    pub children: Vec<Node>,
}

impl Group {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_mesh(&mut self, key: impl Into<String>) {
        self.children.push(Node::Mesh(key.into()));
    }

    pub fn add_group(&mut self, group: Group) {
        self.children.push(Node::Group(group));
    }

    /// Keys of every leaf mesh in this subtree, in document order.
    pub fn mesh_keys(&self) -> Vec<&str> {
        let mut keys = Vec::new();
        let mut work: Vec<&Node> = self.children.iter().rev().collect();
        while let Some(node) = work.pop() {
            match node {
                Node::Mesh(key) => keys.push(key.as_str()),
                Node::Group(group) => {
                    for child in group.children.iter().rev() {
                        work.push(child);
                    }
                }
            }
        }
        keys
    }
}

/// Recomputes world matrices for every node below `root`.
///
/// Each child's world matrix is the parent's world matrix composed with the
/// parent's model matrix. The root's own world matrix is left as assigned
/// (identity by default, or whatever the caller set explicitly). Subtrees
/// with no dirty node on the path from the root are skipped — their
/// matrices cannot have changed.
pub fn propagate_world_matrices(root: &mut Group, meshes: &mut Registry<Mesh>) {
    let mut work: Vec<(&mut Group, bool)> = vec![(root, false)];
    while let Some((group, ancestor_dirty)) = work.pop() {
        // Always consume the flag, even under a dirty ancestor, so the
        // node is clean for the next pass.
        let self_dirty = group.transform.take_dirty();
        let dirty = ancestor_dirty || self_dirty;
        let child_world = group.transform.world_matrix() * group.transform.model_matrix();
        for child in group.children.iter_mut() {
            match child {
                Node::Mesh(key) => {
                    if dirty {
                        match meshes.get_mut_named(key) {
                            Some(mesh) => mesh.transform.assign_world(child_world),
                            None => log::warn!("group references unknown mesh `{key}`"),
                        }
                    }
                }
                Node::Group(inner) => work.push((inner, dirty)),
            }
        }
    }
}

/// Assigns `world` to a subtree root and immediately repropagates.
pub fn set_world_matrix(root: &mut Group, meshes: &mut Registry<Mesh>, world: Matrix4<f32>) {
    root.transform.set_world_matrix(world);
    propagate_world_matrices(root, meshes);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::resources::registry::ResourceKey;
    use cgmath::{Matrix4, Vector3};

    fn approx_eq(a: &Matrix4<f32>, b: &Matrix4<f32>) -> bool {
        let a: &[f32; 16] = a.as_ref();
        let b: &[f32; 16] = b.as_ref();
        a.iter().zip(b.iter()).all(|(x, y)| (x - y).abs() < 1e-6)
    }

    fn mesh_registry(keys: &[&str]) -> Registry<Mesh> {
        let mut meshes = Registry::new();
        for key in keys {
            meshes.insert(ResourceKey::named(*key), Mesh::default());
        }
        meshes
    }

    #[test]
    fn nested_groups_compose_world_matrices() {
        let mut meshes = mesh_registry(&["leaf"]);

        let mut inner = Group::new();
        inner.transform.translate(0.0, 5.0, 0.0);
        inner.add_mesh("leaf");

        let mut outer = Group::new();
        outer.transform.translate(1.0, 0.0, 0.0);
        outer.add_group(inner);

        set_world_matrix(
            &mut outer,
            &mut meshes,
            Matrix4::from_translation(Vector3::new(0.0, 0.0, 2.0)),
        );

        // leaf world = outer.world * outer.model * inner.model
        let expected = Matrix4::from_translation(Vector3::new(0.0, 0.0, 2.0))
            * Matrix4::from_translation(Vector3::new(1.0, 0.0, 0.0))
            * Matrix4::from_translation(Vector3::new(0.0, 5.0, 0.0));
        let leaf = meshes.get_named("leaf").unwrap();
        assert!(approx_eq(&leaf.transform.world_matrix(), &expected));
    }

    #[test]
    fn clean_subtrees_are_skipped() {
        let mut meshes = mesh_registry(&["a"]);
        let mut root = Group::new();
        root.add_mesh("a");
        propagate_world_matrices(&mut root, &mut meshes);

        // Fake a stale world on the mesh; a pass with nothing dirty must
        // not touch it.
        meshes
            .get_mut_named("a")
            .unwrap()
            .transform
            .assign_world(Matrix4::from_scale(3.0));
        propagate_world_matrices(&mut root, &mut meshes);
        assert!(approx_eq(
            &meshes.get_named("a").unwrap().transform.world_matrix(),
            &Matrix4::from_scale(3.0)
        ));

        // After a mutation the pass reassigns it.
        root.transform.translate(1.0, 0.0, 0.0);
        propagate_world_matrices(&mut root, &mut meshes);
        assert!(approx_eq(
            &meshes.get_named("a").unwrap().transform.world_matrix(),
            &Matrix4::from_translation(Vector3::new(1.0, 0.0, 0.0))
        ));
    }

    #[test]
    fn mesh_keys_are_in_document_order() {
        let mut child = Group::new();
        child.add_mesh("b");
        child.add_mesh("c");

        let mut root = Group::new();
        root.add_mesh("a");
        root.add_group(child);
        root.add_mesh("d");

        assert_eq!(root.mesh_keys(), vec!["a", "b", "c", "d"]);
    }
}
