//! Scene aggregate
//!
//! Owns the entity registries built from a [`SceneDescription`] and runs
//! the per-frame world-matrix update pass. GPU-side registries live with
//! the renderer; this type is pure CPU state.

use super::camera::Camera;
use super::description::{SceneDescription, TextureSource};
use super::group::{propagate_world_matrices, Group};
use super::light::Light;
use super::material::Material;
use super::mesh::Mesh;
use super::probe::Probe;
use super::SceneError;
use crate::gfx::resources::registry::{Registry, ResourceKey};

pub struct Scene {
    pub camera: Camera,
    pub meshes: Registry<Mesh>,
    pub materials: Registry<Material>,
    pub lights: Registry<Light>,
    pub groups: Registry<Group>,
    pub probes: Registry<Probe>,
    /// Raw texture content carried until the renderer uploads it.
    pub texture_sources: Registry<TextureSource>,
    /// Ordered (pipeline name, group key) associations.
    pub passes: Vec<(String, String)>,
}

impl Scene {
    /// Builds a scene from a supplier description, validating cameras and
    /// mesh attribute invariants.
    pub fn from_description(description: SceneDescription) -> Result<Self, SceneError> {
        let SceneDescription {
            cameras,
            textures,
            materials,
            meshes,
            groups,
            lights,
            probes,
            passes,
            active_camera,
        } = description;

        let camera = {
            let entry = match &active_camera {
                Some(name) => cameras.iter().find(|(n, _)| n == name),
                None => cameras.first(),
            };
            let (name, desc) = entry.ok_or(SceneError::MissingCamera)?;
            Camera::from_description(name, desc)?
        };

        let mut scene = Self {
            camera,
            meshes: Registry::new(),
            materials: Registry::new(),
            lights: Registry::new(),
            groups: Registry::new(),
            probes: Registry::new(),
            texture_sources: Registry::new(),
            passes,
        };

        for (name, source) in textures {
            scene.texture_sources.insert(ResourceKey::named(name), source);
        }
        for (name, material) in materials {
            scene.materials.insert(ResourceKey::named(name), material);
        }
        for (name, mesh) in meshes {
            mesh.validate().map_err(|reason| SceneError::InvalidMesh {
                name: name.clone(),
                reason,
            })?;
            scene.meshes.insert(ResourceKey::named(name), mesh);
        }
        for (name, group) in groups {
            scene.groups.insert(ResourceKey::named(name), group);
        }
        for (name, light) in lights {
            scene.lights.insert(ResourceKey::named(name), light);
        }
        for (name, probe) in probes {
            scene.probes.insert(ResourceKey::named(name), probe);
        }

        // Seed world matrices so the first frame does not depend on a
        // mutation having happened.
        scene.update_world_transforms();
        Ok(scene)
    }

    /// Recomputes world matrices below every dirty node. Runs once per
    /// frame before rendering; cheap when nothing moved.
    pub fn update_world_transforms(&mut self) {
        for (_, group) in self.groups.iter_mut() {
            propagate_world_matrices(group, &mut self.meshes);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::scene::description::{CameraDescription, PerspectiveParams};
    use cgmath::Point3;

    fn camera_entry() -> (String, CameraDescription) {
        (
            "main".to_string(),
            CameraDescription {
                position: Point3::new(0.0, 1.0, 5.0),
                target: Point3::new(0.0, 0.0, 0.0),
                perspective: Some(PerspectiveParams {
                    fov_y_deg: 60.0,
                    near: 0.1,
                    far: 100.0,
                }),
                orthographic: None,
            },
        )
    }

    #[test]
    fn missing_camera_is_fatal() {
        let result = Scene::from_description(SceneDescription::default());
        assert!(matches!(result, Err(SceneError::MissingCamera)));
    }

    #[test]
    fn invalid_mesh_names_the_mesh() {
        let mut bad = Mesh::default();
        bad.positions = vec![0.0, 0.0]; // not a multiple of 3
        let description = SceneDescription {
            cameras: vec![camera_entry()],
            meshes: vec![("broken".to_string(), bad)],
            ..Default::default()
        };
        let err = Scene::from_description(description).unwrap_err();
        assert!(matches!(
            err,
            SceneError::InvalidMesh { ref name, .. } if name == "broken"
        ));
    }

    #[test]
    fn registries_preserve_supplier_order() {
        let description = SceneDescription {
            cameras: vec![camera_entry()],
            meshes: vec![
                ("zebra".to_string(), Mesh::default()),
                ("apple".to_string(), Mesh::default()),
            ],
            ..Default::default()
        };
        let scene = Scene::from_description(description).unwrap();
        let keys: Vec<String> = scene.meshes.iter().map(|(k, _)| k.to_string()).collect();
        assert_eq!(keys, vec!["zebra".to_string(), "apple".to_string()]);
    }
}
