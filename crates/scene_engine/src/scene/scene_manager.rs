//! Scene container
//!
//! A [`Scene`] holds every mesh and light produced by a loader. Meshes are
//! uploaded to the render backend once after loading; instances created with
//! [`Mesh::instantiate`] reuse the upload of the mesh they were copied from.

use std::collections::HashSet;

use crate::assets::SceneData;
use crate::core::config::LightingConfig;
use crate::render::api::{MeshHandle, RenderBackend};
use crate::render::lighting::{Light, LightManager};
use crate::render::primitives::Mesh;
use crate::render::RenderResult;

/// A mesh and its backend residency
#[derive(Debug, Clone)]
pub struct SceneObject {
    /// The mesh itself; its transform may be changed between frames
    pub mesh: Mesh,
    handle: Option<MeshHandle>,
}

impl SceneObject {
    fn new(mesh: Mesh) -> Self {
        Self { mesh, handle: None }
    }

    /// Backend handle, once uploaded
    pub fn handle(&self) -> Option<MeshHandle> {
        self.handle
    }
}

/// Meshes and lights of one loaded scene
#[derive(Debug, Clone, Default)]
pub struct Scene {
    objects: Vec<SceneObject>,
    lights: LightManager,
}

impl Scene {
    /// Create an empty scene returning at most `max_lights` lights per mesh
    pub fn new(max_lights: usize) -> Self {
        Self {
            objects: Vec::new(),
            lights: LightManager::new(max_lights),
        }
    }

    /// Build a scene from loader output
    pub fn from_data(data: SceneData, lighting: &LightingConfig) -> Self {
        let mut scene = Self::new(lighting.max_lights_per_object);
        for mesh in data.meshes {
            scene.add_mesh(mesh);
        }
        for light in data.lights {
            scene.add_light(light);
        }
        log::debug!(
            "Scene built with {} meshes and {} lights",
            scene.mesh_count(),
            scene.lights.len()
        );
        scene
    }

    /// Add a mesh, returning its index
    pub fn add_mesh(&mut self, mesh: Mesh) -> usize {
        self.objects.push(SceneObject::new(mesh));
        self.objects.len() - 1
    }

    /// Add a light (directional lights go to the front of the order)
    pub fn add_light(&mut self, light: Light) {
        self.lights.add_light(light);
    }

    /// All objects in insertion order
    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    /// Mesh at `index`
    pub fn mesh(&self, index: usize) -> Option<&Mesh> {
        self.objects.get(index).map(|object| &object.mesh)
    }

    /// Mutable mesh at `index`, for moving objects between frames
    pub fn mesh_mut(&mut self, index: usize) -> Option<&mut Mesh> {
        self.objects.get_mut(index).map(|object| &mut object.mesh)
    }

    /// Number of meshes
    pub fn mesh_count(&self) -> usize {
        self.objects.len()
    }

    /// Scene lights
    pub fn lights(&self) -> &LightManager {
        &self.lights
    }

    /// Mutable scene lights
    pub fn lights_mut(&mut self) -> &mut LightManager {
        &mut self.lights
    }

    /// Whether every mesh has a backend handle
    pub fn is_uploaded(&self) -> bool {
        self.objects.iter().all(|object| object.handle.is_some())
    }

    /// Upload every mesh that has no handle yet
    ///
    /// Meshes sharing geometry with an already uploaded mesh reuse its
    /// handle. Returns the number of new backend uploads.
    pub fn upload(&mut self, backend: &mut impl RenderBackend) -> RenderResult<usize> {
        let mut uploads = 0;
        for index in 0..self.objects.len() {
            if self.objects[index].handle.is_some() {
                continue;
            }

            let shared = self.objects[..index].iter().find_map(|other| {
                other
                    .handle
                    .filter(|_| other.mesh.shares_geometry_with(&self.objects[index].mesh))
            });

            let handle = match shared {
                Some(handle) => handle,
                None => {
                    uploads += 1;
                    backend.upload_mesh(&self.objects[index].mesh)?
                }
            };
            self.objects[index].handle = Some(handle);
        }

        log::info!("Uploaded {} meshes for {} scene objects", uploads, self.objects.len());
        Ok(uploads)
    }

    /// Release every backend handle held by the scene
    ///
    /// Meshes stay in the scene and can be uploaded again.
    pub fn unload(&mut self, backend: &mut impl RenderBackend) -> RenderResult<()> {
        let mut released = HashSet::new();
        for object in &mut self.objects {
            if let Some(handle) = object.handle.take() {
                if released.insert(handle) {
                    backend.release_mesh(handle)?;
                }
            }
        }
        log::debug!("Released {} backend meshes", released.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::{Transform, Vec3};
    use crate::render::backends::HeadlessBackend;
    use crate::render::material::{Material, Texture};

    fn cube() -> Mesh {
        Mesh::default_cube(Material::new(Texture::shared("crateTex.png")))
    }

    #[test]
    fn test_from_data_orders_lights() {
        let data = SceneData {
            meshes: vec![cube()],
            lights: vec![
                Light::point(Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0), 1.0, 1.0),
                Light::directional(Vec3::new(0.0, -1.0, 0.0), Vec3::new(1.0, 1.0, 1.0), 1.0),
            ],
        };
        let scene = Scene::from_data(data, &LightingConfig::default());

        assert_eq!(scene.mesh_count(), 1);
        assert_eq!(scene.lights().len(), 2);
        assert!(matches!(scene.lights().lights()[0], Light::Directional { .. }));
        assert_eq!(scene.lights().max_lights(), 16);
    }

    #[test]
    fn test_instances_share_one_upload() {
        let mut scene = Scene::new(16);
        let original = cube();
        let copy = original.instantiate(Some(Transform::from_position(Vec3::new(3.0, 0.0, 0.0))));
        scene.add_mesh(original);
        scene.add_mesh(copy);
        scene.add_mesh(cube());

        let mut backend = HeadlessBackend::new();
        assert_eq!(scene.upload(&mut backend).unwrap(), 2);
        assert!(scene.is_uploaded());
        assert_eq!(scene.objects()[0].handle(), scene.objects()[1].handle());
        assert_eq!(backend.resident_mesh_count(), 2);

        // A second upload is a no-op
        assert_eq!(scene.upload(&mut backend).unwrap(), 0);
    }

    #[test]
    fn test_unload_releases_each_handle_once() {
        let mut scene = Scene::new(16);
        let original = cube();
        scene.add_mesh(original.instantiate(None));
        scene.add_mesh(original);

        let mut backend = HeadlessBackend::new();
        scene.upload(&mut backend).unwrap();
        scene.unload(&mut backend).unwrap();

        assert_eq!(backend.resident_mesh_count(), 0);
        assert!(!scene.is_uploaded());
        assert_eq!(scene.mesh_count(), 2);
    }

    #[test]
    fn test_mesh_mut_moves_object() {
        let mut scene = Scene::new(16);
        let index = scene.add_mesh(cube());
        scene.mesh_mut(index).unwrap().transform.position = Vec3::new(0.0, 2.0, 0.0);
        assert_eq!(scene.mesh(index).unwrap().center(), Vec3::new(0.0, 2.0, 0.0));
        assert!(scene.mesh(index + 1).is_none());
    }
}
