//! Render queue for one frame
//!
//! Collects the scene objects that survive culling, orders them by distance
//! from the camera and attaches the lights each one should be shaded with.

use std::cmp::Ordering;

use crate::render::api::MeshHandle;
use crate::render::culling;
use crate::render::draw_order;
use crate::render::lighting::LightSelection;
use crate::render::primitives::{Camera, Mesh};
use crate::scene::Scene;

/// One mesh to draw this frame
#[derive(Debug, Clone)]
pub struct DrawCommand<'a> {
    /// Index of the object in its scene
    pub object_index: usize,
    /// Mesh to draw
    pub mesh: &'a Mesh,
    /// Backend handle, `None` when the scene was not uploaded
    pub handle: Option<MeshHandle>,
    /// Lights relevant to this mesh
    pub lights: LightSelection<'a>,
}

/// Visible draws for a frame, nearest surface first
#[derive(Debug, Clone, Default)]
pub struct RenderQueue<'a> {
    commands: Vec<DrawCommand<'a>>,
    considered: usize,
    culled: usize,
}

impl<'a> RenderQueue<'a> {
    /// Build the queue for `scene` as seen from `camera`
    ///
    /// With `cull` unset every object is queued.
    pub fn build(scene: &'a Scene, camera: &Camera, cull: bool) -> Self {
        let objects = scene.objects();
        let mut culled = 0;
        let mut commands = Vec::with_capacity(objects.len());

        for (object_index, object) in objects.iter().enumerate() {
            if cull && !culling::is_visible(camera, &object.mesh) {
                culled += 1;
                continue;
            }
            commands.push(DrawCommand {
                object_index,
                mesh: &object.mesh,
                handle: object.handle(),
                lights: scene.lights().relevant_lights_for(&object.mesh),
            });
        }

        let camera_position = camera.position();
        commands.sort_by(|a, b| draw_order::compare_by_distance(&camera_position, a.mesh, b.mesh));

        log::trace!("Render queue: {} of {} objects visible", commands.len(), objects.len());
        Self {
            commands,
            considered: objects.len(),
            culled,
        }
    }

    /// Queued draws in submission order
    pub fn commands(&self) -> &[DrawCommand<'a>] {
        &self.commands
    }

    /// Number of queued draws
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether nothing is visible
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Objects examined while building the queue
    pub fn considered(&self) -> usize {
        self.considered
    }

    /// Objects rejected by the culler
    pub fn culled(&self) -> usize {
        self.culled
    }

    /// Draws whose light list hit the per-mesh cap
    pub fn truncated_light_count(&self) -> usize {
        self.commands.iter().filter(|command| command.lights.truncated).count()
    }

    /// Whether the queue is in submission order for `camera`
    pub fn is_sorted_for(&self, camera: &Camera) -> bool {
        let position = camera.position();
        self.commands.windows(2).all(|pair| {
            draw_order::compare_by_distance(&position, pair[0].mesh, pair[1].mesh) != Ordering::Greater
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::CameraConfig;
    use crate::foundation::math::{Transform, Vec3};
    use crate::render::lighting::Light;
    use crate::render::material::{Material, Texture};

    fn cube_at(position: Vec3) -> Mesh {
        let mut mesh = Mesh::default_cube(Material::new(Texture::shared("crateTex.png")));
        mesh.transform = Transform::from_position(position);
        mesh
    }

    fn camera() -> Camera {
        // Starts at (0, 0, 3) looking down -Z
        Camera::new(&CameraConfig::default())
    }

    #[test]
    fn test_queue_culls_and_sorts() {
        let mut scene = Scene::new(16);
        scene.add_mesh(cube_at(Vec3::new(0.0, 0.0, -10.0)));
        scene.add_mesh(cube_at(Vec3::new(0.0, 0.0, 20.0)));
        scene.add_mesh(cube_at(Vec3::new(0.0, 0.0, -2.0)));

        let camera = camera();
        let queue = RenderQueue::build(&scene, &camera, true);

        assert_eq!(queue.considered(), 3);
        assert_eq!(queue.culled(), 1);
        let order: Vec<_> = queue.commands().iter().map(|command| command.object_index).collect();
        assert_eq!(order, vec![2, 0]);
        assert!(queue.is_sorted_for(&camera));
    }

    #[test]
    fn test_unculled_queue_keeps_everything() {
        let mut scene = Scene::new(16);
        scene.add_mesh(cube_at(Vec3::new(0.0, 0.0, 20.0)));
        let queue = RenderQueue::build(&scene, &camera(), false);
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.culled(), 0);
        assert!(queue.commands()[0].handle.is_none());
    }

    #[test]
    fn test_commands_carry_light_selection() {
        let mut scene = Scene::new(1);
        scene.add_mesh(cube_at(Vec3::zeros()));
        scene.add_light(Light::directional(Vec3::new(0.0, -1.0, 0.0), Vec3::new(1.0, 1.0, 1.0), 1.0));
        scene.add_light(Light::point(Vec3::new(0.5, 0.0, 0.0), Vec3::new(1.0, 1.0, 1.0), 1.0, 1.0));

        let queue = RenderQueue::build(&scene, &camera(), true);
        assert_eq!(queue.commands()[0].lights.len(), 1);
        assert_eq!(queue.truncated_light_count(), 1);
    }

    #[test]
    fn test_empty_scene() {
        let scene = Scene::default();
        let queue = RenderQueue::build(&scene, &camera(), true);
        assert!(queue.is_empty());
        assert_eq!(queue.considered(), 0);
    }
}
