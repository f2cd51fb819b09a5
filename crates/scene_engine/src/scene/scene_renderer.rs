//! Scene Renderer - bridges the Scene with a render backend
//!
//! Builds the frame's [`RenderQueue`], then for every queued mesh writes the
//! shading stage's uniforms, binds the material texture and issues one
//! indexed draw.
//!
//! Uniform layout written per frame:
//!
//! | name | type | scope |
//! |------|------|-------|
//! | `view`, `projection` | mat4 | frame |
//! | `viewPos` | vec3 | frame |
//! | `model` | mat4 | mesh |
//! | `normalRot` | mat3 | mesh |
//! | `material.ambientTint` | vec3 | mesh |
//! | `material.diffuseTint` | vec4 | mesh |
//! | `material.shininess` | float | mesh |
//! | `lights[i].vector` | vec4 | mesh |
//! | `lights[i].color` | vec3 | mesh |
//! | `lights[i].intensity` | float | mesh |
//! | `lights[i].radius` | float | mesh, point lights only |
//! | `lightCount` | float | mesh |

use crate::render::api::RenderBackend;
use crate::render::lighting::{Light, LightSelection};
use crate::render::primitives::{Camera, Mesh};
use crate::render::{RenderError, RenderResult};
use crate::scene::{DrawCommand, RenderQueue, Scene};

/// Frame renderer configuration
#[derive(Debug, Clone)]
pub struct FrameRendererConfig {
    /// Skip meshes the culler rejects
    pub enable_frustum_culling: bool,
}

impl Default for FrameRendererConfig {
    fn default() -> Self {
        Self {
            enable_frustum_culling: true,
        }
    }
}

/// What happened while rendering one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Meshes in the scene
    pub considered: usize,
    /// Meshes rejected by the culler
    pub culled: usize,
    /// Draw calls issued
    pub drawn: usize,
    /// Drawn meshes whose light list hit the cap
    pub truncated_light_meshes: usize,
}

/// Per-frame driver for a [`Scene`]
#[derive(Debug, Clone, Default)]
pub struct FrameRenderer {
    config: FrameRendererConfig,
}

impl FrameRenderer {
    /// Create a renderer with the given configuration
    pub fn new(config: FrameRendererConfig) -> Self {
        Self { config }
    }

    /// Current configuration
    pub fn config(&self) -> &FrameRendererConfig {
        &self.config
    }

    /// Render `scene` from `camera` into `backend`
    ///
    /// The scene must have been uploaded to the same backend first.
    pub fn render(
        &self,
        scene: &Scene,
        camera: &Camera,
        backend: &mut impl RenderBackend,
    ) -> RenderResult<FrameStats> {
        let queue = RenderQueue::build(scene, camera, self.config.enable_frustum_culling);

        backend.set_mat4("view", camera.view_matrix());
        backend.set_mat4("projection", camera.projection_matrix());
        backend.set_vec3("viewPos", &camera.position());

        for command in queue.commands() {
            Self::draw(command, backend)?;
        }

        Ok(FrameStats {
            considered: queue.considered(),
            culled: queue.culled(),
            drawn: queue.len(),
            truncated_light_meshes: queue.truncated_light_count(),
        })
    }

    fn draw(command: &DrawCommand<'_>, backend: &mut impl RenderBackend) -> RenderResult<()> {
        let handle = command.handle.ok_or_else(|| {
            RenderError::RenderingFailed(format!("scene object {} was never uploaded", command.object_index))
        })?;
        let index_count = u32::try_from(command.mesh.indices().len()).map_err(|_| {
            RenderError::RenderingFailed(format!("scene object {} has too many indices", command.object_index))
        })?;

        write_mesh_uniforms(command.mesh, backend);
        write_light_uniforms(&command.lights, backend);

        backend.bind_texture(&command.mesh.material.texture)?;
        backend.draw_indexed(handle, index_count)
    }
}

fn write_mesh_uniforms(mesh: &Mesh, backend: &mut impl RenderBackend) {
    let material = &mesh.material;
    backend.set_mat4("model", &mesh.transform.model_matrix());
    backend.set_mat3("normalRot", &mesh.transform.normal_matrix());
    backend.set_vec3("material.ambientTint", &material.ambient_tint);
    backend.set_vec4("material.diffuseTint", &material.diffuse_tint);
    backend.set_float("material.shininess", material.shininess);
}

fn write_light_uniforms(selection: &LightSelection<'_>, backend: &mut impl RenderBackend) {
    for (index, light) in selection.lights.iter().enumerate() {
        backend.set_vec4(&format!("lights[{index}].vector"), &light.internal_vector());
        backend.set_vec3(&format!("lights[{index}].color"), &light.color());
        backend.set_float(&format!("lights[{index}].intensity"), light.intensity());
        if let Light::Point { radius, .. } = light {
            backend.set_float(&format!("lights[{index}].radius"), *radius);
        }
    }
    backend.set_float("lightCount", selection.len() as f32);
}
