//! Backend abstraction traits for the rendering system
//!
//! The scene core never talks to a graphics API directly. It uploads meshes,
//! binds textures, writes named shader uniforms and issues indexed draws
//! through these traits; window setup and shader sources live with the
//! implementor.

use crate::foundation::math::{Mat3, Mat4, Vec3, Vec4};
use crate::render::material::Texture;
use crate::render::primitives::Mesh;
use crate::render::RenderError;

/// Result type for backend operations
pub type BackendResult<T> = Result<T, RenderError>;

/// Handle to a mesh resource stored in the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshHandle(pub u64);

/// Named uniform writes consumed by the shading stage
///
/// Names follow the shading stage's layout, e.g. `model`, `material.shininess`
/// or `lights[3].vector`.
pub trait ShaderUniforms {
    /// Write a 4x4 matrix
    fn set_mat4(&mut self, name: &str, value: &Mat4);

    /// Write a 3x3 matrix
    fn set_mat3(&mut self, name: &str, value: &Mat3);

    /// Write a 3-component vector
    fn set_vec3(&mut self, name: &str, value: &Vec3);

    /// Write a 4-component vector
    fn set_vec4(&mut self, name: &str, value: &Vec4);

    /// Write a scalar
    fn set_float(&mut self, name: &str, value: f32);
}

/// Main rendering backend trait
pub trait RenderBackend: ShaderUniforms {
    /// Upload a mesh's vertex and index buffers, returning an opaque handle
    fn upload_mesh(&mut self, mesh: &Mesh) -> BackendResult<MeshHandle>;

    /// Release the GPU resources behind `handle`
    fn release_mesh(&mut self, handle: MeshHandle) -> BackendResult<()>;

    /// Make `texture` the active texture for following draws
    fn bind_texture(&mut self, texture: &Texture) -> BackendResult<()>;

    /// Draw `index_count` indices of an uploaded mesh as triangles
    fn draw_indexed(&mut self, handle: MeshHandle, index_count: u32) -> BackendResult<()>;
}
