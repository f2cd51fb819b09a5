//! Headless recording backend
//!
//! Implements [`RenderBackend`] without touching a GPU. Uploads, texture binds,
//! uniform writes and draw calls are recorded so the frame loop can run in
//! tests and in the headless viewer.

use std::collections::HashMap;
use std::path::PathBuf;

use crate::foundation::math::{Mat3, Mat4, Vec3, Vec4};
use crate::render::api::{BackendResult, MeshHandle, RenderBackend, ShaderUniforms};
use crate::render::material::Texture;
use crate::render::primitives::Mesh;
use crate::render::RenderError;

/// Last value written to a uniform
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    /// 4x4 matrix
    Mat4(Mat4),
    /// 3x3 matrix
    Mat3(Mat3),
    /// 3-component vector
    Vec3(Vec3),
    /// 4-component vector
    Vec4(Vec4),
    /// Scalar
    Float(f32),
}

/// One recorded draw
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCall {
    /// Mesh drawn
    pub mesh: MeshHandle,
    /// Number of indices drawn
    pub index_count: u32,
    /// Texture bound at draw time
    pub texture: Option<PathBuf>,
}

#[derive(Debug, Clone)]
struct UploadedMesh {
    vertex_bytes: usize,
    index_count: usize,
}

/// Backend that records every call instead of rendering
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    next_handle: u64,
    meshes: HashMap<MeshHandle, UploadedMesh>,
    uniforms: HashMap<String, UniformValue>,
    bound_texture: Option<PathBuf>,
    draw_calls: Vec<DrawCall>,
}

impl HeadlessBackend {
    /// Create an empty backend
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget the draws recorded for the previous frame
    pub fn begin_frame(&mut self) {
        self.draw_calls.clear();
    }

    /// Draws recorded since [`Self::begin_frame`]
    pub fn draw_calls(&self) -> &[DrawCall] {
        &self.draw_calls
    }

    /// Last value written to the uniform `name`
    pub fn uniform(&self, name: &str) -> Option<&UniformValue> {
        self.uniforms.get(name)
    }

    /// Number of meshes currently resident
    pub fn resident_mesh_count(&self) -> usize {
        self.meshes.len()
    }

    /// Total bytes of resident vertex data
    pub fn resident_vertex_bytes(&self) -> usize {
        self.meshes.values().map(|mesh| mesh.vertex_bytes).sum()
    }

    fn set(&mut self, name: &str, value: UniformValue) {
        self.uniforms.insert(name.to_owned(), value);
    }
}

impl ShaderUniforms for HeadlessBackend {
    fn set_mat4(&mut self, name: &str, value: &Mat4) {
        self.set(name, UniformValue::Mat4(*value));
    }

    fn set_mat3(&mut self, name: &str, value: &Mat3) {
        self.set(name, UniformValue::Mat3(*value));
    }

    fn set_vec3(&mut self, name: &str, value: &Vec3) {
        self.set(name, UniformValue::Vec3(*value));
    }

    fn set_vec4(&mut self, name: &str, value: &Vec4) {
        self.set(name, UniformValue::Vec4(*value));
    }

    fn set_float(&mut self, name: &str, value: f32) {
        self.set(name, UniformValue::Float(value));
    }
}

impl RenderBackend for HeadlessBackend {
    fn upload_mesh(&mut self, mesh: &Mesh) -> BackendResult<MeshHandle> {
        if mesh.indices().iter().any(|&index| index as usize >= mesh.vertex_count()) {
            return Err(RenderError::ResourceCreationFailed(
                "index buffer references a vertex past the end of the vertex buffer".to_string(),
            ));
        }

        let handle = MeshHandle(self.next_handle);
        self.next_handle += 1;
        self.meshes.insert(
            handle,
            UploadedMesh {
                vertex_bytes: mesh.vertex_bytes().len(),
                index_count: mesh.indices().len(),
            },
        );
        log::trace!("Uploaded mesh {:?} ({} vertices)", handle, mesh.vertex_count());
        Ok(handle)
    }

    fn release_mesh(&mut self, handle: MeshHandle) -> BackendResult<()> {
        self.meshes
            .remove(&handle)
            .map(|_| ())
            .ok_or_else(|| RenderError::Backend(format!("release of unknown mesh {handle:?}")))
    }

    fn bind_texture(&mut self, texture: &Texture) -> BackendResult<()> {
        self.bound_texture = Some(texture.path().to_path_buf());
        Ok(())
    }

    fn draw_indexed(&mut self, handle: MeshHandle, index_count: u32) -> BackendResult<()> {
        let mesh = self
            .meshes
            .get(&handle)
            .ok_or_else(|| RenderError::RenderingFailed(format!("draw of unknown mesh {handle:?}")))?;
        if index_count as usize > mesh.index_count {
            return Err(RenderError::RenderingFailed(format!(
                "draw of {index_count} indices exceeds the {} uploaded",
                mesh.index_count
            )));
        }

        self.draw_calls.push(DrawCall {
            mesh: handle,
            index_count,
            texture: self.bound_texture.clone(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Transform;
    use crate::render::material::Material;
    use crate::render::primitives::Vertex;

    fn cube() -> Mesh {
        Mesh::default_cube(Material::new(Texture::shared("crateTex.png")))
    }

    #[test]
    fn test_upload_draw_release() {
        let mut backend = HeadlessBackend::new();
        let handle = backend.upload_mesh(&cube()).unwrap();
        assert_eq!(backend.resident_mesh_count(), 1);
        assert_eq!(backend.resident_vertex_bytes(), 24 * 32);

        backend.bind_texture(&Texture::new("crateTex.png")).unwrap();
        backend.draw_indexed(handle, 36).unwrap();
        assert_eq!(backend.draw_calls().len(), 1);
        assert_eq!(backend.draw_calls()[0].texture, Some(PathBuf::from("crateTex.png")));

        backend.release_mesh(handle).unwrap();
        assert!(backend.release_mesh(handle).is_err());
        assert!(backend.draw_indexed(handle, 36).is_err());
    }

    #[test]
    fn test_dangling_index_fails_upload() {
        let vertex = Vertex::new([0.0; 3], [0.0, 0.0, 1.0], [0.0; 2]);
        let mesh = Mesh::new(
            vec![vertex; 3],
            vec![0, 1, 3],
            Transform::identity(),
            Material::new(Texture::shared("crateTex.png")),
        );

        let mut backend = HeadlessBackend::new();
        assert!(matches!(backend.upload_mesh(&mesh), Err(RenderError::ResourceCreationFailed(_))));
        assert_eq!(backend.resident_mesh_count(), 0);
    }

    #[test]
    fn test_overdraw_is_rejected() {
        let mut backend = HeadlessBackend::new();
        let handle = backend.upload_mesh(&cube()).unwrap();
        assert!(matches!(backend.draw_indexed(handle, 37), Err(RenderError::RenderingFailed(_))));
    }

    #[test]
    fn test_uniforms_keep_last_value() {
        let mut backend = HeadlessBackend::new();
        backend.set_float("lightCount", 2.0);
        backend.set_float("lightCount", 3.0);
        assert_eq!(backend.uniform("lightCount"), Some(&UniformValue::Float(3.0)));
        assert_eq!(backend.uniform("missing"), None);
    }
}
