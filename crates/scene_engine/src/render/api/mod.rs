//! Public rendering API
//!
//! Traits the graphics collaborator implements to receive meshes, textures,
//! uniforms and draw calls from the scene core.

pub mod render_backend;

// Re-export commonly used types
pub use render_backend::{BackendResult, MeshHandle, RenderBackend, ShaderUniforms};
