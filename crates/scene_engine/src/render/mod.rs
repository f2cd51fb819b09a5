//! Rendering core
//!
//! Everything between a loaded scene and the external graphics API:
//!
//! - [`primitives`]: meshes, vertices and the camera
//! - [`material`] and [`lighting`]: surface and light descriptions
//! - [`culling`] and [`draw_order`]: per-frame visibility and ordering
//! - [`api`]: the traits a graphics backend implements
//! - [`backends`]: the built-in recording backend

pub mod api;
pub mod backends;
pub mod culling;
pub mod draw_order;
pub mod lighting;
pub mod material;
pub mod primitives;

pub use api::{BackendResult, MeshHandle, RenderBackend, ShaderUniforms};
pub use backends::HeadlessBackend;
pub use lighting::{Light, LightManager, LightSelection, LightType};
pub use material::{Material, Texture};
pub use primitives::{Camera, CameraInput, CameraMode, Mesh, Vertex};

use thiserror::Error;

/// Errors reported by a render backend
#[derive(Error, Debug)]
pub enum RenderError {
    /// The backend refused a mesh upload or texture bind
    ///
    /// Raised for geometry it cannot store, such as an index buffer that
    /// points past the vertex buffer, or a texture it cannot bind.
    #[error("Resource creation failed: {0}")]
    ResourceCreationFailed(String),

    /// A rendering operation failed during execution
    #[error("Rendering failed: {0}")]
    RenderingFailed(String),

    /// Backend-specific error occurred
    #[error("Backend error: {0}")]
    Backend(String),
}

/// Result type for rendering operations
pub type RenderResult<T> = Result<T, RenderError>;
