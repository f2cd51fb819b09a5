//! Core primitive types for rendering
//!
//! This module contains the fundamental data structures used throughout
//! the rendering system: meshes, vertices and the camera.

pub mod camera;
pub mod mesh;

// Re-export commonly used types
pub use camera::{Camera, CameraInput, CameraMode};
pub use mesh::{Mesh, Vertex};
