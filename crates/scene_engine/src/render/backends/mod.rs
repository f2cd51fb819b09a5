//! Backend implementations for the render module
//!
//! Only a recording backend lives here; real graphics backends are provided
//! by the embedding application.

/// Recording backend without a GPU
pub mod headless;

pub use headless::{DrawCall, HeadlessBackend, UniformValue};
