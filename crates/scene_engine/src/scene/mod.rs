//! Scene management system
//!
//! Owns the loaded meshes and lights and turns them, once per frame, into an
//! ordered list of draws for the render backend.
//!
//! - [`scene_manager`]: the [`Scene`] container and its GPU residency
//! - [`render_queue`]: culling, distance ordering and light selection
//! - [`scene_renderer`]: uniform writes and draw submission

pub mod render_queue;
pub mod scene_manager;
pub mod scene_renderer;

pub use render_queue::{DrawCommand, RenderQueue};
pub use scene_manager::{Scene, SceneObject};
pub use scene_renderer::{FrameRenderer, FrameRendererConfig, FrameStats};
