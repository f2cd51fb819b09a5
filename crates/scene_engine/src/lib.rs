//! # Scene Engine
//!
//! The core of a real-time 3D scene renderer: scene import, geometry
//! deduplication, a first-person/orbit camera, per-frame visibility culling,
//! per-object light selection and distance ordering. Window creation and the
//! graphics API itself stay behind the [`render::api::RenderBackend`] trait.
//!
//! ## Features
//!
//! - **Scene Import**: OBJ-style text and COLLADA-style XML documents
//! - **Vertex Indexing**: Bit-exact deduplication of vertex streams
//! - **Camera**: Free-look and orbit modes with cached matrices
//! - **Culling**: Cone plus clip-space bounding sphere test
//! - **Lighting**: Capped, conservative point light relevance per mesh
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scene_engine::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ApplicationConfig::default();
//!     let settings = LoaderSettings::with_default_texture(config.assets.default_texture_path());
//!     let data = load_scene(config.assets.scene_path(), &settings)?;
//!
//!     let mut scene = Scene::from_data(data, &config.lighting);
//!     let mut backend = HeadlessBackend::new();
//!     scene.upload(&mut backend)?;
//!
//!     let camera = Camera::new(&config.camera);
//!     let stats = FrameRenderer::default().render(&scene, &camera, &mut backend)?;
//!     println!("drew {} of {} meshes", stats.drawn, stats.considered);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

// Settings
pub mod core;
pub mod config;

pub mod foundation;
pub mod assets;
pub mod render;
pub mod scene;
pub mod input;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        assets::{load_scene, LoadError, LoaderSettings, SceneData, SceneFormat, SceneLoader},
        core::config::{ApplicationConfig, CameraConfig, LightingConfig},
        config::{Config, ConfigFormat},
        foundation::math::{Mat4, Quat, Transform, Vec3},
        input::{InputState, KeyCode},
        render::{
            Camera, CameraInput, CameraMode, HeadlessBackend, Light, LightManager, Material, Mesh,
            RenderBackend, RenderError, Texture,
        },
        scene::{FrameRenderer, FrameStats, Scene},
    };
}
