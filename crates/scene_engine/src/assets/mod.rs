//! Scene import pipeline
//!
//! Two interchangeable text formats feed the same scene representation:
//! a line-oriented triangle-mesh format ([`ObjSceneLoader`]) and a node/library
//! based XML scene description ([`ColladaSceneLoader`]). Both expand their
//! faces into an uncompressed per-corner vertex stream which the
//! [`vertex_indexer`] compacts into an indexed mesh.

pub mod collada;
pub mod obj_loader;
pub mod parsing;
pub mod vertex_indexer;

pub use collada::ColladaSceneLoader;
pub use obj_loader::ObjSceneLoader;
pub use vertex_indexer::{IndexedVertices, VERTEX_STRIDE};

use std::path::Path;
use std::sync::Arc;

use thiserror::Error;

use crate::render::lighting::Light;
use crate::render::material::{Material, Texture};
use crate::render::primitives::Mesh;

/// Errors raised while loading a scene
///
/// Every variant is fatal to the load: no partial scene is returned.
#[derive(Error, Debug)]
pub enum LoadError {
    /// The file could not be read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Structurally invalid input (unsupported polygon arity, bad numbers, short arrays)
    #[error("Format error: {0}")]
    Format(String),

    /// A referenced id or name could not be resolved
    #[error("Data error: {0}")]
    Data(String),

    /// The scene document is not well-formed XML
    #[error("XML error: {0}")]
    Xml(String),

    /// No loader handles this file extension
    #[error("Unsupported scene format: {0}")]
    UnsupportedExtension(String),
}

/// Meshes and lights produced by one scene load
#[derive(Debug, Clone, Default)]
pub struct SceneData {
    /// Loaded meshes in document order
    pub meshes: Vec<Mesh>,
    /// Loaded lights in document order
    pub lights: Vec<Light>,
}

/// Settings handed to a loader by the load orchestration
///
/// Replaces any process-wide defaults: two loads with different settings
/// never observe each other.
#[derive(Debug, Clone)]
pub struct LoaderSettings {
    /// Material used when the source specifies none
    pub default_material: Material,
}

impl LoaderSettings {
    /// Settings whose default material uses the given texture
    pub fn with_default_texture(path: impl AsRef<Path>) -> Self {
        Self {
            default_material: Material::new(Texture::shared(path.as_ref())),
        }
    }

    /// Shared texture of the default material
    pub fn default_texture(&self) -> Arc<Texture> {
        Arc::clone(&self.default_material.texture)
    }
}

/// Capability shared by both scene formats
pub trait SceneLoader {
    /// Parse a scene held in memory
    fn load_scene_from_str(&self, source: &str) -> Result<SceneData, LoadError>;

    /// Read and parse a scene file
    fn load_scene(&self, path: &Path) -> Result<SceneData, LoadError> {
        let source = std::fs::read_to_string(path)?;
        self.load_scene_from_str(&source)
    }
}

/// The closed set of supported scene formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneFormat {
    /// Line-oriented triangle mesh text (`.obj`)
    Obj,
    /// XML scene description (`.dae`)
    Collada,
}

impl SceneFormat {
    /// Pick the format from a file extension (case-insensitive)
    pub fn from_path(path: &Path) -> Result<Self, LoadError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match extension.as_str() {
            "obj" => Ok(Self::Obj),
            "dae" => Ok(Self::Collada),
            _ => Err(LoadError::UnsupportedExtension(path.display().to_string())),
        }
    }

    /// Parse in-memory text with this format's loader
    pub fn load_from_str(self, source: &str, settings: &LoaderSettings) -> Result<SceneData, LoadError> {
        match self {
            Self::Obj => ObjSceneLoader::new(settings.clone()).load_scene_from_str(source),
            Self::Collada => ColladaSceneLoader::new(settings.clone()).load_scene_from_str(source),
        }
    }
}

/// Load a scene file with the loader matching its extension
pub fn load_scene(path: impl AsRef<Path>, settings: &LoaderSettings) -> Result<SceneData, LoadError> {
    let path = path.as_ref();
    let format = SceneFormat::from_path(path)?;
    log::info!("Loading {:?} scene from {}", format, path.display());

    let source = std::fs::read_to_string(path)?;
    let scene = format.load_from_str(&source, settings)?;

    log::info!(
        "Loaded scene {}: {} meshes, {} lights",
        path.display(),
        scene.meshes.len(),
        scene.lights.len()
    );
    Ok(scene)
}
