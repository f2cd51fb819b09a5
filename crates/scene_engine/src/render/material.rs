//! Material system for rendering

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::foundation::math::{Vec3, Vec4};

/// Reference to a decoded texture owned by the graphics collaborator
///
/// Only the source path is tracked here; decoding and upload happen outside
/// this crate. Shared between materials through [`Arc`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Texture {
    path: PathBuf,
}

impl Texture {
    /// Create a texture reference for an image file
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Create a shareable texture reference
    pub fn shared(path: impl Into<PathBuf>) -> Arc<Self> {
        Arc::new(Self::new(path))
    }

    /// Source image path
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Surface properties for the Phong-style shading stage
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    /// Main texture (shared by every material that uses the same image)
    pub texture: Arc<Texture>,

    /// Ambient tint (RGB)
    pub ambient_tint: Vec3,

    /// Diffuse tint (RGBA; alpha is carried for future transparency)
    pub diffuse_tint: Vec4,

    /// Specular exponent
    pub shininess: f32,
}

impl Material {
    /// Default specular exponent
    pub const DEFAULT_SHININESS: f32 = 32.0;

    /// Create a white material using the given texture
    pub fn new(texture: Arc<Texture>) -> Self {
        Self {
            texture,
            ambient_tint: Vec3::new(1.0, 1.0, 1.0),
            diffuse_tint: Vec4::new(1.0, 1.0, 1.0, 1.0),
            shininess: Self::DEFAULT_SHININESS,
        }
    }

    /// Set the ambient tint
    pub fn with_ambient_tint(mut self, tint: Vec3) -> Self {
        self.ambient_tint = tint;
        self
    }

    /// Set the diffuse tint
    pub fn with_diffuse_tint(mut self, tint: Vec4) -> Self {
        self.diffuse_tint = tint;
        self
    }

    /// Set the specular exponent
    pub fn with_shininess(mut self, shininess: f32) -> Self {
        self.shininess = shininess.max(0.0);
        self
    }

    /// Whether two materials reference the very same texture allocation
    pub fn shares_texture_with(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.texture, &other.texture)
    }
}
