//! # Unified Configuration System
//!
//! Settings for every subsystem of the scene core, grouped the same way the
//! code is: engine loop, camera, lighting, assets.
//!
//! ## Design Goals
//!
//! - **Centralized**: All configuration types in one place for easy discovery
//! - **Serializable**: Loaded from TOML or RON through [`Config`]
//! - **Type Safe**: Strong typing with validation and defaults
//!
//! Defaults: 90° vertical FOV, near/far planes at 0.01/100 and at most 16
//! lights per drawn object.

use serde::{Serialize, Deserialize};

use crate::assets::SceneFormat;
use crate::config::{Config, ConfigError};
use crate::foundation::math::Vec3;

/// # Engine Configuration
///
/// Frame loop and logging behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Default log filter (still overridable with `RUST_LOG`)
    pub log_level: String,
    /// Number of frames the headless viewer simulates
    pub target_frames: u32,
    /// Fixed update step in seconds
    pub fixed_timestep: f32,
}

impl EngineConfig {
    /// Create a new engine configuration
    pub fn new() -> Self {
        Self {
            log_level: "info".to_string(),
            target_frames: 240,
            fixed_timestep: 1.0 / 120.0,
        }
    }

    /// Set log level
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// # Camera Configuration
///
/// Projection parameters and movement tuning for the first-person/orbit camera.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Initial (and reset) camera position
    pub start_position: [f32; 3],
    /// Vertical field of view in degrees
    pub vertical_fov_degrees: f32,
    /// Initial aspect ratio (width / height)
    pub aspect_ratio: f32,
    /// Near clipping plane distance
    pub near_plane: f32,
    /// Far clipping plane distance
    pub far_plane: f32,
    /// Degrees of yaw/pitch per unit of look input
    pub look_speed: f32,
    /// Speed gained per tick while movement input is held
    pub movement_acceleration: f32,
    /// Upper bound for the accelerating movement speed
    pub max_movement_speed: f32,
}

impl CameraConfig {
    /// Start position as a vector
    pub fn start_position(&self) -> Vec3 {
        Vec3::from(self.start_position)
    }

    /// Check that the projection parameters are usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.vertical_fov_degrees > 0.0 && self.vertical_fov_degrees < 180.0) {
            return Err(ConfigError::Invalid(format!(
                "vertical FOV must be within (0, 180) degrees, got {}",
                self.vertical_fov_degrees
            )));
        }
        if self.aspect_ratio <= 0.0 {
            return Err(ConfigError::Invalid("aspect ratio must be positive".to_string()));
        }
        if self.near_plane <= 0.0 || self.far_plane <= self.near_plane {
            return Err(ConfigError::Invalid(format!(
                "clip planes must satisfy 0 < near < far, got near={} far={}",
                self.near_plane, self.far_plane
            )));
        }
        if self.movement_acceleration < 0.0 || self.max_movement_speed < 0.0 {
            return Err(ConfigError::Invalid("movement tuning must not be negative".to_string()));
        }
        Ok(())
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            start_position: [0.0, 0.0, 3.0],
            vertical_fov_degrees: 90.0,
            aspect_ratio: 16.0 / 9.0,
            near_plane: 0.01,
            far_plane: 100.0,
            look_speed: 0.2,
            movement_acceleration: 0.04,
            max_movement_speed: 2.5,
        }
    }
}

/// # Lighting Configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LightingConfig {
    /// Size of the shading stage's light uniform array
    pub max_lights_per_object: usize,
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self { max_lights_per_object: 16 }
    }
}

/// # Asset Configuration
///
/// Where scene files and the fallback texture are found.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    /// Base directory for scene files and textures
    pub resource_dir: String,
    /// Texture used by the default material and by COLLADA materials
    pub default_texture: String,
    /// Scene file loaded by the viewer
    pub scene_file: String,
}

impl AssetConfig {
    /// Create a new asset configuration
    pub fn new() -> Self {
        Self {
            resource_dir: "resources".to_string(),
            default_texture: "crateTex.png".to_string(),
            scene_file: "sample-scene.dae".to_string(),
        }
    }

    /// Set the resource directory
    pub fn with_resource_dir(mut self, dir: impl Into<String>) -> Self {
        self.resource_dir = dir.into();
        self
    }

    /// Full path of the default texture
    pub fn default_texture_path(&self) -> std::path::PathBuf {
        std::path::Path::new(&self.resource_dir).join(&self.default_texture)
    }

    /// Full path of the configured scene
    pub fn scene_path(&self) -> std::path::PathBuf {
        std::path::Path::new(&self.resource_dir).join(&self.scene_file)
    }

    /// Check that the scene file has a loader and a texture is named
    pub fn validate(&self) -> Result<SceneFormat, ConfigError> {
        if self.default_texture.trim().is_empty() {
            return Err(ConfigError::Invalid("default texture must be named".to_string()));
        }
        SceneFormat::from_path(&self.scene_path())
            .map_err(|error| ConfigError::Invalid(format!("scene file: {error}")))
    }
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// # Complete Application Configuration
///
/// Top-level configuration that encompasses all subsystems.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationConfig {
    /// Engine loop configuration
    pub engine: EngineConfig,
    /// Camera configuration
    pub camera: CameraConfig,
    /// Light selection configuration
    pub lighting: LightingConfig,
    /// Asset configuration
    pub assets: AssetConfig,
}

impl ApplicationConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.camera.validate()?;
        self.assets.validate()?;
        if self.lighting.max_lights_per_object == 0 {
            return Err(ConfigError::Invalid("at least one light per object is required".to_string()));
        }
        if self.engine.fixed_timestep <= 0.0 {
            return Err(ConfigError::Invalid("fixed timestep must be positive".to_string()));
        }
        Ok(())
    }
}

impl Config for ApplicationConfig {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigFormat;

    #[test]
    fn test_defaults_are_valid() {
        let config = ApplicationConfig::default();
        assert_eq!(config.camera.near_plane, 0.01);
        assert_eq!(config.camera.far_plane, 100.0);
        assert_eq!(config.lighting.max_lights_per_object, 16);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: ApplicationConfig = toml::from_str(
            r#"
[camera]
vertical_fov_degrees = 60.0

[lighting]
max_lights_per_object = 8
"#,
        )
        .unwrap();

        assert_eq!(config.camera.vertical_fov_degrees, 60.0);
        assert_eq!(config.camera.max_movement_speed, 2.5);
        assert_eq!(config.lighting.max_lights_per_object, 8);
        assert_eq!(config.assets.default_texture, "crateTex.png");
    }

    #[test]
    fn test_ron_file_roundtrip() {
        let path = std::env::temp_dir().join(format!("scene_engine_config_{}.ron", std::process::id()));
        let mut config = ApplicationConfig::default();
        config.engine = config.engine.with_log_level("debug");
        config.save_to_file(&path).unwrap();

        let loaded = ApplicationConfig::load_from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded.engine.log_level, "debug");
    }

    #[test]
    fn test_rejects_inverted_clip_planes() {
        let mut config = ApplicationConfig::default();
        config.camera.near_plane = 10.0;
        config.camera.far_plane = 1.0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_scene_file_needs_a_loader() {
        let mut assets = AssetConfig::new();
        assert_eq!(assets.validate().unwrap(), SceneFormat::Collada);

        assets.scene_file = "plane.OBJ".to_string();
        assert_eq!(assets.validate().unwrap(), SceneFormat::Obj);

        let mut config = ApplicationConfig::default();
        config.assets.scene_file = "level.fbx".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(message)) if message.contains("level.fbx")));
    }

    #[test]
    fn test_blank_texture_is_rejected() {
        let mut config = ApplicationConfig::default();
        config.assets.default_texture = "  ".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_load_from_str_in_either_format() {
        let toml = ApplicationConfig::load_from_str("[engine]\ntarget_frames = 10\n", ConfigFormat::Toml).unwrap();
        assert_eq!(toml.engine.target_frames, 10);

        let ron = ApplicationConfig::load_from_str("(lighting: (max_lights_per_object: 4))", ConfigFormat::Ron).unwrap();
        assert_eq!(ron.lighting.max_lights_per_object, 4);
        assert_eq!(ron.camera.near_plane, 0.01);
    }

    #[test]
    fn test_unknown_extension_is_rejected() {
        let result = ApplicationConfig::load_from_file("settings.ini");
        assert!(result.is_err());
    }
}
