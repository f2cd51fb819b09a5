//! # Core Module
//!
//! Shared settings used across the loaders, the camera and the light
//! selection. Everything that used to be a hard-coded constant of the
//! renderer lives in [`config`] so two scene loads never share hidden state.

pub mod config;

pub use config::{
    ApplicationConfig,
    EngineConfig,
    CameraConfig,
    LightingConfig,
    AssetConfig,
};
pub use crate::config::{Config, ConfigError, ConfigFormat};
