//! COLLADA-style XML scene support

pub mod loader;
pub mod search;

pub use loader::ColladaSceneLoader;
