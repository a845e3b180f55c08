//! Shared types for the cubescape workspace: entity ids and the scene
//! configuration file.

mod config;
mod types;

pub use config::{ConfigFileError, SceneConfig, TextureConfig};
pub use types::EntityId;
