use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Errors from loading or validating a scene configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigFileError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Where the single scene texture comes from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextureConfig {
    pub name: String,
    pub path: PathBuf,
    /// Flip rows on upload so image row 0 ends up at v = 1.
    pub flip_y: bool,
}

impl Default for TextureConfig {
    fn default() -> Self {
        Self {
            name: "testWoodTexture".into(),
            path: PathBuf::from("assets/textures/testWoodTexture.png"),
            flip_y: true,
        }
    }
}

/// Tunables for the demo scene. Every field has a default, so a config file
/// only needs to list what it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub cube_count: usize,
    /// Distance between neighbouring cubes along x.
    pub cube_spacing: f32,
    /// z coordinate every cube starts at.
    pub cube_depth: f32,
    pub max_speed: f32,
    /// Acceleration applied while a movement key is held.
    pub thrust: f32,
    /// Rotation (radians) applied per arrow-key event.
    pub spin_step: f32,
    pub logic_hz: f64,
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    /// Radians of camera rotation per pixel of mouse drag.
    pub drag_sensitivity: f32,
    pub program: String,
    pub texture: TextureConfig,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            cube_count: 3,
            cube_spacing: 5.0,
            cube_depth: -8.0,
            max_speed: 8.0,
            thrust: 10.0,
            spin_step: 0.1,
            logic_hz: 60.0,
            fov_degrees: 45.0,
            near: 0.1,
            far: 100.0,
            drag_sensitivity: 1.0 / 300.0,
            program: "simple".into(),
            texture: TextureConfig::default(),
        }
    }
}

impl SceneConfig {
    /// Load a config from a JSON file and validate it.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigFileError> {
        let file = std::fs::File::open(path)?;
        let config: Self = serde_json::from_reader(file)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a config from a JSON string and validate it.
    pub fn from_json(json: &str) -> Result<Self, ConfigFileError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Slowest accepted logic rate: one tick per minute.
    pub const MIN_LOGIC_HZ: f64 = 1.0 / 60.0;

    /// Check ranges that deserialization alone cannot express.
    pub fn validate(&self) -> Result<(), ConfigFileError> {
        let invalid = |field, reason: &str| ConfigFileError::Invalid {
            field,
            reason: reason.to_string(),
        };

        if !(self.logic_hz.is_finite() && self.logic_hz >= Self::MIN_LOGIC_HZ) {
            return Err(invalid("logic_hz", "must be at least one tick per minute"));
        }
        if !(self.max_speed.is_finite() && self.max_speed >= 0.0) {
            return Err(invalid("max_speed", "must be a non-negative number"));
        }
        if !(self.fov_degrees > 0.0 && self.fov_degrees < 180.0) {
            return Err(invalid("fov_degrees", "must be between 0 and 180"));
        }
        if !(self.near > 0.0 && self.far > self.near) {
            return Err(invalid("near", "must satisfy 0 < near < far"));
        }
        if self.program.is_empty() {
            return Err(invalid("program", "must not be empty"));
        }
        if self.cube_count > u16::MAX as usize {
            return Err(invalid("cube_count", "too many cubes"));
        }
        Ok(())
    }
}
