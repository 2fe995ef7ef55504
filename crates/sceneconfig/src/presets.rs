use crate::{ConfigError, SceneFile};

/// Scene variants shipped with the binary.
pub const BUILTIN_SCENES: &str = include_str!("presets.toml");

pub fn builtin() -> Result<SceneFile, ConfigError> {
    SceneFile::from_toml_str(BUILTIN_SCENES)
}
