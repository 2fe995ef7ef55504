use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use sceneconfig::{Scene, SceneFile};
use tracing::{debug, info};

use crate::paths::AppPaths;

/// Where a scene definition came from; later layers replace earlier ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Builtin,
    User,
    File,
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::Builtin => f.write_str("builtin"),
            Origin::User => f.write_str("user"),
            Origin::File => f.write_str("file"),
        }
    }
}

/// Built-in presets merged with the user scene file and an optional `--config` file.
#[derive(Debug, Clone)]
pub struct Catalog {
    file: SceneFile,
    origins: BTreeMap<String, Origin>,
}

impl Catalog {
    pub fn load(paths: &AppPaths, explicit: Option<&Path>) -> Result<Self> {
        let mut catalog = Self::builtin()?;

        let user = paths.scenes_file();
        if user.is_file() {
            catalog.layer(&user, Origin::User)?;
        } else {
            debug!(path = %user.display(), "no user scene file");
        }

        if let Some(path) = explicit {
            catalog.layer(path, Origin::File)?;
        }
        Ok(catalog)
    }

    pub fn builtin() -> Result<Self> {
        let file = sceneconfig::builtin().context("built-in scenes are invalid")?;
        let origins = file
            .scenes
            .keys()
            .map(|name| (name.clone(), Origin::Builtin))
            .collect();
        Ok(Self { file, origins })
    }

    fn layer(&mut self, path: &Path, origin: Origin) -> Result<()> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read scene file {}", path.display()))?;
        let layer = SceneFile::from_toml_str(&raw)
            .with_context(|| format!("failed to load scene file {}", path.display()))?;
        for name in layer.scenes.keys() {
            self.origins.insert(name.clone(), origin);
        }
        info!(path = %path.display(), scenes = layer.scenes.len(), %origin, "scene file loaded");
        self.file = self
            .file
            .clone()
            .merge(layer)
            .with_context(|| format!("scene file {} conflicts with loaded scenes", path.display()))?;
        Ok(())
    }

    pub fn file(&self) -> &SceneFile {
        &self.file
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, Origin, &Scene)> {
        self.file.scenes.iter().map(|(name, scene)| {
            let origin = self.origins.get(name).copied().unwrap_or(Origin::Builtin);
            (name.as_str(), origin, scene)
        })
    }
}
