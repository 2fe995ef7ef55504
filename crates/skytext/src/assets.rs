use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use driver::{Asset, AssetLoader, LoadError, LoadProgress, ModelAsset, Typeface};
use sceneconfig::AssetKind;
use serde::Deserialize;

/// Bounding radius assumed for model files; their geometry is not decoded.
const MODEL_RADIUS: f32 = 1.0;

/// Typeface JSON as produced by facetype.js: glyph outlines keyed by character.
#[derive(Debug, Deserialize)]
struct TypefaceFile {
    #[serde(rename = "familyName", default)]
    family_name: String,
    resolution: f32,
    glyphs: HashMap<String, GlyphFile>,
}

#[derive(Debug, Deserialize)]
struct GlyphFile {
    /// Horizontal advance in font units.
    ha: f32,
}

/// Loads scene assets from disk, resolving relative paths against `root`.
#[derive(Debug, Clone)]
pub struct FileAssetLoader {
    root: PathBuf,
}

impl FileAssetLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

impl AssetLoader for FileAssetLoader {
    fn load(
        &mut self,
        path: &Path,
        kind: AssetKind,
        on_progress: &mut dyn FnMut(LoadProgress),
    ) -> Result<Asset, LoadError> {
        let resolved = self.resolve(path);
        let bytes = fs::read(&resolved).map_err(|source| LoadError::Io {
            path: resolved.clone(),
            source,
        })?;
        let total = bytes.len() as u64;
        on_progress(LoadProgress {
            loaded: total,
            total: Some(total),
        });
        if bytes.is_empty() {
            return Err(LoadError::Empty(resolved));
        }

        match kind {
            AssetKind::Font => parse_typeface(&resolved, &bytes).map(Asset::Font),
            AssetKind::Model => Ok(Asset::Model(ModelAsset {
                path: resolved,
                bytes: total,
                radius: MODEL_RADIUS,
            })),
        }
    }
}

fn parse_typeface(path: &Path, bytes: &[u8]) -> Result<Typeface, LoadError> {
    let file: TypefaceFile = serde_json::from_slice(bytes).map_err(|err| LoadError::Parse {
        path: path.to_path_buf(),
        message: err.to_string(),
    })?;
    if file.resolution <= 0.0 {
        return Err(LoadError::Parse {
            path: path.to_path_buf(),
            message: format!("resolution must be positive (got {})", file.resolution),
        });
    }
    let advances = file
        .glyphs
        .into_iter()
        .filter_map(|(key, glyph)| {
            let mut chars = key.chars();
            match (chars.next(), chars.next()) {
                (Some(ch), None) => Some((ch, glyph.ha)),
                _ => None,
            }
        })
        .collect();
    Ok(Typeface {
        family: file.family_name,
        resolution: file.resolution,
        advances,
    })
}
