use std::collections::HashMap;
use std::path::{Path, PathBuf};

use sceneconfig::AssetKind;
use tracing::{debug, error, info, warn};

use crate::driver::Driver;
use crate::error::SetupError;

/// Advance width used for glyphs the typeface does not define, in em units.
const MISSING_GLYPH_ADVANCE: f32 = 0.6;

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read asset {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse asset {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },
    #[error("asset {} is empty", .0.display())]
    Empty(PathBuf),
}

/// Glyph metrics of a loaded font.
#[derive(Debug, Clone, PartialEq)]
pub struct Typeface {
    pub family: String,
    /// Font units per em.
    pub resolution: f32,
    /// Horizontal advance per glyph in font units.
    pub advances: HashMap<char, f32>,
}

impl Typeface {
    /// Width of `text` in em units.
    pub fn measure(&self, text: &str) -> f32 {
        let resolution = self.resolution.max(1.0);
        text.chars()
            .map(|ch| match self.advances.get(&ch) {
                Some(advance) => advance / resolution,
                None => MISSING_GLYPH_ADVANCE,
            })
            .sum()
    }

    pub fn missing_glyphs(&self, text: &str) -> Vec<char> {
        let mut missing: Vec<char> = text
            .chars()
            .filter(|ch| !ch.is_whitespace() && !self.advances.contains_key(ch))
            .collect();
        missing.sort_unstable();
        missing.dedup();
        missing
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModelAsset {
    pub path: PathBuf,
    pub bytes: u64,
    /// Bounding radius in world units.
    pub radius: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Asset {
    Font(Typeface),
    Model(ModelAsset),
}

impl Asset {
    pub fn kind(&self) -> AssetKind {
        match self {
            Asset::Font(_) => AssetKind::Font,
            Asset::Model(_) => AssetKind::Model,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadProgress {
    pub loaded: u64,
    pub total: Option<u64>,
}

/// Loads the single asset a scene depends on.
pub trait AssetLoader {
    fn load(
        &mut self,
        path: &Path,
        kind: AssetKind,
        on_progress: &mut dyn FnMut(LoadProgress),
    ) -> Result<Asset, LoadError>;
}

/// Holds the outcome of the scene's asset load. The driver can only be built
/// from a gate that completed successfully.
#[derive(Debug)]
pub enum AssetGate {
    Pending { path: PathBuf },
    Loaded(Asset),
    Failed(LoadError),
}

/// Result of trying to start a scene from its gate.
#[derive(Debug)]
pub enum Launch {
    Started(Box<Driver>),
    Pending,
    Failed(LoadError),
}

impl AssetGate {
    pub fn pending(path: impl Into<PathBuf>) -> Self {
        AssetGate::Pending { path: path.into() }
    }

    /// Runs `loader` once and records its outcome.
    pub fn request<L: AssetLoader + ?Sized>(loader: &mut L, path: &Path, kind: AssetKind) -> Self {
        let mut gate = AssetGate::pending(path);
        let mut on_progress = |progress: LoadProgress| {
            debug!(
                path = %path.display(),
                loaded = progress.loaded,
                total = ?progress.total,
                "asset load progress"
            );
        };
        let result = loader.load(path, kind, &mut on_progress);
        gate.complete(result);
        gate
    }

    /// Delivers the load outcome. Only the first completion counts; failures
    /// are logged here and never retried.
    pub fn complete(&mut self, result: Result<Asset, LoadError>) {
        let AssetGate::Pending { path } = self else {
            warn!("asset load completed twice; ignoring the later result");
            return;
        };
        match result {
            Ok(asset) => {
                info!(path = %path.display(), kind = ?asset.kind(), "asset loaded");
                *self = AssetGate::Loaded(asset);
            }
            Err(err) => {
                error!(path = %path.display(), error = %err, "asset load failed; scene will not start");
                *self = AssetGate::Failed(err);
            }
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, AssetGate::Loaded(_))
    }

    /// Builds the driver once the asset is available.
    pub fn launch(
        self,
        scene: &sceneconfig::Scene,
        surface: (u32, u32),
    ) -> Result<Launch, SetupError> {
        match self {
            AssetGate::Pending { path } => {
                debug!(path = %path.display(), "asset still loading; render loop not scheduled");
                Ok(Launch::Pending)
            }
            AssetGate::Failed(err) => Ok(Launch::Failed(err)),
            AssetGate::Loaded(asset) => {
                let driver = Driver::build(scene, asset, surface)?;
                Ok(Launch::Started(Box::new(driver)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingLoader;

    impl AssetLoader for FailingLoader {
        fn load(
            &mut self,
            path: &Path,
            _kind: AssetKind,
            _on_progress: &mut dyn FnMut(LoadProgress),
        ) -> Result<Asset, LoadError> {
            Err(LoadError::Empty(path.to_path_buf()))
        }
    }

    fn typeface() -> Typeface {
        Typeface {
            family: "Test".into(),
            resolution: 1000.0,
            advances: [('M', 800.0), ('A', 700.0), ('D', 700.0)]
                .into_iter()
                .collect(),
        }
    }

    #[test]
    fn measures_known_and_missing_glyphs() {
        let face = typeface();
        assert!((face.measure("MAD") - 2.2).abs() < 1e-6);
        assert!((face.measure("MX") - (0.8 + MISSING_GLYPH_ADVANCE)).abs() < 1e-6);
        assert_eq!(face.missing_glyphs("MAX X"), vec!['X']);
    }

    #[test]
    fn failed_load_is_recorded() {
        let gate = AssetGate::request(&mut FailingLoader, Path::new("missing.json"), AssetKind::Font);
        assert!(matches!(gate, AssetGate::Failed(LoadError::Empty(_))));
    }

    #[test]
    fn second_completion_is_ignored() {
        let mut gate = AssetGate::pending("font.json");
        gate.complete(Ok(Asset::Font(typeface())));
        gate.complete(Err(LoadError::Empty("font.json".into())));
        assert!(gate.is_loaded());
    }
}
