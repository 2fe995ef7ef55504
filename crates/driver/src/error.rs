use sceneconfig::{AssetKind, UniformKind};

/// Failures while turning a scene description into a running driver.
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error("unknown material '{0}'")]
    UnknownMaterial(String),
    #[error("unknown object '{0}'")]
    UnknownObject(String),
    #[error("unknown clock '{0}'")]
    UnknownClock(String),
    #[error("{0} requires a clock")]
    MissingClock(String),
    #[error("uniform '{material}.{name}' is not declared by its material")]
    UndeclaredUniform { material: String, name: String },
    #[error("uniform '{material}.{name}' is declared as {declared} but its binding writes {written}")]
    UniformKind {
        material: String,
        name: String,
        declared: UniformKind,
        written: UniformKind,
    },
    #[error("{0} uses a curve that cannot drive it")]
    UnsupportedCurve(String),
    #[error("scene expects a {expected:?} asset")]
    AssetMismatch { expected: AssetKind },
    #[error("text object '{0}' needs a [text] table")]
    MissingText(String),
    #[error("geometry pulse target '{0}' is not a text object")]
    PulseTarget(String),
}
