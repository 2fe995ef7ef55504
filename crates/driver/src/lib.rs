//! Render loop driver for skytext scenes.
//!
//! A scene is described once (see `sceneconfig`), materialised into a
//! [`Driver`] after its asset finishes loading, and then ticked once per frame:
//!
//! ```text
//!   AssetLoader ──▶ AssetGate ──▶ Driver::build
//!                                      │
//!   FramePacer ──▶ run() ──▶ Driver::tick ──▶ clocks ─▶ uniforms ─▶ transforms
//!        ▲                                                              │
//!        └──────────── StopToken                       RenderHost::render ◀┘
//! ```
//!
//! - `clock` holds the logical clocks; `t` only moves when a tick runs.
//! - `curve` evaluates the pure update functions bound to uniforms/transforms.
//! - `uniforms` is the per-material uniform store; slots are declared at setup
//!   and only ever overwritten afterwards.
//! - `scene` is the owned scene graph (objects, materials, lights, camera).
//! - `bindings` compiles config bindings into id-based update rules.
//! - `gate` models the one asynchronous step: loading the font or model.
//! - `pacing` drives the self-rescheduling loop and its stop signal.

mod bindings;
mod clock;
mod curve;
mod driver;
mod error;
mod gate;
mod pacing;
mod scene;
mod uniforms;

pub use clock::{Clock, ClockId, Clocks};
pub use curve::CurveFn;
pub use driver::{Driver, Frame, RenderHost};
pub use error::SetupError;
pub use gate::{
    Asset, AssetGate, AssetLoader, Launch, LoadError, LoadProgress, ModelAsset, Typeface,
};
pub use pacing::{
    run, stop_signal, FramePacer, Immediate, IntervalPacer, NextFrame, RunSummary, StopHandle,
    StopReason, StopToken,
};
pub use scene::{
    Camera, Geometry, Light, Material, MaterialId, ModelGeometry, ObjectId, Scene, SceneObject,
    TextGeometry, TextParameters, Transform,
};
pub use sceneconfig::{Program, Side, UniformKind, UniformValue};
pub use uniforms::UniformStore;
