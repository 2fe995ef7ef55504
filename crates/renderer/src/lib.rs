//! Headless renderer for skytext scenes.
//!
//! The crate implements the driver's `RenderHost` contract on the CPU so
//! scenes can run without a window or GPU:
//!
//! ```text
//!   skytext CLI
//!        │ RendererConfig
//!        ▼
//!   CpuHost::render(frame) ──▶ raster::rasterize ──▶ programs::shade ──▶ RGB canvas
//!                                                                          │
//!                                                      FrameExporter ◀─────┘ (optional PNG)
//! ```
//!
//! `raster` casts one ray per pixel against the scene's objects (text front
//! faces, cubes honouring their material side, model bounding spheres) and
//! `programs` evaluates the procedural colour field of the nearest hit.

use std::path::PathBuf;

mod export;
mod host;
pub mod programs;
mod raster;

pub use export::FrameExporter;
pub use host::CpuHost;
pub use raster::rasterize;

/// Settings for the headless host.
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// Initial canvas size in pixels; later frames follow the driver's surface.
    pub surface_size: (u32, u32),
    /// Directory receiving `frame_NNNNN.png` files, if exporting.
    pub export_dir: Option<PathBuf>,
    /// Export every n-th frame.
    pub export_every: u32,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            surface_size: (320, 180),
            export_dir: None,
            export_every: 1,
        }
    }
}
