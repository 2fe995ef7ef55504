use anyhow::Result;
use driver::{Frame, RenderHost};
use image::RgbImage;
use tracing::{debug, trace};

use crate::export::FrameExporter;
use crate::raster::rasterize;
use crate::RendererConfig;

/// Render host that ray-casts each frame into an in-memory RGB canvas and
/// optionally exports it as PNG.
#[derive(Debug)]
pub struct CpuHost {
    canvas: RgbImage,
    exporter: Option<FrameExporter>,
    frames: u64,
}

impl CpuHost {
    pub fn new(config: &RendererConfig) -> Result<Self> {
        let (width, height) = config.surface_size;
        let exporter = match &config.export_dir {
            Some(directory) => Some(FrameExporter::new(directory, config.export_every)?),
            None => None,
        };
        Ok(Self {
            canvas: RgbImage::new(width.max(1), height.max(1)),
            exporter,
            frames: 0,
        })
    }

    /// The most recently rendered frame.
    pub fn canvas(&self) -> &RgbImage {
        &self.canvas
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames
    }

    pub fn frames_exported(&self) -> u64 {
        self.exporter.as_ref().map_or(0, FrameExporter::written)
    }
}

impl RenderHost for CpuHost {
    fn render(&mut self, frame: &Frame<'_>) -> Result<()> {
        let (width, height) = frame.surface;
        if self.canvas.dimensions() != (width, height) {
            debug!(width, height, "reallocating canvas");
            self.canvas = RgbImage::new(width, height);
        }
        rasterize(frame.scene, frame.camera, &mut self.canvas);
        if let Some(exporter) = &mut self.exporter {
            exporter.offer(frame.index, &self.canvas)?;
        }
        self.frames += 1;
        trace!(frame = frame.index, "frame rasterised");
        Ok(())
    }
}
