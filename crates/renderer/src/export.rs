use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use image::RgbImage;

/// Writes every `every`-th rendered frame into `directory` as `frame_NNNNN.png`.
#[derive(Debug, Clone)]
pub struct FrameExporter {
    directory: PathBuf,
    every: u32,
    written: u64,
}

impl FrameExporter {
    pub fn new(directory: impl Into<PathBuf>, every: u32) -> Result<Self> {
        let directory = directory.into();
        fs::create_dir_all(&directory).with_context(|| {
            format!("failed to create export directory {}", directory.display())
        })?;
        Ok(Self {
            directory,
            every: every.max(1),
            written: 0,
        })
    }

    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn path_for(&self, index: u64) -> PathBuf {
        self.directory.join(format!("frame_{index:05}.png"))
    }

    /// Saves `image` if `index` falls on the export stride.
    pub fn offer(&mut self, index: u64, image: &RgbImage) -> Result<Option<PathBuf>> {
        if index % u64::from(self.every) != 0 {
            return Ok(None);
        }
        let path = self.path_for(index);
        image
            .save(&path)
            .with_context(|| format!("failed to write frame {}", path.display()))?;
        self.written += 1;
        tracing::debug!(frame = index, path = %path.display(), "frame exported");
        Ok(Some(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn writes_frames_on_stride() {
        let temp = tempdir().unwrap();
        let mut exporter = FrameExporter::new(temp.path().join("frames"), 2).unwrap();
        let image = RgbImage::new(4, 4);
        for index in 0..5 {
            exporter.offer(index, &image).unwrap();
        }
        assert_eq!(exporter.written(), 3);
        assert!(exporter.path_for(0).exists());
        assert!(!exporter.path_for(1).exists());
        assert!(exporter.path_for(4).exists());
        assert!(exporter.path_for(4).ends_with("frame_00004.png"));
    }

    #[test]
    fn zero_stride_exports_every_frame() {
        let temp = tempdir().unwrap();
        let mut exporter = FrameExporter::new(temp.path(), 0).unwrap();
        let image = RgbImage::new(2, 2);
        assert!(exporter.offer(0, &image).unwrap().is_some());
        assert!(exporter.offer(1, &image).unwrap().is_some());
    }
}
