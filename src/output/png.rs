use super::OutputSink;
use crate::frame::PixelBuffer;
use anyhow::{Context, Result};
use image::ImageFormat;
use std::path::{Path, PathBuf};

/// Writes each frame to a PNG file, overwriting the previous one
pub struct PngSink {
    path: PathBuf,
    frames: u64,
}

impl PngSink {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            anyhow::ensure!(
                parent.is_dir(),
                "Output directory {} does not exist",
                parent.display()
            );
        }

        tracing::info!("Writing output frames to {}", path.display());
        Ok(Self { path, frames: 0 })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl OutputSink for PngSink {
    fn write_frame(&mut self, frame: &PixelBuffer) -> Result<()> {
        frame
            .save_with_format(&self.path, ImageFormat::Png)
            .with_context(|| format!("Failed to write frame to {}", self.path.display()))?;
        self.frames += 1;
        Ok(())
    }

    fn frames_written(&self) -> u64 {
        self.frames
    }
}
