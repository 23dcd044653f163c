//! PNG output.

use std::io;
use std::path::{Path, PathBuf};

use image::RgbaImage;
use painter_core::{Frame, PainterError, PainterResult};
use painter_ui::{MemorySurface, Surface};

/// Converts a frame to an RGBA image.
#[must_use]
pub fn to_image(frame: &Frame) -> Option<RgbaImage> {
    RgbaImage::from_raw(frame.width(), frame.height(), frame.as_bytes().to_vec())
}

/// Writes `frame` to `path` as PNG.
///
/// # Errors
///
/// Returns [`PainterError::Io`] if encoding or writing fails.
pub fn save(frame: &Frame, path: &Path) -> PainterResult<()> {
    let image = to_image(frame).ok_or_else(|| {
        PainterError::Io(io::Error::new(
            io::ErrorKind::InvalidData,
            "frame buffer does not match its dimensions",
        ))
    })?;
    image
        .save_with_format(path, image::ImageFormat::Png)
        .map_err(|e| PainterError::Io(io::Error::other(e)))?;
    tracing::info!(path = %path.display(), width = frame.width(), height = frame.height(), "wrote png");
    Ok(())
}

/// Surface that remembers the last image and writes it as PNG on request.
#[derive(Debug, Clone)]
pub struct PngSurface {
    path: PathBuf,
    memory: MemorySurface,
}

impl PngSurface {
    /// Surface that will write to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            memory: MemorySurface::new(),
        }
    }

    /// Output path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes the last published image. Returns `false` if there was none.
    ///
    /// # Errors
    ///
    /// As [`save`].
    pub fn write(&self) -> PainterResult<bool> {
        match self.memory.last() {
            Some(frame) => save(&frame, &self.path).map(|()| true),
            None => Ok(false),
        }
    }
}

impl Surface for PngSurface {
    fn publish(&mut self, image: &Frame) {
        self.memory.publish(image);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use painter_core::Color;

    #[test]
    fn test_to_image_keeps_pixels() {
        let mut frame = Frame::new(3, 2);
        frame.fill(Color::GREEN);
        let image = to_image(&frame).unwrap();
        assert_eq!(image.dimensions(), (3, 2));
        assert_eq!(image.get_pixel(2, 1).0, [0, 255, 0, 255]);
    }

    #[test]
    fn test_write_without_image() {
        let surface = PngSurface::new(std::env::temp_dir().join("painter-never-written.png"));
        assert!(!surface.write().unwrap());
    }
}
