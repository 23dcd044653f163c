//! # Configuration
//!
//! Loaded once at startup from a TOML file. Every field has a default, so an
//! empty file (or no file at all) gives the stock 800×800 canvas.
//!
//! ```toml
//! log_level = "debug"
//!
//! [canvas]
//! width = 800
//! height = 800
//!
//! [cross]
//! size = 400
//! width = 100
//!
//! [display]
//! window_width = 800
//! window_height = 800
//! frame_channel_capacity = 4
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::canvas::Cross;
use crate::error::{PainterError, PainterResult};

/// Render target dimensions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 800,
        }
    }
}

/// Cross marker dimensions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrossConfig {
    /// Bar length.
    pub size: i32,
    /// Bar thickness.
    pub width: i32,
}

impl Default for CrossConfig {
    fn default() -> Self {
        Self {
            size: Cross::DEFAULT_SIZE,
            width: Cross::DEFAULT_WIDTH,
        }
    }
}

/// Presentation layer settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Initial window width.
    pub window_width: u32,
    /// Initial window height.
    pub window_height: u32,
    /// Frames buffered between the loop and the display thread.
    pub frame_channel_capacity: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            window_width: 800,
            window_height: 800,
            frame_channel_capacity: 4,
        }
    }
}

/// Top-level configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PainterConfig {
    /// Render target.
    pub canvas: CanvasConfig,
    /// Cross markers.
    pub cross: CrossConfig,
    /// Presentation layer.
    pub display: DisplayConfig,
    /// Default `tracing` filter when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Default for PainterConfig {
    fn default() -> Self {
        Self {
            canvas: CanvasConfig::default(),
            cross: CrossConfig::default(),
            display: DisplayConfig::default(),
            log_level: "info".to_string(),
        }
    }
}

impl PainterConfig {
    /// Largest pixel count accepted for the canvas or the window (4096 x 4096).
    pub const MAX_PIXELS: u64 = 4096 * 4096;

    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`PainterError::InvalidConfig`] on syntax errors or invalid values.
    pub fn from_toml_str(text: &str) -> PainterResult<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| PainterError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an IO error if the file cannot be read, otherwise as
    /// [`from_toml_str`](Self::from_toml_str).
    pub fn from_file(path: impl AsRef<Path>) -> PainterResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Checks that every dimension is usable: non-zero, and no surface larger
    /// than [`MAX_PIXELS`](Self::MAX_PIXELS).
    ///
    /// # Errors
    ///
    /// Returns [`PainterError::InvalidConfig`] naming the first bad field.
    pub fn validate(&self) -> PainterResult<()> {
        let checks = [
            (self.canvas.width == 0, "canvas.width must be non-zero"),
            (self.canvas.height == 0, "canvas.height must be non-zero"),
            (self.cross.size <= 0, "cross.size must be positive"),
            (self.cross.width <= 0, "cross.width must be positive"),
            (self.display.window_width == 0, "display.window_width must be non-zero"),
            (self.display.window_height == 0, "display.window_height must be non-zero"),
            (
                self.display.frame_channel_capacity == 0,
                "display.frame_channel_capacity must be non-zero",
            ),
        ];
        if let Some((_, reason)) = checks.iter().find(|(bad, _)| *bad) {
            return Err(PainterError::InvalidConfig((*reason).to_string()));
        }

        let surfaces = [
            ("canvas", self.canvas.width, self.canvas.height),
            ("display window", self.display.window_width, self.display.window_height),
        ];
        for (what, width, height) in surfaces {
            let pixels = u64::from(width) * u64::from(height);
            if pixels > Self::MAX_PIXELS {
                return Err(PainterError::InvalidConfig(format!(
                    "{what} {width}x{height} exceeds {} pixels",
                    Self::MAX_PIXELS
                )));
            }
        }
        Ok(())
    }
}
