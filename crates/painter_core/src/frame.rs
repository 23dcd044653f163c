//! Render target: a reusable RGBA pixel buffer.
//!
//! The execution loop allocates one [`Frame`] at start-up and rasterizes
//! into it on every refresh. Presenters only ever get `&Frame` and must
//! copy it if they need the pixels after `update` returns.

use crate::canvas::Rect;
use crate::color::Color;

/// A width × height RGBA8 image, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    width: u32,
    height: u32,
    pixels: Vec<Color>,
}

impl Frame {
    /// Allocates a transparent frame.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::TRANSPARENT; width as usize * height as usize],
        }
    }

    /// Frame width in pixels.
    #[inline]
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Frame height in pixels.
    #[inline]
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// All pixels, row-major.
    #[must_use]
    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    /// Raw RGBA bytes, row-major.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    /// Returns the pixel at `(x, y)`, or `None` outside the frame.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get(self.index(x, y)).copied()
    }

    /// Fills the whole frame.
    pub fn fill(&mut self, color: Color) {
        self.pixels.fill(color);
    }

    /// Fills `rect`, clipped to the frame bounds.
    pub fn fill_rect(&mut self, rect: Rect, color: Color) {
        if rect.is_empty() {
            return;
        }
        let (x0, x1) = clip_span(rect.min.x, rect.max.x, self.width);
        let (y0, y1) = clip_span(rect.min.y, rect.max.y, self.height);
        if x0 >= x1 {
            return;
        }
        let stride = self.width as usize;
        for y in y0..y1 {
            let row = y * stride;
            self.pixels[row + x0..row + x1].fill(color);
        }
    }

    /// Copies `other` into this frame, reusing the allocation when possible.
    pub fn copy_from(&mut self, other: &Frame) {
        self.width = other.width;
        self.height = other.height;
        self.pixels.clone_from(&other.pixels);
    }

    /// Nearest-neighbor resample to `width` × `height`.
    #[must_use]
    pub fn scaled(&self, width: u32, height: u32) -> Frame {
        let mut out = Frame::new(width, height);
        if self.width == 0 || self.height == 0 {
            return out;
        }
        for y in 0..height {
            let src_y = (u64::from(y) * u64::from(self.height) / u64::from(height)) as u32;
            for x in 0..width {
                let src_x = (u64::from(x) * u64::from(self.width) / u64::from(width)) as u32;
                let dst = out.index(x, y);
                out.pixels[dst] = self.pixels[self.index(src_x, src_y)];
            }
        }
        out
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }
}

/// Clamps the half-open span `[lo, hi)` to `[0, limit)`.
fn clip_span(lo: i32, hi: i32, limit: u32) -> (usize, usize) {
    let limit = i64::from(limit);
    let lo = i64::from(lo).clamp(0, limit);
    let hi = i64::from(hi).clamp(0, limit);
    (lo as usize, hi as usize)
}
