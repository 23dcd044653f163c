//! Canvas state: the shared UI model mutated by operations.
//!
//! A [`CanvasState`] is owned by the execution loop thread and handed to
//! operations by `&mut`. It is never shared, so it carries no locks.

use crate::color::Color;
use crate::frame::Frame;

/// A point in pixel coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Point {
    /// X coordinate.
    pub x: i32,
    /// Y coordinate.
    pub y: i32,
}

impl Point {
    /// The origin.
    pub const ZERO: Self = Self::new(0, 0);

    /// Creates a new point.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle, `min` inclusive, `max` exclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Rect {
    /// Top-left corner.
    pub min: Point,
    /// Bottom-right corner.
    pub max: Point,
}

impl Rect {
    /// Zero-sized rectangle at the origin.
    pub const EMPTY: Self = Self {
        min: Point::ZERO,
        max: Point::ZERO,
    };

    /// Creates a rectangle from two corners.
    ///
    /// Returns `None` if `max` lies above or left of `min`.
    #[must_use]
    pub fn new(min: Point, max: Point) -> Option<Self> {
        (min.x <= max.x && min.y <= max.y).then_some(Self { min, max })
    }

    /// Creates a rectangle centered on `center`.
    #[must_use]
    pub fn centered(center: Point, width: i32, height: i32) -> Self {
        let half_w = width / 2;
        let half_h = height / 2;
        Self {
            min: Point::new(center.x.saturating_sub(half_w), center.y.saturating_sub(half_h)),
            max: Point::new(
                center.x.saturating_sub(half_w).saturating_add(width),
                center.y.saturating_sub(half_h).saturating_add(height),
            ),
        }
    }

    /// Width in pixels.
    #[must_use]
    pub fn width(&self) -> i32 {
        self.max.x.saturating_sub(self.min.x)
    }

    /// Height in pixels.
    #[must_use]
    pub fn height(&self) -> i32 {
        self.max.y.saturating_sub(self.min.y)
    }

    /// Returns true if the rectangle covers no pixels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width() <= 0 || self.height() <= 0
    }
}

/// A cross-shaped marker: one horizontal and one vertical bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cross {
    /// Center of the cross.
    pub center: Point,
    /// Length of each bar.
    pub size: i32,
    /// Thickness of each bar.
    pub width: i32,
}

impl Cross {
    /// Default bar length.
    pub const DEFAULT_SIZE: i32 = 400;
    /// Default bar thickness.
    pub const DEFAULT_WIDTH: i32 = 100;
    /// Fill color.
    pub const COLOR: Color = Color::YELLOW;

    /// Creates a cross with the default dimensions.
    #[must_use]
    pub const fn at(center: Point) -> Self {
        Self {
            center,
            size: Self::DEFAULT_SIZE,
            width: Self::DEFAULT_WIDTH,
        }
    }

    /// Moves the cross so it is centered on `center`.
    pub fn position(&mut self, center: Point) {
        self.center = center;
    }

    /// The two bars making up the cross (horizontal, vertical).
    #[must_use]
    pub fn bars(&self) -> [Rect; 2] {
        [
            Rect::centered(self.center, self.size, self.width),
            Rect::centered(self.center, self.width, self.size),
        ]
    }

    /// Rasterizes the cross into `frame`.
    pub fn draw(&self, frame: &mut Frame) {
        for bar in self.bars() {
            frame.fill_rect(bar, Self::COLOR);
        }
    }
}

/// Mutable drawing state. Only the execution loop thread ever sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanvasState {
    /// Background fill color.
    pub background: Color,
    /// Black rectangle painted over the background.
    pub background_rect: Rect,
    /// Cross markers, in draw order.
    pub crosses: Vec<Cross>,
}

impl CanvasState {
    /// Creates the initial state: black background, no shapes.
    #[must_use]
    pub fn new() -> Self {
        Self {
            background: Color::BLACK,
            background_rect: Rect::EMPTY,
            crosses: Vec::new(),
        }
    }

    /// Clears everything back to a white, empty canvas.
    pub fn reset(&mut self) {
        self.background = Color::WHITE;
        self.background_rect = Rect::EMPTY;
        self.crosses.clear();
    }

    /// Renders the full state into `frame`: background, rectangle, crosses.
    pub fn render(&self, frame: &mut Frame) {
        frame.fill(self.background);
        frame.fill_rect(self.background_rect, Color::BLACK);
        for cross in &self.crosses {
            cross.draw(frame);
        }
    }
}

impl Default for CanvasState {
    fn default() -> Self {
        Self::new()
    }
}
