//! # Operations
//!
//! Units of work applied by the execution loop to the canvas it owns.
//!
//! Every operation answers one question when applied: should the current
//! frame be handed to the presenter? Only [`UpdateOperation`] ever says yes,
//! which lets callers batch any number of mutations into a single visible
//! frame.
//!
//! Argument validation happens when an operation is *built*. A builder that
//! gets the wrong number of arguments, an odd number of coordinates, or
//! something that is not a finite number returns an error and no operation
//! exists to be queued. Failures that can only be detected at apply time
//! (scaled rectangle is inverted, coordinates overflow) leave the canvas
//! untouched and are reported back to the loop as `Err`.

use crate::canvas::{CanvasState, Cross, Point, Rect};
use crate::color::Color;
use crate::config::CrossConfig;
use crate::error::{PainterError, PainterResult};
use crate::frame::Frame;

/// A unit of canvas-mutating work.
pub trait Operation: Send {
    /// Applies the operation. Returns `Ok(true)` when a refresh is requested.
    ///
    /// # Errors
    ///
    /// Returns an error when the mutation had to be skipped. The canvas must
    /// be left unchanged in that case.
    fn apply(&mut self, frame: &mut Frame, canvas: &mut CanvasState) -> PainterResult<bool>;

    /// Short name used in logs.
    fn name(&self) -> &'static str {
        "operation"
    }
}

impl<O: Operation + ?Sized> Operation for Box<O> {
    fn apply(&mut self, frame: &mut Frame, canvas: &mut CanvasState) -> PainterResult<bool> {
        (**self).apply(frame, canvas)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

/// An entry in the execution loop's queue.
pub enum Task {
    /// Apply an operation.
    Apply(Box<dyn Operation>),
    /// Terminal marker: stop once everything queued before it has run.
    Stop,
}

impl std::fmt::Debug for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Task::Apply(op) => f.debug_tuple("Apply").field(&op.name()).finish(),
            Task::Stop => f.write_str("Stop"),
        }
    }
}

/// Scales normalized `(x, y)` pairs to pixel coordinates.
///
/// Even indices are multiplied by `width`, odd ones by `height`, and the
/// result is truncated toward zero.
///
/// # Errors
///
/// Returns [`PainterError::OddCoordinateCount`] for an odd number of values
/// and [`PainterError::InvalidGeometry`] when a scaled value does not fit a
/// pixel coordinate.
pub fn scale_coords(width: u32, height: u32, args: &[f64]) -> PainterResult<Vec<i32>> {
    if args.len() % 2 != 0 {
        return Err(PainterError::OddCoordinateCount(args.len()));
    }
    args.iter()
        .enumerate()
        .map(|(i, v)| {
            let dim = if i % 2 == 0 { width } else { height };
            let scaled = (f64::from(dim) * v).trunc();
            if scaled.is_finite() && scaled >= f64::from(i32::MIN) && scaled <= f64::from(i32::MAX) {
                Ok(scaled as i32)
            } else {
                Err(PainterError::InvalidGeometry(format!(
                    "coordinate {v} does not fit a {dim}px axis"
                )))
            }
        })
        .collect()
}

/// Parses `args` as exactly `N` normalized coordinates.
fn parse_coords<const N: usize>(command: &'static str, args: &[&str]) -> PainterResult<[f64; N]> {
    if args.len() % 2 != 0 {
        return Err(PainterError::OddCoordinateCount(args.len()));
    }
    if args.len() != N {
        return Err(PainterError::InvalidArgumentCount {
            command,
            expected: N,
            actual: args.len(),
        });
    }
    let mut out = [0.0; N];
    for (slot, raw) in out.iter_mut().zip(args) {
        *slot = parse_number(raw)?;
    }
    Ok(out)
}

fn parse_number(raw: &str) -> PainterResult<f64> {
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(PainterError::InvalidNumber {
            value: raw.to_string(),
        }),
    }
}

// =============================================================================
// Fill
// =============================================================================

/// Sets the background color. Never requests a refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillOperation {
    /// New background color.
    pub color: Color,
}

impl FillOperation {
    /// Fill with an arbitrary color.
    #[must_use]
    pub const fn new(color: Color) -> Self {
        Self { color }
    }

    /// Fill with white.
    #[must_use]
    pub const fn white() -> Self {
        Self::new(Color::WHITE)
    }

    /// Fill with green.
    #[must_use]
    pub const fn green() -> Self {
        Self::new(Color::GREEN)
    }
}

impl Operation for FillOperation {
    fn apply(&mut self, _frame: &mut Frame, canvas: &mut CanvasState) -> PainterResult<bool> {
        canvas.background = self.color;
        Ok(false)
    }

    fn name(&self) -> &'static str {
        "fill"
    }
}

// =============================================================================
// Shapes
// =============================================================================

/// Canvas shape edits. Coordinates are normalized to the frame size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShapeOperation {
    /// Place the black background rectangle between two corners.
    BackgroundRect {
        /// `[x1, y1, x2, y2]`.
        corners: [f64; 4],
    },
    /// Add a cross centered at a point.
    Figure {
        /// `[x, y]`.
        at: [f64; 2],
        /// Cross dimensions.
        cross: CrossConfig,
    },
    /// Move every cross to a point.
    Move {
        /// `[x, y]`.
        to: [f64; 2],
    },
    /// Clear the canvas to white with no shapes.
    Reset,
}

impl ShapeOperation {
    /// Builds `bgrect x1 y1 x2 y2`.
    ///
    /// # Errors
    ///
    /// Returns an error unless `args` holds exactly four finite numbers.
    pub fn background_rect(args: &[&str]) -> PainterResult<Self> {
        Ok(Self::BackgroundRect {
            corners: parse_coords::<4>("bgrect", args)?,
        })
    }

    /// Builds `figure x y` with default cross dimensions.
    ///
    /// # Errors
    ///
    /// Returns an error unless `args` holds exactly two finite numbers.
    pub fn figure(args: &[&str]) -> PainterResult<Self> {
        Self::figure_with(args, CrossConfig::default())
    }

    /// Builds `figure x y` with explicit cross dimensions.
    ///
    /// # Errors
    ///
    /// Returns an error unless `args` holds exactly two finite numbers.
    pub fn figure_with(args: &[&str], cross: CrossConfig) -> PainterResult<Self> {
        Ok(Self::Figure {
            at: parse_coords::<2>("figure", args)?,
            cross,
        })
    }

    /// Builds `move x y`.
    ///
    /// # Errors
    ///
    /// Returns an error unless `args` holds exactly two finite numbers.
    pub fn move_to(args: &[&str]) -> PainterResult<Self> {
        Ok(Self::Move {
            to: parse_coords::<2>("move", args)?,
        })
    }

    /// Move from already-normalized coordinates (e.g. a mouse click).
    #[must_use]
    pub const fn move_normalized(x: f64, y: f64) -> Self {
        Self::Move { to: [x, y] }
    }
}

fn scaled_point(frame: &Frame, xy: [f64; 2]) -> PainterResult<Point> {
    let c = scale_coords(frame.width(), frame.height(), &xy)?;
    Ok(Point::new(c[0], c[1]))
}

impl Operation for ShapeOperation {
    fn apply(&mut self, frame: &mut Frame, canvas: &mut CanvasState) -> PainterResult<bool> {
        match *self {
            Self::BackgroundRect { corners } => {
                let c = scale_coords(frame.width(), frame.height(), &corners)?;
                let rect = Rect::new(Point::new(c[0], c[1]), Point::new(c[2], c[3])).ok_or_else(
                    || PainterError::InvalidGeometry(format!("inverted rectangle {c:?}")),
                )?;
                canvas.background_rect = rect;
            }
            Self::Figure { at, cross } => {
                let center = scaled_point(frame, at)?;
                canvas.crosses.push(Cross {
                    center,
                    size: cross.size,
                    width: cross.width,
                });
            }
            Self::Move { to } => {
                let center = scaled_point(frame, to)?;
                for cross in &mut canvas.crosses {
                    cross.position(center);
                }
            }
            Self::Reset => canvas.reset(),
        }
        Ok(false)
    }

    fn name(&self) -> &'static str {
        match self {
            Self::BackgroundRect { .. } => "bgrect",
            Self::Figure { .. } => "figure",
            Self::Move { .. } => "move",
            Self::Reset => "reset",
        }
    }
}

// =============================================================================
// Update
// =============================================================================

/// Renders the canvas into the frame and requests a refresh.
///
/// Leaves the canvas state itself untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateOperation;

impl Operation for UpdateOperation {
    fn apply(&mut self, frame: &mut Frame, canvas: &mut CanvasState) -> PainterResult<bool> {
        canvas.render(frame);
        Ok(true)
    }

    fn name(&self) -> &'static str {
        "update"
    }
}

// =============================================================================
// Composite
// =============================================================================

/// Applies a sequence of operations in order.
///
/// Requests a refresh if any member did. Every member runs; a failing
/// member is logged and does not stop the ones after it.
#[derive(Default)]
pub struct CompositeOperation {
    ops: Vec<Box<dyn Operation>>,
}

impl CompositeOperation {
    /// Creates an empty composite.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a member.
    #[must_use]
    pub fn with(mut self, op: impl Operation + 'static) -> Self {
        self.push(op);
        self
    }

    /// Appends a member.
    pub fn push(&mut self, op: impl Operation + 'static) {
        self.ops.push(Box::new(op));
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Returns true if there are no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

impl FromIterator<Box<dyn Operation>> for CompositeOperation {
    fn from_iter<I: IntoIterator<Item = Box<dyn Operation>>>(iter: I) -> Self {
        Self {
            ops: iter.into_iter().collect(),
        }
    }
}

impl std::fmt::Debug for CompositeOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.ops.iter().map(|op| op.name()))
            .finish()
    }
}

impl Operation for CompositeOperation {
    fn apply(&mut self, frame: &mut Frame, canvas: &mut CanvasState) -> PainterResult<bool> {
        let mut refresh = false;
        for op in &mut self.ops {
            match op.apply(frame, canvas) {
                Ok(requested) => refresh |= requested,
                Err(e) => tracing::warn!(op = op.name(), error = %e, "composite member skipped"),
            }
        }
        Ok(refresh)
    }

    fn name(&self) -> &'static str {
        "composite"
    }
}

// =============================================================================
// Closures
// =============================================================================

/// Wraps a closure that mutates the canvas. Never requests a refresh.
pub struct FnOperation<F>(pub F);

impl<F> Operation for FnOperation<F>
where
    F: FnMut(&mut Frame, &mut CanvasState) + Send,
{
    fn apply(&mut self, frame: &mut Frame, canvas: &mut CanvasState) -> PainterResult<bool> {
        (self.0)(frame, canvas);
        Ok(false)
    }

    fn name(&self) -> &'static str {
        "fn"
    }
}
