//! # Viewer
//!
//! Turns window events into operations and frames into window images.
//!
//! The viewer never touches the canvas. Clicks become operations posted to
//! the execution loop; whatever the loop presents comes back as a frame and
//! is scaled to the window.

use painter_core::{
    Color, CompositeOperation, Cross, Frame, LoopHandle, Point, Rect, ShapeOperation,
    UpdateOperation,
};

use crate::input::{MouseButton, ViewerEvent};
use crate::surface::Surface;

/// Border thickness of the placeholder image, in pixels.
const BORDER: i32 = 10;

/// Where the placeholder image puts its cross.
const PLACEHOLDER_CROSS: Point = Point::new(200, 200);

/// What the display loop should do after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerControl {
    /// Keep running.
    Continue,
    /// Shut the viewer down.
    Exit,
}

/// Counters for one viewer session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewerStats {
    /// Frames received from the loop.
    pub frames: u64,
    /// Images published to the surface.
    pub published: u64,
    /// Move operations posted.
    pub moves: u64,
}

/// Window-side state: size, last frame, and where to post clicks.
pub struct Viewer<S: Surface> {
    handle: LoopHandle,
    surface: S,
    width: u32,
    height: u32,
    last_frame: Option<Frame>,
    stop_loop_on_exit: bool,
    stats: ViewerStats,
}

impl<S: Surface> Viewer<S> {
    /// Creates a viewer for a `width` x `height` window.
    pub fn new(handle: LoopHandle, surface: S, width: u32, height: u32) -> Self {
        Self {
            handle,
            surface,
            width,
            height,
            last_frame: None,
            stop_loop_on_exit: false,
            stats: ViewerStats::default(),
        }
    }

    /// Also request an execution loop stop when the window closes.
    #[must_use]
    pub fn stop_loop_on_exit(mut self, stop: bool) -> Self {
        self.stop_loop_on_exit = stop;
        self
    }

    /// Current window size.
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Session counters.
    #[must_use]
    pub fn stats(&self) -> ViewerStats {
        self.stats
    }

    /// The surface images are published to.
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Consumes the viewer, returning its surface.
    pub fn into_surface(self) -> S {
        self.surface
    }

    /// Publishes the initial image: the placeholder until a frame arrives.
    pub fn show(&mut self) {
        self.repaint();
    }

    /// Handles one window event.
    pub fn handle_event(&mut self, event: ViewerEvent) -> ViewerControl {
        if event.is_terminal() {
            if self.stop_loop_on_exit {
                self.handle.request_stop();
            }
            tracing::debug!(?event, "viewer closing");
            return ViewerControl::Exit;
        }

        match event {
            ViewerEvent::Resize { width, height } => {
                self.width = width;
                self.height = height;
                self.repaint();
            }
            ViewerEvent::Mouse {
                button: MouseButton::Right,
                pressed: true,
                x,
                y,
            } => self.post_move(x, y),
            _ => {}
        }
        ViewerControl::Continue
    }

    /// Accepts a frame presented by the execution loop.
    pub fn show_frame(&mut self, frame: Frame) {
        self.stats.frames += 1;
        self.last_frame = Some(frame);
        self.repaint();
    }

    fn post_move(&mut self, x: f64, y: f64) {
        if self.width == 0 || self.height == 0 {
            return;
        }
        let nx = x / f64::from(self.width);
        let ny = y / f64::from(self.height);
        let op = CompositeOperation::new()
            .with(ShapeOperation::move_normalized(nx, ny))
            .with(UpdateOperation);

        match self.handle.post(op) {
            Ok(()) => self.stats.moves += 1,
            Err(e) => tracing::warn!(error = %e, "click ignored"),
        }
    }

    fn repaint(&mut self) {
        if self.width == 0 || self.height == 0 {
            return;
        }
        let image = match &self.last_frame {
            Some(frame) if frame.width() == self.width && frame.height() == self.height => {
                frame.clone()
            }
            Some(frame) => frame.scaled(self.width, self.height),
            None => placeholder(self.width, self.height),
        };
        self.surface.publish(&image);
        self.stats.published += 1;
    }
}

impl<S: Surface> std::fmt::Debug for Viewer<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Viewer")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

/// White window with a black border and one cross, shown before any frame.
#[must_use]
pub fn placeholder(width: u32, height: u32) -> Frame {
    let mut frame = Frame::new(width, height);
    frame.fill(Color::WHITE);

    let w = i32::try_from(width).unwrap_or(i32::MAX);
    let h = i32::try_from(height).unwrap_or(i32::MAX);
    let edges = [
        Rect { min: Point::new(0, 0), max: Point::new(w, BORDER) },
        Rect { min: Point::new(0, h - BORDER), max: Point::new(w, h) },
        Rect { min: Point::new(0, 0), max: Point::new(BORDER, h) },
        Rect { min: Point::new(w - BORDER, 0), max: Point::new(w, h) },
    ];
    for edge in edges {
        frame.fill_rect(edge, Color::BLACK);
    }
    Cross::at(PLACEHOLDER_CROSS).draw(&mut frame);
    frame
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Key;
    use crate::surface::MemorySurface;
    use painter_core::{CanvasState, ExecutionLoop, FnPresenter, LoopState};
    use std::sync::Arc;
    use parking_lot::Mutex;

    fn recording_loop() -> (ExecutionLoop, Arc<Mutex<Vec<Frame>>>) {
        let frames = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&frames);
        let lp = ExecutionLoop::start_with_frame(
            Frame::new(100, 100),
            FnPresenter(move |f: &Frame| sink.lock().push(f.clone())),
        )
        .unwrap();
        (lp, frames)
    }

    #[test]
    fn test_placeholder_layout() {
        let image = placeholder(800, 800);
        assert_eq!(image.pixel(0, 0), Some(Color::BLACK));
        assert_eq!(image.pixel(799, 400), Some(Color::BLACK));
        assert_eq!(image.pixel(400, 795), Some(Color::BLACK));
        assert_eq!(image.pixel(200, 200), Some(Color::YELLOW));
        assert_eq!(image.pixel(700, 700), Some(Color::WHITE));
    }

    #[test]
    fn test_show_publishes_placeholder() {
        let (lp, _) = recording_loop();
        let surface = MemorySurface::new();
        let mut viewer = Viewer::new(lp.handle(), surface.clone(), 400, 400);
        viewer.show();
        let image = surface.last().unwrap();
        assert_eq!((image.width(), image.height()), (400, 400));
        assert_eq!(image.pixel(200, 200), Some(Color::YELLOW));
    }

    #[test]
    fn test_right_click_moves_crosses() {
        let (mut lp, frames) = recording_loop();
        lp.post(painter_core::FnOperation(|_: &mut Frame, canvas: &mut CanvasState| {
            canvas.background = Color::WHITE;
            canvas.crosses.push(Cross { center: Point::new(10, 10), size: 10, width: 2 });
        }))
        .unwrap();

        let mut viewer = Viewer::new(lp.handle(), MemorySurface::new(), 400, 200);
        // Window is 400x200, canvas 100x100: (300, 50) lands at (75, 25).
        assert_eq!(viewer.handle_event(ViewerEvent::right_click(300.0, 50.0)), ViewerControl::Continue);
        // Releases and other buttons do nothing.
        viewer.handle_event(ViewerEvent::Mouse { button: MouseButton::Right, pressed: false, x: 0.0, y: 0.0 });
        viewer.handle_event(ViewerEvent::Mouse { button: MouseButton::Left, pressed: true, x: 0.0, y: 0.0 });
        assert_eq!(viewer.stats().moves, 1);

        lp.stop_and_wait().unwrap();
        let frames = frames.lock();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].pixel(75, 25), Some(Cross::COLOR));
        assert_eq!(frames[0].pixel(10, 10), Some(Color::WHITE));
    }

    #[test]
    fn test_frames_are_scaled_to_window() {
        let (lp, _) = recording_loop();
        let surface = MemorySurface::new();
        let mut viewer = Viewer::new(lp.handle(), surface.clone(), 8, 8);

        let mut frame = Frame::new(4, 4);
        frame.fill(Color::GREEN);
        viewer.show_frame(frame);
        let image = surface.last().unwrap();
        assert_eq!((image.width(), image.height()), (8, 8));
        assert!(image.pixels().iter().all(|p| *p == Color::GREEN));

        viewer.handle_event(ViewerEvent::Resize { width: 2, height: 3 });
        let image = surface.last().unwrap();
        assert_eq!((image.width(), image.height()), (2, 3));
        assert_eq!(viewer.stats().published, 2);
        assert_eq!(surface.published(), 2);
    }

    #[test]
    fn test_escape_and_close_exit() {
        let (lp, _) = recording_loop();
        let mut viewer = Viewer::new(lp.handle(), MemorySurface::new(), 10, 10);
        assert_eq!(
            viewer.handle_event(ViewerEvent::Mouse { button: MouseButton::Left, pressed: true, x: 1.0, y: 1.0 }),
            ViewerControl::Continue
        );
        assert_eq!(viewer.handle_event(ViewerEvent::Key(Key::Escape)), ViewerControl::Exit);
        assert_eq!(viewer.handle_event(ViewerEvent::Close), ViewerControl::Exit);
        assert_eq!(lp.state(), LoopState::Running);
    }

    #[test]
    fn test_close_can_stop_the_loop() {
        let (mut lp, _) = recording_loop();
        let mut viewer =
            Viewer::new(lp.handle(), MemorySurface::new(), 10, 10).stop_loop_on_exit(true);
        assert_eq!(viewer.handle_event(ViewerEvent::Close), ViewerControl::Exit);
        assert!(lp.post(UpdateOperation).is_err());
        lp.stop_and_wait().unwrap();
        assert_eq!(lp.state(), LoopState::Stopped);
    }
}
