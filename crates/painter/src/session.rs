//! # Session
//!
//! One run of the tool: parse a script, start the loop and the display
//! thread, post every operation, then shut both down in order.
//!
//! ```text
//! script ─> Parser ─> post ─> ExecutionLoop ─> ChannelPresenter ─> DisplayThread ─> Surface
//! ```

use std::io::Read;

use crossbeam_channel::unbounded;
use painter_core::{ExecutionLoop, LoopStats, Operation, PainterConfig, PainterResult};
use painter_lang::Parser;
use painter_ui::{ChannelPresenter, DisplayThread, Surface, Viewer, ViewerEvent, ViewerStats};

/// How to treat bad script lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ParseMode {
    /// Abort on the first bad line.
    #[default]
    Strict,
    /// Log and skip bad lines.
    Lenient,
}

/// Outcome of a finished session.
#[derive(Debug)]
pub struct SessionReport<S> {
    /// Execution loop counters.
    pub loop_stats: LoopStats,
    /// Viewer counters.
    pub viewer_stats: ViewerStats,
    /// Frames the presenter had to drop.
    pub dropped_frames: u64,
    /// The surface the viewer published to.
    pub surface: S,
}

/// Parses `script` according to `mode`.
///
/// # Errors
///
/// In strict mode, the first bad line. IO errors in either mode.
pub fn parse_script(
    config: &PainterConfig,
    script: impl Read,
    mode: ParseMode,
) -> PainterResult<Vec<Box<dyn Operation>>> {
    let parser = Parser::with_cross(config.cross);
    match mode {
        ParseMode::Strict => parser.parse(script),
        ParseMode::Lenient => parser.parse_lenient(script),
    }
}

/// Runs `ops` through a fresh loop and display thread.
///
/// Returns once every operation has been applied and the display thread has
/// shown the last presented frame.
///
/// # Errors
///
/// Invalid configuration, thread spawn failures, or a panicked thread.
pub fn run<S: Surface + 'static>(
    config: &PainterConfig,
    ops: Vec<Box<dyn Operation>>,
    surface: S,
) -> PainterResult<SessionReport<S>> {
    config.validate()?;

    let (presenter, frames) = ChannelPresenter::new(config.display.frame_channel_capacity);
    let dropped = presenter.dropped_frames();
    let mut lp = ExecutionLoop::start(config, presenter)?;

    let (events, event_rx) = unbounded::<ViewerEvent>();
    let viewer = Viewer::new(
        lp.handle(),
        surface,
        config.display.window_width,
        config.display.window_height,
    );
    let display = DisplayThread::spawn(viewer, event_rx, frames)?;

    let count = ops.len();
    for op in ops {
        lp.handle().post_boxed(op)?;
    }
    tracing::info!(operations = count, "script posted");

    let loop_stats = lp.stop_and_wait()?;
    drop(lp);
    // Presenter is gone with the loop thread; closing events lets the display
    // thread drain the remaining frames and exit.
    drop(events);
    let viewer = display.join()?;
    let viewer_stats = viewer.stats();

    Ok(SessionReport {
        loop_stats,
        viewer_stats,
        dropped_frames: dropped.get(),
        surface: viewer.into_surface(),
    })
}
