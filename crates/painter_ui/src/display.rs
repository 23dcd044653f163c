//! Display thread: drives a [`Viewer`] from event and frame channels.

use std::thread::{self, JoinHandle};

use crossbeam_channel::{never, select, Receiver};
use painter_core::{Frame, PainterError, PainterResult};

use crate::input::ViewerEvent;
use crate::surface::Surface;
use crate::viewer::{Viewer, ViewerControl};

/// A running display thread.
///
/// The thread ends on a terminal event, or once both channels disconnect.
pub struct DisplayThread<S: Surface + 'static> {
    thread: Option<JoinHandle<Viewer<S>>>,
}

impl<S: Surface + 'static> DisplayThread<S> {
    /// Spawns the display thread.
    ///
    /// # Errors
    ///
    /// Returns [`PainterError::ThreadSpawn`] if the OS refuses the thread.
    pub fn spawn(
        mut viewer: Viewer<S>,
        events: Receiver<ViewerEvent>,
        frames: Receiver<Frame>,
    ) -> PainterResult<Self> {
        let thread = thread::Builder::new()
            .name("painter-display".into())
            .spawn(move || {
                viewer.show();
                run(&mut viewer, events, frames);
                viewer
            })
            .map_err(PainterError::ThreadSpawn)?;
        Ok(Self {
            thread: Some(thread),
        })
    }

    /// Returns true once the thread has exited.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.thread.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Waits for the thread and returns the viewer it drove.
    ///
    /// # Errors
    ///
    /// Returns [`PainterError::DisplayPanicked`] if the thread panicked.
    pub fn join(mut self) -> PainterResult<Viewer<S>> {
        match self.thread.take() {
            Some(thread) => thread.join().map_err(|_| PainterError::DisplayPanicked),
            None => Err(PainterError::DisplayPanicked),
        }
    }
}

impl<S: Surface + 'static> std::fmt::Debug for DisplayThread<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DisplayThread")
            .field("finished", &self.is_finished())
            .finish()
    }
}

fn run<S: Surface>(viewer: &mut Viewer<S>, events: Receiver<ViewerEvent>, frames: Receiver<Frame>) {
    // A disconnected receiver is swapped for one that never fires.
    let no_events = never();
    let no_frames = never();
    let mut events_open = true;
    let mut frames_open = true;
    let mut exit = false;

    while !exit && (events_open || frames_open) {
        let event_rx = if events_open { &events } else { &no_events };
        let frame_rx = if frames_open { &frames } else { &no_frames };

        select! {
            recv(event_rx) -> event => match event {
                Ok(event) => exit = viewer.handle_event(event) == ViewerControl::Exit,
                Err(_) => events_open = false,
            },
            recv(frame_rx) -> frame => match frame {
                Ok(frame) => viewer.show_frame(frame),
                Err(_) => frames_open = false,
            },
        }
    }

    let stats = viewer.stats();
    tracing::info!(
        frames = stats.frames,
        published = stats.published,
        moves = stats.moves,
        "display thread finished"
    );
}
