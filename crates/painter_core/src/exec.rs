//! # Execution Loop
//!
//! The single consumer of the operation queue.
//!
//! ```text
//!   post() ──> [OperationQueue<Task>] ──pop──> apply(frame, canvas)
//!                                                  │
//!                                       refresh? ──┴──> Presenter::update(&frame)
//! ```
//!
//! ## Lifecycle
//!
//! ```text
//!   Running ──stop requested──> Draining ──queue empty──> Stopped
//! ```
//!
//! A stop request closes the loop to new posts and enqueues [`Task::Stop`]
//! behind everything already accepted. Acceptance is gated by an `RwLock`:
//! producers push while holding the read side, the stopper flips the flag
//! and pushes the marker while holding the write side. The marker is
//! therefore always the last entry, and every accepted operation runs
//! before the thread exits.

use parking_lot::{Mutex, RwLock};
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle, ThreadId};

use crate::canvas::CanvasState;
use crate::config::PainterConfig;
use crate::error::{PainterError, PainterResult};
use crate::frame::Frame;
use crate::operation::{Operation, Task};
use crate::queue::OperationQueue;

/// Receives completed frames from the execution loop.
///
/// Called on the loop thread, so it should be quick (or hand the work off to
/// another thread). The frame is reused by the next refresh: copy it to keep it.
pub trait Presenter: Send {
    /// Displays a completed frame.
    fn update(&mut self, frame: &Frame);
}

/// Adapts a closure into a [`Presenter`].
pub struct FnPresenter<F>(pub F);

impl<F: FnMut(&Frame) + Send> Presenter for FnPresenter<F> {
    fn update(&mut self, frame: &Frame) {
        (self.0)(frame);
    }
}

impl<P: Presenter + ?Sized> Presenter for Box<P> {
    fn update(&mut self, frame: &Frame) {
        (**self).update(frame);
    }
}

/// Where the loop is in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopState {
    /// Accepting and applying operations.
    Running,
    /// Stop requested: no new posts, finishing what is queued.
    Draining,
    /// Consumer thread has exited.
    Stopped,
}

/// Counters maintained by the loop.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoopStats {
    /// Operations applied successfully.
    pub applied: u64,
    /// Operations that returned an error or panicked.
    pub failed: u64,
    /// Frames handed to the presenter.
    pub refreshes: u64,
    /// Presenter calls that panicked.
    pub present_failed: u64,
    /// Posts rejected because the loop was stopping.
    pub rejected: u64,
}

/// State shared by the loop thread and every handle.
struct Shared {
    queue: OperationQueue<Task>,
    /// `true` while posts are accepted.
    accepting: RwLock<bool>,
    state: Mutex<LoopState>,
    stats: Mutex<LoopStats>,
}

/// Cloneable producer handle. Safe to use from any thread, including the
/// loop thread itself (from inside an operation).
#[derive(Clone)]
pub struct LoopHandle {
    shared: Arc<Shared>,
}

impl LoopHandle {
    /// Enqueues an operation.
    ///
    /// # Errors
    ///
    /// Returns [`PainterError::LoopStopped`] once a stop has been requested.
    pub fn post(&self, op: impl Operation + 'static) -> PainterResult<()> {
        self.post_boxed(Box::new(op))
    }

    /// Enqueues an already boxed operation.
    ///
    /// # Errors
    ///
    /// Returns [`PainterError::LoopStopped`] once a stop has been requested.
    pub fn post_boxed(&self, op: Box<dyn Operation>) -> PainterResult<()> {
        let accepting = self.shared.accepting.read();
        if !*accepting {
            self.shared.stats.lock().rejected += 1;
            tracing::warn!(op = op.name(), "post rejected: execution loop is stopping");
            return Err(PainterError::LoopStopped);
        }
        self.shared.queue.push(Task::Apply(op));
        Ok(())
    }

    /// Requests a stop without waiting for it.
    ///
    /// Returns `true` if this call initiated the stop.
    pub fn request_stop(&self) -> bool {
        let mut accepting = self.shared.accepting.write();
        if !*accepting {
            return false;
        }
        *accepting = false;
        self.shared.queue.push(Task::Stop);
        let mut state = self.shared.state.lock();
        if *state == LoopState::Running {
            *state = LoopState::Draining;
        }
        tracing::debug!("stop requested");
        true
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> LoopState {
        *self.shared.state.lock()
    }

    /// Snapshot of the loop counters.
    #[must_use]
    pub fn stats(&self) -> LoopStats {
        *self.shared.stats.lock()
    }

    /// Entries waiting in the queue (racy snapshot).
    #[must_use]
    pub fn pending(&self) -> usize {
        self.shared.queue.len()
    }
}

impl std::fmt::Debug for LoopHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoopHandle")
            .field("state", &self.state())
            .field("pending", &self.pending())
            .finish()
    }
}

/// Owns the consumer thread. Dropping it stops the loop and waits.
pub struct ExecutionLoop {
    handle: LoopHandle,
    thread: Option<JoinHandle<()>>,
    thread_id: ThreadId,
}

impl ExecutionLoop {
    /// Allocates a frame of the configured size and starts the loop.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the thread
    /// cannot be spawned.
    pub fn start(config: &PainterConfig, presenter: impl Presenter + 'static) -> PainterResult<Self> {
        config.validate()?;
        Self::start_with_frame(Frame::new(config.canvas.width, config.canvas.height), presenter)
    }

    /// Starts the loop on an externally allocated render target.
    ///
    /// # Errors
    ///
    /// Returns [`PainterError::ThreadSpawn`] if the thread cannot be spawned.
    pub fn start_with_frame(frame: Frame, presenter: impl Presenter + 'static) -> PainterResult<Self> {
        let shared = Arc::new(Shared {
            queue: OperationQueue::new(),
            accepting: RwLock::new(true),
            state: Mutex::new(LoopState::Running),
            stats: Mutex::new(LoopStats::default()),
        });

        let (width, height) = (frame.width(), frame.height());
        let loop_shared = Arc::clone(&shared);
        let thread = thread::Builder::new()
            .name("painter-loop".to_string())
            .spawn(move || consume(&loop_shared, frame, CanvasState::new(), presenter))
            .map_err(PainterError::ThreadSpawn)?;

        tracing::info!(width, height, "execution loop started");

        Ok(Self {
            thread_id: thread.thread().id(),
            thread: Some(thread),
            handle: LoopHandle { shared },
        })
    }

    /// Returns a producer handle.
    #[must_use]
    pub fn handle(&self) -> LoopHandle {
        self.handle.clone()
    }

    /// Enqueues an operation.
    ///
    /// # Errors
    ///
    /// Returns [`PainterError::LoopStopped`] once a stop has been requested.
    pub fn post(&self, op: impl Operation + 'static) -> PainterResult<()> {
        self.handle.post(op)
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> LoopState {
        self.handle.state()
    }

    /// Snapshot of the loop counters.
    #[must_use]
    pub fn stats(&self) -> LoopStats {
        self.handle.stats()
    }

    /// Stops accepting posts, lets everything already queued run, and waits
    /// for the consumer thread to exit. Calling it again returns the final
    /// stats immediately.
    ///
    /// # Errors
    ///
    /// Returns [`PainterError::StopFromLoopThread`] when called from an
    /// operation running on the loop, and [`PainterError::ConsumerPanicked`]
    /// if the loop thread died.
    pub fn stop_and_wait(&mut self) -> PainterResult<LoopStats> {
        if thread::current().id() == self.thread_id {
            return Err(PainterError::StopFromLoopThread);
        }
        self.handle.request_stop();

        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                *self.handle.shared.state.lock() = LoopState::Stopped;
                return Err(PainterError::ConsumerPanicked);
            }
        }
        Ok(self.handle.stats())
    }
}

impl Drop for ExecutionLoop {
    fn drop(&mut self) {
        if self.thread.is_some() && thread::current().id() == self.thread_id {
            // Dropped by one of its own operations: joining would deadlock.
            // Close the queue and let the thread drain and exit detached.
            self.handle.request_stop();
            tracing::debug!("execution loop dropped on its own thread, detaching");
            return;
        }
        if self.thread.is_some() {
            if let Err(e) = self.stop_and_wait() {
                tracing::error!(error = %e, "execution loop did not shut down cleanly");
            }
        }
    }
}

impl std::fmt::Debug for ExecutionLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionLoop")
            .field("handle", &self.handle)
            .finish_non_exhaustive()
    }
}

/// Marks the loop stopped and closes it to new posts when the consumer
/// exits, whether it returns or unwinds.
struct ExitGuard<'a>(&'a Shared);

impl Drop for ExitGuard<'_> {
    fn drop(&mut self) {
        *self.0.accepting.write() = false;
        *self.0.state.lock() = LoopState::Stopped;
        if thread::panicking() {
            tracing::error!(
                pending = self.0.queue.len(),
                "execution loop thread died, queue closed"
            );
        }
    }
}

/// Consumer thread main loop.
fn consume<P: Presenter>(shared: &Shared, mut frame: Frame, mut canvas: CanvasState, mut presenter: P) {
    let _exit = ExitGuard(shared);
    let mut stop_requested = false;

    // Re-checked every iteration: the marker is last by construction, but the
    // exit test never trusts a single look at the queue.
    while !(stop_requested && shared.queue.is_empty()) {
        let mut op = match shared.queue.pop() {
            Task::Stop => {
                stop_requested = true;
                tracing::debug!(pending = shared.queue.len(), "stop marker reached");
                continue;
            }
            Task::Apply(op) => op,
        };

        let name = op.name();
        let outcome = catch_unwind(AssertUnwindSafe(|| op.apply(&mut frame, &mut canvas)));
        drop(op);

        match outcome {
            Ok(Ok(refresh)) => {
                tracing::debug!(op = name, refresh, "applied");
                let presented = refresh && present(&mut presenter, &frame);
                let mut stats = shared.stats.lock();
                stats.applied += 1;
                if presented {
                    stats.refreshes += 1;
                } else if refresh {
                    stats.present_failed += 1;
                }
            }
            Ok(Err(e)) => {
                tracing::warn!(op = name, error = %e, "operation skipped");
                shared.stats.lock().failed += 1;
            }
            Err(payload) => {
                tracing::error!(op = name, panic = panic_message(&*payload), "operation panicked");
                shared.stats.lock().failed += 1;
            }
        }
    }

    let stats = *shared.stats.lock();
    tracing::info!(
        applied = stats.applied,
        failed = stats.failed,
        refreshes = stats.refreshes,
        present_failed = stats.present_failed,
        "execution loop stopped"
    );
}

/// Hands `frame` to the presenter. Returns `false` if the presenter panicked.
fn present<P: Presenter>(presenter: &mut P, frame: &Frame) -> bool {
    match catch_unwind(AssertUnwindSafe(|| presenter.update(frame))) {
        Ok(()) => true,
        Err(payload) => {
            tracing::error!(panic = panic_message(&*payload), "presenter panicked, frame lost");
            false
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s
    } else {
        "non-string panic payload"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::operation::{FillOperation, FnOperation, UpdateOperation};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Presenter that records the background pixel of each frame.
    fn recorder() -> (Arc<Mutex<Vec<Color>>>, impl Presenter) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let presenter = FnPresenter(move |frame: &Frame| {
            sink.lock().push(frame.pixel(0, 0).unwrap_or_default());
        });
        (seen, presenter)
    }

    fn small_frame() -> Frame {
        Frame::new(16, 16)
    }

    #[test]
    fn test_stop_on_idle_loop() {
        let (seen, presenter) = recorder();
        let mut lp = ExecutionLoop::start_with_frame(small_frame(), presenter).unwrap();
        assert_eq!(lp.state(), LoopState::Running);

        let stats = lp.stop_and_wait().unwrap();
        assert_eq!(stats, LoopStats::default());
        assert_eq!(lp.state(), LoopState::Stopped);
        assert!(seen.lock().is_empty());
    }

    #[test]
    fn test_fill_then_update_presents_once() {
        let (seen, presenter) = recorder();
        let mut lp = ExecutionLoop::start_with_frame(small_frame(), presenter).unwrap();

        lp.post(FillOperation::white()).unwrap();
        lp.post(FillOperation::green()).unwrap();
        lp.post(UpdateOperation).unwrap();

        let stats = lp.stop_and_wait().unwrap();
        assert_eq!(stats.applied, 3);
        assert_eq!(stats.refreshes, 1);
        assert_eq!(*seen.lock(), vec![Color::GREEN]);
    }

    #[test]
    fn test_post_after_stop_is_rejected() {
        let (_seen, presenter) = recorder();
        let mut lp = ExecutionLoop::start_with_frame(small_frame(), presenter).unwrap();
        let handle = lp.handle();
        lp.stop_and_wait().unwrap();

        assert!(matches!(handle.post(UpdateOperation), Err(PainterError::LoopStopped)));
        assert_eq!(handle.stats().rejected, 1);
        assert!(!handle.request_stop());
    }

    #[test]
    fn test_panicking_operation_does_not_kill_loop() {
        let (seen, presenter) = recorder();
        let mut lp = ExecutionLoop::start_with_frame(small_frame(), presenter).unwrap();

        lp.post(FnOperation(|_: &mut Frame, _: &mut CanvasState| {
            panic!("boom");
        }))
        .unwrap();
        lp.post(FillOperation::green()).unwrap();
        lp.post(UpdateOperation).unwrap();

        let stats = lp.stop_and_wait().unwrap();
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.applied, 2);
        assert_eq!(*seen.lock(), vec![Color::GREEN]);
    }

    #[test]
    fn test_operation_can_post_from_loop_thread() {
        let (seen, presenter) = recorder();
        let mut lp = ExecutionLoop::start_with_frame(small_frame(), presenter).unwrap();
        let handle = lp.handle();

        lp.post(FnOperation(move |_: &mut Frame, canvas: &mut CanvasState| {
            canvas.background = Color::WHITE;
            handle.post(UpdateOperation).unwrap();
        }))
        .unwrap();

        // Give the inner post a chance to land before the stop marker.
        let deadline = std::time::Instant::now() + Duration::from_secs(5);
        while lp.stats().refreshes == 0 && std::time::Instant::now() < deadline {
            thread::sleep(Duration::from_millis(1));
        }
        lp.stop_and_wait().unwrap();
        assert_eq!(*seen.lock(), vec![Color::WHITE]);
    }

    #[test]
    fn test_stop_and_wait_twice() {
        let (_seen, presenter) = recorder();
        let mut lp = ExecutionLoop::start_with_frame(small_frame(), presenter).unwrap();
        lp.post(FillOperation::green()).unwrap();
        let first = lp.stop_and_wait().unwrap();
        let second = lp.stop_and_wait().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_drop_drains_queue() {
        let applied = Arc::new(AtomicUsize::new(0));
        {
            let lp = ExecutionLoop::start_with_frame(small_frame(), FnPresenter(|_: &Frame| {}))
                .unwrap();
            for _ in 0..100 {
                let applied = Arc::clone(&applied);
                lp.post(FnOperation(move |_: &mut Frame, _: &mut CanvasState| {
                    applied.fetch_add(1, Ordering::Relaxed);
                }))
                .unwrap();
            }
        }
        assert_eq!(applied.load(Ordering::Relaxed), 100);
    }

    #[test]
    fn test_panicking_presenter_does_not_kill_loop() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let mut lp = ExecutionLoop::start_with_frame(
            small_frame(),
            FnPresenter(move |_: &Frame| {
                if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                    panic!("presenter boom");
                }
            }),
        )
        .unwrap();

        lp.post(UpdateOperation).unwrap();
        let deadline = std::time::Instant::now() + Duration::from_secs(5);
        while lp.stats().present_failed == 0 && std::time::Instant::now() < deadline {
            thread::sleep(Duration::from_millis(1));
        }
        assert_eq!(lp.state(), LoopState::Running);

        lp.post(FillOperation::green()).unwrap();
        lp.post(UpdateOperation).unwrap();
        let stats = lp.stop_and_wait().unwrap();
        assert_eq!(stats.applied, 3);
        assert_eq!(stats.present_failed, 1);
        assert_eq!(stats.refreshes, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    /// Applies fine, then panics while being dropped: outside the per-apply
    /// panic boundary, so it takes the consumer thread down.
    struct PanicOnDrop;

    impl Operation for PanicOnDrop {
        fn apply(&mut self, _: &mut Frame, _: &mut CanvasState) -> PainterResult<bool> {
            Ok(false)
        }
    }

    impl Drop for PanicOnDrop {
        fn drop(&mut self) {
            panic!("drop boom");
        }
    }

    #[test]
    fn test_dead_consumer_closes_queue() {
        let mut lp =
            ExecutionLoop::start_with_frame(small_frame(), FnPresenter(|_: &Frame| {})).unwrap();
        lp.post(PanicOnDrop).unwrap();

        let deadline = std::time::Instant::now() + Duration::from_secs(5);
        while lp.state() != LoopState::Stopped && std::time::Instant::now() < deadline {
            thread::sleep(Duration::from_millis(1));
        }
        assert_eq!(lp.state(), LoopState::Stopped);
        assert!(matches!(lp.post(FillOperation::green()), Err(PainterError::LoopStopped)));
        assert!(matches!(lp.stop_and_wait(), Err(PainterError::ConsumerPanicked)));
    }

    #[test]
    fn test_stop_and_wait_from_loop_thread_is_refused() {
        let slot: Arc<Mutex<Option<ExecutionLoop>>> = Arc::new(Mutex::new(None));
        let outcome: Arc<Mutex<Option<PainterResult<LoopStats>>>> = Arc::new(Mutex::new(None));

        let lp = ExecutionLoop::start_with_frame(small_frame(), FnPresenter(|_: &Frame| {})).unwrap();
        let handle = lp.handle();
        *slot.lock() = Some(lp);

        let inner_slot = Arc::clone(&slot);
        let inner_outcome = Arc::clone(&outcome);
        handle
            .post(FnOperation(move |_: &mut Frame, _: &mut CanvasState| {
                let result = inner_slot.lock().as_mut().map(ExecutionLoop::stop_and_wait);
                *inner_outcome.lock() = result;
            }))
            .unwrap();

        let deadline = std::time::Instant::now() + Duration::from_secs(5);
        while outcome.lock().is_none() && std::time::Instant::now() < deadline {
            thread::sleep(Duration::from_millis(1));
        }
        assert!(matches!(*outcome.lock(), Some(Err(PainterError::StopFromLoopThread))));
        assert_eq!(handle.state(), LoopState::Running);

        let mut lp = slot.lock().take().unwrap();
        assert_eq!(lp.stop_and_wait().unwrap().applied, 1);
    }

    #[test]
    fn test_drop_on_loop_thread_detaches() {
        let slot: Arc<Mutex<Option<ExecutionLoop>>> = Arc::new(Mutex::new(None));
        let lp = ExecutionLoop::start_with_frame(small_frame(), FnPresenter(|_: &Frame| {})).unwrap();
        let handle = lp.handle();
        *slot.lock() = Some(lp);

        let inner_slot = Arc::clone(&slot);
        handle
            .post(FnOperation(move |_: &mut Frame, _: &mut CanvasState| {
                let lp = inner_slot.lock().take();
                drop(lp);
            }))
            .unwrap();

        let deadline = std::time::Instant::now() + Duration::from_secs(5);
        while handle.state() != LoopState::Stopped && std::time::Instant::now() < deadline {
            thread::sleep(Duration::from_millis(1));
        }
        assert_eq!(handle.state(), LoopState::Stopped);
        assert!(slot.lock().is_none());
        assert!(matches!(handle.post(UpdateOperation), Err(PainterError::LoopStopped)));
        assert_eq!(handle.stats().applied, 1);
    }

    #[test]
    fn test_rejects_invalid_config() {
        let mut config = PainterConfig::default();
        config.canvas.width = 0;
        let result = ExecutionLoop::start(&config, FnPresenter(|_: &Frame| {}));
        assert!(matches!(result, Err(PainterError::InvalidConfig(_))));
    }
}
