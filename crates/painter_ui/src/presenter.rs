//! Hands presented frames from the execution loop to the display thread.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use painter_core::{Frame, Presenter};

/// Presenter that copies each frame into a bounded channel.
///
/// The loop thread never blocks here. When the display lags, the oldest
/// queued frame is evicted so the newest one always gets through; evicted
/// frames are counted as dropped.
#[derive(Debug, Clone)]
pub struct ChannelPresenter {
    sender: Sender<Frame>,
    evict: Receiver<Frame>,
    dropped: Arc<AtomicU64>,
}

impl ChannelPresenter {
    /// Creates a presenter and the receiving end for the display thread.
    #[must_use]
    pub fn new(capacity: usize) -> (Self, Receiver<Frame>) {
        let (sender, receiver) = bounded(capacity.max(1));
        (
            Self {
                sender,
                evict: receiver.clone(),
                dropped: Arc::new(AtomicU64::new(0)),
            },
            receiver,
        )
    }

    /// Frames dropped because the display lagged.
    #[must_use]
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// A drop counter that outlives the presenter without keeping the
    /// channel open.
    #[must_use]
    pub fn dropped_frames(&self) -> DroppedFrames {
        DroppedFrames(Arc::clone(&self.dropped))
    }
}

/// Read-only view of a [`ChannelPresenter`]'s drop count.
#[derive(Debug, Clone)]
pub struct DroppedFrames(Arc<AtomicU64>);

impl DroppedFrames {
    /// Frames dropped so far.
    #[must_use]
    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

impl Presenter for ChannelPresenter {
    fn update(&mut self, frame: &Frame) {
        let mut frame = frame.clone();
        // Two attempts: the display thread may refill the slot we just freed.
        for _ in 0..2 {
            match self.sender.try_send(frame) {
                Ok(()) => return,
                Err(TrySendError::Full(rejected)) => {
                    frame = rejected;
                    if self.evict.try_recv().is_ok() {
                        self.dropped.fetch_add(1, Ordering::Relaxed);
                        tracing::debug!("display lagging, oldest frame dropped");
                    }
                }
                Err(TrySendError::Disconnected(_)) => return,
            }
        }
        self.dropped.fetch_add(1, Ordering::Relaxed);
        tracing::debug!("display lagging, frame dropped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use painter_core::Color;

    #[test]
    fn test_frames_are_copied() {
        let (mut presenter, rx) = ChannelPresenter::new(2);
        let mut frame = Frame::new(4, 4);
        frame.fill(Color::GREEN);
        presenter.update(&frame);
        frame.fill(Color::WHITE);

        let received = rx.try_recv().unwrap();
        assert_eq!(received.pixel(0, 0), Some(Color::GREEN));
    }

    #[test]
    fn test_full_channel_keeps_newest() {
        let (mut presenter, rx) = ChannelPresenter::new(1);
        let mut frame = Frame::new(2, 2);
        for color in [Color::BLACK, Color::WHITE, Color::GREEN] {
            frame.fill(color);
            presenter.update(&frame);
        }
        assert_eq!(presenter.dropped(), 2);
        assert_eq!(rx.len(), 1);
        assert_eq!(rx.try_recv().unwrap().pixel(0, 0), Some(Color::GREEN));
    }

    #[test]
    fn test_no_display_never_blocks() {
        let (mut presenter, rx) = ChannelPresenter::new(2);
        drop(rx);
        for _ in 0..10 {
            presenter.update(&Frame::new(1, 1));
        }
        assert_eq!(presenter.dropped(), 8);
        let counter = presenter.dropped_frames();
        drop(presenter);
        assert_eq!(counter.get(), 8);
    }
}
