//! Targets the viewer publishes finished images to.

use std::sync::Arc;

use painter_core::Frame;
use parking_lot::Mutex;

/// A destination for window-sized images.
pub trait Surface: Send {
    /// Shows `image`. Called on the display thread.
    fn publish(&mut self, image: &Frame);
}

impl<S: Surface + ?Sized> Surface for Box<S> {
    fn publish(&mut self, image: &Frame) {
        (**self).publish(image);
    }
}

/// Keeps the last published image in memory.
///
/// Clones share storage, so a test can hold one clone while the display
/// thread owns another.
#[derive(Debug, Clone, Default)]
pub struct MemorySurface {
    inner: Arc<Mutex<MemoryInner>>,
}

#[derive(Debug, Default)]
struct MemoryInner {
    last: Option<Frame>,
    published: u64,
}

impl MemorySurface {
    /// Creates an empty surface.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the last published image.
    #[must_use]
    pub fn last(&self) -> Option<Frame> {
        self.inner.lock().last.clone()
    }

    /// Number of images published so far.
    #[must_use]
    pub fn published(&self) -> u64 {
        self.inner.lock().published
    }
}

impl Surface for MemorySurface {
    fn publish(&mut self, image: &Frame) {
        let mut inner = self.inner.lock();
        if let Some(last) = inner.last.as_mut() {
            last.copy_from(image);
        } else {
            inner.last = Some(image.clone());
        }
        inner.published += 1;
    }
}
