//! # Operation Queue
//!
//! Unbounded multi-producer / single-consumer blocking FIFO.
//!
//! ```text
//!   Thread 1 ──┐
//!   Thread 2 ──┼──> [Mutex<VecDeque>] + [Condvar] ──> Execution Loop
//!   Thread N ──┘       (push never blocks)           (single consumer)
//! ```
//!
//! The consumer checks for emptiness and goes to sleep while holding the
//! same lock producers take to append, and producers notify under that
//! lock. A push racing with the consumer entering its wait is therefore
//! always seen: either it lands before the check, or the consumer is
//! already parked on the condvar when the notification fires.

use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Thread-safe FIFO of pending work.
///
/// `push` may be called from any number of threads. `pop` must only be
/// called from one thread at a time.
pub struct OperationQueue<T> {
    /// Pending entries, head first.
    items: Mutex<VecDeque<T>>,
    /// Signalled on every push.
    not_empty: Condvar,
}

impl<T> OperationQueue<T> {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self {
            items: Mutex::new(VecDeque::new()),
            not_empty: Condvar::new(),
        }
    }

    /// Appends `item` to the tail. Never blocks on capacity, never fails.
    pub fn push(&self, item: T) {
        let mut items = self.items.lock();
        items.push_back(item);
        self.not_empty.notify_one();
    }

    /// Removes and returns the head, sleeping while the queue is empty.
    pub fn pop(&self) -> T {
        let mut items = self.items.lock();
        loop {
            if let Some(item) = items.pop_front() {
                return item;
            }
            self.not_empty.wait(&mut items);
        }
    }

    /// Like [`pop`](Self::pop) but gives up after `timeout`.
    pub fn pop_timeout(&self, timeout: Duration) -> Option<T> {
        let deadline = Instant::now() + timeout;
        let mut items = self.items.lock();
        loop {
            if let Some(item) = items.pop_front() {
                return Some(item);
            }
            if self.not_empty.wait_until(&mut items, deadline).timed_out() {
                return items.pop_front();
            }
        }
    }

    /// Snapshot emptiness check. Racy with concurrent pushes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }

    /// Snapshot length. Racy with concurrent pushes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.lock().len()
    }
}

impl<T> Default for OperationQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for OperationQueue<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationQueue")
            .field("len", &self.len())
            .finish()
    }
}
