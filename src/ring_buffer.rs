//! Fixed-capacity FIFO ring buffer of opaque elements.
//!
//! Plumbing: all synchronization is the owning [`Channel`](crate::Channel)'s
//! responsibility. `VecDeque` is itself a head/tail-indexed ring over a
//! contiguous allocation, so it satisfies the spec's "contiguous slot
//! array" shape directly — there is no benefit to hand-rolling the index
//! arithmetic the teacher's `Ring<T>` does for its lock-free fast path,
//! since this ring is only ever touched under the channel's mutex.

use std::collections::VecDeque;

pub(crate) struct RingBuffer<T> {
    buf: VecDeque<T>,
    capacity: usize,
}

impl<T> RingBuffer<T> {
    pub(crate) fn new(capacity: usize) -> Self {
        debug_assert!(capacity > 0, "ring buffer capacity must be positive");
        Self {
            buf: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub(crate) fn current_size(&self) -> usize {
        self.buf.len()
    }

    /// Appends `elem` iff the buffer has free space. Returns `elem` back
    /// on failure so the caller never loses it.
    pub(crate) fn add(&mut self, elem: T) -> Result<(), T> {
        if self.buf.len() >= self.capacity {
            return Err(elem);
        }
        self.buf.push_back(elem);
        Ok(())
    }

    /// Dequeues the oldest element, or `None` if empty.
    pub(crate) fn remove(&mut self) -> Option<T> {
        self.buf.pop_front()
    }
}
