//! Error types for channel and select operations.
//!
//! One `thiserror`-derived type per operation rather than a single shared
//! status enum — this is the idiomatic Rust shape (`std::sync::mpsc`,
//! `crossbeam-channel`) for what `spec.md` describes as a mutually
//! exclusive set of abstract error kinds per call.

use std::fmt;
use thiserror::Error;

/// Returned by a blocking [`send`](crate::Channel::send) on a closed
/// channel. The value that could not be sent is handed back to the
/// caller — per the design note that a send observing closure does not
/// re-queue its element.
#[derive(Error)]
#[error("sending on a closed channel")]
pub struct SendError<T>(pub T);

impl<T> fmt::Debug for SendError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SendError").field(&"..").finish()
    }
}

impl<T> SendError<T> {
    /// Consumes the error, returning the value that failed to send.
    pub fn into_inner(self) -> T {
        self.0
    }
}

/// Returned by [`try_send`](crate::Channel::try_send).
#[derive(Error)]
pub enum TrySendError<T> {
    /// The channel is open but has no free capacity.
    #[error("channel is full")]
    Full(T),
    /// The channel has been closed.
    #[error("sending on a closed channel")]
    Closed(T),
}

impl<T> fmt::Debug for TrySendError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrySendError::Full(_) => f.debug_tuple("Full").field(&"..").finish(),
            TrySendError::Closed(_) => f.debug_tuple("Closed").field(&"..").finish(),
        }
    }
}

impl<T> TrySendError<T> {
    /// Consumes the error, returning the value that failed to send.
    pub fn into_inner(self) -> T {
        match self {
            TrySendError::Full(v) | TrySendError::Closed(v) => v,
        }
    }
}

/// Returned by a blocking [`receive`](crate::Channel::receive) on a
/// channel that is closed and has no buffered elements left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("receiving on a closed and empty channel")]
pub struct RecvError;

/// Returned by [`try_receive`](crate::Channel::try_receive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TryRecvError {
    /// The channel is open but has no buffered elements.
    #[error("channel is empty")]
    Empty,
    /// The channel is closed and drained.
    #[error("channel is closed")]
    Closed,
}

/// Returned by a second or later call to [`close`](crate::Channel::close).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("channel is already closed")]
pub struct AlreadyClosed;

/// Returned by [`destroy`](crate::Channel::destroy) when called on a
/// channel that has not yet been closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("destroy called on a channel that has not been closed")]
pub struct DestroyError;

/// Returned by [`select`](crate::select) when one of the referenced
/// channels is observed closed. `index` is the position, in the input
/// slice, of the first (by scan order) closed channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("channel referenced by select intent {index} is closed")]
pub struct SelectClosed {
    /// Index into the intent slice passed to [`select`](crate::select).
    pub index: usize,
}
