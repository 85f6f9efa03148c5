//! Bounded, multi-producer/multi-consumer channel.
//!
//! One [`Mutex`] (`channel_lock` in `spec.md`) protects everything: the
//! ring buffer, the open/closed flag, and both select-waiter lists. Two
//! [`Condvar`]s (`not_full`, `not_empty`) serve blocking send/receive.
//! `send`/`receive` and their non-blocking counterparts all bottom out in
//! `send_core`/`receive_core`, the "common tail" `spec.md` §4.3
//! describes, which is also what [`select`](crate::select) calls once it
//! decides to commit.

use std::sync::{Arc, Condvar, Mutex, MutexGuard};

use crate::config::Config;
use crate::error::{AlreadyClosed, DestroyError, RecvError, SendError, TryRecvError, TrySendError};
use crate::metrics::{Metrics, MetricsSnapshot};
use crate::ring_buffer::RingBuffer;
use crate::waiter_list::WaiterList;

pub(crate) struct ChannelState<T> {
    pub(crate) buffer: RingBuffer<T>,
    pub(crate) open: bool,
    pub(crate) sel_sends: WaiterList,
    pub(crate) sel_recvs: WaiterList,
}

pub(crate) struct ChannelInner<T> {
    pub(crate) state: Mutex<ChannelState<T>>,
    pub(crate) not_full: Condvar,
    pub(crate) not_empty: Condvar,
    config: Config,
    metrics: Option<Metrics>,
}

/// A bounded channel handle. Cloning shares the same underlying mailbox —
/// there is no separate sender/receiver type, because `spec.md`'s model
/// has no such asymmetry: any handle may send or receive.
pub struct Channel<T> {
    pub(crate) inner: Arc<ChannelInner<T>>,
}

impl<T> Clone for Channel<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Channel<T> {
    /// Creates a new channel with the given fixed capacity.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero (rendezvous channels are not
    /// supported — see `spec.md` Non-goals).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self::with_config(Config::new(capacity, false))
    }

    /// Creates a new channel from an explicit [`Config`].
    #[must_use]
    pub fn with_config(config: Config) -> Self {
        let metrics = config.enable_metrics.then(Metrics::default);
        Self {
            inner: Arc::new(ChannelInner {
                state: Mutex::new(ChannelState {
                    buffer: RingBuffer::new(config.capacity),
                    open: true,
                    sel_sends: WaiterList::new(),
                    sel_recvs: WaiterList::new(),
                }),
                not_full: Condvar::new(),
                not_empty: Condvar::new(),
                config,
                metrics,
            }),
        }
    }

    /// Stable identity used for select's deterministic lock ordering —
    /// the address of the shared allocation, constant across clones.
    pub(crate) fn identity(&self) -> usize {
        Arc::as_ptr(&self.inner) as *const () as usize
    }

    fn lock(&self) -> MutexGuard<'_, ChannelState<T>> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// The configured fixed capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.inner.config.capacity
    }

    /// Number of currently buffered elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().buffer.current_size()
    }

    /// Whether the buffer currently holds no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether [`close`](Self::close) has been called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        !self.lock().open
    }

    /// A snapshot of this channel's counters, if [`Config::enable_metrics`]
    /// was set.
    #[must_use]
    pub fn metrics(&self) -> Option<MetricsSnapshot> {
        self.inner.metrics.as_ref().map(Metrics::snapshot)
    }

    /// Send-core: precondition is that the caller holds `state`'s lock,
    /// the channel is open, and the buffer has free space. Enqueues, wakes
    /// one blocked classical receiver, then wakes every registered
    /// select-receive waiter so each may re-evaluate its whole intent set.
    pub(crate) fn send_core(&self, state: &mut ChannelState<T>, elem: T) {
        state
            .buffer
            .add(elem)
            .unwrap_or_else(|_| unreachable!("send_core precondition violated: buffer was full"));
        self.inner.not_empty.notify_one();
        for waiter in state.sel_recvs.iter() {
            waiter.wake();
        }
        if let Some(metrics) = &self.inner.metrics {
            metrics.record_send();
        }
    }

    /// Records a commit made by [`select`](crate::select) once it has
    /// already called `send_core`/`receive_core` for the winning intent.
    pub(crate) fn record_select_commit(&self) {
        if let Some(metrics) = &self.inner.metrics {
            metrics.record_select_commit();
        }
    }

    /// Records that a `select` call registered on this channel and is
    /// about to block because nothing was immediately feasible.
    pub(crate) fn record_select_block(&self) {
        if let Some(metrics) = &self.inner.metrics {
            metrics.record_select_block();
        }
    }

    /// Receive-core: symmetric to [`send_core`](Self::send_core).
    pub(crate) fn receive_core(&self, state: &mut ChannelState<T>) -> T {
        let elem = state
            .buffer
            .remove()
            .unwrap_or_else(|| unreachable!("receive_core precondition violated: buffer was empty"));
        self.inner.not_full.notify_one();
        for waiter in state.sel_sends.iter() {
            waiter.wake();
        }
        if let Some(metrics) = &self.inner.metrics {
            metrics.record_receive();
        }
        elem
    }

    /// Blocking send. Waits while the buffer is full; re-checks closure
    /// on every wake.
    pub fn send(&self, elem: T) -> Result<(), SendError<T>> {
        let mut state = self.lock();
        if !state.open {
            return Err(SendError(elem));
        }
        while state.buffer.current_size() == state.buffer.capacity() {
            tracing::trace!("send blocking: channel full");
            state = self
                .inner
                .not_full
                .wait(state)
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            if !state.open {
                return Err(SendError(elem));
            }
        }
        self.send_core(&mut state, elem);
        Ok(())
    }

    /// Blocking receive. Waits while the buffer is empty; re-checks
    /// closure on every wake.
    pub fn receive(&self) -> Result<T, RecvError> {
        let mut state = self.lock();
        if !state.open {
            return Err(RecvError);
        }
        while state.buffer.current_size() == 0 {
            tracing::trace!("receive blocking: channel empty");
            state = self
                .inner
                .not_empty
                .wait(state)
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            if !state.open {
                return Err(RecvError);
            }
        }
        Ok(self.receive_core(&mut state))
    }

    /// Non-blocking send: never suspends the caller.
    pub fn try_send(&self, elem: T) -> Result<(), TrySendError<T>> {
        let mut state = self.lock();
        if !state.open {
            return Err(TrySendError::Closed(elem));
        }
        if state.buffer.current_size() == state.buffer.capacity() {
            return Err(TrySendError::Full(elem));
        }
        self.send_core(&mut state, elem);
        Ok(())
    }

    /// Non-blocking receive: never suspends the caller.
    pub fn try_receive(&self) -> Result<T, TryRecvError> {
        let mut state = self.lock();
        if !state.open {
            return Err(TryRecvError::Closed);
        }
        if state.buffer.current_size() == 0 {
            return Err(TryRecvError::Empty);
        }
        Ok(self.receive_core(&mut state))
    }

    /// Closes the channel. Every blocked `send`/`receive` wakes to observe
    /// closure; every registered select waiter (both directions) is
    /// signaled so it re-evaluates and observes the closed channel on its
    /// next readiness scan.
    pub fn close(&self) -> Result<(), AlreadyClosed> {
        let mut state = self.lock();
        if !state.open {
            return Err(AlreadyClosed);
        }
        state.open = false;
        self.inner.not_full.notify_all();
        self.inner.not_empty.notify_all();
        for waiter in state.sel_recvs.iter() {
            waiter.wake();
        }
        for waiter in state.sel_sends.iter() {
            waiter.wake();
        }
        tracing::debug!("channel closed");
        Ok(())
    }

    /// Checks the `destroy` precondition from `spec.md`: the channel must
    /// already be closed. There is nothing further to free — the last
    /// dropped [`Channel`] clone deallocates `ChannelInner` automatically
    /// — this method exists purely so the precondition is checkable and
    /// its violation is reported exactly as `spec.md` specifies.
    pub fn destroy(&self) -> Result<(), DestroyError> {
        if self.lock().open {
            return Err(DestroyError);
        }
        Ok(())
    }
}
