//! Intrusive-in-spirit waiter list and the private monitor each `select`
//! call registers on the channels it references.
//!
//! `spec.md` describes the waiter list as an intrusive doubly-linked list
//! with identity-based `find`. In safe Rust the idiomatic realization is a
//! `VecDeque<Arc<SelectWaiter>>`: insertion, FIFO iteration, and identity
//! comparison (`Arc::ptr_eq`) all fall out for free, and the list is never
//! touched without the owning channel's mutex held, so there is nothing
//! for an intrusive list's O(1) unlink to buy us here — select sets are
//! small by construction (one entry per channel an application actually
//! waits on).

use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

/// A per-`select`-call monitor: a private mutex + condition variable pair
/// that channel operations signal to wake a sleeping select. Mirrors
/// `spec.md`'s "waiter record" — semantic identity is the identity of the
/// `Arc` allocation itself, never its contents.
pub(crate) struct SelectWaiter {
    lock: Mutex<()>,
    condvar: Condvar,
}

impl SelectWaiter {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            lock: Mutex::new(()),
            condvar: Condvar::new(),
        })
    }

    /// Acquires the private mutex. `spec.md` §4.4 step 4 (and
    /// `channel.c`'s `channel_select`, which takes `local_lock` before
    /// unlocking any channel in that same loop) takes this lock *before*
    /// releasing the channel locks held during registration — callers
    /// must mirror that ordering, not drop the channel locks first.
    pub(crate) fn lock_private(&self) -> MutexGuard<'_, ()> {
        self.lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Wakes this select. Acquires the private mutex first — this is what
    /// makes the handshake with [`sleep`](Self::sleep) lose-wakeup-free:
    /// a signaler cannot finish notifying until the select is either not
    /// yet registered-and-waiting (in which case it will notice on its
    /// next readiness scan) or already holding the private mutex on its
    /// way into `Condvar::wait`, which atomically releases the mutex
    /// while parking — so this call blocks until that release happens.
    pub(crate) fn wake(&self) {
        let guard = self.lock_private();
        self.condvar.notify_one();
        drop(guard);
    }

    /// Parks the calling thread until [`wake`](Self::wake) is called.
    /// Takes an already-held private-mutex guard (from
    /// [`lock_private`](Self::lock_private)) rather than acquiring one
    /// itself: the caller must acquire the private mutex *before*
    /// releasing its channel locks, then release those channel locks,
    /// then call this — never the other way around, or a `wake` racing
    /// in between could notify before anyone is parked to receive it.
    pub(crate) fn sleep(&self, guard: MutexGuard<'_, ()>) {
        let _guard = self
            .condvar
            .wait(guard)
            .unwrap_or_else(PoisonError::into_inner);
    }
}

/// FIFO list of select registrations pending on one (channel, direction)
/// pair. Not thread-safe on its own — always accessed with the owning
/// channel's lock held.
pub(crate) struct WaiterList {
    waiters: VecDeque<Arc<SelectWaiter>>,
}

impl WaiterList {
    pub(crate) fn new() -> Self {
        Self {
            waiters: VecDeque::new(),
        }
    }

    /// Appends at the tail.
    pub(crate) fn insert(&mut self, waiter: Arc<SelectWaiter>) {
        self.waiters.push_back(waiter);
    }

    /// Removes the first registration matching `waiter` by identity, if
    /// present. A no-op if absent — callers use this for idempotent
    /// per-round cleanup (spec.md §4.4 step 2).
    pub(crate) fn remove_if_present(&mut self, waiter: &Arc<SelectWaiter>) {
        if let Some(pos) = self.waiters.iter().position(|w| Arc::ptr_eq(w, waiter)) {
            self.waiters.remove(pos);
        }
    }

    #[cfg(test)]
    pub(crate) fn count(&self) -> usize {
        self.waiters.len()
    }

    /// FIFO iteration in insertion order, for waking every registrant.
    pub(crate) fn iter(&self) -> impl Iterator<Item = &Arc<SelectWaiter>> {
        self.waiters.iter()
    }
}
