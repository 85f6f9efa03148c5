//! Multi-way select across a heterogeneous set of send/receive intents.
//!
//! Realizes `spec.md` §4.4 exactly: a private per-call monitor
//! ([`SelectWaiter`]) plus a locked readiness scan that either commits the
//! lowest-indexed feasible intent immediately, or registers on every
//! referenced channel and sleeps until woken by a producer, consumer, or
//! `close` on any of them.

use std::cell::Cell;
use std::sync::MutexGuard;

use crate::channel::{Channel, ChannelState};
use crate::error::SelectClosed;
use crate::waiter_list::SelectWaiter;

/// One send or receive intent passed to [`select`].
///
/// A `Send` intent's cell starts holding the value to transmit and is
/// emptied on commit. A `Recv` intent's cell starts empty and is filled
/// with the received value on commit — callers retrieve it afterwards
/// with [`Intent::take_received`]. This directly adopts the convention
/// `spec.md` §9 flags as the (unstated) behavior of the reference source's
/// `channel_list[i].data` out-parameter: the slot a caller reads from is
/// the same slot it handed to `select`.
pub enum Intent<'a, T> {
    /// Attempt to send `T` on the given channel.
    Send(&'a Channel<T>, Cell<Option<T>>),
    /// Attempt to receive a `T` from the given channel.
    Recv(&'a Channel<T>, Cell<Option<T>>),
}

impl<'a, T> Intent<'a, T> {
    /// A send intent for `value` on `channel`.
    pub fn send(channel: &'a Channel<T>, value: T) -> Self {
        Intent::Send(channel, Cell::new(Some(value)))
    }

    /// A receive intent on `channel`.
    pub fn recv(channel: &'a Channel<T>) -> Self {
        Intent::Recv(channel, Cell::new(None))
    }

    fn channel(&self) -> &'a Channel<T> {
        match self {
            Intent::Send(c, _) | Intent::Recv(c, _) => c,
        }
    }

    fn is_send(&self) -> bool {
        matches!(self, Intent::Send(..))
    }

    /// Takes the value received by this intent, if it was the one
    /// [`select`] committed as a `Recv`. Returns `None` for a `Send`
    /// intent, or for a `Recv` intent that did not commit.
    pub fn take_received(&self) -> Option<T> {
        match self {
            Intent::Recv(_, slot) => slot.take(),
            Intent::Send(..) => None,
        }
    }
}

/// One entry in the deduplicated, identity-sorted lock table built at the
/// top of every attempt round.
struct LockedChannel<'g, T> {
    identity: usize,
    guard: MutexGuard<'g, ChannelState<T>>,
}

fn lock_channels_in_identity_order<'g, T>(intents: &'g [Intent<'g, T>]) -> Vec<LockedChannel<'g, T>> {
    // Step 1: deduplicate by channel identity, then lock in ascending
    // identity order. A stable global lock order across all concurrently
    // running `select` calls is what makes this deadlock-free regardless
    // of the order callers happened to list their channels in (spec.md
    // §4.4 point 1 / §9, option (a)).
    let mut order: Vec<usize> = (0..intents.len()).collect();
    order.sort_by_key(|&i| intents[i].channel().identity());

    let mut locked: Vec<LockedChannel<T>> = Vec::new();
    for &i in &order {
        let id = intents[i].channel().identity();
        if locked.iter().any(|lc| lc.identity == id) {
            continue;
        }
        let guard = intents[i]
            .channel()
            .inner
            .state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        locked.push(LockedChannel { identity: id, guard });
    }
    locked
}

fn find_guard<'g, 'h, T>(
    locked: &'h mut [LockedChannel<'g, T>],
    identity: usize,
) -> &'h mut MutexGuard<'g, ChannelState<T>> {
    &mut locked
        .iter_mut()
        .find(|lc| lc.identity == identity)
        .expect("channel must have been locked in step 1")
        .guard
}

/// Evaluates `intents` and commits the lowest-indexed one that is
/// immediately feasible; blocks until one becomes feasible if none is.
///
/// Returns `Ok(i)` when intent `i` committed. Returns
/// `Err(SelectClosed { index })` the moment any referenced channel is
/// observed closed, identifying that channel by its position in `intents`
/// (first-such by scan order) — closure on any referenced channel always
/// terminates the call, it never silently skips to another intent.
pub fn select<'a, T>(intents: &'a [Intent<'a, T>]) -> Result<usize, SelectClosed> {
    assert!(!intents.is_empty(), "select requires at least one intent");
    let waiter = SelectWaiter::new();

    loop {
        let mut locked = lock_channels_in_identity_order(intents);

        // Step 2: registration cleanup. A previous round may have
        // registered us; start this round with a clean slate so step 4
        // never double-inserts.
        for intent in intents {
            let id = intent.channel().identity();
            let guard = find_guard(&mut locked, id);
            if intent.is_send() {
                guard.sel_sends.remove_if_present(&waiter);
            } else {
                guard.sel_recvs.remove_if_present(&waiter);
            }
        }

        // Step 3: readiness scan, lowest index wins.
        for (i, intent) in intents.iter().enumerate() {
            let channel = intent.channel();
            let id = channel.identity();
            let guard = find_guard(&mut locked, id);

            if !guard.open {
                drop(locked);
                return Err(SelectClosed { index: i });
            }

            match intent {
                Intent::Send(_, slot) => {
                    if guard.buffer.current_size() < guard.buffer.capacity() {
                        let value = slot
                            .take()
                            .expect("send intent's value was already taken");
                        channel.send_core(&mut **guard, value);
                        channel.record_select_commit();
                        drop(locked);
                        return Ok(i);
                    }
                }
                Intent::Recv(_, slot) => {
                    if guard.buffer.current_size() > 0 {
                        let value = channel.receive_core(&mut **guard);
                        slot.set(Some(value));
                        channel.record_select_commit();
                        drop(locked);
                        return Ok(i);
                    }
                }
            }
        }

        // Step 4: nothing was feasible. Register on every (channel,
        // direction) pair not already registered this round, release
        // every channel lock, then sleep on our private monitor.
        //
        // Registration happens here, channel guards still held. We then
        // acquire the waiter's private mutex *before* releasing any of
        // those channel guards, mirroring `spec.md` §4.4 step 4 and
        // `channel.c`'s `channel_select` (which takes `local_lock` before
        // the loop that unlocks each channel, and only calls
        // `pthread_cond_wait` at the very end). This is the global
        // channel-lock -> waiter-lock order spec.md §5 requires, and it
        // is what lets `wake` (which itself must acquire this same
        // private mutex before it can `notify_one`) never complete while
        // we are in between "registered" and "asleep" — it either runs
        // before we've registered (and we'll see its effect on our very
        // next readiness scan, since it only fires after the signaling
        // operation's own channel-lock critical section, which can only
        // start once ours has ended) or it blocks on the private mutex
        // until we are parked in `Condvar::wait`, which is the only place
        // that releases it again.
        let private_guard = waiter.lock_private();

        let mut seen: Vec<(usize, bool)> = Vec::new();
        let mut metered_channels: Vec<usize> = Vec::new();
        for intent in intents {
            let id = intent.channel().identity();
            let is_send = intent.is_send();
            if !metered_channels.contains(&id) {
                metered_channels.push(id);
                intent.channel().record_select_block();
            }
            if seen.contains(&(id, is_send)) {
                continue;
            }
            seen.push((id, is_send));
            let guard = find_guard(&mut locked, id);
            if is_send {
                guard.sel_sends.insert(std::sync::Arc::clone(&waiter));
            } else {
                guard.sel_recvs.insert(std::sync::Arc::clone(&waiter));
            }
        }
        drop(locked);

        tracing::trace!(intents = intents.len(), "select blocking");
        waiter.sleep(private_guard);
        // Loop back to step 1 and re-evaluate from scratch.
    }
}
