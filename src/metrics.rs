//! Optional lightweight counters, in the spirit of the teacher crate's
//! `Metrics` — a plain snapshot struct, gated behind
//! [`Config::enable_metrics`](crate::Config), costing one relaxed atomic
//! increment per tracked event when enabled and nothing when disabled.

use crossbeam_utils::CachePadded;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub(crate) struct Metrics {
    messages_sent: CachePadded<AtomicU64>,
    messages_received: CachePadded<AtomicU64>,
    select_commits: CachePadded<AtomicU64>,
    select_blocks: CachePadded<AtomicU64>,
}

impl Metrics {
    pub(crate) fn record_send(&self) {
        self.messages_sent.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_receive(&self) {
        self.messages_received.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_select_commit(&self) {
        self.select_commits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_select_block(&self) {
        self.select_blocks.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            messages_sent: self.messages_sent.load(Ordering::Relaxed),
            messages_received: self.messages_received.load(Ordering::Relaxed),
            select_commits: self.select_commits.load(Ordering::Relaxed),
            select_blocks: self.select_blocks.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time copy of a channel's counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Total successful `send`/`try_send`/select-send commits.
    pub messages_sent: u64,
    /// Total successful `receive`/`try_receive`/select-recv commits.
    pub messages_received: u64,
    /// Total intents committed via [`select`](crate::select) (subset of
    /// the two counters above, tracked separately for visibility into how
    /// much traffic flows through select versus direct calls).
    pub select_commits: u64,
    /// Total times a `select` call registered on this channel because
    /// nothing was immediately feasible and it had to block.
    pub select_blocks: u64,
}
