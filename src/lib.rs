//! csp-channel - a bounded, mutex/condvar-synchronized multi-producer
//! multi-consumer channel with CSP-style multi-way `select`.
//!
//! Every handle can both send and receive; there is no separate producer
//! or consumer type. Blocking, non-blocking, and `select`-based operations
//! all share one lock per channel and the same commit path, so the three
//! ways of moving an element through a channel observe each other's
//! effects immediately and consistently.
//!
//! # Example
//!
//! ```
//! use csp_channel::{select, Channel, Intent};
//!
//! let requests = Channel::<u32>::new(4);
//! let replies = Channel::<u32>::new(4);
//!
//! requests.send(7).unwrap();
//!
//! let intents = [Intent::recv(&requests), Intent::recv(&replies)];
//! let won = select(&intents).unwrap();
//! assert_eq!(won, 0);
//! assert_eq!(intents[won].take_received(), Some(7));
//! ```
//!
//! # Closing and teardown
//!
//! [`Channel::close`] wakes every blocked `send`/`receive` and every
//! registered `select` call so each observes the closure on its own next
//! check, rather than hanging forever. [`Channel::destroy`] is the
//! explicit precondition check this crate exposes for parity with the
//! reference design it implements; ordinary `Drop` already reclaims a
//! channel's memory once its last handle goes out of scope.

mod channel;
mod config;
mod error;
mod metrics;
mod ring_buffer;
mod select;
mod waiter_list;

pub use channel::Channel;
pub use config::Config;
pub use error::{
    AlreadyClosed, DestroyError, RecvError, SelectClosed, SendError, TryRecvError, TrySendError,
};
pub use metrics::MetricsSnapshot;
pub use select::{select, Intent};
