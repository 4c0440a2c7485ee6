//! # threadkit
//!
//! A small toolkit of thread coordination primitives for concurrent programming.
//!
//! ## Features
//!
//! - **ConcurrentDeque**: A lock-partitioned double-ended queue that allows
//!   inserts and removals to proceed concurrently with only occasional
//!   full-structure contention
//! - **Future**: A one-shot asynchronous result cell with cooperative
//!   cancellation
//! - **WorkerPool**: A bounded task queue serviced by a dynamically resizable
//!   set of worker threads, with graceful and immediate shutdown
//! - **fan_out / fan_in / concurrent_map**: Channel orchestration for
//!   distributing a stream of work across workers, merging streams, and
//!   applying a function to a batch of inputs in parallel
//!
//! ## Philosophy
//!
//! threadkit focuses on providing:
//! - Primitives with explicit, documented locking and cancellation discipline
//! - Cooperative cancellation that never forcibly terminates running work
//! - Ergonomic APIs that surface back-pressure and shutdown as recoverable
//!   errors rather than blocking or panicking
//!
//! ## Quick Start
//!
//! ```rust
//! use threadkit::deque::ConcurrentArrayDeque;
//!
//! let deque = ConcurrentArrayDeque::new();
//! deque.enqueue(42);
//! assert_eq!(deque.dequeue(), Some(42));
//! ```
//!
//! ## Thread Safety
//!
//! All primitives in threadkit are safe to share across threads. The
//! sequential deque backings in [`deque`] are the single-threaded
//! collaborators consumed by [`deque::ConcurrentDeque`] and are not
//! themselves synchronized.
//!
//! ## Cancellation Model
//!
//! Cancellation is cooperative: a shared [`cancel::CancelToken`] is checked
//! at well-defined suspension points (channel operations, worker loop tops,
//! the start of a future's execution). Work that is already running is never
//! interrupted; it is the work function's responsibility to observe the token
//! if it wants to stop early. Timeouts are layered on top by attaching a
//! deadline to the token; the toolkit imposes no default timeout.

#![warn(missing_docs, missing_debug_implementations, rust_2018_idioms)]

pub mod cancel;
pub mod deque;
pub mod flow;
pub mod future;
pub mod metrics;
pub mod pool;

pub use crate::cancel::CancelToken;
pub use crate::deque::{ConcurrentArrayDeque, ConcurrentDeque, ConcurrentLinkedDeque, Deque};
pub use crate::flow::{concurrent_map, fan_in, fan_out, MapOptions};
pub use crate::future::Future;
pub use crate::pool::WorkerPool;

use thiserror::Error;

/// Error types for threadkit operations.
///
/// Absence of an element (empty structure, value not found) is never an
/// error; it is signaled through `Option` or `bool` return values. The
/// variants below cover every reported failure condition in the toolkit:
/// capacity rejection, closed-resource rejection, cancellation, and
/// per-item task failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The worker pool has been closed; no further submissions or resizes
    /// are accepted.
    #[error("worker pool has been closed")]
    PoolClosed,
    /// The bounded task queue is full. The caller may retry later; the
    /// submission never blocks.
    #[error("task queue is full")]
    QueueFull,
    /// The operation was aborted because the shared cancellation token
    /// fired. Distinct from ordinary task failure.
    #[error("operation canceled")]
    Canceled,
    /// An individual unit of work reported a failure. Always per-item,
    /// never conflated with cancellation or pool state.
    #[error("task failed: {0}")]
    Task(String),
    /// Multiple per-item failures joined into one combined error, as
    /// produced by [`concurrent_map`].
    #[error("{} task(s) failed", .0.len())]
    Aggregate(Vec<Error>),
}

impl Error {
    /// Combine a list of per-item errors into a single error value.
    ///
    /// Returns `None` for an empty list, the error itself for a single
    /// failure, and [`Error::Aggregate`] otherwise.
    pub fn join(mut errors: Vec<Error>) -> Option<Error> {
        match errors.len() {
            0 => None,
            1 => errors.pop(),
            _ => Some(Error::Aggregate(errors)),
        }
    }

    /// Whether this error is (or contains only) a cancellation.
    pub fn is_canceled(&self) -> bool {
        match self {
            Error::Canceled => true,
            Error::Aggregate(errs) => errs.iter().all(Error::is_canceled),
            _ => false,
        }
    }
}

/// Result type for threadkit operations.
pub type Result<T> = core::result::Result<T, Error>;
