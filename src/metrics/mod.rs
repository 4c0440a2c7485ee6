//! Operation counters
//!
//! Lightweight monitoring for the concurrent primitives. Counters are plain
//! relaxed atomics updated on the hot path and read through snapshot
//! structs, so collecting them never contends with the operations they
//! observe. Values may be slightly stale while writers are active.

use std::sync::atomic::{AtomicU64, Ordering};

/// Internal counters for [`ConcurrentDeque`](crate::deque::ConcurrentDeque).
#[derive(Debug, Default)]
pub(crate) struct DequeCounters {
    pub(crate) transfers: AtomicU64,
    pub(crate) transferred_elements: AtomicU64,
}

impl DequeCounters {
    pub(crate) fn record_transfer(&self, elements: usize) {
        self.transfers.fetch_add(1, Ordering::Relaxed);
        self.transferred_elements
            .fetch_add(elements as u64, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> DequeMetrics {
        DequeMetrics {
            transfers: self.transfers.load(Ordering::Relaxed),
            transferred_elements: self.transferred_elements.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time view of [`ConcurrentDeque`](crate::deque::ConcurrentDeque)
/// activity.
///
/// # Examples
///
/// ```rust
/// use threadkit::deque::ConcurrentArrayDeque;
///
/// let deque = ConcurrentArrayDeque::new();
/// deque.enqueue(1);
/// deque.dequeue();
///
/// let metrics = deque.metrics();
/// assert_eq!(metrics.transfers, 1);
/// assert_eq!(metrics.transferred_elements, 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DequeMetrics {
    /// Number of two-buffer transfers performed by `dequeue`.
    pub transfers: u64,
    /// Total elements moved from the write buffer to the read buffer.
    pub transferred_elements: u64,
}

impl DequeMetrics {
    /// Average number of elements moved per transfer.
    pub fn avg_transfer_size(&self) -> f64 {
        if self.transfers == 0 {
            0.0
        } else {
            self.transferred_elements as f64 / self.transfers as f64
        }
    }
}

/// Internal counters for [`WorkerPool`](crate::pool::WorkerPool).
#[derive(Debug, Default)]
pub(crate) struct PoolCounters {
    pub(crate) submitted: AtomicU64,
    pub(crate) rejected: AtomicU64,
    pub(crate) completed: AtomicU64,
}

impl PoolCounters {
    pub(crate) fn snapshot(&self) -> PoolMetrics {
        PoolMetrics {
            submitted: self.submitted.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            completed: self.completed.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time view of [`WorkerPool`](crate::pool::WorkerPool) activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolMetrics {
    /// Tasks accepted onto the queue.
    pub submitted: u64,
    /// Submissions rejected because the queue was full or the pool closed.
    pub rejected: u64,
    /// Tasks that ran to completion.
    pub completed: u64,
}

impl PoolMetrics {
    /// Tasks accepted but not yet completed at snapshot time.
    pub fn in_flight(&self) -> u64 {
        self.submitted.saturating_sub(self.completed)
    }

    /// Fraction of submission attempts that were rejected.
    pub fn rejection_rate(&self) -> f64 {
        let attempts = self.submitted + self.rejected;
        if attempts == 0 {
            0.0
        } else {
            self.rejected as f64 / attempts as f64
        }
    }
}
