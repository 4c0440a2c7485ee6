//! Lock-Partitioned Concurrent Deque
//!
//! [`ConcurrentDeque`] splits storage across two independently locked
//! sequential deques so that inserting and removing elements can proceed
//! concurrently with only occasional full-structure contention:
//!
//! - the **in** buffer receives every `push`/`enqueue`
//! - the **out** buffer serves `dequeue` once populated
//!
//! ## Two-Buffer Transfer
//!
//! When `dequeue` finds the out buffer empty it drains the entire in
//! buffer, in order, into the out buffer and retries. Each element is
//! moved at most once between its insertion and its removal, so the
//! transfer cost is amortized O(1) per element.
//!
//! ## Lock Ordering
//!
//! Operations that span both buffers (`len`, `is_empty`, `clear`,
//! `reverse`) always acquire the in lock before the out lock. That fixed
//! order is the single deadlock-avoidance invariant of the whole toolkit
//! and must never be taken in reverse.
//!
//! ## Example
//!
//! ```rust
//! use threadkit::deque::ConcurrentArrayDeque;
//! use std::sync::Arc;
//! use std::thread;
//!
//! let deque = Arc::new(ConcurrentArrayDeque::new());
//!
//! let producer = thread::spawn({
//!     let deque = Arc::clone(&deque);
//!     move || {
//!         for i in 0..100 {
//!             deque.enqueue(i);
//!         }
//!     }
//! });
//!
//! let consumer = thread::spawn({
//!     let deque = Arc::clone(&deque);
//!     move || {
//!         let mut received = 0;
//!         while received < 100 {
//!             if deque.dequeue().is_some() {
//!                 received += 1;
//!             } else {
//!                 thread::yield_now();
//!             }
//!         }
//!     }
//! });
//!
//! producer.join().unwrap();
//! consumer.join().unwrap();
//! assert!(deque.is_empty());
//! ```

use super::sequential::{ArrayDeque, Deque, LinkedDeque};
use crate::metrics::{DequeCounters, DequeMetrics};
use parking_lot::RwLock;

/// A thread-safe deque partitioned across two independently locked
/// sequential buffers.
///
/// Every [`Deque`] operation is available through `&self`. An operation
/// touching a single buffer is linearizable with respect to other
/// operations on that buffer; operations that take both locks (in the
/// fixed in-then-out order) are atomic with respect to everything else.
/// `contains` and `remove` check the two buffers sequentially, so a value
/// migrating between buffers during the check can be missed. That narrow
/// race is accepted; callers needing an atomic view should use
/// [`to_vec`](ConcurrentDeque::to_vec).
///
/// The backing is any [`Deque`] implementation; see
/// [`ConcurrentArrayDeque`] and [`ConcurrentLinkedDeque`] for the two
/// provided aliases.
#[derive(Debug)]
pub struct ConcurrentDeque<T, D = ArrayDeque<T>>
where
    D: Deque<T>,
{
    in_buf: RwLock<D>,
    out_buf: RwLock<D>,
    counters: DequeCounters,
    _marker: std::marker::PhantomData<fn() -> T>,
}

/// [`ConcurrentDeque`] backed by the contiguous [`ArrayDeque`].
pub type ConcurrentArrayDeque<T> = ConcurrentDeque<T, ArrayDeque<T>>;

/// [`ConcurrentDeque`] backed by the node-based [`LinkedDeque`].
pub type ConcurrentLinkedDeque<T> = ConcurrentDeque<T, LinkedDeque<T>>;

impl<T, D> ConcurrentDeque<T, D>
where
    D: Deque<T> + Default,
{
    /// Create an empty deque with default-constructed backings.
    pub fn new() -> Self {
        Self::with_backing(D::default(), D::default())
    }
}

impl<T, D> Default for ConcurrentDeque<T, D>
where
    D: Deque<T> + Default,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, D> ConcurrentDeque<T, D>
where
    D: Deque<T>,
{
    /// Create a deque from explicit in/out backings.
    ///
    /// The logical sequence is the out buffer's contents followed by the
    /// in buffer's contents.
    pub fn with_backing(in_buf: D, out_buf: D) -> Self {
        Self {
            in_buf: RwLock::new(in_buf),
            out_buf: RwLock::new(out_buf),
            counters: DequeCounters::default(),
            _marker: std::marker::PhantomData,
        }
    }

    /// Add an element to the top of the stack.
    ///
    /// Always lands in the in buffer, so pushes never contend with
    /// readers draining the out buffer.
    pub fn push(&self, value: T) {
        self.in_buf.write().push(value);
    }

    /// Remove and return the most recently pushed element.
    ///
    /// Tries the in buffer first (newest writes land there), then the
    /// out buffer. No transfer occurs; stack reads always drain the
    /// write side first.
    pub fn pop(&self) -> Option<T> {
        if let Some(value) = self.in_buf.write().pop() {
            return Some(value);
        }
        self.out_buf.write().pop()
    }

    /// View the top element without removing it.
    pub fn peek(&self) -> Option<T>
    where
        T: Clone,
    {
        if let Some(value) = self.in_buf.read().peek() {
            return Some(value.clone());
        }
        self.out_buf.read().peek().cloned()
    }

    /// Alias for [`peek`](ConcurrentDeque::peek).
    pub fn top(&self) -> Option<T>
    where
        T: Clone,
    {
        self.peek()
    }

    /// Add an element to the back of the queue.
    pub fn enqueue(&self, value: T) {
        self.in_buf.write().enqueue(value);
    }

    /// Remove and return the front element.
    ///
    /// Serves from the out buffer; when it is empty, performs the
    /// two-buffer transfer and retries once.
    pub fn dequeue(&self) -> Option<T> {
        if let Some(value) = self.out_buf.write().dequeue() {
            return Some(value);
        }
        self.transfer();
        self.out_buf.write().dequeue()
    }

    /// Move the entire in buffer into the out buffer, preserving order.
    ///
    /// The in lock is released before the out lock is taken, so writers
    /// are only briefly blocked while the snapshot is drained.
    fn transfer(&self) {
        let elements = self.in_buf.write().drain();
        if elements.is_empty() {
            return;
        }
        self.counters.record_transfer(elements.len());

        let mut out = self.out_buf.write();
        for value in elements {
            out.enqueue(value);
        }
    }

    /// View the front element of the queue.
    ///
    /// Prefers the out buffer, where the oldest elements live.
    pub fn front(&self) -> Option<T>
    where
        T: Clone,
    {
        if let Some(value) = self.out_buf.read().front() {
            return Some(value.clone());
        }
        self.in_buf.read().front().cloned()
    }

    /// View the back element of the queue.
    ///
    /// Prefers the in buffer, where the newest elements land.
    pub fn back(&self) -> Option<T>
    where
        T: Clone,
    {
        if let Some(value) = self.in_buf.read().back() {
            return Some(value.clone());
        }
        self.out_buf.read().back().cloned()
    }

    /// Whether the deque holds no elements.
    ///
    /// Takes both locks in the fixed order for a consistent answer.
    pub fn is_empty(&self) -> bool {
        let in_buf = self.in_buf.read();
        let out_buf = self.out_buf.read();
        in_buf.is_empty() && out_buf.is_empty()
    }

    /// Total number of elements across both buffers.
    pub fn len(&self) -> usize {
        let in_buf = self.in_buf.read();
        let out_buf = self.out_buf.read();
        in_buf.len() + out_buf.len()
    }

    /// Remove all elements from both buffers atomically.
    pub fn clear(&self) {
        let mut in_buf = self.in_buf.write();
        let mut out_buf = self.out_buf.write();
        in_buf.clear();
        out_buf.clear();
    }

    /// Reverse the logical sequence as one consistent view.
    ///
    /// Holds both write locks (in before out), drains the in buffer into
    /// the out buffer, then reverses the out buffer in place.
    pub fn reverse(&self) {
        let mut in_buf = self.in_buf.write();
        let mut out_buf = self.out_buf.write();

        for value in in_buf.drain() {
            out_buf.enqueue(value);
        }
        out_buf.reverse();
    }

    /// Whether the value exists in the deque.
    ///
    /// Checks the in buffer, then the out buffer, each under its own
    /// lock. Not atomic across the pair.
    pub fn contains(&self, value: &T) -> bool
    where
        T: PartialEq,
    {
        if self.in_buf.read().contains(value) {
            return true;
        }
        self.out_buf.read().contains(value)
    }

    /// Remove one occurrence of the value, checking the in buffer and
    /// then the out buffer. Returns whether an element was removed.
    pub fn remove(&self, value: &T) -> bool
    where
        T: PartialEq,
    {
        if self.in_buf.write().remove(value) {
            return true;
        }
        self.out_buf.write().remove(value)
    }

    /// A snapshot of all elements in logical front-to-back order: the
    /// out buffer's contents followed by the in buffer's contents.
    ///
    /// The two buffers are snapshotted sequentially, so the copy is
    /// consistent per buffer but not across a concurrent transfer.
    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        let in_snapshot = self.in_buf.read().to_vec();
        let mut combined = self.out_buf.read().to_vec();
        combined.extend(in_snapshot);
        combined
    }

    /// Counters describing transfer activity since construction.
    pub fn metrics(&self) -> DequeMetrics {
        self.counters.snapshot()
    }
}
