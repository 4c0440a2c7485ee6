//! Deque implementations
//!
//! This module provides the sequential deque capability interface, two
//! interchangeable single-threaded backings, and the lock-partitioned
//! [`ConcurrentDeque`] built on top of them.
//!
//! ## Available Deques
//!
//! - [`ArrayDeque`]: contiguous ring buffer backing
//! - [`LinkedDeque`]: linked-node backing
//! - [`ConcurrentDeque`]: thread-safe wrapper over any [`Deque`] backing,
//!   partitioned across two locks
//!
//! ## Choosing a Backing
//!
//! The two backings are behaviorally identical under the [`Deque`] trait.
//! [`ArrayDeque`] is the default and nearly always faster; [`LinkedDeque`]
//! avoids reallocation spikes when elements are large.
//!
//! ## Examples
//!
//! ```rust
//! use threadkit::deque::{ConcurrentArrayDeque, ConcurrentLinkedDeque};
//!
//! let deque = ConcurrentArrayDeque::new();
//! deque.push(1);
//! deque.enqueue(2);
//! assert_eq!(deque.len(), 2);
//!
//! let linked: ConcurrentLinkedDeque<&str> = ConcurrentLinkedDeque::new();
//! linked.enqueue("same contract, different backing");
//! assert_eq!(linked.dequeue(), Some("same contract, different backing"));
//! ```

mod concurrent;
mod sequential;

pub use concurrent::{ConcurrentArrayDeque, ConcurrentDeque, ConcurrentLinkedDeque};
pub use sequential::{ArrayDeque, Deque, LinkedDeque};


#[cfg(test)]
mod proptests;
