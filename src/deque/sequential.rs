//! Sequential deque backings
//!
//! The [`Deque`] trait is the capability interface the concurrent layer
//! consumes: a double-ended queue that exposes both stack ends (`push`,
//! `pop`, `peek`) and queue ends (`enqueue`, `dequeue`, `front`, `back`)
//! over the same underlying sequence. Two interchangeable backings are
//! provided: [`ArrayDeque`] over a contiguous ring buffer and
//! [`LinkedDeque`] over linked nodes.
//!
//! Both ends share one sequence: `push` and `enqueue` append at the back,
//! `pop` removes from the back, `dequeue` removes from the front. These
//! types are single-threaded; wrap them in
//! [`ConcurrentDeque`](super::ConcurrentDeque) for shared use.

use std::collections::{LinkedList, VecDeque};

/// The capability interface for a double-ended queue.
///
/// Absence (empty structure, value not found) is signaled with `Option`
/// or `bool`; no operation returns an error.
pub trait Deque<T> {
    /// Add an element to the top of the stack (the back of the sequence).
    fn push(&mut self, value: T);

    /// Remove and return the top element, or `None` when empty.
    fn pop(&mut self) -> Option<T>;

    /// View the top element without removing it.
    fn peek(&self) -> Option<&T>;

    /// Alias for [`peek`](Deque::peek), for stack-flavored call sites.
    fn top(&self) -> Option<&T> {
        self.peek()
    }

    /// Add an element to the back of the queue.
    fn enqueue(&mut self, value: T);

    /// Remove and return the front element, or `None` when empty.
    fn dequeue(&mut self) -> Option<T>;

    /// View the front element without removing it.
    fn front(&self) -> Option<&T>;

    /// View the back element without removing it.
    fn back(&self) -> Option<&T>;

    /// Number of elements in the deque.
    fn len(&self) -> usize;

    /// Whether the deque holds no elements.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove all elements.
    fn clear(&mut self);

    /// Reverse the sequence in place.
    fn reverse(&mut self);

    /// Remove and return all elements in front-to-back order.
    fn drain(&mut self) -> Vec<T>;

    /// Whether the value exists in the deque.
    fn contains(&self, value: &T) -> bool
    where
        T: PartialEq;

    /// Index of the first occurrence of the value, front to back.
    fn index_of(&self, value: &T) -> Option<usize>
    where
        T: PartialEq;

    /// Remove the first occurrence of the value. Returns whether an
    /// element was removed.
    fn remove(&mut self, value: &T) -> bool
    where
        T: PartialEq;

    /// Remove and return the element at the given index, or `None` when
    /// out of bounds.
    fn remove_at(&mut self, index: usize) -> Option<T>;

    /// A defensive copy of the contents in front-to-back order. The
    /// returned vector never aliases internal storage.
    fn to_vec(&self) -> Vec<T>
    where
        T: Clone;
}

/// A deque backed by a contiguous ring buffer.
///
/// # Examples
///
/// ```rust
/// use threadkit::deque::{ArrayDeque, Deque};
///
/// let mut deque = ArrayDeque::new();
/// deque.enqueue(1);
/// deque.enqueue(2);
/// deque.push(3);
///
/// assert_eq!(deque.front(), Some(&1));
/// assert_eq!(deque.pop(), Some(3));
/// assert_eq!(deque.dequeue(), Some(1));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ArrayDeque<T> {
    data: VecDeque<T>,
}

impl<T> ArrayDeque<T> {
    /// Create a new, empty deque.
    pub fn new() -> Self {
        Self {
            data: VecDeque::new(),
        }
    }

    /// Create a deque with room for `capacity` elements before
    /// reallocating.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: VecDeque::with_capacity(capacity),
        }
    }
}

impl<T> Deque<T> for ArrayDeque<T> {
    fn push(&mut self, value: T) {
        self.data.push_back(value);
    }

    fn pop(&mut self) -> Option<T> {
        self.data.pop_back()
    }

    fn peek(&self) -> Option<&T> {
        self.data.back()
    }

    fn enqueue(&mut self, value: T) {
        self.data.push_back(value);
    }

    fn dequeue(&mut self) -> Option<T> {
        self.data.pop_front()
    }

    fn front(&self) -> Option<&T> {
        self.data.front()
    }

    fn back(&self) -> Option<&T> {
        self.data.back()
    }

    fn len(&self) -> usize {
        self.data.len()
    }

    fn clear(&mut self) {
        self.data.clear();
    }

    fn reverse(&mut self) {
        self.data.make_contiguous().reverse();
    }

    fn drain(&mut self) -> Vec<T> {
        self.data.drain(..).collect()
    }

    fn contains(&self, value: &T) -> bool
    where
        T: PartialEq,
    {
        self.data.contains(value)
    }

    fn index_of(&self, value: &T) -> Option<usize>
    where
        T: PartialEq,
    {
        self.data.iter().position(|v| v == value)
    }

    fn remove(&mut self, value: &T) -> bool
    where
        T: PartialEq,
    {
        match self.index_of(value) {
            Some(index) => {
                self.data.remove(index);
                true
            }
            None => false,
        }
    }

    fn remove_at(&mut self, index: usize) -> Option<T> {
        self.data.remove(index)
    }

    fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.data.iter().cloned().collect()
    }
}

impl<T> FromIterator<T> for ArrayDeque<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            data: iter.into_iter().collect(),
        }
    }
}

/// A deque backed by linked nodes.
///
/// Trades the ring buffer's cache locality for stable per-node allocation;
/// useful when elements are large or reallocation spikes matter.
///
/// # Examples
///
/// ```rust
/// use threadkit::deque::{Deque, LinkedDeque};
///
/// let mut deque = LinkedDeque::new();
/// deque.push("a");
/// deque.push("b");
/// assert_eq!(deque.peek(), Some(&"b"));
/// assert_eq!(deque.dequeue(), Some("a"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct LinkedDeque<T> {
    data: LinkedList<T>,
}

impl<T> LinkedDeque<T> {
    /// Create a new, empty deque.
    pub fn new() -> Self {
        Self {
            data: LinkedList::new(),
        }
    }
}

impl<T> Deque<T> for LinkedDeque<T> {
    fn push(&mut self, value: T) {
        self.data.push_back(value);
    }

    fn pop(&mut self) -> Option<T> {
        self.data.pop_back()
    }

    fn peek(&self) -> Option<&T> {
        self.data.back()
    }

    fn enqueue(&mut self, value: T) {
        self.data.push_back(value);
    }

    fn dequeue(&mut self) -> Option<T> {
        self.data.pop_front()
    }

    fn front(&self) -> Option<&T> {
        self.data.front()
    }

    fn back(&self) -> Option<&T> {
        self.data.back()
    }

    fn len(&self) -> usize {
        self.data.len()
    }

    fn clear(&mut self) {
        self.data.clear();
    }

    fn reverse(&mut self) {
        let mut reversed = LinkedList::new();
        while let Some(value) = self.data.pop_front() {
            reversed.push_front(value);
        }
        self.data = reversed;
    }

    fn drain(&mut self) -> Vec<T> {
        let mut values = Vec::with_capacity(self.data.len());
        while let Some(value) = self.data.pop_front() {
            values.push(value);
        }
        values
    }

    fn contains(&self, value: &T) -> bool
    where
        T: PartialEq,
    {
        self.data.contains(value)
    }

    fn index_of(&self, value: &T) -> Option<usize>
    where
        T: PartialEq,
    {
        self.data.iter().position(|v| v == value)
    }

    fn remove(&mut self, value: &T) -> bool
    where
        T: PartialEq,
    {
        match self.index_of(value) {
            Some(index) => {
                self.remove_at(index);
                true
            }
            None => false,
        }
    }

    fn remove_at(&mut self, index: usize) -> Option<T> {
        if index >= self.data.len() {
            return None;
        }
        let mut tail = self.data.split_off(index);
        let value = tail.pop_front();
        self.data.append(&mut tail);
        value
    }

    fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.data.iter().cloned().collect()
    }
}

impl<T> FromIterator<T> for LinkedDeque<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            data: iter.into_iter().collect(),
        }
    }
}
