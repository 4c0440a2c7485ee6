//! Cooperative cancellation tokens
//!
//! A [`CancelToken`] is the shared cancellation signal consumed by every
//! primitive in the toolkit. It supports exactly three capabilities:
//! fire now, ask whether it has fired, and block until it fires. The
//! receiver returned by [`CancelToken::done`] plugs into
//! `crossbeam_channel::select!` so worker loops can wait on a task channel
//! and cancellation simultaneously.
//!
//! Cancellation is cooperative and non-preemptive: firing a token never
//! interrupts running code. Only the next explicit check point (a `select!`
//! arm, an `is_fired` call, the start of a future) observes it.
//!
//! ## Example
//!
//! ```rust
//! use threadkit::cancel::CancelToken;
//! use std::thread;
//!
//! let token = CancelToken::new();
//! let waiter = thread::spawn({
//!     let token = token.clone();
//!     move || token.wait()
//! });
//!
//! token.fire();
//! waiter.join().unwrap();
//! assert!(token.is_fired());
//! ```

use crossbeam_channel::{bounded, Receiver, Sender};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// A message type with no values. The cancellation channel never carries
/// data; it signals purely by disconnecting.
#[derive(Debug)]
pub enum Never {}

#[derive(Debug)]
struct TokenInner {
    fired: AtomicBool,
    // Dropping the sender disconnects the channel, waking every receiver.
    sender: Mutex<Option<Sender<Never>>>,
    receiver: Receiver<Never>,
}

/// A cloneable, shareable cancellation signal.
///
/// All clones observe the same underlying state: firing any clone fires
/// them all, and firing is idempotent. The token starts unfired.
///
/// # Select Integration
///
/// [`done`](CancelToken::done) exposes a `crossbeam_channel::Receiver`
/// that becomes ready (disconnected) the moment the token fires:
///
/// ```rust
/// use crossbeam_channel::{select, unbounded};
/// use threadkit::cancel::CancelToken;
///
/// let token = CancelToken::new();
/// let (tx, rx) = unbounded::<u32>();
/// tx.send(7).unwrap();
///
/// select! {
///     recv(token.done()) -> _ => unreachable!("token has not fired"),
///     recv(rx) -> value => assert_eq!(value.unwrap(), 7),
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CancelToken {
    inner: Arc<TokenInner>,
}

impl CancelToken {
    /// Create a new, unfired token.
    pub fn new() -> Self {
        let (sender, receiver) = bounded::<Never>(0);
        Self {
            inner: Arc::new(TokenInner {
                fired: AtomicBool::new(false),
                sender: Mutex::new(Some(sender)),
                receiver,
            }),
        }
    }

    /// Create a token that is already fired.
    ///
    /// Useful for testing the cancellation paths of consumers.
    pub fn fired() -> Self {
        let token = Self::new();
        token.fire();
        token
    }

    /// Fire the token, waking every waiter. Idempotent.
    pub fn fire(&self) {
        self.inner.fired.store(true, Ordering::SeqCst);
        // Taking the sender out drops it, disconnecting the channel.
        self.inner.sender.lock().take();
    }

    /// Whether the token has fired.
    #[inline]
    pub fn is_fired(&self) -> bool {
        self.inner.fired.load(Ordering::SeqCst)
    }

    /// Block the calling thread until the token fires.
    ///
    /// Returns immediately if the token has already fired.
    pub fn wait(&self) {
        // The channel never carries messages; recv returns only on
        // disconnection, which is exactly the fire event.
        let _ = self.inner.receiver.recv();
    }

    /// A receiver that becomes ready when the token fires, for use in
    /// `crossbeam_channel::select!` arms.
    #[inline]
    pub fn done(&self) -> &Receiver<Never> {
        &self.inner.receiver
    }

    /// Fire the token after the given delay, from a background thread.
    ///
    /// This is how deadlines are layered onto the cancellation signal;
    /// the toolkit itself imposes no default timeout.
    pub fn fire_after(&self, delay: Duration) {
        let token = self.clone();
        std::thread::spawn(move || {
            std::thread::sleep(delay);
            token.fire();
        });
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_new_token_is_unfired() {
        let token = CancelToken::new();
        assert!(!token.is_fired());
    }

    #[test]
    fn test_fire_is_idempotent() {
        let token = CancelToken::new();
        token.fire();
        token.fire();
        assert!(token.is_fired());
    }

    #[test]
    fn test_fired_constructor() {
        let token = CancelToken::fired();
        assert!(token.is_fired());
        // wait must not block on an already-fired token
        token.wait();
    }

    #[test]
    fn test_clones_share_state() {
        let token = CancelToken::new();
        let clone = token.clone();
        clone.fire();
        assert!(token.is_fired());
    }

    #[test]
    fn test_wait_wakes_all_waiters() {
        let token = CancelToken::new();
        let mut handles = vec![];

        for _ in 0..4 {
            let token = token.clone();
            handles.push(thread::spawn(move || {
                token.wait();
                assert!(token.is_fired());
            }));
        }

        token.fire();
        for handle in handles {
            handle.join().unwrap();
        }
    }

    #[test]
    fn test_done_selects_after_fire() {
        use crossbeam_channel::select;

        let token = CancelToken::fired();
        select! {
            recv(token.done()) -> _ => {}
            default => panic!("fired token must be selectable"),
        }
    }

    #[test]
    fn test_fire_after_deadline() {
        let token = CancelToken::new();
        token.fire_after(Duration::from_millis(20));
        assert!(!token.is_fired());
        token.wait();
        assert!(token.is_fired());
    }
}
