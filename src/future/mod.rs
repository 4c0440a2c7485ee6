//! One-shot asynchronous result cells
//!
//! A [`Future`] wraps a single unit of work running on its own thread and
//! lets any number of callers block for its terminal value. The terminal
//! state is write-once: `completed` with the work's result, `canceled`
//! with [`Error::Canceled`], or [`Error::Task`] when the work function
//! panics before producing a result.
//!
//! Cancellation follows the toolkit-wide cooperative discipline: the
//! wrapper checks the token once, immediately before invoking the work
//! function. A token that fires during execution does not interrupt the
//! work; the function itself must observe the token to stop early. A
//! cancellation racing exactly with the start of execution may let the
//! work run to completion anyway.
//!
//! ## Example
//!
//! ```rust
//! use threadkit::future::Future;
//!
//! let future = Future::spawn(|| Ok(21 * 2));
//! assert_eq!(future.get(), Ok(42));
//! // get is idempotent; every caller observes the same value.
//! assert_eq!(future.get(), Ok(42));
//! ```

use crate::cancel::CancelToken;
use crate::{Error, Result};
use crossbeam_channel::{bounded, select, Receiver, TryRecvError};
use parking_lot::Mutex;
use std::sync::Arc;
use std::thread;

use crate::cancel::Never;

#[derive(Debug)]
struct FutureInner<T> {
    // Write-once terminal state. A mutex rather than a once-cell keeps
    // the handle usable for any `T: Send`, without requiring `Sync`.
    result: Mutex<Option<Result<T>>>,
    // Disconnects when the worker thread finishes, waking all getters.
    done: Receiver<Never>,
    token: Option<CancelToken>,
}

/// A handle to an asynchronously computed result.
///
/// Cloning the handle is cheap; all clones observe the same terminal
/// state. [`get`](Future::get) can be called repeatedly and from many
/// threads.
#[derive(Debug, Clone)]
pub struct Future<T> {
    inner: Arc<FutureInner<T>>,
}

impl<T: Send + 'static> Future<T> {
    /// Start `work` on its own thread and return a handle immediately.
    pub fn spawn<F>(work: F) -> Self
    where
        F: FnOnce() -> Result<T> + Send + 'static,
    {
        Self::start(None, work)
    }

    /// Start `work` with a cancellation token.
    ///
    /// The token is checked once before `work` runs: if it has already
    /// fired, `work` is never invoked and the future completes with
    /// [`Error::Canceled`]. If the token fires later, `work` keeps
    /// running but [`get`](Future::get) stops blocking on it.
    pub fn spawn_with_token<F>(token: &CancelToken, work: F) -> Self
    where
        F: FnOnce() -> Result<T> + Send + 'static,
    {
        Self::start(Some(token.clone()), work)
    }

    fn start<F>(token: Option<CancelToken>, work: F) -> Self
    where
        F: FnOnce() -> Result<T> + Send + 'static,
    {
        let (done_tx, done_rx) = bounded::<Never>(0);
        let inner = Arc::new(FutureInner {
            result: Mutex::new(None),
            done: done_rx,
            token,
        });

        let runner = Arc::clone(&inner);
        thread::spawn(move || {
            // Moving the sender in ties channel disconnection to thread
            // exit, even if work panics.
            let _done = done_tx;

            // Canceled before start: the work function never runs.
            let outcome = match &runner.token {
                Some(token) if token.is_fired() => Err(Error::Canceled),
                _ => work(),
            };
            *runner.result.lock() = Some(outcome);
        });

        Self { inner }
    }

    /// Block until the work completes or the token (if any) fires.
    ///
    /// Every caller observes the same terminal value. When the token
    /// fires mid-run, `get` returns [`Error::Canceled`] while the work
    /// continues in the background; a result that has already been
    /// written wins over a later cancellation. A work function that
    /// panics yields [`Error::Task`], distinct from cancellation.
    pub fn get(&self) -> Result<T>
    where
        T: Clone,
    {
        match &self.inner.token {
            Some(token) => {
                select! {
                    recv(self.inner.done) -> _ => {}
                    recv(token.done()) -> _ => {}
                }
            }
            None => {
                let _ = self.inner.done.recv();
            }
        }

        if let Some(outcome) = self.inner.result.lock().as_ref() {
            return outcome.clone();
        }

        // No terminal value was written. Distinguish a worker thread that
        // died mid-run (panicking work) from a token firing while the
        // work is still going.
        let worker_exited = matches!(self.inner.done.try_recv(), Err(TryRecvError::Disconnected));
        let token_fired = self.inner.token.as_ref().map_or(false, CancelToken::is_fired);
        if worker_exited && !token_fired {
            Err(Error::Task("work function terminated without a result".to_string()))
        } else {
            Err(Error::Canceled)
        }
    }

    /// Non-blocking probe of the terminal state.
    ///
    /// Returns `None` while the work is still running.
    pub fn try_get(&self) -> Option<Result<T>>
    where
        T: Clone,
    {
        self.inner.result.lock().clone()
    }

    /// Whether the future has reached a terminal state.
    pub fn is_done(&self) -> bool {
        self.inner.result.lock().is_some()
    }
}
