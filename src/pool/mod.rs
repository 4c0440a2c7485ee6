//! Resizable worker pool
//!
//! A [`WorkerPool`] executes submitted tasks on a bounded queue serviced by
//! a dynamically resizable set of worker threads.
//!
//! ## Design
//!
//! - **Submission never blocks**: a full queue rejects with
//!   [`Error::QueueFull`], a closed pool with [`Error::PoolClosed`]. The
//!   closed-flag check and the enqueue happen under one lock, so a submit
//!   racing with `close` can never send into a closed channel.
//! - **Resizing**: growing spawns new worker loops; shrinking sends
//!   retirement signals consumed opportunistically by whichever workers
//!   observe them first. The specific threads that exit are unspecified.
//! - **Graceful shutdown**: [`close`](WorkerPool::close) stops accepting
//!   work, lets the queue drain, and blocks until every accepted task has
//!   completed. [`close_immediately`](WorkerPool::close_immediately) fires
//!   the pool's cancellation token instead; queued, unstarted tasks are
//!   abandoned while a task already executing runs to completion.
//!
//! ## Worker Loop
//!
//! Each worker repeatedly selects among three events: cancellation fired
//! (exit), retirement signaled (exit), or a task available (run it to
//! completion, then loop). Cancellation is checked again at the loop top
//! so it wins over queued work after `close_immediately`.
//!
//! ## Example
//!
//! ```rust
//! use threadkit::pool::WorkerPool;
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! let pool = WorkerPool::new(4, 64);
//! let counter = Arc::new(AtomicUsize::new(0));
//!
//! for _ in 0..10 {
//!     let counter = Arc::clone(&counter);
//!     pool.submit(move || {
//!         counter.fetch_add(1, Ordering::SeqCst);
//!     }).unwrap();
//! }
//!
//! pool.close();
//! assert_eq!(counter.load(Ordering::SeqCst), 10);
//! ```

use crate::cancel::CancelToken;
use crate::metrics::{PoolCounters, PoolMetrics};
use crate::{Error, Result};
use crossbeam_channel::{bounded, select, unbounded, Receiver, Sender, TrySendError};
use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::thread;

/// A unit of work executed by the pool. Tasks carry no return value or
/// error channel; pair the pool with [`Future`](crate::future::Future) or
/// [`concurrent_map`](crate::flow::concurrent_map) when a result is needed.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Bookkeeping guarded by one lock so submit, resize, and close observe a
/// consistent view of the pool lifecycle.
#[derive(Debug)]
struct PoolState {
    /// Present while the pool accepts work; dropped on close so the task
    /// channel disconnects once drained.
    task_tx: Option<Sender<Task>>,
    /// Live worker count as adjusted by resize.
    workers: usize,
    closed: bool,
}

#[derive(Debug)]
struct PoolInner {
    state: Mutex<PoolState>,
    task_rx: Receiver<Task>,
    retire_tx: Sender<()>,
    retire_rx: Receiver<()>,
    token: CancelToken,
    /// Tasks accepted but not yet finished. Guarded by its own mutex so
    /// close can wait on the condvar without holding the state lock.
    in_flight: Mutex<usize>,
    all_done: Condvar,
    counters: PoolCounters,
}

impl PoolInner {
    fn add_in_flight(&self) {
        *self.in_flight.lock() += 1;
    }

    fn finish_in_flight(&self) {
        let mut in_flight = self.in_flight.lock();
        *in_flight -= 1;
        if *in_flight == 0 {
            self.all_done.notify_all();
        }
    }
}

/// A bounded task queue serviced by a resizable set of worker threads.
///
/// The pool lifecycle is `open -> (submit | resize)* -> closing -> closed`.
/// Once closed, submissions and resizes fail with [`Error::PoolClosed`];
/// closing is idempotent.
#[derive(Debug)]
pub struct WorkerPool {
    inner: Arc<PoolInner>,
}

impl WorkerPool {
    /// Create a pool with `workers` worker threads and a task queue
    /// holding at most `queue_capacity` pending tasks.
    ///
    /// # Panics
    ///
    /// Panics if `workers` is zero.
    pub fn new(workers: usize, queue_capacity: usize) -> Self {
        assert!(workers > 0, "worker pool requires at least one worker");

        let (task_tx, task_rx) = bounded::<Task>(queue_capacity);
        let (retire_tx, retire_rx) = unbounded::<()>();

        let inner = Arc::new(PoolInner {
            state: Mutex::new(PoolState {
                task_tx: Some(task_tx),
                workers,
                closed: false,
            }),
            task_rx,
            retire_tx,
            retire_rx,
            token: CancelToken::new(),
            in_flight: Mutex::new(0),
            all_done: Condvar::new(),
            counters: PoolCounters::default(),
        });

        for id in 0..workers {
            spawn_worker(Arc::clone(&inner), id);
        }

        Self { inner }
    }

    /// Submit a task for execution. Never blocks.
    ///
    /// # Errors
    ///
    /// - [`Error::PoolClosed`] if the pool has been closed.
    /// - [`Error::QueueFull`] if the bounded queue is at capacity; the
    ///   caller may retry later or report back-pressure upstream.
    pub fn submit<F>(&self, task: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        // Hold the state lock across the closed check and the try-send so
        // close cannot drop the sender in between.
        let state = self.inner.state.lock();
        let Some(task_tx) = state.task_tx.as_ref() else {
            self.inner.counters.rejected.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
            return Err(Error::PoolClosed);
        };

        self.inner.add_in_flight();
        match task_tx.try_send(Box::new(task)) {
            Ok(()) => {
                self.inner
                    .counters
                    .submitted
                    .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
                Ok(())
            }
            Err(TrySendError::Full(_)) => {
                self.inner.finish_in_flight();
                self.inner
                    .counters
                    .rejected
                    .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
                Err(Error::QueueFull)
            }
            Err(TrySendError::Disconnected(_)) => {
                // Unreachable while the state lock pins the sender alive,
                // but surfaced as a closed pool rather than a panic.
                self.inner.finish_in_flight();
                Err(Error::PoolClosed)
            }
        }
    }

    /// Change the number of worker threads to `n`.
    ///
    /// Growing spawns `n - current` new workers. Shrinking sends
    /// `current - n` retirement signals; any workers that observe one
    /// before (or instead of) a task exit after finishing their current
    /// task. Serialized by the state lock.
    ///
    /// # Panics
    ///
    /// Panics if `n` is zero, matching [`new`](WorkerPool::new). A pool
    /// with no workers could accept tasks that nothing will ever run,
    /// and a later `close` would wait on them forever.
    ///
    /// # Errors
    ///
    /// [`Error::PoolClosed`] if the pool has been closed.
    pub fn resize(&self, n: usize) -> Result<()> {
        assert!(n > 0, "worker pool requires at least one worker");

        let mut state = self.inner.state.lock();
        if state.closed {
            return Err(Error::PoolClosed);
        }

        if n > state.workers {
            for id in state.workers..n {
                spawn_worker(Arc::clone(&self.inner), id);
            }
        } else {
            for _ in n..state.workers {
                // The retire receiver outlives the pool, so send cannot
                // fail; ignore the result regardless.
                let _ = self.inner.retire_tx.send(());
            }
        }
        state.workers = n;
        Ok(())
    }

    /// Current worker count as tracked by resize bookkeeping.
    pub fn workers(&self) -> usize {
        self.inner.state.lock().workers
    }

    /// Whether the pool has been closed.
    pub fn is_closed(&self) -> bool {
        self.inner.state.lock().closed
    }

    /// Gracefully close the pool.
    ///
    /// Marks the pool closed, lets workers drain the queue, and blocks
    /// until every previously accepted task has completed. Idempotent:
    /// repeated calls (including after
    /// [`close_immediately`](WorkerPool::close_immediately)) return
    /// without waiting.
    pub fn close(&self) {
        if !self.mark_closed() {
            return;
        }
        log::debug!("worker pool closing, draining {} in-flight tasks", {
            *self.inner.in_flight.lock()
        });

        let mut in_flight = self.inner.in_flight.lock();
        while *in_flight > 0 {
            self.inner.all_done.wait(&mut in_flight);
        }
    }

    /// Close the pool without waiting for queued or in-flight work.
    ///
    /// Fires the pool's cancellation token so workers stop pulling new
    /// tasks at their next check. A task already executing runs to
    /// completion independently of this call; queued, unstarted tasks
    /// are abandoned.
    pub fn close_immediately(&self) {
        self.inner.token.fire();
        self.mark_closed();
    }

    /// Operation counters for this pool.
    pub fn metrics(&self) -> PoolMetrics {
        self.inner.counters.snapshot()
    }

    /// Flip the closed flag and drop the task sender. Returns whether
    /// this call performed the transition.
    fn mark_closed(&self) -> bool {
        let mut state = self.inner.state.lock();
        if state.closed {
            return false;
        }
        state.closed = true;
        state.task_tx = None;
        true
    }
}

fn spawn_worker(inner: Arc<PoolInner>, id: usize) {
    thread::Builder::new()
        .name(format!("threadkit-worker-{id}"))
        .spawn(move || worker_loop(&inner, id))
        // Spawning only fails when the OS is out of threads; the pool
        // cannot run without its workers.
        .unwrap_or_else(|e| panic!("failed to spawn worker thread: {e}"));
}

fn worker_loop(inner: &PoolInner, id: usize) {
    log::trace!("worker {id} starting");
    loop {
        // Cancellation wins over queued tasks after close_immediately.
        if inner.token.is_fired() {
            break;
        }
        // Honor a pending retirement before pulling more work.
        if inner.retire_rx.try_recv().is_ok() {
            log::trace!("worker {id} retiring");
            return;
        }

        select! {
            recv(inner.token.done()) -> _ => break,
            recv(inner.retire_rx) -> signal => {
                if signal.is_ok() {
                    log::trace!("worker {id} retiring");
                    return;
                }
            }
            recv(inner.task_rx) -> task => match task {
                Ok(task) => {
                    task();
                    inner
                        .counters
                        .completed
                        .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
                    inner.finish_in_flight();
                }
                // Channel closed and drained: graceful shutdown complete.
                Err(_) => break,
            },
        }
    }
    log::trace!("worker {id} exiting");
}

#[cfg(test)]
mod tests;
