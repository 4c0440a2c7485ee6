//! Integration tests for the worker pool

use super::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[test]
fn test_all_submitted_tasks_run_before_close_returns() {
    let pool = WorkerPool::new(4, 64);
    let counter = Arc::new(AtomicUsize::new(0));

    for _ in 0..50 {
        let counter = Arc::clone(&counter);
        pool.submit(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();
    }

    pool.close();
    assert_eq!(counter.load(Ordering::SeqCst), 50);
}

#[test]
fn test_tasks_run_exactly_once() {
    let pool = WorkerPool::new(8, 256);
    let runs: Vec<Arc<AtomicUsize>> = (0..100).map(|_| Arc::new(AtomicUsize::new(0))).collect();

    for run in &runs {
        let run = Arc::clone(run);
        pool.submit(move || {
            run.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();
    }

    pool.close();
    for run in &runs {
        assert_eq!(run.load(Ordering::SeqCst), 1);
    }
}

#[test]
fn test_submit_after_close_is_rejected() {
    let pool = WorkerPool::new(2, 8);
    pool.close();

    assert!(pool.is_closed());
    assert_eq!(pool.submit(|| {}), Err(Error::PoolClosed));
}

#[test]
fn test_queue_full_rejection_does_not_block() {
    // One worker pinned on a slow task; capacity one.
    let pool = WorkerPool::new(1, 1);
    let release = Arc::new(AtomicUsize::new(0));

    let gate = Arc::clone(&release);
    pool.submit(move || {
        while gate.load(Ordering::SeqCst) == 0 {
            thread::yield_now();
        }
    })
    .unwrap();

    // Give the worker time to pull the first task off the queue.
    thread::sleep(Duration::from_millis(50));

    // Fill the single queue slot, then overflow it.
    pool.submit(|| {}).unwrap();
    assert_eq!(pool.submit(|| {}), Err(Error::QueueFull));

    release.store(1, Ordering::SeqCst);
    pool.close();

    let metrics = pool.metrics();
    assert_eq!(metrics.submitted, 2);
    assert_eq!(metrics.completed, 2);
    assert_eq!(metrics.rejected, 1);
}

#[test]
fn test_close_is_idempotent() {
    let pool = WorkerPool::new(2, 8);
    pool.submit(|| {}).unwrap();
    pool.close();
    pool.close();
    assert!(pool.is_closed());
}

#[test]
fn test_resize_grows_while_tasks_in_flight() {
    let pool = WorkerPool::new(2, 256);
    let counter = Arc::new(AtomicUsize::new(0));

    for _ in 0..100 {
        let counter = Arc::clone(&counter);
        pool.submit(move || {
            thread::sleep(Duration::from_millis(1));
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();
    }

    pool.resize(10).unwrap();
    assert_eq!(pool.workers(), 10);

    pool.close();
    // Every originally queued task still completes exactly once.
    assert_eq!(counter.load(Ordering::SeqCst), 100);
}

#[test]
fn test_resize_shrinks_and_pool_keeps_working() {
    let pool = WorkerPool::new(8, 256);
    pool.resize(2).unwrap();
    assert_eq!(pool.workers(), 2);

    let counter = Arc::new(AtomicUsize::new(0));
    for _ in 0..50 {
        let counter = Arc::clone(&counter);
        pool.submit(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();
    }

    pool.close();
    assert_eq!(counter.load(Ordering::SeqCst), 50);
}

#[test]
fn test_resize_after_close_is_rejected() {
    let pool = WorkerPool::new(2, 8);
    pool.close();
    assert_eq!(pool.resize(4), Err(Error::PoolClosed));
}

#[test]
fn test_close_immediately_abandons_queued_tasks() {
    // Single worker held on a gate; everything behind it stays queued.
    let pool = WorkerPool::new(1, 64);
    let gate = Arc::new(AtomicUsize::new(0));
    let started = Arc::new(AtomicUsize::new(0));
    let abandoned_runs = Arc::new(AtomicUsize::new(0));

    {
        let gate = Arc::clone(&gate);
        let started = Arc::clone(&started);
        pool.submit(move || {
            started.store(1, Ordering::SeqCst);
            while gate.load(Ordering::SeqCst) == 0 {
                thread::yield_now();
            }
        })
        .unwrap();
    }
    while started.load(Ordering::SeqCst) == 0 {
        thread::yield_now();
    }

    for _ in 0..10 {
        let abandoned_runs = Arc::clone(&abandoned_runs);
        pool.submit(move || {
            abandoned_runs.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();
    }

    // Returns without waiting for the gated task or the queue.
    pool.close_immediately();
    assert!(pool.is_closed());
    assert_eq!(pool.submit(|| {}), Err(Error::PoolClosed));

    // The in-progress task still runs to completion once released.
    gate.store(1, Ordering::SeqCst);
    thread::sleep(Duration::from_millis(100));
    assert_eq!(abandoned_runs.load(Ordering::SeqCst), 0);
}

#[test]
fn test_concurrent_submitters_and_close() {
    let pool = Arc::new(WorkerPool::new(4, 1024));
    let accepted = Arc::new(AtomicUsize::new(0));
    let executed = Arc::new(AtomicUsize::new(0));

    let mut handles = vec![];
    for _ in 0..8 {
        let pool = Arc::clone(&pool);
        let accepted = Arc::clone(&accepted);
        let executed = Arc::clone(&executed);
        handles.push(thread::spawn(move || {
            for _ in 0..100 {
                let executed = Arc::clone(&executed);
                match pool.submit(move || {
                    executed.fetch_add(1, Ordering::SeqCst);
                }) {
                    Ok(()) => {
                        accepted.fetch_add(1, Ordering::SeqCst);
                    }
                    // Closed mid-loop or full queue: both are expected.
                    Err(Error::PoolClosed) | Err(Error::QueueFull) => {}
                    Err(other) => panic!("unexpected error: {other:?}"),
                }
            }
        }));
    }

    thread::sleep(Duration::from_millis(10));
    pool.close();
    for handle in handles {
        handle.join().unwrap();
    }

    // Every accepted task ran before close returned; none were lost.
    assert_eq!(accepted.load(Ordering::SeqCst), executed.load(Ordering::SeqCst));
}

#[test]
#[should_panic(expected = "at least one worker")]
fn test_resize_to_zero_is_rejected() {
    let pool = WorkerPool::new(2, 8);
    let _ = pool.resize(0);
}

#[test]
fn test_close_returns_after_shrink_to_minimum() {
    let pool = WorkerPool::new(4, 16);
    pool.resize(1).unwrap();

    let counter = Arc::new(AtomicUsize::new(0));
    for _ in 0..8 {
        let counter = Arc::clone(&counter);
        pool.submit(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();
    }

    // The single remaining worker drains the queue; close must not hang.
    pool.close();
    assert_eq!(counter.load(Ordering::SeqCst), 8);
}

#[test]
fn test_workers_accessor_tracks_resizes() {
    let pool = WorkerPool::new(3, 8);
    assert_eq!(pool.workers(), 3);
    pool.resize(5).unwrap();
    assert_eq!(pool.workers(), 5);
    pool.resize(1).unwrap();
    assert_eq!(pool.workers(), 1);
    pool.close();
}
