//! Channel orchestration: fan-out, fan-in, and parallel map
//!
//! These helpers wire [`CancelToken`]-aware worker threads around
//! crossbeam channels:
//!
//! - [`fan_out`] distributes a stream of inputs across N workers and
//!   merges their per-item outcomes into one output channel
//! - [`fan_in`] merges any number of channels into one
//! - [`concurrent_map`] applies a function to a batch of inputs in
//!   parallel and aggregates partial results and errors
//!
//! Ordering across workers is interleaved and unspecified. Cancellation
//! is checked at each channel operation; in-progress work is never
//! interrupted.
//!
//! ## Example
//!
//! ```rust
//! use threadkit::cancel::CancelToken;
//! use threadkit::flow::{concurrent_map, MapOptions};
//!
//! let token = CancelToken::new();
//! let (mut doubled, error) = concurrent_map(
//!     &token,
//!     vec![1, 2, 3, 4, 5],
//!     |_token, x| Ok(x * 2),
//!     MapOptions::new(),
//! );
//!
//! doubled.sort_unstable();
//! assert_eq!(doubled, vec![2, 4, 6, 8, 10]);
//! assert!(error.is_none());
//! ```

use crate::cancel::CancelToken;
use crate::{Error, Result};
use crossbeam_channel::{bounded, select, Receiver};
use std::sync::Arc;
use std::thread;

/// Buffer size of the shared output channel created by [`fan_out`].
const FAN_OUT_BUFFER: usize = 10;

/// Distribute inputs from a shared channel across `workers` threads.
///
/// Each worker pulls from `inputs` until the channel closes or `token`
/// fires, applies `work` to the item, and sends the per-item outcome to
/// the returned channel. The output channel closes exactly when the last
/// worker exits, so draining it is the natural join point.
///
/// The output channel is buffered; workers block on it when the consumer
/// falls behind, unblocking if the consumer drops the receiver or the
/// token fires.
pub fn fan_out<X, Y, F>(
    token: &CancelToken,
    inputs: Receiver<X>,
    workers: usize,
    work: F,
) -> Receiver<Result<Y>>
where
    X: Send + 'static,
    Y: Send + 'static,
    F: Fn(&CancelToken, X) -> Result<Y> + Send + Sync + 'static,
{
    let (output_tx, output_rx) = bounded::<Result<Y>>(FAN_OUT_BUFFER);
    let work = Arc::new(work);

    for id in 0..workers {
        let token = token.clone();
        let inputs = inputs.clone();
        let output_tx = output_tx.clone();
        let work = Arc::clone(&work);

        thread::spawn(move || {
            log::trace!("fan-out worker {id} starting");
            loop {
                // Checked at the loop top: select alone may pick a ready
                // input arm over an already-fired token.
                if token.is_fired() {
                    break;
                }
                let input = select! {
                    recv(token.done()) -> _ => break,
                    recv(inputs) -> input => match input {
                        Ok(input) => input,
                        // Input channel closed and drained.
                        Err(_) => break,
                    },
                };

                let outcome = work(&token, input);
                select! {
                    send(output_tx, outcome) -> sent => {
                        // Consumer dropped the receiver.
                        if sent.is_err() {
                            break;
                        }
                    }
                    recv(token.done()) -> _ => break,
                }
            }
            log::trace!("fan-out worker {id} exiting");
        });
    }

    // Dropping the original sender here makes worker exits the only thing
    // keeping the channel open: it closes when the last worker finishes.
    drop(output_tx);
    output_rx
}

/// Merge any number of channels into one.
///
/// One forwarding thread per source copies values into the returned
/// channel until the source closes or `token` fires. The merged channel
/// closes after all forwarders exit. Interleaving across sources is
/// unspecified.
pub fn fan_in<T>(token: &CancelToken, sources: impl IntoIterator<Item = Receiver<T>>) -> Receiver<T>
where
    T: Send + 'static,
{
    let (merged_tx, merged_rx) = bounded::<T>(FAN_OUT_BUFFER);

    for source in sources {
        let token = token.clone();
        let merged_tx = merged_tx.clone();

        thread::spawn(move || loop {
            if token.is_fired() {
                return;
            }
            let value = select! {
                recv(token.done()) -> _ => return,
                recv(source) -> value => match value {
                    Ok(value) => value,
                    Err(_) => return,
                },
            };
            select! {
                send(merged_tx, value) -> sent => {
                    if sent.is_err() {
                        return;
                    }
                }
                recv(token.done()) -> _ => return,
            }
        });
    }

    drop(merged_tx);
    merged_rx
}

/// Named options for [`concurrent_map`].
///
/// ```rust
/// use threadkit::flow::MapOptions;
///
/// let options = MapOptions::new().worker_count(2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MapOptions {
    worker_count: Option<usize>,
}

impl MapOptions {
    /// Default options: worker count matches available parallelism.
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the number of worker threads.
    pub fn worker_count(mut self, count: usize) -> Self {
        self.worker_count = Some(count);
        self
    }

    fn effective_workers(&self) -> usize {
        self.worker_count.unwrap_or_else(num_cpus::get).max(1)
    }
}

/// Apply `work` to every input in parallel and aggregate the outcomes.
///
/// Returns the successful results (in unspecified order) together with an
/// optional combined error. Success and failure are independent per item:
/// a failing item contributes to the combined error while the rest still
/// produce results. Only an explicit cancellation aborts the whole
/// operation, returning `(vec![], Some(Error::Canceled))` and discarding
/// any partial results already produced. Callers that need partial
/// results on a deadline should drain before firing the token.
///
/// ```rust
/// use threadkit::cancel::CancelToken;
/// use threadkit::flow::{concurrent_map, MapOptions};
/// use threadkit::Error;
///
/// let token = CancelToken::new();
/// let (mut results, error) = concurrent_map(
///     &token,
///     vec![1, 2, 3, 4],
///     |_token, x| {
///         if x % 2 == 1 {
///             Err(Error::Task(format!("odd input {x}")))
///         } else {
///             Ok(x * 2)
///         }
///     },
///     MapOptions::new(),
/// );
///
/// results.sort_unstable();
/// assert_eq!(results, vec![4, 8]);
/// assert!(error.is_some());
/// ```
pub fn concurrent_map<X, Y, F>(
    token: &CancelToken,
    inputs: Vec<X>,
    work: F,
    options: MapOptions,
) -> (Vec<Y>, Option<Error>)
where
    X: Send + 'static,
    Y: Send + 'static,
    F: Fn(&CancelToken, X) -> Result<Y> + Send + Sync + 'static,
{
    let expected = inputs.len();
    // Fully buffered: feeding can never block, so cancellation only needs
    // to be checked between sends.
    let (input_tx, input_rx) = bounded::<X>(expected);
    for input in inputs {
        if token.is_fired() {
            break;
        }
        // Receiver is alive and the buffer fits every input.
        let _ = input_tx.send(input);
    }
    drop(input_tx);

    let outcomes = fan_out(token, input_rx, options.effective_workers(), work);

    let mut results = Vec::with_capacity(expected);
    let mut errors = Vec::new();
    loop {
        if token.is_fired() {
            return (Vec::new(), Some(Error::Canceled));
        }
        let outcome = select! {
            recv(token.done()) -> _ => return (Vec::new(), Some(Error::Canceled)),
            recv(outcomes) -> outcome => match outcome {
                Ok(outcome) => outcome,
                // All workers have exited; aggregation is complete.
                Err(_) => break,
            },
        };
        match outcome {
            Ok(value) => results.push(value),
            Err(error) => errors.push(error),
        }
    }

    (results, Error::join(errors))
}
