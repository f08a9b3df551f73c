//! Unbounded shared FIFO queue.
//!
//! A thin wrapper over an unbounded `crossbeam-channel`. Producers are cheap
//! to clone and are handed to workers; the single consumer stays with the
//! coordinator. Once every producer has been dropped, an empty queue reports
//! a disconnect instead of blocking, which is what lets the coordinator notice
//! a worker that exited without pushing.

use std::time::Duration;

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};

use crate::error::FanOutError;

/// Largest up-front allocation `drain` makes; beyond this the vector grows.
const DRAIN_PREALLOC: usize = 1024;

/// Create a connected producer/consumer pair over an unbounded queue.
///
/// ```
/// use fanout_core::queue::shared_queue;
///
/// let (producer, consumer) = shared_queue();
/// producer.push(3).unwrap();
/// assert_eq!(consumer.pop().unwrap(), 3);
/// ```
#[must_use]
pub fn shared_queue<T>() -> (QueueProducer<T>, QueueConsumer<T>) {
    let (tx, rx) = unbounded();
    (QueueProducer { tx }, QueueConsumer { rx })
}

/// Write side of the shared queue.
#[derive(Debug)]
pub struct QueueProducer<T> {
    tx: Sender<T>,
}

impl<T> Clone for QueueProducer<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<T> QueueProducer<T> {
    /// Push a value. Never blocks; fails only if the consumer is gone.
    pub fn push(&self, value: T) -> Result<(), FanOutError> {
        self.tx.send(value).map_err(|_| FanOutError::QueueClosed)
    }
}

/// Read side of the shared queue, owned by the coordinator.
#[derive(Debug)]
pub struct QueueConsumer<T> {
    rx: Receiver<T>,
}

impl<T> QueueConsumer<T> {
    /// Pop one value, blocking while the queue is empty and a producer lives.
    pub fn pop(&self) -> Result<T, FanOutError> {
        self.rx.recv().map_err(|_| FanOutError::QueueDisconnected {
            received: 0,
            expected: 1,
        })
    }

    /// Pop one value, waiting at most `timeout`.
    pub fn pop_timeout(&self, timeout: Duration) -> Result<T, FanOutError> {
        self.rx.recv_timeout(timeout).map_err(|e| match e {
            RecvTimeoutError::Timeout => FanOutError::Timeout {
                timeout,
                received: 0,
                expected: 1,
            },
            RecvTimeoutError::Disconnected => FanOutError::QueueDisconnected {
                received: 0,
                expected: 1,
            },
        })
    }

    /// Pop exactly `count` values in arrival order.
    ///
    /// With a timeout, each individual pop waits at most that long. Errors
    /// carry how many values had been received when the drain stopped.
    pub fn drain(&self, count: usize, timeout: Option<Duration>) -> Result<Vec<T>, FanOutError> {
        let mut values = Vec::with_capacity(count.min(DRAIN_PREALLOC));
        for received in 0..count {
            let next = match timeout {
                Some(timeout) => self.pop_timeout(timeout),
                None => self.pop(),
            };
            let value = next.map_err(|e| with_progress(e, received, count))?;
            values.push(value);
        }
        Ok(values)
    }

    /// Number of values currently waiting.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    /// Whether no value is currently waiting.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

fn with_progress(err: FanOutError, received: usize, expected: usize) -> FanOutError {
    match err {
        FanOutError::QueueDisconnected { .. } => FanOutError::QueueDisconnected { received, expected },
        FanOutError::Timeout { timeout, .. } => FanOutError::Timeout {
            timeout,
            received,
            expected,
        },
        other => other,
    }
}
