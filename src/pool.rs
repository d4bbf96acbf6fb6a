//! Bounded worker pool shared by the fingerprinting and collection phases.
//!
//! Items are pushed into a crossbeam channel up front and the sender is
//! dropped before any worker starts, so a worker that sees the channel
//! empty also sees it disconnected and exits. `run` joins every worker
//! before returning; callers never observe a half-finished phase.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use anyhow::{anyhow, Context, Result};
use crossbeam::channel::{unbounded, Receiver};
use log::{debug, error};

use crate::errors::SweepError;

/// Counters reported once a pool run has drained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PoolStats {
    pub workers: usize,
    pub processed: usize,
    pub panicked: usize,
}

/// A fixed-size pool of OS threads draining one queue per `run`.
#[derive(Debug, Clone)]
pub struct WorkerPool {
    name: String,
    num_workers: usize,
}

impl WorkerPool {
    /// Create a pool. `num_workers` must be at least one.
    pub fn new(name: impl Into<String>, num_workers: usize) -> Result<Self, SweepError> {
        if num_workers == 0 {
            return Err(SweepError::SetupFailure(
                "worker pool needs at least one worker".to_string(),
            ));
        }
        Ok(Self {
            name: name.into(),
            num_workers,
        })
    }

    /// Deliver every item to `handler` exactly once across the workers.
    ///
    /// The handler is expected to be total. A panic inside it is trapped,
    /// logged with the worker name and counted; the worker moves on to the
    /// next item.
    pub fn run<T, I, F>(&self, items: I, handler: F) -> Result<PoolStats>
    where
        T: Send,
        I: IntoIterator<Item = T>,
        F: Fn(T) + Sync,
    {
        let (sender, receiver) = unbounded::<T>();
        for item in items {
            sender
                .send(item)
                .map_err(|_| anyhow!("Failed to queue work item"))?;
        }
        // Closing the queue before the workers start is what lets them exit on empty
        drop(sender);

        let processed = AtomicUsize::new(0);
        let panicked = AtomicUsize::new(0);
        let handler = &handler;

        thread::scope(|scope| -> Result<()> {
            let mut workers = Vec::with_capacity(self.num_workers);
            for i in 0..self.num_workers {
                let worker_name = format!("{}-{}", self.name, i);
                let receiver = receiver.clone();
                let processed = &processed;
                let panicked = &panicked;

                let handle = thread::Builder::new()
                    .name(worker_name.clone())
                    .spawn_scoped(scope, move || {
                        drain_queue(&worker_name, receiver, handler, processed, panicked)
                    })
                    .context(format!("Failed to spawn worker {}", i))?;
                workers.push(handle);
            }

            for worker in workers {
                if worker.join().is_err() {
                    error!("Worker in pool '{}' terminated abnormally", self.name);
                }
            }
            Ok(())
        })?;

        let stats = PoolStats {
            workers: self.num_workers,
            processed: processed.into_inner(),
            panicked: panicked.into_inner(),
        };
        debug!("Pool '{}' drained: {:?}", self.name, stats);
        Ok(stats)
    }
}

/// Worker loop: pull until the closed queue is empty.
fn drain_queue<T, F>(
    worker_name: &str,
    receiver: Receiver<T>,
    handler: &F,
    processed: &AtomicUsize,
    panicked: &AtomicUsize,
) where
    F: Fn(T),
{
    while let Ok(item) = receiver.recv() {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| handler(item)));
        if outcome.is_err() {
            error!("Handler panicked in worker {}", worker_name);
            panicked.fetch_add(1, Ordering::Relaxed);
        }
        processed.fetch_add(1, Ordering::Relaxed);
    }
}
