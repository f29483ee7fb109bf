//! Cooperative chunked processing for large item collections.
//!
//! A [`BatchRun`] is a lazy, finite iterator of progress events: each
//! `next()` call processes exactly one chunk and yields the running
//! `(processed, total)` count. The pull boundary between chunks is the
//! scheduling point, so a hosting loop can interleave other work; an
//! optional inter-chunk delay further throttles throughput under memory
//! pressure. Cancellation is checked once per chunk boundary, never
//! mid-item, and produces partial results with a marker instead of an
//! error.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Progress after one completed chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchProgress {
    pub processed: usize,
    pub total: usize,
}

/// Final outcome of a batch run. Item order always matches input order.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchOutcome<R> {
    pub results: Vec<R>,
    pub cancelled: bool,
}

#[derive(Debug, Clone)]
pub struct BatchProcessor {
    chunk_size: usize,
    inter_chunk_delay: Option<Duration>,
}

impl BatchProcessor {
    pub fn new(chunk_size: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
            inter_chunk_delay: None,
        }
    }

    /// Adds a delay between chunks, used when the monitor reports pressure.
    pub fn with_inter_chunk_delay(mut self, delay: Duration) -> Self {
        self.inter_chunk_delay = Some(delay);
        self
    }

    /// Starts a run over `items`. The returned iterator is restartable in
    /// the sense that a fresh run over the same items can always be built
    /// from the processor again.
    pub fn run<T, R, F>(&self, items: Vec<T>, worker: F, cancel: Arc<AtomicBool>) -> BatchRun<T, R, F>
    where
        F: FnMut(T) -> R,
    {
        let total = items.len();
        BatchRun {
            items: items.into_iter(),
            worker,
            results: Vec::with_capacity(total),
            total,
            chunk_size: self.chunk_size,
            inter_chunk_delay: self.inter_chunk_delay,
            cancel,
            cancelled: false,
            started: false,
        }
    }
}

/// An in-flight chunked run. Iterate to drive it; call
/// [`BatchRun::finish`] for the ordered results.
pub struct BatchRun<T, R, F> {
    items: std::vec::IntoIter<T>,
    worker: F,
    results: Vec<R>,
    total: usize,
    chunk_size: usize,
    inter_chunk_delay: Option<Duration>,
    cancel: Arc<AtomicBool>,
    cancelled: bool,
    started: bool,
}

impl<T, R, F> BatchRun<T, R, F>
where
    F: FnMut(T) -> R,
{
    /// Drives the run to completion (or cancellation) and returns the
    /// collected results.
    pub fn finish(mut self) -> BatchOutcome<R> {
        for _ in self.by_ref() {}
        BatchOutcome {
            results: self.results,
            cancelled: self.cancelled,
        }
    }
}

impl<T, R, F> Iterator for BatchRun<T, R, F>
where
    F: FnMut(T) -> R,
{
    type Item = BatchProgress;

    fn next(&mut self) -> Option<BatchProgress> {
        if self.cancelled || self.results.len() >= self.total {
            return None;
        }
        // Cancellation and throttling happen only at chunk boundaries.
        if self.cancel.load(Ordering::Acquire) {
            self.cancelled = true;
            log::debug!(
                "batch cancelled after {}/{} items",
                self.results.len(),
                self.total
            );
            return None;
        }
        if self.started {
            if let Some(delay) = self.inter_chunk_delay {
                std::thread::sleep(delay);
            }
            std::thread::yield_now();
        }
        self.started = true;

        for _ in 0..self.chunk_size {
            match self.items.next() {
                Some(item) => self.results.push((self.worker)(item)),
                None => break,
            }
        }
        Some(BatchProgress {
            processed: self.results.len(),
            total: self.total,
        })
    }
}
