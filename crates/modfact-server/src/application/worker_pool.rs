//! WorkerPool: computes one request's range product on several workers.
//!
//! The requested range is split with [`modfact_core::partition`], each slice
//! is reduced on its own blocking worker, and the partial products are folded
//! together once every worker has finished.
//!
//! # Why `spawn_blocking`? (for beginners)
//!
//! Reducing a range is pure CPU work with no `.await` points.  Running it
//! directly inside an async task would stall one of Tokio's runtime threads
//! and delay every other connection scheduled on it.  `spawn_blocking` hands
//! the closure to Tokio's dedicated blocking thread pool instead, so the
//! workers run in parallel while the connection task simply awaits them.
//!
//! # No shared accumulator
//!
//! Every worker returns its partial product by value.  Only the calling task
//! multiplies them together, after the join barrier, so no lock is needed.

use futures_util::future::join_all;
use modfact_core::{mod_mul, partition, reduce_range, Range, ValidationError};
use thiserror::Error;
use tokio::task::JoinError;
use tracing::{debug, trace};

/// Error type for a pooled computation.
#[derive(Debug, Error)]
pub enum WorkerPoolError {
    /// The request or pool parameters were invalid.
    #[error("invalid computation: {0}")]
    Invalid(#[from] ValidationError),

    /// A worker could not run to completion.  The whole request fails.
    #[error("worker {index} failed on {range}: {source}")]
    WorkerFailed {
        index: usize,
        range: Range,
        #[source]
        source: JoinError,
    },
}

/// A fixed-width pool of range-product workers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerPool {
    worker_count: usize,
}

impl WorkerPool {
    /// Creates a pool that splits every request into `worker_count` slices.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::ZeroPartitions`] when `worker_count` is 0.
    pub fn new(worker_count: usize) -> Result<Self, ValidationError> {
        if worker_count == 0 {
            return Err(ValidationError::ZeroPartitions);
        }
        Ok(Self { worker_count })
    }

    /// Configured number of workers.  Fewer run when a range is shorter.
    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// Returns the product of every integer in `range`, modulo `modulus`.
    ///
    /// # Errors
    ///
    /// Returns [`WorkerPoolError::Invalid`] for a zero modulus and
    /// [`WorkerPoolError::WorkerFailed`] if any worker panics or is cancelled.
    pub async fn compute(&self, range: Range, modulus: u64) -> Result<u64, WorkerPoolError> {
        self.compute_with(range, modulus, reduce_range).await
    }

    /// [`WorkerPool::compute`] with an injectable per-slice reducer.
    pub(crate) async fn compute_with<F>(
        &self,
        range: Range,
        modulus: u64,
        reducer: F,
    ) -> Result<u64, WorkerPoolError>
    where
        F: Fn(Range, u64) -> u64 + Copy + Send + 'static,
    {
        if modulus == 0 {
            return Err(ValidationError::ZeroModulus.into());
        }

        let slices = partition(range, self.worker_count)?;

        // Launch every worker before awaiting any of them.
        let handles: Vec<_> = slices
            .iter()
            .enumerate()
            .map(|(index, &slice)| {
                debug!("worker {index}: {slice} mod {modulus}");
                tokio::task::spawn_blocking(move || reducer(slice, modulus))
            })
            .collect();

        let outcomes = join_all(handles).await;

        // Fold in slice order.
        let mut total = 1 % modulus;
        for (index, (slice, outcome)) in slices.into_iter().zip(outcomes).enumerate() {
            let partial = outcome.map_err(|source| WorkerPoolError::WorkerFailed {
                index,
                range: slice,
                source,
            })?;
            trace!("worker {index}: partial product for {slice} is {partial}");
            total = mod_mul(total, partial, modulus);
        }

        Ok(total)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
