// Copyright 2025 Content API Contributors
// SPDX-License-Identifier: Apache-2.0

//! Batch scheduling.
//!
//! The run is split into batches of at most `parallel` lifecycles. All
//! lifecycles in a batch are spawned together and the batch waits for
//! every one to settle before the next batch starts, so concurrency never
//! exceeds `parallel`. Every settlement is kept, success or failure; a
//! failed lifecycle is logged with its full context and never aborts its
//! siblings or the run.

use crate::error::HarnessError;
use crate::lifecycle::{LifecycleResult, LifecycleRunner};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error};

/// The outcome of one lifecycle, kept whether it succeeded or failed.
pub type Settlement = Result<LifecycleResult, HarnessError>;

/// Runs the configured number of lifecycles in bounded-concurrency batches.
pub struct BatchScheduler {
    runner: Arc<LifecycleRunner>,
    limit: usize,
    parallel: usize,
}

impl BatchScheduler {
    /// Build a scheduler for `limit` lifecycles at `parallel` concurrency.
    pub fn new(runner: Arc<LifecycleRunner>, limit: usize, parallel: usize) -> Self {
        Self {
            runner,
            limit,
            parallel,
        }
    }

    /// Run every batch to completion and return all settlements.
    pub async fn run(&self) -> Vec<Settlement> {
        let sizes = batch_sizes(self.limit, self.parallel);
        debug!(
            limit = self.limit,
            parallel = self.parallel,
            batches = sizes.len(),
            "Starting performance test"
        );

        let mut settlements = Vec::with_capacity(self.limit);
        for (batch_index, size) in sizes.iter().copied().enumerate() {
            let batch_start = Instant::now();
            debug!(batch = batch_index, size, "Starting batch");

            let handles: Vec<_> = (0..size)
                .map(|index| {
                    let runner = Arc::clone(&self.runner);
                    tokio::spawn(async move { runner.run(batch_index, index).await })
                })
                .collect();

            for (index, joined) in futures::future::join_all(handles)
                .await
                .into_iter()
                .enumerate()
            {
                let settlement = match joined {
                    Ok(settlement) => settlement,
                    Err(e) => Err(HarnessError::Join(e.to_string())),
                };
                if let Err(e) = &settlement {
                    log_failure(batch_index, index, e);
                }
                settlements.push(settlement);
            }

            debug!(
                batch = batch_index,
                elapsed_ms = batch_start.elapsed().as_millis() as u64,
                "Finished batch"
            );
        }
        settlements
    }
}

/// Sizes of the batches for a run: full batches of `parallel` followed by
/// one remainder batch when `limit` does not divide evenly.
pub fn batch_sizes(limit: usize, parallel: usize) -> Vec<usize> {
    if limit == 0 || parallel == 0 {
        return Vec::new();
    }
    let mut sizes = vec![parallel; limit / parallel];
    if limit % parallel != 0 {
        sizes.push(limit % parallel);
    }
    sizes
}

fn log_failure(batch_index: usize, index: usize, e: &HarnessError) {
    match e.exchange() {
        Some(exchange) => error!(
            batch = batch_index,
            index,
            method = %exchange.method,
            url = %exchange.url,
            request_headers = %exchange.headers_line(),
            request_body = exchange.request_body.as_deref().unwrap_or(""),
            status = exchange.status,
            response_body = exchange.response_body.as_deref().unwrap_or(""),
            "Lifecycle failed: {e}"
        ),
        None => error!(batch = batch_index, index, "Lifecycle failed: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_sizes_even_split() {
        assert_eq!(batch_sizes(10_000, 100), vec![100; 100]);
    }

    #[test]
    fn test_batch_sizes_with_remainder() {
        assert_eq!(batch_sizes(250, 100), vec![100, 100, 50]);
    }

    #[test]
    fn test_batch_sizes_smaller_than_parallel() {
        assert_eq!(batch_sizes(3, 100), vec![3]);
    }

    #[test]
    fn test_batch_sizes_degenerate_inputs() {
        assert!(batch_sizes(0, 100).is_empty());
        assert!(batch_sizes(100, 0).is_empty());
    }

    #[test]
    fn test_batch_sizes_sum_to_limit() {
        for limit in [1, 7, 99, 100, 101, 250, 1000] {
            let total: usize = batch_sizes(limit, 100).iter().sum();
            assert_eq!(total, limit);
        }
    }
}
