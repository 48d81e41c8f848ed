// Copyright 2025 Content API Contributors
// SPDX-License-Identifier: Apache-2.0

//! Load-test harness entry point.

use clap::Parser;
use content_api_loadtest::backend::build_backend;
use content_api_loadtest::lifecycle::{LifecycleOptions, LifecycleRunner};
use content_api_loadtest::{AggregateReport, BatchScheduler, HarnessConfig};
use std::sync::Arc;
use std::time::{Duration, Instant};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Invalid flags or environment values are fatal here, before any
    // request is sent.
    let config = HarnessConfig::parse();

    tracing_subscriber::fmt()
        .json()
        .with_max_level(config.log_level.as_filter())
        .init();

    let backend = build_backend(&config)?;
    let runner = Arc::new(LifecycleRunner::new(
        backend,
        LifecycleOptions {
            data_field: config.data_field,
            create_only: config.create_only,
            timestamp_tolerance: Duration::from_secs(config.timestamp_tolerance_secs),
        },
    ));
    let scheduler = BatchScheduler::new(runner, config.limit, config.parallel);

    let started = Instant::now();
    let settlements = scheduler.run().await;
    let batches = content_api_loadtest::batch::batch_sizes(config.limit, config.parallel).len();

    let report = AggregateReport::build(
        config.limit,
        config.parallel,
        batches,
        &settlements,
        started.elapsed(),
    );
    report.emit();

    // Failed lifecycles are reported in the summary, not via the exit
    // code; only configuration errors abort with a non-zero status.
    Ok(())
}
