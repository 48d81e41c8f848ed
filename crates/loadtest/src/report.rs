// Copyright 2025 Content API Contributors
// SPDX-License-Identifier: Apache-2.0

//! The end-of-run report.
//!
//! Exactly one aggregate report is produced per invocation, built from
//! the full list of settlements. Client and server timings are kept in
//! separate sections with the same shape so they can be compared
//! phase-for-phase; the server section is sparse when the service does
//! not emit a timing header.

use crate::batch::Settlement;
use crate::lifecycle::PhaseSeries;
use crate::stats::{summarize, Summary};
use serde::Serialize;
use std::time::Duration;
use tracing::info;

/// Lifecycle outcome counts.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct TestCounts {
    /// Lifecycles that failed an assertion or a transport phase.
    pub error: usize,
    /// Lifecycles that ran to completion.
    pub success: usize,
    /// All lifecycles attempted.
    pub total: usize,
}

/// Latency summaries for each phase plus all phases combined.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PhaseReport {
    /// Create-phase latency.
    pub create: Summary,
    /// Read-phase latency, all three reads combined.
    pub read: Summary,
    /// Update-phase latency.
    pub update: Summary,
    /// Delete-phase latency.
    pub delete: Summary,
    /// Every sample across phases.
    pub overall: Summary,
}

impl PhaseReport {
    fn from_series(series: &PhaseSeries) -> Self {
        Self {
            create: summarize(&series.create),
            read: summarize(&series.read),
            update: summarize(&series.update),
            delete: summarize(&series.delete),
            overall: summarize(&series.all()),
        }
    }
}

/// Request volume over the run.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct RequestCounts {
    /// Requests completed by successful lifecycles.
    pub total: usize,
    /// Completed requests divided by wall-clock run time.
    pub per_second: f64,
}

/// The aggregate report for one harness invocation.
#[derive(Debug, Clone, Serialize)]
pub struct AggregateReport {
    /// Configured lifecycle count.
    pub limit: usize,
    /// Configured concurrency level.
    pub parallel: usize,
    /// Number of batches the run was split into.
    pub batches: usize,
    /// Lifecycle outcomes.
    pub tests: TestCounts,
    /// Whole-lifecycle wall-clock duration, milliseconds.
    pub test_elapsed: Summary,
    /// Client-measured latency per phase.
    pub client: PhaseReport,
    /// Server-reported latency per phase.
    pub server: PhaseReport,
    /// Request volume.
    pub requests: RequestCounts,
    /// Wall-clock duration of the whole run, milliseconds.
    pub elapsed_ms: u64,
}

impl AggregateReport {
    /// Aggregate all settlements of one run.
    pub fn build(
        limit: usize,
        parallel: usize,
        batches: usize,
        settlements: &[Settlement],
        elapsed: Duration,
    ) -> Self {
        let mut client = PhaseSeries::default();
        let mut server = PhaseSeries::default();
        let mut totals = Vec::new();
        let mut request_total = 0;
        let mut success = 0;

        for settlement in settlements {
            if let Ok(result) = settlement {
                success += 1;
                request_total += result.request_count;
                totals.push(result.total.as_secs_f64() * 1_000.0);
                client.extend(&result.client);
                server.extend(&result.server);
            }
        }

        let elapsed_secs = elapsed.as_secs_f64();
        let per_second = if elapsed_secs > 0.0 {
            request_total as f64 / elapsed_secs
        } else {
            0.0
        };

        Self {
            limit,
            parallel,
            batches,
            tests: TestCounts {
                error: settlements.len() - success,
                success,
                total: settlements.len(),
            },
            test_elapsed: summarize(&totals),
            client: PhaseReport::from_series(&client),
            server: PhaseReport::from_series(&server),
            requests: RequestCounts {
                total: request_total,
                per_second,
            },
            elapsed_ms: elapsed.as_millis() as u64,
        }
    }

    /// Emit the report as one structured log line.
    pub fn emit(&self) {
        let summary = serde_json::to_string(self)
            .unwrap_or_else(|e| format!("{{\"report_error\":\"{e}\"}}"));
        info!(
            tests_total = self.tests.total,
            tests_success = self.tests.success,
            tests_error = self.tests.error,
            requests_total = self.requests.total,
            requests_per_second = self.requests.per_second,
            elapsed_ms = self.elapsed_ms,
            summary = %summary,
            "Finished performance test"
        );
    }
}
