// Copyright 2025 Content API Contributors
// SPDX-License-Identifier: Apache-2.0

//! End-to-end harness tests against an in-memory fake backend.

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use content_api_loadtest::backend::BackendReply;
use content_api_loadtest::batch::batch_sizes;
use content_api_loadtest::lifecycle::{LifecycleOptions, LifecycleRunner};
use content_api_loadtest::record::NewRecord;
use content_api_loadtest::{AggregateReport, BatchScheduler, ContentBackend, HarnessError};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// In-memory stand-in for the service. Toggles let individual tests
/// inject specific misbehavior.
#[derive(Default)]
struct FakeBackend {
    records: Mutex<HashMap<String, Value>>,
    next_id: AtomicUsize,
    /// Report timestamps an hour in the past.
    stale_timestamps: bool,
    /// Acknowledge deletes without removing the record.
    skip_delete: bool,
    /// Fail creates whose title contains this marker.
    fail_create_marker: Option<String>,
    /// Report this server-side latency on every reply.
    server_time_ms: Option<f64>,
}

impl FakeBackend {
    fn timestamp(&self) -> String {
        let now = Utc::now();
        let at = if self.stale_timestamps {
            now - ChronoDuration::hours(1)
        } else {
            now
        };
        at.to_rfc3339()
    }

    fn reply(&self, status: u16, body: Option<Value>) -> BackendReply {
        BackendReply {
            status,
            body,
            server_time_ms: self.server_time_ms,
        }
    }

    fn transport_error(detail: &str) -> HarnessError {
        HarnessError::Transport {
            detail: detail.to_string(),
            exchange: Box::new(content_api_loadtest::Exchange {
                method: "POST".to_string(),
                url: "fake:///content".to_string(),
                request_headers: vec![],
                request_body: None,
                status: Some(500),
                response_body: None,
            }),
        }
    }
}

#[async_trait]
impl ContentBackend for FakeBackend {
    async fn create(&self, record: &NewRecord) -> Result<BackendReply, HarnessError> {
        if let Some(marker) = &self.fail_create_marker {
            if record.title.contains(marker.as_str()) {
                return Err(Self::transport_error("injected create failure"));
            }
        }

        let id = format!("fake-{}", self.next_id.fetch_add(1, Ordering::SeqCst));
        let mut stored = serde_json::to_value(record).unwrap();
        let at = self.timestamp();
        stored["id"] = json!(id);
        stored["created_at"] = json!(at);
        stored["updated_at"] = json!(at);

        self.records
            .lock()
            .unwrap()
            .insert(id, stored.clone());
        Ok(self.reply(201, Some(stored)))
    }

    async fn fetch(&self, id: &str) -> Result<BackendReply, HarnessError> {
        let records = self.records.lock().unwrap();
        match records.get(id) {
            Some(stored) => Ok(self.reply(200, Some(stored.clone()))),
            None => Ok(self.reply(404, None)),
        }
    }

    async fn update(&self, id: &str, body: &Value) -> Result<BackendReply, HarnessError> {
        let mut records = self.records.lock().unwrap();
        let stored = records
            .get_mut(id)
            .ok_or_else(|| Self::transport_error("update of missing record"))?;

        let created_at = stored["created_at"].clone();
        let mut next = body.clone();
        next["id"] = json!(id);
        next["created_at"] = created_at;
        next["updated_at"] = json!(self.timestamp());
        *stored = next.clone();
        Ok(self.reply(200, Some(next)))
    }

    async fn delete(&self, id: &str) -> Result<BackendReply, HarnessError> {
        if !self.skip_delete {
            self.records.lock().unwrap().remove(id);
        }
        Ok(self.reply(204, None))
    }
}

fn options() -> LifecycleOptions {
    LifecycleOptions {
        data_field: true,
        create_only: false,
        timestamp_tolerance: Duration::from_secs(10),
    }
}

fn runner(backend: FakeBackend, options: LifecycleOptions) -> Arc<LifecycleRunner> {
    Arc::new(LifecycleRunner::new(Arc::new(backend), options))
}

#[tokio::test]
async fn test_full_lifecycle_runs_six_requests() {
    let runner = runner(FakeBackend::default(), options());
    let result = runner.run(0, 0).await.unwrap();

    assert_eq!(result.request_count, 6);
    assert_eq!(result.client.create.len(), 1);
    assert_eq!(result.client.read.len(), 3);
    assert_eq!(result.client.update.len(), 1);
    assert_eq!(result.client.delete.len(), 1);
    assert!(result.total > Duration::ZERO);
}

#[tokio::test]
async fn test_create_only_stops_after_one_request() {
    let runner = runner(
        FakeBackend::default(),
        LifecycleOptions {
            create_only: true,
            ..options()
        },
    );
    let result = runner.run(0, 0).await.unwrap();

    assert_eq!(result.request_count, 1);
    assert_eq!(result.client.create.len(), 1);
    assert!(result.client.read.is_empty());
}

#[tokio::test]
async fn test_server_timings_collected_when_header_present() {
    let backend = FakeBackend {
        server_time_ms: Some(3.5),
        ..FakeBackend::default()
    };
    let result = runner(backend, options()).run(0, 0).await.unwrap();

    assert_eq!(result.server.len(), result.client.len());
    assert!(result.server.create.iter().all(|&ms| ms == 3.5));
}

#[tokio::test]
async fn test_small_run_aggregates_expected_counts() {
    let runner = runner(FakeBackend::default(), options());
    let scheduler = BatchScheduler::new(runner, 3, 3);

    let settlements = scheduler.run().await;
    assert_eq!(settlements.len(), 3);
    assert!(settlements.iter().all(|s| s.is_ok()));

    let batches = batch_sizes(3, 3).len();
    let report =
        AggregateReport::build(3, 3, batches, &settlements, Duration::from_secs(1));

    assert_eq!(report.batches, 1);
    assert_eq!(report.tests.success, 3);
    assert_eq!(report.tests.error, 0);
    assert_eq!(report.requests.total, 18);
    assert_eq!(report.client.create.count, 3);
    assert_eq!(report.client.read.count, 9);
    assert_eq!(report.client.update.count, 3);
    assert_eq!(report.client.delete.count, 3);
    assert_eq!(report.client.overall.count, 18);
    assert_eq!(report.test_elapsed.count, 3);
}

/// Wraps a backend with an in-flight request gauge so tests can observe
/// the peak number of concurrently executing requests.
struct GaugedBackend {
    inner: FakeBackend,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl GaugedBackend {
    fn new() -> Self {
        Self {
            inner: FakeBackend::default(),
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }

    fn enter(&self) {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
    }

    fn exit(&self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }

    // Hold the gauge across a yield point so overlapping requests are
    // actually observed as overlapping.
    async fn gauged<T>(&self, op: impl std::future::Future<Output = T>) -> T {
        self.enter();
        tokio::time::sleep(Duration::from_millis(2)).await;
        let out = op.await;
        self.exit();
        out
    }
}

#[async_trait]
impl ContentBackend for GaugedBackend {
    async fn create(&self, record: &NewRecord) -> Result<BackendReply, HarnessError> {
        self.gauged(self.inner.create(record)).await
    }
    async fn fetch(&self, id: &str) -> Result<BackendReply, HarnessError> {
        self.gauged(self.inner.fetch(id)).await
    }
    async fn update(&self, id: &str, body: &Value) -> Result<BackendReply, HarnessError> {
        self.gauged(self.inner.update(id, body)).await
    }
    async fn delete(&self, id: &str) -> Result<BackendReply, HarnessError> {
        self.gauged(self.inner.delete(id)).await
    }
}

#[tokio::test]
async fn test_concurrency_never_exceeds_parallel_across_batches() {
    let backend = Arc::new(GaugedBackend::new());
    let runner = Arc::new(LifecycleRunner::new(
        Arc::clone(&backend) as Arc<dyn ContentBackend>,
        options(),
    ));
    // 9 lifecycles at concurrency 3: three full batches, each awaited
    // before the next starts.
    let settlements = BatchScheduler::new(runner, 9, 3).run().await;

    assert_eq!(settlements.len(), 9);
    assert!(settlements.iter().all(|s| s.is_ok()));

    let peak = backend.peak.load(Ordering::SeqCst);
    assert!(peak >= 1);
    assert!(
        peak <= 3,
        "observed {peak} concurrent requests, expected at most 3"
    );
    assert_eq!(backend.in_flight.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_one_failure_does_not_abort_siblings() {
    // Run ids are "{batch}-{index}-{suffix}", so " 0-1-" marks exactly
    // the second lifecycle of the first batch.
    let backend = FakeBackend {
        fail_create_marker: Some(" 0-1-".to_string()),
        ..FakeBackend::default()
    };
    let scheduler = BatchScheduler::new(runner(backend, options()), 4, 4);

    let settlements = scheduler.run().await;
    assert_eq!(settlements.len(), 4);
    let errors = settlements.iter().filter(|s| s.is_err()).count();
    assert_eq!(errors, 1);
    assert!(matches!(
        settlements[1],
        Err(HarnessError::Transport { .. })
    ));
}

#[tokio::test]
async fn test_stale_server_timestamps_fail_the_lifecycle() {
    let backend = FakeBackend {
        stale_timestamps: true,
        ..FakeBackend::default()
    };
    let err = runner(backend, options()).run(0, 0).await.unwrap_err();

    match err {
        HarnessError::Assertion(msg) => assert!(msg.contains("created_at")),
        other => panic!("expected assertion failure, got {other}"),
    }
}

#[tokio::test]
async fn test_record_surviving_delete_fails_the_lifecycle() {
    let backend = FakeBackend {
        skip_delete: true,
        ..FakeBackend::default()
    };
    let err = runner(backend, options()).run(0, 0).await.unwrap_err();

    match err {
        HarnessError::Assertion(msg) => assert!(msg.contains("still present after delete")),
        other => panic!("expected assertion failure, got {other}"),
    }
}

#[tokio::test]
async fn test_data_round_trip_mismatch_is_detected() {
    // A backend that drops the data field entirely.
    struct DataDroppingBackend(FakeBackend);

    #[async_trait]
    impl ContentBackend for DataDroppingBackend {
        async fn create(&self, record: &NewRecord) -> Result<BackendReply, HarnessError> {
            let mut stripped = record.clone();
            stripped.data = None;
            self.0.create(&stripped).await
        }
        async fn fetch(&self, id: &str) -> Result<BackendReply, HarnessError> {
            self.0.fetch(id).await
        }
        async fn update(&self, id: &str, body: &Value) -> Result<BackendReply, HarnessError> {
            self.0.update(id, body).await
        }
        async fn delete(&self, id: &str) -> Result<BackendReply, HarnessError> {
            self.0.delete(id).await
        }
    }

    let runner = Arc::new(LifecycleRunner::new(
        Arc::new(DataDroppingBackend(FakeBackend::default())),
        options(),
    ));
    let err = runner.run(0, 0).await.unwrap_err();

    match err {
        HarnessError::Assertion(msg) => assert!(msg.contains("data.run_id")),
        other => panic!("expected assertion failure, got {other}"),
    }
}
