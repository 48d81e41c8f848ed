// Copyright 2025 Content API Contributors
// SPDX-License-Identifier: Apache-2.0

//! One record's lifecycle: create, read, update, read, delete, read.
//!
//! Each lifecycle owns exactly one record and verifies the service's
//! behavior at every step: field fidelity after create, the update being
//! visible on re-read, and true absence after delete. Client-side latency
//! is measured around each request; server-reported latency is collected
//! from the timing header when the service sends one. A failed phase
//! aborts the rest of that lifecycle only.

use crate::backend::{BackendReply, ContentBackend};
use crate::error::HarnessError;
use crate::record::{run_id, NewRecord, StoredRecord};
use chrono::Utc;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// The four measured phases of a lifecycle. Reads in positions two, four
/// and six all land in the read series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// The initial `POST`.
    Create,
    /// Any of the three verification reads.
    Read,
    /// The full-record update.
    Update,
    /// The final removal.
    Delete,
}

/// Per-phase latency samples, in milliseconds.
#[derive(Debug, Clone, Default)]
pub struct PhaseSeries {
    /// Create-phase samples.
    pub create: Vec<f64>,
    /// Read-phase samples, all three reads combined.
    pub read: Vec<f64>,
    /// Update-phase samples.
    pub update: Vec<f64>,
    /// Delete-phase samples.
    pub delete: Vec<f64>,
}

impl PhaseSeries {
    /// Record one sample in the given phase.
    pub fn push(&mut self, phase: Phase, sample: f64) {
        match phase {
            Phase::Create => self.create.push(sample),
            Phase::Read => self.read.push(sample),
            Phase::Update => self.update.push(sample),
            Phase::Delete => self.delete.push(sample),
        }
    }

    /// Append all samples from another series, phase by phase.
    pub fn extend(&mut self, other: &PhaseSeries) {
        self.create.extend_from_slice(&other.create);
        self.read.extend_from_slice(&other.read);
        self.update.extend_from_slice(&other.update);
        self.delete.extend_from_slice(&other.delete);
    }

    /// All samples across phases, in phase order.
    pub fn all(&self) -> Vec<f64> {
        let mut all = Vec::with_capacity(self.len());
        all.extend_from_slice(&self.create);
        all.extend_from_slice(&self.read);
        all.extend_from_slice(&self.update);
        all.extend_from_slice(&self.delete);
        all
    }

    /// Total number of samples.
    pub fn len(&self) -> usize {
        self.create.len() + self.read.len() + self.update.len() + self.delete.len()
    }

    /// True when no samples were recorded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Timings collected from one completed lifecycle.
#[derive(Debug, Clone)]
pub struct LifecycleResult {
    /// Wall-clock duration of the whole lifecycle.
    pub total: Duration,
    /// Latency measured around each request on the client.
    pub client: PhaseSeries,
    /// Latency reported by the service's timing header.
    pub server: PhaseSeries,
    /// Number of requests that completed.
    pub request_count: usize,
}

impl LifecycleResult {
    fn observe(&mut self, phase: Phase, elapsed_ms: f64, reply: &BackendReply) {
        self.client.push(phase, elapsed_ms);
        if let Some(server_ms) = reply.server_time_ms {
            self.server.push(phase, server_ms);
        }
        self.request_count += 1;
    }
}

/// Behavior switches for the lifecycle, fixed for the whole run.
#[derive(Debug, Clone, Copy)]
pub struct LifecycleOptions {
    /// Attach correlation markers to the `data` field and verify they
    /// round-trip.
    pub data_field: bool,
    /// Stop after the create phase.
    pub create_only: bool,
    /// How far in the past a server timestamp may lie.
    pub timestamp_tolerance: Duration,
}

/// Drives lifecycles against one backend.
pub struct LifecycleRunner {
    backend: Arc<dyn ContentBackend>,
    options: LifecycleOptions,
}

impl LifecycleRunner {
    /// Build a runner over the given backend.
    pub fn new(backend: Arc<dyn ContentBackend>, options: LifecycleOptions) -> Self {
        Self { backend, options }
    }

    /// Run one full lifecycle, identified by its batch and in-batch index.
    pub async fn run(&self, batch_index: usize, index: usize) -> Result<LifecycleResult, HarnessError> {
        let run_id = run_id(batch_index, index);
        let started = Instant::now();
        let started_at = Utc::now();
        let record = NewRecord::generate(&run_id, started_at, self.options.data_field);

        let mut result = LifecycleResult {
            total: Duration::ZERO,
            client: PhaseSeries::default(),
            server: PhaseSeries::default(),
            request_count: 0,
        };

        // Create.
        let phase_start = Instant::now();
        let reply = self.backend.create(&record).await?;
        result.observe(Phase::Create, elapsed_ms(phase_start), &reply);

        // Create-only mode measures pure write throughput and skips every
        // assertion, including parsing the created record.
        if self.options.create_only {
            result.total = started.elapsed();
            return Ok(result);
        }

        let created = expect_record("create", &reply)?;
        if created.id.is_empty() {
            return Err(HarnessError::assertion("create returned an empty id"));
        }

        // Read back and verify every submitted field survived.
        let phase_start = Instant::now();
        let reply = self.backend.fetch(&created.id).await?;
        result.observe(Phase::Read, elapsed_ms(phase_start), &reply);
        let fetched = expect_record("read after create", &reply)?;
        self.verify_created(&record, &created, &fetched)?;

        // Update: full record with new title and published status.
        let phase_start = Instant::now();
        let reply = self
            .backend
            .update(&created.id, &record.update_body())
            .await?;
        result.observe(Phase::Update, elapsed_ms(phase_start), &reply);

        // Read back and verify the update is visible.
        let phase_start = Instant::now();
        let reply = self.backend.fetch(&created.id).await?;
        result.observe(Phase::Read, elapsed_ms(phase_start), &reply);
        let updated = expect_record("read after update", &reply)?;
        self.verify_updated(&record, &created, &updated)?;

        // Delete.
        let phase_start = Instant::now();
        let reply = self.backend.delete(&created.id).await?;
        result.observe(Phase::Delete, elapsed_ms(phase_start), &reply);

        // Read back and verify the record is gone.
        let phase_start = Instant::now();
        let reply = self.backend.fetch(&created.id).await?;
        result.observe(Phase::Read, elapsed_ms(phase_start), &reply);
        if reply.body.is_some() {
            return Err(HarnessError::assertion(format!(
                "record {} still present after delete",
                created.id
            )));
        }

        result.total = started.elapsed();
        Ok(result)
    }

    fn verify_created(
        &self,
        submitted: &NewRecord,
        created: &StoredRecord,
        fetched: &StoredRecord,
    ) -> Result<(), HarnessError> {
        if fetched.id != created.id {
            return Err(HarnessError::assertion(format!(
                "read returned id {:?}, expected {:?}",
                fetched.id, created.id
            )));
        }
        expect_field("title", &fetched.title, &submitted.title)?;
        expect_field("body", &fetched.body, &submitted.body)?;
        expect_field("author", &fetched.author, &submitted.author)?;
        expect_field("status", &fetched.status, &submitted.status)?;
        self.assert_recent("created_at", fetched.created_at)?;

        if let Some(submitted_data) = &submitted.data {
            for key in ["run_id", "created_at"] {
                let sent = submitted_data.get(key);
                let stored = fetched.data.get(key);
                if stored != sent {
                    return Err(HarnessError::assertion(format!(
                        "data.{key} did not round-trip: sent {sent:?}, got {stored:?}"
                    )));
                }
            }
        }
        Ok(())
    }

    fn verify_updated(
        &self,
        submitted: &NewRecord,
        created: &StoredRecord,
        updated: &StoredRecord,
    ) -> Result<(), HarnessError> {
        if updated.id != created.id {
            return Err(HarnessError::assertion(format!(
                "read after update returned id {:?}, expected {:?}",
                updated.id, created.id
            )));
        }
        expect_field("title", &updated.title, &submitted.updated_title())?;
        expect_field("status", &updated.status, "published")?;
        self.assert_recent("updated_at", updated.updated_at)
    }

    /// Fail when the timestamp is further in the past than the tolerance.
    /// Timestamps ahead of local time pass; clock skew between harness
    /// and service must not fail a healthy run.
    fn assert_recent(
        &self,
        field: &str,
        timestamp: chrono::DateTime<Utc>,
    ) -> Result<(), HarnessError> {
        let age = Utc::now().signed_duration_since(timestamp);
        let tolerance = chrono::Duration::from_std(self.options.timestamp_tolerance)
            .unwrap_or(chrono::Duration::MAX);
        if age > tolerance {
            return Err(HarnessError::assertion(format!(
                "{field} is not recent: {} is {}s old",
                timestamp.to_rfc3339(),
                age.num_seconds()
            )));
        }
        Ok(())
    }
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1_000.0
}

fn expect_record(phase: &str, reply: &BackendReply) -> Result<StoredRecord, HarnessError> {
    let body = reply
        .body
        .as_ref()
        .ok_or_else(|| HarnessError::assertion(format!("{phase} returned no record")))?;
    StoredRecord::from_value(phase, body)
}

fn expect_field(field: &str, actual: &str, expected: &str) -> Result<(), HarnessError> {
    if actual != expected {
        return Err(HarnessError::assertion(format!(
            "{field} mismatch: expected {expected:?}, got {actual:?}"
        )));
    }
    Ok(())
}
