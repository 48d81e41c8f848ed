// Copyright 2025 Content API Contributors
// SPDX-License-Identifier: Apache-2.0

//! Load-generation harness for the Content API.
//!
//! Drives many independent create → read → update → read → delete → read
//! lifecycles against a live service at a fixed concurrency level, asserts
//! the correctness of every response, and aggregates per-phase latency
//! statistics from both client-observed and server-reported timings.
//!
//! The harness speaks two wire dialects through one [`backend::ContentBackend`]
//! abstraction: the service's own direct-resource REST API and a
//! PostgREST-style filter-query API. The dialect is chosen once at startup.
//!
//! One invocation produces a single structured summary report; individual
//! lifecycle failures are logged and counted but never abort the run.

#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod backend;
pub mod batch;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod record;
pub mod report;
pub mod stats;

pub use backend::{BackendReply, ContentBackend};
pub use batch::{BatchScheduler, Settlement};
pub use config::HarnessConfig;
pub use error::{Exchange, HarnessError};
pub use lifecycle::{LifecycleOptions, LifecycleResult, LifecycleRunner, Phase, PhaseSeries};
pub use report::AggregateReport;
pub use stats::Summary;
