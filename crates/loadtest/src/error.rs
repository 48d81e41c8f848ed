// Copyright 2025 Content API Contributors
// SPDX-License-Identifier: Apache-2.0

//! Harness error taxonomy.
//!
//! Three kinds of failure exist: assertion failures (the service answered,
//! but with the wrong content), transport failures (network errors or
//! unexpected HTTP statuses), and configuration failures (fatal before the
//! run starts). The first two are caught per lifecycle and become failed
//! settlements; only the third terminates the process.

use thiserror::Error;

/// A captured HTTP exchange, attached to transport failures so that a
/// failed lifecycle can be diagnosed from the log alone.
#[derive(Debug, Clone)]
pub struct Exchange {
    /// Request method.
    pub method: String,
    /// Full request URL.
    pub url: String,
    /// Request headers as sent, sensitive values included verbatim.
    pub request_headers: Vec<(String, String)>,
    /// Serialized request body, when one was sent.
    pub request_body: Option<String>,
    /// Response status, absent when the request never completed.
    pub status: Option<u16>,
    /// Raw response body, when one was received.
    pub response_body: Option<String>,
}

impl Exchange {
    /// Render the request headers as a single `k: v` list for logging.
    pub fn headers_line(&self) -> String {
        self.request_headers
            .iter()
            .map(|(k, v)| format!("{k}: {v}"))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Failures produced while running the harness.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// The service's response disagrees with an expected invariant.
    #[error("assertion failed: {0}")]
    Assertion(String),

    /// A network error or unexpected HTTP status during a lifecycle phase.
    #[error("transport failure: {detail}")]
    Transport {
        /// Why the exchange is considered failed.
        detail: String,
        /// The offending request/response pair.
        exchange: Box<Exchange>,
    },

    /// The response arrived but could not be interpreted.
    #[error("malformed response from {url}: {detail}")]
    MalformedResponse {
        /// The request URL that produced the body.
        url: String,
        /// What was wrong with it.
        detail: String,
    },

    /// Invalid configuration, fatal before any batch runs.
    #[error("configuration error: {0}")]
    Config(String),

    /// A lifecycle task ended without settling (panic or cancellation).
    #[error("lifecycle task failed: {0}")]
    Join(String),
}

impl HarnessError {
    /// Construct an assertion failure.
    pub fn assertion(msg: impl Into<String>) -> Self {
        HarnessError::Assertion(msg.into())
    }

    /// The exchange context, when this failure carries one.
    pub fn exchange(&self) -> Option<&Exchange> {
        match self {
            HarnessError::Transport { exchange, .. } => Some(exchange),
            _ => None,
        }
    }
}
