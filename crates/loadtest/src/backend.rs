// Copyright 2025 Content API Contributors
// SPDX-License-Identifier: Apache-2.0

//! Wire-dialect adapters.
//!
//! Two backends can sit behind the same `/content` resource: the service's
//! own direct-resource REST API and a PostgREST-style filter-query API.
//! They differ in how a record is addressed (`/content/{id}` vs
//! `/content?id=eq.{id}`), in the success envelope (single object vs
//! array), and in the absence signal after a delete (HTTP 404 vs an empty
//! array with HTTP 200). [`ContentBackend`] hides all three differences:
//! absence is normalized to a reply without a body, so callers assert
//! presence or absence without knowing the dialect. The implementation is
//! chosen once at startup and never re-dispatched per call.

use crate::config::HarnessConfig;
use crate::error::{Exchange, HarnessError};
use crate::record::NewRecord;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, StatusCode};
use serde_json::Value;
use std::sync::Arc;

/// Outcome of one backend operation.
#[derive(Debug, Clone)]
pub struct BackendReply {
    /// HTTP status of the exchange.
    pub status: u16,
    /// Normalized response body. `None` means the record is absent per
    /// the active dialect's absence signal.
    pub body: Option<Value>,
    /// Server-reported elapsed milliseconds, when the configured timing
    /// header was present and parseable.
    pub server_time_ms: Option<f64>,
}

/// The operations a lifecycle needs from the service under test.
#[async_trait::async_trait]
pub trait ContentBackend: Send + Sync {
    /// `POST /content` with the record body; expects 201.
    async fn create(&self, record: &NewRecord) -> Result<BackendReply, HarnessError>;

    /// Fetch one record by id. Absence is `Ok` with `body: None`.
    async fn fetch(&self, id: &str) -> Result<BackendReply, HarnessError>;

    /// Update one record by id with the given body.
    async fn update(&self, id: &str, body: &Value) -> Result<BackendReply, HarnessError>;

    /// Delete one record by id.
    async fn delete(&self, id: &str) -> Result<BackendReply, HarnessError>;
}

/// Build the backend named by the configuration. Called once at startup.
pub fn build_backend(config: &HarnessConfig) -> Result<Arc<dyn ContentBackend>, HarnessError> {
    let executor = HttpExecutor::new(config)?;
    if config.filter_query {
        Ok(Arc::new(FilterQueryBackend { executor }))
    } else {
        Ok(Arc::new(RestBackend { executor }))
    }
}

/// Shared HTTP plumbing: header forwarding, timing-header extraction and
/// exchange capture for diagnostics.
struct HttpExecutor {
    client: reqwest::Client,
    base_url: String,
    extra_headers: HeaderMap,
    response_time_header: String,
}

struct RawReply {
    status: StatusCode,
    body: Option<Value>,
    server_time_ms: Option<f64>,
}

impl HttpExecutor {
    fn new(config: &HarnessConfig) -> Result<Self, HarnessError> {
        let mut extra_headers = HeaderMap::new();
        for (name, value) in &config.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| HarnessError::Config(format!("invalid header name {name:?}: {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| HarnessError::Config(format!("invalid header value for {name}: {e}")))?;
            extra_headers.insert(name, value);
        }

        Ok(Self {
            client: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            extra_headers,
            response_time_header: config.response_time_header.clone(),
        })
    }

    /// Dispatch one request and capture the full exchange.
    ///
    /// Statuses outside `accepted` become transport failures carrying the
    /// exchange context; everything the harness imposes beyond that is
    /// whatever reqwest's defaults enforce (no extra timeout).
    async fn send(
        &self,
        method: Method,
        path_and_query: &str,
        body: Option<&Value>,
        accepted: &[StatusCode],
    ) -> Result<RawReply, HarnessError> {
        let url = format!("{}{}", self.base_url, path_and_query);
        let request_body = body.map(|b| b.to_string());

        let mut request = self
            .client
            .request(method.clone(), &url)
            .headers(self.extra_headers.clone());
        if let Some(body) = body {
            request = request.json(body);
        }

        let exchange = |status: Option<u16>, response_body: Option<String>| {
            Box::new(Exchange {
                method: method.to_string(),
                url: url.clone(),
                request_headers: self
                    .extra_headers
                    .iter()
                    .map(|(k, v)| {
                        (
                            k.to_string(),
                            v.to_str().unwrap_or("<non-ascii>").to_string(),
                        )
                    })
                    .collect(),
                request_body: request_body.clone(),
                status,
                response_body,
            })
        };

        let response = request.send().await.map_err(|e| HarnessError::Transport {
            detail: format!("request failed: {e}"),
            exchange: exchange(None, None),
        })?;

        let status = response.status();
        let server_time_ms = response
            .headers()
            .get(&self.response_time_header)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_server_time);

        let body_text = response.text().await.map_err(|e| HarnessError::Transport {
            detail: format!("failed to read response body: {e}"),
            exchange: exchange(Some(status.as_u16()), None),
        })?;

        if !accepted.contains(&status) {
            return Err(HarnessError::Transport {
                detail: format!("unexpected status {status}"),
                exchange: exchange(Some(status.as_u16()), Some(body_text)),
            });
        }

        let body = if body_text.trim().is_empty() {
            None
        } else {
            Some(
                serde_json::from_str(&body_text).map_err(|e| HarnessError::MalformedResponse {
                    url: url.clone(),
                    detail: format!("invalid JSON body: {e}"),
                })?,
            )
        };

        Ok(RawReply {
            status,
            body,
            server_time_ms,
        })
    }
}

/// Parse a server-timing header value: either a bare number of
/// milliseconds or one with an `ms` suffix, e.g. `"12.34ms"`.
fn parse_server_time(value: &str) -> Option<f64> {
    value.trim().trim_end_matches("ms").trim().parse().ok()
}

/// Direct-resource dialect: `GET/PUT/DELETE /content/{id}`, single-object
/// envelope, 404 signals absence.
struct RestBackend {
    executor: HttpExecutor,
}

#[async_trait::async_trait]
impl ContentBackend for RestBackend {
    async fn create(&self, record: &NewRecord) -> Result<BackendReply, HarnessError> {
        let body = serde_json::to_value(record).map_err(|e| HarnessError::MalformedResponse {
            url: "/content".to_string(),
            detail: format!("failed to serialize record: {e}"),
        })?;
        let reply = self
            .executor
            .send(
                Method::POST,
                "/content",
                Some(&body),
                &[StatusCode::CREATED, StatusCode::OK],
            )
            .await?;
        Ok(object_reply(reply))
    }

    async fn fetch(&self, id: &str) -> Result<BackendReply, HarnessError> {
        let reply = self
            .executor
            .send(
                Method::GET,
                &format!("/content/{id}"),
                None,
                &[StatusCode::OK, StatusCode::NOT_FOUND],
            )
            .await?;
        if reply.status == StatusCode::NOT_FOUND {
            return Ok(BackendReply {
                status: reply.status.as_u16(),
                body: None,
                server_time_ms: reply.server_time_ms,
            });
        }
        Ok(object_reply(reply))
    }

    async fn update(&self, id: &str, body: &Value) -> Result<BackendReply, HarnessError> {
        let reply = self
            .executor
            .send(
                Method::PUT,
                &format!("/content/{id}"),
                Some(body),
                &[StatusCode::OK],
            )
            .await?;
        Ok(object_reply(reply))
    }

    async fn delete(&self, id: &str) -> Result<BackendReply, HarnessError> {
        let reply = self
            .executor
            .send(
                Method::DELETE,
                &format!("/content/{id}"),
                None,
                &[StatusCode::NO_CONTENT, StatusCode::OK],
            )
            .await?;
        Ok(BackendReply {
            status: reply.status.as_u16(),
            body: reply.body,
            server_time_ms: reply.server_time_ms,
        })
    }
}

/// Filter-query dialect: `GET/PATCH/DELETE /content?id=eq.{id}`, array
/// envelope with element 0 extracted, empty array signals absence.
struct FilterQueryBackend {
    executor: HttpExecutor,
}

#[async_trait::async_trait]
impl ContentBackend for FilterQueryBackend {
    async fn create(&self, record: &NewRecord) -> Result<BackendReply, HarnessError> {
        let body = serde_json::to_value(record).map_err(|e| HarnessError::MalformedResponse {
            url: "/content".to_string(),
            detail: format!("failed to serialize record: {e}"),
        })?;
        let reply = self
            .executor
            .send(
                Method::POST,
                "/content",
                Some(&body),
                &[StatusCode::CREATED, StatusCode::OK],
            )
            .await?;
        // Some filter-query servers wrap even the create response in an
        // array; accept both envelopes.
        Ok(first_element_reply(reply))
    }

    async fn fetch(&self, id: &str) -> Result<BackendReply, HarnessError> {
        let reply = self
            .executor
            .send(
                Method::GET,
                &format!("/content?id=eq.{id}"),
                None,
                &[StatusCode::OK],
            )
            .await?;
        Ok(first_element_reply(reply))
    }

    async fn update(&self, id: &str, body: &Value) -> Result<BackendReply, HarnessError> {
        let reply = self
            .executor
            .send(
                Method::PATCH,
                &format!("/content?id=eq.{id}"),
                Some(body),
                &[StatusCode::OK, StatusCode::NO_CONTENT],
            )
            .await?;
        Ok(first_element_reply(reply))
    }

    async fn delete(&self, id: &str) -> Result<BackendReply, HarnessError> {
        let reply = self
            .executor
            .send(
                Method::DELETE,
                &format!("/content?id=eq.{id}"),
                None,
                &[StatusCode::OK, StatusCode::NO_CONTENT],
            )
            .await?;
        Ok(BackendReply {
            status: reply.status.as_u16(),
            body: None,
            server_time_ms: reply.server_time_ms,
        })
    }
}

fn object_reply(reply: RawReply) -> BackendReply {
    BackendReply {
        status: reply.status.as_u16(),
        body: reply.body,
        server_time_ms: reply.server_time_ms,
    }
}

/// Normalize an array envelope to its first element; an empty array (or
/// a bare object from servers that skip the envelope) maps accordingly.
fn first_element_reply(reply: RawReply) -> BackendReply {
    let body = match reply.body {
        Some(Value::Array(items)) => items.into_iter().next(),
        other => other,
    };
    BackendReply {
        status: reply.status.as_u16(),
        body,
        server_time_ms: reply.server_time_ms,
    }
}
