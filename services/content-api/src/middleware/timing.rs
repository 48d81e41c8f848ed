// Copyright 2025 Content API Contributors
// SPDX-License-Identifier: Apache-2.0

//! Request-id and response-time middleware.
//!
//! Every response carries an `x-request-id` (lowercase UUID generated per
//! request) and an `x-response-time` header (`"<millis>ms"`, two decimal
//! places). The response-time header is the server-side timing signal the
//! load harness reads back.

use axum::{
    extract::Request,
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tracing::info;
use uuid::Uuid;

/// Header carrying the per-request id.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Header carrying the server-observed handling time in milliseconds.
pub const X_RESPONSE_TIME: &str = "x-response-time";

/// Middleware that stamps timing headers and logs the request lifecycle.
pub async fn timing_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let request_id = Uuid::new_v4().to_string().to_lowercase();
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    info!(
        method = %method,
        path = %path,
        request_id = %request_id,
        "HTTP request started"
    );

    let mut response = next.run(req).await;

    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
    let headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        headers.insert(HeaderName::from_static(X_REQUEST_ID), value);
    }
    if let Ok(value) = HeaderValue::from_str(&format!("{elapsed_ms:.2}ms")) {
        headers.insert(HeaderName::from_static(X_RESPONSE_TIME), value);
    }

    info!(
        method = %method,
        path = %path,
        status_code = response.status().as_u16(),
        duration_ms = elapsed_ms,
        request_id = %request_id,
        "HTTP request completed"
    );

    response
}
