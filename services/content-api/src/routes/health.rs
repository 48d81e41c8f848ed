// Copyright 2025 Content API Contributors
// SPDX-License-Identifier: Apache-2.0

//! Hello and health endpoints.

use axum::{routing::get, Json, Router};
use chrono::Utc;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(hello))
        .route("/health", get(health))
}

async fn hello() -> Json<Value> {
    Json(json!({ "message": "Hello World!" }))
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}
