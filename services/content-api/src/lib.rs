// Copyright 2025 Content API Contributors
// SPDX-License-Identifier: Apache-2.0

//! HTTP CRUD service over content records.
//!
//! Exposes `POST/GET/PUT/DELETE /content` backed by whichever storage
//! engine the environment selects, with schema validation on request
//! bodies and request-id / response-time middleware on every route.

pub mod middleware;
pub mod routes;
pub mod state;

pub use state::AppState;

use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Build the service router with all routes and middleware applied.
pub fn build_router(state: Arc<AppState>) -> Router {
    routes::routes()
        .layer(axum::middleware::from_fn(middleware::timing::timing_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
