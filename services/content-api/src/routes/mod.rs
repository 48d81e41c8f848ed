// Copyright 2025 Content API Contributors
// SPDX-License-Identifier: Apache-2.0

//! Route handlers for the Content API.

pub mod content;
pub mod health;

use crate::AppState;
use axum::Router;
use std::sync::Arc;

/// All service routes, unmerged from middleware.
pub fn routes() -> Router<Arc<AppState>> {
    health::routes().merge(content::routes())
}
