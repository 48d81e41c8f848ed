// Copyright 2025 Content API Contributors
// SPDX-License-Identifier: Apache-2.0

//! Shared application state.

use content_api_core::ContentStore;
use std::sync::Arc;

/// State shared by all request handlers.
pub struct AppState {
    /// The storage engine selected at startup.
    pub store: Arc<dyn ContentStore>,
}

impl AppState {
    /// Wrap a storage engine in application state.
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self { store }
    }
}
