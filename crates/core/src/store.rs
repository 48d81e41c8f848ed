// Copyright 2025 Content API Contributors
// SPDX-License-Identifier: Apache-2.0

//! The storage contract implemented by every engine.

use crate::{Content, Result};

/// CRUD operations over content records.
///
/// Implementations must be safe for concurrent use; the HTTP service calls
/// them from many request handlers at once. A missing record is `Ok(None)`
/// on reads and [`crate::Error::NotFound`] on update/delete.
#[async_trait::async_trait]
pub trait ContentStore: Send + Sync {
    /// Persist a new record. The record has already been validated and
    /// carries its final id and timestamps.
    async fn create(&self, content: &Content) -> Result<()>;

    /// Fetch a record by id.
    async fn get_by_id(&self, id: &str) -> Result<Option<Content>>;

    /// List all records.
    async fn list(&self) -> Result<Vec<Content>>;

    /// Replace an existing record. Fails with `NotFound` when absent.
    async fn update(&self, content: &Content) -> Result<()>;

    /// Delete a record by id. Fails with `NotFound` when absent.
    async fn delete(&self, id: &str) -> Result<()>;
}
