// Copyright 2025 Content API Contributors
// SPDX-License-Identifier: Apache-2.0

//! In-memory storage engine.

use content_api_core::{Content, ContentStore, Error, Result};
use dashmap::DashMap;

/// Concurrent in-process store keyed by record id.
///
/// Backed by a [`DashMap`], so CRUD operations on unrelated ids never
/// serialize against each other.
#[derive(Debug, Default)]
pub struct MemoryContentStore {
    records: DashMap<String, Content>,
}

impl MemoryContentStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait::async_trait]
impl ContentStore for MemoryContentStore {
    async fn create(&self, content: &Content) -> Result<()> {
        self.records.insert(content.id.clone(), content.clone());
        Ok(())
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Content>> {
        Ok(self.records.get(id).map(|entry| entry.value().clone()))
    }

    async fn list(&self) -> Result<Vec<Content>> {
        Ok(self
            .records
            .iter()
            .map(|entry| entry.value().clone())
            .collect())
    }

    async fn update(&self, content: &Content) -> Result<()> {
        if !self.records.contains_key(&content.id) {
            return Err(Error::not_found(&content.id));
        }
        self.records.insert(content.id.clone(), content.clone());
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.records
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| Error::not_found(id))
    }
}
