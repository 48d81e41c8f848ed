// Copyright 2025 Content API Contributors
// SPDX-License-Identifier: Apache-2.0

//! The content record and its lifecycle status.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Publication status of a content record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentStatus {
    /// Not yet published. The default for new records.
    Draft,
    /// Publicly visible.
    Published,
    /// Retired from publication.
    Archived,
}

impl Default for ContentStatus {
    fn default() -> Self {
        ContentStatus::Draft
    }
}

impl ContentStatus {
    /// The lowercase wire name of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentStatus::Draft => "draft",
            ContentStatus::Published => "published",
            ContentStatus::Archived => "archived",
        }
    }
}

/// A stored content record.
///
/// `data` is an opaque mapping carried through storage unchanged; clients
/// use it for correlation markers that must round-trip exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    /// Unique identifier. Lowercase UUID when server-assigned.
    pub id: String,
    /// Title, non-empty.
    pub title: String,
    /// Body text, non-empty.
    pub body: String,
    /// Author name, non-empty.
    pub author: String,
    /// Publication status.
    #[serde(default)]
    pub status: ContentStatus,
    /// Opaque client-supplied payload.
    #[serde(default)]
    pub data: Map<String, Value>,
    /// Creation timestamp, set by the server.
    pub created_at: DateTime<Utc>,
    /// Last-update timestamp, set by the server.
    pub updated_at: DateTime<Utc>,
}

impl Content {
    /// Build a new record with server-side id and timestamps.
    ///
    /// When `id` is `None` a lowercase UUID v4 is assigned, making the
    /// server authoritative; a supplied id is used verbatim.
    pub fn new(
        id: Option<String>,
        title: impl Into<String>,
        body: impl Into<String>,
        author: impl Into<String>,
        status: ContentStatus,
        data: Map<String, Value>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: id.unwrap_or_else(|| Uuid::new_v4().to_string().to_lowercase()),
            title: title.into(),
            body: body.into(),
            author: author.into(),
            status,
            data,
            created_at: now,
            updated_at: now,
        }
    }

    /// Validate the domain invariants: title, body and author are non-empty.
    pub fn validate(&self) -> crate::Result<()> {
        if self.title.is_empty() {
            return Err(crate::Error::invalid_input("title must not be empty"));
        }
        if self.body.is_empty() {
            return Err(crate::Error::invalid_input("body must not be empty"));
        }
        if self.author.is_empty() {
            return Err(crate::Error::invalid_input("author must not be empty"));
        }
        Ok(())
    }
}
