// Copyright 2025 Content API Contributors
// SPDX-License-Identifier: Apache-2.0

//! Synthetic record generation.
//!
//! Each lifecycle generates one fresh record whose title and body embed a
//! run id unique across the whole run: batch index, in-batch index and a
//! random suffix. Records are never reused across lifecycles.

use chrono::{DateTime, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const SUFFIX_LEN: usize = 12;

/// Build the unique run identifier for one lifecycle.
pub fn run_id(batch_index: usize, index: usize) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SUFFIX_LEN)
        .map(char::from)
        .collect();
    format!("{batch_index}-{index}-{}", suffix.to_lowercase())
}

/// The record body submitted on create.
#[derive(Debug, Clone, Serialize)]
pub struct NewRecord {
    /// Client-chosen id; omitted so the server stays authoritative.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Title embedding the run id.
    pub title: String,
    /// Body text embedding the run id.
    pub body: String,
    /// Fixed synthetic author.
    pub author: String,
    /// Workflow status, `draft` on create.
    pub status: String,
    /// Correlation markers (`run_id`, `created_at`) when the data-field
    /// option is enabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Map<String, Value>>,
}

impl NewRecord {
    /// Generate the synthetic record for one lifecycle.
    ///
    /// `created_at` is the lifecycle's start timestamp; it is embedded in
    /// `data.created_at` (RFC 3339) and must round-trip unchanged through
    /// create + read.
    pub fn generate(run_id: &str, created_at: DateTime<Utc>, with_data: bool) -> Self {
        let data = with_data.then(|| {
            let mut map = Map::new();
            map.insert("run_id".to_string(), Value::String(run_id.to_string()));
            map.insert(
                "created_at".to_string(),
                Value::String(created_at.to_rfc3339()),
            );
            map
        });

        Self {
            id: None,
            title: format!("Smoke Test Content {run_id}"),
            body: format!("This is smoke test content number {run_id}"),
            author: "Smoke Tester".to_string(),
            status: "draft".to_string(),
            data,
        }
    }

    /// The title this record carries after the update phase.
    pub fn updated_title(&self) -> String {
        format!("{} (updated)", self.title)
    }

    /// The full update body: the original record with the updated title
    /// and `published` status.
    pub fn update_body(&self) -> Value {
        let mut body = serde_json::to_value(self).unwrap_or_else(|_| Value::Object(Map::new()));
        if let Value::Object(ref mut map) = body {
            map.insert("title".to_string(), Value::String(self.updated_title()));
            map.insert("status".to_string(), Value::String("published".to_string()));
        }
        body
    }
}

/// A record as returned by the service.
#[derive(Debug, Clone, Deserialize)]
pub struct StoredRecord {
    /// Server-assigned identifier.
    pub id: String,
    /// Stored title.
    pub title: String,
    /// Stored body text.
    pub body: String,
    /// Stored author.
    pub author: String,
    /// Stored workflow status.
    pub status: String,
    /// Free-form data object; empty when the server stored none.
    #[serde(default)]
    pub data: Map<String, Value>,
    /// Server-assigned creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Server-assigned last-modified timestamp.
    pub updated_at: DateTime<Utc>,
}

impl StoredRecord {
    /// Parse a stored record out of a response body.
    pub fn from_value(url: &str, value: &Value) -> Result<Self, crate::HarnessError> {
        serde_json::from_value(value.clone()).map_err(|e| crate::HarnessError::MalformedResponse {
            url: url.to_string(),
            detail: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_id_embeds_batch_and_index() {
        let id = run_id(3, 17);
        assert!(id.starts_with("3-17-"));
        let suffix = id.strip_prefix("3-17-").unwrap();
        assert_eq!(suffix.len(), SUFFIX_LEN);
        assert_eq!(suffix, suffix.to_lowercase());
    }

    #[test]
    fn test_run_ids_do_not_collide() {
        let a = run_id(0, 0);
        let b = run_id(0, 0);
        assert_ne!(a, b);
    }

    #[test]
    fn test_generate_embeds_run_id_in_title_and_body() {
        let record = NewRecord::generate("0-1-abcdef", Utc::now(), false);
        assert_eq!(record.title, "Smoke Test Content 0-1-abcdef");
        assert_eq!(record.body, "This is smoke test content number 0-1-abcdef");
        assert_eq!(record.author, "Smoke Tester");
        assert_eq!(record.status, "draft");
        assert!(record.data.is_none());
        assert!(record.id.is_none());
    }

    #[test]
    fn test_generate_attaches_correlation_markers() {
        let now = Utc::now();
        let record = NewRecord::generate("0-0-x", now, true);
        let data = record.data.as_ref().unwrap();
        assert_eq!(data.get("run_id").unwrap(), "0-0-x");
        assert_eq!(data.get("created_at").unwrap(), &Value::String(now.to_rfc3339()));
    }

    #[test]
    fn test_serialization_omits_absent_optionals() {
        let record = NewRecord::generate("0-0-x", Utc::now(), false);
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("id").is_none());
        assert!(json.get("data").is_none());
    }

    #[test]
    fn test_update_body_overrides_title_and_status() {
        let record = NewRecord::generate("0-0-x", Utc::now(), true);
        let body = record.update_body();
        assert_eq!(
            body["title"],
            Value::String("Smoke Test Content 0-0-x (updated)".to_string())
        );
        assert_eq!(body["status"], Value::String("published".to_string()));
        assert_eq!(body["author"], Value::String("Smoke Tester".to_string()));
        assert!(body["data"]["run_id"].is_string());
    }
}
