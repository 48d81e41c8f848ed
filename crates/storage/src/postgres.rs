// Copyright 2025 Content API Contributors
// SPDX-License-Identifier: Apache-2.0

//! PostgreSQL storage engine.

use chrono::{DateTime, Utc};
use content_api_core::{Content, ContentStatus, ContentStore, Error, Result};
use serde_json::{Map, Value};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use std::time::Duration;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS content (
        id         TEXT PRIMARY KEY,
        title      TEXT NOT NULL,
        body       TEXT NOT NULL,
        author     TEXT NOT NULL,
        status     TEXT NOT NULL,
        data       JSONB NOT NULL DEFAULT '{}',
        created_at TIMESTAMPTZ NOT NULL,
        updated_at TIMESTAMPTZ NOT NULL
    )
";

/// PostgreSQL store tuned for many concurrent request handlers.
///
/// `data` is a JSONB column; timestamps are TIMESTAMPTZ.
#[derive(Debug, Clone)]
pub struct PostgresContentStore {
    pool: PgPool,
}

impl PostgresContentStore {
    /// Connect with the given pool bounds and ensure the `content`
    /// table exists.
    pub async fn connect(url: &str, max_conns: u32, min_conns: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_conns)
            .min_connections(min_conns)
            .max_lifetime(Duration::from_secs(3600))
            .idle_timeout(Duration::from_secs(1800))
            .connect(url)
            .await
            .map_err(storage_err)?;

        sqlx::query(SCHEMA).execute(&pool).await.map_err(storage_err)?;

        Ok(Self { pool })
    }
}

#[async_trait::async_trait]
impl ContentStore for PostgresContentStore {
    async fn create(&self, content: &Content) -> Result<()> {
        sqlx::query(
            "INSERT INTO content (id, title, body, author, status, data, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(&content.id)
        .bind(&content.title)
        .bind(&content.body)
        .bind(&content.author)
        .bind(content.status.as_str())
        .bind(Json(&content.data))
        .bind(content.created_at)
        .bind(content.updated_at)
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;
        Ok(())
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Content>> {
        let row = sqlx::query(
            "SELECT id, title, body, author, status, data, created_at, updated_at
             FROM content WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_err)?;

        row.map(row_to_content).transpose()
    }

    async fn list(&self) -> Result<Vec<Content>> {
        let rows = sqlx::query(
            "SELECT id, title, body, author, status, data, created_at, updated_at
             FROM content ORDER BY created_at DESC LIMIT 100",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(storage_err)?;

        rows.into_iter().map(row_to_content).collect()
    }

    async fn update(&self, content: &Content) -> Result<()> {
        let result = sqlx::query(
            "UPDATE content
             SET title = $1, body = $2, author = $3, status = $4, data = $5, updated_at = $6
             WHERE id = $7",
        )
        .bind(&content.title)
        .bind(&content.body)
        .bind(&content.author)
        .bind(content.status.as_str())
        .bind(Json(&content.data))
        .bind(content.updated_at)
        .bind(&content.id)
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        if result.rows_affected() == 0 {
            return Err(Error::not_found(&content.id));
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM content WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(storage_err)?;

        if result.rows_affected() == 0 {
            return Err(Error::not_found(id));
        }
        Ok(())
    }
}

fn storage_err(e: sqlx::Error) -> Error {
    Error::storage(e.to_string())
}

fn row_to_content(row: PgRow) -> Result<Content> {
    let status: String = row.try_get("status").map_err(storage_err)?;
    let data: Json<Map<String, Value>> = row.try_get("data").map_err(storage_err)?;
    let created_at: DateTime<Utc> = row.try_get("created_at").map_err(storage_err)?;
    let updated_at: DateTime<Utc> = row.try_get("updated_at").map_err(storage_err)?;

    Ok(Content {
        id: row.try_get("id").map_err(storage_err)?,
        title: row.try_get("title").map_err(storage_err)?,
        body: row.try_get("body").map_err(storage_err)?,
        author: row.try_get("author").map_err(storage_err)?,
        status: parse_status(&status)?,
        data: data.0,
        created_at,
        updated_at,
    })
}

fn parse_status(value: &str) -> Result<ContentStatus> {
    match value {
        "draft" => Ok(ContentStatus::Draft),
        "published" => Ok(ContentStatus::Published),
        "archived" => Ok(ContentStatus::Archived),
        other => Err(Error::storage(format!("unknown status in database: {other}"))),
    }
}
