// Copyright 2025 Content API Contributors
// SPDX-License-Identifier: Apache-2.0

//! SQLite storage engine.

use chrono::{DateTime, Utc};
use content_api_core::{Content, ContentStatus, ContentStore, Error, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS content (
        id         TEXT PRIMARY KEY,
        title      TEXT NOT NULL,
        body       TEXT NOT NULL,
        author     TEXT NOT NULL,
        status     TEXT NOT NULL,
        data       TEXT NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
";

/// File-backed store using sqlx with WAL journaling.
///
/// `data` is persisted as a JSON text column.
#[derive(Debug, Clone)]
pub struct SqliteContentStore {
    pool: SqlitePool,
}

impl SqliteContentStore {
    /// Open (creating if necessary) the database at `url` and ensure the
    /// `content` table exists.
    pub async fn connect(url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| Error::storage(format!("invalid sqlite url: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new()
            .connect_with(options)
            .await
            .map_err(storage_err)?;

        sqlx::query(SCHEMA).execute(&pool).await.map_err(storage_err)?;

        Ok(Self { pool })
    }
}

#[async_trait::async_trait]
impl ContentStore for SqliteContentStore {
    async fn create(&self, content: &Content) -> Result<()> {
        sqlx::query(
            "INSERT INTO content (id, title, body, author, status, data, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&content.id)
        .bind(&content.title)
        .bind(&content.body)
        .bind(&content.author)
        .bind(content.status.as_str())
        .bind(encode_data(content)?)
        .bind(content.created_at.to_rfc3339())
        .bind(content.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;
        Ok(())
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Content>> {
        let row = sqlx::query(
            "SELECT id, title, body, author, status, data, created_at, updated_at
             FROM content WHERE id = ?",
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
             SET title = ?, body = ?, author = ?, status = ?, data = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(&content.title)
        .bind(&content.body)
        .bind(&content.author)
        .bind(content.status.as_str())
        .bind(encode_data(content)?)
        .bind(content.updated_at.to_rfc3339())
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
        let result = sqlx::query("DELETE FROM content WHERE id = ?")
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

fn encode_data(content: &Content) -> Result<String> {
    serde_json::to_string(&content.data).map_err(|e| Error::storage(e.to_string()))
}

fn row_to_content(row: SqliteRow) -> Result<Content> {
    let status: String = row.try_get("status").map_err(storage_err)?;
    let data: String = row.try_get("data").map_err(storage_err)?;
    let created_at: String = row.try_get("created_at").map_err(storage_err)?;
    let updated_at: String = row.try_get("updated_at").map_err(storage_err)?;

    Ok(Content {
        id: row.try_get("id").map_err(storage_err)?,
        title: row.try_get("title").map_err(storage_err)?,
        body: row.try_get("body").map_err(storage_err)?,
        author: row.try_get("author").map_err(storage_err)?,
        status: parse_status(&status)?,
        data: serde_json::from_str(&data).map_err(|e| Error::storage(e.to_string()))?,
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
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

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| Error::storage(format!("bad timestamp in database: {e}")))
}
