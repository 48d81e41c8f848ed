// Copyright 2025 Content API Contributors
// SPDX-License-Identifier: Apache-2.0

//! Storage engines for the Content API.
//!
//! Three engines implement [`content_api_core::ContentStore`]: an in-memory
//! map for tests and throwaway runs, SQLite for single-node deployments, and
//! PostgreSQL for everything else. The engine is selected once at startup
//! from [`DatabaseConfig`].

#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod config;
pub mod memory;
pub mod postgres;
pub mod sqlite;

pub use config::{DatabaseConfig, DatabaseEngine};
pub use memory::MemoryContentStore;
pub use postgres::PostgresContentStore;
pub use sqlite::SqliteContentStore;

use content_api_core::{ContentStore, Result};
use std::sync::Arc;

/// Connect the engine named by the configuration.
pub async fn connect(config: &DatabaseConfig) -> Result<Arc<dyn ContentStore>> {
    match config.engine {
        DatabaseEngine::Memory => {
            tracing::info!("Using in-memory storage engine");
            Ok(Arc::new(MemoryContentStore::new()))
        }
        DatabaseEngine::Sqlite => {
            tracing::info!(url = %config.url, "Using SQLite storage engine");
            Ok(Arc::new(SqliteContentStore::connect(&config.url).await?))
        }
        DatabaseEngine::Postgres => {
            tracing::info!(
                max_connections = config.max_conns,
                min_connections = config.min_conns,
                "Using PostgreSQL storage engine"
            );
            Ok(Arc::new(
                PostgresContentStore::connect(&config.url, config.max_conns, config.min_conns)
                    .await?,
            ))
        }
    }
}
