// Copyright 2025 Content API Contributors
// SPDX-License-Identifier: Apache-2.0

//! Shared error type for the Content API crates.

use thiserror::Error;

/// Errors surfaced by the domain and storage layers.
#[derive(Debug, Error)]
pub enum Error {
    /// No content record exists for the given id.
    #[error("content not found: {id}")]
    NotFound {
        /// The identifier that was looked up.
        id: String,
    },

    /// A request carried a value that fails domain validation.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A storage engine failed to execute an operation.
    #[error("storage error: {0}")]
    Storage(String),
}

impl Error {
    /// Construct a [`Error::NotFound`] for the given id.
    pub fn not_found(id: impl Into<String>) -> Self {
        Error::NotFound { id: id.into() }
    }

    /// Construct an [`Error::InvalidInput`] with the given message.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Error::InvalidInput(msg.into())
    }

    /// Construct an [`Error::Storage`] with the given message.
    pub fn storage(msg: impl Into<String>) -> Self {
        Error::Storage(msg.into())
    }
}

/// Result alias used across the Content API crates.
pub type Result<T> = std::result::Result<T, Error>;
