// Copyright 2025 Content API Contributors
// SPDX-License-Identifier: Apache-2.0

//! Shared domain types for the Content API.
//!
//! This crate defines the [`Content`] record, the [`ContentStore`] trait
//! implemented by every storage engine, and the shared [`Error`] type.
//! It carries no I/O of its own; engines live in `content-api-storage`
//! and the HTTP surface in the `content-api` service.

#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod content;
pub mod error;
pub mod store;

pub use content::{Content, ContentStatus};
pub use error::{Error, Result};
pub use store::ContentStore;
