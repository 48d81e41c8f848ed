// Copyright 2025 Content API Contributors
// SPDX-License-Identifier: Apache-2.0

//! Request logging and timing middleware.

pub mod timing;

pub use timing::timing_middleware;
