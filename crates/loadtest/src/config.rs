// Copyright 2025 Content API Contributors
// SPDX-License-Identifier: Apache-2.0

//! Harness configuration.
//!
//! Every knob is an environment variable (with a matching CLI flag via
//! clap). Invalid values are rejected at parse time, before any batch
//! runs.

use clap::Parser;
use std::collections::BTreeMap;

/// Minimum severity for harness log output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Everything, including per-batch progress lines.
    Debug,
    /// The final report and notable events.
    Info,
    /// Failed lifecycles only.
    Error,
}

impl LogLevel {
    /// The matching tracing level filter.
    pub fn as_filter(&self) -> tracing_subscriber::filter::LevelFilter {
        match self {
            LogLevel::Debug => tracing_subscriber::filter::LevelFilter::DEBUG,
            LogLevel::Info => tracing_subscriber::filter::LevelFilter::INFO,
            LogLevel::Error => tracing_subscriber::filter::LevelFilter::ERROR,
        }
    }
}

fn parse_log_level(value: &str) -> Result<LogLevel, String> {
    match value.to_uppercase().as_str() {
        "DEBUG" => Ok(LogLevel::Debug),
        "INFO" => Ok(LogLevel::Info),
        "ERROR" => Ok(LogLevel::Error),
        other => Err(format!("Invalid log level: {other}")),
    }
}

fn parse_headers(value: &str) -> Result<BTreeMap<String, String>, String> {
    let parsed: serde_json::Value = serde_json::from_str(value)
        .map_err(|e| format!("TEST_HEADERS must be a JSON object: {e}"))?;
    let object = parsed
        .as_object()
        .ok_or_else(|| "TEST_HEADERS must be a JSON object".to_string())?;

    let mut headers = BTreeMap::new();
    for (name, value) in object {
        let value = value
            .as_str()
            .ok_or_else(|| format!("TEST_HEADERS[{name}] must be a string"))?;
        headers.insert(name.clone(), value.to_string());
    }
    Ok(headers)
}

/// Configuration for one harness invocation.
#[derive(Debug, Clone, Parser)]
#[command(name = "content-loadtest", version, about = "CRUD load-test harness for the Content API")]
pub struct HarnessConfig {
    /// Base URL of the service under test.
    #[arg(long, env = "BASE_URL", default_value = "http://localhost:8888")]
    pub base_url: String,

    /// Total number of lifecycles to run.
    #[arg(long, env = "TEST_LIMIT", default_value_t = 10_000)]
    pub limit: usize,

    /// Lifecycles launched concurrently per batch.
    #[arg(long, env = "TEST_PARALLEL", default_value_t = 100)]
    pub parallel: usize,

    /// Attach `data.run_id` / `data.created_at` markers for round-trip checks.
    #[arg(long, env = "TEST_DATA_FIELD", default_value_t = true, action = clap::ArgAction::Set)]
    pub data_field: bool,

    /// Stop each lifecycle after the create phase, skipping all assertions.
    #[arg(long, env = "TEST_CREATE_ONLY", default_value_t = false, action = clap::ArgAction::Set)]
    pub create_only: bool,

    /// Address records with the PostgREST-style filter-query dialect
    /// (`/content?id=eq.{id}`) instead of `/content/{id}`.
    #[arg(long, env = "TEST_FILTER_QUERY", default_value_t = false, action = clap::ArgAction::Set)]
    pub filter_query: bool,

    /// JSON object of extra headers attached unmodified to every request.
    #[arg(long, env = "TEST_HEADERS", default_value = "{}", value_parser = parse_headers)]
    pub headers: BTreeMap<String, String>,

    /// Response header carrying the server-side elapsed time in milliseconds.
    #[arg(long, env = "RESPONSE_TIME_HEADER", default_value = "x-response-time")]
    pub response_time_header: String,

    /// How far in the past a server timestamp may be before the
    /// recent-timestamp assertion fails.
    #[arg(long, env = "TEST_TIMESTAMP_TOLERANCE_SECS", default_value_t = 10)]
    pub timestamp_tolerance_secs: u64,

    /// Minimum log severity: DEBUG, INFO or ERROR.
    #[arg(long, env = "LOG_LEVEL", default_value = "DEBUG", value_parser = parse_log_level)]
    pub log_level: LogLevel,
}

impl HarnessConfig {
    /// Parse from an explicit argv, bypassing the process environment.
    /// Used by tests.
    pub fn try_parse_from_args<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::try_parse_from(args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // try_parse_from still honors `env = ...` attributes, so the defaults
    // test must not see ambient harness variables.
    fn clear_harness_env() {
        for key in [
            "BASE_URL",
            "TEST_LIMIT",
            "TEST_PARALLEL",
            "TEST_DATA_FIELD",
            "TEST_CREATE_ONLY",
            "TEST_FILTER_QUERY",
            "TEST_HEADERS",
            "RESPONSE_TIME_HEADER",
            "TEST_TIMESTAMP_TOLERANCE_SECS",
            "LOG_LEVEL",
        ] {
            std::env::remove_var(key);
        }
    }

    #[test]
    fn test_defaults() {
        clear_harness_env();
        let config = HarnessConfig::try_parse_from_args(["content-loadtest"]).unwrap();
        assert_eq!(config.base_url, "http://localhost:8888");
        assert_eq!(config.limit, 10_000);
        assert_eq!(config.parallel, 100);
        assert!(config.data_field);
        assert!(!config.create_only);
        assert!(!config.filter_query);
        assert!(config.headers.is_empty());
        assert_eq!(config.response_time_header, "x-response-time");
        assert_eq!(config.timestamp_tolerance_secs, 10);
        assert_eq!(config.log_level, LogLevel::Debug);
    }

    #[test]
    fn test_log_level_is_case_insensitive() {
        assert_eq!(parse_log_level("info").unwrap(), LogLevel::Info);
        assert_eq!(parse_log_level("ERROR").unwrap(), LogLevel::Error);
    }

    #[test]
    fn test_invalid_log_level_is_fatal() {
        assert!(parse_log_level("verbose").is_err());
        let result = HarnessConfig::try_parse_from_args([
            "content-loadtest",
            "--log-level",
            "verbose",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_headers_parse_json_object() {
        let headers =
            parse_headers(r#"{"authorization": "Bearer abc", "x-tenant": "t1"}"#).unwrap();
        assert_eq!(headers.get("authorization").unwrap(), "Bearer abc");
        assert_eq!(headers.get("x-tenant").unwrap(), "t1");
    }

    #[test]
    fn test_headers_reject_non_object() {
        assert!(parse_headers("[]").is_err());
        assert!(parse_headers("not json").is_err());
        assert!(parse_headers(r#"{"n": 1}"#).is_err());
    }

    #[test]
    fn test_boolean_toggles_accept_explicit_values() {
        let config = HarnessConfig::try_parse_from_args([
            "content-loadtest",
            "--data-field",
            "false",
            "--create-only",
            "true",
            "--filter-query",
            "true",
        ])
        .unwrap();
        assert!(!config.data_field);
        assert!(config.create_only);
        assert!(config.filter_query);
    }
}
