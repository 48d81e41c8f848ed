// Copyright 2025 Content API Contributors
// SPDX-License-Identifier: Apache-2.0

//! Latency statistics over millisecond samples.

use serde::Serialize;

/// Summary statistics over one series of samples.
///
/// On an empty series `count` is 0 and every other field is NaN; NaN
/// serializes as JSON `null`, so emitting an empty summary never panics.
/// Callers must not assume finite values without checking `count`.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Summary {
    /// Number of samples.
    pub count: usize,
    /// Smallest sample.
    pub min: f64,
    /// Largest sample.
    pub max: f64,
    /// Arithmetic mean.
    pub avg: f64,
    /// 90th percentile.
    pub p90: f64,
    /// 95th percentile.
    pub p95: f64,
    /// 99th percentile.
    pub p99: f64,
}

/// Summarize a series of millisecond samples.
///
/// Sorts internally, so the result is independent of sample order.
/// The percentile index is `floor(count * p)`, clamped to the last
/// element so that small series (where the floor lands exactly on
/// `count`) stay in bounds.
pub fn summarize(samples: &[f64]) -> Summary {
    if samples.is_empty() {
        return Summary {
            count: 0,
            min: f64::NAN,
            max: f64::NAN,
            avg: f64::NAN,
            p90: f64::NAN,
            p95: f64::NAN,
            p99: f64::NAN,
        };
    }

    let mut sorted = samples.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let count = sorted.len();
    let sum: f64 = sorted.iter().sum();

    Summary {
        count,
        min: sorted[0],
        max: sorted[count - 1],
        avg: sum / count as f64,
        p90: percentile(&sorted, 0.90),
        p95: percentile(&sorted, 0.95),
        p99: percentile(&sorted, 0.99),
    }
}

fn percentile(sorted: &[f64], p: f64) -> f64 {
    let index = (sorted.len() as f64 * p).floor() as usize;
    sorted[index.min(sorted.len() - 1)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_series_is_count_zero_with_nan_stats() {
        let summary = summarize(&[]);
        assert_eq!(summary.count, 0);
        assert!(summary.min.is_nan());
        assert!(summary.max.is_nan());
        assert!(summary.avg.is_nan());
        assert!(summary.p99.is_nan());
    }

    #[test]
    fn test_empty_series_serializes_without_panic() {
        let json = serde_json::to_string(&summarize(&[])).unwrap();
        assert!(json.contains("\"count\":0"));
        assert!(json.contains("null"));
    }

    #[test]
    fn test_single_sample_collapses_all_stats() {
        let summary = summarize(&[42.0]);
        assert_eq!(summary.count, 1);
        assert_eq!(summary.min, 42.0);
        assert_eq!(summary.max, 42.0);
        assert_eq!(summary.avg, 42.0);
        assert_eq!(summary.p90, 42.0);
        assert_eq!(summary.p95, 42.0);
        assert_eq!(summary.p99, 42.0);
    }

    #[test]
    fn test_ordering_invariants_hold() {
        let samples: Vec<f64> = (1..=1000).map(|n| n as f64).collect();
        let summary = summarize(&samples);

        assert!(summary.min <= summary.avg && summary.avg <= summary.max);
        assert!(summary.min <= summary.p90);
        assert!(summary.p90 <= summary.p95);
        assert!(summary.p95 <= summary.p99);
        assert!(summary.p99 <= summary.max);
    }

    #[test]
    fn test_percentiles_use_floor_indexing() {
        let samples: Vec<f64> = (0..10).map(|n| n as f64).collect();
        let summary = summarize(&samples);
        // floor(10 * 0.9) = 9, the last element.
        assert_eq!(summary.p90, 9.0);
        assert_eq!(summary.p99, 9.0);
    }

    #[test]
    fn test_order_independence() {
        let a = summarize(&[3.0, 1.0, 2.0]);
        let b = summarize(&[1.0, 2.0, 3.0]);
        assert_eq!(a.min, b.min);
        assert_eq!(a.max, b.max);
        assert_eq!(a.avg, b.avg);
        assert_eq!(a.p95, b.p95);
    }

    #[test]
    fn test_mean_of_known_series() {
        let summary = summarize(&[10.0, 20.0, 30.0]);
        assert!((summary.avg - 20.0).abs() < f64::EPSILON);
    }
}
