//! Prometheus metrics for message composition.
//!
//! This module provides metrics for monitoring rendering and delivery:
//! - Render metrics (outcomes, latency)
//! - Template cache metrics (hits, misses, failed loads)
//! - Send metrics (sent, rejected, failed)

mod helpers;

pub use helpers::{encode_metrics, CacheMetrics, RenderMetrics, SendMetrics};

use lazy_static::lazy_static;
use prometheus::{
    register_histogram, register_int_counter_vec, Histogram, IntCounterVec,
};

/// Prefix for all metrics
const METRIC_PREFIX: &str = "letterpress";

lazy_static! {
    // ============================================================================
    // Render Metrics
    // ============================================================================

    /// Total render calls by outcome
    pub static ref RENDERS_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_renders_total", METRIC_PREFIX),
        "Total render calls",
        &["outcome"]
    ).unwrap();

    /// Render latency (template lookup through layout execution)
    pub static ref RENDER_DURATION: Histogram = register_histogram!(
        format!("{}_render_duration_seconds", METRIC_PREFIX),
        "Render latency in seconds",
        vec![0.00005, 0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5]
    ).unwrap();

    // ============================================================================
    // Cache Metrics
    // ============================================================================

    /// Template and layout cache lookups by kind and result
    pub static ref CACHE_LOOKUPS_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_template_cache_lookups_total", METRIC_PREFIX),
        "Template cache lookups",
        &["kind", "result"]
    ).unwrap();

    /// Failed template or layout loads (never cached)
    pub static ref CACHE_LOAD_FAILURES_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_template_cache_load_failures_total", METRIC_PREFIX),
        "Template cache loads that failed",
        &["kind"]
    ).unwrap();

    // ============================================================================
    // Send Metrics
    // ============================================================================

    /// Emails handed to the sender, by outcome
    pub static ref EMAILS_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_emails_sent_total", METRIC_PREFIX),
        "Emails processed by the mailer",
        &["outcome"]
    ).unwrap();
}
