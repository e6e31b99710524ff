//! Metrics helper structs for convenient metric recording

use std::time::Duration;

use prometheus::{Encoder, TextEncoder};

use super::{CACHE_LOAD_FAILURES_TOTAL, CACHE_LOOKUPS_TOTAL, EMAILS_TOTAL, RENDERS_TOTAL, RENDER_DURATION};

/// Encode all metrics to Prometheus text format
pub fn encode_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer).unwrap_or_default())
}

/// Helper struct for recording render metrics
pub struct RenderMetrics;

impl RenderMetrics {
    /// Record a completed render
    pub fn record_success(elapsed: Duration) {
        RENDERS_TOTAL.with_label_values(&["success"]).inc();
        RENDER_DURATION.observe(elapsed.as_secs_f64());
    }

    /// Record a failed render
    pub fn record_failure() {
        RENDERS_TOTAL.with_label_values(&["failure"]).inc();
    }
}

/// Helper struct for recording template cache metrics
pub struct CacheMetrics;

impl CacheMetrics {
    /// Record a cache hit (`kind` is "template" or "layout")
    pub fn record_hit(kind: &str) {
        CACHE_LOOKUPS_TOTAL.with_label_values(&[kind, "hit"]).inc();
    }

    /// Record a cache miss
    pub fn record_miss(kind: &str) {
        CACHE_LOOKUPS_TOTAL.with_label_values(&[kind, "miss"]).inc();
    }

    /// Record a load that failed and was not cached
    pub fn record_load_failure(kind: &str) {
        CACHE_LOAD_FAILURES_TOTAL.with_label_values(&[kind]).inc();
    }
}

/// Helper struct for recording mailer metrics
pub struct SendMetrics;

impl SendMetrics {
    /// Record an email accepted by the sender
    pub fn record_sent() {
        EMAILS_TOTAL.with_label_values(&["sent"]).inc();
    }

    /// Record an email the sender rejected
    pub fn record_rejected() {
        EMAILS_TOTAL.with_label_values(&["rejected"]).inc();
    }

    /// Record an email whose render failed
    pub fn record_render_failed() {
        EMAILS_TOTAL.with_label_values(&["render_failed"]).inc();
    }

    /// Record an email the sender failed to deliver
    pub fn record_send_failed() {
        EMAILS_TOTAL.with_label_values(&["send_failed"]).inc();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_metrics() {
        RenderMetrics::record_success(Duration::from_micros(250));
        RenderMetrics::record_failure();
        // Just verify no panics
    }

    #[test]
    fn test_cache_metrics() {
        CacheMetrics::record_hit("template");
        CacheMetrics::record_miss("layout");
        CacheMetrics::record_load_failure("template");
        // Just verify no panics
    }

    #[test]
    fn test_encode_metrics_contains_prefix() {
        SendMetrics::record_sent();
        SendMetrics::record_rejected();
        SendMetrics::record_render_failed();
        SendMetrics::record_send_failed();

        let output = encode_metrics().unwrap();
        assert!(output.contains("letterpress_emails_sent_total"));
    }
}
