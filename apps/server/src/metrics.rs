//! Prometheus metrics for the directory search service

use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter_vec, register_int_gauge_vec, HistogramVec,
    IntCounterVec, IntGaugeVec,
};

lazy_static! {
    // HTTP Request Metrics

    /// Total HTTP requests by method, path, and status
    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "careway_http_requests_total",
        "Total number of HTTP requests",
        &["method", "path", "status"]
    )
    .expect("Failed to register HTTP_REQUESTS_TOTAL");

    /// HTTP request duration in seconds
    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "careway_http_request_duration_seconds",
        "HTTP request duration in seconds",
        &["method", "path"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
    )
    .expect("Failed to register HTTP_REQUEST_DURATION_SECONDS");

    pub static ref HTTP_REQUESTS_IN_FLIGHT: IntGaugeVec = register_int_gauge_vec!(
        "careway_http_requests_in_flight",
        "Number of HTTP requests currently being processed",
        &["method", "path"]
    )
    .expect("Failed to register HTTP_REQUESTS_IN_FLIGHT");

    // Search Metrics

    /// Aggregate searches by strategy and outcome (ok, no_results, invalid, unavailable)
    pub static ref SEARCH_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "careway_search_requests_total",
        "Total number of aggregate searches",
        &["strategy", "outcome"]
    )
    .expect("Failed to register SEARCH_REQUESTS_TOTAL");

    /// Per-kind matcher duration
    pub static ref MATCHER_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "careway_matcher_duration_seconds",
        "Per-kind matcher duration in seconds",
        &["kind", "strategy"],
        vec![0.0005, 0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 5.0]
    )
    .expect("Failed to register MATCHER_DURATION_SECONDS");

    /// Items returned per kind per page
    pub static ref MATCHER_RESULTS: HistogramVec = register_histogram_vec!(
        "careway_matcher_results",
        "Number of entities returned by a matcher",
        &["kind", "strategy"],
        vec![0.0, 1.0, 5.0, 10.0, 20.0, 50.0, 100.0]
    )
    .expect("Failed to register MATCHER_RESULTS");

    /// Text searches that fell back from the inverted index to substring matching
    pub static ref TEXT_FALLBACK_TOTAL: IntCounterVec = register_int_counter_vec!(
        "careway_text_fallback_total",
        "Text searches served by the substring fallback",
        &["kind", "reason"]
    )
    .expect("Failed to register TEXT_FALLBACK_TOTAL");

    pub static ref SUGGEST_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "careway_suggest_requests_total",
        "Total number of typeahead requests",
        &["mode"]
    )
    .expect("Failed to register SUGGEST_REQUESTS_TOTAL");

    // Store Metrics

    /// Store failures by kind ("category" for the category store)
    pub static ref STORE_ERRORS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "careway_store_errors_total",
        "Total number of store access failures",
        &["kind"]
    )
    .expect("Failed to register STORE_ERRORS_TOTAL");
}

/// Collapse a request path to a bounded set of metric labels.
pub fn sanitize_path(path: &str) -> String {
    match path {
        "/" | "/health" | "/metrics" | "/api/search" | "/api/search/suggest"
        | "/api/search/locations" => path.to_string(),
        p if p.starts_with("/api/") => "/api/{other}".to_string(),
        _ => "{other}".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_path() {
        assert_eq!(sanitize_path("/api/search"), "/api/search");
        assert_eq!(sanitize_path("/api/search/suggest"), "/api/search/suggest");
        assert_eq!(sanitize_path("/api/providers/123"), "/api/{other}");
        assert_eq!(sanitize_path("/health"), "/health");
        assert_eq!(sanitize_path("/wp-admin"), "{other}");
    }
}
