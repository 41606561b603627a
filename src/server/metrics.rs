use axum::{http::StatusCode, response::IntoResponse};
use lazy_static::lazy_static;
use prometheus::{
    Counter, CounterVec, Encoder, Gauge, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder,
};
use std::time::Duration;

/// Metric name prefix for all catalog server metrics
const PREFIX: &str = "track_catalog";

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();

    // HTTP Request Metrics
    pub static ref HTTP_REQUESTS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_http_requests_total"), "Total number of HTTP requests"),
        &["method", "path", "status"]
    ).expect("Failed to create http_requests_total metric");

    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            format!("{PREFIX}_http_request_duration_seconds"),
            "HTTP request duration in seconds"
        )
        .buckets(vec![0.001, 0.01, 0.05, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0]),
        &["method", "path"]
    ).expect("Failed to create http_request_duration_seconds metric");

    // Catalog Metrics
    pub static ref CATALOG_TRACKS_TOTAL: Gauge = Gauge::new(
        format!("{PREFIX}_catalog_tracks_total"),
        "Number of tracks in the catalog"
    ).expect("Failed to create catalog_tracks_total metric");

    pub static ref IMPORTED_TRACKS_TOTAL: Counter = Counter::new(
        format!("{PREFIX}_imported_tracks_total"),
        "Tracks inserted by the CSV importer"
    ).expect("Failed to create imported_tracks_total metric");

    // Error Metrics
    pub static ref ERRORS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_errors_total"), "Total API errors by kind"),
        &["kind"]
    ).expect("Failed to create errors_total metric");
}

/// Initialize all metrics and register them with the Prometheus registry
pub fn init_metrics() {
    // Ignore errors if already registered (for tests)
    let _ = REGISTRY.register(Box::new(HTTP_REQUESTS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(HTTP_REQUEST_DURATION_SECONDS.clone()));
    let _ = REGISTRY.register(Box::new(CATALOG_TRACKS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(IMPORTED_TRACKS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(ERRORS_TOTAL.clone()));

    tracing::info!("Metrics system initialized successfully");
}

pub fn set_catalog_tracks(count: usize) {
    CATALOG_TRACKS_TOTAL.set(count as f64);
}

pub fn inc_catalog_tracks() {
    CATALOG_TRACKS_TOTAL.inc();
}

pub fn dec_catalog_tracks() {
    CATALOG_TRACKS_TOTAL.dec();
}

pub fn record_imported_tracks(count: usize) {
    IMPORTED_TRACKS_TOTAL.inc_by(count as f64);
}

/// Record an HTTP request. `path` is the route template, not the raw URI.
pub fn record_http_request(method: &str, path: &str, status: u16, duration: Duration) {
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[method, path, &status.to_string()])
        .inc();

    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[method, path])
        .observe(duration.as_secs_f64());
}

pub fn record_error(kind: &str) {
    ERRORS_TOTAL.with_label_values(&[kind]).inc();
}

/// Handler for the /metrics endpoint
pub async fn metrics_handler() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();

    let mut buffer = vec![];
    match encoder.encode(&metric_families, &mut buffer) {
        Ok(()) => {
            let response = String::from_utf8(buffer).unwrap_or_default();
            (StatusCode::OK, response)
        }
        Err(e) => {
            tracing::error!("Failed to encode metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to encode metrics: {}", e),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn find_family(name: &str) -> Option<prometheus::proto::MetricFamily> {
        REGISTRY
            .gather()
            .into_iter()
            .find(|m| m.get_name() == format!("{PREFIX}_{name}"))
    }

    #[test]
    fn test_metrics_initialization() {
        init_metrics();
        set_catalog_tracks(3);

        assert!(find_family("catalog_tracks_total").is_some());
    }

    #[test]
    fn test_record_http_request() {
        init_metrics();

        record_http_request("GET", "/api/tracks/{id}", 200, Duration::from_millis(50));

        assert!(find_family("http_requests_total").is_some());
        assert!(find_family("http_request_duration_seconds").is_some());
    }

    #[test]
    fn test_record_error() {
        init_metrics();

        record_error("not_found");

        let family = find_family("errors_total").expect("errors metric should exist");
        assert!(family
            .get_metric()
            .iter()
            .any(|m| m.get_label().iter().any(|l| l.get_value() == "not_found")));
    }

    #[test]
    fn test_record_imported_tracks() {
        init_metrics();

        let before = IMPORTED_TRACKS_TOTAL.get();
        record_imported_tracks(5);
        assert!(IMPORTED_TRACKS_TOTAL.get() >= before + 5.0);
    }

    #[tokio::test]
    async fn test_metrics_handler_renders_text() {
        init_metrics();
        set_catalog_tracks(7);

        let response = metrics_handler().await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(text.contains("track_catalog_catalog_tracks_total"));
    }
}
