//! Prometheus metrics for the HTTP service.
//!
//! Request-level metrics live here; categorization and routing counters come
//! from `triage_core::metrics` and are registered into the same registry.

use once_cell::sync::Lazy;
use prometheus::{
    self, Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, IntGaugeVec,
    Opts, Registry, TextEncoder,
};
use triage_core::{TicketFilter, TicketStatus};

use crate::state::AppState;

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

// =============================================================================
// HTTP Request Metrics
// =============================================================================

/// HTTP request duration in seconds.
pub static HTTP_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "triage_http_request_duration_seconds",
            "HTTP request duration in seconds",
        )
        .buckets(vec![
            0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0,
        ]),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests total count.
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("triage_http_requests_total", "Total HTTP requests"),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests currently in flight.
pub static HTTP_REQUESTS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "triage_http_requests_in_flight",
        "Number of HTTP requests currently being processed",
    )
    .unwrap()
});

// =============================================================================
// Ticket Metrics
// =============================================================================

/// Tickets created total.
pub static TICKETS_CREATED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "triage_tickets_created_total",
        "Total tickets created since startup",
    )
    .unwrap()
});

/// Tickets by current status (collected on scrape).
pub static TICKETS_BY_STATUS: Lazy<IntGaugeVec> = Lazy::new(|| {
    IntGaugeVec::new(
        Opts::new("triage_tickets_by_status", "Current ticket count by status"),
        &["status"],
    )
    .unwrap()
});

// =============================================================================
// Registration
// =============================================================================

fn register_metrics(registry: &Registry) {
    // HTTP
    registry
        .register(Box::new(HTTP_REQUEST_DURATION.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_IN_FLIGHT.clone()))
        .unwrap();

    // Tickets
    registry
        .register(Box::new(TICKETS_CREATED_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(TICKETS_BY_STATUS.clone()))
        .unwrap();

    // Core metrics (categorization, routing, classifier calls)
    for metric in triage_core::metrics::all_metrics() {
        registry.register(metric).unwrap();
    }
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
    }
    String::from_utf8_lossy(&buffer).into_owned()
}

/// Refresh gauges that mirror the ticket store.
pub fn collect_dynamic_metrics(state: &AppState) {
    let ticket_store = state.ticket_store();
    for status in TicketStatus::ALL {
        let filter = TicketFilter::new().with_status(status);
        if let Ok(count) = ticket_store.count(&filter) {
            TICKETS_BY_STATUS
                .with_label_values(&[status.as_str()])
                .set(count);
        }
    }
}

/// Normalize a path for metric labels (replace IDs with placeholders).
pub fn normalize_path(path: &str) -> String {
    static NUMERIC: Lazy<regex_lite::Regex> =
        Lazy::new(|| regex_lite::Regex::new(r"/\d+(/|$)").unwrap());
    static DEPARTMENT: Lazy<regex_lite::Regex> =
        Lazy::new(|| regex_lite::Regex::new(r"^/api/departments/[^/]+/tickets$").unwrap());

    if DEPARTMENT.is_match(path) {
        return "/api/departments/{department}/tickets".to_string();
    }

    // Applied twice: adjacent numeric segments share the slash between them
    let result = NUMERIC.replace_all(path, "/{id}$1");
    let result = NUMERIC.replace_all(&result, "/{id}$1");
    result.to_string()
}
