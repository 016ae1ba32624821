//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Categorization (which track produced each result, classifier attempt outcomes)
//! - Routing (department assignments)
//! - External services (classifier latency, requests, tokens)

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, Opts};

// =============================================================================
// Categorization Metrics
// =============================================================================

/// Categorizations total by source.
pub static CATEGORIZATIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "triage_categorizations_total",
            "Total ticket categorizations",
        ),
        &["source"], // "classifier", "keywords"
    )
    .unwrap()
});

/// Classifier attempts total by outcome.
pub static CLASSIFIER_ATTEMPTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "triage_classifier_attempts_total",
            "Total classifier attempts",
        ),
        &["outcome"], // "accepted", "soft_failure", "hard_failure"
    )
    .unwrap()
});

// =============================================================================
// Routing Metrics
// =============================================================================

/// Tickets routed total by department.
pub static TICKETS_ROUTED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("triage_tickets_routed_total", "Total tickets routed"),
        &["department"],
    )
    .unwrap()
});

// =============================================================================
// External Service Metrics
// =============================================================================

/// External service request duration.
pub static EXTERNAL_SERVICE_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "triage_external_service_duration_seconds",
            "Duration of external service calls",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        &["service", "operation"],
    )
    .unwrap()
});

/// External service requests total.
pub static EXTERNAL_SERVICE_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "triage_external_service_requests_total",
            "Total external service requests",
        ),
        &["service", "operation", "status"], // status: "success" or an error kind
    )
    .unwrap()
});

/// LLM tokens used.
pub static LLM_TOKENS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("triage_llm_tokens_total", "Total LLM tokens used"),
        &["provider", "direction"], // direction: "input", "output"
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Categorization
        Box::new(CATEGORIZATIONS.clone()),
        Box::new(CLASSIFIER_ATTEMPTS.clone()),
        // Routing
        Box::new(TICKETS_ROUTED.clone()),
        // External services
        Box::new(EXTERNAL_SERVICE_DURATION.clone()),
        Box::new(EXTERNAL_SERVICE_REQUESTS.clone()),
        Box::new(LLM_TOKENS.clone()),
    ]
}
