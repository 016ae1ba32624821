use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use triage_core::{SanitizedConfig, TicketStatus};

use super::error::ApiError;
use crate::metrics::{collect_dynamic_metrics, encode_metrics};
use crate::state::AppState;

pub const SERVICE_NAME: &str = "Smart Ticket Triage";
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    /// False when tickets are categorized by keywords only.
    pub classifier_configured: bool,
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: SERVICE_NAME.to_string(),
        version: VERSION.to_string(),
        classifier_configured: state.categorizer().has_classifier(),
    })
}

pub async fn get_config(State(state): State<Arc<AppState>>) -> Json<SanitizedConfig> {
    Json(state.sanitized_config())
}

#[derive(Serialize)]
pub struct StatusesResponse {
    pub success: bool,
    pub statuses: Vec<&'static str>,
}

pub async fn list_statuses() -> Json<StatusesResponse> {
    Json(StatusesResponse {
        success: true,
        statuses: TicketStatus::names(),
    })
}

/// Service banner with a map of the available endpoints.
pub async fn index() -> Json<Value> {
    Json(json!({
        "service": SERVICE_NAME,
        "version": VERSION,
        "endpoints": {
            "tickets": {
                "POST /api/tickets": "Create, categorize and route a ticket",
                "GET /api/tickets": "List all tickets",
                "GET /api/tickets/{id}": "Get a ticket",
                "PUT /api/tickets/{id}/status": "Update ticket status",
                "PUT /api/tickets/{id}/department": "Manually reroute a ticket",
                "POST /api/tickets/{id}/recategorize": "Categorize a ticket again"
            },
            "departments": {
                "GET /api/departments": "List departments",
                "GET /api/departments/{department}/tickets": "Department queue"
            },
            "dashboard": {
                "GET /api/dashboard/summary": "Ticket statistics",
                "GET /api/dashboard/routing": "Routing statistics",
                "GET /api/dashboard/validation": "Routing rule check"
            },
            "system": {
                "GET /api/health": "Health check",
                "GET /api/statuses": "List ticket statuses",
                "GET /api/config": "Active configuration",
                "GET /metrics": "Prometheus metrics"
            }
        }
    }))
}

pub async fn metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    collect_dynamic_metrics(&state);
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        encode_metrics(),
    )
}

pub async fn not_found() -> ApiError {
    ApiError::not_found("Endpoint not found")
}

pub async fn method_not_allowed() -> ApiError {
    ApiError {
        status: axum::http::StatusCode::METHOD_NOT_ALLOWED,
        message: "Method not allowed".to_string(),
    }
}
