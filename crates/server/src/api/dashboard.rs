//! Dashboard handlers.

use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;
use triage_core::{
    routing_statistics, validate_routing_rules, RoutingStatistics, RoutingValidation,
    TicketStatistics,
};

use super::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub success: bool,
    pub summary: TicketStatistics,
}

#[derive(Debug, Serialize)]
pub struct RoutingResponse {
    pub success: bool,
    pub routing_stats: RoutingStatistics,
}

#[derive(Debug, Serialize)]
pub struct ValidationResponse {
    pub success: bool,
    pub validation: RoutingValidation,
}

pub async fn summary(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SummaryResponse>, ApiError> {
    Ok(Json(SummaryResponse {
        success: true,
        summary: state.ticket_store().statistics()?,
    }))
}

pub async fn routing(
    State(state): State<Arc<AppState>>,
) -> Result<Json<RoutingResponse>, ApiError> {
    Ok(Json(RoutingResponse {
        success: true,
        routing_stats: routing_statistics(state.ticket_store())?,
    }))
}

pub async fn validation() -> Json<ValidationResponse> {
    Json(ValidationResponse {
        success: true,
        validation: validate_routing_rules(),
    })
}
