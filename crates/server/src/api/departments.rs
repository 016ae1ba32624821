//! Department queue handlers.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use triage_core::{Department, Ticket, TicketFilter, TicketStatus};

use super::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct DepartmentsResponse {
    pub success: bool,
    pub departments: Vec<&'static str>,
}

#[derive(Debug, Deserialize)]
pub struct DepartmentTicketsParams {
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DepartmentTicketsResponse {
    pub success: bool,
    pub department: Department,
    pub status_filter: Option<TicketStatus>,
    pub ticket_count: usize,
    pub tickets: Vec<Ticket>,
}

pub async fn list_departments() -> Json<DepartmentsResponse> {
    Json(DepartmentsResponse {
        success: true,
        departments: Department::names(),
    })
}

/// Tickets assigned to one department, newest first.
///
/// The department must match a display name exactly ("IT Support").
pub async fn department_tickets(
    State(state): State<Arc<AppState>>,
    Path(department): Path<String>,
    Query(params): Query<DepartmentTicketsParams>,
) -> Result<Json<DepartmentTicketsResponse>, ApiError> {
    let department: Department = department.parse().map_err(|_| {
        ApiError::bad_request(format!(
            "Invalid department. Must be one of: {}",
            Department::names().join(", ")
        ))
    })?;

    let status_filter = match params.status.as_deref() {
        None | Some("") => None,
        Some(raw) => Some(raw.parse::<TicketStatus>().map_err(ApiError::bad_request)?),
    };

    let mut filter = TicketFilter::new().with_department(department);
    if let Some(status) = status_filter {
        filter = filter.with_status(status);
    }

    let tickets = state.ticket_store().list(&filter)?;

    Ok(Json(DepartmentTicketsResponse {
        success: true,
        department,
        status_filter,
        ticket_count: tickets.len(),
        tickets,
    }))
}
