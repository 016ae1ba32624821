//! Ticket API handlers.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use triage_core::{
    reroute_ticket, route_ticket, CategorizationSource, CreateTicketRequest, Department, Ticket,
    TicketFilter, TicketStatus,
};

use super::error::{parse_ticket_id, ApiError};
use crate::metrics::TICKETS_CREATED_TOTAL;
use crate::state::AppState;

/// Maximum allowed limit for ticket queries
const MAX_LIMIT: i64 = 1000;

const MIN_TITLE_CHARS: usize = 3;
const MIN_DESCRIPTION_CHARS: usize = 10;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for creating a ticket. Fields are optional so a missing one
/// gets a specific message instead of a generic deserialization error.
#[derive(Debug, Default, Deserialize)]
pub struct CreateTicketBody {
    pub title: Option<String>,
    pub description: Option<String>,
    pub user_name: Option<String>,
    pub user_email: Option<String>,
}

impl CreateTicketBody {
    /// Trim and check the submitted fields.
    pub fn validate(self) -> Result<CreateTicketRequest, ApiError> {
        fn required(name: &str, value: Option<String>) -> Result<String, ApiError> {
            match value.as_deref().map(str::trim) {
                Some(v) if !v.is_empty() => Ok(v.to_string()),
                _ => Err(ApiError::bad_request(format!(
                    "Missing required field: {}",
                    name
                ))),
            }
        }

        let title = required("title", self.title)?;
        let description = required("description", self.description)?;
        let user_name = required("user_name", self.user_name)?;
        let user_email = required("user_email", self.user_email)?;

        if title.chars().count() < MIN_TITLE_CHARS {
            return Err(ApiError::bad_request(format!(
                "Title must be at least {} characters",
                MIN_TITLE_CHARS
            )));
        }
        if description.chars().count() < MIN_DESCRIPTION_CHARS {
            return Err(ApiError::bad_request(format!(
                "Description must be at least {} characters",
                MIN_DESCRIPTION_CHARS
            )));
        }

        Ok(CreateTicketRequest {
            title,
            description,
            user_name,
            user_email,
        })
    }
}

/// Response after a ticket was created and routed.
#[derive(Debug, Serialize)]
pub struct CreateTicketResponse {
    pub success: bool,
    pub ticket_id: i64,
    pub department: Department,
    pub confidence_score: u8,
    pub categorized_by: CategorizationSource,
    pub status: TicketStatus,
    pub message: String,
}

/// Query parameters for listing tickets
#[derive(Debug, Default, Deserialize)]
pub struct ListTicketsParams {
    /// Maximum number of tickets to return (all when absent)
    pub limit: Option<i64>,
    /// Pagination offset
    pub offset: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct ListTicketsResponse {
    pub success: bool,
    pub count: usize,
    pub tickets: Vec<Ticket>,
}

#[derive(Debug, Serialize)]
pub struct TicketResponse {
    pub success: bool,
    pub ticket: Ticket,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusBody {
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UpdateStatusResponse {
    pub success: bool,
    pub message: String,
    pub ticket: Ticket,
}

#[derive(Debug, Deserialize)]
pub struct RerouteBody {
    pub department: Option<String>,
    pub confidence_score: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct RecategorizeResponse {
    pub success: bool,
    pub ticket_id: i64,
    pub previous_department: Option<Department>,
    pub department: Department,
    pub confidence_score: u8,
    pub categorized_by: CategorizationSource,
}

fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    body.map(|Json(value)| value)
        .map_err(|rejection| ApiError::bad_request(rejection.body_text()))
}

// ============================================================================
// Handlers
// ============================================================================

/// Create a ticket, categorize it and route it to a department.
pub async fn create_ticket(
    State(state): State<Arc<AppState>>,
    body: Result<Json<CreateTicketBody>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateTicketResponse>), ApiError> {
    let request = json_body(body)?.validate()?;

    let ticket = state.ticket_store().create(request)?;
    TICKETS_CREATED_TOTAL.inc();
    info!("Created ticket {} for {}", ticket.id, ticket.user_name);

    let result = state
        .categorizer()
        .categorize(&ticket.title, &ticket.description)
        .await;
    let routed = route_ticket(state.ticket_store(), ticket.id, &result)?;

    Ok((
        StatusCode::CREATED,
        Json(CreateTicketResponse {
            success: true,
            ticket_id: routed.id,
            department: result.department,
            confidence_score: result.confidence,
            categorized_by: result.source,
            status: routed.status,
            message: "Ticket created and categorized successfully".to_string(),
        }),
    ))
}

/// Get a ticket by ID
pub async fn get_ticket(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<TicketResponse>, ApiError> {
    let id = parse_ticket_id(&id)?;
    match state.ticket_store().get(id)? {
        Some(ticket) => Ok(Json(TicketResponse {
            success: true,
            ticket,
        })),
        None => Err(ApiError::not_found("Ticket not found")),
    }
}

/// List tickets, newest first
pub async fn list_tickets(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListTicketsParams>,
) -> Result<Json<ListTicketsResponse>, ApiError> {
    let mut filter = TicketFilter::new().with_offset(params.offset.unwrap_or(0).max(0));
    if let Some(limit) = params.limit {
        filter = filter.with_limit(limit.clamp(1, MAX_LIMIT));
    }

    let tickets = state.ticket_store().list(&filter)?;

    Ok(Json(ListTicketsResponse {
        success: true,
        count: tickets.len(),
        tickets,
    }))
}

/// Change a ticket's status
pub async fn update_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Result<Json<UpdateStatusBody>, JsonRejection>,
) -> Result<Json<UpdateStatusResponse>, ApiError> {
    let id = parse_ticket_id(&id)?;
    let raw = json_body(body)?
        .status
        .ok_or_else(|| ApiError::bad_request("Missing required field: status"))?;
    let status: TicketStatus = raw.parse().map_err(ApiError::bad_request)?;

    let ticket = state.ticket_store().update_status(id, status)?;
    info!("Ticket {} status set to {}", id, status);

    Ok(Json(UpdateStatusResponse {
        success: true,
        message: format!("Ticket status updated to {}", status),
        ticket,
    }))
}

/// Manually move a ticket to another department
pub async fn reroute(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Result<Json<RerouteBody>, JsonRejection>,
) -> Result<Json<TicketResponse>, ApiError> {
    let id = parse_ticket_id(&id)?;
    let body = json_body(body)?;

    let department: Department = body
        .department
        .ok_or_else(|| ApiError::bad_request("Missing required field: department"))?
        .parse()
        .map_err(|_| {
            ApiError::bad_request(format!(
                "Invalid department. Must be one of: {}",
                Department::names().join(", ")
            ))
        })?;
    // A manual decision is certain unless the caller says otherwise
    let confidence = body.confidence_score.unwrap_or(100);

    let ticket = reroute_ticket(state.ticket_store(), id, department, confidence)?;

    Ok(Json(TicketResponse {
        success: true,
        ticket,
    }))
}

/// Run categorization again and store the new department
pub async fn recategorize_ticket(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<RecategorizeResponse>, ApiError> {
    let id = parse_ticket_id(&id)?;
    let ticket = state
        .ticket_store()
        .get(id)?
        .ok_or_else(|| ApiError::not_found("Ticket not found"))?;

    let result = state
        .categorizer()
        .recategorize(&ticket.title, &ticket.description)
        .await;
    route_ticket(state.ticket_store(), id, &result)?;

    Ok(Json(RecategorizeResponse {
        success: true,
        ticket_id: id,
        previous_department: ticket.department,
        department: result.department,
        confidence_score: result.confidence,
        categorized_by: result.source,
    }))
}
