//! JSON error responses shared by the API handlers.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;
use triage_core::{RoutingError, TicketError};

/// Body of every failed API call.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

/// An error that renders as `{"success": false, "error": ...}`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    /// Log the cause and hide it from the client.
    pub fn internal(cause: impl std::fmt::Display) -> Self {
        error!("Request failed: {}", cause);
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                success: false,
                error: self.message,
            }),
        )
            .into_response()
    }
}

impl From<TicketError> for ApiError {
    fn from(e: TicketError) -> Self {
        match e {
            TicketError::NotFound(_) => ApiError::not_found("Ticket not found"),
            TicketError::InvalidInput(msg) => ApiError::bad_request(msg),
            TicketError::Database(_) => ApiError::internal(e),
        }
    }
}

impl From<RoutingError> for ApiError {
    fn from(e: RoutingError) -> Self {
        match e {
            RoutingError::TicketNotFound(_) => ApiError::not_found("Ticket not found"),
            RoutingError::InvalidConfidence(_) => ApiError::bad_request(e.to_string()),
            RoutingError::Store(inner) => inner.into(),
        }
    }
}

/// Parse a ticket id path segment; anything non-numeric is an unknown ticket.
pub fn parse_ticket_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::not_found("Ticket not found"))
}
