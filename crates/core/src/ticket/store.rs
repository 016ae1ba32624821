//! Ticket storage trait and types.

use std::fmt;

use crate::categorizer::Department;
use crate::ticket::{Ticket, TicketStatistics, TicketStatus};

/// Error type for ticket operations.
#[derive(Debug)]
pub enum TicketError {
    /// Ticket not found.
    NotFound(i64),
    /// Rejected input (e.g. confidence outside 0-100).
    InvalidInput(String),
    /// Database error.
    Database(String),
}

impl fmt::Display for TicketError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TicketError::NotFound(id) => write!(f, "Ticket not found: {}", id),
            TicketError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            TicketError::Database(msg) => write!(f, "Database error: {}", msg),
        }
    }
}

impl std::error::Error for TicketError {}

impl From<rusqlite::Error> for TicketError {
    fn from(e: rusqlite::Error) -> Self {
        TicketError::Database(e.to_string())
    }
}

/// Request to create a new ticket.
#[derive(Debug, Clone)]
pub struct CreateTicketRequest {
    pub title: String,
    pub description: String,
    pub user_name: String,
    pub user_email: String,
}

/// Filter for querying tickets.
#[derive(Debug, Clone)]
pub struct TicketFilter {
    /// Filter by assigned department.
    pub department: Option<Department>,
    /// Filter by status.
    pub status: Option<TicketStatus>,
    /// Maximum number of results.
    pub limit: i64,
    /// Offset for pagination.
    pub offset: i64,
}

impl Default for TicketFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl TicketFilter {
    /// Create a new filter that matches every ticket.
    pub fn new() -> Self {
        Self {
            department: None,
            status: None,
            limit: i64::MAX,
            offset: 0,
        }
    }

    /// Filter by department.
    pub fn with_department(mut self, department: Department) -> Self {
        self.department = Some(department);
        self
    }

    /// Filter by status.
    pub fn with_status(mut self, status: TicketStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Set limit.
    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = limit;
        self
    }

    /// Set offset.
    pub fn with_offset(mut self, offset: i64) -> Self {
        self.offset = offset;
        self
    }
}

/// Trait for ticket storage backends.
pub trait TicketStore: Send + Sync {
    /// Create a new pending, unrouted ticket.
    fn create(&self, request: CreateTicketRequest) -> Result<Ticket, TicketError>;

    /// Get a ticket by ID.
    fn get(&self, id: i64) -> Result<Option<Ticket>, TicketError>;

    /// Whether a ticket with this ID exists.
    fn exists(&self, id: i64) -> Result<bool, TicketError> {
        Ok(self.get(id)?.is_some())
    }

    /// List tickets matching the filter, newest first.
    fn list(&self, filter: &TicketFilter) -> Result<Vec<Ticket>, TicketError>;

    /// Count tickets matching the filter (limit and offset are ignored).
    fn count(&self, filter: &TicketFilter) -> Result<i64, TicketError>;

    /// Assign a department and confidence score.
    fn update_department(
        &self,
        id: i64,
        department: Department,
        confidence_score: u8,
    ) -> Result<Ticket, TicketError>;

    /// Change a ticket's status.
    fn update_status(&self, id: i64, status: TicketStatus) -> Result<Ticket, TicketError>;

    /// Totals by department and status plus average confidence.
    fn statistics(&self) -> Result<TicketStatistics, TicketError>;
}
