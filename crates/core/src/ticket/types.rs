//! Core ticket data types.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::categorizer::Department;

/// Where a ticket is in its (minimal) lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    /// Submitted, not yet picked up by the department.
    #[default]
    Pending,
    /// Being worked on.
    InProgress,
    /// Done.
    Resolved,
}

impl TicketStatus {
    pub const ALL: [TicketStatus; 3] = [
        TicketStatus::Pending,
        TicketStatus::InProgress,
        TicketStatus::Resolved,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Pending => "pending",
            TicketStatus::InProgress => "in_progress",
            TicketStatus::Resolved => "resolved",
        }
    }

    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(TicketStatus::as_str).collect()
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TicketStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| {
                format!(
                    "Invalid status. Must be one of: {}",
                    Self::names().join(", ")
                )
            })
    }
}

/// A support ticket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    /// Auto-incrementing identifier.
    pub id: i64,
    pub title: String,
    pub description: String,
    /// Requester name.
    pub user_name: String,
    /// Requester email.
    pub user_email: String,
    /// Assigned department; `None` until the ticket is routed.
    pub department: Option<Department>,
    /// Confidence of the department assignment (0-100).
    pub confidence_score: Option<u8>,
    pub status: TicketStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Aggregate numbers for the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketStatistics {
    pub total_tickets: i64,
    /// Ticket count per department name; unrouted tickets are under `"unassigned"`.
    pub by_department: BTreeMap<String, i64>,
    pub by_status: BTreeMap<String, i64>,
    /// Mean confidence of routed tickets, rounded to two decimals (0 when none).
    pub average_confidence: f64,
}

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip_names() {
        assert_eq!(TicketStatus::names(), vec!["pending", "in_progress", "resolved"]);
        assert_eq!("in_progress".parse::<TicketStatus>(), Ok(TicketStatus::InProgress));
        assert!("closed".parse::<TicketStatus>().is_err());
        assert!("Pending".parse::<TicketStatus>().is_err());
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_string(&TicketStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");
        assert_eq!(TicketStatus::default(), TicketStatus::Pending);
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(66.666666), 66.67);
        assert_eq!(round2(50.0), 50.0);
        assert_eq!(round2(0.0), 0.0);
    }
}
