//! Department routing: persisting categorization outcomes onto tickets,
//! manual overrides, and routing-level reporting.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::categorizer::{keywords_for, CategorizationResult, Department};
use crate::metrics::TICKETS_ROUTED;
use crate::ticket::{round2, Ticket, TicketError, TicketStore};

#[derive(Debug, Error)]
pub enum RoutingError {
    #[error("Ticket not found: {0}")]
    TicketNotFound(i64),

    #[error("Confidence score must be between 0 and 100, got {0}")]
    InvalidConfidence(i64),

    #[error(transparent)]
    Store(#[from] TicketError),
}

/// Routing distribution across departments.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutingStatistics {
    /// Ticket count per department name (unrouted tickets under `"unassigned"`).
    pub department_distribution: BTreeMap<String, i64>,
    pub average_confidence: f64,
    /// Every ticket in the store, routed or not.
    pub total_routed: i64,
    /// Share of all tickets per department, in percent, two decimals.
    pub department_percentages: BTreeMap<String, f64>,
}

/// Outcome of checking the routing configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutingValidation {
    pub is_valid: bool,
    pub departments_count: usize,
    pub departments: Vec<&'static str>,
    pub issues: Vec<String>,
}

/// Store a categorization outcome on a ticket.
pub fn route_ticket(
    store: &dyn TicketStore,
    ticket_id: i64,
    result: &CategorizationResult,
) -> Result<Ticket, RoutingError> {
    if result.confidence > 100 {
        return Err(RoutingError::InvalidConfidence(result.confidence.into()));
    }
    if !store.exists(ticket_id)? {
        warn!("Cannot route missing ticket {}", ticket_id);
        return Err(RoutingError::TicketNotFound(ticket_id));
    }

    let ticket = store
        .update_department(ticket_id, result.department, result.confidence)
        .map_err(|e| match e {
            TicketError::NotFound(id) => RoutingError::TicketNotFound(id),
            other => RoutingError::Store(other),
        })?;

    TICKETS_ROUTED
        .with_label_values(&[result.department.as_str()])
        .inc();
    info!(
        ticket_id,
        department = %result.department,
        confidence = result.confidence,
        source = result.source.as_str(),
        "Ticket routed"
    );

    Ok(ticket)
}

/// Manually move a ticket to another department.
pub fn reroute_ticket(
    store: &dyn TicketStore,
    ticket_id: i64,
    department: Department,
    confidence: i64,
) -> Result<Ticket, RoutingError> {
    if !(0..=100).contains(&confidence) {
        return Err(RoutingError::InvalidConfidence(confidence));
    }

    let ticket = store
        .update_department(ticket_id, department, confidence as u8)
        .map_err(|e| match e {
            TicketError::NotFound(id) => RoutingError::TicketNotFound(id),
            other => RoutingError::Store(other),
        })?;

    TICKETS_ROUTED.with_label_values(&[department.as_str()]).inc();
    info!(ticket_id, department = %department, confidence, "Ticket rerouted");

    Ok(ticket)
}

pub fn routing_statistics(store: &dyn TicketStore) -> Result<RoutingStatistics, RoutingError> {
    let stats = store.statistics()?;

    let department_percentages = stats
        .by_department
        .iter()
        .map(|(name, count)| {
            let share = if stats.total_tickets > 0 {
                round2(*count as f64 * 100.0 / stats.total_tickets as f64)
            } else {
                0.0
            };
            (name.clone(), share)
        })
        .collect();

    Ok(RoutingStatistics {
        department_distribution: stats.by_department,
        average_confidence: stats.average_confidence,
        total_routed: stats.total_tickets,
        department_percentages,
    })
}

/// Sanity-check the department set and the keyword tables behind it.
pub fn validate_routing_rules() -> RoutingValidation {
    check_departments(Department::names(), |name| {
        name.parse::<Department>()
            .map(|d| d == Department::General || !keywords_for(d).is_empty())
            .unwrap_or(false)
    })
}

fn check_departments(
    departments: Vec<&'static str>,
    has_keywords: impl Fn(&str) -> bool,
) -> RoutingValidation {
    let mut issues = Vec::new();

    if departments.is_empty() {
        issues.push("No departments defined".to_string());
    }

    let unique: BTreeSet<&str> = departments.iter().copied().collect();
    if unique.len() != departments.len() {
        issues.push("Duplicate departments found".to_string());
    }

    for name in &departments {
        if name.trim().is_empty() {
            issues.push(format!("Invalid department name: {:?}", name));
        } else if !has_keywords(name) {
            issues.push(format!("Department '{}' has no keywords", name));
        }
    }

    RoutingValidation {
        is_valid: issues.is_empty(),
        departments_count: departments.len(),
        departments,
        issues,
    }
}
