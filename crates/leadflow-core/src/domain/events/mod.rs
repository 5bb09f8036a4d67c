//! Domain Events
//!
//! Events raised by the application services to communicate state changes.

use chrono::{DateTime, Utc};

use crate::domain::services::{MatchType, SkipReason};
use crate::domain::value_objects::EntityId;

/// All domain events in the lead management bounded context
#[derive(Clone, Debug, PartialEq)]
pub enum DomainEvent {
    Lead(LeadEvent),
    Caller(CallerEvent),
    Assignment(AssignmentEvent),
}

#[derive(Clone, Debug, PartialEq)]
pub enum LeadEvent {
    Imported {
        lead_id: EntityId,
        imported_at: DateTime<Utc>,
    },

    Removed {
        lead_id: EntityId,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub enum CallerEvent {
    Registered {
        caller_id: EntityId,
        name: String,
        daily_lead_limit: u32,
    },

    Updated {
        caller_id: EntityId,
    },

    Removed {
        caller_id: EntityId,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub enum AssignmentEvent {
    LeadAssigned {
        lead_id: EntityId,
        caller_id: EntityId,
        match_type: MatchType,
        assigned_at: DateTime<Utc>,
    },

    LeadSkipped {
        lead_id: EntityId,
        reason: SkipReason,
    },

    Reset {
        records_cleared: u64,
        reset_at: DateTime<Utc>,
    },
}

impl DomainEvent {
    /// Get the aggregate ID this event belongs to, if any
    pub fn aggregate_id(&self) -> Option<&EntityId> {
        match self {
            DomainEvent::Lead(e) => match e {
                LeadEvent::Imported { lead_id, .. } => Some(lead_id),
                LeadEvent::Removed { lead_id } => Some(lead_id),
            },
            DomainEvent::Caller(e) => match e {
                CallerEvent::Registered { caller_id, .. } => Some(caller_id),
                CallerEvent::Updated { caller_id } => Some(caller_id),
                CallerEvent::Removed { caller_id } => Some(caller_id),
            },
            DomainEvent::Assignment(e) => match e {
                AssignmentEvent::LeadAssigned { lead_id, .. } => Some(lead_id),
                AssignmentEvent::LeadSkipped { lead_id, .. } => Some(lead_id),
                AssignmentEvent::Reset { .. } => None,
            },
        }
    }

    /// Get event type name
    pub fn event_type(&self) -> &'static str {
        match self {
            DomainEvent::Lead(e) => match e {
                LeadEvent::Imported { .. } => "lead.imported",
                LeadEvent::Removed { .. } => "lead.removed",
            },
            DomainEvent::Caller(e) => match e {
                CallerEvent::Registered { .. } => "caller.registered",
                CallerEvent::Updated { .. } => "caller.updated",
                CallerEvent::Removed { .. } => "caller.removed",
            },
            DomainEvent::Assignment(e) => match e {
                AssignmentEvent::LeadAssigned { .. } => "assignment.lead_assigned",
                AssignmentEvent::LeadSkipped { .. } => "assignment.lead_skipped",
                AssignmentEvent::Reset { .. } => "assignment.reset",
            },
        }
    }
}
