//! Assignment record
//!
//! Immutable fact: lead X was bound to caller Y at time T. At most one
//! record exists per lead.

use chrono::{DateTime, Utc};

use crate::domain::value_objects::EntityId;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssignmentRecord {
    id: EntityId,
    lead_id: EntityId,
    caller_id: EntityId,
    assigned_at: DateTime<Utc>,
}

impl AssignmentRecord {
    pub fn new(lead_id: EntityId, caller_id: EntityId, assigned_at: DateTime<Utc>) -> Self {
        Self {
            id: EntityId::new(),
            lead_id,
            caller_id,
            assigned_at,
        }
    }

    pub fn id(&self) -> &EntityId { &self.id }
    pub fn lead_id(&self) -> &EntityId { &self.lead_id }
    pub fn caller_id(&self) -> &EntityId { &self.caller_id }
    pub fn assigned_at(&self) -> DateTime<Utc> { self.assigned_at }
}
