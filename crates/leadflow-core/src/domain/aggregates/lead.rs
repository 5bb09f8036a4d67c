//! Lead Aggregate
//!
//! A contact waiting to be serviced by a sales caller. Leads arrive through
//! import/intake already normalized; the only mutation this crate performs
//! is setting or clearing the assignment link.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{EntityId, Region};

/// Lead aggregate root
#[derive(Clone, Debug, PartialEq)]
pub struct Lead {
    id: EntityId,
    name: String,
    phone: String,
    email: Option<String>,
    source: String,
    city: String,
    region: Option<Region>,
    notes: String,
    status: LeadStatus,
    assigned_to: Option<EntityId>,
    created_at: DateTime<Utc>,
}

impl Lead {
    /// Create a new unassigned lead (factory method)
    pub fn create(name: impl Into<String>, region: Option<Region>) -> Self {
        Self {
            id: EntityId::new(),
            name: name.into(),
            phone: "N/A".to_string(),
            email: None,
            source: "Imported".to_string(),
            city: String::new(),
            region,
            notes: String::new(),
            status: LeadStatus::New,
            assigned_to: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_id(mut self, id: EntityId) -> Self {
        self.id = id;
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = phone.into();
        self
    }

    pub fn with_email(mut self, email: Option<String>) -> Self {
        self.email = email;
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = city.into();
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    pub fn with_status(mut self, status: LeadStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    // =========================================================================
    // Getters
    // =========================================================================

    pub fn id(&self) -> &EntityId { &self.id }
    pub fn name(&self) -> &str { &self.name }
    pub fn phone(&self) -> &str { &self.phone }
    pub fn email(&self) -> Option<&str> { self.email.as_deref() }
    pub fn source(&self) -> &str { &self.source }
    pub fn city(&self) -> &str { &self.city }
    pub fn region(&self) -> Option<&Region> { self.region.as_ref() }
    pub fn notes(&self) -> &str { &self.notes }
    pub fn status(&self) -> LeadStatus { self.status }
    pub fn assigned_to(&self) -> Option<&EntityId> { self.assigned_to.as_ref() }
    pub fn created_at(&self) -> DateTime<Utc> { self.created_at }

    pub fn is_assigned(&self) -> bool {
        self.assigned_to.is_some()
    }

    /// Region label, or empty when the lead has none
    pub fn region_label(&self) -> &str {
        self.region.as_ref().map(Region::as_str).unwrap_or("")
    }

    // =========================================================================
    // Business Operations
    // =========================================================================

    /// Link the lead to the caller that will service it
    pub fn assign_to(&mut self, caller_id: EntityId) {
        self.assigned_to = Some(caller_id);
    }

    pub fn clear_assignment(&mut self) {
        self.assigned_to = None;
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum LeadStatus {
    #[default]
    New,
    Contacted,
    Qualified,
    Lost,
}
