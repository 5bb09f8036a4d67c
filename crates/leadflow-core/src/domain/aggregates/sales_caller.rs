//! SalesCaller Aggregate
//!
//! An agent who receives leads, up to a daily cap, optionally specialised in
//! a set of regions. Read-only to the assignment engine.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::value_objects::{EntityId, Region};

/// Sales caller aggregate root
#[derive(Clone, Debug, PartialEq)]
pub struct SalesCaller {
    id: EntityId,
    name: String,
    role: String,
    languages: Vec<String>,
    daily_lead_limit: u32,
    assigned_regions: Vec<Region>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl SalesCaller {
    /// Register a new caller (factory method)
    pub fn create(
        name: impl Into<String>,
        role: impl Into<String>,
        languages: Vec<String>,
        daily_lead_limit: u32,
        assigned_regions: Vec<String>,
    ) -> Result<Self, CallerError> {
        let now = Utc::now();
        let caller = Self {
            id: EntityId::new(),
            name: name.into().trim().to_string(),
            role: role.into().trim().to_string(),
            languages: clean_list(languages),
            daily_lead_limit,
            assigned_regions: parse_regions(assigned_regions),
            created_at: now,
            updated_at: now,
        };
        caller.validate()?;
        Ok(caller)
    }

    pub fn with_id(mut self, id: EntityId) -> Self {
        self.id = id;
        self
    }

    // =========================================================================
    // Getters
    // =========================================================================

    pub fn id(&self) -> &EntityId { &self.id }
    pub fn name(&self) -> &str { &self.name }
    pub fn role(&self) -> &str { &self.role }
    pub fn languages(&self) -> &[String] { &self.languages }
    pub fn daily_lead_limit(&self) -> u32 { self.daily_lead_limit }
    pub fn assigned_regions(&self) -> &[Region] { &self.assigned_regions }
    pub fn created_at(&self) -> DateTime<Utc> { self.created_at }
    pub fn updated_at(&self) -> DateTime<Utc> { self.updated_at }

    /// Region labels as entered
    pub fn region_labels(&self) -> Vec<String> {
        self.assigned_regions.iter().map(|r| r.as_str().to_string()).collect()
    }

    /// Distinct lowercased region keys this caller is indexed under
    pub fn region_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = Vec::with_capacity(self.assigned_regions.len());
        for region in &self.assigned_regions {
            if !keys.contains(&region.key()) {
                keys.push(region.key());
            }
        }
        keys
    }

    pub fn is_generalist(&self) -> bool {
        self.assigned_regions.is_empty()
    }

    // =========================================================================
    // Business Operations
    // =========================================================================

    /// Apply a partial update. Nothing changes if the result would be invalid.
    pub fn update(
        &mut self,
        name: Option<String>,
        role: Option<String>,
        languages: Option<Vec<String>>,
        daily_lead_limit: Option<u32>,
        assigned_regions: Option<Vec<String>>,
    ) -> Result<(), CallerError> {
        let mut next = self.clone();
        if let Some(name) = name {
            next.name = name.trim().to_string();
        }
        if let Some(role) = role {
            next.role = role.trim().to_string();
        }
        if let Some(languages) = languages {
            next.languages = clean_list(languages);
        }
        if let Some(limit) = daily_lead_limit {
            next.daily_lead_limit = limit;
        }
        if let Some(regions) = assigned_regions {
            next.assigned_regions = parse_regions(regions);
        }
        next.validate()?;
        next.updated_at = Utc::now();
        *self = next;
        Ok(())
    }

    fn validate(&self) -> Result<(), CallerError> {
        if self.name.is_empty() {
            return Err(CallerError::MissingName);
        }
        if self.role.is_empty() {
            return Err(CallerError::MissingRole);
        }
        if self.languages.is_empty() {
            return Err(CallerError::MissingLanguages);
        }
        if self.daily_lead_limit == 0 {
            return Err(CallerError::InvalidDailyLimit);
        }
        Ok(())
    }
}

fn clean_list(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}

fn parse_regions(values: Vec<String>) -> Vec<Region> {
    values.iter().filter_map(Region::parse).collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CallerError {
    #[error("caller name is required")]
    MissingName,

    #[error("caller role is required")]
    MissingRole,

    #[error("at least one language is required")]
    MissingLanguages,

    #[error("daily lead limit must be at least 1")]
    InvalidDailyLimit,
}
