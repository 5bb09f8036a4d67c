//! Outbound ports (collaborator traits)
//!
//! Hexagonal architecture: these are the interfaces that infrastructure must
//! implement. The assignment engine only ever sees a Lead Source, a Caller
//! Directory and an Assignment Ledger.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::aggregates::{AssignmentRecord, Lead, SalesCaller};
use crate::domain::value_objects::EntityId;
use crate::domain::DomainEvent;

/// Lead store port
#[async_trait]
pub trait LeadSource: Send + Sync {
    /// Leads whose id is not in `assigned`, in intake order
    async fn find_unassigned(&self, assigned: &HashSet<EntityId>) -> Result<Vec<Lead>, RepositoryError>;

    async fn find_by_id(&self, id: &EntityId) -> Result<Option<Lead>, RepositoryError>;

    /// One page of leads, newest first, plus the total count
    async fn list(&self, offset: usize, limit: usize) -> Result<(Vec<Lead>, u64), RepositoryError>;

    async fn insert(&self, lead: &Lead) -> Result<(), RepositoryError>;

    /// Set or clear the lead's assignment link
    async fn set_assignee(&self, lead_id: &EntityId, caller_id: Option<&EntityId>) -> Result<(), RepositoryError>;

    /// Clear the assignment link on every lead
    async fn clear_all_assignees(&self) -> Result<(), RepositoryError>;

    async fn delete(&self, id: &EntityId) -> Result<(), RepositoryError>;
}

/// Caller roster port
#[async_trait]
pub trait CallerDirectory: Send + Sync {
    /// Full roster in registration order
    async fn roster(&self) -> Result<Vec<SalesCaller>, RepositoryError>;

    async fn find_by_id(&self, id: &EntityId) -> Result<Option<SalesCaller>, RepositoryError>;

    /// Insert or replace
    async fn save(&self, caller: &SalesCaller) -> Result<(), RepositoryError>;

    async fn delete(&self, id: &EntityId) -> Result<(), RepositoryError>;
}

/// Append-only assignment ledger port
#[async_trait]
pub trait AssignmentLedger: Send + Sync {
    /// Append a record; fails with `DuplicateKey` if the lead already has one
    async fn append(&self, record: &AssignmentRecord) -> Result<(), RepositoryError>;

    /// Withdraw the record for a lead whose commit could not complete
    async fn revoke(&self, lead_id: &EntityId) -> Result<(), RepositoryError>;

    async fn assigned_lead_ids(&self) -> Result<HashSet<EntityId>, RepositoryError>;

    /// Records at or after `since`, counted per caller
    async fn count_since(&self, since: DateTime<Utc>) -> Result<HashMap<EntityId, u32>, RepositoryError>;

    async fn count(&self) -> Result<u64, RepositoryError>;

    /// One page of records, newest first
    async fn page(&self, offset: usize, limit: usize) -> Result<Vec<AssignmentRecord>, RepositoryError>;

    /// Remove every record, returning how many were removed
    async fn clear(&self) -> Result<u64, RepositoryError>;
}

/// Event publisher port
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish domain events
    async fn publish(&self, events: Vec<DomainEvent>) -> Result<(), RepositoryError>;
}

/// Repository error type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("entity not found: {0}")]
    NotFound(String),

    #[error("duplicate key: {0}")]
    DuplicateKey(String),

    #[error("storage error: {0}")]
    Storage(String),
}
