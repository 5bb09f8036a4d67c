//! Inbound ports (Use case traits)
//!
//! Hexagonal architecture: application service interfaces.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::application::dto::*;
use crate::domain::aggregates::{CallerError, Lead, SalesCaller};
use crate::domain::value_objects::EntityId;
use crate::ports::outbound::RepositoryError;

/// Lead assignment use cases
#[async_trait]
pub trait AssignmentUseCases: Send + Sync {
    /// Assign every lead that has no assignment record yet
    async fn run_assignment(&self) -> Result<RunSummary, UseCaseError>;

    /// Current capacity and usage snapshot
    async fn assignment_stats(&self) -> Result<AssignmentStats, UseCaseError>;

    /// Paginated ledger, newest first
    async fn assignment_history(&self, query: PageQuery) -> Result<Page<HistoryEntry>, UseCaseError>;

    /// Delete every assignment record and clear every lead link
    async fn reset_assignments(&self) -> Result<u64, UseCaseError>;
}

/// Lead intake and browsing use cases
#[async_trait]
pub trait LeadUseCases: Send + Sync {
    /// Normalize and store raw lead documents
    async fn import_leads(&self, documents: Vec<Value>) -> Result<usize, UseCaseError>;

    async fn list_leads(&self, query: PageQuery) -> Result<Page<Lead>, UseCaseError>;

    async fn delete_lead(&self, id: &EntityId) -> Result<(), UseCaseError>;
}

/// Caller roster management use cases
#[async_trait]
pub trait CallerUseCases: Send + Sync {
    /// Roster, most recently registered first
    async fn list_callers(&self) -> Result<Vec<SalesCaller>, UseCaseError>;

    async fn create_caller(&self, command: CreateCallerCommand) -> Result<SalesCaller, UseCaseError>;

    async fn update_caller(&self, id: &EntityId, command: UpdateCallerCommand) -> Result<SalesCaller, UseCaseError>;

    async fn delete_caller(&self, id: &EntityId) -> Result<(), UseCaseError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UseCaseError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    ValidationError(String),

    #[error("persistence failure: {0}")]
    PersistenceFailure(#[from] RepositoryError),
}

impl From<CallerError> for UseCaseError {
    fn from(err: CallerError) -> Self {
        Self::ValidationError(err.to_string())
    }
}
