//! Leadflow lead management core
//!
//! Assigns incoming sales leads to a roster of sales callers, preferring
//! callers that service the lead's region and falling back to a global
//! rotation, while never exceeding any caller's daily lead limit.
//!
//! ## Architecture
//!
//! - **Domain Layer**: Lead / SalesCaller aggregates, assignment records,
//!   rotation cursors, daily usage accounting and the assignment engine
//! - **Application Layer**: Use case orchestration, DTOs
//! - **Ports Layer**: Hexagonal architecture interfaces (Lead Source,
//!   Caller Directory, Assignment Ledger, event publishing)
//! - **Infrastructure Layer**: In-memory document store, raw lead
//!   normalization, event publishers

pub mod domain;
pub mod application;
pub mod ports;
pub mod infrastructure;

// Re-exports for convenience
pub use domain::aggregates::{AssignmentRecord, CallerError, Lead, LeadStatus, SalesCaller};
pub use domain::value_objects::{EntityId, Region};
pub use domain::events::{AssignmentEvent, CallerEvent, DomainEvent, LeadEvent};
pub use domain::services::{
    start_of_utc_day, AssignmentEngine, Choice, DailyUsage, MatchType, RotationCursors, RotationKey,
    SkipReason,
};
pub use application::{AssignmentService, CallerService, LeadService};
pub use ports::inbound::{AssignmentUseCases, CallerUseCases, LeadUseCases, UseCaseError};
pub use ports::outbound::{AssignmentLedger, CallerDirectory, EventPublisher, LeadSource, RepositoryError};
