//! Command handlers
//!
//! Application services that orchestrate use cases.

mod assignment;
mod callers;
mod leads;

pub use assignment::AssignmentService;
pub use callers::CallerService;
pub use leads::LeadService;

use crate::domain::DomainEvent;
use crate::ports::outbound::EventPublisher;

/// Publish events after a committed change; failures are only logged
async fn publish_quietly(publisher: &dyn EventPublisher, events: Vec<DomainEvent>) {
    if events.is_empty() {
        return;
    }
    let count = events.len();
    if let Err(err) = publisher.publish(events).await {
        tracing::warn!(error = %err, count, "Failed to publish domain events");
    }
}
