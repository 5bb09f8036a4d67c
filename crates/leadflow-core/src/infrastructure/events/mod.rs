//! Event publisher adapters

use async_trait::async_trait;

use crate::domain::DomainEvent;
use crate::ports::outbound::{EventPublisher, RepositoryError};

/// Discards every event
#[derive(Default)]
pub struct NoOpEventPublisher;

#[async_trait]
impl EventPublisher for NoOpEventPublisher {
    async fn publish(&self, _events: Vec<DomainEvent>) -> Result<(), RepositoryError> {
        Ok(())
    }
}

/// Emits every event as a structured log line
#[derive(Default)]
pub struct TracingEventPublisher;

#[async_trait]
impl EventPublisher for TracingEventPublisher {
    async fn publish(&self, events: Vec<DomainEvent>) -> Result<(), RepositoryError> {
        for event in &events {
            match event.aggregate_id() {
                Some(id) => tracing::info!(event_type = event.event_type(), aggregate_id = %id, "domain event"),
                None => tracing::info!(event_type = event.event_type(), "domain event"),
            }
        }
        Ok(())
    }
}
