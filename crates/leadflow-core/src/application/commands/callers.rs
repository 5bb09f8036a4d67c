use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use super::publish_quietly;
use crate::application::dto::*;
use crate::domain::aggregates::{CallerError, SalesCaller};
use crate::domain::events::{CallerEvent, DomainEvent};
use crate::domain::value_objects::EntityId;
use crate::ports::inbound::{CallerUseCases, UseCaseError};
use crate::ports::outbound::{CallerDirectory, EventPublisher};

/// Caller roster application service
pub struct CallerService {
    callers: Arc<dyn CallerDirectory>,
    event_publisher: Arc<dyn EventPublisher>,
}

impl CallerService {
    pub fn new(callers: Arc<dyn CallerDirectory>, event_publisher: Arc<dyn EventPublisher>) -> Self {
        Self {
            callers,
            event_publisher,
        }
    }

    async fn load(&self, id: &EntityId) -> Result<SalesCaller, UseCaseError> {
        self.callers
            .find_by_id(id)
            .await?
            .ok_or_else(|| UseCaseError::NotFound("Sales caller not found".into()))
    }
}

fn daily_limit(value: i64) -> Result<u32, UseCaseError> {
    u32::try_from(value)
        .ok()
        .filter(|&limit| limit >= 1)
        .ok_or_else(|| CallerError::InvalidDailyLimit.into())
}

#[async_trait]
impl CallerUseCases for CallerService {
    async fn list_callers(&self) -> Result<Vec<SalesCaller>, UseCaseError> {
        let mut roster = self.callers.roster().await?;
        roster.reverse();
        Ok(roster)
    }

    async fn create_caller(&self, command: CreateCallerCommand) -> Result<SalesCaller, UseCaseError> {
        let (Some(name), Some(role), Some(languages), Some(limit)) =
            (command.name, command.role, command.languages, command.daily_lead_limit)
        else {
            return Err(UseCaseError::ValidationError(
                "Name, role, languages, and daily lead limit are required".into(),
            ));
        };

        let caller = SalesCaller::create(
            name,
            role,
            languages.into_vec(),
            daily_limit(limit)?,
            command.assigned_states.map(StringList::into_vec).unwrap_or_default(),
        )?;

        self.callers.save(&caller).await?;
        info!(caller_id = %caller.id(), name = caller.name(), "Sales caller registered");

        publish_quietly(
            self.event_publisher.as_ref(),
            vec![DomainEvent::Caller(CallerEvent::Registered {
                caller_id: caller.id().clone(),
                name: caller.name().to_string(),
                daily_lead_limit: caller.daily_lead_limit(),
            })],
        )
        .await;
        Ok(caller)
    }

    async fn update_caller(&self, id: &EntityId, command: UpdateCallerCommand) -> Result<SalesCaller, UseCaseError> {
        let mut caller = self.load(id).await?;

        let limit = command.daily_lead_limit.map(daily_limit).transpose()?;
        caller.update(
            command.name,
            command.role,
            command.languages.map(StringList::into_vec),
            limit,
            command.assigned_states.map(StringList::into_vec),
        )?;

        self.callers.save(&caller).await?;
        publish_quietly(
            self.event_publisher.as_ref(),
            vec![DomainEvent::Caller(CallerEvent::Updated { caller_id: caller.id().clone() })],
        )
        .await;
        Ok(caller)
    }

    async fn delete_caller(&self, id: &EntityId) -> Result<(), UseCaseError> {
        let caller = self.load(id).await?;
        self.callers.delete(caller.id()).await?;
        info!(caller_id = %caller.id(), "Sales caller removed");

        publish_quietly(
            self.event_publisher.as_ref(),
            vec![DomainEvent::Caller(CallerEvent::Removed { caller_id: caller.id().clone() })],
        )
        .await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::events::NoOpEventPublisher;
    use crate::infrastructure::persistence::InMemoryStore;

    fn service() -> CallerService {
        CallerService::new(Arc::new(InMemoryStore::new()), Arc::new(NoOpEventPublisher))
    }

    fn command(name: &str, limit: i64) -> CreateCallerCommand {
        CreateCallerCommand {
            name: Some(name.into()),
            role: Some("Agent".into()),
            languages: Some(StringList::Csv("English, Hindi".into())),
            daily_lead_limit: Some(limit),
            assigned_states: Some(vec!["Texas", " "].into()),
        }
    }

    #[tokio::test]
    async fn test_create_and_list_newest_first() {
        let service = service();
        service.create_caller(command("Ana", 3)).await.unwrap();
        service.create_caller(command("Bea", 3)).await.unwrap();

        let roster = service.list_callers().await.unwrap();
        let names: Vec<&str> = roster.iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["Bea", "Ana"]);
        assert_eq!(roster[0].languages(), &["English".to_string(), "Hindi".to_string()]);
        assert_eq!(roster[0].region_labels(), vec!["Texas".to_string()]);
    }

    #[tokio::test]
    async fn test_missing_fields_rejected() {
        let service = service();
        let err = service
            .create_caller(CreateCallerCommand { name: Some("Ana".into()), ..Default::default() })
            .await
            .unwrap_err();

        assert!(matches!(err, UseCaseError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_non_positive_limit_rejected() {
        let service = service();
        let err = service.create_caller(command("Ana", -2)).await.unwrap_err();
        assert_eq!(err, UseCaseError::ValidationError("daily lead limit must be at least 1".into()));
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let service = service();
        let caller = service.create_caller(command("Ana", 3)).await.unwrap();

        let updated = service
            .update_caller(
                caller.id(),
                UpdateCallerCommand { daily_lead_limit: Some(9), ..Default::default() },
            )
            .await
            .unwrap();
        assert_eq!(updated.daily_lead_limit(), 9);
        assert_eq!(updated.name(), "Ana");

        service.delete_caller(caller.id()).await.unwrap();
        assert!(service.list_callers().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_caller_not_found() {
        let service = service();
        let missing = EntityId::new();

        assert!(matches!(service.delete_caller(&missing).await, Err(UseCaseError::NotFound(_))));
        assert!(matches!(
            service.update_caller(&missing, UpdateCallerCommand::default()).await,
            Err(UseCaseError::NotFound(_))
        ));
    }
}
