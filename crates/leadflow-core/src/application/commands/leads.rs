use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use tracing::info;

use super::publish_quietly;
use crate::application::dto::*;
use crate::domain::aggregates::Lead;
use crate::domain::events::{DomainEvent, LeadEvent};
use crate::domain::value_objects::EntityId;
use crate::infrastructure::import::RawLead;
use crate::ports::inbound::{LeadUseCases, UseCaseError};
use crate::ports::outbound::{EventPublisher, LeadSource};

const DEFAULT_LEAD_LIMIT: u32 = 10;

/// Lead intake and browsing application service
pub struct LeadService {
    leads: Arc<dyn LeadSource>,
    event_publisher: Arc<dyn EventPublisher>,
}

impl LeadService {
    pub fn new(leads: Arc<dyn LeadSource>, event_publisher: Arc<dyn EventPublisher>) -> Self {
        Self {
            leads,
            event_publisher,
        }
    }

    /// Reject a batch that repeats an id, or reuses one already stored,
    /// before anything is written
    async fn ensure_new_ids(&self, leads: &[Lead]) -> Result<(), UseCaseError> {
        let mut seen = HashSet::with_capacity(leads.len());
        for lead in leads {
            if !seen.insert(lead.id()) || self.leads.find_by_id(lead.id()).await?.is_some() {
                return Err(UseCaseError::ValidationError(format!("duplicate lead id {}", lead.id())));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl LeadUseCases for LeadService {
    async fn import_leads(&self, documents: Vec<Value>) -> Result<usize, UseCaseError> {
        let now = Utc::now();
        let leads = documents
            .into_iter()
            .enumerate()
            .map(|(idx, doc)| {
                RawLead::from_value(doc)
                    .map(|raw| raw.normalize(now))
                    .ok_or_else(|| {
                        UseCaseError::ValidationError(format!("lead document at index {} must be a JSON object", idx))
                    })
            })
            .collect::<Result<Vec<Lead>, _>>()?;
        self.ensure_new_ids(&leads).await?;

        let mut events = Vec::with_capacity(leads.len());
        for lead in &leads {
            self.leads.insert(lead).await?;
            events.push(DomainEvent::Lead(LeadEvent::Imported {
                lead_id: lead.id().clone(),
                imported_at: now,
            }));
        }

        info!(count = leads.len(), "Leads imported");
        publish_quietly(self.event_publisher.as_ref(), events).await;
        Ok(leads.len())
    }

    async fn list_leads(&self, query: PageQuery) -> Result<Page<Lead>, UseCaseError> {
        let window = PageWindow::from_query(query, DEFAULT_LEAD_LIMIT);
        let (leads, total) = self.leads.list(window.offset(), window.limit as usize).await?;
        Ok(Page::new(leads, window, total))
    }

    async fn delete_lead(&self, id: &EntityId) -> Result<(), UseCaseError> {
        if self.leads.find_by_id(id).await?.is_none() {
            return Err(UseCaseError::NotFound("Lead not found".into()));
        }
        self.leads.delete(id).await?;

        publish_quietly(
            self.event_publisher.as_ref(),
            vec![DomainEvent::Lead(LeadEvent::Removed { lead_id: id.clone() })],
        )
        .await;
        Ok(())
    }
}
