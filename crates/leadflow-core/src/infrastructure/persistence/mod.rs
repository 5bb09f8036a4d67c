//! In-memory document store
//!
//! One store backs all three collaborator ports (leads, callers, assignment
//! records), mirroring a single document database with three collections.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use crate::domain::aggregates::{AssignmentRecord, Lead, SalesCaller};
use crate::domain::value_objects::EntityId;
use crate::ports::outbound::{AssignmentLedger, CallerDirectory, LeadSource, RepositoryError};

#[derive(Default)]
pub struct InMemoryStore {
    leads: RwLock<Vec<Lead>>,
    callers: RwLock<Vec<SalesCaller>>,
    assignments: RwLock<Vec<AssignmentRecord>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LeadSource for InMemoryStore {
    async fn find_unassigned(&self, assigned: &HashSet<EntityId>) -> Result<Vec<Lead>, RepositoryError> {
        Ok(self
            .leads
            .read()
            .iter()
            .filter(|l| !assigned.contains(l.id()))
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: &EntityId) -> Result<Option<Lead>, RepositoryError> {
        Ok(self.leads.read().iter().find(|l| l.id() == id).cloned())
    }

    async fn list(&self, offset: usize, limit: usize) -> Result<(Vec<Lead>, u64), RepositoryError> {
        let leads = self.leads.read();
        let mut newest_first: Vec<&Lead> = leads.iter().rev().collect();
        newest_first.sort_by(|a, b| b.created_at().cmp(&a.created_at()));

        let page = newest_first.into_iter().skip(offset).take(limit).cloned().collect();
        Ok((page, leads.len() as u64))
    }

    async fn insert(&self, lead: &Lead) -> Result<(), RepositoryError> {
        let mut leads = self.leads.write();
        if leads.iter().any(|l| l.id() == lead.id()) {
            return Err(RepositoryError::DuplicateKey(lead.id().to_string()));
        }
        leads.push(lead.clone());
        Ok(())
    }

    async fn set_assignee(&self, lead_id: &EntityId, caller_id: Option<&EntityId>) -> Result<(), RepositoryError> {
        let mut leads = self.leads.write();
        let lead = leads
            .iter_mut()
            .find(|l| l.id() == lead_id)
            .ok_or_else(|| RepositoryError::NotFound(lead_id.to_string()))?;
        match caller_id {
            Some(caller_id) => lead.assign_to(caller_id.clone()),
            None => lead.clear_assignment(),
        }
        Ok(())
    }

    async fn clear_all_assignees(&self) -> Result<(), RepositoryError> {
        for lead in self.leads.write().iter_mut() {
            lead.clear_assignment();
        }
        Ok(())
    }

    async fn delete(&self, id: &EntityId) -> Result<(), RepositoryError> {
        self.leads.write().retain(|l| l.id() != id);
        Ok(())
    }
}

#[async_trait]
impl CallerDirectory for InMemoryStore {
    async fn roster(&self) -> Result<Vec<SalesCaller>, RepositoryError> {
        Ok(self.callers.read().clone())
    }

    async fn find_by_id(&self, id: &EntityId) -> Result<Option<SalesCaller>, RepositoryError> {
        Ok(self.callers.read().iter().find(|c| c.id() == id).cloned())
    }

    async fn save(&self, caller: &SalesCaller) -> Result<(), RepositoryError> {
        let mut callers = self.callers.write();
        match callers.iter_mut().find(|c| c.id() == caller.id()) {
            Some(existing) => *existing = caller.clone(),
            None => callers.push(caller.clone()),
        }
        Ok(())
    }

    async fn delete(&self, id: &EntityId) -> Result<(), RepositoryError> {
        self.callers.write().retain(|c| c.id() != id);
        Ok(())
    }
}

#[async_trait]
impl AssignmentLedger for InMemoryStore {
    async fn append(&self, record: &AssignmentRecord) -> Result<(), RepositoryError> {
        let mut assignments = self.assignments.write();
        if assignments.iter().any(|a| a.lead_id() == record.lead_id()) {
            return Err(RepositoryError::DuplicateKey(format!("leadId {}", record.lead_id())));
        }
        assignments.push(record.clone());
        Ok(())
    }

    async fn revoke(&self, lead_id: &EntityId) -> Result<(), RepositoryError> {
        self.assignments.write().retain(|a| a.lead_id() != lead_id);
        Ok(())
    }

    async fn assigned_lead_ids(&self) -> Result<HashSet<EntityId>, RepositoryError> {
        Ok(self.assignments.read().iter().map(|a| a.lead_id().clone()).collect())
    }

    async fn count_since(&self, since: DateTime<Utc>) -> Result<HashMap<EntityId, u32>, RepositoryError> {
        let mut counts = HashMap::new();
        for record in self.assignments.read().iter().filter(|a| a.assigned_at() >= since) {
            *counts.entry(record.caller_id().clone()).or_insert(0) += 1;
        }
        Ok(counts)
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        Ok(self.assignments.read().len() as u64)
    }

    async fn page(&self, offset: usize, limit: usize) -> Result<Vec<AssignmentRecord>, RepositoryError> {
        let assignments = self.assignments.read();
        let mut newest_first: Vec<&AssignmentRecord> = assignments.iter().rev().collect();
        newest_first.sort_by(|a, b| b.assigned_at().cmp(&a.assigned_at()));
        Ok(newest_first.into_iter().skip(offset).take(limit).cloned().collect())
    }

    async fn clear(&self) -> Result<u64, RepositoryError> {
        let mut assignments = self.assignments.write();
        let cleared = assignments.len() as u64;
        assignments.clear();
        Ok(cleared)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn caller(name: &str) -> SalesCaller {
        SalesCaller::create(name, "Agent", vec!["English".into()], 3, vec![]).unwrap()
    }

    #[tokio::test]
    async fn test_ledger_rejects_second_record_for_lead() {
        let store = InMemoryStore::new();
        let lead = EntityId::new();

        store.append(&AssignmentRecord::new(lead.clone(), EntityId::new(), Utc::now())).await.unwrap();
        let err = store
            .append(&AssignmentRecord::new(lead, EntityId::new(), Utc::now()))
            .await
            .unwrap_err();

        assert!(matches!(err, RepositoryError::DuplicateKey(_)));
        assert_eq!(AssignmentLedger::count(&store).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_count_since_groups_by_caller() {
        let store = InMemoryStore::new();
        let now = Utc::now();
        let (a, b) = (EntityId::new(), EntityId::new());

        store.append(&AssignmentRecord::new(EntityId::new(), a.clone(), now)).await.unwrap();
        store.append(&AssignmentRecord::new(EntityId::new(), a.clone(), now)).await.unwrap();
        store.append(&AssignmentRecord::new(EntityId::new(), b.clone(), now - Duration::days(2))).await.unwrap();

        let counts = store.count_since(now - Duration::hours(1)).await.unwrap();
        assert_eq!(counts.get(&a), Some(&2));
        assert_eq!(counts.get(&b), None);
    }

    #[tokio::test]
    async fn test_page_newest_first() {
        let store = InMemoryStore::new();
        let now = Utc::now();
        let caller_id = EntityId::new();
        for minutes in [30, 10, 20] {
            store
                .append(&AssignmentRecord::new(EntityId::new(), caller_id.clone(), now - Duration::minutes(minutes)))
                .await
                .unwrap();
        }

        let page = store.page(0, 2).await.unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].assigned_at(), now - Duration::minutes(10));
        assert_eq!(page[1].assigned_at(), now - Duration::minutes(20));
    }

    #[tokio::test]
    async fn test_unassigned_preserves_intake_order() {
        let store = InMemoryStore::new();
        let leads: Vec<Lead> = ["a", "b", "c"].iter().map(|n| Lead::create(*n, None)).collect();
        for lead in &leads {
            store.insert(lead).await.unwrap();
        }

        let assigned: HashSet<EntityId> = [leads[1].id().clone()].into_iter().collect();
        let names: Vec<String> = store
            .find_unassigned(&assigned)
            .await
            .unwrap()
            .iter()
            .map(|l| l.name().to_string())
            .collect();

        assert_eq!(names, vec!["a", "c"]);
    }

    #[tokio::test]
    async fn test_set_assignee_unknown_lead() {
        let store = InMemoryStore::new();
        let err = store.set_assignee(&EntityId::new(), None).await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_caller_save_replaces_in_place() {
        let store = InMemoryStore::new();
        let mut ana = caller("Ana");
        store.save(&ana).await.unwrap();
        store.save(&caller("Bea")).await.unwrap();

        ana.update(None, None, None, Some(8), None).unwrap();
        store.save(&ana).await.unwrap();

        let roster = store.roster().await.unwrap();
        assert_eq!(roster.len(), 2);
        assert_eq!(roster[0].name(), "Ana");
        assert_eq!(roster[0].daily_lead_limit(), 8);
    }
}
