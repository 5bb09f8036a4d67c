use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use super::publish_quietly;
use crate::application::dto::*;
use crate::domain::aggregates::{AssignmentRecord, Lead, SalesCaller};
use crate::domain::events::{AssignmentEvent, DomainEvent};
use crate::domain::services::{
    start_of_utc_day, AssignmentEngine, DailyUsage, MatchType, RotationCursors, SkipReason,
};
use crate::ports::inbound::{AssignmentUseCases, UseCaseError};
use crate::ports::outbound::{AssignmentLedger, CallerDirectory, EventPublisher, LeadSource};

const DEFAULT_HISTORY_LIMIT: u32 = 20;

/// Lead assignment application service.
///
/// Owns the rotation cursors for its lifetime; a fresh service starts every
/// rotation context at the first candidate. Runs and resets are serialized
/// so a batch always sees the usage counts of the batch before it.
pub struct AssignmentService {
    leads: Arc<dyn LeadSource>,
    callers: Arc<dyn CallerDirectory>,
    ledger: Arc<dyn AssignmentLedger>,
    event_publisher: Arc<dyn EventPublisher>,
    cursors: RotationCursors,
    run_lock: Mutex<()>,
}

impl AssignmentService {
    pub fn new(
        leads: Arc<dyn LeadSource>,
        callers: Arc<dyn CallerDirectory>,
        ledger: Arc<dyn AssignmentLedger>,
        event_publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            leads,
            callers,
            ledger,
            event_publisher,
            cursors: RotationCursors::new(),
            run_lock: Mutex::new(()),
        }
    }

    /// Assign an explicit batch of leads already known to be unassigned
    pub async fn assign_leads(&self, leads: Vec<Lead>) -> Result<Vec<AssignmentResult>, UseCaseError> {
        let _guard = self.run_lock.lock().await;
        self.assign_batch(&leads).await
    }

    /// Rotation cursor positions keyed by context name
    pub fn rotation_snapshot(&self) -> HashMap<String, usize> {
        self.cursors.snapshot()
    }

    async fn today_usage(&self) -> Result<DailyUsage, UseCaseError> {
        let since = start_of_utc_day(Utc::now());
        Ok(DailyUsage::from_counts(self.ledger.count_since(since).await?))
    }

    async fn assign_batch(&self, leads: &[Lead]) -> Result<Vec<AssignmentResult>, UseCaseError> {
        let roster = self.callers.roster().await?;
        if roster.is_empty() {
            warn!(leads = leads.len(), "No sales callers configured; skipping batch");
            let events = leads
                .iter()
                .map(|lead| skip_event(lead, SkipReason::NoCallersConfigured))
                .collect();
            publish_quietly(self.event_publisher.as_ref(), events).await;
            return Ok(leads
                .iter()
                .map(|lead| skipped(lead, SkipReason::NoCallersConfigured))
                .collect());
        }

        let usage = self.today_usage().await?;
        let mut engine = AssignmentEngine::new(&roster, usage, &self.cursors);
        let mut results = Vec::with_capacity(leads.len());
        let mut events = Vec::new();

        for lead in leads {
            let Some(choice) = engine.choose(lead) else {
                warn!(lead_id = %lead.id(), region = lead.region_label(), "All callers at daily capacity");
                events.push(skip_event(lead, SkipReason::CapacityExhausted));
                results.push(skipped(lead, SkipReason::CapacityExhausted));
                continue;
            };

            let assigned_at = Utc::now();
            if let Err(err) = self.commit(lead, choice.caller, assigned_at).await {
                publish_quietly(self.event_publisher.as_ref(), events).await;
                return Err(err);
            }
            engine.confirm(&choice);

            debug!(
                lead_id = %lead.id(),
                caller_id = %choice.caller.id(),
                match_type = ?choice.match_type,
                "Lead assigned"
            );
            events.push(DomainEvent::Assignment(AssignmentEvent::LeadAssigned {
                lead_id: lead.id().clone(),
                caller_id: choice.caller.id().clone(),
                match_type: choice.match_type,
                assigned_at,
            }));
            results.push(assigned(lead, choice.caller, choice.match_type));
        }

        publish_quietly(self.event_publisher.as_ref(), events).await;
        Ok(results)
    }

    /// Append the record, then link the lead. A failed link withdraws the
    /// record so the lead stays retryable.
    async fn commit(&self, lead: &Lead, caller: &SalesCaller, at: DateTime<Utc>) -> Result<(), UseCaseError> {
        let record = AssignmentRecord::new(lead.id().clone(), caller.id().clone(), at);
        self.ledger.append(&record).await?;

        if let Err(err) = self.leads.set_assignee(lead.id(), Some(caller.id())).await {
            warn!(lead_id = %lead.id(), error = %err, "Lead link update failed; revoking assignment record");
            if let Err(revoke_err) = self.ledger.revoke(lead.id()).await {
                error!(lead_id = %lead.id(), error = %revoke_err, "Failed to revoke assignment record");
            }
            return Err(err.into());
        }

        Ok(())
    }
}

#[async_trait]
impl AssignmentUseCases for AssignmentService {
    async fn run_assignment(&self) -> Result<RunSummary, UseCaseError> {
        let _guard = self.run_lock.lock().await;

        let already_assigned = self.ledger.assigned_lead_ids().await?;
        let leads = self.leads.find_unassigned(&already_assigned).await?;
        if leads.is_empty() {
            info!("Assignment run found no unassigned leads");
            return Ok(RunSummary::nothing_to_assign());
        }

        let summary = RunSummary::from_results(self.assign_batch(&leads).await?);
        info!(assigned = summary.assigned, skipped = summary.skipped, "Assignment run complete");
        Ok(summary)
    }

    async fn assignment_stats(&self) -> Result<AssignmentStats, UseCaseError> {
        let usage = self.today_usage().await?;
        let roster = self.callers.roster().await?;
        let total_assignments = self.ledger.count().await?;

        let callers: Vec<CallerCapacity> = roster
            .iter()
            .map(|c| CallerCapacity {
                id: c.id().to_string(),
                name: c.name().to_string(),
                role: c.role().to_string(),
                daily_lead_limit: c.daily_lead_limit(),
                assigned_today: usage.used(c.id()),
                remaining_capacity: usage.remaining(c),
                assigned_states: c.region_labels(),
            })
            .collect();

        Ok(AssignmentStats {
            total_assignments,
            assigned_today: usage.total(),
            total_capacity: roster.iter().map(|c| c.daily_lead_limit() as u64).sum(),
            remaining_capacity: callers.iter().map(|c| c.remaining_capacity as u64).sum(),
            callers,
        })
    }

    async fn assignment_history(&self, query: PageQuery) -> Result<Page<HistoryEntry>, UseCaseError> {
        let window = PageWindow::from_query(query, DEFAULT_HISTORY_LIMIT);
        let total = self.ledger.count().await?;
        let records = self.ledger.page(window.offset(), window.limit as usize).await?;

        let callers: HashMap<_, _> = self
            .callers
            .roster()
            .await?
            .into_iter()
            .map(|c| (c.id().clone(), c))
            .collect();

        let mut entries = Vec::with_capacity(records.len());
        for record in records {
            let lead = self.leads.find_by_id(record.lead_id()).await?;
            entries.push(HistoryEntry {
                id: record.id().to_string(),
                lead_id: record.lead_id().to_string(),
                caller_id: record.caller_id().to_string(),
                lead: lead.map(|l| LeadSummary {
                    id: l.id().to_string(),
                    name: l.name().to_string(),
                    phone: l.phone().to_string(),
                    state: l.region_label().to_string(),
                }),
                caller: callers.get(record.caller_id()).map(|c| CallerSummary {
                    id: c.id().to_string(),
                    name: c.name().to_string(),
                    role: c.role().to_string(),
                    assigned_states: c.region_labels(),
                }),
                assigned_at: record.assigned_at(),
            });
        }

        Ok(Page::new(entries, window, total))
    }

    async fn reset_assignments(&self) -> Result<u64, UseCaseError> {
        let _guard = self.run_lock.lock().await;

        let cleared = self.ledger.clear().await?;
        self.leads.clear_all_assignees().await?;
        info!(records_cleared = cleared, "All assignments cleared");

        publish_quietly(
            self.event_publisher.as_ref(),
            vec![DomainEvent::Assignment(AssignmentEvent::Reset {
                records_cleared: cleared,
                reset_at: Utc::now(),
            })],
        )
        .await;
        Ok(cleared)
    }
}

fn assigned(lead: &Lead, caller: &SalesCaller, match_type: MatchType) -> AssignmentResult {
    AssignmentResult {
        lead_id: lead.id().to_string(),
        lead_name: lead.name().to_string(),
        caller_id: caller.id().to_string(),
        caller_name: caller.name().to_string(),
        state: lead.region_label().to_string(),
        match_type,
        reason: None,
    }
}

fn skipped(lead: &Lead, reason: SkipReason) -> AssignmentResult {
    AssignmentResult {
        lead_id: lead.id().to_string(),
        lead_name: lead.name().to_string(),
        caller_id: String::new(),
        caller_name: String::new(),
        state: lead.region_label().to_string(),
        match_type: MatchType::Skipped,
        reason: Some(reason.to_string()),
    }
}

fn skip_event(lead: &Lead, reason: SkipReason) -> DomainEvent {
    DomainEvent::Assignment(AssignmentEvent::LeadSkipped {
        lead_id: lead.id().clone(),
        reason,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    use chrono::Duration;

    use crate::domain::value_objects::{EntityId, Region};
    use crate::infrastructure::events::NoOpEventPublisher;
    use crate::infrastructure::persistence::InMemoryStore;
    use crate::ports::outbound::RepositoryError;

    struct Fixture {
        store: Arc<InMemoryStore>,
        service: AssignmentService,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(InMemoryStore::new());
        let service = AssignmentService::new(
            store.clone(),
            store.clone(),
            store.clone(),
            Arc::new(NoOpEventPublisher),
        );
        Fixture { store, service }
    }

    async fn add_caller(store: &InMemoryStore, name: &str, limit: u32, regions: &[&str]) -> SalesCaller {
        let caller = SalesCaller::create(
            name,
            "Agent",
            vec!["English".into()],
            limit,
            regions.iter().map(|r| r.to_string()).collect(),
        )
        .unwrap();
        store.save(&caller).await.unwrap();
        caller
    }

    async fn add_lead(store: &InMemoryStore, name: &str, region: &str) -> Lead {
        let lead = Lead::create(name, Region::parse(region));
        store.insert(&lead).await.unwrap();
        lead
    }

    #[tokio::test]
    async fn test_mixed_region_run() {
        let Fixture { store, service } = fixture();
        let a = add_caller(&store, "A", 2, &["Texas"]).await;
        let b = add_caller(&store, "B", 2, &[]).await;
        for (name, region) in [("L1", "Texas"), ("L2", "Texas"), ("L3", "Texas"), ("L4", "California")] {
            add_lead(&store, name, region).await;
        }

        let summary = service.run_assignment().await.unwrap();

        let got: Vec<(&str, &str, MatchType)> = summary
            .results
            .iter()
            .map(|r| (r.lead_name.as_str(), r.caller_name.as_str(), r.match_type))
            .collect();
        assert_eq!(
            got,
            vec![
                ("L1", "A", MatchType::RegionMatch),
                ("L2", "A", MatchType::RegionMatch),
                ("L3", "B", MatchType::GlobalRotation),
                ("L4", "B", MatchType::GlobalRotation),
            ]
        );
        assert_eq!(summary.assigned, 4);
        assert_eq!(summary.skipped, 0);
        assert_eq!(summary.results[3].state, "California");

        let stats = service.assignment_stats().await.unwrap();
        assert_eq!(stats.total_assignments, 4);
        assert_eq!(stats.remaining_capacity, 0);
        for caller in [&a, &b] {
            let row = stats.callers.iter().find(|c| c.id == caller.id().as_str()).unwrap();
            assert_eq!(row.assigned_today, 2);
        }

        let leads = LeadSource::list(store.as_ref(), 0, 10).await.unwrap().0;
        assert!(leads.iter().all(|l| l.is_assigned()));
    }

    #[tokio::test]
    async fn test_fifth_lead_skipped_when_roster_full() {
        let Fixture { store, service } = fixture();
        add_caller(&store, "A", 2, &["Texas"]).await;
        add_caller(&store, "B", 2, &[]).await;
        for name in ["L1", "L2", "L3", "L4", "L5"] {
            add_lead(&store, name, "Texas").await;
        }

        let summary = service.run_assignment().await.unwrap();

        assert_eq!(summary.assigned, 4);
        assert_eq!(summary.skipped, 1);
        let last = summary.results.last().unwrap();
        assert_eq!(last.match_type, MatchType::Skipped);
        assert_eq!(last.reason.as_deref(), Some("all callers at daily capacity"));
        assert_eq!(last.caller_id, "");
        assert_eq!(AssignmentLedger::count(store.as_ref()).await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_second_run_assigns_nothing_new() {
        let Fixture { store, service } = fixture();
        add_caller(&store, "A", 10, &[]).await;
        add_lead(&store, "L1", "").await;
        add_lead(&store, "L2", "").await;

        service.run_assignment().await.unwrap();
        let second = service.run_assignment().await.unwrap();

        assert_eq!(second.message, "No unassigned leads found");
        assert_eq!(second.assigned, 0);
        assert!(second.results.is_empty());
        assert_eq!(AssignmentLedger::count(store.as_ref()).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_skipped_lead_picked_up_by_later_run() {
        let Fixture { store, service } = fixture();
        let lead = add_lead(&store, "L1", "Ohio").await;

        let first = service.run_assignment().await.unwrap();
        assert_eq!(first.results[0].reason.as_deref(), Some("no callers configured"));

        add_caller(&store, "A", 1, &["ohio"]).await;
        let second = service.run_assignment().await.unwrap();

        assert_eq!(second.results[0].lead_id, lead.id().as_str());
        assert_eq!(second.results[0].match_type, MatchType::RegionMatch);
    }

    #[tokio::test]
    async fn test_no_callers_skips_everything() {
        let Fixture { store, service } = fixture();
        add_lead(&store, "L1", "Texas").await;
        add_lead(&store, "L2", "").await;

        let summary = service.run_assignment().await.unwrap();

        assert_eq!(summary.skipped, 2);
        assert!(summary
            .results
            .iter()
            .all(|r| r.reason.as_deref() == Some("no callers configured")));
        assert_eq!(AssignmentLedger::count(store.as_ref()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_todays_usage_is_respected() {
        let Fixture { store, service } = fixture();
        let a = add_caller(&store, "A", 2, &[]).await;
        store.append(&AssignmentRecord::new(EntityId::new(), a.id().clone(), Utc::now())).await.unwrap();
        store.append(&AssignmentRecord::new(EntityId::new(), a.id().clone(), Utc::now())).await.unwrap();
        add_lead(&store, "L1", "").await;
        add_lead(&store, "L2", "").await;

        let summary = service.run_assignment().await.unwrap();

        assert_eq!(summary.skipped, 2);
        assert_eq!(AssignmentLedger::count(store.as_ref()).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_yesterdays_assignments_do_not_count() {
        let Fixture { store, service } = fixture();
        let a = add_caller(&store, "A", 1, &[]).await;
        let yesterday = start_of_utc_day(Utc::now()) - Duration::seconds(1);
        store.append(&AssignmentRecord::new(EntityId::new(), a.id().clone(), yesterday)).await.unwrap();
        add_lead(&store, "L1", "").await;

        let summary = service.run_assignment().await.unwrap();
        assert_eq!(summary.assigned, 1);

        let stats = service.assignment_stats().await.unwrap();
        assert_eq!(stats.total_assignments, 2);
        assert_eq!(stats.assigned_today, 1);
    }

    #[tokio::test]
    async fn test_reset_clears_ledger_and_links_but_not_cursors() {
        let Fixture { store, service } = fixture();
        add_caller(&store, "A", 5, &[]).await;
        add_caller(&store, "B", 5, &[]).await;
        add_lead(&store, "L1", "").await;

        let first = service.run_assignment().await.unwrap();
        assert_eq!(first.results[0].caller_name, "A");

        let cleared = service.reset_assignments().await.unwrap();
        assert_eq!(cleared, 1);
        assert_eq!(service.reset_assignments().await.unwrap(), 0);

        let stats = service.assignment_stats().await.unwrap();
        assert_eq!(stats.total_assignments, 0);
        assert_eq!(stats.assigned_today, 0);
        let leads = LeadSource::list(store.as_ref(), 0, 10).await.unwrap().0;
        assert!(leads.iter().all(|l| !l.is_assigned()));

        // rotation resumes where it left off
        let again = service.run_assignment().await.unwrap();
        assert_eq!(again.results[0].caller_name, "B");
        assert_eq!(service.rotation_snapshot().get("global"), Some(&0));
    }

    #[tokio::test]
    async fn test_stats_capacity_totals() {
        let Fixture { store, service } = fixture();
        add_caller(&store, "A", 3, &["Texas"]).await;
        add_caller(&store, "B", 4, &[]).await;
        add_lead(&store, "L1", "Texas").await;

        service.run_assignment().await.unwrap();
        let stats = service.assignment_stats().await.unwrap();

        assert_eq!(stats.total_capacity, 7);
        assert_eq!(stats.remaining_capacity, 6);
        assert_eq!(stats.assigned_today, 1);
        let a = stats.callers.iter().find(|c| c.name == "A").unwrap();
        assert_eq!(a.remaining_capacity, 2);
        assert_eq!(a.assigned_states, vec!["Texas".to_string()]);
    }

    #[tokio::test]
    async fn test_history_pages_newest_first_with_joins() {
        let Fixture { store, service } = fixture();
        let a = add_caller(&store, "A", 10, &["Texas"]).await;
        let old_lead = add_lead(&store, "Old", "Texas").await;
        store
            .append(&AssignmentRecord::new(old_lead.id().clone(), a.id().clone(), Utc::now() - Duration::hours(1)))
            .await
            .unwrap();
        add_lead(&store, "New", "Texas").await;
        service.run_assignment().await.unwrap();

        let page = service.assignment_history(PageQuery::new(Some(1), Some(1))).await.unwrap();

        assert_eq!(page.total, 2);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.data.len(), 1);
        let entry = &page.data[0];
        assert_eq!(entry.lead.as_ref().unwrap().name, "New");
        assert_eq!(entry.caller.as_ref().unwrap().assigned_states, vec!["Texas".to_string()]);

        LeadSource::delete(store.as_ref(), old_lead.id()).await.unwrap();
        let second = service.assignment_history(PageQuery::new(Some(2), Some(1))).await.unwrap();
        assert_eq!(second.data[0].lead_id, old_lead.id().as_str());
        assert!(second.data[0].lead.is_none());
    }

    /// Lead store whose link update fails for one lead
    struct FailingLinkStore {
        inner: Arc<InMemoryStore>,
        fail_on: EntityId,
    }

    #[async_trait]
    impl LeadSource for FailingLinkStore {
        async fn find_unassigned(&self, assigned: &HashSet<EntityId>) -> Result<Vec<Lead>, RepositoryError> {
            self.inner.find_unassigned(assigned).await
        }

        async fn find_by_id(&self, id: &EntityId) -> Result<Option<Lead>, RepositoryError> {
            LeadSource::find_by_id(self.inner.as_ref(), id).await
        }

        async fn list(&self, offset: usize, limit: usize) -> Result<(Vec<Lead>, u64), RepositoryError> {
            self.inner.list(offset, limit).await
        }

        async fn insert(&self, lead: &Lead) -> Result<(), RepositoryError> {
            self.inner.insert(lead).await
        }

        async fn set_assignee(&self, lead_id: &EntityId, caller_id: Option<&EntityId>) -> Result<(), RepositoryError> {
            if lead_id == &self.fail_on {
                return Err(RepositoryError::Storage("write concern timeout".into()));
            }
            self.inner.set_assignee(lead_id, caller_id).await
        }

        async fn clear_all_assignees(&self) -> Result<(), RepositoryError> {
            self.inner.clear_all_assignees().await
        }

        async fn delete(&self, id: &EntityId) -> Result<(), RepositoryError> {
            LeadSource::delete(self.inner.as_ref(), id).await
        }
    }

    #[tokio::test]
    async fn test_failed_link_aborts_batch_and_revokes_record() {
        let store = Arc::new(InMemoryStore::new());
        add_caller(&store, "A", 10, &[]).await;
        add_caller(&store, "B", 10, &[]).await;
        add_caller(&store, "C", 10, &[]).await;
        let l1 = add_lead(&store, "L1", "").await;
        let l2 = add_lead(&store, "L2", "").await;
        let l3 = add_lead(&store, "L3", "").await;

        let leads = Arc::new(FailingLinkStore { inner: store.clone(), fail_on: l2.id().clone() });
        let service = AssignmentService::new(leads, store.clone(), store.clone(), Arc::new(NoOpEventPublisher));

        let err = service.run_assignment().await.unwrap_err();
        assert!(matches!(err, UseCaseError::PersistenceFailure(RepositoryError::Storage(_))));

        let assigned = store.assigned_lead_ids().await.unwrap();
        assert!(assigned.contains(l1.id()));
        assert!(!assigned.contains(l2.id()));
        assert!(!assigned.contains(l3.id()));

        // L1 went to A; the revoked pick of B must not move the cursor
        assert_eq!(service.rotation_snapshot().get("global"), Some(&1));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_runs_never_overbook() {
        let store = Arc::new(InMemoryStore::new());
        let service = Arc::new(AssignmentService::new(
            store.clone(),
            store.clone(),
            store.clone(),
            Arc::new(NoOpEventPublisher),
        ));
        add_caller(&store, "A", 2, &["Texas"]).await;
        add_caller(&store, "B", 1, &[]).await;
        add_caller(&store, "C", 2, &["Ohio"]).await;
        for i in 0..12 {
            let region = ["Texas", "Ohio", ""][i % 3];
            add_lead(&store, &format!("L{i}"), region).await;
        }

        let first = tokio::spawn({
            let service = service.clone();
            async move { service.run_assignment().await }
        });
        let second = tokio::spawn({
            let service = service.clone();
            async move { service.run_assignment().await }
        });
        let (first, second) = (first.await.unwrap().unwrap(), second.await.unwrap().unwrap());

        assert_eq!(first.assigned + second.assigned, 5);

        let stats = service.assignment_stats().await.unwrap();
        for caller in &stats.callers {
            assert!(caller.assigned_today <= caller.daily_lead_limit, "{} overbooked", caller.name);
        }

        let records = store.page(0, 100).await.unwrap();
        let lead_ids: HashSet<_> = records.iter().map(|r| r.lead_id().clone()).collect();
        assert_eq!(records.len(), 5);
        assert_eq!(lead_ids.len(), records.len());

        let leads = LeadSource::list(store.as_ref(), 0, 100).await.unwrap().0;
        for lead in leads {
            let record = records.iter().find(|r| r.lead_id() == lead.id());
            assert_eq!(lead.assigned_to(), record.map(|r| r.caller_id()));
        }
    }

    #[tokio::test]
    async fn test_assign_explicit_batch() {
        let Fixture { store, service } = fixture();
        add_caller(&store, "A", 1, &["Utah"]).await;
        let lead = add_lead(&store, "L1", "utah").await;

        let results = service.assign_leads(vec![lead]).await.unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].match_type, MatchType::RegionMatch);
        assert_eq!(results[0].state, "utah");
    }
}
