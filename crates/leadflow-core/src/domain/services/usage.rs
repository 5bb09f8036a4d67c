//! Daily usage accounting
//!
//! Seeded once per run from the assignment ledger, then advanced in memory
//! as the run makes assignments.

use std::collections::HashMap;

use chrono::{DateTime, NaiveTime, TimeZone, Utc};

use crate::domain::aggregates::SalesCaller;
use crate::domain::value_objects::EntityId;

/// 00:00:00 UTC of the day containing `now`
pub fn start_of_utc_day(now: DateTime<Utc>) -> DateTime<Utc> {
    Utc.from_utc_datetime(&now.date_naive().and_time(NaiveTime::MIN))
}

/// Assignments received today, per caller
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DailyUsage {
    counts: HashMap<EntityId, u32>,
}

impl DailyUsage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_counts(counts: HashMap<EntityId, u32>) -> Self {
        Self { counts }
    }

    pub fn used(&self, caller_id: &EntityId) -> u32 {
        self.counts.get(caller_id).copied().unwrap_or(0)
    }

    pub fn remaining(&self, caller: &SalesCaller) -> u32 {
        caller.daily_lead_limit().saturating_sub(self.used(caller.id()))
    }

    pub fn has_capacity(&self, caller: &SalesCaller) -> bool {
        self.used(caller.id()) < caller.daily_lead_limit()
    }

    pub fn record(&mut self, caller_id: &EntityId) {
        *self.counts.entry(caller_id.clone()).or_insert(0) += 1;
    }

    pub fn total(&self) -> u64 {
        self.counts.values().map(|&c| c as u64).sum()
    }

    pub fn counts(&self) -> &HashMap<EntityId, u32> {
        &self.counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caller(limit: u32) -> SalesCaller {
        SalesCaller::create("Ana", "Agent", vec!["English".into()], limit, vec![]).unwrap()
    }

    #[test]
    fn test_start_of_day() {
        let now = Utc.with_ymd_and_hms(2024, 3, 9, 17, 45, 12).unwrap();
        assert_eq!(start_of_utc_day(now), Utc.with_ymd_and_hms(2024, 3, 9, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_capacity_tracking() {
        let ana = caller(2);
        let mut usage = DailyUsage::new();
        assert!(usage.has_capacity(&ana));
        assert_eq!(usage.remaining(&ana), 2);

        usage.record(ana.id());
        usage.record(ana.id());

        assert!(!usage.has_capacity(&ana));
        assert_eq!(usage.remaining(&ana), 0);
        assert_eq!(usage.total(), 2);
    }

    #[test]
    fn test_overshoot_reports_zero_remaining() {
        let ana = caller(1);
        let mut counts = HashMap::new();
        counts.insert(ana.id().clone(), 4);
        let usage = DailyUsage::from_counts(counts);

        assert_eq!(usage.remaining(&ana), 0);
        assert!(!usage.has_capacity(&ana));
    }
}
