//! Lead assignment engine
//!
//! Per lead: try a round-robin pick among callers servicing the lead's
//! region, then a round-robin pick across the whole roster, otherwise skip.
//! A caller is eligible only while its usage today is below its daily limit.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::aggregates::{Lead, SalesCaller};
use crate::domain::services::rotation::{RotationCursors, RotationKey};
use crate::domain::services::usage::DailyUsage;
use crate::domain::value_objects::Region;

/// How a lead was disposed of by a run
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum MatchType {
    #[serde(rename = "state")]
    RegionMatch,
    #[serde(rename = "global")]
    GlobalRotation,
    #[serde(rename = "skipped")]
    Skipped,
}

impl MatchType {
    pub fn is_assigned(&self) -> bool {
        !matches!(self, MatchType::Skipped)
    }
}

/// Why a lead was left unassigned
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    NoCallersConfigured,
    CapacityExhausted,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoCallersConfigured => write!(f, "no callers configured"),
            Self::CapacityExhausted => write!(f, "all callers at daily capacity"),
        }
    }
}

/// A pick awaiting commit. The rotation cursor only moves once the pick is
/// confirmed.
#[derive(Clone, Debug)]
pub struct Choice<'a> {
    pub caller: &'a SalesCaller,
    pub match_type: MatchType,
    key: RotationKey,
    position: usize,
    len: usize,
}

/// Find the first candidate with spare capacity, scanning from the
/// context's cursor and wrapping once around the list. Returns the
/// candidate's position; the cursor itself is left untouched.
pub fn pick_round_robin<'a>(
    candidates: &[&'a SalesCaller],
    usage: &DailyUsage,
    cursors: &RotationCursors,
    key: &RotationKey,
) -> Option<(usize, &'a SalesCaller)> {
    let len = candidates.len();
    if len == 0 {
        return None;
    }

    let start = cursors.start(key);
    (0..len)
        .map(|offset| (start + offset) % len)
        .map(|idx| (idx, candidates[idx]))
        .find(|(_, caller)| usage.has_capacity(caller))
}

/// Engine state for one assignment run
pub struct AssignmentEngine<'a> {
    roster: Vec<&'a SalesCaller>,
    by_region: HashMap<String, Vec<&'a SalesCaller>>,
    usage: DailyUsage,
    cursors: &'a RotationCursors,
}

impl<'a> AssignmentEngine<'a> {
    pub fn new(roster: &'a [SalesCaller], usage: DailyUsage, cursors: &'a RotationCursors) -> Self {
        let mut by_region: HashMap<String, Vec<&'a SalesCaller>> = HashMap::new();
        for caller in roster {
            for key in caller.region_keys() {
                by_region.entry(key.to_string()).or_default().push(caller);
            }
        }

        Self {
            roster: roster.iter().collect(),
            by_region,
            usage,
            cursors,
        }
    }

    pub fn has_callers(&self) -> bool {
        !self.roster.is_empty()
    }

    /// Callers indexed under the region, in roster order
    pub fn region_candidates(&self, region: &Region) -> &[&'a SalesCaller] {
        self.by_region.get(region.key()).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn usage(&self) -> &DailyUsage {
        &self.usage
    }

    /// Choose a caller for the lead, or `None` when everyone eligible is full
    pub fn choose(&self, lead: &Lead) -> Option<Choice<'a>> {
        if let Some(region) = lead.region() {
            let candidates = self.region_candidates(region);
            if !candidates.is_empty() {
                let key = RotationKey::region(region);
                if let Some((position, caller)) = pick_round_robin(candidates, &self.usage, self.cursors, &key) {
                    return Some(Choice {
                        caller,
                        match_type: MatchType::RegionMatch,
                        key,
                        position,
                        len: candidates.len(),
                    });
                }
            }
        }

        let key = RotationKey::Global;
        pick_round_robin(&self.roster, &self.usage, self.cursors, &key).map(|(position, caller)| Choice {
            caller,
            match_type: MatchType::GlobalRotation,
            key,
            position,
            len: self.roster.len(),
        })
    }

    /// Record a committed pick: count it against the caller's daily usage
    /// and move the context's cursor past the winner
    pub fn confirm(&mut self, choice: &Choice<'_>) {
        self.usage.record(choice.caller.id());
        self.cursors.advance(&choice.key, choice.position, choice.len);
    }
}
