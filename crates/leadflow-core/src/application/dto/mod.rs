//! Data Transfer Objects (DTOs)
//!
//! Objects for transferring data across boundaries. Field names are
//! camelCase on the wire.

use chrono::{DateTime, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::services::MatchType;

pub const MAX_PAGE_LIMIT: u32 = 100;

// =============================================================================
// Paging
// =============================================================================

/// Requested page; missing or out-of-range values fall back to sane bounds
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl PageQuery {
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        Self { page, limit }
    }

    /// Page number (>= 1) and limit (1..=100)
    pub fn resolve(&self, default_limit: u32) -> (u32, u32) {
        let page = match self.page {
            Some(p) if p >= 1 => p.min(u32::MAX as i64) as u32,
            _ => 1,
        };
        let limit = match self.limit {
            Some(l) if l >= 1 => l.min(MAX_PAGE_LIMIT as i64) as u32,
            _ => default_limit.clamp(1, MAX_PAGE_LIMIT),
        };
        (page, limit)
    }
}

/// Page number and limit after resolution, plus the matching window
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageWindow {
    pub page: u32,
    pub limit: u32,
}

impl PageWindow {
    pub fn from_query(query: PageQuery, default_limit: u32) -> Self {
        let (page, limit) = query.resolve(default_limit);
        Self { page, limit }
    }

    pub fn offset(&self) -> usize {
        (self.page as usize - 1) * self.limit as usize
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub data: Vec<T>,
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u64,
}

impl<T> Page<T> {
    pub fn new(data: Vec<T>, window: PageWindow, total: u64) -> Self {
        let limit = window.limit.max(1) as u64;
        Self {
            data,
            page: window.page,
            limit: window.limit,
            total,
            total_pages: total.div_ceil(limit),
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            data: self.data.into_iter().map(f).collect(),
            page: self.page,
            limit: self.limit,
            total: self.total,
            total_pages: self.total_pages,
        }
    }
}

// =============================================================================
// Caller Commands
// =============================================================================

/// A list given either as an array or as a comma-separated string
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(untagged)]
pub enum StringList {
    List(Vec<String>),
    Csv(String),
}

impl StringList {
    pub fn into_vec(self) -> Vec<String> {
        let items: Vec<String> = match self {
            StringList::List(items) => items,
            StringList::Csv(raw) => raw.split(',').map(str::to_string).collect(),
        };
        items
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

impl From<Vec<&str>> for StringList {
    fn from(items: Vec<&str>) -> Self {
        StringList::List(items.into_iter().map(str::to_string).collect())
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct CreateCallerCommand {
    pub name: Option<String>,
    pub role: Option<String>,
    pub languages: Option<StringList>,
    #[serde(default, deserialize_with = "whole_number")]
    pub daily_lead_limit: Option<i64>,
    pub assigned_states: Option<StringList>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct UpdateCallerCommand {
    pub name: Option<String>,
    pub role: Option<String>,
    pub languages: Option<StringList>,
    #[serde(default, deserialize_with = "whole_number")]
    pub daily_lead_limit: Option<i64>,
    pub assigned_states: Option<StringList>,
}

/// Whole number sent either as a JSON number or as numeric text
fn whole_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(i64),
        Float(f64),
        Text(String),
    }

    let parsed = match Option::<Raw>::deserialize(deserializer)? {
        None => return Ok(None),
        Some(Raw::Int(n)) => Some(n),
        Some(Raw::Float(f)) => {
            let in_range = (i64::MIN as f64..i64::MAX as f64).contains(&f);
            (in_range && f.fract() == 0.0).then_some(f as i64)
        }
        Some(Raw::Text(text)) => text.trim().parse().ok(),
    };
    parsed
        .map(Some)
        .ok_or_else(|| D::Error::custom("dailyLeadLimit must be a whole number"))
}

// =============================================================================
// Assignment Views (Read Models)
// =============================================================================

/// Outcome for one lead in a run
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct AssignmentResult {
    pub lead_id: String,
    pub lead_name: String,
    pub caller_id: String,
    pub caller_name: String,
    /// Lead region as entered, empty when none
    pub state: String,
    pub match_type: MatchType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub message: String,
    pub assigned: usize,
    pub skipped: usize,
    pub results: Vec<AssignmentResult>,
}

impl RunSummary {
    pub fn from_results(results: Vec<AssignmentResult>) -> Self {
        let assigned = results.iter().filter(|r| r.match_type.is_assigned()).count();
        let skipped = results.len() - assigned;
        Self {
            message: format!("Assignment complete: {} assigned, {} skipped", assigned, skipped),
            assigned,
            skipped,
            results,
        }
    }

    pub fn nothing_to_assign() -> Self {
        Self {
            message: "No unassigned leads found".to_string(),
            assigned: 0,
            skipped: 0,
            results: vec![],
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct CallerCapacity {
    pub id: String,
    pub name: String,
    pub role: String,
    pub daily_lead_limit: u32,
    pub assigned_today: u32,
    pub remaining_capacity: u32,
    pub assigned_states: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct AssignmentStats {
    pub total_assignments: u64,
    pub assigned_today: u64,
    pub total_capacity: u64,
    pub remaining_capacity: u64,
    pub callers: Vec<CallerCapacity>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct LeadSummary {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub state: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct CallerSummary {
    pub id: String,
    pub name: String,
    pub role: String,
    pub assigned_states: Vec<String>,
}

/// Ledger row joined with the lead and caller it references, when they
/// still exist
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: String,
    pub lead_id: String,
    pub caller_id: String,
    pub lead: Option<LeadSummary>,
    pub caller: Option<CallerSummary>,
    pub assigned_at: DateTime<Utc>,
}
