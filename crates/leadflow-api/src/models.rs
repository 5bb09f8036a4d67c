//! API Models
//!
//! Wire views of core aggregates and the response envelopes.

use chrono::{DateTime, Utc};
use leadflow_core::application::dto::{HistoryEntry, Page};
use leadflow_core::{Lead, LeadStatus, SalesCaller};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Message-only response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

/// Error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub message: String,
    pub code: String,
}

/// Page and limit as sent by clients; unparsable values fall back to defaults
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageParams {
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl PageParams {
    pub fn into_query(self) -> leadflow_core::application::dto::PageQuery {
        let parse = |v: Option<String>| v.and_then(|s| s.trim().parse::<i64>().ok());
        leadflow_core::application::dto::PageQuery::new(parse(self.page), parse(self.limit))
    }
}

// ============ Leads ============

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeadView {
    #[serde(rename = "_id")]
    pub id: String,
    pub full_name: String,
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub source: String,
    pub city: String,
    pub state: String,
    pub notes: String,
    pub status: LeadStatus,
    pub created_at: DateTime<Utc>,
    pub assigned_to: Option<String>,
}

impl From<&Lead> for LeadView {
    fn from(lead: &Lead) -> Self {
        Self {
            id: lead.id().to_string(),
            full_name: lead.name().to_string(),
            phone: lead.phone().to_string(),
            email: lead.email().map(str::to_string),
            source: lead.source().to_string(),
            city: lead.city().to_string(),
            state: lead.region_label().to_string(),
            notes: lead.notes().to_string(),
            status: lead.status(),
            created_at: lead.created_at(),
            assigned_to: lead.assigned_to().map(|id| id.to_string()),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeadPage {
    pub data: Vec<LeadView>,
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u64,
}

impl From<Page<Lead>> for LeadPage {
    fn from(page: Page<Lead>) -> Self {
        let page = page.map(|lead| LeadView::from(&lead));
        Self {
            data: page.data,
            page: page.page,
            limit: page.limit,
            total: page.total,
            total_pages: page.total_pages,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ImportResponse {
    pub message: String,
    pub imported: usize,
}

// ============ Sales Callers ============

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CallerView {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub role: String,
    pub languages: Vec<String>,
    pub daily_lead_limit: u32,
    pub assigned_states: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&SalesCaller> for CallerView {
    fn from(caller: &SalesCaller) -> Self {
        Self {
            id: caller.id().to_string(),
            name: caller.name().to_string(),
            role: caller.role().to_string(),
            languages: caller.languages().to_vec(),
            daily_lead_limit: caller.daily_lead_limit(),
            assigned_states: caller.region_labels(),
            created_at: caller.created_at(),
            updated_at: caller.updated_at(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CallerResponse {
    pub data: CallerView,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CallerListResponse {
    pub data: Vec<CallerView>,
}

// ============ Assignments ============

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HistoryPage {
    pub data: Vec<HistoryEntry>,
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u64,
}

impl From<Page<HistoryEntry>> for HistoryPage {
    fn from(page: Page<HistoryEntry>) -> Self {
        Self {
            data: page.data,
            page: page.page,
            limit: page.limit,
            total: page.total,
            total_pages: page.total_pages,
        }
    }
}
