//! Lead intake and browsing endpoints

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use leadflow_core::EntityId;
use serde_json::Value;

use crate::error::{ApiError, ApiResult};
use crate::models::*;
use crate::ApiState;

pub fn router() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/", get(list_leads))
        .route("/import", post(import_leads))
        .route("/:id", delete(delete_lead))
}

/// List leads, newest first
#[utoipa::path(
    get,
    path = "/api/leads",
    params(PageParams),
    responses((status = 200, description = "Page of leads", body = LeadPage)),
    tag = "leads"
)]
pub async fn list_leads(
    State(state): State<Arc<ApiState>>,
    Query(params): Query<PageParams>,
) -> ApiResult<Json<LeadPage>> {
    let page = state.leads.list_leads(params.into_query()).await?;
    Ok(Json(LeadPage::from(page)))
}

/// Import raw lead documents
///
/// Accepts a JSON array of documents, or an object with a `leads` array.
#[utoipa::path(
    post,
    path = "/api/leads/import",
    request_body = Object,
    responses(
        (status = 200, description = "Leads imported", body = ImportResponse),
        (status = 400, description = "Malformed documents", body = ErrorResponse)
    ),
    tag = "leads"
)]
pub async fn import_leads(
    State(state): State<Arc<ApiState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<ImportResponse>> {
    let Json(body) = payload?;
    let documents = match body {
        Value::Array(docs) => docs,
        Value::Object(mut obj) => match obj.remove("leads") {
            Some(Value::Array(docs)) => docs,
            _ => return Err(ApiError::BadRequest("Expected an array of lead documents".into())),
        },
        _ => return Err(ApiError::BadRequest("Expected an array of lead documents".into())),
    };

    let imported = state.leads.import_leads(documents).await?;
    Ok(Json(ImportResponse {
        message: format!("Imported {} leads", imported),
        imported,
    }))
}

/// Delete a lead
#[utoipa::path(
    delete,
    path = "/api/leads/{id}",
    params(("id" = String, Path, description = "Lead id")),
    responses(
        (status = 200, description = "Lead deleted", body = MessageResponse),
        (status = 404, description = "Lead not found", body = ErrorResponse)
    ),
    tag = "leads"
)]
pub async fn delete_lead(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    state.leads.delete_lead(&EntityId::from_string(id)).await?;
    Ok(Json(MessageResponse::new("Lead deleted successfully")))
}
