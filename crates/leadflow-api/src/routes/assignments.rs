//! Assignment run, statistics, history and reset endpoints

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use leadflow_core::application::dto::{AssignmentStats, RunSummary};

use crate::error::ApiResult;
use crate::models::*;
use crate::ApiState;

pub fn router() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/run", post(run_assignment))
        .route("/stats", get(assignment_stats))
        .route("/history", get(assignment_history))
        .route("/reset", post(reset_assignments))
}

/// Assign every lead without an assignment record
#[utoipa::path(
    post,
    path = "/api/assignments/run",
    responses(
        (status = 200, description = "Run summary", body = RunSummary),
        (status = 500, description = "Persistence failure; committed leads stay assigned", body = ErrorResponse)
    ),
    tag = "assignments"
)]
pub async fn run_assignment(State(state): State<Arc<ApiState>>) -> ApiResult<Json<RunSummary>> {
    Ok(Json(state.assignments.run_assignment().await?))
}

/// Capacity and usage for the current UTC day
#[utoipa::path(
    get,
    path = "/api/assignments/stats",
    responses((status = 200, description = "Assignment statistics", body = AssignmentStats)),
    tag = "assignments"
)]
pub async fn assignment_stats(State(state): State<Arc<ApiState>>) -> ApiResult<Json<AssignmentStats>> {
    Ok(Json(state.assignments.assignment_stats().await?))
}

/// Assignment ledger, newest first
#[utoipa::path(
    get,
    path = "/api/assignments/history",
    params(PageParams),
    responses((status = 200, description = "Page of assignment records", body = HistoryPage)),
    tag = "assignments"
)]
pub async fn assignment_history(
    State(state): State<Arc<ApiState>>,
    Query(params): Query<PageParams>,
) -> ApiResult<Json<HistoryPage>> {
    let page = state.assignments.assignment_history(params.into_query()).await?;
    Ok(Json(HistoryPage::from(page)))
}

/// Clear every assignment record and lead link
#[utoipa::path(
    post,
    path = "/api/assignments/reset",
    responses((status = 200, description = "Assignments cleared", body = MessageResponse)),
    tag = "assignments"
)]
pub async fn reset_assignments(State(state): State<Arc<ApiState>>) -> ApiResult<Json<MessageResponse>> {
    state.assignments.reset_assignments().await?;
    Ok(Json(MessageResponse::new("All assignments cleared")))
}
