//! Sales caller roster endpoints

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, patch};
use axum::{Json, Router};
use leadflow_core::application::dto::{CreateCallerCommand, UpdateCallerCommand};
use leadflow_core::EntityId;

use crate::error::ApiResult;
use crate::models::*;
use crate::ApiState;

pub fn router() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/", get(list_callers).post(create_caller))
        .route("/:id", patch(update_caller).delete(delete_caller))
}

/// List sales callers, most recently created first
#[utoipa::path(
    get,
    path = "/api/sales-callers",
    responses((status = 200, description = "Caller roster", body = CallerListResponse)),
    tag = "sales-callers"
)]
pub async fn list_callers(State(state): State<Arc<ApiState>>) -> ApiResult<Json<CallerListResponse>> {
    let callers = state.callers.list_callers().await?;
    Ok(Json(CallerListResponse {
        data: callers.iter().map(CallerView::from).collect(),
    }))
}

/// Register a sales caller
#[utoipa::path(
    post,
    path = "/api/sales-callers",
    request_body = CreateCallerCommand,
    responses(
        (status = 201, description = "Caller created", body = CallerResponse),
        (status = 400, description = "Missing or invalid fields", body = ErrorResponse)
    ),
    tag = "sales-callers"
)]
pub async fn create_caller(
    State(state): State<Arc<ApiState>>,
    payload: Result<Json<CreateCallerCommand>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<CallerResponse>)> {
    let Json(command) = payload?;
    let caller = state.callers.create_caller(command).await?;
    Ok((StatusCode::CREATED, Json(CallerResponse { data: CallerView::from(&caller) })))
}

/// Partially update a sales caller
#[utoipa::path(
    patch,
    path = "/api/sales-callers/{id}",
    params(("id" = String, Path, description = "Caller id")),
    request_body = UpdateCallerCommand,
    responses(
        (status = 200, description = "Caller updated", body = CallerResponse),
        (status = 400, description = "Invalid fields", body = ErrorResponse),
        (status = 404, description = "Caller not found", body = ErrorResponse)
    ),
    tag = "sales-callers"
)]
pub async fn update_caller(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateCallerCommand>, JsonRejection>,
) -> ApiResult<Json<CallerResponse>> {
    let Json(command) = payload?;
    let caller = state.callers.update_caller(&EntityId::from_string(id), command).await?;
    Ok(Json(CallerResponse { data: CallerView::from(&caller) }))
}

/// Remove a sales caller
#[utoipa::path(
    delete,
    path = "/api/sales-callers/{id}",
    params(("id" = String, Path, description = "Caller id")),
    responses(
        (status = 200, description = "Caller removed", body = MessageResponse),
        (status = 404, description = "Caller not found", body = ErrorResponse)
    ),
    tag = "sales-callers"
)]
pub async fn delete_caller(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    state.callers.delete_caller(&EntityId::from_string(id)).await?;
    Ok(Json(MessageResponse::new("Sales caller removed")))
}
