//! Leadflow REST API
//!
//! HTTP surface over the lead assignment core:
//!
//! ```text
//! /health                       liveness
//! /api/leads                    list, import, delete
//! /api/sales-callers            roster CRUD
//! /api/assignments              run, stats, history, reset
//! /api-docs/openapi.json        OpenAPI document
//! ```

pub mod config;
pub mod error;
pub mod models;
pub mod routes;

use std::sync::Arc;

use axum::http::Uri;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use leadflow_core::application::dto::{
    AssignmentResult, AssignmentStats, CallerCapacity, CallerSummary, CreateCallerCommand, HistoryEntry,
    LeadSummary, RunSummary, StringList, UpdateCallerCommand,
};
use leadflow_core::infrastructure::{InMemoryStore, TracingEventPublisher};
use leadflow_core::{
    AssignmentService, AssignmentUseCases, CallerService, CallerUseCases, EventPublisher, LeadService,
    LeadStatus, LeadUseCases, MatchType,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use utoipa::OpenApi;

pub use config::{ConfigError, ServerConfig};
pub use error::{ApiError, ApiResult};
pub use models::*;

/// API state
pub struct ApiState {
    pub assignments: Arc<dyn AssignmentUseCases>,
    pub leads: Arc<dyn LeadUseCases>,
    pub callers: Arc<dyn CallerUseCases>,
}

impl ApiState {
    /// Wire every use case to one shared in-memory store
    pub fn in_memory(store: Arc<InMemoryStore>, event_publisher: Arc<dyn EventPublisher>) -> Self {
        Self {
            assignments: Arc::new(AssignmentService::new(
                store.clone(),
                store.clone(),
                store.clone(),
                event_publisher.clone(),
            )),
            leads: Arc::new(LeadService::new(store.clone(), event_publisher.clone())),
            callers: Arc::new(CallerService::new(store, event_publisher)),
        }
    }
}

impl Default for ApiState {
    fn default() -> Self {
        Self::in_memory(Arc::new(InMemoryStore::new()), Arc::new(TracingEventPublisher))
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Leadflow API",
        version = "0.1.0",
        description = "Lead intake and region-aware round-robin assignment to sales callers",
        license(name = "Apache-2.0")
    ),
    paths(
        routes::health::health_check,
        routes::leads::list_leads,
        routes::leads::import_leads,
        routes::leads::delete_lead,
        routes::callers::list_callers,
        routes::callers::create_caller,
        routes::callers::update_caller,
        routes::callers::delete_caller,
        routes::assignments::run_assignment,
        routes::assignments::assignment_stats,
        routes::assignments::assignment_history,
        routes::assignments::reset_assignments,
    ),
    components(
        schemas(
            MessageResponse, ErrorResponse, ImportResponse,
            LeadView, LeadPage, LeadStatus,
            CallerView, CallerResponse, CallerListResponse,
            CreateCallerCommand, UpdateCallerCommand, StringList,
            RunSummary, AssignmentResult, MatchType,
            AssignmentStats, CallerCapacity,
            HistoryPage, HistoryEntry, LeadSummary, CallerSummary,
            routes::health::HealthResponse
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "leads", description = "Lead intake and browsing"),
        (name = "sales-callers", description = "Sales caller roster management"),
        (name = "assignments", description = "Lead assignment runs and reporting")
    )
)]
pub struct ApiDoc;

/// Build the API router
pub fn build_router(state: ApiState) -> Router {
    Router::new()
        .route("/", get(|| async { "API is running..." }))
        .route("/health", get(routes::health::health_check))
        .route("/api-docs/openapi.json", get(openapi_json))
        .nest("/api", api_routes())
        .fallback(not_found)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

fn api_routes() -> Router<Arc<ApiState>> {
    Router::new()
        .nest("/leads", routes::leads::router())
        .nest("/sales-callers", routes::callers::router())
        .nest("/assignments", routes::assignments::router())
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

async fn not_found(uri: Uri) -> impl IntoResponse {
    let path = uri.path_and_query().map(|p| p.as_str()).unwrap_or("/");
    ApiError::NotFound(format!("Not Found - {}", path))
}

/// Load the configured seed files into the store
pub async fn seed(state: &ApiState, config: &ServerConfig) -> anyhow::Result<()> {
    for command in config.load_seed_callers()? {
        let name = command.name.clone().unwrap_or_default();
        if let Err(err) = state.callers.create_caller(command).await {
            warn!(name = %name, error = %err, "Skipping invalid seed caller");
        }
    }

    let documents = config.load_seed_leads()?;
    if !documents.is_empty() {
        let imported = state.leads.import_leads(documents).await?;
        info!(imported, "Seed leads imported");
    }
    Ok(())
}
