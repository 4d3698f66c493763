use axum::{
    extract::State,
    http::{Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use hyper::Server;
use rand::seq::SliceRandom;
use serde::Serialize;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tracing::{error, info};

use crate::constants::{API_TITLE, API_VERSION, SERVICE_NAME};
use crate::error::HotelMatchError;
use crate::steps::{MatchingSteps, MergedRecord, RankedItem};
use crate::storage::CatalogRepository;
use crate::types::{CatalogRecord, PropertyRecord};

/// Shared handler state. The repository is read-only; every request builds
/// its own views.
#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<dyn CatalogRepository>,
    pub steps: MatchingSteps,
    pub shuffle_catalog: bool,
}

impl AppState {
    pub fn new(repository: Arc<dyn CatalogRepository>) -> Self {
        Self {
            repository,
            steps: MatchingSteps::default(),
            shuffle_catalog: true,
        }
    }
}

/// Data-load failures surface as a 500 with a `detail` body
pub struct ApiError(HotelMatchError);

impl From<HotelMatchError> for ApiError {
    fn from(e: HotelMatchError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error!("Request failed: {}", self.0);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "detail": "Data loading failed" })),
        )
            .into_response()
    }
}

type ApiResult<T> = std::result::Result<Json<T>, ApiError>;

#[derive(Debug, Serialize)]
pub struct CatalogResponse {
    pub message: String,
    pub total_count: usize,
    pub items: Vec<CatalogRecord>,
}

#[derive(Debug, Serialize)]
pub struct Step1Response {
    pub message: String,
    pub selected_count: usize,
    pub total_count: usize,
    pub selected_items: Vec<CatalogRecord>,
}

#[derive(Debug, Serialize)]
pub struct Step2Response {
    pub message: String,
    pub ranked_items: Vec<RankedItem>,
}

#[derive(Debug, Serialize)]
pub struct Step3Response {
    pub message: String,
    pub confirmed_items: Vec<CatalogRecord>,
    pub rejected_items: Vec<CatalogRecord>,
    pub llm_items: Vec<CatalogRecord>,
}

#[derive(Debug, Serialize)]
pub struct Step4Response {
    pub message: String,
    pub confirmed_items: Vec<CatalogRecord>,
    pub rejected_items: Vec<CatalogRecord>,
    /// Always empty after the final step; kept for the frontend
    pub llm_items: Vec<CatalogRecord>,
    pub llm_confirmed_items: Vec<CatalogRecord>,
}

async fn root() -> impl IntoResponse {
    Json(serde_json::json!({
        "message": API_TITLE,
        "version": API_VERSION
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "catalog_loaded": state.repository.is_loaded()
    }))
}

async fn property(State(state): State<AppState>) -> ApiResult<PropertyRecord> {
    Ok(Json(state.repository.property().await?))
}

async fn catalog(State(state): State<AppState>) -> ApiResult<CatalogResponse> {
    let records = state.repository.records().await?;
    let mut view = state.steps.pool(&records);
    if state.shuffle_catalog {
        // Display order only; the pool itself is deterministic
        view.items.shuffle(&mut rand::thread_rng());
    }
    info!(total = view.total_count, "Served catalog pool");
    Ok(Json(CatalogResponse {
        message: "Initial catalog candidates (6x6 grid)".to_string(),
        total_count: view.total_count,
        items: view.items,
    }))
}

async fn step1(State(state): State<AppState>) -> ApiResult<Step1Response> {
    let records = state.repository.records().await?;
    let view = state.steps.shortlist(&records);
    info!(selected = view.selected_count, total = view.total_count, "Step 1 complete");
    Ok(Json(Step1Response {
        message: "Done: first-pass candidates selected from the catalog".to_string(),
        selected_count: view.selected_count,
        total_count: view.total_count,
        selected_items: view.items,
    }))
}

async fn step2(State(state): State<AppState>) -> ApiResult<Step2Response> {
    let records = state.repository.records().await?;
    let view = state.steps.ranked(&records);
    info!(ranked = view.items.len(), "Step 2 complete");
    Ok(Json(Step2Response {
        message: "Step 2 done: similarity scored with the ML model".to_string(),
        ranked_items: view.items,
    }))
}

async fn step3(State(state): State<AppState>) -> ApiResult<Step3Response> {
    let records = state.repository.records().await?;
    let view = state.steps.triage(&records);
    info!(
        confirmed = view.confirmed.len(),
        rejected = view.rejected.len(),
        pending = view.pending.len(),
        "Step 3 complete"
    );
    Ok(Json(Step3Response {
        message: "Step 3 done: LLM verification targets selected".to_string(),
        confirmed_items: view.confirmed,
        rejected_items: view.rejected,
        llm_items: view.pending,
    }))
}

async fn step4(State(state): State<AppState>) -> ApiResult<Step4Response> {
    let records = state.repository.records().await?;
    let view = state.steps.finalize(&records);
    info!(
        confirmed = view.confirmed.len(),
        rejected = view.rejected.len(),
        "Step 4 complete"
    );
    Ok(Json(Step4Response {
        message: "Step 4 done: final selection".to_string(),
        llm_confirmed_items: view.confirmed.clone(),
        confirmed_items: view.confirmed,
        rejected_items: view.rejected,
        llm_items: Vec::new(),
    }))
}

async fn merged_data(State(state): State<AppState>) -> ApiResult<Vec<MergedRecord>> {
    let property = state.repository.property().await?;
    let records = state.repository.records().await?;
    Ok(Json(crate::steps::merge_with_property(&property, &records)))
}

/// Create the HTTP router with all routes
pub fn create_server(state: AppState, static_dir: impl AsRef<Path>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/property", get(property))
        .route("/catalog", get(catalog))
        .route("/step1", post(step1))
        .route("/step2", post(step2))
        .route("/step3", post(step3))
        .route("/step4", post(step4))
        .route("/api/data", get(merged_data))
        .nest_service("/static", ServeDir::new(static_dir.as_ref()))
        .layer(ServiceBuilder::new().layer(cors))
        .with_state(state)
}

/// Bind and serve until the process is stopped
pub async fn start_server(state: AppState, static_dir: impl AsRef<Path>, addr: SocketAddr) -> anyhow::Result<()> {
    let app = create_server(state, static_dir);

    info!("HTTP server listening on http://{addr}");
    println!("🏨 Hotel matching server running on http://{addr}");
    println!("💚 Health check: http://{addr}/health");

    Server::bind(&addr).serve(app.into_make_service()).await?;

    Ok(())
}
