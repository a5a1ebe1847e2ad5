//! HTTP API: health probes, Prometheus metrics, and analysis endpoints

use crate::refresh::sync_health;
use advisor_lib::analysis::{
    catalog, ContainerTemplate, Priority, Recommendation, RecommendationKind,
    ResourceRecommendation, TemplateKind, TemplateMatch,
};
use advisor_lib::engine::{AnalysisEngine, AnalysisResult};
use advisor_lib::health::{ComponentStatus, HealthRegistry};
use advisor_lib::history::{HistoryLog, HistoryTrend};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use prometheus::{Encoder, TextEncoder};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

type ApiError = (StatusCode, String);

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<AnalysisEngine>,
    pub health_registry: HealthRegistry,
}

impl AppState {
    pub fn new(engine: Arc<AnalysisEngine>, health_registry: HealthRegistry) -> Self {
        Self {
            engine,
            health_registry,
        }
    }

    /// Cached-or-fresh analysis, computed off the async runtime
    async fn analysis(&self, force: bool) -> Result<Arc<AnalysisResult>, ApiError> {
        let engine = Arc::clone(&self.engine);
        let result = tokio::task::spawn_blocking(move || {
            if force {
                engine.refresh()
            } else {
                engine.get_or_compute()
            }
        })
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

        sync_health(&self.health_registry, &self.engine, &result).await;
        Ok(result)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct RecommendationQuery {
    pub priority: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TemplatesResponse {
    pub templates: Vec<ContainerTemplate>,
    pub matched: Vec<TemplateMatch>,
}

#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HistoryResponse {
    #[serde(flatten)]
    pub log: HistoryLog,
    pub trend: Option<HistoryTrend>,
}

/// 200 while operational, 503 when a component is unhealthy
async fn healthz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let health = state.health_registry.health().await;

    let status_code = match health.status {
        ComponentStatus::Healthy | ComponentStatus::Degraded => StatusCode::OK,
        ComponentStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(health))
}

async fn readyz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let readiness = state.health_registry.readiness().await;

    let status_code = if readiness.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(readiness))
}

async fn metrics() -> Result<impl IntoResponse, ApiError> {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder
        .encode(&prometheus::gather(), &mut buffer)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    Ok((
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        buffer,
    ))
}

async fn get_analysis(State(state): State<Arc<AppState>>) -> Result<Json<AnalysisResult>, ApiError> {
    let result = state.analysis(false).await?;
    Ok(Json(result.as_ref().clone()))
}

async fn refresh_analysis(
    State(state): State<Arc<AppState>>,
) -> Result<Json<AnalysisResult>, ApiError> {
    let result = state.analysis(true).await?;
    info!(timestamp = %result.timestamp, "Analysis refreshed on request");
    Ok(Json(result.as_ref().clone()))
}

async fn get_recommendations(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RecommendationQuery>,
) -> Result<Json<Vec<Recommendation>>, ApiError> {
    let priority = query
        .priority
        .as_deref()
        .map(|p| {
            Priority::parse(p).ok_or_else(|| (StatusCode::BAD_REQUEST, format!("Invalid priority: {p}")))
        })
        .transpose()?;
    let kind = query
        .kind
        .as_deref()
        .map(|k| {
            RecommendationKind::parse(k)
                .ok_or_else(|| (StatusCode::BAD_REQUEST, format!("Invalid recommendation type: {k}")))
        })
        .transpose()?;

    let result = state.analysis(false).await?;
    Ok(Json(
        result
            .recommendations_matching(priority, kind)
            .into_iter()
            .cloned()
            .collect(),
    ))
}

async fn get_resources(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ResourceRecommendation>, ApiError> {
    let result = state.analysis(false).await?;
    Ok(Json(result.resource_recommendation.clone()))
}

async fn list_templates(
    State(state): State<Arc<AppState>>,
) -> Result<Json<TemplatesResponse>, ApiError> {
    let result = state.analysis(false).await?;
    Ok(Json(TemplatesResponse {
        templates: catalog(),
        matched: result.matched_templates.clone(),
    }))
}

async fn get_template(Path(id): Path<String>) -> Result<Json<ContainerTemplate>, ApiError> {
    TemplateKind::parse(&id)
        .map(|kind| Json(kind.template()))
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("Unknown template: {id}")))
}

async fn get_history(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<HistoryResponse>, ApiError> {
    // The engine lock is held for a whole recompute
    let engine = Arc::clone(&state.engine);
    let mut log = tokio::task::spawn_blocking(move || engine.history())
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    if let Some(limit) = query.limit {
        log = log.tail(limit);
    }
    let trend = log.trend();
    Ok(Json(HistoryResponse { log, trend }))
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics))
        .route("/api/v1/analysis", get(get_analysis))
        .route("/api/v1/analysis/refresh", post(refresh_analysis))
        .route("/api/v1/recommendations", get(get_recommendations))
        .route("/api/v1/resources", get(get_resources))
        .route("/api/v1/templates", get(list_templates))
        .route("/api/v1/templates/:id", get(get_template))
        .route("/api/v1/history", get(get_history))
        .with_state(state)
}

/// Start the API server
pub async fn serve(port: u16, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", port);
    info!(addr = %addr, "Starting API server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
