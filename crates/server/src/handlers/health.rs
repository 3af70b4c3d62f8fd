//! Health check endpoint.

use crate::error::ApiResult;
use crate::state::AppState;
use axum::extract::State;
use axum::Json;
use serde::Serialize;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always "ok" when the server can reach its dependencies.
    pub status: &'static str,
}

/// GET /v1/health
///
/// Verifies metadata store connectivity; intended for load balancer and
/// orchestrator probes, so it is unauthenticated.
pub async fn health_check(State(state): State<AppState>) -> ApiResult<Json<HealthResponse>> {
    state.metadata.health_check().await?;
    Ok(Json(HealthResponse { status: "ok" }))
}
