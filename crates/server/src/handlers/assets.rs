//! Asset re-hosting endpoints.

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

/// Request body for POST /v1/assets.
#[derive(Debug, Deserialize)]
pub struct UploadAssetRequest {
    /// Source URL to fetch and re-host.
    pub url: String,
    /// Optional file name hint; an extension or a full name. When absent
    /// the extension is derived from the response content type.
    #[serde(default)]
    pub name: Option<String>,
}

/// Response body for POST /v1/assets.
#[derive(Debug, Serialize)]
pub struct UploadAssetResponse {
    /// The durable public URL for the asset.
    pub url: String,
}

/// Aggregate statistics response.
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    /// Number of published assets.
    pub asset_count: u64,
    /// Total byte size of published assets.
    pub asset_size: u64,
}

/// POST /v1/assets
///
/// Fetches the source URL, publishes it through the upload pipeline, and
/// responds with the durable public URL. The request suspends until the
/// batch containing the upload is published; a previously published or
/// whitelisted URL resolves immediately.
pub async fn upload_asset(
    State(state): State<AppState>,
    Json(request): Json<UploadAssetRequest>,
) -> ApiResult<Json<UploadAssetResponse>> {
    if !request.url.starts_with("http://") && !request.url.starts_with("https://") {
        return Err(ApiError::BadRequest(
            "url must be an http or https URL".to_string(),
        ));
    }

    tracing::debug!(url = %request.url, "upload requested");
    let url = state
        .backend
        .upload(&request.url, request.name.as_deref())
        .await?;

    Ok(Json(UploadAssetResponse { url }))
}

/// GET /v1/assets/stats
pub async fn get_stats(State(state): State<AppState>) -> ApiResult<Json<StatsResponse>> {
    let stats = state.backend.stats().await?;
    Ok(Json(StatsResponse {
        asset_count: stats.asset_count,
        asset_size: stats.asset_size,
    }))
}
