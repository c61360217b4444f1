//! Admin endpoints

use axum::{extract::State, routing::post, Json, Router};
use serde::Serialize;

use crate::http::error::ApiError;
use crate::state::AppState;

#[derive(Serialize)]
pub struct ReloadResponse {
    pub status: &'static str,
    pub companies_loaded: usize,
    pub recruitments_loaded: usize,
}

/// POST /admin/reload-cache - rebuild the snapshot from the database
async fn reload_cache(State(state): State<AppState>) -> Result<Json<ReloadResponse>, ApiError> {
    tracing::info!("reload requested");
    let counts = state.reload().await.map_err(ApiError::Reload)?;

    Ok(Json(ReloadResponse {
        status: "success",
        companies_loaded: counts.companies,
        recruitments_loaded: counts.recruitments,
    }))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/admin/reload-cache", post(reload_cache))
}
