//! Health check endpoint

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::http::error::ApiError;
use crate::state::AppState;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: &'static str,
    pub companies: usize,
    pub recruitments: usize,
    pub cache_status: &'static str,
}

/// GET /health - probes the database, 500 if it is unreachable
async fn health(State(state): State<AppState>) -> Result<Json<HealthResponse>, ApiError> {
    state.ping().await?;
    let counts = state.snapshot().counts();

    Ok(Json(HealthResponse {
        status: "healthy",
        database: "connected",
        companies: counts.companies,
        recruitments: counts.recruitments,
        cache_status: "active",
    }))
}

/// Health routes
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
