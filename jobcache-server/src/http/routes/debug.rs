//! Cache inspection endpoint

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct CheckDataResponse {
    pub company_count: usize,
    pub recruit_count: usize,
    pub status: &'static str,
    pub cache_enabled: bool,
}

/// GET /debug/check-data
async fn check_data(State(state): State<AppState>) -> Json<CheckDataResponse> {
    let counts = state.snapshot().counts();

    Json(CheckDataResponse {
        company_count: counts.companies,
        recruit_count: counts.recruitments,
        status: "ok",
        cache_enabled: true,
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/debug/check-data", get(check_data))
}
