//! Company endpoints

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};

use crate::http::error::ApiError;
use crate::state::AppState;

/// GET / - every company in the snapshot, in load order
async fn list_companies(State(state): State<AppState>) -> Response {
    let snapshot = state.snapshot();
    Json(snapshot.companies()).into_response()
}

/// GET /company/{corporate_number}
async fn get_company(
    State(state): State<AppState>,
    Path(corporate_number): Path<String>,
) -> Result<Response, ApiError> {
    let snapshot = state.snapshot();
    snapshot
        .company(&corporate_number)
        .map(|company| Json(company).into_response())
        .ok_or_else(|| ApiError::not_found("company", corporate_number))
}

/// Company routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_companies))
        .route("/company/{corporate_number}", get(get_company))
}
