//! Recruitment endpoints

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};

use crate::http::error::ApiError;
use crate::state::AppState;

/// GET /recruitment - every recruitment in the snapshot, in load order
async fn list_recruitments(State(state): State<AppState>) -> Response {
    let snapshot = state.snapshot();
    Json(snapshot.recruitments()).into_response()
}

/// GET /recruitment/{media_internal_id} - `{recruitment, company}`
///
/// `company` is null when the recruitment has no `corporate_number` or it
/// matches no loaded company.
async fn get_recruitment(
    State(state): State<AppState>,
    Path(media_internal_id): Path<String>,
) -> Result<Response, ApiError> {
    let snapshot = state.snapshot();
    snapshot
        .recruitment(&media_internal_id)
        .map(|detail| Json(detail).into_response())
        .ok_or_else(|| ApiError::not_found("recruitment", media_internal_id))
}

/// Recruitment routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/recruitment", get(list_recruitments))
        .route("/recruitment/{media_internal_id}", get(get_recruitment))
}
