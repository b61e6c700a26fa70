//! Profile lookup for the signed-in user

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use quicknote_core::wire::ProfileResponse;

use crate::http::error::ApiError;
use crate::http::extractors::AuthSession;
use crate::http::server::AppState;

/// GET /api/profile - `{"profile": null}` when sign-up never wrote one
async fn get_profile(
    State(state): State<Arc<AppState>>,
    session: AuthSession,
) -> Result<Json<ProfileResponse>, ApiError> {
    let profile = state
        .store
        .get_profile(&session.token, session.user_id)
        .await
        .map_err(ApiError::relay(StatusCode::INTERNAL_SERVER_ERROR))?;

    Ok(Json(ProfileResponse { profile }))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/api/profile", get(get_profile))
}
