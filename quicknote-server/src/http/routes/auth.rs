//! Auth relay endpoints: email OTP and Google OAuth
//!
//! Nothing here issues or checks credentials itself. Codes and tokens are
//! generated, validated and signed by the identity provider.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use quicknote_core::wire::{
    EmailRequest, GoogleCallbackQuery, GoogleUrlQuery, GoogleUrlResponse, MessageResponse,
    VerifyOtpRequest, VerifyOtpResponse,
};
use quicknote_core::{DateOfBirth, EmailAddress, OtpCode, Profile, ProfileName, ValidationError};
use serde_json::Value;

use crate::http::error::ApiError;
use crate::http::extractors::JsonBody;
use crate::http::server::AppState;
use crate::upstream::VerifiedSession;

/// Shared by sign-up and sign-in: the provider uses one OTP endpoint for both.
async fn request_otp(
    state: &AppState,
    req: EmailRequest,
    message: &str,
) -> Result<Json<MessageResponse>, ApiError> {
    let email = EmailAddress::new(req.email.as_deref().unwrap_or_default())?;
    state
        .identity
        .send_otp(&email)
        .await
        .map_err(ApiError::relay(StatusCode::INTERNAL_SERVER_ERROR))?;

    Ok(Json(MessageResponse {
        message: message.to_owned(),
    }))
}

/// POST /api/auth/signup
async fn signup(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<EmailRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    request_otp(&state, req, "Signup initiated (OTP sent if email is valid)").await
}

/// POST /api/auth/signin
async fn signin(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<EmailRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    request_otp(&state, req, "Signin initiated (OTP sent if email is valid)").await
}

/// POST /api/auth/verify-otp
///
/// On sign-up the client also sends `name` and `dob`; the profile row is
/// written with the fresh token. A failed profile write is logged and does
/// not fail the sign-up.
async fn verify_otp(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<VerifyOtpRequest>,
) -> Result<Json<VerifyOtpResponse>, ApiError> {
    let email = EmailAddress::new(req.email.as_deref().unwrap_or_default())?;
    let otp = OtpCode::new(req.otp.as_deref().unwrap_or_default())?;

    let session = state
        .identity
        .verify_otp(&email, &otp)
        .await
        .map_err(ApiError::relay(StatusCode::BAD_REQUEST))?;

    let name = req.name.as_deref().filter(|s| !s.trim().is_empty());
    let dob = req.dob.as_deref().filter(|s| !s.trim().is_empty());
    if let (Some(name), Some(dob)) = (name, dob) {
        if let Err(e) = save_profile(&state, &session, name, dob).await {
            tracing::warn!(user_id = %session.user.id, "Profile creation failed: {}", e);
        }
    }

    Ok(Json(VerifyOtpResponse {
        token: session.access_token,
        user: session.user,
    }))
}

async fn save_profile(
    state: &AppState,
    session: &VerifiedSession,
    name: &str,
    dob: &str,
) -> Result<Profile, ApiError> {
    let profile = Profile::new(
        session.user.id,
        ProfileName::new(name)?.into_string(),
        DateOfBirth::parse(dob)?.date(),
    );

    state
        .store
        .upsert_profile(&session.access_token, &profile)
        .await
        .map_err(ApiError::relay(StatusCode::INTERNAL_SERVER_ERROR))
}

/// GET /api/auth/google-url?redirectTo=
async fn google_url(
    State(state): State<Arc<AppState>>,
    Query(query): Query<GoogleUrlQuery>,
) -> Json<GoogleUrlResponse> {
    let redirect_to = query.redirect_to.as_deref().filter(|r| !r.is_empty());
    Json(GoogleUrlResponse {
        url: state.identity.authorize_url(redirect_to),
    })
}

/// GET /api/auth/google/callback?code=&state=
///
/// Relays the provider session verbatim.
async fn google_callback(
    State(state): State<Arc<AppState>>,
    Query(query): Query<GoogleCallbackQuery>,
) -> Result<Json<Value>, ApiError> {
    let code = query
        .code
        .as_deref()
        .filter(|c| !c.is_empty())
        .ok_or(ValidationError::Required { field: "code" })?;

    let session = state
        .identity
        .exchange_code(code, query.state.as_deref())
        .await
        .map_err(ApiError::relay(StatusCode::BAD_REQUEST))?;

    Ok(Json(session))
}

/// Auth routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/auth/signup", post(signup))
        .route("/api/auth/signin", post(signin))
        .route("/api/auth/verify-otp", post(verify_otp))
        .route("/api/auth/google-url", get(google_url))
        .route("/api/auth/google/callback", get(google_callback))
}
