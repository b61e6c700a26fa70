//! Custom Axum extractors

use std::sync::Arc;

use axum::extract::{FromRequest, FromRequestParts, Path};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use quicknote_core::ValidationError;
use uuid::Uuid;

use super::error::ApiError;
use super::server::AppState;
use crate::auth::bearer_token;

/// JSON body whose rejections come back as our JSON error shape
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);

/// Caller identity from a verified `Authorization: Bearer` token.
///
/// The raw token is kept so upstream calls run as the caller.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user_id: Uuid,
    pub token: String,
}

impl FromRequestParts<Arc<AppState>> for AuthSession {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok());
        let token = bearer_token(header)?;
        let verified = state.verifier.verify(token)?;

        Ok(Self {
            user_id: verified.user_id,
            token: token.to_owned(),
        })
    }
}

/// Note id from `/api/notes/{id}`. Anything but a UUID is a 400 and the
/// store is never asked.
#[derive(Debug, Clone, Copy)]
pub struct NoteId(pub Uuid);

impl<S> FromRequestParts<S> for NoteId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<Uuid>::from_request_parts(parts, state).await {
            Ok(Path(id)) => Ok(Self(id)),
            Err(rejection) => {
                tracing::debug!(%rejection, "rejected note id");
                Err(ValidationError::InvalidFormat {
                    field: "id",
                    reason: "not a note id (expected a UUID)",
                }
                .into())
            }
        }
    }
}
