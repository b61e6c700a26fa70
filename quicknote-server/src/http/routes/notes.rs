//! Note endpoints. All require a bearer token; rows are scoped to its subject.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use quicknote_core::wire::{CreateNoteRequest, DeleteResponse, NoteResponse, NotesResponse};
use quicknote_core::NoteContent;

use crate::http::error::ApiError;
use crate::http::extractors::{AuthSession, JsonBody, NoteId};
use crate::http::server::AppState;

/// GET /api/notes - caller's notes, newest first
async fn list_notes(
    State(state): State<Arc<AppState>>,
    session: AuthSession,
) -> Result<Json<NotesResponse>, ApiError> {
    let notes = state
        .store
        .list_notes(&session.token, session.user_id)
        .await
        .map_err(ApiError::relay(StatusCode::INTERNAL_SERVER_ERROR))?;

    Ok(Json(NotesResponse { notes }))
}

/// POST /api/notes
async fn create_note(
    State(state): State<Arc<AppState>>,
    session: AuthSession,
    JsonBody(req): JsonBody<CreateNoteRequest>,
) -> Result<Json<NoteResponse>, ApiError> {
    let content = NoteContent::new(req.content.as_deref().unwrap_or_default())?;
    let note = state
        .store
        .create_note(&session.token, session.user_id, &content)
        .await
        .map_err(ApiError::relay(StatusCode::INTERNAL_SERVER_ERROR))?;

    tracing::debug!(note_id = %note.id, "note created");
    Ok(Json(NoteResponse { note }))
}

/// DELETE /api/notes/{id}
///
/// Succeeds even when no row matched; the store doesn't say.
async fn delete_note(
    State(state): State<Arc<AppState>>,
    session: AuthSession,
    NoteId(id): NoteId,
) -> Result<Json<DeleteResponse>, ApiError> {
    state
        .store
        .delete_note(&session.token, session.user_id, id)
        .await
        .map_err(ApiError::relay(StatusCode::INTERNAL_SERVER_ERROR))?;

    Ok(Json(DeleteResponse { success: true }))
}

/// Note routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/notes", get(list_notes).post(create_note))
        .route("/api/notes/{id}", delete(delete_note))
}
