//! JSON wire format shared by the server and the client
//!
//! Request bodies keep every field optional so that a missing field reaches
//! handler validation (and gets a domain error message) instead of failing
//! JSON extraction.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Body of `POST /api/auth/signup` and `POST /api/auth/signin`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmailRequest {
    #[serde(default)]
    pub email: Option<String>,
}

/// Body of `POST /api/auth/verify-otp`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VerifyOtpRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub otp: Option<String>,
    /// Present on sign-up only, together with `dob`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dob: Option<String>,
}

/// Plain acknowledgement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// User object as returned by the identity provider.
///
/// Only `id` and `email` are interpreted; every other field is preserved
/// and relayed as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AuthUser {
    /// Look up a string field the provider put in `user_metadata`.
    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.extra
            .get("user_metadata")
            .and_then(|m| m.get(key))
            .and_then(Value::as_str)
    }
}

/// Response of `POST /api/auth/verify-otp`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyOtpResponse {
    pub token: String,
    pub user: AuthUser,
}

/// Query of `GET /api/auth/google-url`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GoogleUrlQuery {
    #[serde(default, rename = "redirectTo", skip_serializing_if = "Option::is_none")]
    pub redirect_to: Option<String>,
}

/// Response of `GET /api/auth/google-url`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleUrlResponse {
    pub url: String,
}

/// Query of `GET /api/auth/google/callback`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GoogleCallbackQuery {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

/// Body of `POST /api/notes`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateNoteRequest {
    #[serde(default)]
    pub content: Option<String>,
}

/// A stored note row
///
/// `created_at` is kept as the store sent it, and columns beyond the four
/// known ones ride along in `extra`, so relayed rows come back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Note {
    /// `created_at` as UTC. Timestamps without an offset are read as UTC.
    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        let raw = self.created_at.as_deref()?;
        DateTime::parse_from_rfc3339(raw)
            .map(|t| t.with_timezone(&Utc))
            .ok()
            .or_else(|| {
                NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                    .ok()
                    .map(|t| t.and_utc())
            })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotesResponse {
    pub notes: Vec<Note>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteResponse {
    pub note: Note,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub success: bool,
}

/// A stored profile row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub name: String,
    pub dob: NaiveDate,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Profile {
    pub fn new(id: Uuid, name: impl Into<String>, dob: NaiveDate) -> Self {
        Self {
            id,
            name: name.into(),
            dob,
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub profile: Option<Profile>,
}

/// JSON error body returned by every failing endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default)]
    pub status: u16,
}
