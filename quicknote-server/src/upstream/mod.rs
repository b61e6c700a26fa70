//! Upstream relay: the managed auth and data service
//!
//! Handlers talk to two traits rather than to HTTP directly:
//! - [`IdentityProvider`]: OTP send/verify and OAuth code exchange
//! - [`DataStore`]: per-user notes and profile rows, always called with the
//!   caller's own access token so the store enforces row ownership too
//!
//! [`SupabaseClient`] implements both over REST.

pub mod error;
pub mod supabase;

#[cfg(test)]
pub(crate) mod memory;

use async_trait::async_trait;
use quicknote_core::{AuthUser, EmailAddress, Note, NoteContent, OtpCode, Profile};
use serde_json::Value;
use uuid::Uuid;

pub use error::UpstreamError;
pub use supabase::SupabaseClient;

/// Result of a successful OTP verification
#[derive(Debug, Clone)]
pub struct VerifiedSession {
    pub user: AuthUser,
    pub access_token: String,
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Email a one-time passcode. Sign-up and sign-in share this call.
    async fn send_otp(&self, email: &EmailAddress) -> Result<(), UpstreamError>;

    async fn verify_otp(
        &self,
        email: &EmailAddress,
        otp: &OtpCode,
    ) -> Result<VerifiedSession, UpstreamError>;

    /// URL that starts the Google OAuth flow.
    fn authorize_url(&self, redirect_to: Option<&str>) -> String;

    /// Trade an OAuth authorization code for a provider session (relayed as-is).
    async fn exchange_code(&self, code: &str, state: Option<&str>) -> Result<Value, UpstreamError>;
}

#[async_trait]
pub trait DataStore: Send + Sync {
    /// Notes owned by `user_id`, newest first.
    async fn list_notes(&self, token: &str, user_id: Uuid) -> Result<Vec<Note>, UpstreamError>;

    async fn create_note(
        &self,
        token: &str,
        user_id: Uuid,
        content: &NoteContent,
    ) -> Result<Note, UpstreamError>;

    /// Delete a note; scoped to `user_id` so nobody deletes someone else's row.
    async fn delete_note(
        &self,
        token: &str,
        user_id: Uuid,
        note_id: Uuid,
    ) -> Result<(), UpstreamError>;

    async fn upsert_profile(&self, token: &str, profile: &Profile) -> Result<Profile, UpstreamError>;

    async fn get_profile(&self, token: &str, user_id: Uuid) -> Result<Option<Profile>, UpstreamError>;
}
