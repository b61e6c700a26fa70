//! In-memory upstream used by router tests

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use quicknote_core::{AuthUser, EmailAddress, Note, NoteContent, OtpCode, Profile};
use serde_json::{json, Map, Value};
use uuid::Uuid;

use super::{DataStore, IdentityProvider, UpstreamError, VerifiedSession};
use crate::auth::tests::{mint, now, SECRET};

/// The only code this provider accepts
pub(crate) const VALID_OTP: &str = "123456";

/// Fake identity provider + data store.
///
/// Users are keyed by email and get a stable id on first verification.
/// Tokens are real HS256 JWTs signed with the test secret.
#[derive(Default)]
pub(crate) struct MemoryUpstream {
    pub sent_otps: Mutex<Vec<String>>,
    pub users: Mutex<HashMap<String, Uuid>>,
    pub notes: Mutex<Vec<Note>>,
    pub profiles: Mutex<HashMap<Uuid, Profile>>,
    /// Emails the provider refuses to send to
    pub blocked_emails: Vec<String>,
    /// Profile reads and writes are rejected
    pub fail_profiles: bool,
    pub fail_notes: bool,
}

impl MemoryUpstream {
    pub fn user_id(&self, email: &str) -> Uuid {
        *self
            .users
            .lock()
            .unwrap()
            .entry(email.to_owned())
            .or_insert_with(Uuid::new_v4)
    }

    pub fn token_for(&self, user_id: Uuid) -> String {
        mint(&user_id.to_string(), now() + 3600, None, SECRET)
    }

    fn check_notes(&self) -> Result<(), UpstreamError> {
        if self.fail_notes {
            return Err(UpstreamError::rejected(503, "notes table unavailable"));
        }
        Ok(())
    }

    fn check_profiles(&self) -> Result<(), UpstreamError> {
        if self.fail_profiles {
            return Err(UpstreamError::rejected(409, "duplicate key value"));
        }
        Ok(())
    }
}

#[async_trait]
impl IdentityProvider for MemoryUpstream {
    async fn send_otp(&self, email: &EmailAddress) -> Result<(), UpstreamError> {
        if self.blocked_emails.iter().any(|b| b == email.as_str()) {
            return Err(UpstreamError::rejected(429, "Email rate limit exceeded"));
        }
        self.sent_otps.lock().unwrap().push(email.as_str().to_owned());
        Ok(())
    }

    async fn verify_otp(
        &self,
        email: &EmailAddress,
        otp: &OtpCode,
    ) -> Result<VerifiedSession, UpstreamError> {
        if otp.as_str() != VALID_OTP {
            return Err(UpstreamError::rejected(403, "Token has expired or is invalid"));
        }
        let id = self.user_id(email.as_str());
        Ok(VerifiedSession {
            user: AuthUser {
                id,
                email: Some(email.as_str().to_owned()),
                extra: Map::new(),
            },
            access_token: self.token_for(id),
        })
    }

    fn authorize_url(&self, redirect_to: Option<&str>) -> String {
        match redirect_to {
            Some(r) => format!("https://auth.test/authorize?provider=google&redirect_to={}", r),
            None => "https://auth.test/authorize?provider=google".to_owned(),
        }
    }

    async fn exchange_code(&self, code: &str, _state: Option<&str>) -> Result<Value, UpstreamError> {
        if code != "good-code" {
            return Err(UpstreamError::rejected(400, "invalid flow state"));
        }
        let id = self.user_id("oauth@example.com");
        Ok(json!({
            "access_token": self.token_for(id),
            "token_type": "bearer",
            "user": { "id": id, "email": "oauth@example.com" }
        }))
    }
}

#[async_trait]
impl DataStore for MemoryUpstream {
    async fn list_notes(&self, _token: &str, user_id: Uuid) -> Result<Vec<Note>, UpstreamError> {
        self.check_notes()?;
        let mut notes: Vec<Note> = self
            .notes
            .lock()
            .unwrap()
            .iter()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect();
        notes.sort_by(|a, b| b.created_at_utc().cmp(&a.created_at_utc()));
        Ok(notes)
    }

    async fn create_note(
        &self,
        _token: &str,
        user_id: Uuid,
        content: &NoteContent,
    ) -> Result<Note, UpstreamError> {
        self.check_notes()?;
        let note = Note {
            id: Uuid::new_v4(),
            user_id,
            content: content.as_str().to_owned(),
            created_at: Some(chrono::Utc::now().to_rfc3339()),
            extra: Map::new(),
        };
        self.notes.lock().unwrap().push(note.clone());
        Ok(note)
    }

    async fn delete_note(
        &self,
        _token: &str,
        user_id: Uuid,
        note_id: Uuid,
    ) -> Result<(), UpstreamError> {
        self.check_notes()?;
        // Like the real store: deleting a row you don't own matches nothing
        self.notes
            .lock()
            .unwrap()
            .retain(|n| !(n.id == note_id && n.user_id == user_id));
        Ok(())
    }

    async fn upsert_profile(&self, _token: &str, profile: &Profile) -> Result<Profile, UpstreamError> {
        self.check_profiles()?;
        self.profiles
            .lock()
            .unwrap()
            .insert(profile.id, profile.clone());
        Ok(profile.clone())
    }

    async fn get_profile(&self, _token: &str, user_id: Uuid) -> Result<Option<Profile>, UpstreamError> {
        self.check_profiles()?;
        Ok(self.profiles.lock().unwrap().get(&user_id).cloned())
    }
}
