//! HTTP client for the quicknote API

use quicknote_core::wire::{
    CreateNoteRequest, DeleteResponse, EmailRequest, GoogleCallbackQuery, GoogleUrlQuery,
    GoogleUrlResponse, MessageResponse, NoteResponse, NotesResponse, ProfileResponse,
    VerifyOtpRequest, VerifyOtpResponse,
};
use quicknote_core::{ErrorBody, Note, Profile};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ClientError {
    /// Server answered with an error; `message` is its `error` field
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("request to quicknote server failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("not signed in (run `quicknote signin` first)")]
    NotSignedIn,
}

impl ClientError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Api { status: 401, .. })
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;

/// quicknote API client
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        }
    }

    /// Attach a session token for the authenticated endpoints.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authed(&self, request: RequestBuilder) -> Result<RequestBuilder> {
        let token = self.token.as_deref().ok_or(ClientError::NotSignedIn)?;
        Ok(request.bearer_auth(token))
    }

    pub async fn signup(&self, email: &str) -> Result<MessageResponse> {
        self.request_otp("/api/auth/signup", email).await
    }

    pub async fn signin(&self, email: &str) -> Result<MessageResponse> {
        self.request_otp("/api/auth/signin", email).await
    }

    async fn request_otp(&self, path: &str, email: &str) -> Result<MessageResponse> {
        let body = EmailRequest {
            email: Some(email.to_owned()),
        };
        let response = self.http.post(self.url(path)).json(&body).send().await?;
        decode(response, "Failed to send OTP").await
    }

    pub async fn verify_otp(&self, request: &VerifyOtpRequest) -> Result<VerifyOtpResponse> {
        let response = self
            .http
            .post(self.url("/api/auth/verify-otp"))
            .json(request)
            .send()
            .await?;
        decode(response, "OTP verification failed").await
    }

    pub async fn google_url(&self, redirect_to: Option<&str>) -> Result<String> {
        let query = GoogleUrlQuery {
            redirect_to: redirect_to.map(str::to_owned),
        };
        let response = self
            .http
            .get(self.url("/api/auth/google-url"))
            .query(&query)
            .send()
            .await?;
        let body: GoogleUrlResponse = decode(response, "Failed to get Google OAuth URL").await?;
        Ok(body.url)
    }

    /// Exchange an OAuth code; returns the provider session as-is.
    pub async fn google_callback(&self, code: &str, state: Option<&str>) -> Result<Value> {
        let query = GoogleCallbackQuery {
            code: Some(code.to_owned()),
            state: state.map(str::to_owned),
        };
        let response = self
            .http
            .get(self.url("/api/auth/google/callback"))
            .query(&query)
            .send()
            .await?;
        decode(response, "Failed to exchange code").await
    }

    pub async fn list_notes(&self) -> Result<Vec<Note>> {
        let response = self
            .authed(self.http.get(self.url("/api/notes")))?
            .send()
            .await?;
        let body: NotesResponse = decode(response, "Failed to fetch notes").await?;
        Ok(body.notes)
    }

    pub async fn create_note(&self, content: &str) -> Result<Note> {
        let body = CreateNoteRequest {
            content: Some(content.to_owned()),
        };
        let response = self
            .authed(self.http.post(self.url("/api/notes")))?
            .json(&body)
            .send()
            .await?;
        let body: NoteResponse = decode(response, "Failed to create note").await?;
        Ok(body.note)
    }

    pub async fn delete_note(&self, id: Uuid) -> Result<bool> {
        let response = self
            .authed(self.http.delete(self.url(&format!("/api/notes/{}", id))))?
            .send()
            .await?;
        let body: DeleteResponse = decode(response, "Failed to delete note").await?;
        Ok(body.success)
    }

    pub async fn profile(&self) -> Result<Option<Profile>> {
        let response = self
            .authed(self.http.get(self.url("/api/profile")))?
            .send()
            .await?;
        let body: ProfileResponse = decode(response, "Failed to fetch profile").await?;
        Ok(body.profile)
    }
}

/// Decode a success body, or surface the server's `error` message.
async fn decode<T: DeserializeOwned>(response: Response, fallback: &str) -> Result<T> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json::<T>().await?);
    }

    let message = response
        .json::<ErrorBody>()
        .await
        .ok()
        .map(|b| b.error)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| fallback.to_owned());
    tracing::debug!(status = status.as_u16(), %message, "api error");

    Err(ClientError::Api {
        status: status.as_u16(),
        message,
    })
}
