//! Supabase REST client (GoTrue auth + PostgREST data)
//!
//! Every request carries the project `apikey`. Data requests also carry the
//! caller's access token so the database's row-level policies apply.

use async_trait::async_trait;
use quicknote_core::{EmailAddress, Note, NoteContent, OtpCode, Profile, AuthUser};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::instrument;
use url::Url;
use uuid::Uuid;

use super::{DataStore, IdentityProvider, UpstreamError, VerifiedSession};

/// Where GoTrue puts a human-readable error, in preference order
const AUTH_ERROR_FIELDS: &[&str] = &["error_description", "error", "msg"];
/// Where PostgREST puts it
const REST_ERROR_FIELDS: &[&str] = &["message"];

/// Supabase client
#[derive(Clone)]
pub struct SupabaseClient {
    http: Client,
    base_url: String,
    api_key: String,
    google_redirect_url: Option<String>,
    authorize_endpoint: Url,
}

/// `POST /auth/v1/verify` success body (other fields ignored)
#[derive(Debug, Deserialize)]
struct VerifyBody {
    access_token: String,
    user: AuthUser,
}

impl SupabaseClient {
    /// Create a client for the project at `base_url` (e.g. `https://xyz.supabase.co`).
    pub fn new(base_url: &str, api_key: impl Into<String>) -> Result<Self, url::ParseError> {
        let base_url = base_url.trim_end_matches('/').to_string();
        let authorize_endpoint = Url::parse(&format!("{}/auth/v1/authorize", base_url))?;

        Ok(Self {
            http: Client::new(),
            base_url,
            api_key: api_key.into(),
            google_redirect_url: None,
            authorize_endpoint,
        })
    }

    /// Default OAuth redirect, used when a caller doesn't supply one.
    pub fn with_google_redirect(mut self, url: Option<String>) -> Self {
        self.google_redirect_url = url.filter(|u| !u.is_empty());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn auth_endpoint(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    fn rest_endpoint(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn with_key(&self, request: RequestBuilder) -> RequestBuilder {
        request.header("apikey", &self.api_key)
    }

    fn as_user(&self, request: RequestBuilder, token: &str) -> RequestBuilder {
        self.with_key(request).bearer_auth(token)
    }
}

/// Turn a non-2xx response into `Rejected`, pulling the message from the
/// first populated field of the JSON body or falling back.
async fn rejection(response: Response, fields: &[&str], fallback: &str) -> UpstreamError {
    let status = response.status().as_u16();
    let body = response.json::<Value>().await.ok();
    let message = body
        .as_ref()
        .and_then(|b| error_message(b, fields))
        .unwrap_or_else(|| fallback.to_owned());

    tracing::warn!(status, %message, "upstream rejected request");
    UpstreamError::Rejected { status, message }
}

fn error_message(body: &Value, fields: &[&str]) -> Option<String> {
    fields
        .iter()
        .find_map(|f| body.get(*f).and_then(Value::as_str).filter(|m| !m.is_empty()))
        .map(str::to_owned)
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, UpstreamError> {
    response
        .json::<T>()
        .await
        .map_err(|e| UpstreamError::Decode(e.to_string()))
}

/// Check status, then decode. `fallback` is the message when the error body has none.
async fn expect_json<T: DeserializeOwned>(
    response: Response,
    fields: &[&str],
    fallback: &str,
) -> Result<T, UpstreamError> {
    if !response.status().is_success() {
        return Err(rejection(response, fields, fallback).await);
    }
    read_json(response).await
}

#[async_trait]
impl IdentityProvider for SupabaseClient {
    #[instrument(skip_all)]
    async fn send_otp(&self, email: &EmailAddress) -> Result<(), UpstreamError> {
        let response = self
            .with_key(self.http.post(self.auth_endpoint("otp")))
            .json(&json!({ "email": email.as_str() }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(rejection(response, AUTH_ERROR_FIELDS, "Failed to send OTP").await);
        }
        Ok(())
    }

    #[instrument(skip_all)]
    async fn verify_otp(
        &self,
        email: &EmailAddress,
        otp: &OtpCode,
    ) -> Result<VerifiedSession, UpstreamError> {
        let response = self
            .with_key(self.http.post(self.auth_endpoint("verify")))
            .json(&json!({
                "email": email.as_str(),
                "token": otp.as_str(),
                "type": "magiclink",
            }))
            .send()
            .await?;

        let body: VerifyBody =
            expect_json(response, AUTH_ERROR_FIELDS, "OTP verification failed").await?;
        tracing::debug!(user_id = %body.user.id, "otp verified");

        Ok(VerifiedSession {
            user: body.user,
            access_token: body.access_token,
        })
    }

    fn authorize_url(&self, redirect_to: Option<&str>) -> String {
        let redirect = redirect_to
            .filter(|r| !r.is_empty())
            .or(self.google_redirect_url.as_deref());

        let mut url = self.authorize_endpoint.clone();
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("provider", "google");
            if let Some(redirect) = redirect {
                query.append_pair("redirect_to", redirect);
            }
        }
        url.to_string()
    }

    #[instrument(skip_all)]
    async fn exchange_code(&self, code: &str, state: Option<&str>) -> Result<Value, UpstreamError> {
        if let Some(state) = state {
            tracing::debug!(state, "oauth callback state");
        }

        let response = self
            .with_key(self.http.post(self.auth_endpoint("token")))
            .json(&json!({
                "grant_type": "authorization_code",
                "code": code,
                "redirect_to": self.google_redirect_url.as_deref().unwrap_or(""),
            }))
            .send()
            .await?;

        expect_json(response, AUTH_ERROR_FIELDS, "Failed to exchange code").await
    }
}

#[async_trait]
impl DataStore for SupabaseClient {
    #[instrument(skip(self, token))]
    async fn list_notes(&self, token: &str, user_id: Uuid) -> Result<Vec<Note>, UpstreamError> {
        let response = self
            .as_user(self.http.get(self.rest_endpoint("notes")), token)
            .query(&[
                ("user_id", format!("eq.{}", user_id)),
                ("order", "created_at.desc".to_string()),
            ])
            .send()
            .await?;

        expect_json(response, REST_ERROR_FIELDS, "Failed to fetch notes").await
    }

    #[instrument(skip(self, token, content))]
    async fn create_note(
        &self,
        token: &str,
        user_id: Uuid,
        content: &NoteContent,
    ) -> Result<Note, UpstreamError> {
        let response = self
            .as_user(self.http.post(self.rest_endpoint("notes")), token)
            .header("Prefer", "return=representation")
            .json(&json!([{ "user_id": user_id, "content": content.as_str() }]))
            .send()
            .await?;

        let rows: Vec<Note> =
            expect_json(response, REST_ERROR_FIELDS, "Failed to create note").await?;
        rows.into_iter().next().ok_or(UpstreamError::EmptyResponse)
    }

    #[instrument(skip(self, token))]
    async fn delete_note(
        &self,
        token: &str,
        user_id: Uuid,
        note_id: Uuid,
    ) -> Result<(), UpstreamError> {
        let response = self
            .as_user(self.http.delete(self.rest_endpoint("notes")), token)
            .query(&[
                ("id", format!("eq.{}", note_id)),
                ("user_id", format!("eq.{}", user_id)),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(rejection(response, REST_ERROR_FIELDS, "Failed to delete note").await);
        }
        Ok(())
    }

    #[instrument(skip(self, token, profile), fields(user_id = %profile.id))]
    async fn upsert_profile(&self, token: &str, profile: &Profile) -> Result<Profile, UpstreamError> {
        let response = self
            .as_user(self.http.post(self.rest_endpoint("profiles")), token)
            .header("Prefer", "resolution=merge-duplicates,return=representation")
            .json(&[profile])
            .send()
            .await?;

        let rows: Vec<Profile> =
            expect_json(response, REST_ERROR_FIELDS, "Failed to upsert profile").await?;
        rows.into_iter().next().ok_or(UpstreamError::EmptyResponse)
    }

    #[instrument(skip(self, token))]
    async fn get_profile(&self, token: &str, user_id: Uuid) -> Result<Option<Profile>, UpstreamError> {
        let response = self
            .as_user(self.http.get(self.rest_endpoint("profiles")), token)
            .query(&[("id", format!("eq.{}", user_id))])
            .send()
            .await?;

        let rows: Vec<Profile> =
            expect_json(response, REST_ERROR_FIELDS, "Failed to fetch profile").await?;
        Ok(rows.into_iter().next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Query;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use chrono::NaiveDate;
    use std::collections::HashMap;
    use tokio::net::TcpListener;

    const KEY: &str = "service-key";
    const USER: &str = "6f1c1d2e-8f43-4c1c-9d0a-2d3e4f5a6b7c";

    fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
        headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Serve `router` on an ephemeral port and point a client at it.
    async fn stub(router: Router) -> SupabaseClient {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        SupabaseClient::new(&format!("http://{}/", addr), KEY).unwrap()
    }

    fn user_id() -> Uuid {
        Uuid::parse_str(USER).unwrap()
    }

    fn note_row(content: &str) -> Value {
        json!({
            "id": Uuid::new_v4(),
            "user_id": USER,
            "content": content,
            "created_at": "2024-05-01T12:30:00+00:00"
        })
    }

    #[tokio::test]
    async fn send_otp_posts_email_with_apikey() {
        let router = Router::new().route(
            "/auth/v1/otp",
            post(|headers: HeaderMap, Json(body): Json<Value>| async move {
                if header(&headers, "apikey") != Some(KEY) || body["email"] != "ada@example.com" {
                    return (StatusCode::BAD_REQUEST, Json(json!({ "msg": "unexpected request" })));
                }
                (StatusCode::OK, Json(json!({})))
            }),
        );
        let client = stub(router).await;

        let email = EmailAddress::new("ada@example.com").unwrap();
        client.send_otp(&email).await.unwrap();
    }

    #[tokio::test]
    async fn send_otp_relays_error_description() {
        let router = Router::new().route(
            "/auth/v1/otp",
            post(|| async {
                (
                    StatusCode::TOO_MANY_REQUESTS,
                    Json(json!({ "error": "over_email_send_rate_limit", "error_description": "Email rate limit exceeded" })),
                )
            }),
        );
        let client = stub(router).await;

        let err = client
            .send_otp(&EmailAddress::new("ada@example.com").unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, UpstreamError::Rejected { status: 429, .. }));
        assert_eq!(err.to_string(), "Email rate limit exceeded");
    }

    #[tokio::test]
    async fn verify_otp_returns_user_and_token() {
        let router = Router::new().route(
            "/auth/v1/verify",
            post(|Json(body): Json<Value>| async move {
                if body["type"] != "magiclink" || body["token"] != "123456" {
                    return (StatusCode::FORBIDDEN, Json(json!({ "msg": "Token has expired or is invalid" })));
                }
                (
                    StatusCode::OK,
                    Json(json!({
                        "access_token": "jwt-token",
                        "token_type": "bearer",
                        "user": { "id": USER, "email": body["email"] }
                    })),
                )
            }),
        );
        let client = stub(router).await;
        let email = EmailAddress::new("ada@example.com").unwrap();

        let session = client
            .verify_otp(&email, &OtpCode::new("123456").unwrap())
            .await
            .unwrap();
        assert_eq!(session.access_token, "jwt-token");
        assert_eq!(session.user.id, user_id());
        assert_eq!(session.user.email.as_deref(), Some("ada@example.com"));

        let err = client
            .verify_otp(&email, &OtpCode::new("654321").unwrap())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Token has expired or is invalid");
    }

    #[tokio::test]
    async fn verify_otp_without_token_is_decode_error() {
        let router = Router::new().route(
            "/auth/v1/verify",
            post(|| async { Json(json!({ "user": { "id": USER } })) }),
        );
        let client = stub(router).await;

        let err = client
            .verify_otp(
                &EmailAddress::new("ada@example.com").unwrap(),
                &OtpCode::new("123456").unwrap(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, UpstreamError::Decode(_)));
    }

    #[test]
    fn authorize_url_encodes_redirect() {
        let client = SupabaseClient::new("https://demo.supabase.co/", KEY).unwrap();
        assert_eq!(
            client.authorize_url(None),
            "https://demo.supabase.co/auth/v1/authorize?provider=google"
        );
        assert_eq!(
            client.authorize_url(Some("http://localhost:3000/cb")),
            "https://demo.supabase.co/auth/v1/authorize?provider=google&redirect_to=http%3A%2F%2Flocalhost%3A3000%2Fcb"
        );
    }

    #[test]
    fn authorize_url_falls_back_to_configured_redirect() {
        let client = SupabaseClient::new("https://demo.supabase.co", KEY)
            .unwrap()
            .with_google_redirect(Some("https://app.example/auth".into()));
        let url = client.authorize_url(Some(""));
        assert!(url.ends_with("redirect_to=https%3A%2F%2Fapp.example%2Fauth"));
    }

    #[tokio::test]
    async fn exchange_code_sends_configured_redirect() {
        let router = Router::new().route(
            "/auth/v1/token",
            post(|Json(body): Json<Value>| async move {
                Json(json!({
                    "access_token": "session-token",
                    "echo": body
                }))
            }),
        );
        let client = stub(router)
            .await
            .with_google_redirect(Some("https://app.example/auth".into()));

        let session = client.exchange_code("auth-code", Some("xyz")).await.unwrap();
        assert_eq!(session["access_token"], "session-token");
        assert_eq!(session["echo"]["grant_type"], "authorization_code");
        assert_eq!(session["echo"]["code"], "auth-code");
        assert_eq!(session["echo"]["redirect_to"], "https://app.example/auth");
    }

    #[tokio::test]
    async fn list_notes_filters_by_user_newest_first() {
        let router = Router::new().route(
            "/rest/v1/notes",
            get(
                |headers: HeaderMap, Query(q): Query<HashMap<String, String>>| async move {
                    let ok = header(&headers, "authorization") == Some("Bearer user-token")
                        && header(&headers, "apikey") == Some(KEY)
                        && q.get("user_id") == Some(&format!("eq.{}", USER))
                        && q.get("order").map(String::as_str) == Some("created_at.desc");
                    if !ok {
                        return (StatusCode::BAD_REQUEST, Json(json!({ "message": "bad filter" })));
                    }
                    (StatusCode::OK, Json(json!([note_row("newer"), note_row("older")])))
                },
            ),
        );
        let client = stub(router).await;

        let notes = client.list_notes("user-token", user_id()).await.unwrap();
        assert_eq!(notes.len(), 2);
        assert_eq!(notes[0].content, "newer");
    }

    #[tokio::test]
    async fn list_notes_relays_rows_unchanged() {
        let row = json!({
            "id": Uuid::new_v4(),
            "user_id": USER,
            "content": "hi",
            "created_at": "2024-05-01T12:30:00.123456",
            "pinned": true
        });
        let served = row.clone();
        let router = Router::new().route(
            "/rest/v1/notes",
            get(move || async move { Json(json!([served])) }),
        );
        let client = stub(router).await;

        let notes = client.list_notes("user-token", user_id()).await.unwrap();
        assert_eq!(serde_json::to_value(&notes[0]).unwrap(), row);
        assert!(notes[0].created_at_utc().is_some());
    }

    #[tokio::test]
    async fn create_note_returns_inserted_row() {
        let router = Router::new().route(
            "/rest/v1/notes",
            post(|headers: HeaderMap, Json(body): Json<Value>| async move {
                if header(&headers, "prefer") != Some("return=representation") {
                    return (StatusCode::BAD_REQUEST, Json(json!({ "message": "missing prefer" })));
                }
                let content = body[0]["content"].as_str().unwrap_or_default().to_string();
                (StatusCode::CREATED, Json(json!([note_row(&content)])))
            }),
        );
        let client = stub(router).await;

        let note = client
            .create_note("user-token", user_id(), &NoteContent::new("buy milk").unwrap())
            .await
            .unwrap();
        assert_eq!(note.content, "buy milk");
        assert_eq!(note.user_id, user_id());
    }

    #[tokio::test]
    async fn create_note_with_no_rows_is_empty_response() {
        let router = Router::new().route(
            "/rest/v1/notes",
            post(|| async { (StatusCode::CREATED, Json(json!([]))) }),
        );
        let client = stub(router).await;

        let err = client
            .create_note("user-token", user_id(), &NoteContent::new("x").unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, UpstreamError::EmptyResponse));
    }

    #[tokio::test]
    async fn delete_note_falls_back_when_body_is_not_json() {
        let router = Router::new().route(
            "/rest/v1/notes",
            axum::routing::delete(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "oops") }),
        );
        let client = stub(router).await;

        let err = client
            .delete_note("user-token", user_id(), Uuid::new_v4())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Failed to delete note");
    }

    #[tokio::test]
    async fn delete_note_scopes_to_owner() {
        let note_id = Uuid::new_v4();
        let router = Router::new().route(
            "/rest/v1/notes",
            axum::routing::delete(move |Query(q): Query<HashMap<String, String>>| async move {
                let ok = q.get("id") == Some(&format!("eq.{}", note_id))
                    && q.get("user_id") == Some(&format!("eq.{}", USER));
                if ok {
                    StatusCode::NO_CONTENT
                } else {
                    StatusCode::BAD_REQUEST
                }
            }),
        );
        let client = stub(router).await;

        client.delete_note("user-token", user_id(), note_id).await.unwrap();
    }

    #[tokio::test]
    async fn profile_upsert_and_lookup() {
        let router = Router::new().route(
            "/rest/v1/profiles",
            post(|headers: HeaderMap, Json(body): Json<Value>| async move {
                let merge = header(&headers, "prefer")
                    .map(|p| p.contains("resolution=merge-duplicates"))
                    .unwrap_or(false);
                if !merge {
                    return (StatusCode::CONFLICT, Json(json!({ "message": "duplicate key" })));
                }
                (StatusCode::CREATED, Json(body))
            })
            .get(|| async { Json(json!([])) }),
        );
        let client = stub(router).await;

        let profile = Profile::new(user_id(), "Ada", NaiveDate::from_ymd_opt(1990, 4, 1).unwrap());
        let saved = client.upsert_profile("user-token", &profile).await.unwrap();
        assert_eq!(saved, profile);

        let missing = client.get_profile("user-token", user_id()).await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn unreachable_upstream_is_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = SupabaseClient::new(&format!("http://{}", addr), KEY).unwrap();
        let err = client
            .send_otp(&EmailAddress::new("ada@example.com").unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, UpstreamError::Transport(_)));
    }
}
