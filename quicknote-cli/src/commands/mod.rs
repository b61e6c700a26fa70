//! Command implementations for the quicknote CLI

pub mod account;
pub mod auth;
pub mod config;
pub mod notes;
#[cfg(feature = "server")]
pub mod serve;

pub use account::{run_logout, run_profile, run_whoami};
pub use auth::{run_google_callback, run_google_url, run_signin, run_signup, run_verify};
pub use config::run_config;
pub use notes::run_notes;
#[cfg(feature = "server")]
pub use serve::run_serve;

use anyhow::Result;
use quicknote_core::QuicknoteConfig;

use crate::client::{ApiClient, ClientError};
use crate::session::{Session, SessionStore};

/// Shared state for client-side commands
#[derive(Debug, Clone)]
pub struct Ctx {
    pub config: QuicknoteConfig,
    pub api_url: String,
    pub sessions: SessionStore,
}

impl Ctx {
    pub fn client(&self) -> ApiClient {
        ApiClient::new(&self.api_url)
    }

    /// Client carrying the saved token, or `NotSignedIn`.
    pub fn signed_in(&self) -> Result<(ApiClient, Session)> {
        let session = self.sessions.load()?.ok_or(ClientError::NotSignedIn)?;
        let client = self.client().with_token(session.token.clone());
        Ok((client, session))
    }
}

/// A 401 means the saved token is stale; say so instead of the bare message.
pub(crate) fn explain(err: ClientError) -> anyhow::Error {
    if err.is_unauthorized() {
        anyhow::anyhow!("{} (session expired, run `quicknote signin` again)", err)
    } else {
        err.into()
    }
}
