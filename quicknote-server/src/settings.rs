//! Runtime settings resolved from [`QuicknoteConfig`]

use quicknote_core::{ConfigError, QuicknoteConfig};

use crate::http::ServerConfig;

/// Everything the server needs to start. Secrets are required up front so
/// a misconfigured server fails at boot rather than on the first request.
#[derive(Clone)]
pub struct ServerSettings {
    pub server: ServerConfig,
    pub supabase_url: String,
    pub service_key: String,
    pub jwt_secret: String,
    pub jwt_audience: Option<String>,
    pub google_redirect_url: Option<String>,
}

impl ServerSettings {
    pub fn from_config(config: &QuicknoteConfig) -> Result<Self, ConfigError> {
        let supabase = &config.supabase;
        let required = |value: &Option<String>, key: &'static str, env: &'static str| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_owned)
                .ok_or_else(|| ConfigError::missing(key, env))
        };

        Ok(Self {
            server: ServerConfig {
                bind_addr: config.server.bind_addr()?,
                cors_permissive: config.server.cors_permissive,
                allowed_origins: config.server.allowed_origins.clone(),
            },
            supabase_url: required(&supabase.url, "supabase.url", "SUPABASE_URL")?,
            service_key: required(
                &supabase.service_key,
                "supabase.service_key",
                "SUPABASE_SERVICE_ROLE_KEY",
            )?,
            jwt_secret: required(&supabase.jwt_secret, "supabase.jwt_secret", "JWT_SECRET")?,
            jwt_audience: supabase.jwt_audience.clone().filter(|a| !a.is_empty()),
            google_redirect_url: supabase.google_redirect_url.clone().filter(|u| !u.is_empty()),
        })
    }
}

impl std::fmt::Debug for ServerSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerSettings")
            .field("server", &self.server)
            .field("supabase_url", &self.supabase_url)
            .field("service_key", &"<redacted>")
            .field("jwt_secret", &"<redacted>")
            .field("jwt_audience", &self.jwt_audience)
            .field("google_redirect_url", &self.google_redirect_url)
            .finish()
    }
}
