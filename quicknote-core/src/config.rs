use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// `${VAR}` references inside string settings
static VAR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("invalid var regex"));

/// Centralized configuration for the quicknote server and client
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuicknoteConfig {
    pub server: ServerSection,
    pub supabase: SupabaseSection,
    pub client: ClientConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub bind: String,
    /// Allow any CORS origin instead of localhost + `allowed_origins`
    pub cors_permissive: bool,
    pub allowed_origins: Vec<String>,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:5000".to_string(),
            cors_permissive: false,
            allowed_origins: Vec::new(),
        }
    }
}

impl ServerSection {
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.bind
            .parse()
            .map_err(|e| ConfigError::invalid("server.bind", format!("{}: {}", self.bind, e)))
    }
}

/// Upstream auth/database service settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SupabaseSection {
    pub url: Option<String>,
    pub service_key: Option<String>,
    pub jwt_secret: Option<String>,
    pub jwt_audience: Option<String>,
    pub google_redirect_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the quicknote server
    pub api_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:5000".to_string(),
        }
    }
}

impl QuicknoteConfig {
    /// Load config from ~/.quicknote/config.toml, then apply environment overrides.
    ///
    /// A missing file is not an error: every setting has a default or can
    /// come from the environment.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::load_file(&Self::config_path())?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load only the file layer (with `${VAR}` expansion).
    pub fn load_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut config: Self = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.expand_variables(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Parse config from a TOML string (no expansion, no env overrides).
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Config directory: ~/.quicknote
    pub fn config_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".quicknote")
    }

    /// Config file path: ~/.quicknote/config.toml
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Apply environment overrides on top of the file layer.
    ///
    /// `lookup` is `std::env::var` in production; tests pass a map.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = non_empty("SUPABASE_URL") {
            self.supabase.url = Some(v);
        }
        if let Some(v) = non_empty("SUPABASE_SERVICE_ROLE_KEY") {
            self.supabase.service_key = Some(v);
        }
        if let Some(v) = non_empty("JWT_SECRET") {
            self.supabase.jwt_secret = Some(v);
        }
        if let Some(v) = non_empty("JWT_AUDIENCE") {
            self.supabase.jwt_audience = Some(v);
        }
        if let Some(v) = non_empty("GOOGLE_REDIRECT_URL") {
            self.supabase.google_redirect_url = Some(v);
        }
        if let Some(v) = non_empty("QUICKNOTE_API_URL") {
            self.client.api_url = v;
        }
        if let Some(port) = non_empty("PORT") {
            match (port.trim().parse::<u16>(), self.server.bind_addr()) {
                (Ok(port), Ok(mut addr)) => {
                    addr.set_port(port);
                    self.server.bind = addr.to_string();
                }
                (Err(e), _) => tracing::warn!(%port, "ignoring invalid PORT: {}", e),
                (_, Err(e)) => tracing::warn!("ignoring PORT: {}", e),
            }
        }
    }

    /// Expand `${VAR}` references in string settings
    fn expand_variables<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let expand_opt = |v: &mut Option<String>| {
            if let Some(s) = v.as_mut() {
                *s = expand_string(s, &lookup);
            }
        };

        expand_opt(&mut self.supabase.url);
        expand_opt(&mut self.supabase.service_key);
        expand_opt(&mut self.supabase.jwt_secret);
        expand_opt(&mut self.supabase.jwt_audience);
        expand_opt(&mut self.supabase.google_redirect_url);
        self.server.bind = expand_string(&self.server.bind, &lookup);
        self.client.api_url = expand_string(&self.client.api_url, &lookup);
        for origin in &mut self.server.allowed_origins {
            *origin = expand_string(origin, &lookup);
        }
    }
}

/// Replace `${VAR}` with the looked-up value (empty when unset).
pub fn expand_string<F>(s: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    VAR_RE
        .replace_all(s, |caps: &regex::Captures<'_>| {
            lookup(&caps[1]).unwrap_or_default()
        })
        .into_owned()
}
