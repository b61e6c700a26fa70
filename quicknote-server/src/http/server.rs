//! Router assembly and the serve loop
//!
//! CORS admits the local dev frontends plus configured origins unless
//! `cors_permissive` is set. Requests are traced; SIGTERM or Ctrl+C drains
//! in-flight requests before exit.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::HeaderValue;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::routes;
use crate::auth::TokenVerifier;
use crate::settings::ServerSettings;
use crate::upstream::{DataStore, IdentityProvider, SupabaseClient};

/// Origins a local frontend dev server typically runs on
const LOCAL_ORIGINS: &[&str] = &[
    "http://localhost:3000",
    "http://localhost:5173",
    "http://127.0.0.1:3000",
    "http://127.0.0.1:5173",
];

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to (default: 0.0.0.0:5000)
    pub bind_addr: SocketAddr,

    /// Accept any origin instead of localhost + `allowed_origins`
    pub cors_permissive: bool,

    /// Extra origins allowed in addition to localhost
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 5000)),
            cors_permissive: false,
            allowed_origins: Vec::new(),
        }
    }
}

/// Handles shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub identity: Arc<dyn IdentityProvider>,
    pub store: Arc<dyn DataStore>,
    pub verifier: TokenVerifier,
}

impl AppState {
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        store: Arc<dyn DataStore>,
        verifier: TokenVerifier,
    ) -> Self {
        Self {
            identity,
            store,
            verifier,
        }
    }

    /// Wire a single Supabase project in as both identity provider and store.
    pub fn from_settings(settings: &ServerSettings) -> Result<Self, ServerError> {
        let client = SupabaseClient::new(&settings.supabase_url, settings.service_key.clone())
            .map_err(|e| ServerError::UpstreamUrl(settings.supabase_url.clone(), e))?
            .with_google_redirect(settings.google_redirect_url.clone());
        let client = Arc::new(client);
        let verifier = TokenVerifier::new(&settings.jwt_secret, settings.jwt_audience.as_deref());

        tracing::info!(upstream = %client.base_url(), "upstream configured");
        Ok(Self::new(client.clone(), client, verifier))
    }
}

/// Build the router with all routes, CORS and tracing.
pub fn build_router(state: AppState, config: &ServerConfig) -> Router {
    Router::new()
        .merge(routes::health::router())
        .merge(routes::auth::router())
        .merge(routes::notes::router())
        .merge(routes::profile::router())
        .layer(cors_layer(config))
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    if config.cors_permissive {
        tracing::warn!("CORS is permissive, any origin may call the API");
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = LOCAL_ORIGINS
        .iter()
        .copied()
        .map(HeaderValue::from_static)
        .chain(config.allowed_origins.iter().filter_map(|o| {
            HeaderValue::from_str(o)
                .map_err(|_| tracing::warn!(origin = %o, "ignoring invalid CORS origin"))
                .ok()
        }))
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Bind `config.bind_addr` and serve until a shutdown signal arrives.
pub async fn run_server(state: AppState, config: ServerConfig) -> Result<(), ServerError> {
    let app = build_router(state, &config);

    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "quicknote server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let signal = shutdown_signal().await;
            tracing::info!(signal, "draining in-flight requests");
        })
        .await?;

    tracing::info!("quicknote server stopped");
    Ok(())
}

/// Name of the first shutdown signal received.
///
/// A handler that cannot be installed is logged and never fires; the
/// server keeps running on the other one.
async fn shutdown_signal() -> &'static str {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!("ctrl-c handler unavailable: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::error!("SIGTERM handler unavailable: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => "ctrl-c",
        _ = terminate => "sigterm",
    }
}

/// Failures that stop the server from starting or serving
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("server I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid upstream URL '{0}': {1}")]
    UpstreamUrl(String, #[source] url::ParseError),
}
