//! quicknote-server: HTTP relay for auth and per-user notes
//!
//! Validates requests, forwards them to the managed auth/database service
//! and relays the answer. Holds no state of its own.

pub mod auth;
pub mod http;
pub mod settings;
pub mod upstream;

pub use http::{build_router, run_server, ApiError, AppState, ServerConfig, ServerError};
pub use settings::ServerSettings;

/// Build state from settings and serve until shutdown.
pub async fn serve(settings: ServerSettings) -> Result<(), ServerError> {
    tracing::info!(
        bind = %settings.server.bind_addr,
        cors_permissive = settings.server.cors_permissive,
        "starting quicknote server"
    );
    let state = AppState::from_settings(&settings)?;
    run_server(state, settings.server).await
}
