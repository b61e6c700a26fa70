mod client;
mod commands;
mod session;
mod tracing_setup;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use quicknote_core::QuicknoteConfig;

use commands::auth::{GoogleCallbackArgs, GoogleUrlArgs, SigninArgs, SignupArgs, VerifyArgs};
use commands::config::ConfigCommands;
use commands::notes::NotesCommands;
#[cfg(feature = "server")]
use commands::serve::ServeArgs;
use commands::Ctx;
use session::SessionStore;
use tracing_setup::{init_tracing, TracingConfig};

#[derive(Parser, Debug)]
#[command(
    name = "quicknote",
    author,
    version,
    about = "Passwordless note taking: API server and command-line client",
    propagate_version = true
)]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Server base URL (overrides client.api_url and QUICKNOTE_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Session file (default: ~/.quicknote/session.json)
    #[arg(long, global = true, env = "QUICKNOTE_SESSION")]
    session_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API server
    #[cfg(feature = "server")]
    Serve(ServeArgs),
    /// Create an account: sends a one-time code, verifies it and saves your profile
    Signup(SignupArgs),
    /// Sign in with a one-time code sent to your email
    Signin(SigninArgs),
    /// Verify a one-time code you already received
    Verify(VerifyArgs),
    /// Print the Google sign-in URL to open in a browser
    GoogleUrl(GoogleUrlArgs),
    /// Finish Google sign-in with the code from the redirect
    GoogleCallback(GoogleCallbackArgs),
    /// Manage your notes
    Notes {
        #[command(subcommand)]
        command: NotesCommands,
    },
    /// Show your saved profile
    Profile,
    /// Show who is signed in
    Whoami,
    /// Forget the saved session
    Logout,
    /// Inspect configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

/// `.env` in the working directory wins over `~/.quicknote/.env`; neither
/// overrides variables already set.
///
/// Runs before argument parsing so clap `env` fallbacks and `RUST_LOG` see
/// the file values. Outcomes are returned for logging once tracing is up.
fn load_dotenv() -> Vec<(PathBuf, Result<(), dotenvy::Error>)> {
    let mut outcomes = Vec::new();
    if let Ok(path) = dotenvy::dotenv() {
        outcomes.push((path, Ok(())));
    }
    let home_env = QuicknoteConfig::config_dir().join(".env");
    if home_env.exists() {
        let result = dotenvy::from_path(&home_env);
        outcomes.push((home_env, result));
    }
    outcomes
}

#[tokio::main]
async fn main() -> Result<()> {
    let dotenv = load_dotenv();
    let cli = Cli::parse();
    init_tracing(&TracingConfig { debug: cli.debug }).ok();
    for (path, result) in dotenv {
        match result {
            Ok(()) => tracing::debug!(path = %path.display(), "loaded .env"),
            Err(err) => tracing::warn!(path = %path.display(), "failed to load .env: {}", err),
        }
    }

    let config = QuicknoteConfig::load().context("Failed to load config")?;

    let ctx = Ctx {
        api_url: cli
            .api_url
            .clone()
            .unwrap_or_else(|| config.client.api_url.clone()),
        sessions: SessionStore::new(
            cli.session_file
                .clone()
                .unwrap_or_else(SessionStore::default_path),
        ),
        config,
    };
    tracing::debug!(api_url = %ctx.api_url, session = %ctx.sessions.path().display(), "client context");

    match cli.command {
        #[cfg(feature = "server")]
        Commands::Serve(args) => commands::run_serve(&ctx.config, args).await,
        Commands::Signup(args) => commands::run_signup(&ctx, args).await,
        Commands::Signin(args) => commands::run_signin(&ctx, args).await,
        Commands::Verify(args) => commands::run_verify(&ctx, args).await,
        Commands::GoogleUrl(args) => commands::run_google_url(&ctx, args).await,
        Commands::GoogleCallback(args) => commands::run_google_callback(&ctx, args).await,
        Commands::Notes { command } => commands::run_notes(&ctx, command).await,
        Commands::Profile => commands::run_profile(&ctx).await,
        Commands::Whoami => commands::run_whoami(&ctx).await,
        Commands::Logout => commands::run_logout(&ctx).await,
        Commands::Config { command } => commands::run_config(&ctx.config, command),
    }
}
