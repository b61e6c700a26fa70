//! Run the quicknote HTTP server

use anyhow::{Context, Result};
use clap::Parser;
use quicknote_core::QuicknoteConfig;
use quicknote_server::ServerSettings;
use std::net::SocketAddr;

#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind to (default: server.bind from config, or 0.0.0.0:5000)
    #[arg(long, short = 'b')]
    pub bind: Option<SocketAddr>,

    /// Allow permissive CORS (all origins)
    #[arg(long)]
    pub cors_permissive: bool,
}

pub async fn run_serve(config: &QuicknoteConfig, args: ServeArgs) -> Result<()> {
    let mut settings = ServerSettings::from_config(config)
        .context("Server is not configured (see `quicknote config path`)")?;

    if let Some(bind) = args.bind {
        settings.server.bind_addr = bind;
    }
    if args.cors_permissive {
        settings.server.cors_permissive = true;
    }

    // Blocks until ctrl-c / SIGTERM
    quicknote_server::serve(settings)
        .await
        .context("Server error")?;

    Ok(())
}
