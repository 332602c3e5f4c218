// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Jules gateway binary

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use jr_gateway::{config::DEFAULT_PORT, AppState, GatewayConfig, Server};
use jr_logging::{CliLoggingArgs, DefaultDestination};
use jr_rest_client::ClientConfig;

#[derive(Parser, Debug)]
#[command(author, version, about = "HTTP gateway for the Jules API", long_about = None)]
struct Args {
    /// Bind address for the server
    #[arg(short, long, default_value_t = SocketAddr::from(([127, 0, 0, 1], DEFAULT_PORT)))]
    bind: SocketAddr,

    /// Disable CORS headers
    #[arg(long)]
    no_cors: bool,

    /// API key used at startup and as the fallback for /api/init
    #[arg(long, env = "JULES_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Service base URL
    #[arg(long)]
    base_url: Option<String>,

    /// .env file to load instead of searching the working directory
    #[arg(long)]
    env_file: Option<PathBuf>,

    #[command(flatten)]
    logging: CliLoggingArgs,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    args.logging.init("jr-gateway", DefaultDestination::Console)?;

    let mut client = match &args.env_file {
        Some(path) => ClientConfig::from_env_file(path)?,
        None => ClientConfig::from_env()?,
    }
    .with_api_key(args.api_key.clone());
    if let Some(base_url) = args.base_url {
        client.base_url = base_url;
    }

    let state = AppState::from_client_config(&client);
    if let Some(api_key) = client.api_key.as_deref() {
        state.initialize(api_key).await?;
        tracing::info!(
            api_key = %jr_logging::redact(api_key),
            "client initialized from environment"
        );
    }

    let config = GatewayConfig {
        bind_addr: args.bind,
        enable_cors: !args.no_cors,
        client,
    };
    Server::new(config, state).run().await
}
