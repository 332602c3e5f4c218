// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Subcommand;
use jr_client_api::ResourceClient;
use jr_logging::CliLoggingArgs;
use jr_observer::{ObserveError, ObserverConfig, SessionObserver};
use jr_rest_client::{ClientConfig, RestClient};
use tokio_util::sync::CancellationToken;

pub use clap::Parser;

pub mod activities;
pub mod sessions;
pub mod sink;
pub mod sources;

#[derive(clap::Parser, Debug)]
#[command(
    name = "jr",
    about = "Jules terminal client: create sessions and follow their progress",
    version,
    propagate_version = true
)]
pub struct Cli {
    /// Jules API key
    #[arg(long, env = "JULES_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    /// Service base URL (default: https://jules.googleapis.com/v1alpha)
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Max polling time in seconds
    #[arg(long, default_value_t = 300, global = true)]
    pub timeout: u64,

    /// .env file to load instead of searching the working directory
    #[arg(long, global = true)]
    pub env_file: Option<PathBuf>,

    #[command(flatten)]
    pub logging: CliLoggingArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a new session and stream its activities
    Create(sessions::CreateArgs),
    /// Stream activities of an existing session
    Watch(sessions::WatchArgs),
    /// List all sessions
    ListSessions(sessions::ListSessionsArgs),
    /// Get session details
    GetSession(sessions::SessionIdArgs),
    /// Delete a session
    DeleteSession(sessions::SessionIdArgs),
    /// Send a message to a session
    SendMessage(sessions::SendMessageArgs),
    /// Approve a pending plan
    ApprovePlan(sessions::SessionIdArgs),
    /// List session activities
    ListActivities(activities::ListActivitiesArgs),
    /// Get activity details
    GetActivity(activities::GetActivityArgs),
    /// List all connected sources
    ListSources(sources::ListSourcesArgs),
    /// Get source details
    GetSource(sources::GetSourceArgs),
}

/// Everything a command needs besides its own arguments
#[derive(Clone)]
pub struct CommandContext {
    pub client: Arc<dyn ResourceClient>,
    pub observer: ObserverConfig,
    pub cancel: CancellationToken,
    /// Prefix streamed activities with the local wall-clock time
    pub timestamps: bool,
}

impl CommandContext {
    pub fn new(client: Arc<dyn ResourceClient>, observer: ObserverConfig) -> Self {
        Self {
            client,
            observer,
            cancel: CancellationToken::new(),
            timestamps: true,
        }
    }

    pub fn session_observer(&self) -> SessionObserver {
        SessionObserver::new(self.client.clone(), self.observer.clone())
            .with_cancellation(self.cancel.clone())
    }
}

impl Commands {
    pub async fn run(self, ctx: &CommandContext, out: &mut dyn Write) -> anyhow::Result<()> {
        match self {
            Commands::Create(args) => args.run(ctx, out).await,
            Commands::Watch(args) => args.run(ctx, out).await,
            Commands::ListSessions(args) => args.run(ctx, out).await,
            Commands::GetSession(args) => sessions::get_session(args, ctx, out).await,
            Commands::DeleteSession(args) => sessions::delete_session(args, ctx, out).await,
            Commands::SendMessage(args) => args.run(ctx, out).await,
            Commands::ApprovePlan(args) => sessions::approve_plan(args, ctx, out).await,
            Commands::ListActivities(args) => args.run(ctx, out).await,
            Commands::GetActivity(args) => args.run(ctx, out).await,
            Commands::ListSources(args) => args.run(ctx, out).await,
            Commands::GetSource(args) => args.run(ctx, out).await,
        }
    }
}

impl Cli {
    /// Client settings from `.env`, the environment and the global flags
    pub fn client_config(&self) -> anyhow::Result<ClientConfig> {
        let mut config = match &self.env_file {
            Some(path) => ClientConfig::from_env_file(path)?,
            None => ClientConfig::from_env()?,
        }
        .with_api_key(self.api_key.clone());
        if let Some(base_url) = &self.base_url {
            config.base_url = base_url.clone();
        }
        Ok(config)
    }

    pub fn observer_config(&self) -> ObserverConfig {
        ObserverConfig {
            budget: Duration::from_secs(self.timeout),
            ..Default::default()
        }
    }

    /// Run the selected command until it finishes or `cancel` fires
    pub async fn run(self, cancel: CancellationToken, out: &mut dyn Write) -> anyhow::Result<()> {
        let config = self.client_config()?;
        let client = RestClient::from_config(&config)
            .context("JULES_API_KEY not found in environment or arguments")?;

        let mut ctx = CommandContext::new(Arc::new(client), self.observer_config());
        ctx.cancel = cancel.clone();

        tokio::select! {
            biased;
            result = self.command.run(&ctx, out) => result,
            _ = cancel.cancelled() => Err(ObserveError::Cancelled.into()),
        }
    }
}

/// Whether `err` is an operator interrupt rather than a failure
pub fn is_cancellation(err: &anyhow::Error) -> bool {
    err.downcast_ref::<ObserveError>()
        .is_some_and(ObserveError::is_cancelled)
}
