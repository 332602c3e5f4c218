// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

use std::io::Write;
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Args;
use jr_api_contract::{AutomationMode, CreateSessionRequest, SessionQuery};
use jr_observer::ObservationOutcome;

use crate::sink::PlainTextSink;
use crate::CommandContext;

#[derive(Args, Debug, Clone)]
pub struct CreateArgs {
    /// Task prompt
    #[arg(long)]
    pub prompt: String,

    /// Session title (default: derived from the prompt)
    #[arg(long)]
    pub title: Option<String>,

    /// GitHub repository (owner/repo) to work in
    #[arg(long)]
    pub repo: Option<String>,

    /// Starting branch
    #[arg(long, default_value = "main")]
    pub branch: String,

    /// File whose contents are appended to the prompt
    #[arg(long)]
    pub context_file: Option<PathBuf>,

    /// Require explicit plan approval before Jules starts working
    #[arg(long)]
    pub require_approval: bool,

    /// Open a pull request automatically when done
    #[arg(long)]
    pub auto_pr: bool,

    /// Return right after creating the session
    #[arg(long)]
    pub no_poll: bool,
}

impl CreateArgs {
    /// Prompt with the context file appended
    pub async fn full_prompt(&self) -> anyhow::Result<String> {
        let Some(path) = &self.context_file else {
            return Ok(self.prompt.clone());
        };
        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                bail!("Context file {} not found.", path.display())
            }
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("failed to read context file {}", path.display()))
            }
        };
        Ok(format!(
            "{}\n\nContext from {}:\n{}",
            self.prompt,
            path.display(),
            content
        ))
    }

    pub async fn run(self, ctx: &CommandContext, out: &mut dyn Write) -> anyhow::Result<()> {
        let prompt = self.full_prompt().await?;

        let source = match &self.repo {
            Some(repo) => {
                writeln!(out, "Resolving source for repo: {repo}...")?;
                let source = ctx.client.resolve_source(repo).await?;
                writeln!(out, "Found source ID: {}", source.name)?;
                Some(source.name)
            }
            None => None,
        };

        let automation_mode = if self.auto_pr {
            AutomationMode::AutoCreatePr
        } else {
            AutomationMode::default()
        };
        let request = CreateSessionRequest::builder(prompt)
            .title(self.title.clone())
            .source(source)
            .starting_branch(Some(self.branch.clone()))
            .require_plan_approval(self.require_approval)
            .automation_mode(automation_mode)
            .build();

        writeln!(out, "Initiating Jules session...")?;
        let session = ctx.client.create_session(&request).await?;
        writeln!(out, "Session Created! ID: {}", session.name)?;
        if let Some(url) = &session.url {
            writeln!(out, "Web URL: {url}")?;
        }

        if self.no_poll {
            return Ok(());
        }
        writeln!(out, "Streaming activities...")?;
        stream(ctx, &session.name, out).await
    }
}

#[derive(Args, Debug, Clone)]
pub struct WatchArgs {
    /// Session ID or resource name
    #[arg(long)]
    pub session_id: String,
}

impl WatchArgs {
    pub async fn run(self, ctx: &CommandContext, out: &mut dyn Write) -> anyhow::Result<()> {
        writeln!(out, "Streaming activities for session {}...", self.session_id)?;
        stream(ctx, &self.session_id, out).await
    }
}

/// Observe `session_id`, rendering events as they arrive
async fn stream(
    ctx: &CommandContext,
    session_id: &str,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    let mut sink = PlainTextSink::new(&mut *out, ctx.timestamps);
    let outcome = ctx.session_observer().observe(session_id, &mut sink).await;
    sink.finish()?;

    match outcome? {
        ObservationOutcome::Finished { state, .. } => {
            tracing::info!(session = session_id, %state, "session finished");
        }
        ObservationOutcome::AwaitingUser { state, .. } => {
            tracing::info!(session = session_id, %state, "session waiting for user");
        }
        ObservationOutcome::TimedOut { elapsed } => {
            tracing::info!(
                session = session_id,
                elapsed_secs = elapsed.as_secs(),
                "stopped watching"
            );
        }
    }
    Ok(())
}

#[derive(Args, Debug, Clone)]
pub struct ListSessionsArgs {
    #[arg(long, default_value_t = 30)]
    pub page_size: u32,

    /// Token from a previous listing
    #[arg(long)]
    pub page_token: Option<String>,
}

impl ListSessionsArgs {
    pub async fn run(self, ctx: &CommandContext, out: &mut dyn Write) -> anyhow::Result<()> {
        let query = SessionQuery {
            page_size: self.page_size,
            page_token: self.page_token,
        };
        let page = ctx.client.list_sessions(&query).await?;

        if page.sessions.is_empty() {
            writeln!(out, "No sessions found.")?;
            return Ok(());
        }
        writeln!(out, "--- Sessions ---")?;
        for session in &page.sessions {
            writeln!(
                out,
                "ID: {} | Title: {} | State: {}",
                session.name, session.title, session.state
            )?;
        }
        if let Some(token) = page.next_page_token.filter(|t| !t.is_empty()) {
            writeln!(out, "\nMore results available. Use next page token: {token}")?;
        }
        Ok(())
    }
}

#[derive(Args, Debug, Clone)]
pub struct SessionIdArgs {
    /// Session ID or resource name
    #[arg(long)]
    pub session_id: String,
}

pub async fn get_session(
    args: SessionIdArgs,
    ctx: &CommandContext,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    let session = ctx.client.get_session(&args.session_id).await?;
    writeln!(out, "{}", serde_json::to_string_pretty(&session)?)?;
    Ok(())
}

pub async fn delete_session(
    args: SessionIdArgs,
    ctx: &CommandContext,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    ctx.client.delete_session(&args.session_id).await?;
    writeln!(out, "Session {} deleted successfully.", args.session_id)?;
    Ok(())
}

pub async fn approve_plan(
    args: SessionIdArgs,
    ctx: &CommandContext,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    ctx.client.approve_plan(&args.session_id).await?;
    writeln!(out, "Plan approved for session {}", args.session_id)?;
    Ok(())
}

#[derive(Args, Debug, Clone)]
pub struct SendMessageArgs {
    /// Session ID or resource name
    #[arg(long)]
    pub session_id: String,

    #[arg(long)]
    pub message: String,
}

impl SendMessageArgs {
    pub async fn run(self, ctx: &CommandContext, out: &mut dyn Write) -> anyhow::Result<()> {
        if self.message.trim().is_empty() {
            bail!("Message cannot be empty");
        }
        ctx.client
            .send_message(&self.session_id, &self.message)
            .await?;
        writeln!(out, "Message sent to session {}", self.session_id)?;
        Ok(())
    }
}
