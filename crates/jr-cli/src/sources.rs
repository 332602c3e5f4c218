// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

use std::io::Write;

use clap::Args;
use jr_api_contract::SourceQuery;

use crate::CommandContext;

#[derive(Args, Debug, Clone)]
pub struct ListSourcesArgs {
    #[arg(long, default_value_t = 30)]
    pub page_size: u32,

    #[arg(long)]
    pub page_token: Option<String>,

    /// Server-side filter expression
    #[arg(long)]
    pub filter: Option<String>,
}

impl ListSourcesArgs {
    pub async fn run(self, ctx: &CommandContext, out: &mut dyn Write) -> anyhow::Result<()> {
        let query = SourceQuery {
            page_size: self.page_size,
            page_token: self.page_token,
            filter: self.filter,
        };
        let page = ctx.client.list_sources(&query).await?;

        if page.sources.is_empty() {
            writeln!(out, "No sources found.")?;
            return Ok(());
        }
        writeln!(out, "--- Connected Sources ---")?;
        for source in &page.sources {
            let repo = source
                .github_repo
                .as_ref()
                .map(|gh| gh.full_name())
                .unwrap_or_else(|| "-".to_string());
            writeln!(out, "Name: {} | Repo: {}", source.name, repo)?;
        }
        if let Some(token) = page.next_page_token.filter(|t| !t.is_empty()) {
            writeln!(out, "\nMore results available. Use next page token: {token}")?;
        }
        Ok(())
    }
}

#[derive(Args, Debug, Clone)]
pub struct GetSourceArgs {
    /// Source ID (`github/owner/repo`) or resource name
    #[arg(long)]
    pub source_id: String,
}

impl GetSourceArgs {
    pub async fn run(self, ctx: &CommandContext, out: &mut dyn Write) -> anyhow::Result<()> {
        let source = ctx.client.get_source(&self.source_id).await?;
        writeln!(out, "{}", serde_json::to_string_pretty(&source)?)?;
        Ok(())
    }
}
