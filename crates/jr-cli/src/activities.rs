// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

use std::io::Write;

use clap::Args;
use jr_api_contract::ActivityQuery;

use crate::CommandContext;

#[derive(Args, Debug, Clone)]
pub struct ListActivitiesArgs {
    /// Session ID or resource name
    #[arg(long)]
    pub session_id: String,

    #[arg(long, default_value_t = 50)]
    pub page_size: u32,

    #[arg(long)]
    pub page_token: Option<String>,
}

impl ListActivitiesArgs {
    pub async fn run(self, ctx: &CommandContext, out: &mut dyn Write) -> anyhow::Result<()> {
        let query = ActivityQuery {
            page_size: self.page_size,
            page_token: self.page_token,
            create_time: None,
        };
        let page = ctx.client.list_activities(&self.session_id, &query).await?;

        if page.activities.is_empty() {
            writeln!(out, "No activities found.")?;
            return Ok(());
        }
        for activity in &page.activities {
            writeln!(
                out,
                "[{}] {}: {}",
                activity.create_time,
                activity.originator,
                activity.description_or_default()
            )?;
        }
        if let Some(token) = page.next_page_token.filter(|t| !t.is_empty()) {
            writeln!(out, "\nMore results available. Use next page token: {token}")?;
        }
        Ok(())
    }
}

#[derive(Args, Debug, Clone)]
pub struct GetActivityArgs {
    #[arg(long)]
    pub session_id: String,

    #[arg(long)]
    pub activity_id: String,
}

impl GetActivityArgs {
    pub async fn run(self, ctx: &CommandContext, out: &mut dyn Write) -> anyhow::Result<()> {
        let activity = ctx
            .client
            .get_activity(&self.session_id, &self.activity_id)
            .await?;
        writeln!(out, "{}", serde_json::to_string_pretty(&activity)?)?;
        Ok(())
    }
}
