// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Client API abstraction for the Jules resource service
//!
//! [`ResourceClient`] is the seam between the transport (the REST client)
//! and everything that consumes remote resources: the session observer, the
//! CLI and the HTTP gateway. Each method maps one-to-one onto a remote
//! operation and either returns a decoded body or fails with a
//! [`ClientApiError`].

pub mod error;

pub use error::{ClientApiError, ClientApiResult};

use async_trait::async_trait;
use jr_api_contract::*;

/// Page size used when resolving a repository name to a connected source
pub const SOURCE_RESOLUTION_PAGE_SIZE: u32 = 100;

#[async_trait]
pub trait ResourceClient: Send + Sync {
    /// List sources (repositories) connected to the account
    async fn list_sources(&self, query: &SourceQuery) -> ClientApiResult<SourceListResponse>;

    /// Get a single source
    async fn get_source(&self, source_id: &str) -> ClientApiResult<Source>;

    /// Create a session
    async fn create_session(&self, request: &CreateSessionRequest) -> ClientApiResult<Session>;

    /// List sessions visible to the caller
    async fn list_sessions(&self, query: &SessionQuery) -> ClientApiResult<SessionListResponse>;

    /// Get a single session
    async fn get_session(&self, session_id: &str) -> ClientApiResult<Session>;

    /// Delete a session
    async fn delete_session(&self, session_id: &str) -> ClientApiResult<()>;

    /// Send a user message to an active session
    async fn send_message(
        &self,
        session_id: &str,
        message: &str,
    ) -> ClientApiResult<serde_json::Value>;

    /// Approve the plan a session is waiting on
    async fn approve_plan(&self, session_id: &str) -> ClientApiResult<serde_json::Value>;

    /// List one page of a session's activities
    async fn list_activities(
        &self,
        session_id: &str,
        query: &ActivityQuery,
    ) -> ClientApiResult<ActivityListResponse>;

    /// Get a single activity
    async fn get_activity(&self, session_id: &str, activity_id: &str)
        -> ClientApiResult<Activity>;

    /// Find the connected source for a GitHub repository (`owner/repo`).
    async fn resolve_source(&self, repo: &str) -> ClientApiResult<Source> {
        let query = SourceQuery {
            page_size: SOURCE_RESOLUTION_PAGE_SIZE,
            ..Default::default()
        };
        let response = self.list_sources(&query).await?;
        tracing::debug!(
            repo,
            candidates = response.sources.len(),
            "resolving repository to connected source"
        );

        response
            .sources
            .into_iter()
            .find(|source| source.matches_repo(repo))
            .ok_or_else(|| {
                ClientApiError::NotFound(format!(
                    "Repository '{}' not found in connected sources. Please connect it in the Jules web UI first.",
                    repo
                ))
            })
    }
}
