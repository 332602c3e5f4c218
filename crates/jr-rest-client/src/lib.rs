// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! REST API client for the Jules coding-agent service
//!
//! [`RestClient`] speaks HTTPS + JSON to `https://jules.googleapis.com/v1alpha`,
//! authenticating every request with the `x-goog-api-key` header. It exposes
//! one inherent method per remote operation and implements
//! [`jr_client_api::ResourceClient`] so the observer, the CLI and the gateway
//! never depend on reqwest directly.

pub mod auth;
pub mod client;
pub mod config;
pub mod error;

pub use auth::*;
pub use client::*;
pub use config::*;
pub use error::*;

use jr_api_contract::*;
use jr_client_api::{ClientApiResult, ResourceClient};
use async_trait::async_trait;

#[async_trait]
impl ResourceClient for client::RestClient {
    async fn list_sources(&self, query: &SourceQuery) -> ClientApiResult<SourceListResponse> {
        Ok(self.list_sources(query).await?)
    }

    async fn get_source(&self, source_id: &str) -> ClientApiResult<Source> {
        Ok(self.get_source(source_id).await?)
    }

    async fn create_session(&self, request: &CreateSessionRequest) -> ClientApiResult<Session> {
        Ok(self.create_session(request).await?)
    }

    async fn list_sessions(&self, query: &SessionQuery) -> ClientApiResult<SessionListResponse> {
        Ok(self.list_sessions(query).await?)
    }

    async fn get_session(&self, session_id: &str) -> ClientApiResult<Session> {
        Ok(self.get_session(session_id).await?)
    }

    async fn delete_session(&self, session_id: &str) -> ClientApiResult<()> {
        Ok(self.delete_session(session_id).await?)
    }

    async fn send_message(
        &self,
        session_id: &str,
        message: &str,
    ) -> ClientApiResult<serde_json::Value> {
        Ok(self.send_message(session_id, message).await?)
    }

    async fn approve_plan(&self, session_id: &str) -> ClientApiResult<serde_json::Value> {
        Ok(self.approve_plan(session_id).await?)
    }

    async fn list_activities(
        &self,
        session_id: &str,
        query: &ActivityQuery,
    ) -> ClientApiResult<ActivityListResponse> {
        Ok(self.list_activities(session_id, query).await?)
    }

    async fn get_activity(
        &self,
        session_id: &str,
        activity_id: &str,
    ) -> ClientApiResult<Activity> {
        Ok(self.get_activity(session_id, activity_id).await?)
    }
}
