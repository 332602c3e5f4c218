// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Main REST API client implementation

use std::time::Duration;

use jr_api_contract::*;
use reqwest::{Client as HttpClient, Method, Response};
use serde::{de::DeserializeOwned, Serialize};
use url::Url;

use crate::auth::AuthConfig;
use crate::config::ClientConfig;
use crate::error::{RestClientError, RestClientResult};

const USER_AGENT: &str = concat!("jules-relay/", env!("CARGO_PKG_VERSION"));

/// REST API client for the Jules service
#[derive(Debug, Clone)]
pub struct RestClient {
    http_client: HttpClient,
    base_url: Url,
    auth: AuthConfig,
}

impl RestClient {
    /// Create a new REST client.
    ///
    /// Paths are joined relative to `base_url`, so a base without a trailing
    /// slash gets one appended (`.../v1alpha` + `sessions` must not drop the
    /// version segment).
    pub fn new(mut base_url: Url, auth: AuthConfig) -> RestClientResult<Self> {
        if base_url.cannot_be_a_base() {
            return Err(RestClientError::Config(format!(
                "base URL '{}' cannot be used as a base",
                base_url
            )));
        }
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let http_client = HttpClient::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http_client,
            base_url,
            auth,
        })
    }

    /// Create a client from a base URL string
    pub fn from_url(base_url: &str, auth: AuthConfig) -> RestClientResult<Self> {
        let base_url = Url::parse(base_url)?;
        Self::new(base_url, auth)
    }

    /// Create a client from loaded configuration. Fails when no API key is
    /// configured, before any request is attempted.
    pub fn from_config(config: &ClientConfig) -> RestClientResult<Self> {
        let auth = config.auth();
        if !auth.is_configured() {
            return Err(RestClientError::Auth(
                "JULES_API_KEY is not set; pass --api-key or add it to .env".to_string(),
            ));
        }
        Self::from_url(&config.base_url, auth)
    }

    /// Get the base URL
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Get the authentication config
    pub fn auth(&self) -> &AuthConfig {
        &self.auth
    }

    /// List connected sources
    pub async fn list_sources(&self, query: &SourceQuery) -> RestClientResult<SourceListResponse> {
        self.get_with_query("sources", query).await
    }

    /// Get a specific source
    pub async fn get_source(&self, source_id: &str) -> RestClientResult<Source> {
        self.get(&source_path(source_id)?).await
    }

    /// Create a session
    pub async fn create_session(
        &self,
        request: &CreateSessionRequest,
    ) -> RestClientResult<Session> {
        validate_create_session_request(request)?;
        tracing::info!(
            title = request.title.as_deref().unwrap_or_default(),
            source = request
                .source_context
                .as_ref()
                .map(|ctx| ctx.source.as_str())
                .unwrap_or_default(),
            "creating session"
        );
        self.post("sessions", request).await
    }

    /// List sessions
    pub async fn list_sessions(&self, query: &SessionQuery) -> RestClientResult<SessionListResponse> {
        self.get_with_query("sessions", query).await
    }

    /// Get a specific session
    pub async fn get_session(&self, session_id: &str) -> RestClientResult<Session> {
        self.get(&session_path(session_id)?).await
    }

    /// Delete a session. The response body, if any, is discarded.
    pub async fn delete_session(&self, session_id: &str) -> RestClientResult<()> {
        let _: serde_json::Value = self.delete(&session_path(session_id)?).await?;
        Ok(())
    }

    /// Send a message to a session
    pub async fn send_message(
        &self,
        session_id: &str,
        message: &str,
    ) -> RestClientResult<serde_json::Value> {
        let path = format!("{}:sendMessage", session_path(session_id)?);
        let body = SendMessageRequest {
            prompt: message.to_string(),
        };
        self.post(&path, &body).await
    }

    /// Approve the pending plan of a session
    pub async fn approve_plan(&self, session_id: &str) -> RestClientResult<serde_json::Value> {
        let path = format!("{}:approvePlan", session_path(session_id)?);
        self.post(&path, &serde_json::json!({})).await
    }

    /// List one page of activities for a session
    pub async fn list_activities(
        &self,
        session_id: &str,
        query: &ActivityQuery,
    ) -> RestClientResult<ActivityListResponse> {
        let path = format!("{}/activities", session_path(session_id)?);
        self.get_with_query(&path, query).await
    }

    /// Get a specific activity
    pub async fn get_activity(
        &self,
        session_id: &str,
        activity_id: &str,
    ) -> RestClientResult<Activity> {
        self.get(&activity_path(session_id, activity_id)?).await
    }

    // Private helper methods

    async fn get<T: DeserializeOwned>(&self, path: &str) -> RestClientResult<T> {
        self.request(Method::GET, path, None::<&()>, None::<&()>).await
    }

    async fn get_with_query<T: DeserializeOwned, Q: Serialize>(
        &self,
        path: &str,
        query: &Q,
    ) -> RestClientResult<T> {
        self.request(Method::GET, path, Some(query), None::<&()>).await
    }

    async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> RestClientResult<T> {
        self.request(Method::POST, path, None::<&()>, Some(body)).await
    }

    async fn delete<T: DeserializeOwned>(&self, path: &str) -> RestClientResult<T> {
        self.request(Method::DELETE, path, None::<&()>, None::<&()>).await
    }

    async fn request<T: DeserializeOwned, Q: Serialize, B: Serialize>(
        &self,
        method: Method,
        path: &str,
        query: Option<&Q>,
        body: Option<&B>,
    ) -> RestClientResult<T> {
        let url = self.base_url.join(path)?;
        tracing::debug!(%method, %url, "sending request");

        let mut request = self.http_client.request(method, url);
        request = request.headers(self.auth.headers()?);

        if let Some(query) = query {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        self.handle_response(response).await
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: Response,
    ) -> RestClientResult<T> {
        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            // Some endpoints (delete, approvePlan) answer with an empty body
            let text = if text.trim().is_empty() { "null" } else { text.as_str() };
            serde_json::from_str(text).map_err(RestClientError::from)
        } else {
            let message = match serde_json::from_str::<ApiErrorEnvelope>(&text) {
                Ok(envelope) if !envelope.error.message.is_empty() => envelope.error.message,
                Ok(envelope) => envelope.error.to_string(),
                Err(_) if text.trim().is_empty() => status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string(),
                Err(_) => text,
            };
            tracing::warn!(status = status.as_u16(), %message, "request failed");
            Err(RestClientError::ServerError { status, message })
        }
    }
}
