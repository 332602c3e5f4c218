// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Session and activity endpoints

use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, Path, Query, State},
    Json,
};
use jr_api_contract::*;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::{GatewayError, GatewayResult};
use crate::handlers::{body_or_status, json_body, query};
use crate::state::AppState;

pub async fn list_sessions(
    State(state): State<AppState>,
    params: Result<Query<SessionQuery>, QueryRejection>,
) -> GatewayResult<Json<SessionListResponse>> {
    let client = state.client().await?;
    let params = query(params)?;
    Ok(Json(client.list_sessions(&params).await?))
}

/// Body of `POST /api/sessions`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionBody {
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub source_id: Option<String>,
    #[serde(default)]
    pub branch: Option<String>,
    #[serde(default)]
    pub require_plan_approval: bool,
    #[serde(default)]
    pub automation_mode: AutomationMode,
}

impl CreateSessionBody {
    fn into_request(self) -> GatewayResult<CreateSessionRequest> {
        let source = self.source_id.as_deref().map(source_path).transpose()?;
        let request = CreateSessionRequest::builder(self.prompt)
            .title(self.title)
            .source(source)
            .starting_branch(self.branch)
            .require_plan_approval(self.require_plan_approval)
            .automation_mode(self.automation_mode)
            .build();
        validate_create_session_request(&request)?;
        Ok(request)
    }
}

pub async fn create_session(
    State(state): State<AppState>,
    body: Bytes,
) -> GatewayResult<Json<Session>> {
    let client = state.client().await?;
    let request = json_body::<CreateSessionBody>(&body)?.into_request()?;
    Ok(Json(client.create_session(&request).await?))
}

pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> GatewayResult<Json<Session>> {
    let client = state.client().await?;
    Ok(Json(client.get_session(&session_id).await?))
}

pub async fn delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> GatewayResult<Json<Value>> {
    let client = state.client().await?;
    client.delete_session(&session_id).await?;
    Ok(Json(json!({ "status": "deleted" })))
}

#[derive(Debug, Default, Deserialize)]
pub struct MessageBody {
    #[serde(default)]
    pub message: String,
}

pub async fn send_message(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    body: Bytes,
) -> GatewayResult<Json<Value>> {
    let client = state.client().await?;
    let body: MessageBody = json_body(&body)?;
    if body.message.trim().is_empty() {
        return Err(GatewayError::BadRequest("message is required".to_string()));
    }
    let response = client.send_message(&session_id, &body.message).await?;
    Ok(Json(body_or_status(response, "sent")))
}

pub async fn approve_plan(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> GatewayResult<Json<Value>> {
    let client = state.client().await?;
    let response = client.approve_plan(&session_id).await?;
    Ok(Json(body_or_status(response, "approved")))
}

pub async fn list_activities(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    params: Result<Query<ActivityQuery>, QueryRejection>,
) -> GatewayResult<Json<ActivityListResponse>> {
    let client = state.client().await?;
    let params = query(params)?;
    Ok(Json(client.list_activities(&session_id, &params).await?))
}
