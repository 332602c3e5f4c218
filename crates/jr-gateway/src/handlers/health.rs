// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Health, configuration and initialization endpoints

use axum::{body::Bytes, extract::State, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::{GatewayError, GatewayResult};
use crate::handlers::json_body;
use crate::state::AppState;

pub async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn config(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "hasApiKey": state.slot.is_initialized().await }))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitRequest {
    #[serde(default)]
    pub api_key: Option<String>,
}

/// (Re)initialize the client, falling back to the configured key
pub async fn init(State(state): State<AppState>, body: Bytes) -> GatewayResult<Json<Value>> {
    let request: InitRequest = json_body(&body)?;
    let api_key = request
        .api_key
        .filter(|key| !key.trim().is_empty())
        .or_else(|| state.fallback_api_key.clone())
        .ok_or(GatewayError::ApiKeyRequired)?;

    state.initialize(&api_key).await?;
    tracing::info!(api_key = %jr_logging::redact(&api_key), "client initialized");
    Ok(Json(json!({ "status": "initialized" })))
}
