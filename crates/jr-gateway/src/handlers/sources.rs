// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Source (connected repository) endpoints

use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, Path, Query, State},
    Json,
};
use jr_api_contract::*;

use crate::error::GatewayResult;
use crate::handlers::{json_body, query};
use crate::state::AppState;

pub async fn list_sources(
    State(state): State<AppState>,
    params: Result<Query<SourceQuery>, QueryRejection>,
) -> GatewayResult<Json<SourceListResponse>> {
    let client = state.client().await?;
    let params = query(params)?;
    Ok(Json(client.list_sources(&params).await?))
}

/// Same as [`list_sources`] with the query in a JSON body
pub async fn search_sources(
    State(state): State<AppState>,
    body: Bytes,
) -> GatewayResult<Json<SourceListResponse>> {
    let client = state.client().await?;
    let params: SourceQuery = json_body(&body)?;
    Ok(Json(client.list_sources(&params).await?))
}

/// `source_id` may contain slashes (`github/owner/repo`)
pub async fn get_source(
    State(state): State<AppState>,
    Path(source_id): Path<String>,
) -> GatewayResult<Json<Source>> {
    let client = state.client().await?;
    Ok(Json(client.get_source(&source_id).await?))
}
