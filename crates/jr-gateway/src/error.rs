// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Gateway error types and their JSON rendering

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use jr_api_contract::ApiContractError;
use jr_client_api::ClientApiError;
use serde_json::json;

pub type GatewayResult<T> = Result<T, GatewayError>;

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("Jules client not initialized")]
    NotInitialized,

    #[error("API key required")]
    ApiKeyRequired,

    #[error("{0}")]
    BadRequest(String),

    #[error("Not found")]
    NotFound,

    #[error(transparent)]
    Upstream(#[from] ClientApiError),
}

impl GatewayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::ApiKeyRequired | GatewayError::BadRequest(_) => StatusCode::BAD_REQUEST,
            GatewayError::NotFound => StatusCode::NOT_FOUND,
            GatewayError::Upstream(ClientApiError::InvalidRequest(_)) => StatusCode::BAD_REQUEST,
            GatewayError::NotInitialized | GatewayError::Upstream(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<ApiContractError> for GatewayError {
    fn from(err: ApiContractError) -> Self {
        GatewayError::BadRequest(err.to_string())
    }
}

/// Every error renders as `{"error": "<message>"}`
impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "request rejected");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
