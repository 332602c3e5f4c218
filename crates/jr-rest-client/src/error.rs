// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Error types for the REST client

use jr_api_contract::ApiContractError;
use jr_client_api::ClientApiError;
use reqwest::StatusCode;
use thiserror::Error;

pub type RestClientResult<T> = Result<T, RestClientError>;

#[derive(Debug, Error)]
pub enum RestClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Failed to decode response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Contract(#[from] ApiContractError),

    #[error("Server error {status}: {message}")]
    ServerError { status: StatusCode, message: String },
}

impl From<RestClientError> for ClientApiError {
    fn from(err: RestClientError) -> Self {
        match err {
            RestClientError::Http(e) => ClientApiError::Transport(e.to_string()),
            RestClientError::Json(e) => ClientApiError::Decode(e.to_string()),
            RestClientError::Auth(msg) | RestClientError::Config(msg) => {
                ClientApiError::Configuration(msg)
            }
            RestClientError::Url(e) => ClientApiError::Configuration(e.to_string()),
            RestClientError::Contract(e) => ClientApiError::InvalidRequest(e.to_string()),
            RestClientError::ServerError { status, message } => ClientApiError::Server {
                status: status.as_u16(),
                message,
            },
        }
    }
}
