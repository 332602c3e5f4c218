// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Error taxonomy shared by every [`crate::ResourceClient`] implementation

use jr_api_contract::ApiContractError;
use thiserror::Error;

pub type ClientApiResult<T> = Result<T, ClientApiError>;

#[derive(Debug, Clone, Error)]
pub enum ClientApiError {
    /// Missing credential or unusable client settings. Never retried.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The request never produced an HTTP response
    #[error("Transport error: {0}")]
    Transport(String),

    /// The service answered with a non-success status
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// The response body did not have the expected shape
    #[error("Unexpected response: {0}")]
    Decode(String),

    /// A requested resource (e.g. a repository's source) does not exist
    #[error("{0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl From<ApiContractError> for ClientApiError {
    fn from(err: ApiContractError) -> Self {
        ClientApiError::InvalidRequest(err.to_string())
    }
}
