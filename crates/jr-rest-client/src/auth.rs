// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! API key authentication

use jr_api_contract::API_KEY_HEADER;
use reqwest::header::{HeaderMap, HeaderValue};

use crate::error::{RestClientError, RestClientResult};

/// An API key. `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wrap a key, rejecting blank values
    pub fn new(key: impl Into<String>) -> Option<Self> {
        let key = key.into().trim().to_string();
        if key.is_empty() { None } else { Some(Self(key)) }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

/// Authentication configuration
#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
    pub api_key: Option<ApiKey>,
}

impl AuthConfig {
    pub fn with_api_key(key: impl Into<String>) -> Self {
        Self {
            api_key: ApiKey::new(key),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Headers attached to every request
    pub fn headers(&self) -> RestClientResult<HeaderMap> {
        let key = self.api_key.as_ref().ok_or_else(|| {
            RestClientError::Auth("JULES_API_KEY is not set".to_string())
        })?;

        let mut value = HeaderValue::from_str(key.expose())
            .map_err(|_| RestClientError::Auth("API key contains invalid characters".into()))?;
        value.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, value);
        Ok(headers)
    }
}
