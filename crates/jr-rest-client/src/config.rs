// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Client configuration loaded from the environment and `.env` files

use std::path::Path;

use jr_api_contract::DEFAULT_BASE_URL;
use serde::Deserialize;

use crate::auth::AuthConfig;
use crate::error::{RestClientError, RestClientResult};

/// Prefix of the environment variables read by [`ClientConfig::from_env`]
pub const ENV_PREFIX: &str = "JULES";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
        }
    }
}

impl ClientConfig {
    /// Load `.env` (searched upward from the working directory, if any) and
    /// read `JULES_*` variables from the process environment.
    pub fn from_env() -> RestClientResult<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "loaded .env");
        }
        Self::from_source(None)
    }

    /// Like [`ClientConfig::from_env`] but loads the given `.env` file.
    /// A missing file is not an error.
    pub fn from_env_file(path: &Path) -> RestClientResult<Self> {
        match dotenvy::from_path(path) {
            Ok(()) => tracing::debug!(path = %path.display(), "loaded .env"),
            Err(err) if err.not_found() => {}
            Err(err) => return Err(RestClientError::Config(err.to_string())),
        }
        Self::from_source(None)
    }

    /// Read configuration from an explicit variable map instead of the process
    /// environment.
    pub fn from_vars<I, K, V>(vars: I) -> RestClientResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let map = vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        Self::from_source(Some(map))
    }

    fn from_source(source: Option<config::Map<String, String>>) -> RestClientResult<Self> {
        // JULES_API_KEY -> api_key, JULES_BASE_URL -> base_url
        let built = config::Config::builder()
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .source(source),
            )
            .build()
            .map_err(|e| RestClientError::Config(e.to_string()))?;

        let mut loaded: ClientConfig = built
            .try_deserialize()
            .map_err(|e| RestClientError::Config(e.to_string()))?;

        loaded.api_key = loaded.api_key.filter(|key| !key.trim().is_empty());
        if loaded.base_url.trim().is_empty() {
            loaded.base_url = default_base_url();
        }
        Ok(loaded)
    }

    /// Override the API key (e.g. from a CLI flag)
    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        if let Some(key) = api_key.filter(|key| !key.trim().is_empty()) {
            self.api_key = Some(key);
        }
        self
    }

    pub fn auth(&self) -> AuthConfig {
        match &self.api_key {
            Some(key) => AuthConfig::with_api_key(key.clone()),
            None => AuthConfig::default(),
        }
    }
}
