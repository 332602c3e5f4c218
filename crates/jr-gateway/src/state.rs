// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Gateway state: the replaceable client slot

use std::sync::Arc;

use jr_client_api::{ClientApiError, ResourceClient};
use jr_rest_client::{ClientConfig, RestClient};
use tokio::sync::RwLock;

use crate::error::{GatewayError, GatewayResult};

/// Builds a client for an API key
pub type ClientFactory =
    Arc<dyn Fn(&str) -> Result<Arc<dyn ResourceClient>, ClientApiError> + Send + Sync>;

/// The currently initialized client, if any.
///
/// Readers clone the inner `Arc` and drop the lock before doing any I/O, so
/// a replacement never waits on in-flight requests and those requests finish
/// with the client they started with.
#[derive(Clone, Default)]
pub struct ClientSlot {
    inner: Arc<RwLock<Option<Arc<dyn ResourceClient>>>>,
}

impl ClientSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current client
    pub async fn install(&self, client: Arc<dyn ResourceClient>) {
        *self.inner.write().await = Some(client);
    }

    pub async fn current(&self) -> Option<Arc<dyn ResourceClient>> {
        self.inner.read().await.clone()
    }

    pub async fn is_initialized(&self) -> bool {
        self.inner.read().await.is_some()
    }
}

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub slot: ClientSlot,
    pub factory: ClientFactory,
    /// Used by `POST /api/init` when the request carries no key
    pub fallback_api_key: Option<String>,
}

impl AppState {
    pub fn new(factory: ClientFactory, fallback_api_key: Option<String>) -> Self {
        Self {
            slot: ClientSlot::new(),
            factory,
            fallback_api_key,
        }
    }

    /// State whose clients talk to the REST service described by `config`
    pub fn from_client_config(config: &ClientConfig) -> Self {
        Self::new(rest_client_factory(config.clone()), config.api_key.clone())
    }

    pub async fn client(&self) -> GatewayResult<Arc<dyn ResourceClient>> {
        self.slot.current().await.ok_or(GatewayError::NotInitialized)
    }

    /// Build a client for `api_key` and make it the current one
    pub async fn initialize(&self, api_key: &str) -> GatewayResult<()> {
        let client = (self.factory)(api_key)?;
        self.slot.install(client).await;
        Ok(())
    }
}

pub fn rest_client_factory(config: ClientConfig) -> ClientFactory {
    Arc::new(move |api_key: &str| -> Result<Arc<dyn ResourceClient>, ClientApiError> {
        let config = config.clone().with_api_key(Some(api_key.to_string()));
        let client = RestClient::from_config(&config)?;
        Ok(Arc::new(client))
    })
}
