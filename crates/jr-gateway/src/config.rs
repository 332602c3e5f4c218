// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Gateway configuration

use std::net::{Ipv4Addr, SocketAddr};

use jr_rest_client::ClientConfig;

pub const DEFAULT_PORT: u16 = 5055;

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub bind_addr: SocketAddr,

    /// Answer CORS preflights for any origin
    pub enable_cors: bool,

    /// Settings for clients created by the gateway. `client.api_key` is the
    /// fallback for `POST /api/init` requests without a key.
    pub client: ClientConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from((Ipv4Addr::LOCALHOST, DEFAULT_PORT)),
            enable_cors: true,
            client: ClientConfig::default(),
        }
    }
}
