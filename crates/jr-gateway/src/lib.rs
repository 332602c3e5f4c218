// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! HTTP gateway for the Jules resource API
//!
//! Exposes the [`jr_client_api::ResourceClient`] operations under `/api/*`
//! for a browser frontend. The only state the gateway owns is the
//! [`ClientSlot`]: the currently initialized client, replaced wholesale by
//! `POST /api/init`.

pub mod config;
pub mod error;
pub mod handlers;
pub mod server;
pub mod state;

pub use config::GatewayConfig;
pub use error::{GatewayError, GatewayResult};
pub use server::{router, Server};
pub use state::{AppState, ClientFactory, ClientSlot};
