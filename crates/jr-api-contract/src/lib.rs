// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Jules REST API contract types and validation
//!
//! This crate defines the wire types exchanged with the Jules `v1alpha` API.
//! Payloads are decoded once, at the client boundary, into closed Rust types
//! so that consumers (the session observer, the CLI, the gateway) never have
//! to probe loosely-shaped JSON.

pub mod error;
pub mod types;
pub mod validation;

pub use error::*;
pub use types::*;
pub use validation::*;

/// Base URL of the public Jules API.
pub const DEFAULT_BASE_URL: &str = "https://jules.googleapis.com/v1alpha";

/// Header carrying the API key on every request.
pub const API_KEY_HEADER: &str = "x-goog-api-key";
