// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! HTTP request handlers

pub mod health;
pub mod sessions;
pub mod sources;

use axum::body::Bytes;
use axum::extract::{rejection::QueryRejection, Query};
use serde::de::DeserializeOwned;

use crate::error::{GatewayError, GatewayResult};

/// Decode an optional JSON body; an empty body yields `T::default()`.
pub(crate) fn json_body<T: DeserializeOwned + Default>(body: &Bytes) -> GatewayResult<T> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| GatewayError::BadRequest(format!("Invalid JSON body: {}", e)))
}

pub(crate) fn query<T>(query: Result<Query<T>, QueryRejection>) -> GatewayResult<T> {
    query
        .map(|Query(value)| value)
        .map_err(|rejection| GatewayError::BadRequest(rejection.body_text()))
}

/// Upstream action responses are often empty; substitute a status object.
pub(crate) fn body_or_status(value: serde_json::Value, status: &str) -> serde_json::Value {
    let empty = match &value {
        serde_json::Value::Null => true,
        serde_json::Value::Object(map) => map.is_empty(),
        _ => false,
    };
    if empty {
        serde_json::json!({ "status": status })
    } else {
        value
    }
}
