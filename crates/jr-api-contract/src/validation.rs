// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Validation helpers for API contract types

use crate::error::ApiContractError;
use crate::types::*;
use validator::Validate;

/// Validate a create session request
pub fn validate_create_session_request(
    request: &CreateSessionRequest,
) -> Result<(), ApiContractError> {
    request.validate()?;
    Ok(())
}

/// Build the resource path for an identifier inside `collection`.
///
/// Accepts both bare identifiers (`123`) and full resource names
/// (`sessions/123`), so ids copied from either the web UI or a previous
/// API response address the same resource.
pub fn resource_path(collection: &str, id: &str) -> Result<String, ApiContractError> {
    let id = id.trim().trim_start_matches('/');
    let prefix = format!("{}/", collection);
    let bare = id.strip_prefix(&prefix).unwrap_or(id).trim_end_matches('/');

    if bare.is_empty()
        || bare == collection
        || bare.split('/').any(|segment| segment.is_empty() || segment == "..")
        || bare.contains(['?', '#'])
    {
        return Err(ApiContractError::InvalidIdentifier(id.to_string()));
    }

    Ok(format!("{}{}", prefix, bare))
}

/// `sessions/{id}`
pub fn session_path(session_id: &str) -> Result<String, ApiContractError> {
    resource_path("sessions", session_id)
}

/// `sources/{id}`; source ids may themselves contain slashes
/// (`github/owner/repo`).
pub fn source_path(source_id: &str) -> Result<String, ApiContractError> {
    resource_path("sources", source_id)
}

/// `sessions/{session}/activities/{activity}`
pub fn activity_path(session_id: &str, activity_id: &str) -> Result<String, ApiContractError> {
    let activities = format!("{}/activities", session_path(session_id)?);
    resource_path(&activities, activity_id)
}
