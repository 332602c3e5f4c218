// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

use jr_client_api::ClientApiError;
use thiserror::Error;

/// Ways an observation run can end without an [`crate::ObservationOutcome`]
#[derive(Debug, Error)]
pub enum ObserveError {
    /// The session status could not be fetched; the loop cannot decide
    /// whether to continue.
    #[error("Error checking status: {0}")]
    StatusPoll(#[source] ClientApiError),

    #[error("Operation cancelled by user.")]
    Cancelled,
}

impl ObserveError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ObserveError::Cancelled)
    }
}
