// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

use std::collections::HashSet;

/// Activity ids already emitted during one observation run.
///
/// Membership only grows; there is no eviction. Ids are unique per session,
/// so a deduplicator must never be shared between sessions.
#[derive(Debug, Default, Clone)]
pub struct ActivityDeduplicator {
    ids: HashSet<String>,
}

impl ActivityDeduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seen(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Returns `true` if the id was not recorded before.
    pub fn record(&mut self, id: impl Into<String>) -> bool {
        self.ids.insert(id.into())
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
