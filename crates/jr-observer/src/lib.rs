// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Session observation for Jules sessions
//!
//! A [`SessionObserver`] polls a session's status and its activity log,
//! emits every activity exactly once in creation-time order, and stops when
//! the session finishes, needs a human, runs out of time budget, or is
//! cancelled. Rendering is delegated to an [`EventSink`].

pub mod dedup;
pub mod error;
pub mod events;
pub mod observer;
pub mod output;

pub use dedup::ActivityDeduplicator;
pub use error::ObserveError;
pub use events::{EventSink, ObserverEvent};
pub use observer::{ObservationOutcome, ObserverConfig, SessionObserver};
pub use output::{render_outputs, OutputKind, OutputRow};
