// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Events handed from the observer to its display surface

use std::time::Duration;

use jr_api_contract::{Activity, State};

use crate::output::OutputRow;

/// Something the operator should see, in emission order.
#[derive(Debug, Clone, PartialEq)]
pub enum ObserverEvent {
    /// First poll, or the remote state differs from the previous poll
    StateChanged { state: State },
    /// An activity not emitted before in this run
    Activity(Activity),
    /// The session reached a terminal state
    Finished { state: State },
    /// One output of a completed session, following `Finished`
    Output(OutputRow),
    /// The session is waiting for plan approval or user feedback
    AwaitingFeedback { state: State, url: Option<String> },
    TimedOut { budget: Duration },
    StatusFailed { message: String },
    Cancelled,
}

/// Display callback for observer events.
///
/// Emission is synchronous; a sink must not block on I/O for long since the
/// poll loop waits for it.
pub trait EventSink {
    fn emit(&mut self, event: ObserverEvent);
}

impl<F> EventSink for F
where
    F: FnMut(ObserverEvent),
{
    fn emit(&mut self, event: ObserverEvent) {
        self(event)
    }
}
