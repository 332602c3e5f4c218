// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! The session observation loop

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use jr_api_contract::{Activity, ActivityQuery, Output, Session, State};
use jr_client_api::{ClientApiResult, ResourceClient};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::dedup::ActivityDeduplicator;
use crate::error::ObserveError;
use crate::events::{EventSink, ObserverEvent};
use crate::output::OutputRow;

/// Upper bound on activity pages fetched per poll
const MAX_ACTIVITY_PAGES: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObserverConfig {
    /// Wall-clock budget measured from loop entry
    pub budget: Duration,
    pub poll_interval: Duration,
    pub activity_page_size: u32,
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self {
            budget: Duration::from_secs(300),
            poll_interval: Duration::from_secs(2),
            activity_page_size: 100,
        }
    }
}

/// How an observation run ended
#[derive(Debug, Clone, PartialEq)]
pub enum ObservationOutcome {
    /// Terminal state. `outputs` is only populated for completed sessions.
    Finished { state: State, outputs: Vec<Output> },
    AwaitingUser { state: State, url: Option<String> },
    TimedOut { elapsed: Duration },
}

/// Process-local state of one call to [`SessionObserver::observe`]
struct ObservationRun {
    seen: ActivityDeduplicator,
    started: Instant,
    last_state: Option<State>,
    iterations: u64,
}

impl ObservationRun {
    fn new() -> Self {
        Self {
            seen: ActivityDeduplicator::new(),
            started: Instant::now(),
            last_state: None,
            iterations: 0,
        }
    }

    /// Emit the activities of one poll that were not emitted before, oldest
    /// first. Ties keep response order.
    fn emit_new<S: EventSink + ?Sized>(&mut self, mut activities: Vec<Activity>, sink: &mut S) {
        activities.sort_by(|a, b| a.create_time.cmp(&b.create_time));

        for activity in activities {
            let key = activity.dedup_key().to_string();
            if self.seen.seen(&key) {
                continue;
            }
            if activity.id.is_empty() {
                tracing::debug!(key = %key, "activity without id");
            }
            sink.emit(ObserverEvent::Activity(activity));
            self.seen.record(key);
        }
    }

    fn note_state<S: EventSink + ?Sized>(&mut self, state: State, sink: &mut S) {
        if self.last_state != Some(state) {
            tracing::debug!(from = ?self.last_state, to = %state, "session state changed");
            sink.emit(ObserverEvent::StateChanged { state });
            self.last_state = Some(state);
        }
    }
}

/// Polls a session until it reaches a stable outcome.
///
/// One observer can run any number of sessions one after another; every call
/// to [`observe`](Self::observe) starts a fresh run, so a restarted
/// observation re-emits the whole activity history.
#[derive(Clone)]
pub struct SessionObserver {
    client: Arc<dyn ResourceClient>,
    config: ObserverConfig,
    cancel: CancellationToken,
}

impl SessionObserver {
    pub fn new(client: Arc<dyn ResourceClient>, config: ObserverConfig) -> Self {
        Self {
            client,
            config,
            cancel: CancellationToken::new(),
        }
    }

    /// Abort the loop when `cancel` fires, at the next await point.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub async fn observe<S: EventSink + ?Sized>(
        &self,
        session_id: &str,
        sink: &mut S,
    ) -> Result<ObservationOutcome, ObserveError> {
        tracing::info!(
            session = session_id,
            budget_secs = self.config.budget.as_secs(),
            "observing session"
        );

        let result = self.run(session_id, sink).await;
        if let Err(ObserveError::Cancelled) = &result {
            tracing::info!(session = session_id, "observation cancelled");
            sink.emit(ObserverEvent::Cancelled);
        }
        result
    }

    async fn run<S: EventSink + ?Sized>(
        &self,
        session_id: &str,
        sink: &mut S,
    ) -> Result<ObservationOutcome, ObserveError> {
        let mut run = ObservationRun::new();

        loop {
            if self.cancel.is_cancelled() {
                return Err(ObserveError::Cancelled);
            }
            let elapsed = run.started.elapsed();
            if elapsed > self.config.budget {
                tracing::warn!(
                    session = session_id,
                    iterations = run.iterations,
                    "observation budget exhausted"
                );
                sink.emit(ObserverEvent::TimedOut {
                    budget: self.config.budget,
                });
                return Ok(ObservationOutcome::TimedOut { elapsed });
            }
            run.iterations += 1;

            let session = match self.until_cancelled(self.client.get_session(session_id)).await? {
                Ok(session) => session,
                Err(err) => {
                    tracing::error!(session = session_id, error = %err, "status poll failed");
                    sink.emit(ObserverEvent::StatusFailed {
                        message: err.to_string(),
                    });
                    return Err(ObserveError::StatusPoll(err));
                }
            };

            match self.until_cancelled(self.fetch_activities(session_id)).await? {
                Ok(activities) => run.emit_new(activities, sink),
                Err(err) => {
                    tracing::warn!(session = session_id, error = %err, "activity poll failed");
                }
            }

            run.note_state(session.state, sink);
            if let Some(outcome) = conclude(session, sink) {
                tracing::info!(
                    session = session_id,
                    iterations = run.iterations,
                    activities = run.seen.len(),
                    "observation finished"
                );
                return Ok(outcome);
            }

            self.until_cancelled(tokio::time::sleep(self.config.poll_interval))
                .await?;
        }
    }

    /// Fetch the complete activity list, following page tokens.
    async fn fetch_activities(&self, session_id: &str) -> ClientApiResult<Vec<Activity>> {
        let mut query = ActivityQuery {
            page_size: self.config.activity_page_size,
            ..Default::default()
        };
        let mut activities = Vec::new();

        for _ in 0..MAX_ACTIVITY_PAGES {
            let page = self.client.list_activities(session_id, &query).await?;
            activities.extend(page.activities);

            match page.next_page_token.filter(|token| !token.is_empty()) {
                Some(token) if query.page_token.as_deref() != Some(token.as_str()) => {
                    query.page_token = Some(token);
                }
                _ => return Ok(activities),
            }
        }

        tracing::warn!(
            session = session_id,
            pages = MAX_ACTIVITY_PAGES,
            "activity pagination did not end; using pages fetched so far"
        );
        Ok(activities)
    }

    async fn until_cancelled<F: Future>(&self, fut: F) -> Result<F::Output, ObserveError> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(ObserveError::Cancelled),
            output = fut => Ok(output),
        }
    }
}

/// Decide whether `session` ends the run, emitting the closing notices.
fn conclude<S: EventSink + ?Sized>(session: Session, sink: &mut S) -> Option<ObservationOutcome> {
    let state = session.state;

    if state.is_terminal() {
        sink.emit(ObserverEvent::Finished { state });
        let outputs = if state == State::Completed {
            session.outputs.unwrap_or_default()
        } else {
            Vec::new()
        };
        for output in &outputs {
            sink.emit(ObserverEvent::Output(OutputRow::from(output)));
        }
        return Some(ObservationOutcome::Finished { state, outputs });
    }

    if state.awaits_user() {
        sink.emit(ObserverEvent::AwaitingFeedback {
            state,
            url: session.url.clone(),
        });
        return Some(ObservationOutcome::AwaitingUser {
            state,
            url: session.url,
        });
    }

    None
}
