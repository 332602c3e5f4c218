// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use jr_api_contract::*;
use jr_client_api::{ClientApiError, ClientApiResult, ResourceClient};
use jr_observer::*;
use serde_json::json;
use tokio_util::sync::CancellationToken;

type StatusStep = ClientApiResult<Session>;
type ActivityStep = ClientApiResult<ActivityListResponse>;

/// In-memory client replaying scripted responses. When a script runs dry the
/// last response repeats.
#[derive(Default)]
struct ScriptedClient {
    statuses: Mutex<VecDeque<StatusStep>>,
    activity_pages: Mutex<VecDeque<ActivityStep>>,
    status_calls: Mutex<usize>,
    activity_tokens: Mutex<Vec<Option<String>>>,
}

impl ScriptedClient {
    fn new(statuses: Vec<StatusStep>, activity_pages: Vec<ActivityStep>) -> Arc<Self> {
        Arc::new(Self {
            statuses: Mutex::new(statuses.into()),
            activity_pages: Mutex::new(activity_pages.into()),
            ..Default::default()
        })
    }

    fn status_calls(&self) -> usize {
        *self.status_calls.lock().unwrap()
    }

    fn activity_calls(&self) -> usize {
        self.activity_tokens.lock().unwrap().len()
    }

    fn next<T>(queue: &Mutex<VecDeque<ClientApiResult<T>>>) -> ClientApiResult<T>
    where
        T: Clone,
    {
        let mut queue = queue.lock().unwrap();
        if queue.len() > 1 {
            queue.pop_front().unwrap()
        } else {
            queue.front().cloned().expect("script must not be empty")
        }
    }
}

#[async_trait]
impl ResourceClient for ScriptedClient {
    async fn list_sources(&self, _: &SourceQuery) -> ClientApiResult<SourceListResponse> {
        unimplemented!()
    }
    async fn get_source(&self, _: &str) -> ClientApiResult<Source> {
        unimplemented!()
    }
    async fn create_session(&self, _: &CreateSessionRequest) -> ClientApiResult<Session> {
        unimplemented!()
    }
    async fn list_sessions(&self, _: &SessionQuery) -> ClientApiResult<SessionListResponse> {
        unimplemented!()
    }
    async fn get_session(&self, session_id: &str) -> ClientApiResult<Session> {
        assert_eq!(session_id, "sessions/1");
        *self.status_calls.lock().unwrap() += 1;
        Self::next(&self.statuses)
    }
    async fn delete_session(&self, _: &str) -> ClientApiResult<()> {
        unimplemented!()
    }
    async fn send_message(&self, _: &str, _: &str) -> ClientApiResult<serde_json::Value> {
        unimplemented!()
    }
    async fn approve_plan(&self, _: &str) -> ClientApiResult<serde_json::Value> {
        unimplemented!()
    }
    async fn list_activities(
        &self,
        _: &str,
        query: &ActivityQuery,
    ) -> ClientApiResult<ActivityListResponse> {
        self.activity_tokens.lock().unwrap().push(query.page_token.clone());
        Self::next(&self.activity_pages)
    }
    async fn get_activity(&self, _: &str, _: &str) -> ClientApiResult<Activity> {
        unimplemented!()
    }
}

#[derive(Default)]
struct RecordingSink {
    events: Vec<ObserverEvent>,
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: ObserverEvent) {
        self.events.push(event);
    }
}

impl RecordingSink {
    fn activity_ids(&self) -> Vec<String> {
        self.events
            .iter()
            .filter_map(|event| match event {
                ObserverEvent::Activity(activity) => Some(activity.id.clone()),
                _ => None,
            })
            .collect()
    }
}

fn session(state: State) -> StatusStep {
    Ok(Session {
        name: "sessions/1".into(),
        state,
        url: Some("https://jules.google.com/session/1".into()),
        ..Default::default()
    })
}

fn activity(id: &str, create_time: &str) -> Activity {
    Activity {
        id: id.into(),
        originator: Originator::Agent,
        description: Some(format!("step {}", id)),
        create_time: create_time.into(),
        ..Default::default()
    }
}

fn page(activities: Vec<Activity>) -> ActivityStep {
    Ok(ActivityListResponse {
        activities,
        next_page_token: None,
    })
}

fn observer(client: Arc<ScriptedClient>) -> SessionObserver {
    SessionObserver::new(client, ObserverConfig::default())
}

#[tokio::test(start_paused = true)]
async fn repeated_activities_are_emitted_once() {
    let a1 = activity("a1", "T1");
    let client = ScriptedClient::new(
        vec![session(State::Running), session(State::Running), session(State::Completed)],
        vec![page(vec![a1.clone()]), page(vec![a1.clone()]), page(vec![a1])],
    );
    let mut sink = RecordingSink::default();

    let outcome = observer(client.clone()).observe("sessions/1", &mut sink).await.unwrap();

    assert_eq!(sink.activity_ids(), vec!["a1"]);
    assert_eq!(client.status_calls(), 3);
    assert!(matches!(
        outcome,
        ObservationOutcome::Finished {
            state: State::Completed,
            ..
        }
    ));
}

#[tokio::test(start_paused = true)]
async fn activities_within_a_poll_are_sorted_by_creation_time() {
    let client = ScriptedClient::new(
        vec![session(State::Completed)],
        vec![page(vec![
            activity("c", "2025-01-01T00:00:03Z"),
            activity("no-time", ""),
            activity("a", "2025-01-01T00:00:01Z"),
            activity("b1", "2025-01-01T00:00:02Z"),
            activity("b2", "2025-01-01T00:00:02Z"),
        ])],
    );
    let mut sink = RecordingSink::default();

    observer(client).observe("sessions/1", &mut sink).await.unwrap();

    assert_eq!(sink.activity_ids(), vec!["no-time", "a", "b1", "b2", "c"]);
}

#[tokio::test(start_paused = true)]
async fn late_arriving_earlier_activity_is_emitted_after() {
    let client = ScriptedClient::new(
        vec![session(State::Running), session(State::Completed)],
        vec![
            page(vec![activity("a2", "T2")]),
            page(vec![activity("a1", "T1"), activity("a2", "T2")]),
        ],
    );
    let mut sink = RecordingSink::default();

    observer(client).observe("sessions/1", &mut sink).await.unwrap();

    assert_eq!(sink.activity_ids(), vec!["a2", "a1"]);
}

#[tokio::test(start_paused = true)]
async fn activity_without_id_does_not_hide_the_history() {
    let history: ActivityListResponse = serde_json::from_value(json!({
        "activities": [
            { "id": "a1", "originator": "agent", "description": "Planning", "createTime": "T1" },
            { "originator": "agent", "description": "Untracked step", "createTime": "T2" }
        ]
    }))
    .unwrap();
    let client = ScriptedClient::new(
        vec![session(State::Running), session(State::Running), session(State::Completed)],
        vec![Ok(history)],
    );
    let mut sink = RecordingSink::default();

    observer(client.clone()).observe("sessions/1", &mut sink).await.unwrap();

    let descriptions: Vec<&str> = sink
        .events
        .iter()
        .filter_map(|event| match event {
            ObserverEvent::Activity(activity) => Some(activity.description_or_default()),
            _ => None,
        })
        .collect();
    assert_eq!(descriptions, vec!["Planning", "Untracked step"]);
    assert_eq!(client.activity_calls(), 3);
}

#[tokio::test(start_paused = true)]
async fn budget_exhaustion_times_out_without_further_calls() {
    let client = ScriptedClient::new(vec![session(State::Running)], vec![page(vec![])]);
    let config = ObserverConfig {
        budget: Duration::from_secs(5),
        ..Default::default()
    };
    let mut sink = RecordingSink::default();

    let outcome = SessionObserver::new(client.clone(), config)
        .observe("sessions/1", &mut sink)
        .await
        .unwrap();

    // Polls at t=0, 2 and 4; at t=6 the budget is exceeded before any call.
    assert_eq!(client.status_calls(), 3);
    assert_eq!(client.activity_calls(), 3);
    match outcome {
        ObservationOutcome::TimedOut { elapsed } => {
            assert!(elapsed > Duration::from_secs(5) && elapsed < Duration::from_secs(7));
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert_eq!(
        sink.events.last(),
        Some(&ObserverEvent::TimedOut {
            budget: Duration::from_secs(5)
        })
    );
}

#[tokio::test(start_paused = true)]
async fn status_failure_aborts_before_activity_poll() {
    let client = ScriptedClient::new(
        vec![
            session(State::Running),
            Err(ClientApiError::Transport("connection reset".into())),
        ],
        vec![page(vec![activity("a1", "T1")])],
    );
    let mut sink = RecordingSink::default();

    let err = observer(client.clone()).observe("sessions/1", &mut sink).await.unwrap_err();

    assert!(matches!(err, ObserveError::StatusPoll(ClientApiError::Transport(_))));
    assert_eq!(client.status_calls(), 2);
    assert_eq!(client.activity_calls(), 1);
    assert!(matches!(
        sink.events.last(),
        Some(ObserverEvent::StatusFailed { message }) if message.contains("connection reset")
    ));
}

#[tokio::test(start_paused = true)]
async fn activity_failure_does_not_abort() {
    let client = ScriptedClient::new(
        vec![session(State::Running), session(State::Running), session(State::Completed)],
        vec![
            Err(ClientApiError::Server {
                status: 503,
                message: "unavailable".into(),
            }),
            page(vec![activity("a1", "T1")]),
        ],
    );
    let mut sink = RecordingSink::default();

    let outcome = observer(client.clone()).observe("sessions/1", &mut sink).await.unwrap();

    assert_eq!(client.status_calls(), 3);
    assert_eq!(sink.activity_ids(), vec!["a1"]);
    assert!(matches!(outcome, ObservationOutcome::Finished { .. }));
}

#[tokio::test(start_paused = true)]
async fn completed_session_renders_pull_request_output() {
    let outputs = vec![Output::from_value(json!({"pullRequest": {"url": "https://x/pr/1"}})).unwrap()];
    let client = ScriptedClient::new(
        vec![Ok(Session {
            name: "sessions/1".into(),
            state: State::Completed,
            outputs: Some(outputs.clone()),
            ..Default::default()
        })],
        vec![page(vec![])],
    );
    let mut sink = RecordingSink::default();

    let outcome = observer(client).observe("sessions/1", &mut sink).await.unwrap();

    assert_eq!(
        outcome,
        ObservationOutcome::Finished {
            state: State::Completed,
            outputs
        }
    );
    assert_eq!(
        sink.events,
        vec![
            ObserverEvent::StateChanged {
                state: State::Completed
            },
            ObserverEvent::Finished {
                state: State::Completed
            },
            ObserverEvent::Output(OutputRow {
                kind: OutputKind::PullRequest,
                details: "https://x/pr/1".into(),
            }),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn failed_session_reports_no_outputs() {
    let client = ScriptedClient::new(
        vec![Ok(Session {
            name: "sessions/1".into(),
            state: State::Failed,
            outputs: Some(vec![Output::FileChange(json!({}))]),
            ..Default::default()
        })],
        vec![page(vec![])],
    );
    let mut sink = RecordingSink::default();

    let outcome = observer(client).observe("sessions/1", &mut sink).await.unwrap();

    assert_eq!(
        outcome,
        ObservationOutcome::Finished {
            state: State::Failed,
            outputs: vec![]
        }
    );
    assert!(!sink.events.iter().any(|e| matches!(e, ObserverEvent::Output(_))));
}

#[tokio::test(start_paused = true)]
async fn awaiting_feedback_on_third_iteration_stops_with_url() {
    let client = ScriptedClient::new(
        vec![
            session(State::Planning),
            session(State::Running),
            session(State::AwaitingUserFeedback),
            session(State::Completed),
        ],
        vec![
            page(vec![activity("a1", "T1")]),
            page(vec![activity("a1", "T1"), activity("a2", "T2")]),
            page(vec![activity("a1", "T1"), activity("a2", "T2"), activity("a3", "T3")]),
        ],
    );
    let mut sink = RecordingSink::default();

    let outcome = observer(client.clone()).observe("sessions/1", &mut sink).await.unwrap();

    assert_eq!(client.status_calls(), 3);
    assert_eq!(client.activity_calls(), 3);
    assert_eq!(sink.activity_ids(), vec!["a1", "a2", "a3"]);

    let url = Some("https://jules.google.com/session/1".to_string());
    assert_eq!(
        outcome,
        ObservationOutcome::AwaitingUser {
            state: State::AwaitingUserFeedback,
            url: url.clone()
        }
    );
    // The paused notice follows the iteration's activity emission
    let n = sink.events.len();
    assert!(matches!(&sink.events[n - 3], ObserverEvent::Activity(a) if a.id == "a3"));
    assert_eq!(
        sink.events[n - 1],
        ObserverEvent::AwaitingFeedback {
            state: State::AwaitingUserFeedback,
            url
        }
    );
}

#[tokio::test(start_paused = true)]
async fn plan_approval_is_a_paused_state() {
    let client = ScriptedClient::new(vec![session(State::AwaitingPlanApproval)], vec![page(vec![])]);
    let mut sink = RecordingSink::default();

    let outcome = observer(client).observe("sessions/1", &mut sink).await.unwrap();

    assert!(matches!(
        outcome,
        ObservationOutcome::AwaitingUser {
            state: State::AwaitingPlanApproval,
            ..
        }
    ));
}

#[tokio::test(start_paused = true)]
async fn state_changes_are_reported_once() {
    let client = ScriptedClient::new(
        vec![
            session(State::Queued),
            session(State::Queued),
            session(State::Running),
            session(State::Completed),
        ],
        vec![page(vec![])],
    );
    let mut sink = RecordingSink::default();

    observer(client).observe("sessions/1", &mut sink).await.unwrap();

    let states: Vec<State> = sink
        .events
        .iter()
        .filter_map(|event| match event {
            ObserverEvent::StateChanged { state } => Some(*state),
            _ => None,
        })
        .collect();
    assert_eq!(states, vec![State::Queued, State::Running, State::Completed]);
}

#[tokio::test(start_paused = true)]
async fn activity_pages_are_followed() {
    let client = ScriptedClient::new(
        vec![session(State::Completed)],
        vec![
            Ok(ActivityListResponse {
                activities: vec![activity("a1", "T1")],
                next_page_token: Some("p2".into()),
            }),
            Ok(ActivityListResponse {
                activities: vec![activity("a2", "T2")],
                next_page_token: Some(String::new()),
            }),
        ],
    );
    let mut sink = RecordingSink::default();

    observer(client.clone()).observe("sessions/1", &mut sink).await.unwrap();

    assert_eq!(sink.activity_ids(), vec!["a1", "a2"]);
    assert_eq!(
        *client.activity_tokens.lock().unwrap(),
        vec![None, Some("p2".to_string())]
    );
}

#[tokio::test(start_paused = true)]
async fn cancelled_before_start_makes_no_calls() {
    let client = ScriptedClient::new(vec![session(State::Running)], vec![page(vec![])]);
    let cancel = CancellationToken::new();
    cancel.cancel();
    let mut sink = RecordingSink::default();

    let err = observer(client.clone())
        .with_cancellation(cancel)
        .observe("sessions/1", &mut sink)
        .await
        .unwrap_err();

    assert!(err.is_cancelled());
    assert_eq!(err.to_string(), "Operation cancelled by user.");
    assert_eq!(client.status_calls(), 0);
    assert_eq!(sink.events, vec![ObserverEvent::Cancelled]);
}

#[tokio::test(start_paused = true)]
async fn cancellation_interrupts_the_poll_sleep() {
    let client = ScriptedClient::new(vec![session(State::Running)], vec![page(vec![])]);
    let cancel = CancellationToken::new();
    let observer = observer(client.clone()).with_cancellation(cancel.clone());
    let mut sink = RecordingSink::default();

    let canceller = async {
        tokio::time::sleep(Duration::from_secs(3)).await;
        cancel.cancel();
    };
    let (result, ()) = tokio::join!(observer.observe("sessions/1", &mut sink), canceller);

    assert!(matches!(result, Err(ObserveError::Cancelled)));
    // Polls at t=0 and t=2; the sleep towards t=4 is interrupted at t=3.
    assert_eq!(client.status_calls(), 2);
    assert_eq!(sink.events.last(), Some(&ObserverEvent::Cancelled));
}

#[tokio::test(start_paused = true)]
async fn closure_sinks_are_accepted() {
    let client = ScriptedClient::new(
        vec![session(State::Completed)],
        vec![page(vec![activity("a1", "T1")])],
    );
    let mut count = 0;
    let mut sink = |event: ObserverEvent| {
        if matches!(event, ObserverEvent::Activity(_)) {
            count += 1;
        }
    };

    observer(client).observe("sessions/1", &mut sink).await.unwrap();

    assert_eq!(count, 1);
}
