// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use jr_api_contract::*;
use jr_client_api::{ClientApiError, ClientApiResult, ResourceClient};
use jr_gateway::{router, AppState, ClientFactory};
use serde_json::{json, Value};
use tower::ServiceExt;

/// Records every call and answers with canned data
#[derive(Default)]
struct FakeClient {
    api_key: String,
    calls: Mutex<Vec<String>>,
    fail_with: Option<ClientApiError>,
}

impl FakeClient {
    fn record(&self, call: String) -> ClientApiResult<()> {
        self.calls.lock().unwrap().push(call);
        match &self.fail_with {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ResourceClient for FakeClient {
    async fn list_sources(&self, query: &SourceQuery) -> ClientApiResult<SourceListResponse> {
        self.record(format!(
            "list_sources {} {:?}",
            query.page_size,
            query.filter.as_deref()
        ))?;
        Ok(SourceListResponse {
            sources: vec![Source {
                name: "sources/github/acme/widgets".into(),
                ..Default::default()
            }],
            next_page_token: None,
        })
    }
    async fn get_source(&self, source_id: &str) -> ClientApiResult<Source> {
        self.record(format!("get_source {}", source_id))?;
        Ok(Source {
            name: format!("sources/{}", source_id),
            ..Default::default()
        })
    }
    async fn create_session(&self, request: &CreateSessionRequest) -> ClientApiResult<Session> {
        self.record(format!("create_session {}", serde_json::to_string(request).unwrap()))?;
        Ok(Session {
            name: "sessions/1".into(),
            title: request.title.clone().unwrap_or_default(),
            prompt: request.prompt.clone(),
            state: State::Queued,
            ..Default::default()
        })
    }
    async fn list_sessions(&self, query: &SessionQuery) -> ClientApiResult<SessionListResponse> {
        self.record(format!(
            "list_sessions {} {:?} {}",
            query.page_size,
            query.page_token.as_deref(),
            self.api_key
        ))?;
        Ok(SessionListResponse::default())
    }
    async fn get_session(&self, session_id: &str) -> ClientApiResult<Session> {
        self.record(format!("get_session {}", session_id))?;
        Ok(Session {
            name: format!("sessions/{}", session_id),
            state: State::Running,
            ..Default::default()
        })
    }
    async fn delete_session(&self, session_id: &str) -> ClientApiResult<()> {
        self.record(format!("delete_session {}", session_id))
    }
    async fn send_message(&self, session_id: &str, message: &str) -> ClientApiResult<Value> {
        self.record(format!("send_message {} {}", session_id, message))?;
        Ok(json!({}))
    }
    async fn approve_plan(&self, session_id: &str) -> ClientApiResult<Value> {
        self.record(format!("approve_plan {}", session_id))?;
        Ok(json!({"name": format!("sessions/{}", session_id)}))
    }
    async fn list_activities(
        &self,
        session_id: &str,
        query: &ActivityQuery,
    ) -> ClientApiResult<ActivityListResponse> {
        self.record(format!(
            "list_activities {} {} {:?}",
            session_id,
            query.page_size,
            query.create_time.as_deref()
        ))?;
        Ok(ActivityListResponse::default())
    }
    async fn get_activity(&self, _: &str, _: &str) -> ClientApiResult<Activity> {
        unimplemented!()
    }
}

struct Harness {
    app: Router,
    state: AppState,
    created: Arc<Mutex<Vec<Arc<FakeClient>>>>,
}

impl Harness {
    fn new(fallback_api_key: Option<&str>) -> Self {
        Self::with_failure(fallback_api_key, None)
    }

    fn with_failure(fallback_api_key: Option<&str>, fail_with: Option<ClientApiError>) -> Self {
        let created: Arc<Mutex<Vec<Arc<FakeClient>>>> = Arc::default();
        let factory: ClientFactory = {
            let created = created.clone();
            Arc::new(move |api_key: &str| -> ClientApiResult<Arc<dyn ResourceClient>> {
                let client = Arc::new(FakeClient {
                    api_key: api_key.to_string(),
                    fail_with: fail_with.clone(),
                    ..Default::default()
                });
                created.lock().unwrap().push(client.clone());
                Ok(client)
            })
        };
        let state = AppState::new(factory, fallback_api_key.map(str::to_string));
        Self {
            app: router(state.clone(), true),
            state,
            created,
        }
    }

    async fn initialized(fallback_api_key: &str) -> Self {
        let harness = Self::new(Some(fallback_api_key));
        harness.state.initialize(fallback_api_key).await.unwrap();
        harness
    }

    fn calls(&self) -> Vec<String> {
        let created = self.created.lock().unwrap();
        let client = created.last().expect("a client was created");
        let calls = client.calls.lock().unwrap().clone();
        calls
    }

    async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(value) => {
                request = request.header(header::CONTENT_TYPE, "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };
        let response = self
            .app
            .clone()
            .oneshot(request.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }
}

#[tokio::test]
async fn health_and_config() {
    let harness = Harness::new(None);

    let (status, body) = harness.send(Method::GET, "/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));

    let (_, body) = harness.send(Method::GET, "/api/config", None).await;
    assert_eq!(body, json!({"hasApiKey": false}));
}

#[tokio::test]
async fn resource_routes_require_initialization() {
    let harness = Harness::new(None);

    for uri in ["/api/sessions", "/api/sources", "/api/sessions/1"] {
        let (status, body) = harness.send(Method::GET, uri, None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{uri}");
        assert_eq!(body, json!({"error": "Jules client not initialized"}));
    }

    // Request bodies that would be rejected still report the missing client
    let posts = [
        ("/api/sessions", json!({"prompt": ""})),
        ("/api/sources", json!({"pageSize": "many"})),
        ("/api/sessions/1/message", json!({"message": ""})),
        ("/api/sessions/1/approve", json!({})),
        ("/api/sessions/1/delete", json!({})),
    ];
    for (uri, payload) in posts {
        let (status, body) = harness.send(Method::POST, uri, Some(payload)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{uri}");
        assert_eq!(body, json!({"error": "Jules client not initialized"}));
    }

    let (status, _) = harness
        .send(Method::GET, "/api/sessions?pageSize=many", None)
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn init_requires_a_key() {
    let harness = Harness::new(None);

    let (status, body) = harness.send(Method::POST, "/api/init", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "API key required"}));
    assert!(!harness.state.slot.is_initialized().await);
}

#[tokio::test]
async fn init_with_key_then_fallback_replaces_client() {
    let harness = Harness::new(Some("from-env"));

    let (status, body) = harness
        .send(Method::POST, "/api/init", Some(json!({"apiKey": "from-request"})))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "initialized"}));

    harness.send(Method::GET, "/api/sessions", None).await;
    assert_eq!(harness.calls(), vec!["list_sessions 30 None from-request"]);

    // No key in the body: the configured key is used and the client replaced
    let (status, _) = harness.send(Method::POST, "/api/init", None).await;
    assert_eq!(status, StatusCode::OK);
    harness.send(Method::GET, "/api/sessions?pageSize=5&pageToken=t", None).await;
    assert_eq!(harness.calls(), vec!["list_sessions 5 Some(\"t\") from-env"]);

    let (_, body) = harness.send(Method::GET, "/api/config", None).await;
    assert_eq!(body, json!({"hasApiKey": true}));
}

#[tokio::test]
async fn sources_by_query_body_and_nested_id() {
    let harness = Harness::initialized("k").await;

    let (status, body) = harness
        .send(Method::GET, "/api/sources?pageSize=10&filter=acme", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sources"][0]["name"], "sources/github/acme/widgets");

    let (status, _) = harness
        .send(Method::POST, "/api/sources", Some(json!({"filter": "widgets"})))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = harness
        .send(Method::GET, "/api/sources/github/acme/widgets", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "sources/github/acme/widgets");

    assert_eq!(
        harness.calls(),
        vec![
            "list_sources 10 Some(\"acme\")",
            "list_sources 30 Some(\"widgets\")",
            "get_source github/acme/widgets",
        ]
    );
}

#[tokio::test]
async fn create_session_applies_defaults() {
    let harness = Harness::initialized("k").await;

    let (status, body) = harness
        .send(
            Method::POST,
            "/api/sessions",
            Some(json!({
                "prompt": "Fix the flaky login test",
                "sourceId": "sources/github/acme/widgets",
                "automationMode": "AUTO_CREATE_PR"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Task: Fix the flaky login test...");
    assert_eq!(body["state"], "QUEUED");

    let calls = harness.calls();
    let sent: Value = serde_json::from_str(calls[0].strip_prefix("create_session ").unwrap()).unwrap();
    assert_eq!(
        sent["sourceContext"],
        json!({"source": "sources/github/acme/widgets", "githubRepoContext": {"startingBranch": "main"}})
    );
    assert_eq!(sent["automationMode"], "AUTO_CREATE_PR");
    assert!(sent.get("requirePlanApproval").is_none());
}

#[tokio::test]
async fn create_session_rejects_empty_prompt() {
    let harness = Harness::initialized("k").await;

    let (status, body) = harness
        .send(Method::POST, "/api/sessions", Some(json!({"title": "nothing"})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
    assert!(harness.calls().is_empty());
}

#[tokio::test]
async fn session_actions() {
    let harness = Harness::initialized("k").await;

    let (_, body) = harness.send(Method::GET, "/api/sessions/42", None).await;
    assert_eq!(body["state"], "IN_PROGRESS");

    let (_, body) = harness
        .send(Method::GET, "/api/sessions/42/activities?createTime=2025-01-01T00:00:00Z", None)
        .await;
    assert_eq!(body, json!({"activities": []}));

    let (_, body) = harness.send(Method::POST, "/api/sessions/42/delete", None).await;
    assert_eq!(body, json!({"status": "deleted"}));

    let (_, body) = harness
        .send(Method::POST, "/api/sessions/42/message", Some(json!({"message": "hi"})))
        .await;
    assert_eq!(body, json!({"status": "sent"}));

    let (_, body) = harness.send(Method::POST, "/api/sessions/42/approve", None).await;
    assert_eq!(body, json!({"name": "sessions/42"}));

    assert_eq!(
        harness.calls(),
        vec![
            "get_session 42",
            "list_activities 42 50 Some(\"2025-01-01T00:00:00Z\")",
            "delete_session 42",
            "send_message 42 hi",
            "approve_plan 42",
        ]
    );
}

#[tokio::test]
async fn upstream_failures_are_reported_as_json() {
    let harness = Harness::with_failure(
        Some("k"),
        Some(ClientApiError::Server {
            status: 404,
            message: "Session not found".into(),
        }),
    );
    harness.state.initialize("k").await.unwrap();

    let (status, body) = harness.send(Method::GET, "/api/sessions/9", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("Session not found"));
}

#[tokio::test]
async fn unknown_routes_are_json_404() {
    let harness = Harness::new(None);

    for uri in ["/", "/gui.html", "/api/unknown"] {
        let (status, body) = harness.send(Method::GET, uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
        assert_eq!(body, json!({"error": "Not found"}));
    }
}

#[tokio::test]
async fn bad_query_parameters_are_rejected() {
    let harness = Harness::initialized("k").await;

    let (status, body) = harness.send(Method::GET, "/api/sessions?pageSize=many", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn cors_preflight_is_answered() {
    let harness = Harness::new(None);

    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/sessions")
        .header(header::ORIGIN, "http://localhost:3000")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();
    let response = harness.app.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "*"
    );
}
