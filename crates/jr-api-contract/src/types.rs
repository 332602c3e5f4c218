// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! API contract types for the Jules REST service

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use validator::Validate;

/// Session lifecycle states as reported by the service.
///
/// Decoding never fails: unrecognised values map to [`State::Unspecified`],
/// which the observer treats as an active state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum State {
    #[default]
    Unspecified,
    Queued,
    Planning,
    Running,
    Paused,
    AwaitingPlanApproval,
    AwaitingUserFeedback,
    Completed,
    Failed,
    Cancelled,
}

impl State {
    /// Wire representation of the state
    pub fn as_wire(&self) -> &'static str {
        match self {
            State::Unspecified => "STATE_UNSPECIFIED",
            State::Queued => "QUEUED",
            State::Planning => "PLANNING",
            State::Running => "IN_PROGRESS",
            State::Paused => "PAUSED",
            State::AwaitingPlanApproval => "AWAITING_PLAN_APPROVAL",
            State::AwaitingUserFeedback => "AWAITING_USER_FEEDBACK",
            State::Completed => "COMPLETED",
            State::Failed => "FAILED",
            State::Cancelled => "CANCELLED",
        }
    }

    /// Parse a wire value, falling back to `Unspecified`
    pub fn from_wire(value: &str) -> Self {
        match value.trim().to_ascii_uppercase().as_str() {
            "QUEUED" => State::Queued,
            "PLANNING" => State::Planning,
            "IN_PROGRESS" | "RUNNING" => State::Running,
            "PAUSED" => State::Paused,
            "AWAITING_PLAN_APPROVAL" => State::AwaitingPlanApproval,
            "AWAITING_USER_FEEDBACK" => State::AwaitingUserFeedback,
            "COMPLETED" => State::Completed,
            "FAILED" => State::Failed,
            "CANCELLED" => State::Cancelled,
            _ => State::Unspecified,
        }
    }

    /// No further polling happens once a session reaches one of these.
    pub fn is_terminal(&self) -> bool {
        matches!(self, State::Completed | State::Failed | State::Cancelled)
    }

    /// The session is blocked on a human (plan approval or questions).
    pub fn awaits_user(&self) -> bool {
        matches!(
            self,
            State::AwaitingUserFeedback | State::AwaitingPlanApproval
        )
    }

    pub fn is_active(&self) -> bool {
        !self.is_terminal() && !self.awaits_user()
    }
}

impl std::fmt::Display for State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_wire())
    }
}

impl std::str::FromStr for State {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(State::from_wire(s))
    }
}

impl Serialize for State {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_wire())
    }
}

impl<'de> Deserialize<'de> for State {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().map(State::from_wire).unwrap_or_default())
    }
}

/// Who produced an activity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Originator {
    Agent,
    User,
    #[default]
    System,
}

impl Originator {
    pub fn as_wire(&self) -> &'static str {
        match self {
            Originator::Agent => "AGENT",
            Originator::User => "USER",
            Originator::System => "SYSTEM",
        }
    }

    /// Case-insensitive parse; anything unknown is attributed to the system.
    pub fn from_wire(value: &str) -> Self {
        if value.eq_ignore_ascii_case("agent") {
            Originator::Agent
        } else if value.eq_ignore_ascii_case("user") {
            Originator::User
        } else {
            Originator::System
        }
    }
}

impl std::fmt::Display for Originator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_wire())
    }
}

impl Serialize for Originator {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_wire())
    }
}

impl<'de> Deserialize<'de> for Originator {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().map(Originator::from_wire).unwrap_or_default())
    }
}

/// Pull request produced by a completed session
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PullRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Artifact attached to a terminal session.
///
/// The wire format is an object with exactly one discriminating key
/// (`pullRequest` or `fileChange`); any other shape is kept verbatim as
/// [`Output::Unknown`].
#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    PullRequest(PullRequest),
    /// The API does not expose diff content at this layer; the payload is opaque.
    FileChange(Value),
    Unknown(Value),
}

impl Output {
    /// Classify a raw output payload.
    pub fn from_value(raw: Value) -> Result<Self, serde_json::Error> {
        if let Some(pr) = raw.get("pullRequest") {
            let pr = if pr.is_null() {
                PullRequest::default()
            } else {
                serde_json::from_value(pr.clone())?
            };
            return Ok(Output::PullRequest(pr));
        }
        if let Some(change) = raw.get("fileChange") {
            return Ok(Output::FileChange(change.clone()));
        }
        Ok(Output::Unknown(raw))
    }

    pub fn to_value(&self) -> Value {
        match self {
            Output::PullRequest(pr) => serde_json::json!({ "pullRequest": pr }),
            Output::FileChange(change) => serde_json::json!({ "fileChange": change }),
            Output::Unknown(raw) => raw.clone(),
        }
    }
}

impl Serialize for Output {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Output {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        Output::from_value(raw).map_err(serde::de::Error::custom)
    }
}

/// GitHub-specific context for a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GithubRepoContext {
    pub starting_branch: String,
}

/// Repository a session runs against
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceContext {
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_repo_context: Option<GithubRepoContext>,
}

/// One unit of remote agent work
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Resource name, e.g. `sessions/1234`
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub prompt: String,
    #[serde(default)]
    pub state: State,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_context: Option<SourceContext>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outputs: Option<Vec<Output>>,
}

/// Git patch carried by a change set artifact
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitPatch {
    #[serde(default)]
    pub base_commit_id: String,
    #[serde(default)]
    pub unidiff_patch: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_commit_message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeSet {
    #[serde(default)]
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git_patch: Option<GitPatch>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BashOutput {
    #[serde(default)]
    pub output: String,
}

/// Artifact attached to an activity
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_set: Option<ChangeSet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bash_output: Option<BashOutput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<Value>,
}

/// One discrete, immutable progress event within a session
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    /// Unique within a session only. Some history entries omit it; see
    /// [`Activity::dedup_key`].
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub originator: Originator,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// RFC 3339 timestamp; lexical order matches chronological order.
    /// Missing timestamps decode as an empty string and sort first.
    #[serde(default)]
    pub create_time: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub artifacts: Vec<Artifact>,
}

/// Identity of activities that carry neither an id nor a resource name
pub const UNKNOWN_ACTIVITY_ID: &str = "unknown";

impl Activity {
    /// Identity used for exactly-once emission: the id, else the last
    /// segment of the resource name, else [`UNKNOWN_ACTIVITY_ID`].
    pub fn dedup_key(&self) -> &str {
        if !self.id.is_empty() {
            return &self.id;
        }
        self.name
            .as_deref()
            .and_then(|name| name.rsplit('/').next())
            .filter(|segment| !segment.is_empty())
            .unwrap_or(UNKNOWN_ACTIVITY_ID)
    }

    pub fn description_or_default(&self) -> &str {
        self.description.as_deref().unwrap_or("No description")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GithubBranch {
    #[serde(default)]
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GithubRepo {
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub repo: String,
    #[serde(default)]
    pub is_private: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_branch: Option<GithubBranch>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub branches: Vec<GithubBranch>,
}

impl GithubRepo {
    /// `owner/repo`
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}

/// A repository connected to the caller's account
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Source {
    /// Resource name, e.g. `sources/github/owner/repo`
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_repo: Option<GithubRepo>,
}

impl Source {
    /// Whether this source is the repository the operator asked for.
    ///
    /// Matches `owner/repo` exactly, or any substring of the resource name.
    pub fn matches_repo(&self, repo: &str) -> bool {
        let full_name_matches = self
            .github_repo
            .as_ref()
            .is_some_and(|gh| gh.full_name() == repo);
        full_name_matches || self.name.contains(repo)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AutomationMode {
    #[default]
    AutomationModeUnspecified,
    AutoCreatePr,
}

/// Session creation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    #[validate(length(min = 1, message = "Prompt cannot be empty"))]
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_context: Option<SourceContext>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub require_plan_approval: bool,
    #[serde(default)]
    pub automation_mode: AutomationMode,
}

impl CreateSessionRequest {
    pub fn builder(prompt: impl Into<String>) -> CreateSessionRequestBuilder {
        CreateSessionRequestBuilder {
            prompt: prompt.into(),
            title: None,
            source: None,
            starting_branch: None,
            require_plan_approval: false,
            automation_mode: AutomationMode::default(),
        }
    }
}

/// Builder applying the service's title and branch defaults
#[derive(Debug, Clone)]
pub struct CreateSessionRequestBuilder {
    prompt: String,
    title: Option<String>,
    source: Option<String>,
    starting_branch: Option<String>,
    require_plan_approval: bool,
    automation_mode: AutomationMode,
}

impl CreateSessionRequestBuilder {
    pub fn title(mut self, title: Option<String>) -> Self {
        self.title = title.filter(|t| !t.is_empty());
        self
    }

    pub fn source(mut self, source: Option<String>) -> Self {
        self.source = source.filter(|s| !s.is_empty());
        self
    }

    pub fn starting_branch(mut self, branch: Option<String>) -> Self {
        self.starting_branch = branch.filter(|b| !b.is_empty());
        self
    }

    pub fn require_plan_approval(mut self, required: bool) -> Self {
        self.require_plan_approval = required;
        self
    }

    pub fn automation_mode(mut self, mode: AutomationMode) -> Self {
        self.automation_mode = mode;
        self
    }

    pub fn build(self) -> CreateSessionRequest {
        let title = match (self.title, &self.source) {
            (Some(title), _) => title,
            (None, Some(_)) => {
                let head: String = self.prompt.chars().take(30).collect();
                format!("Task: {}...", head)
            }
            (None, None) => "Repoless Session".to_string(),
        };

        let source_context = self.source.map(|source| SourceContext {
            source,
            github_repo_context: Some(GithubRepoContext {
                starting_branch: self.starting_branch.unwrap_or_else(|| "main".to_string()),
            }),
        });

        CreateSessionRequest {
            prompt: self.prompt,
            title: Some(title),
            source_context,
            require_plan_approval: self.require_plan_approval,
            automation_mode: self.automation_mode,
        }
    }
}

/// Body of `sessions/{id}:sendMessage`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendMessageRequest {
    pub prompt: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceListResponse {
    #[serde(default)]
    pub sources: Vec<Source>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionListResponse {
    #[serde(default)]
    pub sessions: Vec<Session>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityListResponse {
    #[serde(default)]
    pub activities: Vec<Activity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}

/// Query parameters for `GET sources`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceQuery {
    #[serde(default = "default_list_page_size")]
    pub page_size: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
}

impl Default for SourceQuery {
    fn default() -> Self {
        Self {
            page_size: default_list_page_size(),
            page_token: None,
            filter: None,
        }
    }
}

/// Query parameters for `GET sessions`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionQuery {
    #[serde(default = "default_list_page_size")]
    pub page_size: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_token: Option<String>,
}

impl Default for SessionQuery {
    fn default() -> Self {
        Self {
            page_size: default_list_page_size(),
            page_token: None,
        }
    }
}

/// Query parameters for `GET sessions/{id}/activities`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityQuery {
    #[serde(default = "default_activity_page_size")]
    pub page_size: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_token: Option<String>,
    /// Only return activities created after this timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<String>,
}

impl Default for ActivityQuery {
    fn default() -> Self {
        Self {
            page_size: default_activity_page_size(),
            page_token: None,
            create_time: None,
        }
    }
}

fn default_list_page_size() -> u32 {
    30
}

fn default_activity_page_size() -> u32 {
    50
}
