// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Classification of session outputs into display rows

use std::fmt;

use jr_api_contract::Output;

pub const NO_URL: &str = "No URL";
pub const FILE_CHANGE_DETAILS: &str = "Modified files available in session context";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    PullRequest,
    FileChange,
    Unknown,
}

impl fmt::Display for OutputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OutputKind::PullRequest => "Pull Request",
            OutputKind::FileChange => "File Change",
            OutputKind::Unknown => "Unknown",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputRow {
    pub kind: OutputKind,
    pub details: String,
}

impl From<&Output> for OutputRow {
    fn from(output: &Output) -> Self {
        match output {
            Output::PullRequest(pr) => OutputRow {
                kind: OutputKind::PullRequest,
                details: pr.url.clone().unwrap_or_else(|| NO_URL.to_string()),
            },
            Output::FileChange(_) => OutputRow {
                kind: OutputKind::FileChange,
                details: FILE_CHANGE_DETAILS.to_string(),
            },
            Output::Unknown(raw) => OutputRow {
                kind: OutputKind::Unknown,
                details: raw.to_string(),
            },
        }
    }
}

pub fn render_outputs(outputs: &[Output]) -> Vec<OutputRow> {
    outputs.iter().map(OutputRow::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use jr_api_contract::PullRequest;
    use serde_json::json;

    #[test]
    fn pull_request_uses_exact_url() {
        let output = Output::from_value(json!({"pullRequest": {"url": "https://x/pr/1"}})).unwrap();
        let row = OutputRow::from(&output);
        assert_eq!(row.kind, OutputKind::PullRequest);
        assert_eq!(row.details, "https://x/pr/1");
    }

    #[test]
    fn pull_request_without_url() {
        let row = OutputRow::from(&Output::PullRequest(PullRequest::default()));
        assert_eq!(row.details, NO_URL);
    }

    #[test]
    fn file_change_and_unknown() {
        let rows = render_outputs(&[
            Output::FileChange(json!({"path": "src/lib.rs"})),
            Output::Unknown(json!({"other": 1})),
        ]);
        assert_eq!(rows[0].kind, OutputKind::FileChange);
        assert_eq!(rows[0].details, FILE_CHANGE_DETAILS);
        assert_eq!(rows[1].kind, OutputKind::Unknown);
        assert_eq!(rows[1].details, r#"{"other":1}"#);
        assert_eq!(rows[1].kind.to_string(), "Unknown");
    }
}
