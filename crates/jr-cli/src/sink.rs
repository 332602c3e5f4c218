// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Line-oriented rendering of observer events

use std::io::{self, Write};

use jr_observer::{EventSink, ObserverEvent, OutputKind, OutputRow};

pub const URL_NOT_FOUND: &str = "URL not found";

/// Writes observer events to a terminal or any other [`Write`].
///
/// `StatusFailed` and `Cancelled` are not printed here: both also end the
/// observation with an error, which the binary reports once.
pub struct PlainTextSink<W: Write> {
    out: W,
    timestamps: bool,
    outputs_header_written: bool,
    error: Option<io::Error>,
}

impl<W: Write> PlainTextSink<W> {
    pub fn new(out: W, timestamps: bool) -> Self {
        Self {
            out,
            timestamps,
            outputs_header_written: false,
            error: None,
        }
    }

    /// Surface the first write error, if any
    pub fn finish(self) -> io::Result<W> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.out),
        }
    }

    fn line(&mut self, text: std::fmt::Arguments<'_>) {
        if self.error.is_some() {
            return;
        }
        if let Err(err) = self.out.write_fmt(format_args!("{text}\n")) {
            tracing::warn!(error = %err, "failed to write event");
            self.error = Some(err);
        }
    }

    fn output_row(&mut self, row: &OutputRow) {
        if !self.outputs_header_written {
            self.outputs_header_written = true;
            self.line(format_args!("\n--- Session Outputs ---"));
        }
        match row.kind {
            OutputKind::PullRequest => {
                self.line(format_args!("Type: {} | URL: {}", row.kind, row.details))
            }
            OutputKind::FileChange | OutputKind::Unknown => {
                self.line(format_args!("Type: {} | Details: {}", row.kind, row.details))
            }
        }
    }
}

impl<W: Write> EventSink for PlainTextSink<W> {
    fn emit(&mut self, event: ObserverEvent) {
        match event {
            ObserverEvent::Activity(activity) => {
                let originator = activity.originator;
                let description = activity.description_or_default();
                if self.timestamps {
                    let now = chrono::Local::now().format("%H:%M:%S");
                    self.line(format_args!("[{now}] {originator}: {description}"));
                } else {
                    self.line(format_args!("{originator}: {description}"));
                }
            }
            ObserverEvent::Finished { state } => {
                self.line(format_args!("Session finished with state: {state}"));
            }
            ObserverEvent::Output(row) => self.output_row(&row),
            ObserverEvent::AwaitingFeedback { url, .. } => {
                let url = url.as_deref().unwrap_or(URL_NOT_FOUND);
                self.line(format_args!(
                    "Jules is waiting for your feedback (Plan Approval or Questions)."
                ));
                self.line(format_args!("Please visit the web URL to interact: {url}"));
            }
            ObserverEvent::TimedOut { budget } => {
                self.line(format_args!("Polling timed out after {}s.", budget.as_secs()));
            }
            ObserverEvent::StateChanged { state } => {
                tracing::debug!(%state, "session state");
            }
            ObserverEvent::StatusFailed { message } => {
                tracing::debug!(%message, "status poll failed");
            }
            ObserverEvent::Cancelled => tracing::debug!("observation cancelled"),
        }
    }
}
