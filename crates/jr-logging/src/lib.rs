// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Centralized logging setup for the Jules relay binaries
//!
//! Every binary flattens [`CliLoggingArgs`] into its clap arguments and calls
//! [`CliLoggingArgs::init`] once at startup. `RUST_LOG` always takes
//! precedence over `--log-level`.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub use tracing::Level;

/// Directory name used under the platform data directory
const APP_DIR: &str = "jules-relay";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, clap::ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Plaintext,
    Json,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, clap::ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CliLogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for Level {
    fn from(level: CliLogLevel) -> Self {
        match level {
            CliLogLevel::Error => Level::ERROR,
            CliLogLevel::Warn => Level::WARN,
            CliLogLevel::Info => Level::INFO,
            CliLogLevel::Debug => Level::DEBUG,
            CliLogLevel::Trace => Level::TRACE,
        }
    }
}

/// Where log lines go when no file option is given
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DefaultDestination {
    /// Long-running services log to stdout
    Console,
    /// Interactive tools keep stdout for operator output
    File,
}

/// Logging flags shared by all binaries
#[derive(Clone, Debug, Default, clap::Args, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CliLoggingArgs {
    /// Log verbosity level (default: info)
    #[arg(long, value_enum, global = true)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<CliLogLevel>,

    /// Log output format (default: plaintext)
    #[arg(long, value_enum, global = true)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_format: Option<LogFormat>,

    /// Directory for log files (default: platform data directory)
    #[arg(long, global = true)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,

    /// Log filename, relative to --log-dir unless absolute
    #[arg(long, global = true)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
}

impl CliLoggingArgs {
    /// Install the global subscriber for `component`.
    ///
    /// Logs go to a file when `--log-file`/`--log-dir` is given or when the
    /// binary's default destination is [`DefaultDestination::File`].
    pub fn init(&self, component: &str, default: DefaultDestination) -> anyhow::Result<()> {
        let level = self.log_level.unwrap_or_default().into();
        let format = self.log_format.unwrap_or_default();

        if self.wants_file(default) {
            init_to_file(component, level, format, &self.resolve_log_path(component))
        } else {
            init(component, level, format)
        }
    }

    fn wants_file(&self, default: DefaultDestination) -> bool {
        default == DefaultDestination::File || self.log_file.is_some() || self.log_dir.is_some()
    }

    /// Resolve the log file path for `component`
    pub fn resolve_log_path(&self, component: &str) -> PathBuf {
        let dir = self.log_dir.clone().unwrap_or_else(default_log_dir);
        match &self.log_file {
            Some(file) if file.is_absolute() => file.clone(),
            Some(file) => dir.join(file),
            None => dir.join(format!("{}.log", component)),
        }
    }
}

/// Platform data directory for log files, e.g. `~/.local/share/jules-relay`
pub fn default_log_dir() -> PathBuf {
    dirs::data_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_DIR)
}

/// Initialize console logging on stdout
pub fn init(component: &str, default_level: Level, format: LogFormat) -> anyhow::Result<()> {
    init_with_writer(component, default_level, format, io::stdout)
}

/// Initialize logging appended to `log_path`, creating parent directories
pub fn init_to_file(
    component: &str,
    default_level: Level,
    format: LogFormat,
    log_path: &Path,
) -> anyhow::Result<()> {
    if let Some(parent) = log_path.parent() {
        fs::create_dir_all(parent)?;
    }
    let log_file = fs::OpenOptions::new().create(true).append(true).open(log_path)?;

    init_with_writer(component, default_level, format, log_file)
}

pub fn init_with_writer<W>(
    component: &str,
    default_level: Level,
    format: LogFormat,
    writer: W,
) -> anyhow::Result<()>
where
    W: for<'writer> tracing_subscriber::fmt::MakeWriter<'writer> + Send + Sync + 'static,
{
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(component, default_level)));

    let layer = tracing_subscriber::fmt::layer().with_writer(writer).with_target(true);
    match format {
        LogFormat::Json => {
            tracing_subscriber::registry().with(filter).with(layer.json()).try_init()?;
        }
        LogFormat::Plaintext => {
            tracing_subscriber::registry().with(filter).with(layer).try_init()?;
        }
    }

    Ok(())
}

/// Default filter: the workspace crates at `level`, dependencies at `warn`.
fn default_directive(component: &str, level: Level) -> String {
    let component = component.replace('-', "_");
    let level = level.as_str().to_ascii_lowercase();
    format!(
        "warn,{component}={level},jr_observer={level},jr_rest_client={level},jr_client_api={level},jr_gateway={level},jr_cli={level}"
    )
}

/// Mask a secret for logging, keeping the last four characters so keys can
/// be told apart.
pub fn redact(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= 8 {
        return "[REDACTED]".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("[REDACTED]...{}", tail)
}
