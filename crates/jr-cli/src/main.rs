// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

use std::process::ExitCode;

use jr_cli::{is_cancellation, Cli, Parser};
use jr_logging::DefaultDestination;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Log to a file so log lines never interleave with streamed activities
    if let Err(err) = cli.logging.init("jr", DefaultDestination::File) {
        eprintln!("Warning: logging disabled: {err:#}");
    }

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("interrupt received");
                cancel.cancel();
            }
        }
    });

    let mut stdout = std::io::stdout();
    match cli.run(cancel, &mut stdout).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) if is_cancellation(&err) => {
            println!("\nOperation cancelled by user.");
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!(error = %format!("{err:#}"), "command failed");
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
