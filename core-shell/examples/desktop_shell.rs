//! Desktop shell session
//!
//! Runs one session against the desktop host services: headless renderer,
//! probe-based connectivity, terminal dialogs and an on-disk preferences
//! store. Press Ctrl-C to leave.
//!
//! Run with:
//! ```bash
//! cargo run -p core-shell --example desktop_shell
//!
//! # Custom data directory and JSON logs
//! cargo run -p core-shell --example desktop_shell -- /tmp/shell-data json
//! ```

use anyhow::Context;
use core_runtime::config::ShellConfig;
use core_runtime::logging::{init_logging, LogFormat, LoggingConfig};
use core_shell::ShellOrchestrator;
use std::env;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();

    let format = match args.get(2).map(String::as_str) {
        Some("json") => LogFormat::Json,
        Some("compact") => LogFormat::Compact,
        _ => LogFormat::default(),
    };
    init_logging(LoggingConfig::default().with_format(format))
        .context("Failed to initialize logging")?;

    let shell = match args.get(1) {
        Some(dir) => ShellOrchestrator::with_desktop_defaults(dir).await?,
        None => ShellOrchestrator::new(ShellConfig::builder().build().await?),
    };

    let mut events = shell.events().subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            info!(severity = ?event.severity(), "{}", event.description());
        }
    });

    shell.start().await;
    shell.on_foreground().await;

    tokio::select! {
        _ = shell.wait_for_exit() => {}
        _ = tokio::signal::ctrl_c() => shell.request_exit(),
    }

    shell.on_background().await;
    shell.on_teardown().await;
    Ok(())
}
