use anyhow::Result;
use std::process::Stdio;
use tokio::process::Command;
use tokio::task::JoinHandle;

use super::load_config;
use crate::api::ApiClient;
use crate::config::ResolveOptions;
use crate::ui::Style;
use crate::{logging, web};

/// Starts the web UI and, unless headless, opens it in a browser.
pub async fn run_ui(options: &ResolveOptions) -> Result<()> {
    let config = load_config(options)?;

    // Dropping the guard flushes the log; hold it until the server stops.
    let _log_guard = logging::init(&config.log.dir, &config.log.level)?;
    tracing::info!(
        api = %config.api.base_url,
        log_dir = %config.log.dir.display(),
        "Starting chat UI"
    );

    let api = ApiClient::new(config.api.clone())?;
    let open = config.server.open_browser;

    web::serve(&config.server, api, |url| {
        if open {
            open_browser(url);
        }
    })
    .await
}

fn open_browser(url: &str) {
    match spawn_reaped(browser_command(url)) {
        Ok(_) => tracing::debug!(%url, "Opened browser"),
        Err(e) => {
            tracing::warn!(%url, error = %e, "Failed to open browser");
            eprintln!(
                "{} Could not open a browser. Visit {url} manually.",
                Style::warning("Warning:")
            );
        }
    }
}

/// Spawns `cmd` with its output discarded and waits on it in the background,
/// so the exited opener does not linger as a zombie.
fn spawn_reaped(mut cmd: Command) -> std::io::Result<JoinHandle<()>> {
    let mut child = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;

    Ok(tokio::spawn(async move {
        match child.wait().await {
            Ok(status) if status.success() => {}
            Ok(status) => tracing::warn!(%status, "Browser opener exited with an error"),
            Err(e) => tracing::warn!(error = %e, "Failed to wait for browser opener"),
        }
    }))
}

#[cfg(target_os = "macos")]
fn browser_command(url: &str) -> Command {
    let mut cmd = Command::new("open");
    cmd.arg(url);
    cmd
}

#[cfg(target_os = "windows")]
fn browser_command(url: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.args(["/C", "start", "", url]);
    cmd
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn browser_command(url: &str) -> Command {
    let mut cmd = Command::new("xdg-open");
    cmd.arg(url);
    cmd
}
