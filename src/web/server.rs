use anyhow::{Context, Result};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::routes::{AppState, router};
use super::sessions::SessionStore;
use crate::api::ApiClient;
use crate::config::ServerSettings;
use crate::ui::Style;

/// Binds the web process and serves until Ctrl+C.
///
/// `on_ready` runs once the listener is bound, with the URL to open.
pub async fn serve<F>(server: &ServerSettings, api: ApiClient, on_ready: F) -> Result<()>
where
    F: FnOnce(&str),
{
    let api_url = api.settings().base_url.clone();
    let sessions = SessionStore::with_idle_timeout(server.session_idle_timeout);
    let app = router(AppState::with_sessions(api, sessions.clone()));

    let addr = server.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    let local_addr = listener.local_addr()?;
    let url = ServerSettings {
        port: local_addr.port(),
        ..server.clone()
    }
    .local_url();

    tracing::info!(%local_addr, api = %api_url, "Chat UI listening");
    print_banner(&url, &api_url);
    on_ready(&url);

    let sweeper = spawn_session_sweeper(sessions);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Received Ctrl+C, shutting down");
            }
        })
        .await
        .context("Web server failed")?;
    sweeper.abort();

    tracing::info!("Chat UI stopped");
    println!("{}", Style::success("Goodbye!"));
    Ok(())
}

/// Evicts idle sessions even when no new browser arrives to trigger it.
fn spawn_session_sweeper(sessions: SessionStore) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut tick = tokio::time::interval(sessions.idle_timeout());
        tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tick.tick().await;
            sessions.evict_idle().await;
        }
    })
}

fn print_banner(url: &str, api_url: &str) {
    println!(
        "{} {}",
        Style::header("agent-chat"),
        Style::version(format!("v{}", env!("CARGO_PKG_VERSION")))
    );
    println!();
    println!("  {}   {}", Style::label("Local URL"), Style::value(url));
    println!("  {}  {}", Style::label("API server"), Style::secondary(api_url));
    println!();
    println!("{}", Style::hint("Press Ctrl+C to stop"));
}
