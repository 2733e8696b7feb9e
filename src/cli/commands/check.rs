use anyhow::Result;
use chrono::Local;

use super::load_config;
use crate::api::ApiClient;
use crate::chat::{ConnectionStatus, Health};
use crate::config::ResolveOptions;
use crate::ui::{Spinner, Style};

/// Probes the API server once and reports the result.
///
/// Returns `exitcode::UNAVAILABLE` when the server did not answer.
pub async fn run_check(options: &ResolveOptions) -> Result<exitcode::ExitCode> {
    let config = load_config(options)?;
    let api = ApiClient::new(config.api)?;

    let spinner = Spinner::new(&format!("Checking {}...", api.settings().health_url()));
    let status = api.check_health().await;
    spinner.stop();

    print_status(&status, &api.settings().base_url);

    Ok(exit_code(&status))
}

fn exit_code(status: &ConnectionStatus) -> exitcode::ExitCode {
    if status.reachable {
        exitcode::OK
    } else {
        exitcode::UNAVAILABLE
    }
}

fn print_status(status: &ConnectionStatus, api_url: &str) {
    match status.health() {
        Health::Connected => {
            println!(
                "{} Connected to the AI agent server at {}",
                Style::health(Health::Connected),
                Style::value(api_url)
            );
        }
        Health::Degraded => {
            println!(
                "{} The AI agent server at {} answered with status {}",
                Style::health(Health::Degraded),
                Style::value(api_url),
                Style::warning(status.status_code.unwrap_or_default())
            );
        }
        Health::Unreachable => {
            eprintln!(
                "{} Cannot connect to the AI agent server at {}",
                Style::health(Health::Unreachable),
                Style::value(api_url)
            );
            if let Some(error) = &status.error {
                eprintln!("  {}", Style::secondary(error));
            }
            eprintln!(
                "  {}",
                Style::hint("Start the AI agent server, or point agent-chat at it with --api-url")
            );
        }
    }
    println!(
        "  {} {}",
        Style::label("checked at"),
        status.last_checked.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S")
    );
}
