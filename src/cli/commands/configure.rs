//! Configure command handler for editing default settings.

use anyhow::{Result, bail};
use inquire::{Confirm, CustomType, InquireError, Text};

use crate::config::{
    ConfigFile, ConfigManager, DEFAULT_API_URL, DEFAULT_PORT, EnvOverrides, ResolveOptions,
    resolve_config,
};
use crate::ui::Style;

/// Runs the configure command.
///
/// With `show`, prints the file's settings next to the effective ones.
/// Otherwise asks for the API server URL, UI port and browser behaviour.
/// Ctrl+C or Escape at any prompt leaves the file untouched.
pub fn run_configure(show: bool) -> Result<()> {
    let manager = ConfigManager::new()?;
    if show {
        let config = manager.load_or_default()?;
        return print_configuration(&manager, &config);
    }

    match prompt_and_save(&manager) {
        Err(e) if is_cancelled(&e) => {
            println!();
            println!("{}", Style::hint("Configuration unchanged"));
            Ok(())
        }
        result => result,
    }
}

/// Whether the error is the user backing out of a prompt.
fn is_cancelled(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<InquireError>(),
        Some(InquireError::OperationCanceled | InquireError::OperationInterrupted)
    )
}

fn prompt_and_save(manager: &ConfigManager) -> Result<()> {
    let mut config = manager.load_or_default()?;

    let current_url = config.api.base_url.as_deref().unwrap_or(DEFAULT_API_URL);
    let base_url = Text::new("AI agent API server URL:")
        .with_default(current_url)
        .with_help_message("e.g. http://localhost:8000")
        .prompt()?;
    let base_url = base_url.trim().to_string();
    if base_url.is_empty() {
        bail!("API server URL cannot be empty");
    }

    let port = CustomType::<u16>::new("Web UI port:")
        .with_default(config.server.port.unwrap_or(DEFAULT_PORT))
        .with_error_message("Please enter a port number (1-65535)")
        .prompt()?;

    let open_browser = Confirm::new("Open a browser on startup?")
        .with_default(config.server.open_browser.unwrap_or(true))
        .prompt()?;

    config.api.base_url = Some(base_url);
    config.server.port = Some(port);
    config.server.open_browser = Some(open_browser);

    // Validate before writing so a typo never lands on disk.
    resolve_config(&ResolveOptions::default(), &EnvOverrides::default(), &config)?;
    manager.save(&config)?;

    println!();
    println!(
        "{} Configuration saved to {}",
        Style::success("✓"),
        Style::secondary(manager.config_path().display().to_string())
    );

    Ok(())
}

fn print_configuration(manager: &ConfigManager, config: &ConfigFile) -> Result<()> {
    let resolved = resolve_config(&ResolveOptions::default(), &EnvOverrides::from_env(), config)?;

    println!(
        "{} {}",
        Style::header("Configuration"),
        Style::secondary(manager.config_path().display().to_string())
    );
    let rows = [
        ("api url", resolved.api.base_url.clone()),
        ("chat", resolved.api.chat_url()),
        ("health", resolved.api.health_url()),
        ("timeout", format!("{}s", resolved.api.timeout.as_secs())),
        ("web ui", resolved.server.local_url()),
        ("browser", resolved.server.open_browser.to_string()),
        (
            "idle",
            format!("{}s", resolved.server.session_idle_timeout.as_secs()),
        ),
        ("log dir", resolved.log.dir.display().to_string()),
        ("log level", resolved.log.level.clone()),
    ];
    for (label, value) in rows {
        println!("  {:<10} {}", Style::label(label), Style::value(value));
    }
    println!();

    Ok(())
}
