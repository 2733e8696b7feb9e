//! Subcommand implementations.

/// Connection check command handler.
pub mod check;

/// Configure command handler.
pub mod configure;

/// Web UI command handler.
pub mod run;

use anyhow::Result;

use crate::config::{ConfigManager, EnvOverrides, ResolveOptions, ResolvedConfig, resolve_config};

/// Loads the config file and merges it with CLI options and the environment.
pub fn load_config(options: &ResolveOptions) -> Result<ResolvedConfig> {
    let manager = ConfigManager::new()?;
    let file_config = manager.load_or_default()?;
    resolve_config(options, &EnvOverrides::from_env(), &file_config)
}
