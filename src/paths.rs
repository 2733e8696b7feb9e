//! XDG-style path utilities for configuration and logs.
//!
//! Configuration follows XDG Base Directory conventions. Logs default to a
//! `log` directory next to where the process is started, matching how the
//! chat front-end is usually run from a project checkout.

use std::path::PathBuf;

const APP_DIR: &str = "agent-chat";

/// Default log directory name, relative to the working directory.
pub const DEFAULT_LOG_DIR: &str = "log";

/// Returns the configuration directory for agent-chat.
///
/// Resolution order:
/// 1. `$XDG_CONFIG_HOME/agent-chat` if `XDG_CONFIG_HOME` is set
/// 2. `~/.config/agent-chat` otherwise
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined.
pub fn config_dir() -> anyhow::Result<PathBuf> {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME")
        && !xdg.is_empty()
    {
        return Ok(PathBuf::from(xdg).join(APP_DIR));
    }
    let home = dirs::home_dir()
        .ok_or_else(|| anyhow::anyhow!("Failed to determine home directory"))?;
    Ok(home.join(".config").join(APP_DIR))
}

/// Returns the log directory, resolving relative paths against the working
/// directory.
pub fn log_dir(configured: Option<&str>) -> PathBuf {
    let dir = PathBuf::from(configured.unwrap_or(DEFAULT_LOG_DIR));
    if dir.is_absolute() {
        return dir;
    }
    std::env::current_dir().map_or(dir.clone(), |cwd| cwd.join(&dir))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_config_dir_default() {
        let original = std::env::var("XDG_CONFIG_HOME").ok();
        unsafe { std::env::remove_var("XDG_CONFIG_HOME") };

        let dir = config_dir().unwrap();
        assert!(dir.ends_with(".config/agent-chat"));

        if let Some(val) = original {
            unsafe { std::env::set_var("XDG_CONFIG_HOME", val) };
        }
    }

    #[test]
    #[serial]
    fn test_config_dir_xdg_override() {
        let original = std::env::var("XDG_CONFIG_HOME").ok();
        unsafe { std::env::set_var("XDG_CONFIG_HOME", "/custom/config") };

        let dir = config_dir().unwrap();
        assert_eq!(dir, PathBuf::from("/custom/config/agent-chat"));

        if let Some(val) = original {
            unsafe { std::env::set_var("XDG_CONFIG_HOME", val) };
        } else {
            unsafe { std::env::remove_var("XDG_CONFIG_HOME") };
        }
    }

    #[test]
    fn test_log_dir_absolute_kept() {
        assert_eq!(log_dir(Some("/var/log/chat")), PathBuf::from("/var/log/chat"));
    }

    #[test]
    fn test_log_dir_default_is_relative_to_cwd() {
        let dir = log_dir(None);
        assert!(dir.is_absolute() || dir == PathBuf::from(DEFAULT_LOG_DIR));
        assert!(dir.ends_with(DEFAULT_LOG_DIR));
    }
}
