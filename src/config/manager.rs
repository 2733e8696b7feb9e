use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::fs::{atomic_write, ensure_dir};
use crate::paths;

/// Environment variable overriding the API server base URL.
pub const ENV_API_URL: &str = "AGENT_CHAT_API_URL";
/// Environment variable overriding the log level.
pub const ENV_LOG_LEVEL: &str = "LOG_LEVEL";

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_CHAT_PATH: &str = "/query";
pub const DEFAULT_HEALTH_PATH: &str = "/docs";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_HEALTH_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_STATUS_TTL_SECS: u64 = 30;
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8501;
pub const DEFAULT_SESSION_IDLE_SECS: u64 = 60 * 60;
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Settings in the `[api]` section of config.toml.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiSection {
    /// Base URL of the agent API server.
    pub base_url: Option<String>,
    /// Path of the chat endpoint.
    pub chat_path: Option<String>,
    /// Path probed by the connection check.
    pub health_path: Option<String>,
    /// Ceiling for one chat request, in seconds.
    pub timeout_secs: Option<u64>,
    /// Ceiling for one connection check, in seconds.
    pub health_timeout_secs: Option<u64>,
    /// How long a connection status stays fresh before a page load re-checks it.
    pub status_ttl_secs: Option<u64>,
}

/// Settings in the `[server]` section of config.toml.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerSection {
    pub host: Option<String>,
    pub port: Option<u16>,
    /// Open a browser tab on startup.
    pub open_browser: Option<bool>,
    /// Seconds without a request after which a browser session is dropped.
    pub session_idle_secs: Option<u64>,
}

/// Settings in the `[log]` section of config.toml.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogSection {
    pub dir: Option<String>,
    pub level: Option<String>,
}

/// The complete configuration file structure.
///
/// Corresponds to `~/.config/agent-chat/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub api: ApiSection,
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub log: LogSection,
}

/// CLI overrides that take precedence over everything else.
#[derive(Debug, Clone, Default)]
pub struct ResolveOptions {
    pub api_url: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    /// Do not open a browser.
    pub headless: bool,
}

/// Values read from the process environment.
#[derive(Debug, Clone, Default)]
pub struct EnvOverrides {
    pub api_url: Option<String>,
    pub log_level: Option<String>,
}

impl EnvOverrides {
    /// Reads the overrides from the current process environment.
    pub fn from_env() -> Self {
        let read = |key: &str| std::env::var(key).ok().filter(|v| !v.trim().is_empty());
        Self {
            api_url: read(ENV_API_URL),
            log_level: read(ENV_LOG_LEVEL),
        }
    }
}

/// Resolved settings for talking to the agent API server.
#[derive(Debug, Clone)]
pub struct ApiSettings {
    /// Base URL without a trailing slash.
    pub base_url: String,
    pub chat_path: String,
    pub health_path: String,
    pub timeout: Duration,
    pub health_timeout: Duration,
    pub status_ttl: Duration,
}

impl ApiSettings {
    pub fn chat_url(&self) -> String {
        format!("{}{}", self.base_url, self.chat_path)
    }

    pub fn health_url(&self) -> String {
        format!("{}{}", self.base_url, self.health_path)
    }
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            chat_path: DEFAULT_CHAT_PATH.to_string(),
            health_path: DEFAULT_HEALTH_PATH.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            health_timeout: Duration::from_secs(DEFAULT_HEALTH_TIMEOUT_SECS),
            status_ttl: Duration::from_secs(DEFAULT_STATUS_TTL_SECS),
        }
    }
}

/// Resolved settings for the local web process.
#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub open_browser: bool,
    pub session_idle_timeout: Duration,
}

impl ServerSettings {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Address a browser on this machine should open.
    pub fn local_url(&self) -> String {
        let host = match self.host.as_str() {
            "127.0.0.1" | "0.0.0.0" | "::" | "::1" => "localhost",
            other => other,
        };
        format!("http://{host}:{}", self.port)
    }
}

#[derive(Debug, Clone)]
pub struct LogSettings {
    pub dir: PathBuf,
    pub level: String,
}

/// Resolved configuration after merging CLI, environment and config file.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub api: ApiSettings,
    pub server: ServerSettings,
    pub log: LogSettings,
}

/// Resolves configuration by merging CLI options, environment and config file.
///
/// Priority: CLI option, environment variable, config file, built-in default.
///
/// # Errors
///
/// Returns an error if the API URL is not an http(s) URL, a path does not
/// start with `/`, or a timeout is zero.
pub fn resolve_config(
    options: &ResolveOptions,
    env: &EnvOverrides,
    config_file: &ConfigFile,
) -> Result<ResolvedConfig> {
    let api_file = &config_file.api;

    let base_url = options
        .api_url
        .as_ref()
        .or(env.api_url.as_ref())
        .or(api_file.base_url.as_ref())
        .cloned()
        .unwrap_or_else(|| DEFAULT_API_URL.to_string());
    let base_url = validate_base_url(&base_url)?;

    let chat_path = validate_path(
        "chat_path",
        api_file.chat_path.as_deref().unwrap_or(DEFAULT_CHAT_PATH),
    )?;
    let health_path = validate_path(
        "health_path",
        api_file.health_path.as_deref().unwrap_or(DEFAULT_HEALTH_PATH),
    )?;

    let timeout = validate_secs(
        "timeout_secs",
        api_file.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
    )?;
    let health_timeout = validate_secs(
        "health_timeout_secs",
        api_file
            .health_timeout_secs
            .unwrap_or(DEFAULT_HEALTH_TIMEOUT_SECS),
    )?;
    // Zero is allowed here: it means every page load re-checks.
    let status_ttl =
        Duration::from_secs(api_file.status_ttl_secs.unwrap_or(DEFAULT_STATUS_TTL_SECS));

    let server_file = &config_file.server;
    let server = ServerSettings {
        host: options
            .host
            .clone()
            .or_else(|| server_file.host.clone())
            .unwrap_or_else(|| DEFAULT_HOST.to_string()),
        port: options.port.or(server_file.port).unwrap_or(DEFAULT_PORT),
        open_browser: !options.headless && server_file.open_browser.unwrap_or(true),
        session_idle_timeout: validate_secs(
            "session_idle_secs",
            server_file
                .session_idle_secs
                .unwrap_or(DEFAULT_SESSION_IDLE_SECS),
        )?,
    };

    let log = LogSettings {
        dir: paths::log_dir(config_file.log.dir.as_deref()),
        level: env
            .log_level
            .clone()
            .or_else(|| config_file.log.level.clone())
            .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string())
            .to_lowercase(),
    };

    Ok(ResolvedConfig {
        api: ApiSettings {
            base_url,
            chat_path,
            health_path,
            timeout,
            health_timeout,
            status_ttl,
        },
        server,
        log,
    })
}

fn validate_base_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    let parsed = url::Url::parse(trimmed).with_context(|| {
        format!(
            "Invalid API server URL: '{raw}'\n\n\
             Please provide it via:\n  \
             - CLI option: agent-chat --api-url <url>\n  \
             - Environment: {ENV_API_URL}=<url>\n  \
             - Config file: ~/.config/agent-chat/config.toml"
        )
    })?;

    if !matches!(parsed.scheme(), "http" | "https") {
        bail!(
            "Invalid API server URL: '{raw}'\n\n\
             Only http and https URLs are supported"
        );
    }

    Ok(trimmed.to_string())
}

fn validate_path(key: &str, path: &str) -> Result<String> {
    if !path.starts_with('/') {
        bail!("Invalid '{key}': '{path}' must start with '/'");
    }
    Ok(path.to_string())
}

fn validate_secs(key: &str, secs: u64) -> Result<Duration> {
    if secs == 0 {
        bail!("Invalid '{key}': must be greater than zero");
    }
    Ok(Duration::from_secs(secs))
}

/// Manages loading and saving configuration files.
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Creates a new config manager.
    ///
    /// Configuration is stored at `$XDG_CONFIG_HOME/agent-chat/config.toml`
    /// or `~/.config/agent-chat/config.toml` if `XDG_CONFIG_HOME` is not set.
    pub fn new() -> Result<Self> {
        Ok(Self {
            config_path: paths::config_dir()?.join("config.toml"),
        })
    }

    /// Creates a manager for an explicit config file path.
    pub const fn with_path(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    pub const fn config_path(&self) -> &PathBuf {
        &self.config_path
    }

    pub fn load(&self) -> Result<ConfigFile> {
        let contents = fs::read_to_string(&self.config_path).with_context(|| {
            format!("Failed to read config file: {}", self.config_path.display())
        })?;

        let config_file: ConfigFile =
            toml::from_str(&contents).with_context(|| {
                format!("Failed to parse config file: {}", self.config_path.display())
            })?;

        Ok(config_file)
    }

    /// Loads the config file, treating a missing file as empty.
    ///
    /// A file that exists but does not parse is still an error.
    pub fn load_or_default(&self) -> Result<ConfigFile> {
        if self.config_path.exists() {
            self.load()
        } else {
            Ok(ConfigFile::default())
        }
    }

    pub fn save(&self, config: &ConfigFile) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            ensure_dir(parent)?;
        }

        let contents = toml::to_string_pretty(config).context("Failed to serialize config")?;
        atomic_write(&self.config_path, &contents)
    }
}
