//! Configuration file management and resolution.

mod manager;

pub use manager::{
    ApiSection, ApiSettings, ConfigFile, ConfigManager, DEFAULT_API_URL, DEFAULT_PORT,
    DEFAULT_SESSION_IDLE_SECS, ENV_API_URL, ENV_LOG_LEVEL, EnvOverrides, LogSection, LogSettings,
    ResolveOptions, ResolvedConfig, ServerSection, ServerSettings, resolve_config,
};
