//! # agent-chat - Browser chat for an AI agent API server
//!
//! `agent-chat` serves a small chat page on `http://localhost:8501`. Each
//! message is forwarded, together with the conversation so far, to a
//! separately hosted AI agent API server, and the reply is appended to the
//! conversation. A sidebar shows whether the API server is reachable.
//!
//! ## Quick Start
//!
//! ```bash
//! # Start the UI against the default API server (http://localhost:8000)
//! agent-chat
//!
//! # Point it at another API server, without opening a browser
//! AGENT_CHAT_API_URL=http://agent.internal:8000 agent-chat --headless
//!
//! # Check the API server from the terminal
//! agent-chat check
//! ```
//!
//! ## Configuration
//!
//! Settings are stored in `~/.config/agent-chat/config.toml`:
//!
//! ```toml
//! [api]
//! base_url = "http://localhost:8000"
//! chat_path = "/query"
//! health_path = "/docs"
//! timeout_secs = 120
//!
//! [server]
//! port = 8501
//! open_browser = true
//! session_idle_secs = 3600
//!
//! [log]
//! dir = "log"
//! level = "info"
//! ```

/// HTTP client for the agent API server.
pub mod api;

/// Chat session state, event handling and page rendering.
pub mod chat;

/// Command-line interface definitions and handlers.
pub mod cli;

/// Configuration file management.
pub mod config;

/// Turn-level error taxonomy.
pub mod error;

/// File system utilities.
pub mod fs;

/// File logging setup.
pub mod logging;

/// XDG-style path utilities.
pub mod paths;

/// Terminal UI components (spinner, colors).
pub mod ui;

/// The local web process.
pub mod web;
