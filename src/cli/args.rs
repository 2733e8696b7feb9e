use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "agent-chat")]
#[command(about = "Browser chat front-end for an AI agent API server")]
#[command(version)]
pub struct Args {
    /// Base URL of the AI agent API server [env: AGENT_CHAT_API_URL]
    #[arg(short = 'a', long, global = true)]
    pub api_url: Option<String>,

    /// Address the web UI binds to
    #[arg(long)]
    pub host: Option<String>,

    /// Port the web UI listens on
    #[arg(short = 'p', long)]
    pub port: Option<u16>,

    /// Do not open a browser on startup
    #[arg(long)]
    pub headless: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check whether the AI agent API server is reachable
    Check,
    /// Configure default settings
    Configure {
        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
}
