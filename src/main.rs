use anyhow::Result;
use clap::Parser;

use agent_chat::cli::commands::{check, configure, run};
use agent_chat::cli::{Args, Command};
use agent_chat::config::ResolveOptions;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let options = ResolveOptions {
        api_url: args.api_url,
        host: args.host,
        port: args.port,
        headless: args.headless,
    };

    match args.command {
        Some(Command::Check) => {
            let code = check::run_check(&options).await?;
            if code != exitcode::OK {
                std::process::exit(code);
            }
        }
        Some(Command::Configure { show }) => {
            configure::run_configure(show)?;
        }
        None => {
            run::run_ui(&options).await?;
        }
    }

    Ok(())
}
