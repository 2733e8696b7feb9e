/// Slash commands accepted in the chat box: (command, description)
pub const SLASH_COMMANDS: &[(&str, &str)] = &[
    ("/clear", "Clear the conversation"),
    ("/status", "Check the connection to the AI agent server"),
    ("/help", "Show available commands"),
];

/// Slash command types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlashCommand {
    Clear,
    Status,
    Help,
    Unknown(String),
}

/// Input types
#[derive(Debug, PartialEq, Eq)]
pub enum Input {
    Text(String),
    Command(SlashCommand),
    Empty,
}

pub fn parse_input(input: &str) -> Input {
    let input = input.trim();

    if input.is_empty() {
        return Input::Empty;
    }

    input
        .strip_prefix('/')
        .map_or_else(|| Input::Text(input.to_string()), parse_slash_command)
}

fn parse_slash_command(cmd: &str) -> Input {
    let parts: Vec<&str> = cmd.split_whitespace().collect();

    match parts.first().copied() {
        Some("clear" | "reset") => Input::Command(SlashCommand::Clear),
        Some("status" | "ping") => Input::Command(SlashCommand::Status),
        Some("help" | "?") => Input::Command(SlashCommand::Help),
        _ => Input::Command(SlashCommand::Unknown(parts.join(" "))),
    }
}
