//! Slash command vocabulary for the shell.

use forgemind_core::ReplyMode;

/// A parsed slash command. Anything that does not start with `/` is
/// ordinary chat input and never reaches this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Start a fresh conversation and make it active.
    New,
    /// List all conversations.
    List,
    /// Switch to the conversation at the given 1-based list position.
    Switch(Option<usize>),
    /// Show or change the reply mode. The argument is passed through raw.
    Mode(Option<String>),
    /// Show or toggle the color theme.
    Theme(Option<String>),
    /// Re-render the active conversation.
    History,
    /// Print the command reference.
    Help,
    /// Leave the shell.
    Quit,
    /// A slash command we do not recognize.
    Unknown(String),
}

impl Command {
    /// Parses a trimmed input line. Returns `None` for plain chat text.
    pub fn parse(line: &str) -> Option<Command> {
        let mut parts = line.split_whitespace();
        let head = parts.next()?;
        if !head.starts_with('/') {
            return None;
        }
        let arg = parts.next().map(|s| s.to_string());

        let command = match head.trim_start_matches('/').to_lowercase().as_str() {
            "new" => Command::New,
            "list" | "chats" => Command::List,
            "switch" => Command::Switch(arg.and_then(|a| a.parse().ok())),
            "mode" => Command::Mode(arg),
            "theme" => Command::Theme(arg),
            "history" => Command::History,
            "help" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => Command::Unknown(other.to_string()),
        };
        Some(command)
    }
}

/// Maps a user-supplied mode name to a reply mode.
pub fn parse_mode(arg: &str) -> Option<ReplyMode> {
    match arg.to_lowercase().as_str() {
        "normal" => Some(ReplyMode::Normal),
        "temporary" | "temp" => Some(ReplyMode::Temporary),
        "web" | "websearch" | "web_search" => Some(ReplyMode::WebSearch),
        _ => None,
    }
}
