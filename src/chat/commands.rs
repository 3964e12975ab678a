//! Slash command parsing for the chat application.
//!
//! Input starting with `/` controls the session instead of being sent to the
//! model.

/// A parsed chat command.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatCommand {
    /// Clear the conversation history.
    Clear,

    /// Print the conversation history.
    History,

    /// Print the session status.
    Status,

    /// Display help information.
    Help,

    /// Exit the chat application.
    Quit,

    /// Report a parsing error back to the caller.
    Invalid(String),
}

/// Parses user input for slash commands.
///
/// Returns `Some(ChatCommand)` if the input is a command, or `None` if it
/// should be submitted as a message.
///
/// # Examples
///
/// ```
/// # use chatbot::chat::{ChatCommand, parse_command};
/// assert_eq!(parse_command("/clear"), Some(ChatCommand::Clear));
/// assert!(parse_command("Hello there").is_none());
/// ```
pub fn parse_command(input: &str) -> Option<ChatCommand> {
    let input = input.trim();

    let rest = input.strip_prefix('/')?;
    let mut parts = rest.splitn(2, ' ');
    let command = parts.next()?.to_lowercase();
    let argument = parts.next().map(|s| s.trim()).filter(|s| !s.is_empty());

    let result = match command.as_str() {
        "clear" | "reset" => no_argument(ChatCommand::Clear, &command, argument),
        // Input is not read while a reply is generating; Ctrl+C stops it.
        "stop" => ChatCommand::Invalid(
            "Press Ctrl+C while a reply is generating to stop it".to_string(),
        ),
        "history" => no_argument(ChatCommand::History, &command, argument),
        "status" => no_argument(ChatCommand::Status, &command, argument),
        "help" | "?" => ChatCommand::Help,
        "quit" | "exit" | "q" => ChatCommand::Quit,
        "" => ChatCommand::Invalid("Empty command; try /help".to_string()),
        _ => ChatCommand::Invalid(format!("Unknown command: /{}", command)),
    };

    Some(result)
}

fn no_argument(command: ChatCommand, name: &str, argument: Option<&str>) -> ChatCommand {
    match argument {
        None => command,
        Some(_) => ChatCommand::Invalid(format!("/{name} takes no arguments")),
    }
}

/// Returns help text describing available commands.
pub fn help_text() -> &'static str {
    r#"Available commands:
  /clear                 Clear conversation history
  /history               Show the conversation so far
  /status                Show the session status
  /help                  Show this help
  /quit                  Exit

Press Ctrl+C while a reply is generating to stop it."#
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_not_a_command() {
        assert_eq!(parse_command("Hello, Gemini!"), None);
        assert_eq!(parse_command("what is 1/2?"), None);
    }

    #[test]
    fn parses_commands() {
        assert_eq!(parse_command("/clear"), Some(ChatCommand::Clear));
        assert_eq!(parse_command("  /RESET  "), Some(ChatCommand::Clear));
        assert_eq!(parse_command("/history"), Some(ChatCommand::History));
        assert_eq!(parse_command("/status"), Some(ChatCommand::Status));
        assert_eq!(parse_command("/?"), Some(ChatCommand::Help));
        assert_eq!(parse_command("/exit"), Some(ChatCommand::Quit));
    }

    #[test]
    fn rejects_unknown_and_malformed() {
        assert_eq!(
            parse_command("/model gemini-2.0-flash"),
            Some(ChatCommand::Invalid("Unknown command: /model".to_string()))
        );
        assert_eq!(
            parse_command("/clear everything"),
            Some(ChatCommand::Invalid("/clear takes no arguments".to_string()))
        );
        assert!(matches!(parse_command("/"), Some(ChatCommand::Invalid(_))));
    }

    #[test]
    fn help_lists_every_command() {
        let help = help_text();
        for name in ["/clear", "/history", "/status", "/help", "/quit"] {
            assert!(help.contains(name), "missing {name}");
        }
        assert!(help.contains("Ctrl+C"));
    }

    #[test]
    fn stop_points_at_ctrl_c() {
        match parse_command("/stop") {
            Some(ChatCommand::Invalid(message)) => assert!(message.contains("Ctrl+C")),
            other => panic!("unexpected parse: {other:?}"),
        }
        assert!(!help_text().contains("/stop"));
    }
}
